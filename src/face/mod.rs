//! Face observation types and readout geometry.

pub mod geometry;
pub mod sensor;

pub use sensor::{BoundingBox, FaceObservation, FaceSensor, LandmarkSet, ReplaySensor, SensorOptions};
