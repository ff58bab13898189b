//! Device capture lifecycle management.

pub mod camera;

pub use camera::{CameraProvider, CameraSession, CaptureRequest, DemoCamera, FacingMode, FrameSource};
