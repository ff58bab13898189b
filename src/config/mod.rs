//! Configuration management.
//!
//! Application configuration lives in a TOML file in the user's config
//! directory; every field has a default so the file is optional.

pub mod file;

pub use file::{get_config_path, AudioConfig, CameraConfig, PerceptConfig, SpeechConfig};
