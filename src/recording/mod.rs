//! Audio recording: capture, visualization, and export.

pub mod audio;
pub mod encoder;
pub mod ui;
pub mod visualizer;

pub use audio::{AudioRecorder, CaptureOptions};
pub use encoder::{export, find_ffmpeg, EXPORT_BASENAME};
pub use ui::{RecordTui, RecordingCommand};
pub use visualizer::{Bar, BarVisualizer, DEFAULT_FFT_SIZE};
