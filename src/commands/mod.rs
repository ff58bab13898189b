//! Application command handlers.
//!
//! One submodule per subcommand:
//! - `overlay`: face detection overlay demo with camera facing switch
//! - `transcribe`: live speech transcription
//! - `record`: audio recording with visualizer and MP3 export
//! - `config`: open configuration file in the user's preferred editor
//! - `list_devices`: list available audio input devices
//! - `logs`: display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod overlay;
pub mod record;
pub mod transcribe;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use overlay::handle_overlay;
pub use record::handle_record;
pub use transcribe::handle_transcribe;
