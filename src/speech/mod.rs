//! Speech-to-text transcription: recognizer delegate, transcript state, and
//! the live display.

pub mod api;
pub mod recognizer;
pub mod transcript;
pub mod ui;

pub use api::{ApiRecognizer, RecognizerConfig};
pub use recognizer::SpeechRecognizer;
pub use transcript::{Alternative, RecognitionEvent, Transcript};
pub use ui::{TranscribeCommand, TranscribeTui};
