//! Speech recognition delegate trait.
//!
//! Mirrors the cooperative single-thread model of the host event loop: the
//! UI calls [`SpeechRecognizer::tick`] once per frame to let the recognizer
//! schedule work, then drains pending events with
//! [`SpeechRecognizer::poll_event`]. Recognition itself happens in a backend
//! behind this trait; the crate does not implement it.

use anyhow::Result;

use crate::speech::transcript::RecognitionEvent;

/// Continuous interim-result speech recognizer.
pub trait SpeechRecognizer {
    /// Begins continuous recognition in the configured language.
    fn start(&mut self) -> Result<()>;

    /// Gives the recognizer a chance to do periodic work. Called once per
    /// display frame; must not block.
    fn tick(&mut self) -> Result<()>;

    /// Returns the next pending transcript-update event, if any.
    fn poll_event(&mut self) -> Option<RecognitionEvent>;

    /// Halts recognition. A final event may still arrive via
    /// [`SpeechRecognizer::poll_event`] afterwards.
    fn stop(&mut self) -> Result<()>;
}
