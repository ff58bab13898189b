//! Transcript state rebuilt from recognition events.
//!
//! Every event carries the recognizer's full current result list, interim
//! results included. The displayed text is rebuilt wholesale from each event
//! rather than appended, so interim text can fluctuate and applying the same
//! event twice is a no-op.

/// One recognition result's top alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub is_final: bool,
}

/// A transcript-update event from the recognition delegate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionEvent {
    pub results: Vec<Alternative>,
}

impl RecognitionEvent {
    pub fn is_final(&self) -> bool {
        self.results.iter().all(|r| r.is_final) && !self.results.is_empty()
    }
}

/// The single mutable transcript string.
#[derive(Debug, Default)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the transcript with the concatenation of the event's
    /// results. Not an accumulation across events.
    pub fn apply(&mut self, event: &RecognitionEvent) {
        self.text = event
            .results
            .iter()
            .map(|r| r.transcript.as_str())
            .collect();
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(parts: &[&str]) -> RecognitionEvent {
        RecognitionEvent {
            results: parts
                .iter()
                .map(|p| Alternative {
                    transcript: p.to_string(),
                    is_final: false,
                })
                .collect(),
        }
    }

    #[test]
    fn event_results_are_concatenated() {
        let mut t = Transcript::new();
        t.apply(&event(&["hello ", "world"]));
        assert_eq!(t.text(), "hello world");
    }

    #[test]
    fn later_events_replace_not_append() {
        let mut t = Transcript::new();
        t.apply(&event(&["hello wor"]));
        t.apply(&event(&["hello world"]));
        assert_eq!(t.text(), "hello world");
        // Interim text may shrink again.
        t.apply(&event(&["hello"]));
        assert_eq!(t.text(), "hello");
    }

    #[test]
    fn applying_the_same_event_twice_is_idempotent() {
        let mut t = Transcript::new();
        let e = event(&["same "]);
        t.apply(&e);
        t.apply(&e);
        assert_eq!(t.text(), "same ");
    }

    #[test]
    fn empty_event_clears_the_transcript() {
        let mut t = Transcript::new();
        t.apply(&event(&["something"]));
        t.apply(&RecognitionEvent::default());
        assert_eq!(t.text(), "");
    }

    #[test]
    fn finality_requires_every_result_final() {
        let mut e = event(&["a", "b"]);
        assert!(!e.is_final());
        e.results[0].is_final = true;
        assert!(!e.is_final());
        e.results[1].is_final = true;
        assert!(e.is_final());
        assert!(!RecognitionEvent::default().is_final());
    }
}
