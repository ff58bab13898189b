//! HTTP transcription backend for the speech recognizer.
//!
//! Captures microphone audio continuously and periodically submits the full
//! accumulated recording to a Whisper-style transcription endpoint. Each
//! response replaces the whole transcript, so interim text can fluctuate
//! exactly like a browser recognizer's interim results. On stop, one last
//! submission produces the final event.

use anyhow::{anyhow, Result};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::recording::audio::{AudioRecorder, CaptureOptions};
use crate::speech::recognizer::SpeechRecognizer;
use crate::speech::transcript::{Alternative, RecognitionEvent};

/// Audio accumulated between interim submissions.
const SUBMIT_INTERVAL: Duration = Duration::from_secs(2);

/// Connection settings for the transcription endpoint.
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub endpoint: String,
    pub model: String,
    /// Fixed recognition language (ISO 639-1).
    pub language: String,
    pub api_key: String,
}

pub struct ApiRecognizer {
    config: RecognizerConfig,
    recorder: AudioRecorder,
    events_tx: mpsc::UnboundedSender<RecognitionEvent>,
    events_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    in_flight: Arc<AtomicBool>,
    last_submit: Instant,
    stopped: bool,
}

impl ApiRecognizer {
    pub fn new(config: RecognizerConfig, sample_rate: u32, device: String) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            recorder: AudioRecorder::new(sample_rate, device, CaptureOptions::default()),
            events_tx,
            events_rx,
            in_flight: Arc::new(AtomicBool::new(false)),
            last_submit: Instant::now(),
            stopped: false,
        }
    }

    fn submit(&mut self, samples: Vec<i16>, is_final: bool) {
        if samples.is_empty() {
            if is_final {
                // Nothing was captured; emit an empty final result so the
                // stop sequence does not wait for a response.
                let _ = self.events_tx.send(RecognitionEvent {
                    results: vec![Alternative {
                        transcript: String::new(),
                        is_final: true,
                    }],
                });
            }
            return;
        }

        self.in_flight.store(true, Ordering::SeqCst);
        let config = self.config.clone();
        let sample_rate = self.recorder.sample_rate();
        let tx = self.events_tx.clone();
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            match request_transcription(&config, &samples, sample_rate).await {
                Ok(text) => {
                    let event = RecognitionEvent {
                        results: vec![Alternative {
                            transcript: text,
                            is_final,
                        }],
                    };
                    let _ = tx.send(event);
                }
                Err(e) => {
                    tracing::warn!("Transcription request failed: {e}");
                }
            }
            in_flight.store(false, Ordering::SeqCst);
        });
    }
}

impl SpeechRecognizer for ApiRecognizer {
    fn start(&mut self) -> Result<()> {
        self.recorder.start_recording()?;
        self.last_submit = Instant::now();
        tracing::info!(
            "Recognition started: model={}, language={}",
            self.config.model,
            self.config.language
        );
        Ok(())
    }

    fn tick(&mut self) -> Result<()> {
        if self.stopped
            || self.in_flight.load(Ordering::SeqCst)
            || self.last_submit.elapsed() < SUBMIT_INTERVAL
        {
            return Ok(());
        }
        let samples = self.recorder.samples();
        self.last_submit = Instant::now();
        self.submit(samples, false);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<RecognitionEvent> {
        self.events_rx.try_recv().ok()
    }

    fn stop(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        let samples = self.recorder.stop_stream();
        self.submit(samples, true);
        tracing::info!("Recognition stopped");
        Ok(())
    }
}

/// Encodes mono PCM samples as an in-memory WAV blob.
fn wav_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Submits audio to the transcription endpoint and returns the text.
async fn request_transcription(
    config: &RecognizerConfig,
    samples: &[i16],
    sample_rate: u32,
) -> Result<String> {
    let audio = wav_bytes(samples, sample_rate)?;

    let file_part = reqwest::multipart::Part::bytes(audio)
        .file_name("capture.wav")
        .mime_str("audio/wav")
        .map_err(|e| anyhow!("Failed to build upload part: {e}"))?;

    let form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", config.model.clone())
        .text("language", config.language.clone())
        .text("response_format", "json");

    let client = reqwest::Client::new();
    let response = client
        .post(&config.endpoint)
        .bearer_auth(&config.api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            if e.is_connect() {
                anyhow!("Failed to connect to the transcription API. Check your internet connection.")
            } else if e.is_timeout() {
                anyhow!("Transcription request timed out.")
            } else {
                anyhow!("Transcription network error: {e}")
            }
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let human_readable = match status.as_u16() {
            401 => "Transcription API key is invalid or expired.".to_string(),
            429 => "Transcription API rate limit hit. Please wait and try again.".to_string(),
            500..=504 => "Transcription API server is experiencing issues.".to_string(),
            _ => format!("Transcription API error (status {status}): {body}"),
        };
        return Err(anyhow!(human_readable));
    }

    #[derive(serde::Deserialize)]
    struct ApiResponse {
        text: String,
    }

    let parsed: ApiResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("Failed to parse transcription response: {e}"))?;

    Ok(parsed.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_blob_carries_header_and_samples() {
        let bytes = wav_bytes(&[0, 1000, -1000, 32767], 16000).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        // 44-byte canonical header plus 2 bytes per sample.
        assert_eq!(bytes.len(), 44 + 4 * 2);
    }

    #[test]
    fn empty_capture_still_produces_valid_wav() {
        let bytes = wav_bytes(&[], 16000).unwrap();
        assert_eq!(bytes.len(), 44);
    }
}
