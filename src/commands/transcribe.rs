//! Live speech transcription command.
//!
//! Starts continuous recognition, rebuilds the displayed transcript on every
//! event, and prints the final transcript to stdout on stop so it can be
//! piped into other commands.

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::config::PerceptConfig;
use crate::speech::{
    ApiRecognizer, RecognizerConfig, SpeechRecognizer, Transcript, TranscribeCommand,
    TranscribeTui,
};
use crate::ui::ErrorScreen;

/// How long to wait for the final recognition event after stopping.
const FINAL_EVENT_TIMEOUT: Duration = Duration::from_secs(15);

pub async fn handle_transcribe() -> Result<()> {
    tracing::info!("=== Live transcription started ===");

    let config = PerceptConfig::load()?;

    // Capability check: without an API key there is no recognizer. Surface a
    // static message once and leave the other commands working.
    let Ok(api_key) = std::env::var(&config.speech.api_key_env) else {
        println!(
            "Speech recognition is not available: set {} to enable transcription.",
            config.speech.api_key_env
        );
        return Ok(());
    };

    let mut recognizer = ApiRecognizer::new(
        RecognizerConfig {
            endpoint: config.speech.endpoint.clone(),
            model: config.speech.model.clone(),
            language: config.speech.language.clone(),
            api_key,
        },
        config.audio.sample_rate,
        config.audio.device.clone(),
    );

    if let Err(e) = recognizer.start() {
        tracing::error!("Failed to start recognition: {}", e);
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!(
            "Recognition Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        ))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    let mut tui = TranscribeTui::new()?;
    let mut transcript = Transcript::new();

    loop {
        match tui.handle_input() {
            Ok(TranscribeCommand::Continue) => {
                recognizer.tick()?;
                while let Some(event) = recognizer.poll_event() {
                    transcript.apply(&event);
                }
                tui.render(transcript.text(), true)?;
            }
            Ok(TranscribeCommand::Stop) => {
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                recognizer.stop().ok();
                tui.cleanup().ok();
                return Err(e);
            }
        }
    }

    recognizer.stop()?;

    // Keep rendering until the final event lands or the wait times out.
    let deadline = Instant::now() + FINAL_EVENT_TIMEOUT;
    'wait: while Instant::now() < deadline {
        while let Some(event) = recognizer.poll_event() {
            let is_final = event.is_final();
            transcript.apply(&event);
            if is_final {
                break 'wait;
            }
        }
        tui.render(transcript.text(), false)?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    tui.cleanup()?;

    if !transcript.text().is_empty() {
        println!("{}", transcript.text());
    }

    tracing::info!("=== Live transcription exited ===");
    Ok(())
}
