//! Audio recording command with live frequency-bar visualization.
//!
//! Records until the user saves or cancels, then exports under the fixed
//! filename in the working directory, optionally re-encoded to MP3.

use anyhow::Result;

use crate::config::PerceptConfig;
use crate::recording::{
    export, AudioRecorder, BarVisualizer, CaptureOptions, RecordTui, RecordingCommand,
    DEFAULT_FFT_SIZE,
};
use crate::ui::ErrorScreen;

/// Gain adjustment per keypress.
const GAIN_STEP: f32 = 0.1;

pub async fn handle_record(mp3: bool, gain: Option<f32>) -> Result<()> {
    tracing::info!("=== Audio recorder started ===");

    let config = PerceptConfig::load()?;

    let options = CaptureOptions {
        echo_cancellation: config.audio.echo_cancellation,
        noise_suppression: config.audio.noise_suppression,
        auto_gain: config.audio.auto_gain,
    };
    let mut recorder = AudioRecorder::new(
        config.audio.sample_rate,
        config.audio.device.clone(),
        options,
    );
    recorder.set_gain(gain.unwrap_or(config.audio.gain));

    if let Err(e) = recorder.start_recording() {
        tracing::error!("Failed to start recording: {}", e);
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!(
            "Recording Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        ))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    let mut tui = RecordTui::new()?;
    let mut visualizer = BarVisualizer::new(DEFAULT_FFT_SIZE);
    let mut should_save = false;
    let mut frame_count: u64 = 0;

    loop {
        match tui.handle_input() {
            Ok(RecordingCommand::Continue) => {
                let bars = visualizer.frame(&recorder.samples());
                tui.render(&bars, recorder.gain(), recorder.is_paused())?;
                frame_count += 1;
                if frame_count.is_multiple_of(600) {
                    tracing::debug!(
                        "Captured {} samples ({:.1}s)",
                        recorder.sample_count(),
                        recorder.sample_count() as f64 / recorder.sample_rate() as f64
                    );
                }
            }
            Ok(RecordingCommand::Save) => {
                should_save = true;
                break;
            }
            Ok(RecordingCommand::Cancel) => {
                break;
            }
            Ok(RecordingCommand::TogglePause) => {
                recorder.toggle_pause();
            }
            Ok(RecordingCommand::GainUp) => {
                recorder.set_gain(recorder.gain() + GAIN_STEP);
            }
            Ok(RecordingCommand::GainDown) => {
                recorder.set_gain(recorder.gain() - GAIN_STEP);
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                tui.cleanup().ok();
                return Err(e);
            }
        }
    }

    let samples = recorder.stop_stream();
    tui.cleanup()?;

    if should_save {
        let dir = std::env::current_dir()?;
        match export(
            &samples,
            recorder.sample_rate(),
            &dir,
            mp3,
            config.audio.mp3_bitrate_kbps,
        ) {
            Ok(path) => {
                println!("Saved {}", path.display());
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                eprintln!("Export failed: {e}");
                return Err(e);
            }
        }
    }

    tracing::info!("=== Audio recorder exited ===");
    Ok(())
}
