//! Face overlay demo command.
//!
//! Wires the camera session, the face sensor, and the frame loop together
//! and drives one overlay frame per display tick until the user quits.

use anyhow::Result;
use std::path::PathBuf;

use crate::capture::camera::{CaptureRequest, DemoCamera, FacingMode};
use crate::config::PerceptConfig;
use crate::face::{ReplaySensor, SensorOptions};
use crate::overlay::{OverlayCommand, OverlayLoop, OverlaySession, OverlayTui};
use crate::ui::ErrorScreen;

pub async fn handle_overlay(facing: Option<FacingMode>, replay: Option<PathBuf>) -> Result<()> {
    tracing::info!("=== Face overlay demo started ===");

    let config = PerceptConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        e
    })?;

    // Missing sensor backend is a capability gap, not a crash: surface a
    // static message and leave the rest of the binary usable.
    let Some(replay_path) = replay else {
        println!(
            "No face-sensor backend is configured. Pass --replay FILE with recorded \
             observations (JSON Lines, one frame per line) to run the overlay demo."
        );
        return Ok(());
    };

    let options = SensorOptions {
        max_faces: config.camera.max_faces,
        min_confidence: config.camera.min_confidence,
    };
    let sensor = match ReplaySensor::from_file(&replay_path, options) {
        Ok(sensor) => sensor,
        Err(e) => {
            tracing::error!("Failed to load observations: {e}");
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&format!("Observation file error:\n\n{e}"))?;
            error_screen.cleanup()?;
            return Err(e);
        }
    };

    let request = CaptureRequest {
        facing: facing.unwrap_or(config.camera.facing),
        width: config.camera.width,
        height: config.camera.height,
    };

    let session = OverlaySession::open(Box::new(DemoCamera), request, Box::new(sensor))?;
    let mut frame_loop = OverlayLoop::new(session);
    frame_loop.start();

    let mut tui = OverlayTui::new(config.camera.width, config.camera.height)?;

    loop {
        match tui.handle_input() {
            Ok(OverlayCommand::Continue) => {
                let Some(frame) = frame_loop.step()? else {
                    break;
                };
                tui.render(&frame, frame_loop.session_mut().facing())?;
            }
            Ok(OverlayCommand::SwitchFacing) => {
                // A failed switch is logged inside the session; the prior
                // facing keeps streaming.
                frame_loop.session_mut().switch_facing()?;
            }
            Ok(OverlayCommand::Quit) => {
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                frame_loop.stop();
                tui.cleanup().ok();
                return Err(e);
            }
        }
    }

    frame_loop.stop();
    tui.cleanup()?;

    tracing::info!("=== Face overlay demo exited ===");
    Ok(())
}
