//! Overlay session: camera plus face sensor under one owner.
//!
//! All state lives in the session object and is torn down explicitly on
//! stop; callbacks do not share globals.

use anyhow::Result;

use crate::capture::camera::{CameraProvider, CameraSession, CaptureRequest, FacingMode};
use crate::face::{FaceObservation, FaceSensor};

pub struct OverlaySession {
    camera: CameraSession,
    sensor: Box<dyn FaceSensor>,
}

impl OverlaySession {
    pub fn open(
        provider: Box<dyn CameraProvider>,
        request: CaptureRequest,
        sensor: Box<dyn FaceSensor>,
    ) -> Result<Self> {
        let camera = CameraSession::open(provider, request)?;
        Ok(Self { camera, sensor })
    }

    /// Polls the sensor for the faces visible in the current frame.
    pub fn observe(&mut self) -> Result<Vec<FaceObservation>> {
        self.sensor.observe()
    }

    pub fn facing(&self) -> FacingMode {
        self.camera.facing()
    }

    /// Requests the opposite camera facing; on failure the previous facing
    /// keeps streaming (logged inside the camera session).
    pub fn switch_facing(&mut self) -> Result<()> {
        self.camera.switch_facing()
    }

    /// Explicit teardown, releasing the camera.
    pub fn close(&mut self) {
        self.camera.close();
    }
}
