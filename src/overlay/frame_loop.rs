//! Step-driven overlay loop with an explicit start/stop handle.
//!
//! The original demo re-scheduled itself on every display frame with no way
//! to cancel. Here the loop is a controller: the UI (or a test) calls
//! [`OverlayLoop::step`] once per frame, and `stop` ends the loop
//! deterministically. Each step runs to completion with no awaits, so frame
//! state is never mutated concurrently.

use anyhow::Result;

use crate::face::geometry::{self, Openness};
use crate::face::{BoundingBox, FaceObservation};
use crate::overlay::session::OverlaySession;

/// Per-face values computed fresh on every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceReadout {
    pub bbox: BoundingBox,
    /// Estimated distance in cm; `None` for a degenerate box.
    pub distance_cm: Option<f32>,
    pub close: bool,
    pub eye: Option<Openness>,
    pub mouth: Option<Openness>,
}

impl FaceReadout {
    pub fn from_observation(obs: &FaceObservation) -> Self {
        let distance_cm = geometry::estimate_distance(obs.bbox.width());
        let close = distance_cm.is_some_and(geometry::is_close);
        let (eye, mouth) = match &obs.landmarks {
            Some(lm) => (geometry::eye_openness(lm), geometry::mouth_openness(lm)),
            None => (None, None),
        };
        Self {
            bbox: obs.bbox,
            distance_cm,
            close,
            eye,
            mouth,
        }
    }

    /// RGB color for the box and label.
    pub fn color(&self) -> (u8, u8, u8) {
        if self.close {
            geometry::NEAR_COLOR
        } else {
            geometry::FAR_COLOR
        }
    }

    /// Status label for the face, 1-based. A face without landmarks gets no
    /// eye/mouth text at all.
    pub fn label(&self, index: usize) -> String {
        let mut label = match self.distance_cm {
            Some(d) => format!("{}: {}cm", index + 1, d as i64),
            None => format!("{}: ?", index + 1),
        };
        if self.close {
            label.push_str(" close!");
        }
        match self.eye {
            Some(Openness::Open) => label.push_str(" eye:open"),
            Some(Openness::Closed) => label.push_str(" eye:closed"),
            None => {}
        }
        match self.mouth {
            Some(Openness::Open) => label.push_str(" mouth:open"),
            Some(Openness::Closed) => label.push_str(" mouth:closed"),
            None => {}
        }
        label
    }
}

/// One frame's worth of overlay content, discarded after rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayFrame {
    pub faces: Vec<FaceReadout>,
}

impl OverlayFrame {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

pub struct OverlayLoop {
    session: OverlaySession,
    running: bool,
}

impl OverlayLoop {
    pub fn new(session: OverlaySession) -> Self {
        Self {
            session,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        tracing::debug!("Overlay loop started");
    }

    /// Stops the loop and tears the session down.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.session.close();
            tracing::debug!("Overlay loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn session_mut(&mut self) -> &mut OverlaySession {
        &mut self.session
    }

    /// Advances one frame: polls the sensor and recomputes every readout
    /// from scratch. Returns `None` once the loop has been stopped.
    pub fn step(&mut self) -> Result<Option<OverlayFrame>> {
        if !self.is_running() {
            return Ok(None);
        }
        let observations = self.session.observe()?;
        let faces = observations
            .iter()
            .map(FaceReadout::from_observation)
            .collect();
        Ok(Some(OverlayFrame { faces }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::camera::{CaptureRequest, DemoCamera, FacingMode};
    use crate::face::{LandmarkSet, ReplaySensor, SensorOptions};

    fn observation(width: f32, landmarks: Option<LandmarkSet>) -> FaceObservation {
        FaceObservation {
            bbox: BoundingBox {
                top_left: [100.0, 100.0],
                bottom_right: [100.0 + width, 220.0],
            },
            landmarks,
        }
    }

    fn looped(frames: Vec<Vec<FaceObservation>>) -> OverlayLoop {
        let sensor = ReplaySensor::from_frames(frames, SensorOptions::default());
        let session = OverlaySession::open(
            Box::new(DemoCamera),
            CaptureRequest {
                facing: FacingMode::User,
                width: 640,
                height: 480,
            },
            Box::new(sensor),
        )
        .unwrap();
        OverlayLoop::new(session)
    }

    #[test]
    fn boundary_box_is_not_close() {
        // Width 50 -> 100 cm; the close threshold is strict.
        let readout = FaceReadout::from_observation(&observation(50.0, None));
        assert_eq!(readout.distance_cm, Some(100.0));
        assert!(!readout.close);
        assert_eq!(readout.color(), (0x00, 0xff, 0xcc));
    }

    #[test]
    fn near_box_is_close_and_red() {
        let readout = FaceReadout::from_observation(&observation(60.0, None));
        assert_eq!(readout.distance_cm, Some(83.0));
        assert!(readout.close);
        assert_eq!(readout.color(), (0xff, 0x00, 0x00));
    }

    #[test]
    fn far_box_is_not_close() {
        let readout = FaceReadout::from_observation(&observation(40.0, None));
        assert_eq!(readout.distance_cm, Some(125.0));
        assert!(!readout.close);
    }

    #[test]
    fn face_without_landmarks_has_empty_status() {
        let readout = FaceReadout::from_observation(&observation(50.0, None));
        assert_eq!(readout.eye, None);
        assert_eq!(readout.mouth, None);
        assert_eq!(readout.label(0), "1: 100cm");
    }

    #[test]
    fn face_with_landmarks_gets_openness_labels() {
        let mut points = vec![[0.0_f32; 2]; LandmarkSet::MESH_POINTS];
        points[159] = [0.5, 0.40]; // eye top
        points[145] = [0.5, 0.43]; // eye bottom: gap 0.03 > 0.02 -> open
        points[13] = [0.5, 0.60]; // mouth top
        points[14] = [0.5, 0.62]; // mouth bottom: gap 0.02 <= 0.03 -> closed
        let readout =
            FaceReadout::from_observation(&observation(50.0, Some(LandmarkSet::new(points))));
        assert_eq!(readout.label(0), "1: 100cm eye:open mouth:closed");
    }

    #[test]
    fn step_returns_nothing_before_start_and_after_stop() {
        let mut frame_loop = looped(vec![vec![observation(50.0, None)]]);
        assert_eq!(frame_loop.step().unwrap(), None);

        frame_loop.start();
        let frame = frame_loop.step().unwrap().unwrap();
        assert_eq!(frame.face_count(), 1);

        frame_loop.stop();
        assert_eq!(frame_loop.step().unwrap(), None);
    }

    #[test]
    fn frames_are_recomputed_not_accumulated() {
        let mut frame_loop = looped(vec![
            vec![observation(50.0, None), observation(60.0, None)],
            vec![observation(40.0, None)],
        ]);
        frame_loop.start();
        assert_eq!(frame_loop.step().unwrap().unwrap().face_count(), 2);
        // The next frame fully replaces the previous readouts.
        let second = frame_loop.step().unwrap().unwrap();
        assert_eq!(second.face_count(), 1);
        assert_eq!(second.faces[0].distance_cm, Some(125.0));
    }
}
