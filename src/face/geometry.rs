//! Face readout geometry: distance estimation and eye/mouth openness.
//!
//! All thresholds are fixed calibration constants inherited from the original
//! demo. Distances are rough monocular estimates from apparent box width and
//! should not be treated as measurements.

use crate::face::sensor::LandmarkSet;

/// Calibration constant: distance in cm is `K / box_width_px`.
const DISTANCE_K: f32 = 5000.0;

/// Faces closer than this (cm, strict) are flagged as close.
const CLOSE_THRESHOLD_CM: f32 = 100.0;

/// Face-mesh landmark indices for the left eye upper/lower lids.
const LEFT_EYE_TOP: usize = 159;
const LEFT_EYE_BOTTOM: usize = 145;

/// Face-mesh landmark indices for the inner upper/lower lips.
const MOUTH_TOP: usize = 13;
const MOUTH_BOTTOM: usize = 14;

/// Normalized y-gap above which an eye counts as open.
const EYE_OPEN_THRESHOLD: f32 = 0.02;

/// Normalized y-gap above which the mouth counts as open.
const MOUTH_OPEN_THRESHOLD: f32 = 0.03;

/// Box/label color for faces that are not close.
pub const FAR_COLOR: (u8, u8, u8) = (0x00, 0xff, 0xcc);

/// Box/label color for close faces.
pub const NEAR_COLOR: (u8, u8, u8) = (0xff, 0x00, 0x00);

/// Open/closed classification for an eye or mouth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Openness {
    Open,
    Closed,
}

impl Openness {
    fn classify(gap: f32, threshold: f32) -> Self {
        if gap > threshold {
            Openness::Open
        } else {
            Openness::Closed
        }
    }
}

/// Estimates the distance to a face in cm from its bounding-box width in
/// pixels, rounded to the nearest whole cm. Returns `None` for degenerate
/// boxes (`width <= 0`).
pub fn estimate_distance(box_width: f32) -> Option<f32> {
    if box_width <= 0.0 {
        return None;
    }
    Some((DISTANCE_K / box_width).round())
}

/// A face is close when its estimated distance is strictly below 100 cm.
pub fn is_close(distance_cm: f32) -> bool {
    distance_cm < CLOSE_THRESHOLD_CM
}

/// Classifies the left eye as open or closed from the lid gap.
///
/// Returns `None` when the landmark set does not cover the eye indices, which
/// renders as empty status text.
pub fn eye_openness(landmarks: &LandmarkSet) -> Option<Openness> {
    let top = landmarks.point(LEFT_EYE_TOP)?;
    let bottom = landmarks.point(LEFT_EYE_BOTTOM)?;
    Some(Openness::classify(bottom[1] - top[1], EYE_OPEN_THRESHOLD))
}

/// Classifies the mouth as open or closed from the inner-lip gap.
pub fn mouth_openness(landmarks: &LandmarkSet) -> Option<Openness> {
    let top = landmarks.point(MOUTH_TOP)?;
    let bottom = landmarks.point(MOUTH_BOTTOM)?;
    Some(Openness::classify(bottom[1] - top[1], MOUTH_OPEN_THRESHOLD))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh_with(pairs: &[(usize, f32)]) -> LandmarkSet {
        let mut points = vec![[0.0_f32; 2]; LandmarkSet::MESH_POINTS];
        for &(idx, y) in pairs {
            points[idx] = [0.5, y];
        }
        LandmarkSet::new(points)
    }

    #[test]
    fn distance_is_constant_over_width_rounded() {
        assert_eq!(estimate_distance(50.0), Some(100.0));
        assert_eq!(estimate_distance(40.0), Some(125.0));
        assert_eq!(estimate_distance(60.0), Some(83.0));
    }

    #[test]
    fn degenerate_width_yields_no_distance() {
        assert_eq!(estimate_distance(0.0), None);
        assert_eq!(estimate_distance(-3.0), None);
    }

    #[test]
    fn close_threshold_is_strict() {
        // Exactly 100 cm is not close.
        assert!(!is_close(100.0));
        assert!(is_close(99.0));
        assert!(!is_close(125.0));
        assert!(is_close(83.0));
    }

    #[test]
    fn eye_open_above_gap_threshold() {
        let open = mesh_with(&[(LEFT_EYE_TOP, 0.40), (LEFT_EYE_BOTTOM, 0.43)]);
        assert_eq!(eye_openness(&open), Some(Openness::Open));

        let closed = mesh_with(&[(LEFT_EYE_TOP, 0.40), (LEFT_EYE_BOTTOM, 0.41)]);
        assert_eq!(eye_openness(&closed), Some(Openness::Closed));
    }

    #[test]
    fn eye_gap_threshold_is_strict() {
        // Gap of exactly 0.02 counts as closed.
        let boundary = mesh_with(&[(LEFT_EYE_TOP, 0.40), (LEFT_EYE_BOTTOM, 0.42)]);
        assert_eq!(eye_openness(&boundary), Some(Openness::Closed));
    }

    #[test]
    fn mouth_open_above_gap_threshold() {
        let open = mesh_with(&[(MOUTH_TOP, 0.60), (MOUTH_BOTTOM, 0.64)]);
        assert_eq!(mouth_openness(&open), Some(Openness::Open));

        let closed = mesh_with(&[(MOUTH_TOP, 0.60), (MOUTH_BOTTOM, 0.62)]);
        assert_eq!(mouth_openness(&closed), Some(Openness::Closed));
    }

    #[test]
    fn truncated_mesh_yields_no_classification() {
        let stub = LandmarkSet::new(vec![[0.0, 0.0]; 10]);
        assert_eq!(eye_openness(&stub), None);
        assert_eq!(mouth_openness(&stub), None);
    }
}
