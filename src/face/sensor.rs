//! Face sensing delegate: observation records and the sensor trait.
//!
//! Detection and landmark extraction are performed by an external model
//! behind the [`FaceSensor`] trait. One [`FaceObservation`] carries a face's
//! bounding box together with its landmark set, so there is no index
//! correspondence between separate box and landmark streams to keep in sync.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Axis-aligned face bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: [f32; 2],
    pub bottom_right: [f32; 2],
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.bottom_right[0] - self.top_left[0]
    }

    pub fn height(&self) -> f32 {
        self.bottom_right[1] - self.top_left[1]
    }
}

/// Fixed-topology set of normalized face-mesh points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    points: Vec<[f32; 2]>,
}

impl LandmarkSet {
    /// Points in the full face-mesh topology.
    pub const MESH_POINTS: usize = 468;

    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self { points }
    }

    /// Returns the point at a mesh index, or `None` for a truncated set.
    pub fn point(&self, index: usize) -> Option<[f32; 2]> {
        self.points.get(index).copied()
    }

}

/// One detected face: bounding box plus, when the model produced one, its
/// landmark set. Faces without landmarks render with empty status text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<LandmarkSet>,
}

/// Sensor configuration forwarded to the model backend.
#[derive(Debug, Clone, Copy)]
pub struct SensorOptions {
    /// Maximum number of faces to report per frame.
    pub max_faces: usize,
    /// Minimum detection confidence, 0.0..=1.0.
    pub min_confidence: f32,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            max_faces: 10,
            min_confidence: 0.5,
        }
    }
}

/// Detection delegate. Implementations run (or proxy) a face model and
/// report the faces visible in the current frame.
pub trait FaceSensor {
    /// Returns the observations for the current frame, most prominent face
    /// first. An empty vec means no faces, not an error.
    fn observe(&mut self) -> Result<Vec<FaceObservation>>;
}

/// Plays back recorded observations from a JSON Lines file, one frame per
/// line. Frames holding `[]` are empty frames. After the last line the
/// sensor keeps reporting the final frame, mirroring a camera that stopped
/// seeing motion.
pub struct ReplaySensor {
    frames: Vec<Vec<FaceObservation>>,
    cursor: usize,
    options: SensorOptions,
}

impl ReplaySensor {
    pub fn from_file(path: &Path, options: SensorOptions) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open replay file {}", path.display()))?;
        let mut frames = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: Vec<FaceObservation> = serde_json::from_str(&line).with_context(|| {
                format!("Invalid observation frame on line {}", line_no + 1)
            })?;
            frames.push(frame);
        }
        if frames.is_empty() {
            return Err(anyhow!(
                "Replay file {} contains no observation frames",
                path.display()
            ));
        }
        tracing::info!(
            "Loaded {} observation frames from {} (min confidence {})",
            frames.len(),
            path.display(),
            options.min_confidence
        );
        Ok(Self {
            frames,
            cursor: 0,
            options,
        })
    }

    #[cfg(test)]
    pub fn from_frames(frames: Vec<Vec<FaceObservation>>, options: SensorOptions) -> Self {
        Self {
            frames,
            cursor: 0,
            options,
        }
    }
}

impl FaceSensor for ReplaySensor {
    fn observe(&mut self) -> Result<Vec<FaceObservation>> {
        let frame = &self.frames[self.cursor.min(self.frames.len() - 1)];
        if self.cursor < self.frames.len() {
            self.cursor += 1;
        }
        Ok(frame
            .iter()
            .take(self.options.max_faces)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32) -> FaceObservation {
        FaceObservation {
            bbox: BoundingBox {
                top_left: [x, 100.0],
                bottom_right: [x + 50.0, 220.0],
            },
            landmarks: None,
        }
    }

    #[test]
    fn bounding_box_extent() {
        let b = BoundingBox {
            top_left: [100.0, 100.0],
            bottom_right: [150.0, 220.0],
        };
        assert_eq!(b.width(), 50.0);
        assert_eq!(b.height(), 120.0);
    }

    #[test]
    fn replay_sensor_holds_final_frame() {
        let mut sensor = ReplaySensor::from_frames(
            vec![vec![face(0.0)], vec![]],
            SensorOptions::default(),
        );
        assert_eq!(sensor.observe().unwrap().len(), 1);
        assert_eq!(sensor.observe().unwrap().len(), 0);
        // Past the end: last frame repeats.
        assert_eq!(sensor.observe().unwrap().len(), 0);
    }

    #[test]
    fn replay_sensor_caps_faces_at_max() {
        let mut sensor = ReplaySensor::from_frames(
            vec![vec![face(0.0), face(60.0), face(120.0)]],
            SensorOptions {
                max_faces: 2,
                min_confidence: 0.5,
            },
        );
        assert_eq!(sensor.observe().unwrap().len(), 2);
    }

    #[test]
    fn observation_round_trips_through_json() {
        let obs = FaceObservation {
            bbox: BoundingBox {
                top_left: [10.0, 20.0],
                bottom_right: [60.0, 90.0],
            },
            landmarks: Some(LandmarkSet::new(vec![[0.1, 0.2], [0.3, 0.4]])),
        };
        let json = serde_json::to_string(&obs).unwrap();
        let back: FaceObservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, obs);
    }
}
