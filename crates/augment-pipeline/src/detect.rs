//! Corner detection seam and a replay detector for recorded detections.

use std::path::PathBuf;

use augment_core::{PatternSize, Pt2, Real};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::frames::Frame;

/// Finds the pattern's inner corners in a frame.
pub trait CornerDetector {
    /// Corners in pattern order (column-major, matching the world points),
    /// or `None` when the pattern is not visible.
    fn detect(&mut self, frame: &Frame, pattern: PatternSize) -> Option<Vec<Pt2>>;
}

impl<F> CornerDetector for F
where
    F: FnMut(&Frame, PatternSize) -> Option<Vec<Pt2>>,
{
    fn detect(&mut self, frame: &Frame, pattern: PatternSize) -> Option<Vec<Pt2>> {
        self(frame, pattern)
    }
}

/// One entry of a recorded-detections file.
///
/// ```json
/// { "image": "frames/0001.png", "corners": [[412.3, 220.1], ...] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners: Option<Vec<[Real; 2]>>,
}

impl RecordedFrame {
    pub fn corner_points(&self) -> Option<Vec<Pt2>> {
        self.corners
            .as_ref()
            .map(|c| c.iter().map(|&[x, y]| Pt2::new(x, y)).collect())
    }
}

/// Replays detections by frame index.
///
/// Frames past the end of the recording are reported as undetected.
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
    detections: Vec<Option<Vec<Pt2>>>,
}

impl ReplayDetector {
    pub fn new(detections: Vec<Option<Vec<Pt2>>>) -> Self {
        Self { detections }
    }

    pub fn from_recording(frames: &[RecordedFrame]) -> Self {
        Self::new(frames.iter().map(RecordedFrame::corner_points).collect())
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

impl CornerDetector for ReplayDetector {
    fn detect(&mut self, frame: &Frame, _pattern: PatternSize) -> Option<Vec<Pt2>> {
        let found = self.detections.get(frame.index).cloned().flatten();
        trace!(
            "frame {}: replayed {} corners",
            frame.index,
            found.as_ref().map_or(0, Vec::len)
        );
        found
    }
}
