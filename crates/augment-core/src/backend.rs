//! Seams for the vision collaborators the pipeline depends on.
//!
//! The pipeline never calls a concrete solver directly; it receives these
//! traits as `&dyn` arguments so that reference implementations and external
//! libraries are interchangeable.

use serde::{Deserialize, Serialize};

use crate::{Intrinsics, Pose, Pt2, Pt3, Real, Result};

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel centre, used as the principal point guess.
    pub fn center(&self) -> Pt2 {
        Pt2::new(self.width as Real / 2.0, self.height as Real / 2.0)
    }
}

/// What a calibration solver hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOutput {
    pub intrinsics: Intrinsics,
    /// RMS reprojection error over all points, in pixels.
    pub rms_error: Real,
    pub per_view_errors: Vec<Real>,
}

pub trait CalibrationSolver {
    /// Estimate intrinsics from matching world/image point sets.
    fn calibrate(
        &self,
        world_sets: &[Vec<Pt3>],
        image_sets: &[Vec<Pt2>],
        image_size: ImageSize,
    ) -> Result<CalibrationOutput>;
}

pub trait PoseSolver {
    /// Pose of the world frame in the camera frame.
    fn solve_pose(&self, world: &[Pt3], image: &[Pt2], intrinsics: &Intrinsics) -> Result<Pose>;
}

pub trait PointProjector {
    fn project(&self, world: &[Pt3], pose: &Pose, intrinsics: &Intrinsics) -> Result<Vec<Pt2>>;
}
