//! Linear reference backends for the augment pipeline.
//!
//! Building blocks:
//! - [`homography`]: normalized DLT plane-to-image homography,
//! - [`zhang_intrinsics`]: closed-form `K` from homographies,
//! - [`planar_pose`]: pose of a `Z = 0` plane from a homography,
//! - [`distortion_fit`]: linear radial/tangential coefficient fit.
//!
//! Seam implementations:
//! - [`LinearCalibrationSolver`] for [`augment_core::CalibrationSolver`],
//! - [`HomographyPoseSolver`] for [`augment_core::PoseSolver`],
//! - [`PinholeProjector`] for [`augment_core::PointProjector`].

pub mod calibration;
pub mod distortion_fit;
pub mod homography;
pub mod math;
pub mod planar_pose;
pub mod pose;
pub mod zhang_intrinsics;

pub use calibration::{LinearCalibrationOptions, LinearCalibrationSolver};
pub use homography::{dlt_homography, HomographyError};
pub use planar_pose::{estimate_planar_pose_from_h, PlanarPoseError};
pub use pose::{HomographyPoseSolver, PinholeProjector};
pub use zhang_intrinsics::{estimate_intrinsics_from_homographies, ZhangError};
