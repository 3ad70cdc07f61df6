//! Deterministic synthetic views of the reference pattern.
//!
//! Used by the test suites of every crate in the workspace to build
//! calibration and pose problems with known ground truth.
//!
//! # Example
//!
//! ```
//! use augment_core::{synthetic, Intrinsics, Mat3, PatternSize};
//!
//! let intr = Intrinsics::new(
//!     Mat3::new(800.0, 0.0, 640.0, 0.0, 780.0, 360.0, 0.0, 0.0, 1.0),
//!     vec![],
//! );
//! let pattern = PatternSize::default();
//! let world = pattern.world_points().unwrap();
//! let poses = synthetic::orbit_poses(&pattern, 5, 20.0);
//! let views = synthetic::project_views(&intr.camera(), &world, &poses).unwrap();
//! assert_eq!(views.len(), 5);
//! ```

use nalgebra::{Translation3, UnitQuaternion};

use crate::{
    Camera, DistortionModel, Error, IntrinsicsModel, Iso3, PatternSize, ProjectionModel, Pt2, Pt3,
    Real, Result, Vec3,
};

/// Camera-from-pattern pose that looks at the pattern centre from `distance`
/// after rotating the pattern by roll/pitch/yaw (radians).
pub fn centered_pose(
    pattern: &PatternSize,
    roll: Real,
    pitch: Real,
    yaw: Real,
    distance: Real,
) -> Iso3 {
    let center = Vec3::new(
        (pattern.cols.saturating_sub(1)) as Real / 2.0,
        -((pattern.rows.saturating_sub(1)) as Real) / 2.0,
        0.0,
    );
    let rotation = UnitQuaternion::from_euler_angles(roll, pitch, yaw);
    let translation = Vec3::new(0.0, 0.0, distance) - rotation * center;
    Iso3::from_parts(Translation3::from(translation), rotation)
}

/// `n` well-spread viewpoints alternating tilt about both in-plane axes.
pub fn orbit_poses(pattern: &PatternSize, n: usize, distance: Real) -> Vec<Iso3> {
    (0..n)
        .map(|i| {
            let t = i as Real;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let roll = sign * (0.15 + 0.05 * t);
            let pitch = -sign * (0.25 - 0.04 * t);
            let yaw = 0.1 * t - 0.2;
            centered_pose(pattern, roll, pitch, yaw, distance + 0.5 * t)
        })
        .collect()
}

/// Project pattern points through `camera` for one pose; every point must be in front.
pub fn project_view<P, D, K>(
    camera: &Camera<Real, P, D, K>,
    cam_from_pattern: &Iso3,
    points: &[Pt3],
) -> Result<Vec<Pt2>>
where
    P: ProjectionModel<Real>,
    D: DistortionModel<Real>,
    K: IntrinsicsModel<Real>,
{
    points
        .iter()
        .enumerate()
        .map(|(idx, pw)| {
            let pc = cam_from_pattern.transform_point(pw);
            camera
                .project_point(&pc)
                .map(Pt2::from)
                .ok_or_else(|| {
                    Error::invalid(format!("point {idx} behind camera (z={:.3})", pc.z))
                })
        })
        .collect()
}

pub fn project_views<P, D, K>(
    camera: &Camera<Real, P, D, K>,
    points: &[Pt3],
    poses: &[Iso3],
) -> Result<Vec<Vec<Pt2>>>
where
    P: ProjectionModel<Real>,
    D: DistortionModel<Real>,
    K: IntrinsicsModel<Real>,
{
    poses
        .iter()
        .map(|pose| project_view(camera, pose, points))
        .collect()
}
