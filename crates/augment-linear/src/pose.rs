//! Planar pose and pinhole projection behind the pipeline seams.

use augment_core::{
    DistortionModel, Error, Intrinsics, IntrinsicsModel, Mat3, PointProjector, Pose, PoseSolver,
    Pt2, Pt3, Result,
};
use log::trace;

use crate::calibration::plane_coords;
use crate::homography::dlt_homography;
use crate::planar_pose::estimate_planar_pose_from_h;

/// Pose of a `Z = 0` pattern from undistorted normalized observations.
///
/// Pixels are undistorted with the calibrated model, a plane-to-normalized
/// homography is fit, and the homography is decomposed with `K = I`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomographyPoseSolver;

impl PoseSolver for HomographyPoseSolver {
    fn solve_pose(&self, world: &[Pt3], image: &[Pt2], intrinsics: &Intrinsics) -> Result<Pose> {
        if world.len() != image.len() {
            return Err(Error::invalid(format!(
                "{} world points but {} image points",
                world.len(),
                image.len()
            )));
        }
        if world.len() < 4 {
            return Err(Error::invalid(format!(
                "pose needs at least 4 points, got {}",
                world.len()
            )));
        }

        let plane = plane_coords(world)?;
        let k = intrinsics.k();
        let dist = intrinsics.distortion_model();
        let normalized: Vec<Pt2> = image
            .iter()
            .map(|p| Pt2::from(dist.undistort(&k.from_pixel(&p.coords))))
            .collect();

        let h = dlt_homography(&plane, &normalized).map_err(Error::solver)?;
        let iso = estimate_planar_pose_from_h(&Mat3::identity(), &h).map_err(Error::solver)?;
        let pose = Pose::from_isometry(&iso);
        trace!("pose rvec={:?} tvec={:?}", pose.rotation, pose.translation);
        Ok(pose)
    }
}

/// Rigid transform, pinhole, Brown-Conrady distortion, then `K`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinholeProjector;

impl PointProjector for PinholeProjector {
    fn project(&self, world: &[Pt3], pose: &Pose, intrinsics: &Intrinsics) -> Result<Vec<Pt2>> {
        let camera = intrinsics.camera();
        let iso = pose.to_isometry();
        world
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let pc = iso.transform_point(p);
                camera.project_point(&pc).map(Pt2::from).ok_or_else(|| {
                    Error::invalid(format!("point {i} is behind the camera (z = {:.3})", pc.z))
                })
            })
            .collect()
    }
}
