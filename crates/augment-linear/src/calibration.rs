//! Closed-form planar calibration behind the [`CalibrationSolver`] seam.
//!
//! Pipeline per call:
//! 1. plane-to-pixel homographies (normalized DLT),
//! 2. Zhang intrinsics,
//! 3. optionally, alternating radial distortion fit and intrinsics re-estimate
//!    on undistorted pixels,
//! 4. per-view planar pose and reprojection error.
//!
//! The distortion estimate is only kept when it lowers the RMS error.

use augment_core::{
    BrownConrady5, CalibrationOutput, CalibrationSolver, DistortionModel, Error, FxFyCxCySkew,
    ImageSize, Intrinsics, IntrinsicsModel, Mat3, Pt2, Pt3, Real, Result,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::distortion_fit::{
    estimate_distortion_from_homographies, DistortionFitOptions, DistortionView,
};
use crate::homography::dlt_homography;
use crate::planar_pose::estimate_planar_pose_from_h;
use crate::zhang_intrinsics::estimate_intrinsics_from_homographies;

/// Tolerance on `|z|` for a world point to count as lying on the pattern plane.
const PLANE_EPS: Real = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearCalibrationOptions {
    /// Estimate radial `k1, k2` after the closed-form intrinsics.
    pub fit_radial_distortion: bool,
    /// Constrain skew to zero (adds `B12 = 0` to Zhang's system).
    pub zero_skew: bool,
    /// Distortion/intrinsics alternation rounds.
    pub iterations: usize,
}

impl Default for LinearCalibrationOptions {
    fn default() -> Self {
        Self {
            fit_radial_distortion: true,
            zero_skew: true,
            iterations: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LinearCalibrationSolver {
    pub options: LinearCalibrationOptions,
}

impl LinearCalibrationSolver {
    pub fn new(options: LinearCalibrationOptions) -> Self {
        Self { options }
    }
}

/// Drop `z` from pattern points, rejecting anything off the `Z = 0` plane.
pub(crate) fn plane_coords(world: &[Pt3]) -> Result<Vec<Pt2>> {
    world
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if p.z.abs() > PLANE_EPS {
                Err(Error::invalid(format!(
                    "world point {i} is off the pattern plane (z = {})",
                    p.z
                )))
            } else {
                Ok(Pt2::new(p.x, p.y))
            }
        })
        .collect()
}

fn undistort_pixels(
    k: &FxFyCxCySkew<Real>,
    dist: &BrownConrady5<Real>,
    pixels: &[Pt2],
) -> Vec<Pt2> {
    pixels
        .iter()
        .map(|p| {
            let n = dist.undistort(&k.from_pixel(&p.coords));
            Pt2::from(k.to_pixel(&n))
        })
        .collect()
}

fn homographies(planes: &[Vec<Pt2>], pixels: &[Vec<Pt2>]) -> Result<Vec<Mat3>> {
    planes
        .iter()
        .zip(pixels)
        .enumerate()
        .map(|(i, (plane, px))| {
            dlt_homography(plane, px).map_err(|e| Error::solver(format!("view {i}: {e}")))
        })
        .collect()
}

/// Per-view RMS and overall RMS of reprojecting the pattern with `intrinsics`.
fn reprojection_errors(
    intrinsics: &Intrinsics,
    planes: &[Vec<Pt2>],
    pixels: &[Vec<Pt2>],
) -> Result<(Real, Vec<Real>)> {
    let k = intrinsics.k();
    let dist = intrinsics.distortion_model();
    let camera = intrinsics.camera();

    let mut sum_sq = 0.0;
    let mut count = 0usize;
    let mut per_view = Vec::with_capacity(planes.len());

    for (plane, px) in planes.iter().zip(pixels) {
        let undistorted = undistort_pixels(&k, &dist, px);
        let h = dlt_homography(plane, &undistorted).map_err(Error::solver)?;
        let pose = estimate_planar_pose_from_h(&intrinsics.camera_matrix, &h)
            .map_err(Error::solver)?;

        let mut view_sq = 0.0;
        for (p, obs) in plane.iter().zip(px) {
            let pc = pose.transform_point(&Pt3::new(p.x, p.y, 0.0));
            let proj = camera
                .project_point(&pc)
                .ok_or_else(|| Error::solver("pattern point behind camera"))?;
            view_sq += (proj - obs.coords).norm_squared();
        }
        per_view.push((view_sq / plane.len() as Real).sqrt());
        sum_sq += view_sq;
        count += plane.len();
    }

    Ok(((sum_sq / count as Real).sqrt(), per_view))
}

/// Intrinsics together with their reprojection errors.
#[derive(Debug, Clone)]
struct Fit {
    intrinsics: Intrinsics,
    rms: Real,
    per_view: Vec<Real>,
}

impl Fit {
    fn evaluate(intrinsics: Intrinsics, planes: &[Vec<Pt2>], pixels: &[Vec<Pt2>]) -> Result<Self> {
        let (rms, per_view) = reprojection_errors(&intrinsics, planes, pixels)?;
        Ok(Self {
            intrinsics,
            rms,
            per_view,
        })
    }

    /// Take `candidate` only if it exists and lowers the RMS.
    fn keep_better(self, candidate: Result<Fit>) -> Fit {
        match candidate {
            Ok(c) if c.rms < self.rms => c,
            Ok(c) => {
                debug!(
                    "distortion fit did not improve rms ({:.4} >= {:.4})",
                    c.rms, self.rms
                );
                self
            }
            Err(e) => {
                warn!("distortion refinement skipped: {e}");
                self
            }
        }
    }
}

impl LinearCalibrationSolver {
    fn intrinsics_from(&self, hs: &[Mat3]) -> Result<FxFyCxCySkew<Real>> {
        estimate_intrinsics_from_homographies(hs, self.options.zero_skew).map_err(Error::solver)
    }

    /// Alternate distortion fit and intrinsics re-estimate.
    fn refine_with_distortion(
        &self,
        mut k: FxFyCxCySkew<Real>,
        planes: &[Vec<Pt2>],
        pixels: &[Vec<Pt2>],
    ) -> Result<(FxFyCxCySkew<Real>, BrownConrady5<Real>)> {
        let fit_opts = DistortionFitOptions::default();
        let mut dist = BrownConrady5::from_coeffs(&[]);

        for round in 0..self.options.iterations {
            let current: Vec<Vec<Pt2>> = pixels
                .iter()
                .map(|px| undistort_pixels(&k, &dist, px))
                .collect();
            let hs = homographies(planes, &current)?;

            let views: Vec<DistortionView<'_>> = hs
                .iter()
                .zip(planes.iter().zip(pixels))
                .map(|(h, (plane, px))| DistortionView {
                    homography: *h,
                    plane_points: plane,
                    pixel_points: px,
                })
                .collect();
            dist = estimate_distortion_from_homographies(&k.k_matrix(), &views, fit_opts)
                .map_err(Error::solver)?;

            let undistorted: Vec<Vec<Pt2>> = pixels
                .iter()
                .map(|px| undistort_pixels(&k, &dist, px))
                .collect();
            k = self.intrinsics_from(&homographies(planes, &undistorted)?)?;
            debug!(
                "distortion round {round}: k1={:.5} k2={:.5} fx={:.2} fy={:.2}",
                dist.k1, dist.k2, k.fx, k.fy
            );
        }
        Ok((k, dist))
    }
}

impl CalibrationSolver for LinearCalibrationSolver {
    fn calibrate(
        &self,
        world_sets: &[Vec<Pt3>],
        image_sets: &[Vec<Pt2>],
        image_size: ImageSize,
    ) -> Result<CalibrationOutput> {
        if world_sets.len() != image_sets.len() {
            return Err(Error::invalid(format!(
                "{} world sets but {} image sets",
                world_sets.len(),
                image_sets.len()
            )));
        }
        if world_sets.is_empty() {
            return Err(Error::invalid("no views to calibrate from"));
        }
        for (i, (w, px)) in world_sets.iter().zip(image_sets).enumerate() {
            if w.len() != px.len() {
                return Err(Error::invalid(format!(
                    "view {i}: {} world points but {} image points",
                    w.len(),
                    px.len()
                )));
            }
        }

        let planes = world_sets
            .iter()
            .map(|w| plane_coords(w))
            .collect::<Result<Vec<_>>>()?;

        let k0 = self.intrinsics_from(&homographies(&planes, image_sets)?)?;
        let pinhole = Intrinsics::from_parts(&k0, &BrownConrady5::from_coeffs(&[]));
        let mut fit = Fit::evaluate(pinhole, &planes, image_sets)?;

        if self.options.fit_radial_distortion && self.options.iterations > 0 {
            let candidate = self
                .refine_with_distortion(k0, &planes, image_sets)
                .and_then(|(k, dist)| {
                    Fit::evaluate(Intrinsics::from_parts(&k, &dist), &planes, image_sets)
                });
            fit = fit.keep_better(candidate);
        }
        let Fit {
            intrinsics,
            rms,
            per_view,
        } = fit;

        let k = intrinsics.k();
        let (w, h) = (image_size.width as Real, image_size.height as Real);
        if !(0.0..=w).contains(&k.cx) || !(0.0..=h).contains(&k.cy) {
            warn!(
                "principal point ({:.1}, {:.1}) lies outside the {}x{} image",
                k.cx, k.cy, image_size.width, image_size.height
            );
        }
        debug!(
            "linear calibration: fx={:.2} fy={:.2} cx={:.2} cy={:.2} rms={rms:.4}",
            k.fx, k.fy, k.cx, k.cy
        );

        Ok(CalibrationOutput {
            intrinsics,
            rms_error: rms,
            per_view_errors: per_view,
        })
    }
}
