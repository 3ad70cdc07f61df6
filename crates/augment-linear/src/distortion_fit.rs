//! Linear Brown-Conrady coefficient fit from homography residuals.
//!
//! Given `K` and per-view homographies computed from the raw (distorted)
//! pixels, the residual between each observation and its homography
//! prediction is modelled in normalized coordinates as
//!
//! ```text
//! n_obs - n_ideal = n_ideal * (k1 r² + k2 r⁴ + k3 r⁶) + tangential(p1, p2)
//! ```
//!
//! which is linear in the coefficients and solved in least squares. The
//! estimate is meant to seed or slightly correct a closed-form calibration,
//! not to replace a non-linear refinement.

use augment_core::{BrownConrady5, Mat3, Pt2, Real, Vec2};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::homography::apply_homography;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum DistortionFitError {
    #[error("need at least {0} points for distortion estimation, got {1}")]
    NotEnoughPoints(usize, usize),
    #[error("svd failed during distortion estimation")]
    SvdFailed,
    #[error("intrinsics matrix is not invertible")]
    IntrinsicsNotInvertible,
    /// All points sit near the principal point; radial terms are unobservable.
    #[error("degenerate configuration: all points near image center")]
    DegenerateConfiguration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionFitOptions {
    /// Keep p1 = p2 = 0.
    pub fix_tangential: bool,
    /// Keep k3 = 0; the r⁶ term overfits easily on a single planar target.
    pub fix_k3: bool,
    /// Undistortion iterations stored in the returned model.
    pub iters: u32,
}

impl Default for DistortionFitOptions {
    fn default() -> Self {
        Self {
            fix_tangential: true,
            fix_k3: true,
            iters: 8,
        }
    }
}

/// One view: homography plus the plane/pixel correspondences it was fit to.
#[derive(Debug, Clone)]
pub struct DistortionView<'a> {
    pub homography: Mat3,
    pub plane_points: &'a [Pt2],
    pub pixel_points: &'a [Pt2],
}

pub fn estimate_distortion_from_homographies(
    kmtx: &Mat3,
    views: &[DistortionView<'_>],
    opts: DistortionFitOptions,
) -> Result<BrownConrady5<Real>, DistortionFitError> {
    let n_params = 2 + usize::from(!opts.fix_k3) + 2 * usize::from(!opts.fix_tangential);
    let total: usize = views.iter().map(|v| v.plane_points.len()).sum();
    let min_points = n_params.div_ceil(2) + 2;
    if total < min_points {
        return Err(DistortionFitError::NotEnoughPoints(min_points, total));
    }

    let k_inv = kmtx
        .try_inverse()
        .ok_or(DistortionFitError::IntrinsicsNotInvertible)?;
    let to_normalized = |p: &Pt2| {
        let v = k_inv * nalgebra::Vector3::new(p.x, p.y, 1.0);
        Vec2::new(v.x / v.z, v.y / v.z)
    };

    let mut a = DMatrix::<Real>::zeros(2 * total, n_params);
    let mut b = DVector::<Real>::zeros(2 * total);
    let mut max_r2: Real = 0.0;
    let mut row = 0;

    for view in views {
        for (plane_pt, pixel_obs) in view.plane_points.iter().zip(view.pixel_points) {
            let n_ideal = to_normalized(&apply_homography(&view.homography, plane_pt));
            let residual = to_normalized(pixel_obs) - n_ideal;

            let (x, y) = (n_ideal.x, n_ideal.y);
            let r2 = x * x + y * y;
            max_r2 = max_r2.max(r2);

            let mut col = 0;
            for power in [r2, r2 * r2] {
                a[(row, col)] = x * power;
                a[(row + 1, col)] = y * power;
                col += 1;
            }
            if !opts.fix_k3 {
                let r6 = r2 * r2 * r2;
                a[(row, col)] = x * r6;
                a[(row + 1, col)] = y * r6;
                col += 1;
            }
            if !opts.fix_tangential {
                a[(row, col)] = 2.0 * x * y;
                a[(row + 1, col)] = r2 + 2.0 * y * y;
                a[(row, col + 1)] = r2 + 2.0 * x * x;
                a[(row + 1, col + 1)] = 2.0 * x * y;
            }

            b[row] = residual.x;
            b[row + 1] = residual.y;
            row += 2;
        }
    }

    if max_r2 < 1e-6 {
        return Err(DistortionFitError::DegenerateConfiguration);
    }

    let x = a
        .svd(true, true)
        .solve(&b, 1e-12)
        .map_err(|_| DistortionFitError::SvdFailed)?;

    let mut coeffs = x.iter().copied();
    let mut next = || coeffs.next().unwrap_or(0.0);
    let k1 = next();
    let k2 = next();
    let k3 = if opts.fix_k3 { 0.0 } else { next() };
    let (p1, p2) = if opts.fix_tangential {
        (0.0, 0.0)
    } else {
        (next(), next())
    };

    Ok(BrownConrady5 {
        k1,
        k2,
        k3,
        p1,
        p2,
        iters: opts.iters,
    })
}
