//! Zhang's closed-form intrinsics from plane homographies.

use augment_core::{FxFyCxCySkew, Mat3, Real};
use nalgebra::{DMatrix, SVector};
use thiserror::Error;

use crate::math::null_vector;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ZhangError {
    #[error("need at least {need} homographies, got {got}")]
    NotEnoughViews { got: usize, need: usize },
    #[error("svd failed")]
    SvdFailed,
    #[error("degenerate view configuration")]
    Degenerate,
}

/// Build the 6-vector `v_ij(H)` from columns `i` and `j` of `H`.
fn v_ij(h: &Mat3, i: usize, j: usize) -> SVector<Real, 6> {
    let hi = h.column(i);
    let hj = h.column(j);

    SVector::<Real, 6>::from_row_slice(&[
        hi[0] * hj[0],
        hi[0] * hj[1] + hi[1] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Estimate `K` from homographies of a `Z = 0` plane.
///
/// With `zero_skew` the constraint `B12 = 0` is appended, which makes two
/// views sufficient; otherwise three are required.
pub fn estimate_intrinsics_from_homographies(
    hs: &[Mat3],
    zero_skew: bool,
) -> Result<FxFyCxCySkew<Real>, ZhangError> {
    let need = if zero_skew { 2 } else { 3 };
    if hs.len() < need {
        return Err(ZhangError::NotEnoughViews {
            got: hs.len(),
            need,
        });
    }

    let rows = 2 * hs.len() + usize::from(zero_skew);
    let mut v = DMatrix::<Real>::zeros(rows, 6);
    for (k, h) in hs.iter().enumerate() {
        // Column scale of H is arbitrary; normalize so rows are comparable.
        let h = h / h.column(0).norm().max(h.column(1).norm());
        let v11 = v_ij(&h, 0, 0);
        let v22 = v_ij(&h, 1, 1);
        let v12 = v_ij(&h, 0, 1);
        v.row_mut(2 * k).copy_from(&v12.transpose());
        v.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }
    if zero_skew {
        v[(rows - 1, 1)] = 1.0;
    }

    let mut b = null_vector(&v).ok_or(ZhangError::SvdFailed)?;
    // B = K^-T K^-1 is positive definite up to sign.
    if b[0] < 0.0 {
        b = -b;
    }
    let (b11, b12, b22, b13, b23, b33) = (b[0], b[1], b[2], b[3], b[4], b[5]);

    let denom = b11 * b22 - b12 * b12;
    let denom_norm = b11 * b11 + b22 * b22;
    if denom_norm <= 0.0 || denom.abs() / denom_norm < 1e-6 || b11 <= 0.0 {
        return Err(ZhangError::Degenerate);
    }

    let v0 = (b12 * b13 - b11 * b23) / denom;
    let lambda = b33 - (b13 * b13 + v0 * (b12 * b13 - b11 * b23)) / b11;
    if lambda <= 0.0 || denom <= 0.0 {
        return Err(ZhangError::Degenerate);
    }

    let alpha = (lambda / b11).sqrt();
    let beta = (lambda * b11 / denom).sqrt();
    let gamma = -b12 * alpha * alpha * beta / lambda;
    let u0 = gamma * v0 / beta - b13 * alpha * alpha / lambda;

    Ok(FxFyCxCySkew {
        fx: alpha,
        fy: beta,
        cx: u0,
        cy: v0,
        skew: if zero_skew { 0.0 } else { gamma },
    })
}
