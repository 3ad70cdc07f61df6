//! Numerical conditioning helpers shared by the linear solvers.
//!
//! # Example
//!
//! ```
//! use augment_linear::math::normalize_points_2d;
//! use augment_core::Pt2;
//!
//! let points = vec![
//!     Pt2::new(100.0, 200.0),
//!     Pt2::new(150.0, 250.0),
//!     Pt2::new(120.0, 220.0),
//! ];
//!
//! let (normalized, transform) = normalize_points_2d(&points).unwrap();
//! assert_eq!(normalized.len(), 3);
//! assert_eq!(transform[(2, 2)], 1.0);
//! ```

use augment_core::{Mat3, Pt2, Real};
use nalgebra::{DMatrix, DVector};

/// Hartley normalization for 2D points.
///
/// Centers points at the origin and scales so that the mean distance from
/// the origin is `√2`. Returns the normalized points and `T` such that
/// `p_norm = T * p_homogeneous`, or `None` if the input is empty or all
/// points coincide.
///
/// # References
///
/// Hartley & Zisserman, "Multiple View Geometry in Computer Vision", 2nd ed.,
/// Algorithm 4.2 (Normalized DLT)
pub fn normalize_points_2d(points: &[Pt2]) -> Option<(Vec<Pt2>, Mat3)> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as Real;
    let cx = points.iter().map(|p| p.x).sum::<Real>() / n;
    let cy = points.iter().map(|p| p.y).sum::<Real>() / n;

    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<Real>()
        / n;

    if mean_dist <= Real::EPSILON {
        return None;
    }

    let scale = (2.0 as Real).sqrt() / mean_dist;
    let t = Mat3::new(
        scale,
        0.0,
        -scale * cx,
        0.0,
        scale,
        -scale * cy,
        0.0,
        0.0,
        1.0,
    );

    let norm = points
        .iter()
        .map(|p| Pt2::new((p.x - cx) * scale, (p.y - cy) * scale))
        .collect();

    Some((norm, t))
}

/// Unit vector minimizing `|A x|`, i.e. the right singular vector of the
/// smallest singular value.
///
/// Underdetermined systems are padded with zero rows so that the full right
/// null space is available. Returns `None` if the SVD does not provide `V^T`.
pub fn null_vector(a: &DMatrix<Real>) -> Option<DVector<Real>> {
    let cols = a.ncols();
    let padded;
    let a = if a.nrows() < cols {
        padded = a.clone().resize_vertically(cols, 0.0);
        &padded
    } else {
        a
    };

    let svd = a.clone().svd(false, true);
    let v_t = svd.v_t?;
    let idx = svd.singular_values.imin();
    Some(v_t.row(idx).transpose())
}
