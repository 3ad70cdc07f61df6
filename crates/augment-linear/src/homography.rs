//! Plane-to-image homography via normalized DLT.

use augment_core::{Mat3, Pt2, Real};
use nalgebra::DMatrix;
use thiserror::Error;

use crate::math::{normalize_points_2d, null_vector};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("point sets differ in length: {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("degenerate point configuration")]
    Degenerate,
    #[error("svd failed")]
    SvdFailed,
}

/// Estimate `H` such that `image ~ H * [plane; 1]`.
///
/// Both point sets are Hartley-normalized before building the DLT system;
/// the result is denormalized and scaled so that `H[2,2] = 1` when possible.
pub fn dlt_homography(plane: &[Pt2], image: &[Pt2]) -> Result<Mat3, HomographyError> {
    let n = plane.len();
    if image.len() != n {
        return Err(HomographyError::LengthMismatch(n, image.len()));
    }
    if n < 4 {
        return Err(HomographyError::NotEnoughPoints(n));
    }

    let (plane_n, t_plane) = normalize_points_2d(plane).ok_or(HomographyError::Degenerate)?;
    let (image_n, t_image) = normalize_points_2d(image).ok_or(HomographyError::Degenerate)?;

    let mut a = DMatrix::<Real>::zeros(2 * n, 9);
    for (i, (pw, pi)) in plane_n.iter().zip(&image_n).enumerate() {
        let (x, y) = (pw.x, pw.y);
        let (u, v) = (pi.x, pi.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    let h = null_vector(&a).ok_or(HomographyError::SvdFailed)?;
    let h_norm = Mat3::from_row_slice(h.as_slice());

    let t_image_inv = t_image.try_inverse().ok_or(HomographyError::Degenerate)?;
    let mut h_mat = t_image_inv * h_norm * t_plane;

    let scale = h_mat[(2, 2)];
    if scale.abs() > Real::EPSILON {
        h_mat /= scale;
    }
    Ok(h_mat)
}

/// Apply `H` to a plane point.
pub fn apply_homography(h: &Mat3, p: &Pt2) -> Pt2 {
    let v = h * nalgebra::Vector3::new(p.x, p.y, 1.0);
    Pt2::new(v.x / v.z, v.y / v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_to_scaled_square() {
        let w = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        let img: Vec<Pt2> = w.iter().map(|p| Pt2::new(2.0 * p.x + 3.0, 2.0 * p.y)).collect();

        let h = dlt_homography(&w, &img).unwrap();
        assert!((h[(0, 0)] - 2.0).abs() < 1e-9, "{h}");
        assert!((h[(0, 2)] - 3.0).abs() < 1e-9, "{h}");
    }

    #[test]
    fn projective_map_is_recovered() {
        let h_gt = Mat3::new(1.2, 0.1, 300.0, -0.05, 0.9, 200.0, 1e-4, -2e-4, 1.0);
        let w: Vec<Pt2> = (0..4)
            .flat_map(|x| (0..3).map(move |y| Pt2::new(x as Real * 10.0, -(y as Real) * 10.0)))
            .collect();
        let img: Vec<Pt2> = w.iter().map(|p| apply_homography(&h_gt, p)).collect();

        let h = dlt_homography(&w, &img).unwrap();
        for (p, q) in w.iter().zip(&img) {
            assert!((apply_homography(&h, p) - q).norm() < 1e-6);
        }
    }

    #[test]
    fn input_validation() {
        let p = vec![Pt2::new(0.0, 0.0); 3];
        assert_eq!(
            dlt_homography(&p, &p).unwrap_err(),
            HomographyError::NotEnoughPoints(3)
        );
        let q = vec![Pt2::new(0.0, 0.0); 4];
        assert!(matches!(
            dlt_homography(&q, &p),
            Err(HomographyError::LengthMismatch(4, 3))
        ));
        assert_eq!(
            dlt_homography(&q, &q).unwrap_err(),
            HomographyError::Degenerate
        );
    }
}
