use augment_core::{Iso3, Mat3, Real, Vec3};
use nalgebra::{Rotation3, Translation3, UnitQuaternion};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanarPoseError {
    #[error("intrinsics matrix is not invertible")]
    IntrinsicsNotInvertible,
    #[error("homography has vanishing rotation columns")]
    Degenerate,
    #[error("svd failed")]
    SvdFailed,
}

/// Decompose a plane-to-image homography into the pose of the `Z = 0` plane
/// in the camera frame.
///
/// The homography sign is chosen so that the plane lies in front of the
/// camera (`t.z > 0`).
pub fn estimate_planar_pose_from_h(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3, PlanarPoseError> {
    let k_inv = kmtx
        .try_inverse()
        .ok_or(PlanarPoseError::IntrinsicsNotInvertible)?;

    let k_inv_h1 = k_inv * hmtx.column(0);
    let k_inv_h2 = k_inv * hmtx.column(1);
    let k_inv_h3 = k_inv * hmtx.column(2);

    // Average the two column norms for the scale.
    let mean_norm = (k_inv_h1.norm() + k_inv_h2.norm()) * 0.5;
    if mean_norm <= Real::EPSILON {
        return Err(PlanarPoseError::Degenerate);
    }
    let mut lambda = 1.0 / mean_norm;
    if k_inv_h3.z * lambda < 0.0 {
        lambda = -lambda;
    }

    let r1: Vec3 = lambda * k_inv_h1;
    let r2: Vec3 = lambda * k_inv_h2;
    let r3 = r1.cross(&r2);

    let mut r_mat = Mat3::zeros();
    r_mat.set_column(0, &r1);
    r_mat.set_column(1, &r2);
    r_mat.set_column(2, &r3);

    // Nearest rotation (polar decomposition via SVD).
    let svd = r_mat.svd(true, true);
    let mut u = svd.u.ok_or(PlanarPoseError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(PlanarPoseError::SvdFailed)?;
    if (u * v_t).determinant() < 0.0 {
        u.column_mut(2).neg_mut();
    }
    let r_orth = u * v_t;

    let t: Vec3 = lambda * k_inv_h3;
    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
    Ok(Iso3::from_parts(Translation3::from(t), rot))
}
