//! Elementary rotation/scale matrices and homogeneous composition.
//!
//! Rotations are right-handed and take radians, except [`rotate_z_about`]
//! which works in degrees because that is how animated figures are driven.
//!
//! A homogeneous transform is laid out as
//! ```text
//! [ R00 R01 R02 t0 ]
//! [ R10 R11 R12 t1 ]   * scale
//! [ R20 R21 R22 t2 ]
//! [  0   0   0  1  ]
//! ```

use nalgebra::DMatrix;

use crate::{Error, Mat3, Mat4, Pt3, Real, Result, Vec3, Vec4};

/// Diagonal 3×3 scale matrix.
pub fn uniform_scale(factor: Real) -> Mat3 {
    Mat3::from_diagonal_element(factor)
}

pub fn rotate_x(theta: Real) -> Mat3 {
    let (s, c) = theta.sin_cos();
    Mat3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

pub fn rotate_y(theta: Real) -> Mat3 {
    let (s, c) = theta.sin_cos();
    Mat3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

pub fn rotate_z(theta: Real) -> Mat3 {
    let (s, c) = theta.sin_cos();
    Mat3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Build `scale * [R | t; 0 0 0 1]`.
///
/// `translation` must hold exactly three components.
pub fn compose_homogeneous(rotation: &Mat3, translation: &[Real], scale: Real) -> Result<Mat4> {
    let [tx, ty, tz] = translation else {
        return Err(Error::invalid(format!(
            "translation must have 3 components, got {}",
            translation.len()
        )));
    };

    let mut h = Mat4::identity();
    h.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    h[(0, 3)] = *tx;
    h[(1, 3)] = *ty;
    h[(2, 3)] = *tz;
    Ok(h * scale)
}

/// [`compose_homogeneous`] for a dynamically sized rotation operand.
pub fn compose_homogeneous_dyn(
    rotation: &DMatrix<Real>,
    translation: &[Real],
    scale: Real,
) -> Result<Mat4> {
    if rotation.shape() != (3, 3) {
        return Err(Error::invalid(format!(
            "rotation must be 3x3, got {}x{}",
            rotation.nrows(),
            rotation.ncols()
        )));
    }
    let r = rotation.fixed_view::<3, 3>(0, 0).into_owned();
    compose_homogeneous(&r, translation, scale)
}

/// Rigid transform with unit scale.
pub fn compose_rigid(rotation: &Mat3, translation: &Vec3) -> Mat4 {
    let mut h = Mat4::identity();
    h.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    h.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    h
}

pub fn translation_h(t: &Vec3) -> Mat4 {
    Mat4::new_translation(t)
}

/// Uniform scale that leaves `w` untouched.
pub fn scaling_h(s: Real) -> Mat4 {
    let mut h = Mat4::new_scaling(s);
    h[(3, 3)] = 1.0;
    h
}

pub fn rotation_z_h(theta: Real) -> Mat4 {
    compose_rigid(&rotate_z(theta), &Vec3::zeros())
}

/// Centre of rotation for [`rotate_z_about`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pivot {
    /// Rotate about the Z axis through the coordinate origin.
    Origin,
    /// Rotate about the Z-parallel axis through this point.
    Point(Pt3),
}

/// Rotate a homogeneous point about a Z-parallel axis by `theta_deg` degrees.
pub fn rotate_z_about(point: &Vec4, theta_deg: Real, pivot: Pivot) -> Vec4 {
    let rz = rotation_z_h(theta_deg.to_radians());
    match pivot {
        Pivot::Origin => rz * point,
        Pivot::Point(p) => {
            let to_pivot = translation_h(&p.coords);
            let from_pivot = translation_h(&-p.coords);
            to_pivot * rz * from_pivot * point
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{drop_w, lift_point};
    use std::f64::consts::FRAC_PI_2;

    fn close(a: &Mat3, b: &Mat3) -> bool {
        (a - b).abs().max() < 1e-12
    }

    #[test]
    fn rotations_are_identity_at_zero() {
        assert!(close(&rotate_x(0.0), &Mat3::identity()));
        assert!(close(&rotate_y(0.0), &Mat3::identity()));
        assert!(close(&rotate_z(0.0), &Mat3::identity()));
    }

    #[test]
    fn rotations_are_right_handed() {
        let ex = Vec3::x();
        let ey = Vec3::y();
        let ez = Vec3::z();
        assert!((rotate_z(FRAC_PI_2) * ex - ey).norm() < 1e-12);
        assert!((rotate_x(FRAC_PI_2) * ey - ez).norm() < 1e-12);
        assert!((rotate_y(FRAC_PI_2) * ez - ex).norm() < 1e-12);
    }

    #[test]
    fn translation_only_maps_origin() {
        let h = compose_homogeneous(&Mat3::identity(), &[1.5, -2.0, 3.0], 1.0).unwrap();
        let moved = h * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((moved - Vec4::new(1.5, -2.0, 3.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn scale_multiplies_whole_matrix() {
        let h = compose_homogeneous(&Mat3::identity(), &[1.0, 0.0, 0.0], 5.0).unwrap();
        assert_eq!(h[(0, 0)], 5.0);
        assert_eq!(h[(0, 3)], 5.0);
        assert_eq!(h[(3, 3)], 5.0);
    }

    #[test]
    fn short_translation_is_rejected() {
        let err = compose_homogeneous(&Mat3::identity(), &[1.0, 2.0], 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(compose_homogeneous(&Mat3::identity(), &[0.0; 4], 1.0).is_err());
    }

    #[test]
    fn dyn_rotation_must_be_square_three() {
        let bad = DMatrix::<Real>::identity(4, 4);
        assert!(matches!(
            compose_homogeneous_dyn(&bad, &[0.0; 3], 1.0),
            Err(Error::InvalidArgument(_))
        ));

        let good = DMatrix::<Real>::identity(3, 3);
        let h = compose_homogeneous_dyn(&good, &[0.0, 1.0, 2.0], 1.0).unwrap();
        assert_eq!(h[(2, 3)], 2.0);
    }

    #[test]
    fn scaling_h_keeps_w() {
        let p = scaling_h(2.0) * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert_eq!(p, Vec4::new(2.0, 4.0, 6.0, 1.0));
    }

    #[test]
    fn pivot_is_fixed_point() {
        let pivot = Pt3::new(1.0, 0.577, 0.0);
        let out = rotate_z_about(&lift_point(&pivot), 37.0, Pivot::Point(pivot));
        assert!((drop_w(&out) - pivot).norm() < 1e-12);

        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let out = rotate_z_about(&origin, 120.0, Pivot::Origin);
        assert!((out - origin).norm() < 1e-12);
    }

    #[test]
    fn rotate_about_point_uses_degrees() {
        let pivot = Pt3::new(1.0, 1.0, 0.0);
        let p = lift_point(&Pt3::new(2.0, 1.0, 0.0));
        let out = drop_w(&rotate_z_about(&p, 90.0, Pivot::Point(pivot)));
        assert!((out - Pt3::new(1.0, 2.0, 0.0)).norm() < 1e-12, "{out}");
    }
}
