//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental linear algebra types used throughout
//! the workspace and helpers for lifting 3D points to homogeneous coordinates.

use nalgebra::{Isometry3, Matrix3, Matrix4, Point2, Point3, Vector2, Vector3, Vector4};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 4D vector with [`Real`] components (homogeneous 3D points).
pub type Vec4 = Vector4<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Lift a 3D point to a homogeneous 4-vector with `w = 1`.
pub fn lift_point(p: &Pt3) -> Vec4 {
    Vec4::new(p.x, p.y, p.z, 1.0)
}

/// Drop the `w` component of a homogeneous 4-vector.
///
/// No perspective division is performed; callers that need it must divide
/// through before calling.
pub fn drop_w(v: &Vec4) -> Pt3 {
    Pt3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_w_keeps_raw_components() {
        let v = Vec4::new(2.0, 4.0, 6.0, 2.0);
        assert_eq!(drop_w(&v), Pt3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn lift_then_drop_is_identity() {
        let p = Pt3::new(1.5, -2.0, 0.25);
        assert_eq!(drop_w(&lift_point(&p)), p);
    }
}
