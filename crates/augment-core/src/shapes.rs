//! Primitive figures built on the pattern plane.

use crate::transform::{rotate_z_about, Pivot};
use crate::{drop_w, lift_point, Pt3, Real};

/// Equilateral triangle resting on its base.
///
/// Returns `[bottom_left, apex, bottom_right, centroid]`.
pub fn eq_triangle_vertices_and_centroid(side: Real, bottom_left: Pt3) -> [Pt3; 4] {
    let half = side / 2.0;
    let height = (side * side - half * half).sqrt();
    let apex = Pt3::new(bottom_left.x + half, bottom_left.y + height, bottom_left.z);
    let bottom_right = Pt3::new(bottom_left.x + side, bottom_left.y, bottom_left.z);
    let centroid = Pt3::from((bottom_left.coords + apex.coords + bottom_right.coords) / 3.0);
    [bottom_left, apex, bottom_right, centroid]
}

/// Two overlapping triangles: the base one and a copy spun by `theta_deg`
/// about the base centroid.
pub fn star_coordinates(side: Real, bottom_left: Pt3, theta_deg: Real) -> [[Pt3; 3]; 2] {
    let [a, b, c, centroid] = eq_triangle_vertices_and_centroid(side, bottom_left);
    let base = [a, b, c];
    let spun = base.map(|p| {
        drop_w(&rotate_z_about(
            &lift_point(&p),
            theta_deg,
            Pivot::Point(centroid),
        ))
    });
    [base, spun]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_triangle_apex() {
        let tri = eq_triangle_vertices_and_centroid(2.0, Pt3::origin());
        assert!((tri[1] - Pt3::new(1.0, 3.0_f64.sqrt(), 0.0)).norm() < 1e-12);
        assert_eq!(tri[2], Pt3::new(2.0, 0.0, 0.0));
        assert!((tri[3] - Pt3::new(1.0, 3.0_f64.sqrt() / 3.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn sides_are_equal() {
        let [a, b, c, _] = eq_triangle_vertices_and_centroid(3.0, Pt3::new(-1.0, 2.0, 0.5));
        let ab = (b - a).norm();
        let bc = (c - b).norm();
        let ca = (a - c).norm();
        assert!((ab - 3.0).abs() < 1e-12 && (bc - 3.0).abs() < 1e-12 && (ca - 3.0).abs() < 1e-12);
    }

    #[test]
    fn zero_angle_star_is_degenerate() {
        let [first, second] = star_coordinates(2.0, Pt3::new(0.4, -1.0, 0.0), 0.0);
        for (p, q) in first.iter().zip(second.iter()) {
            assert!((p - q).norm() < 1e-12);
        }
    }

    #[test]
    fn half_turn_star_flips_about_centroid() {
        let [base, spun] = star_coordinates(2.0, Pt3::origin(), 180.0);
        let centroid = eq_triangle_vertices_and_centroid(2.0, Pt3::origin())[3];
        for (p, q) in base.iter().zip(spun.iter()) {
            let mid = Pt3::from((p.coords + q.coords) / 2.0);
            assert!((mid - centroid).norm() < 1e-12);
        }
    }
}
