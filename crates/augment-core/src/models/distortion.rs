use nalgebra::{RealField, Vector2};
use serde::{Deserialize, Serialize};

/// Lens distortion applied in normalized image coordinates.
pub trait DistortionModel<S: RealField + Copy> {
    fn distort(&self, n_undist: &Vector2<S>) -> Vector2<S>;
    fn undistort(&self, n_dist: &Vector2<S>) -> Vector2<S>;
}

/// Brown-Conrady radial (k1, k2, k3) and tangential (p1, p2) model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BrownConrady5<S: RealField> {
    pub k1: S,
    pub k2: S,
    pub k3: S,
    pub p1: S,
    pub p2: S,
    /// Fixed-point iterations used by `undistort` (0 means 8).
    pub iters: u32,
}

impl<S: RealField + Copy> BrownConrady5<S> {
    /// Build from a coefficient list in `(k1, k2, p1, p2, k3)` order.
    ///
    /// Missing trailing coefficients are zero; anything past `k3` is ignored.
    pub fn from_coeffs(coeffs: &[S]) -> Self {
        let at = |i: usize| coeffs.get(i).copied().unwrap_or_else(S::zero);
        Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
            iters: 8,
        }
    }

    /// Coefficients in `(k1, k2, p1, p2, k3)` order.
    pub fn coeffs(&self) -> [S; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }

    fn distort_impl(&self, x: S, y: S) -> (S, S) {
        let r2 = x * x + y * y;
        let r4 = r2 * r2;
        let r6 = r4 * r2;

        let radial = S::one() + self.k1 * r2 + self.k2 * r4 + self.k3 * r6;

        let two = S::one() + S::one();
        let xy = x * y;

        let x_tan = two * self.p1 * xy + self.p2 * (r2 + two * x * x);
        let y_tan = self.p1 * (r2 + two * y * y) + two * self.p2 * xy;

        (x * radial + x_tan, y * radial + y_tan)
    }
}

impl<S: RealField + Copy> DistortionModel<S> for BrownConrady5<S> {
    fn distort(&self, n_undist: &Vector2<S>) -> Vector2<S> {
        let (xd, yd) = self.distort_impl(n_undist.x, n_undist.y);
        Vector2::new(xd, yd)
    }

    fn undistort(&self, n_dist: &Vector2<S>) -> Vector2<S> {
        let mut x = n_dist.x;
        let mut y = n_dist.y;

        let iters = if self.iters == 0 { 8 } else { self.iters };
        for _ in 0..iters {
            let (xd, yd) = self.distort_impl(x, y);
            x -= xd - n_dist.x;
            y -= yd - n_dist.y;
        }
        Vector2::new(x, y)
    }
}
