use nalgebra::{Point3, RealField, Translation3, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{BrownConrady5, DistortionModel, FxFyCxCySkew, IntrinsicsModel, Pinhole, ProjectionModel};
use crate::{Iso3, Mat3, Real, Vec3};

/// `pixel = K(distortion(projection(p_c)))`.
#[derive(Clone, Debug)]
pub struct Camera<S, P, D, K>
where
    S: RealField + Copy,
    P: ProjectionModel<S>,
    D: DistortionModel<S>,
    K: IntrinsicsModel<S>,
{
    pub proj: P,
    pub dist: D,
    pub k: K,
    _phantom: core::marker::PhantomData<S>,
}

impl<S, P, D, K> Camera<S, P, D, K>
where
    S: RealField + Copy,
    P: ProjectionModel<S>,
    D: DistortionModel<S>,
    K: IntrinsicsModel<S>,
{
    pub fn new(proj: P, dist: D, k: K) -> Self {
        Self {
            proj,
            dist,
            k,
            _phantom: core::marker::PhantomData,
        }
    }

    pub fn project_point_c(&self, p_c: &Vector3<S>) -> Option<Vector2<S>> {
        let n_u = self.proj.project_dir(p_c)?;
        let n_d = self.dist.distort(&n_u);
        Some(self.k.to_pixel(&n_d))
    }

    pub fn project_point(&self, p_c: &Point3<S>) -> Option<Vector2<S>> {
        self.project_point_c(&p_c.coords)
    }
}

/// Pinhole camera with Brown-Conrady distortion, the model calibration produces.
pub type PinholeCamera = Camera<Real, Pinhole, BrownConrady5<Real>, FxFyCxCySkew<Real>>;

/// Calibrated camera: 3×3 matrix plus distortion in `(k1, k2, p1, p2, k3, ...)` order.
///
/// Serialized with the camera matrix as row-major nested arrays.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "IntrinsicsRepr", into = "IntrinsicsRepr")]
pub struct Intrinsics {
    pub camera_matrix: Mat3,
    pub distortion: Vec<Real>,
}

#[derive(Serialize, Deserialize)]
struct IntrinsicsRepr {
    camera_matrix: [[Real; 3]; 3],
    distortion: Vec<Real>,
}

impl From<IntrinsicsRepr> for Intrinsics {
    fn from(r: IntrinsicsRepr) -> Self {
        let m = r.camera_matrix;
        Self {
            camera_matrix: Mat3::from_fn(|i, j| m[i][j]),
            distortion: r.distortion,
        }
    }
}

impl From<Intrinsics> for IntrinsicsRepr {
    fn from(i: Intrinsics) -> Self {
        let k = i.camera_matrix;
        Self {
            camera_matrix: std::array::from_fn(|r| std::array::from_fn(|c| k[(r, c)])),
            distortion: i.distortion,
        }
    }
}

impl Intrinsics {
    pub fn new(camera_matrix: Mat3, distortion: Vec<Real>) -> Self {
        Self {
            camera_matrix,
            distortion,
        }
    }

    pub fn from_parts(k: &FxFyCxCySkew<Real>, dist: &BrownConrady5<Real>) -> Self {
        Self::new(k.k_matrix(), dist.coeffs().to_vec())
    }

    pub fn k(&self) -> FxFyCxCySkew<Real> {
        FxFyCxCySkew::from_k_matrix(&self.camera_matrix)
    }

    pub fn distortion_model(&self) -> BrownConrady5<Real> {
        BrownConrady5::from_coeffs(&self.distortion)
    }

    pub fn camera(&self) -> PinholeCamera {
        Camera::new(Pinhole, self.distortion_model(), self.k())
    }
}

/// Target-to-camera pose as rotation vector (axis * angle) and translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl Pose {
    pub fn from_isometry(iso: &Iso3) -> Self {
        Self {
            rotation: iso.rotation.scaled_axis(),
            translation: iso.translation.vector,
        }
    }

    pub fn to_isometry(&self) -> Iso3 {
        Iso3::from_parts(
            Translation3::from(self.translation),
            UnitQuaternion::from_scaled_axis(self.rotation),
        )
    }
}
