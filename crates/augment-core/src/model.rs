//! Object models placed on the reference pattern.
//!
//! An [`ObjectModel`] is a closed set of figure kinds sharing one mutable
//! vertex list. Vertices are only changed through the `apply_*` family; the
//! `load_*` family replaces the whole model and leaves it untouched on error.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::mesh::{self, MeshData};
use crate::shapes::star_coordinates;
use crate::transform::{compose_homogeneous, rotate_x};
use crate::{drop_w, lift_point, Error, Mat3, Mat4, PatternSize, Pt3, Real, Result};

/// Default scale applied by [`ObjectModel::upright_mesh`].
pub const DEFAULT_MESH_SCALE: Real = 5.0;

/// Figure kind and the data that only that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    /// Four extremal pattern corners.
    CornerMarkers,
    /// Origin followed by the `+X`, `+Y` and `-Z` unit points.
    AxisMarkers,
    /// Triangle mesh; indices are 1-based into the vertex list.
    Mesh { faces: Vec<[usize; 3]> },
    /// Two triangles of three vertices each.
    AnimatedPolygonPair,
}

/// Copyable discriminator of [`ModelKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTag {
    CornerMarkers,
    AxisMarkers,
    Mesh,
    AnimatedPolygonPair,
}

impl ModelKind {
    pub fn tag(&self) -> ModelTag {
        match self {
            Self::CornerMarkers => ModelTag::CornerMarkers,
            Self::AxisMarkers => ModelTag::AxisMarkers,
            Self::Mesh { .. } => ModelTag::Mesh,
            Self::AnimatedPolygonPair => ModelTag::AnimatedPolygonPair,
        }
    }

    /// Number of points the render routine for this kind expects, or `None`
    /// when it follows the vertex list (meshes).
    pub fn expected_point_count(&self) -> Option<usize> {
        match self {
            Self::CornerMarkers | Self::AxisMarkers => Some(4),
            Self::AnimatedPolygonPair => Some(6),
            Self::Mesh { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectModel {
    pub kind: ModelKind,
    vertices: Vec<Pt3>,
}

impl ObjectModel {
    pub fn corner_markers(pattern: &PatternSize) -> Result<Self> {
        Ok(Self {
            kind: ModelKind::CornerMarkers,
            vertices: pattern.extremal_corners()?.to_vec(),
        })
    }

    pub fn axis_markers() -> Self {
        Self {
            kind: ModelKind::AxisMarkers,
            vertices: vec![
                Pt3::origin(),
                Pt3::new(1.0, 0.0, 0.0),
                Pt3::new(0.0, 1.0, 0.0),
                Pt3::new(0.0, 0.0, -1.0),
            ],
        }
    }

    /// Every face index must lie in `1..=vertices.len()`.
    pub fn from_mesh(mesh: MeshData) -> Result<Self> {
        let n = mesh.vertices.len();
        if let Some((f, bad)) = mesh
            .faces
            .iter()
            .enumerate()
            .find_map(|(f, face)| face.iter().find(|&&i| i == 0 || i > n).map(|&i| (f, i)))
        {
            return Err(Error::invalid(format!(
                "face {f} references vertex {bad} outside 1..={n}"
            )));
        }
        Ok(Self {
            kind: ModelKind::Mesh { faces: mesh.faces },
            vertices: mesh.vertices,
        })
    }

    pub fn mesh_from_path(path: impl AsRef<Path>) -> Result<Self> {
        mesh::load_mesh(path).and_then(Self::from_mesh)
    }

    /// Load a Y-up mesh, stand it on the pattern plane and scale it.
    pub fn upright_mesh(path: impl AsRef<Path>, scale: Real) -> Result<Self> {
        let mut model = Self::mesh_from_path(path)?;
        let upright = compose_homogeneous(&rotate_x(-FRAC_PI_2), &[0.0, 0.0, 0.0], scale)?;
        model.apply_homogeneous(&upright);
        Ok(model)
    }

    pub fn star_pair(side: Real, bottom_left: Pt3, theta_deg: Real) -> Self {
        let [first, second] = star_coordinates(side, bottom_left, theta_deg);
        Self {
            kind: ModelKind::AnimatedPolygonPair,
            vertices: first.into_iter().chain(second).collect(),
        }
    }

    pub fn load_corner_markers(&mut self, pattern: &PatternSize) -> Result<()> {
        *self = Self::corner_markers(pattern)?;
        Ok(())
    }

    pub fn load_axis_markers(&mut self) {
        *self = Self::axis_markers();
    }

    /// Replace this model with the mesh at `path`.
    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<()> {
        *self = Self::mesh_from_path(path)?;
        Ok(())
    }

    pub fn vertices(&self) -> &[Pt3] {
        &self.vertices
    }

    pub fn tag(&self) -> ModelTag {
        self.kind.tag()
    }

    /// Apply a dynamically sized transform: 4×4 when `homogeneous`, else 3×3.
    pub fn apply_transform(&mut self, matrix: &DMatrix<Real>, homogeneous: bool) -> Result<()> {
        let want = if homogeneous { 4 } else { 3 };
        if matrix.shape() != (want, want) {
            return Err(Error::invalid(format!(
                "expected {want}x{want} transform, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        if homogeneous {
            let m: Mat4 = matrix.fixed_view::<4, 4>(0, 0).into_owned();
            self.apply_homogeneous(&m);
        } else {
            let m: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
            self.apply_linear(&m);
        }
        Ok(())
    }

    pub fn apply_linear(&mut self, m: &Mat3) {
        for v in &mut self.vertices {
            *v = Pt3::from(m * v.coords);
        }
    }

    /// Lift to `w = 1`, multiply, keep the first three components as-is.
    pub fn apply_homogeneous(&mut self, m: &Mat4) {
        for v in &mut self.vertices {
            *v = drop_w(&(m * lift_point(v)));
        }
        debug!("applied homogeneous transform to {} vertices", self.vertices.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{rotate_z, uniform_scale};

    #[test]
    fn corner_markers_match_pattern() {
        let model = ObjectModel::corner_markers(&PatternSize::new(6, 9).unwrap()).unwrap();
        assert_eq!(model.tag(), ModelTag::CornerMarkers);
        assert_eq!(
            model.vertices(),
            &[
                Pt3::new(0.0, 0.0, 0.0),
                Pt3::new(8.0, 0.0, 0.0),
                Pt3::new(0.0, -5.0, 0.0),
                Pt3::new(8.0, -5.0, 0.0),
            ]
        );
    }

    #[test]
    fn point_count_contracts() {
        let axes = ObjectModel::axis_markers();
        assert_eq!(axes.kind.expected_point_count(), Some(axes.vertices().len()));
        let star = ObjectModel::star_pair(2.0, Pt3::origin(), 30.0);
        assert_eq!(star.kind.expected_point_count(), Some(6));
        assert_eq!(star.vertices().len(), 6);
        let mesh = ObjectModel::from_mesh(MeshData::default()).unwrap();
        assert_eq!(mesh.kind.expected_point_count(), None);
    }

    #[test]
    fn mesh_indices_are_range_checked() {
        let vertices = vec![Pt3::origin(), Pt3::new(1.0, 0.0, 0.0), Pt3::new(0.0, 1.0, 0.0)];
        let ok = MeshData {
            vertices: vertices.clone(),
            faces: vec![[1, 2, 3]],
        };
        assert!(ObjectModel::from_mesh(ok).is_ok());

        for bad in [[1, 2, 4], [0, 1, 2]] {
            let mesh = MeshData {
                vertices: vertices.clone(),
                faces: vec![[1, 2, 3], bad],
            };
            assert!(matches!(
                ObjectModel::from_mesh(mesh),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn identity_is_noop() {
        let mut model = ObjectModel::axis_markers();
        let before = model.clone();
        model.apply_transform(&DMatrix::identity(4, 4), true).unwrap();
        assert_eq!(model, before);
        model.apply_transform(&DMatrix::identity(3, 3), false).unwrap();
        assert_eq!(model, before);
    }

    #[test]
    fn wrong_shape_is_rejected_and_model_kept() {
        let mut model = ObjectModel::axis_markers();
        let before = model.clone();
        let err = model
            .apply_transform(&DMatrix::identity(3, 3), true)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(model.apply_transform(&DMatrix::identity(3, 4), false).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn homogeneous_skips_perspective_division() {
        let mut model = ObjectModel::axis_markers();
        let h = compose_homogeneous(&Mat3::identity(), &[1.0, 0.0, 0.0], 2.0).unwrap();
        model.apply_homogeneous(&h);
        // w becomes 2 but is simply dropped.
        assert_eq!(model.vertices()[0], Pt3::new(2.0, 0.0, 0.0));
        assert_eq!(model.vertices()[1], Pt3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn linear_rotation_moves_axis_points() {
        let mut model = ObjectModel::axis_markers();
        model.apply_linear(&(rotate_z(std::f64::consts::FRAC_PI_2) * uniform_scale(2.0)));
        assert!((model.vertices()[1] - Pt3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
        assert!((model.vertices()[3] - Pt3::new(0.0, 0.0, -2.0)).norm() < 1e-12);
    }

    #[test]
    fn failed_mesh_load_leaves_model() {
        let mut model = ObjectModel::axis_markers();
        let before = model.clone();
        assert!(model.load_mesh("/no/such/mesh.obj").is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn load_replaces_kind() {
        let mut model = ObjectModel::axis_markers();
        model
            .load_corner_markers(&PatternSize::new(3, 4).unwrap())
            .unwrap();
        assert_eq!(model.tag(), ModelTag::CornerMarkers);
        model.load_axis_markers();
        assert_eq!(model.tag(), ModelTag::AxisMarkers);
    }
}
