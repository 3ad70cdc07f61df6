//! Pose estimation from detected corners and projection of object models.

use augment_core::transform::rotate_z;
use augment_core::{
    Error, Intrinsics, ModelKind, ModelTag, ObjectModel, PatternSize, PointProjector, Pose,
    PoseSolver, Pt2, Pt3, Real, Result,
};
use augment_linear::{HomographyPoseSolver, PinholeProjector};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::ProjectorConfig;
use crate::render::{render_model, RenderTarget};

/// What one successful projection produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub pose: Pose,
    pub points: Vec<Pt2>,
    pub tag: ModelTag,
}

/// Places object models on a detected pattern and draws them.
pub struct PoseProjector {
    pattern: PatternSize,
    world: Vec<Pt3>,
    config: ProjectorConfig,
    pose_solver: Box<dyn PoseSolver>,
    point_projector: Box<dyn PointProjector>,
}

impl std::fmt::Debug for PoseProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseProjector")
            .field("pattern", &self.pattern)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PoseProjector {
    pub fn new(
        pattern: PatternSize,
        config: ProjectorConfig,
        pose_solver: Box<dyn PoseSolver>,
        point_projector: Box<dyn PointProjector>,
    ) -> Result<Self> {
        Ok(Self {
            world: pattern.world_points()?,
            pattern,
            config,
            pose_solver,
            point_projector,
        })
    }

    /// Projector backed by the homography pose solver and pinhole projection.
    pub fn linear(pattern: PatternSize, config: ProjectorConfig) -> Result<Self> {
        Self::new(
            pattern,
            config,
            Box::new(HomographyPoseSolver),
            Box::new(PinholeProjector),
        )
    }

    pub fn pattern(&self) -> PatternSize {
        self.pattern
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Pattern pose from detected corners.
    pub fn estimate_pose(&self, detected: &[Pt2], intrinsics: &Intrinsics) -> Result<Pose> {
        if detected.is_empty() {
            return Err(Error::DetectionFailure);
        }
        if detected.len() != self.world.len() {
            return Err(Error::invalid(format!(
                "{} detected corners for a {}x{} pattern",
                detected.len(),
                self.pattern.rows,
                self.pattern.cols
            )));
        }
        self.pose_solver.solve_pose(&self.world, detected, intrinsics)
    }

    /// Solve the pose, project `model` and draw it into `target`.
    ///
    /// Mesh models are rotated by the configured nudge before projection.
    /// The rotation is kept in the model only when the frame draws, so it
    /// accumulates across successful calls.
    pub fn project_model(
        &self,
        detected: &[Pt2],
        intrinsics: &Intrinsics,
        model: &mut ObjectModel,
        target: &mut dyn RenderTarget,
    ) -> Result<Projection> {
        let pose = self.estimate_pose(detected, intrinsics)?;

        let nudged = match self.config.mesh_nudge_rad {
            Some(nudge) if matches!(model.kind, ModelKind::Mesh { .. }) => {
                let mut copy = model.clone();
                copy.apply_linear(&rotate_z(nudge));
                trace!("mesh nudged by {nudge} rad");
                Some(copy)
            }
            _ => None,
        };
        let drawn = nudged.as_ref().unwrap_or(&*model);

        let points = self
            .point_projector
            .project(drawn.vertices(), &pose, intrinsics)?;
        render_model(&drawn.kind, &points, target)?;
        debug!(
            "projected {:?} ({} points), t = {:?}",
            drawn.tag(),
            points.len(),
            pose.translation
        );

        let tag = drawn.tag();
        if let Some(nudged) = nudged {
            *model = nudged;
        }
        Ok(Projection { pose, points, tag })
    }
}

/// Two rotating triangles drifting across the pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarAnimation {
    pub side: Real,
    pub theta_deg: Real,
    pub origin: Pt3,
}

impl Default for StarAnimation {
    fn default() -> Self {
        Self {
            side: 2.0,
            theta_deg: 0.0,
            origin: Pt3::origin(),
        }
    }
}

impl StarAnimation {
    const SPIN_DEG: Real = 5.0;
    const STEP_X: Real = 0.2;
    const MAX_X: Real = 5.0;
    const MIN_Y: Real = -7.0;

    pub fn model(&self) -> ObjectModel {
        ObjectModel::star_pair(self.side, self.origin, self.theta_deg)
    }

    /// Advance one frame: spin, drift right, wrap to the next row down,
    /// restart at the origin after the last row.
    pub fn advance(&mut self) {
        self.theta_deg += Self::SPIN_DEG;
        self.origin.x += Self::STEP_X;
        if self.origin.x > Self::MAX_X {
            self.origin.x = 0.0;
            self.origin.y -= 1.0;
        }
        if self.origin.y < Self::MIN_Y {
            self.origin = Pt3::origin();
        }
    }
}

/// Overlay drawn on every frame with a detected pattern.
#[derive(Debug, Clone)]
pub enum Overlay {
    Static(ObjectModel),
    Star(StarAnimation),
}

impl Overlay {
    pub fn tag(&self) -> ModelTag {
        match self {
            Self::Static(model) => model.tag(),
            Self::Star(_) => ModelTag::AnimatedPolygonPair,
        }
    }

    /// Project and draw; the star animation advances only when a frame succeeds.
    pub fn draw(
        &mut self,
        projector: &PoseProjector,
        detected: &[Pt2],
        intrinsics: &Intrinsics,
        target: &mut dyn RenderTarget,
    ) -> Result<Projection> {
        match self {
            Self::Static(model) => projector.project_model(detected, intrinsics, model, target),
            Self::Star(anim) => {
                let mut model = anim.model();
                let projection = projector.project_model(detected, intrinsics, &mut model, target)?;
                anim.advance();
                Ok(projection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawCommand;
    use augment_core::mesh::MeshData;
    use augment_core::{synthetic, Mat3};

    fn intrinsics() -> Intrinsics {
        Intrinsics::new(
            Mat3::new(700.0, 0.0, 320.0, 0.0, 700.0, 240.0, 0.0, 0.0, 1.0),
            vec![0.0; 5],
        )
    }

    fn detected(pattern: &PatternSize) -> Vec<Pt2> {
        let pose = Pose::from_isometry(&synthetic::centered_pose(pattern, 0.2, -0.1, 0.3, 20.0));
        PinholeProjector
            .project(&pattern.world_points().unwrap(), &pose, &intrinsics())
            .unwrap()
    }

    fn projector(config: ProjectorConfig) -> PoseProjector {
        PoseProjector::linear(PatternSize::default(), config).unwrap()
    }

    #[test]
    fn corner_markers_land_on_extremal_detections() {
        let pattern = PatternSize::default();
        let corners = detected(&pattern);
        let mut model = ObjectModel::corner_markers(&pattern).unwrap();
        let mut calls: Vec<DrawCommand> = Vec::new();

        let out = projector(ProjectorConfig::default())
            .project_model(&corners, &intrinsics(), &mut model, &mut calls)
            .unwrap();

        assert_eq!(out.tag, ModelTag::CornerMarkers);
        assert_eq!(calls.len(), 4);
        // TL, TR, BL, BR are features 0, 48, 5 and 53 in column-major order.
        for (p, idx) in out.points.iter().zip([0, 48, 5, 53]) {
            assert!((p - corners[idx]).norm() < 1e-6, "{p:?} vs {:?}", corners[idx]);
        }
    }

    #[test]
    fn input_validation() {
        let proj = projector(ProjectorConfig::default());
        let mut model = ObjectModel::axis_markers();
        let mut calls: Vec<DrawCommand> = Vec::new();
        assert_eq!(
            proj.project_model(&[], &intrinsics(), &mut model, &mut calls)
                .unwrap_err(),
            Error::DetectionFailure
        );
        let short = vec![Pt2::origin(); 10];
        assert!(matches!(
            proj.project_model(&short, &intrinsics(), &mut model, &mut calls),
            Err(Error::InvalidArgument(_))
        ));
        assert!(calls.is_empty());
    }

    fn tiny_mesh() -> ObjectModel {
        ObjectModel::from_mesh(MeshData {
            vertices: vec![
                Pt3::new(1.0, 0.0, 0.0),
                Pt3::new(0.0, 1.0, 0.0),
                Pt3::new(0.0, 0.0, -1.0),
            ],
            faces: vec![[1, 2, 3]],
        })
        .unwrap()
    }

    #[test]
    fn mesh_nudge_accumulates() {
        let pattern = PatternSize::default();
        let corners = detected(&pattern);
        let proj = projector(ProjectorConfig::default());
        let mut model = tiny_mesh();
        let mut calls: Vec<DrawCommand> = Vec::new();

        for _ in 0..2 {
            proj.project_model(&corners, &intrinsics(), &mut model, &mut calls)
                .unwrap();
        }
        let v = model.vertices()[0];
        assert!((v.x - 0.2_f64.cos()).abs() < 1e-12);
        assert!((v.y - 0.2_f64.sin()).abs() < 1e-12);
        assert_eq!(calls.len(), 6);
    }

    struct NoProjection;

    impl PointProjector for NoProjection {
        fn project(&self, _: &[Pt3], _: &Pose, _: &Intrinsics) -> Result<Vec<Pt2>> {
            Err(Error::solver("point behind the camera"))
        }
    }

    #[test]
    fn failed_frame_leaves_mesh_unrotated() {
        let pattern = PatternSize::default();
        let proj = PoseProjector::new(
            pattern,
            ProjectorConfig::default(),
            Box::new(HomographyPoseSolver),
            Box::new(NoProjection),
        )
        .unwrap();
        let mut model = tiny_mesh();
        let before = model.clone();
        let mut calls: Vec<DrawCommand> = Vec::new();
        assert!(proj
            .project_model(&detected(&pattern), &intrinsics(), &mut model, &mut calls)
            .is_err());
        assert_eq!(model, before);
        assert!(calls.is_empty());
    }

    #[test]
    fn mesh_nudge_can_be_disabled() {
        let pattern = PatternSize::default();
        let proj = projector(ProjectorConfig {
            mesh_nudge_rad: None,
            ..Default::default()
        });
        let mut model = tiny_mesh();
        let before = model.clone();
        proj.project_model(
            &detected(&pattern),
            &intrinsics(),
            &mut model,
            &mut Vec::<DrawCommand>::new(),
        )
        .unwrap();
        assert_eq!(model, before);
    }

    #[test]
    fn star_animation_wraps() {
        let mut anim = StarAnimation::default();
        for _ in 0..3 {
            anim.advance();
        }
        assert_eq!(anim.theta_deg, 15.0);
        assert!((anim.origin.x - 0.6).abs() < 1e-12);

        anim.origin = Pt3::new(4.9, -2.0, 0.0);
        anim.advance();
        assert_eq!(anim.origin, Pt3::new(0.0, -3.0, 0.0));

        anim.origin = Pt3::new(5.0, -7.0, 0.0);
        anim.advance();
        assert_eq!(anim.origin, Pt3::origin());
    }

    #[test]
    fn star_overlay_advances_only_on_success() {
        let pattern = PatternSize::default();
        let proj = projector(ProjectorConfig::default());
        let mut overlay = Overlay::Star(StarAnimation::default());
        let mut calls: Vec<DrawCommand> = Vec::new();

        assert!(overlay
            .draw(&proj, &[], &intrinsics(), &mut calls)
            .is_err());
        let out = overlay
            .draw(&proj, &detected(&pattern), &intrinsics(), &mut calls)
            .unwrap();
        assert_eq!(out.tag, ModelTag::AnimatedPolygonPair);
        assert_eq!(out.points.len(), 6);
        match overlay {
            Overlay::Star(anim) => assert_eq!(anim.theta_deg, 5.0),
            Overlay::Static(_) => unreachable!(),
        }
    }
}
