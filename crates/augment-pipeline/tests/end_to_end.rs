use std::io::Write;
use std::ops::ControlFlow;

use augment_core::{synthetic, ImageSize, Intrinsics, Mat3, ObjectModel, PatternSize, Pt2};
use augment_linear::LinearCalibrationSolver;
use augment_pipeline::render::RED;
use augment_pipeline::{
    capture_samples, run_overlay, CalibrationSession, FrameOutcome, ImageSequence, Overlay,
    PoseProjector, ProjectorConfig, ReplayDetector, SessionConfig, SessionState, StarAnimation,
};
use image::Rgb;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn camera() -> Intrinsics {
    Intrinsics::new(
        Mat3::new(820.0, 0.0, 640.0, 0.0, 810.0, 360.0, 0.0, 0.0, 1.0),
        vec![-0.08, 0.02, 0.0, 0.0, 0.0],
    )
}

fn detections(pattern: &PatternSize, views: usize) -> Vec<Vec<Pt2>> {
    let world = pattern.world_points().unwrap();
    let poses = synthetic::orbit_poses(pattern, views, 22.0);
    synthetic::project_views(&camera().camera(), &world, &poses).unwrap()
}

#[test]
fn five_samples_calibrate_a_six_by_nine_pattern() {
    init_logging();
    let pattern = PatternSize::new(6, 9).unwrap();
    let mut session = CalibrationSession::new(SessionConfig {
        pattern,
        min_samples: 5,
    })
    .unwrap();

    let world = pattern.world_points().unwrap();
    for (i, image) in detections(&pattern, 5).into_iter().enumerate() {
        assert_eq!(session.state(), SessionState::Collecting, "before sample {i}");
        assert_eq!(image.len(), 54);
        session.try_add_sample(image, world.clone()).unwrap();
    }
    assert_eq!(session.state(), SessionState::Ready);

    let report = session
        .try_calibrate(ImageSize::new(1280, 720), &LinearCalibrationSolver::default())
        .unwrap();
    assert_eq!(session.state(), SessionState::Calibrated);
    assert_eq!(report.sample_count, 5);

    let k = report.intrinsics.camera_matrix;
    assert!(k[(0, 0)] > 0.0 && k[(1, 1)] > 0.0 && k[(2, 2)] > 0.0);
    assert!((k[(0, 0)] - 820.0).abs() < 20.0, "fx = {}", k[(0, 0)]);
    assert!(report.rms_error < 1.0, "rms = {}", report.rms_error);
}

#[test]
fn capture_calibrate_then_overlay() {
    init_logging();
    let pattern = PatternSize::default();
    let size = ImageSize::new(1280, 720);
    let mut recorded: Vec<Option<Vec<Pt2>>> =
        detections(&pattern, 6).into_iter().map(Some).collect();
    // A frame where the pattern was missed.
    recorded.insert(2, None);

    let mut session = CalibrationSession::new(SessionConfig::default()).unwrap();
    let summary = capture_samples(
        &mut ImageSequence::blank(size, recorded.len()),
        &mut ReplayDetector::new(recorded.clone()),
        &mut session,
        |_, _| ControlFlow::Continue(()),
    )
    .unwrap();
    assert_eq!((summary.used, summary.skipped), (6, 1));
    assert_eq!(session.reference_image_size(), Some(size));

    let image_size = session.reference_image_size().unwrap_or(size);
    session
        .try_calibrate(image_size, &LinearCalibrationSolver::default())
        .unwrap();
    let intrinsics = session.intrinsics().cloned().unwrap();

    let projector = PoseProjector::linear(pattern, ProjectorConfig::default()).unwrap();
    let mut overlay = Overlay::Static(ObjectModel::corner_markers(&pattern).unwrap());
    let mut drawn = Vec::new();
    run_overlay(
        &mut ImageSequence::blank(size, recorded.len()),
        &mut ReplayDetector::new(recorded.clone()),
        &projector,
        &intrinsics,
        &mut overlay,
        |frame, outcome| {
            if let FrameOutcome::Projected(p) = outcome {
                // The top-left marker sits on the first detected corner.
                let tl = p.points[0];
                let px = frame.image.get_pixel(tl.x.round() as u32, tl.y.round() as u32);
                assert_eq!(px, &Rgb(RED));
                drawn.push((frame.index, (tl - recorded[frame.index].as_ref().unwrap()[0]).norm()));
            }
            ControlFlow::Continue(())
        },
    )
    .unwrap();

    assert_eq!(drawn.len(), 6);
    assert!(drawn.iter().all(|&(i, _)| i != 2));
    assert!(drawn.iter().all(|&(_, err)| err < 2.0), "{drawn:?}");
}

#[test]
fn mesh_overlay_from_file_and_star_animation() {
    init_logging();
    let pattern = PatternSize::default();
    let size = ImageSize::new(1280, 720);
    let recorded: Vec<Option<Vec<Pt2>>> = detections(&pattern, 3).into_iter().map(Some).collect();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# pyramid").unwrap();
    writeln!(file, "v 0 0 0\nv 1 0 0\nv 0 0 1\nv 0 1 0").unwrap();
    writeln!(file, "f 1//1 2//1 3//1\nf 1//1 3//1 4//1").unwrap();
    file.flush().unwrap();

    let model = ObjectModel::upright_mesh(file.path(), 2.0).unwrap();
    let before = model.vertices()[1];
    let mut overlay = Overlay::Static(model);
    let projector = PoseProjector::linear(pattern, ProjectorConfig::default()).unwrap();

    let summary = run_overlay(
        &mut ImageSequence::blank(size, recorded.len()),
        &mut ReplayDetector::new(recorded.clone()),
        &projector,
        &camera(),
        &mut overlay,
        |_, outcome| {
            assert!(matches!(outcome, FrameOutcome::Projected(_)), "{outcome:?}");
            ControlFlow::Continue(())
        },
    )
    .unwrap();
    assert_eq!(summary.used, 3);

    // Three frames nudged the mesh by 0.3 rad about Z.
    let Overlay::Static(model) = &overlay else {
        unreachable!()
    };
    let after = model.vertices()[1];
    let angle = after.y.atan2(after.x) - before.y.atan2(before.x);
    assert!((angle - 0.3).abs() < 1e-9, "angle = {angle}");

    let mut star = Overlay::Star(StarAnimation::default());
    run_overlay(
        &mut ImageSequence::blank(size, recorded.len()),
        &mut ReplayDetector::new(recorded),
        &projector,
        &camera(),
        &mut star,
        |_, _| ControlFlow::Continue(()),
    )
    .unwrap();
    let Overlay::Star(anim) = star else {
        unreachable!()
    };
    assert_eq!(anim.theta_deg, 15.0);
}
