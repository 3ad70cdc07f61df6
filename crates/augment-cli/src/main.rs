use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use augment_core::{ImageSize, ModelTag, ObjectModel, Real, DEFAULT_MESH_SCALE};
use augment_linear::LinearCalibrationSolver;
use augment_pipeline::io::{load_config, load_intrinsics, load_recording, save_intrinsics};
use augment_pipeline::{
    capture_samples, run_overlay, AugmentConfig, CalibrationReport, CalibrationSession,
    FrameOutcome, ImageSequence, Overlay, PoseProjector, ReplayDetector, RunSummary,
    StarAnimation,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

/// Planar-pattern AR: camera calibration and overlay rendering.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calibrate intrinsics from recorded corner detections.
    Calibrate(CalibrateArgs),
    /// Draw an object model on every frame where the pattern was detected.
    Overlay(OverlayArgs),
}

#[derive(Debug, Args)]
struct FrameArgs {
    /// JSON list of `{ "image": path?, "corners": [[x, y], ...]? }` frames.
    #[arg(long)]
    detections: PathBuf,

    /// Optional JSON `AugmentConfig`. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Size of frames that have no recorded image.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

#[derive(Debug, Args)]
struct CalibrateArgs {
    #[command(flatten)]
    frames: FrameArgs,

    /// Where to write the calibrated intrinsics.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModelChoice {
    Corners,
    Axes,
    Mesh,
    Star,
}

#[derive(Debug, Args)]
struct OverlayArgs {
    #[command(flatten)]
    frames: FrameArgs,

    /// Intrinsics JSON written by `calibrate`.
    #[arg(long)]
    intrinsics: PathBuf,

    #[arg(long, value_enum, default_value_t = ModelChoice::Axes)]
    model: ModelChoice,

    /// Mesh file for `--model mesh`.
    #[arg(long)]
    mesh: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_MESH_SCALE)]
    mesh_scale: Real,

    /// Also draw the detected corners.
    #[arg(long)]
    show_detections: bool,

    /// Directory for the annotated frames.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Debug, Serialize)]
struct FrameReport {
    index: usize,
    drawn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct OverlayReport {
    model: ModelTag,
    frames: Vec<FrameReport>,
    drawn: usize,
    skipped: usize,
}

fn load_config_or_default(path: Option<&Path>) -> Result<AugmentConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AugmentConfig::default()),
    }
}

fn run_calibrate(args: &CalibrateArgs) -> Result<String> {
    let config = load_config_or_default(args.frames.config.as_deref())?;
    let recording = load_recording(&args.frames.detections)?;
    let blank = ImageSize::new(args.frames.width, args.frames.height);

    let mut session = CalibrationSession::new(config.session)?;
    let summary = capture_samples(
        &mut ImageSequence::from_recording(&recording, blank),
        &mut ReplayDetector::from_recording(&recording),
        &mut session,
        |_, _| ControlFlow::Continue(()),
    )?;
    info!(
        "{} of {} frames usable for calibration",
        summary.used, summary.frames
    );

    let image_size = session.reference_image_size().unwrap_or(blank);
    let solver = LinearCalibrationSolver::new(config.calibration);
    let report: CalibrationReport = session
        .try_calibrate(image_size, &solver)
        .context("calibration failed")?;

    if let Some(output) = &args.output {
        save_intrinsics(output, &report.intrinsics)?;
        info!("intrinsics written to {}", output.display());
    }
    Ok(serde_json::to_string_pretty(&report)?)
}

fn build_overlay(args: &OverlayArgs, config: &AugmentConfig) -> Result<Overlay> {
    let overlay = match args.model {
        ModelChoice::Corners => {
            Overlay::Static(ObjectModel::corner_markers(&config.session.pattern)?)
        }
        ModelChoice::Axes => Overlay::Static(ObjectModel::axis_markers()),
        ModelChoice::Mesh => {
            let Some(path) = &args.mesh else {
                bail!("--model mesh needs --mesh <path>");
            };
            let model = ObjectModel::upright_mesh(path, args.mesh_scale)
                .with_context(|| format!("failed to load mesh {}", path.display()))?;
            Overlay::Static(model)
        }
        ModelChoice::Star => Overlay::Star(StarAnimation::default()),
    };
    Ok(overlay)
}

fn run_overlay_from_files(args: &OverlayArgs) -> Result<String> {
    let mut config = load_config_or_default(args.frames.config.as_deref())?;
    config.projector.show_detections |= args.show_detections;
    let recording = load_recording(&args.frames.detections)?;
    let intrinsics = load_intrinsics(&args.intrinsics)?;
    let mut overlay = build_overlay(args, &config)?;
    let projector = PoseProjector::linear(config.session.pattern, config.projector)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create {}", args.out_dir.display()))?;

    let mut frames = Vec::new();
    let mut write_error = None;
    let summary: RunSummary = run_overlay(
        &mut ImageSequence::from_recording(
            &recording,
            ImageSize::new(args.frames.width, args.frames.height),
        ),
        &mut ReplayDetector::from_recording(&recording),
        &projector,
        &intrinsics,
        &mut overlay,
        |frame, outcome| {
            let output = args.out_dir.join(format!("frame_{:04}.png", frame.index));
            if let Err(e) = frame.image.save(&output) {
                write_error = Some(anyhow::Error::new(e).context(format!(
                    "failed to write {}",
                    output.display()
                )));
                return ControlFlow::Break(());
            }
            let reason = match outcome {
                FrameOutcome::Skipped(e) => Some(e.to_string()),
                _ => None,
            };
            frames.push(FrameReport {
                index: frame.index,
                drawn: reason.is_none(),
                reason,
                output,
            });
            ControlFlow::Continue(())
        },
    )?;
    if let Some(e) = write_error {
        return Err(e);
    }

    let report = OverlayReport {
        model: overlay.tag(),
        frames,
        drawn: summary.used,
        skipped: summary.skipped,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let json = match &cli.command {
        Command::Calibrate(args) => run_calibrate(args)?,
        Command::Overlay(args) => run_overlay_from_files(args)?,
    };
    println!("{json}");
    Ok(())
}
