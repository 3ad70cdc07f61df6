//! Frame-level AR pipeline on top of `augment-core` and `augment-linear`.
//!
//! - [`session`]: collect pattern observations and calibrate intrinsics.
//! - [`projector`]: estimate the pattern pose per frame and project object
//!   models onto it.
//! - [`render`]: draw projected models onto an [`image::RgbImage`] or any
//!   other [`render::RenderTarget`].
//! - [`frames`]: frame sources and the capture / overlay loops.
//! - [`io`]: JSON persistence for intrinsics, configuration and recorded
//!   detections.

pub mod config;
pub mod detect;
pub mod frames;
pub mod io;
pub mod projector;
pub mod render;
pub mod session;

pub use config::{AugmentConfig, ProjectorConfig, SessionConfig};
pub use detect::{CornerDetector, RecordedFrame, ReplayDetector};
pub use frames::{
    capture_samples, run_overlay, Frame, FrameOutcome, FrameSource, ImageSequence, RunSummary,
};
pub use projector::{Overlay, PoseProjector, Projection, StarAnimation};
pub use render::{render_detections, render_model, RenderTarget};
pub use session::{CalibrationReport, CalibrationSession, SessionState};
