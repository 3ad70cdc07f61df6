//! Frame sources and the single-threaded per-frame loops.
//!
//! A loop pulls one frame at a time from an owned [`FrameSource`], runs the
//! detector, updates the session or draws the overlay, then hands the frame
//! to a callback that decides whether to continue. Frame-local errors
//! (see [`Error::is_frame_local`]) skip the frame; anything else ends the run.

use std::ops::ControlFlow;
use std::path::PathBuf;

use augment_core::{Error, ImageSize, Intrinsics, Result};
use image::RgbImage;
use log::{debug, info, warn};

use crate::detect::{CornerDetector, RecordedFrame};
use crate::projector::{Overlay, PoseProjector, Projection};
use crate::render::render_detections;
use crate::session::CalibrationSession;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Position in the stream, starting at 0.
    pub index: usize,
    pub image: RgbImage,
}

impl Frame {
    pub fn new(index: usize, image: RgbImage) -> Self {
        Self { index, image }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.image.width(), self.image.height())
    }
}

/// Yields frames until exhausted.
pub trait FrameSource {
    /// `Ok(None)` ends the stream; `Err(ResourceUnavailable)` aborts it.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Frames read from image files; entries without a path become blank frames.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    entries: Vec<Option<PathBuf>>,
    blank_size: ImageSize,
    next: usize,
}

impl ImageSequence {
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            entries: paths.into_iter().map(Some).collect(),
            blank_size: ImageSize::new(1, 1),
            next: 0,
        }
    }

    /// `count` black frames of the given size.
    pub fn blank(size: ImageSize, count: usize) -> Self {
        Self {
            entries: vec![None; count],
            blank_size: size,
            next: 0,
        }
    }

    /// One frame per recorded entry, blank where no image was recorded.
    pub fn from_recording(frames: &[RecordedFrame], blank_size: ImageSize) -> Self {
        Self {
            entries: frames.iter().map(|f| f.image.clone()).collect(),
            blank_size,
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(entry) = self.entries.get(self.next) else {
            return Ok(None);
        };
        let index = self.next;
        self.next += 1;

        let image = match entry {
            Some(path) => image::open(path)
                .map_err(|e| Error::ResourceUnavailable(format!("{}: {e}", path.display())))?
                .to_rgb8(),
            None => RgbImage::new(self.blank_size.width, self.blank_size.height),
        };
        Ok(Some(Frame::new(index, image)))
    }
}

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Added to the session, which now holds `sample_count` samples.
    Sampled { sample_count: usize },
    Projected(Projection),
    Skipped(Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub used: usize,
    pub skipped: usize,
    /// The callback asked to stop before the source ran dry.
    pub cancelled: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: &FrameOutcome) {
        self.frames += 1;
        match outcome {
            FrameOutcome::Skipped(_) => self.skipped += 1,
            _ => self.used += 1,
        }
    }
}

fn classify(result: Result<FrameOutcome>, index: usize) -> Result<FrameOutcome> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(e) if e.is_frame_local() => {
            if e == Error::DetectionFailure {
                debug!("frame {index}: pattern not detected");
            } else {
                warn!("frame {index} skipped: {e}");
            }
            Ok(FrameOutcome::Skipped(e))
        }
        Err(e) => Err(e),
    }
}

/// Feed frames into `session` until the source ends or the callback breaks.
pub fn capture_samples<F>(
    source: &mut dyn FrameSource,
    detector: &mut dyn CornerDetector,
    session: &mut CalibrationSession,
    mut on_frame: F,
) -> Result<RunSummary>
where
    F: FnMut(&Frame, &FrameOutcome) -> ControlFlow<()>,
{
    let mut summary = RunSummary::default();
    while let Some(frame) = source.next_frame()? {
        let result = session
            .try_add_frame(&frame, detector)
            .map(|()| FrameOutcome::Sampled {
                sample_count: session.sample_count(),
            });
        let outcome = classify(result, frame.index)?;
        summary.record(&outcome);
        if on_frame(&frame, &outcome).is_break() {
            summary.cancelled = true;
            break;
        }
    }
    info!(
        "capture: {} frames, {} samples added, {} skipped",
        summary.frames, summary.used, summary.skipped
    );
    Ok(summary)
}

/// Draw `overlay` on every frame where the pattern is found.
///
/// The callback receives the annotated frame.
pub fn run_overlay<F>(
    source: &mut dyn FrameSource,
    detector: &mut dyn CornerDetector,
    projector: &PoseProjector,
    intrinsics: &Intrinsics,
    overlay: &mut Overlay,
    mut on_frame: F,
) -> Result<RunSummary>
where
    F: FnMut(&Frame, &FrameOutcome) -> ControlFlow<()>,
{
    let mut summary = RunSummary::default();
    while let Some(mut frame) = source.next_frame()? {
        let result = match detector.detect(&frame, projector.pattern()) {
            Some(corners) => {
                if projector.config().show_detections {
                    render_detections(&corners, projector.pattern(), &mut frame.image);
                }
                overlay
                    .draw(projector, &corners, intrinsics, &mut frame.image)
                    .map(FrameOutcome::Projected)
            }
            None => Err(Error::DetectionFailure),
        };
        let outcome = classify(result, frame.index)?;
        summary.record(&outcome);
        if on_frame(&frame, &outcome).is_break() {
            summary.cancelled = true;
            break;
        }
    }
    info!(
        "overlay: {} frames, {} drawn, {} skipped",
        summary.frames, summary.used, summary.skipped
    );
    Ok(summary)
}
