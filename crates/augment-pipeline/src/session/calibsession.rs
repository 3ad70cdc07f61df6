use anyhow::{ensure, Context};
use augment_core::{
    CalibrationSolver, Error, ImageSize, Intrinsics, PatternSize, Pt2, Pt3, Result,
};
use image::RgbImage;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::types::{CalibrationReport, LogEntry, SessionMetadata, SESSION_SCHEMA_VERSION};
use crate::config::SessionConfig;
use crate::detect::CornerDetector;
use crate::frames::Frame;

/// Lifecycle of a calibration session, derived from its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Fewer than `min_samples` samples.
    Collecting,
    /// Enough samples, no intrinsics yet.
    Ready,
    /// Intrinsics available.
    Calibrated,
}

/// Matching image/world correspondences from one view of the pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub image_points: Vec<Pt2>,
    pub world_points: Vec<Pt3>,
    /// Size of the frame the sample came from, when known.
    #[serde(default)]
    pub image_size: Option<ImageSize>,
    /// Source frame, retained in memory only.
    #[serde(skip)]
    pub frame: Option<RgbImage>,
}

/// Accumulates pattern observations and turns them into intrinsics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationSession {
    pub metadata: SessionMetadata,
    config: SessionConfig,
    samples: Vec<CalibrationSample>,
    intrinsics: Option<Intrinsics>,
    last_report: Option<CalibrationReport>,
    log: Vec<LogEntry>,
}

impl CalibrationSession {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            metadata: SessionMetadata::new(),
            config,
            samples: Vec::new(),
            intrinsics: None,
            last_report: None,
            log: Vec::new(),
        })
    }

    pub fn with_pattern(pattern: PatternSize, min_samples: usize) -> Result<Self> {
        Self::new(SessionConfig {
            pattern,
            min_samples,
        })
    }

    pub fn state(&self) -> SessionState {
        if self.intrinsics.is_some() {
            SessionState::Calibrated
        } else if self.samples.len() >= self.config.min_samples {
            SessionState::Ready
        } else {
            SessionState::Collecting
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn pattern(&self) -> PatternSize {
        self.config.pattern
    }

    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn intrinsics(&self) -> Option<&Intrinsics> {
        self.intrinsics.as_ref()
    }

    pub fn last_report(&self) -> Option<&CalibrationReport> {
        self.last_report.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Size of the first sample that came from a frame.
    pub fn reference_image_size(&self) -> Option<ImageSize> {
        self.samples.iter().find_map(|s| s.image_size)
    }

    /// Record one correspondence set. Accepted in every state.
    pub fn try_add_sample(&mut self, image_points: Vec<Pt2>, world_points: Vec<Pt3>) -> Result<()> {
        self.push_sample(CalibrationSample {
            image_points,
            world_points,
            image_size: None,
            frame: None,
        })
    }

    /// Detect the pattern in `frame` and record it as a sample.
    pub fn try_add_frame(&mut self, frame: &Frame, detector: &mut dyn CornerDetector) -> Result<()> {
        let pattern = self.config.pattern;
        let Some(corners) = detector.detect(frame, pattern) else {
            debug!("frame {}: pattern not detected", frame.index);
            return Err(Error::DetectionFailure);
        };
        if corners.len() != pattern.point_count() {
            let err = Error::invalid(format!(
                "detector returned {} corners, pattern has {}",
                corners.len(),
                pattern.point_count()
            ));
            debug!("frame {}: {err}", frame.index);
            return Err(err);
        }

        self.push_sample(CalibrationSample {
            image_points: corners,
            world_points: pattern.world_points()?,
            image_size: Some(frame.size()),
            frame: Some(frame.image.clone()),
        })
    }

    /// Rejections leave the session untouched, log included.
    fn push_sample(&mut self, sample: CalibrationSample) -> Result<()> {
        let (n_img, n_world) = (sample.image_points.len(), sample.world_points.len());
        if n_img == 0 || n_img != n_world {
            return Err(Error::invalid(format!(
                "sample needs matching non-empty point sets, got {n_img} image and {n_world} world points"
            )));
        }

        self.samples.push(sample);
        debug!(
            "sample {} accepted ({n_img} points), state {:?}",
            self.samples.len(),
            self.state()
        );
        self.record("add_sample", format!("{n_img} points"));
        Ok(())
    }

    /// Estimate intrinsics from every recorded sample.
    ///
    /// On failure the session keeps whatever intrinsics it had before.
    pub fn try_calibrate(
        &mut self,
        image_size: ImageSize,
        solver: &dyn CalibrationSolver,
    ) -> Result<CalibrationReport> {
        let have = self.samples.len();
        let need = self.config.min_samples;
        if have < need {
            return Err(Error::InsufficientSamples { have, need });
        }

        let world: Vec<Vec<Pt3>> = self.samples.iter().map(|s| s.world_points.clone()).collect();
        let image: Vec<Vec<Pt2>> = self.samples.iter().map(|s| s.image_points.clone()).collect();

        let output = match solver.calibrate(&world, &image, image_size) {
            Ok(out) if out.rms_error.is_finite() => out,
            Ok(out) => {
                return Err(failed_calibration(Error::solver(format!(
                    "non-finite reprojection error {}",
                    out.rms_error
                ))))
            }
            Err(e) => return Err(failed_calibration(e)),
        };

        let report = CalibrationReport {
            intrinsics: output.intrinsics.clone(),
            rms_error: output.rms_error,
            per_view_errors: output.per_view_errors,
            sample_count: have,
            image_size,
        };
        info!("calibrated from {have} samples, rms {:.4} px", report.rms_error);
        self.intrinsics = Some(output.intrinsics);
        self.last_report = Some(report.clone());
        self.record("calibrate", format!("rms {:.4} px", report.rms_error));
        Ok(report)
    }

    fn record(&mut self, operation: &str, notes: String) {
        self.log.push(LogEntry::new(operation, notes));
        self.metadata.touch();
    }

    /// Checkpoint the session as pretty JSON. Retained frames are dropped.
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize calibration session")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let session: Self =
            serde_json::from_str(json).context("failed to parse calibration session")?;
        ensure!(
            session.metadata.schema_version == SESSION_SCHEMA_VERSION,
            "unsupported session schema version {}",
            session.metadata.schema_version
        );
        session.config.validate()?;
        Ok(session)
    }
}

fn failed_calibration(err: Error) -> Error {
    warn!("calibration failed: {err}");
    err
}
