//! Error type shared by every stage of the AR pipeline.

use thiserror::Error;

/// Errors reported by the geometry core and the backend seams.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Wrong matrix shape, wrong point count, mismatched sample sizes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Malformed mesh source; `line` is 1-based (0 when the source could not be opened).
    #[error("parse error at line {line}: {reason}")]
    ParseError { line: usize, reason: String },
    /// The corner detector found no pattern in the frame.
    #[error("pattern not detected")]
    DetectionFailure,
    /// Calibration or pose solver did not converge.
    #[error("solver failure: {0}")]
    SolverFailure(String),
    /// Frame source could not deliver a frame.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("insufficient samples: have {have}, need {need}")]
    InsufficientSamples { have: usize, need: usize },
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn solver(msg: impl std::fmt::Display) -> Self {
        Self::SolverFailure(msg.to_string())
    }

    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            reason: reason.into(),
        }
    }

    /// Errors that should only cost the current frame its overlay.
    ///
    /// The frame loop keeps running on these; anything else aborts it.
    pub fn is_frame_local(&self) -> bool {
        matches!(
            self,
            Self::DetectionFailure | Self::SolverFailure(_) | Self::InvalidArgument(_)
        )
    }
}
