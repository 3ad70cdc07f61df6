//! Bookkeeping records carried by a [`CalibrationSession`](super::CalibrationSession).

use std::time::{SystemTime, UNIX_EPOCH};

use augment_core::{ImageSize, Intrinsics, Real};
use serde::{Deserialize, Serialize};

/// Bumped whenever the checkpoint layout changes.
pub const SESSION_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub schema_version: u32,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub last_modified: u64,
}

impl SessionMetadata {
    pub fn new() -> Self {
        let now = current_timestamp();
        Self {
            schema_version: SESSION_SCHEMA_VERSION,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_modified = current_timestamp();
    }
}

impl Default for SessionMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// One accepted operation in the session's log.
///
/// Rejected calls leave no entry. Kept for diagnostics only; replaying the
/// log does not rebuild a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: u64,
    /// Operation name (`add_sample`, `calibrate`).
    pub operation: String,
    pub notes: Option<String>,
}

impl LogEntry {
    pub fn new(operation: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            operation: operation.into(),
            notes: Some(notes.into()),
        }
    }
}

/// Outcome of a successful [`try_calibrate`](super::CalibrationSession::try_calibrate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub intrinsics: Intrinsics,
    /// RMS reprojection error over all samples, in pixels.
    pub rms_error: Real,
    pub per_view_errors: Vec<Real>,
    pub sample_count: usize,
    pub image_size: ImageSize,
}

/// Seconds since the Unix epoch; zero if the clock is before it.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
