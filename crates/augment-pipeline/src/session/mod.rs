//! Calibration session: collect samples, then solve for intrinsics.
//!
//! ```no_run
//! use augment_core::ImageSize;
//! use augment_linear::LinearCalibrationSolver;
//! use augment_pipeline::session::CalibrationSession;
//! use augment_pipeline::SessionConfig;
//!
//! let mut session = CalibrationSession::new(SessionConfig::default())?;
//! // session.try_add_frame(&frame, &mut detector)? for each captured frame
//! let report = session.try_calibrate(ImageSize::new(1280, 720), &LinearCalibrationSolver::default())?;
//! println!("rms = {:.3}", report.rms_error);
//! # Ok::<(), augment_core::Error>(())
//! ```

mod calibsession;
pub mod types;

pub use calibsession::{CalibrationSample, CalibrationSession, SessionState};
pub use types::{current_timestamp, CalibrationReport, LogEntry, SessionMetadata};
