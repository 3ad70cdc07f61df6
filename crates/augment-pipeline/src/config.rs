//! Serializable configuration for the session and the projector.
//!
//! Every struct deserializes from a partial JSON document; missing fields
//! take their defaults.

use augment_core::{Error, PatternSize, Real, Result};
use augment_linear::LinearCalibrationOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Inner-corner grid of the calibration pattern.
    pub pattern: PatternSize,
    /// Samples required before calibration may run.
    pub min_samples: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pattern: PatternSize::default(),
            min_samples: 5,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.pattern.validate()?;
        if self.min_samples == 0 {
            return Err(Error::invalid("min_samples must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Rotation about `Z` applied to mesh models before every projection.
    ///
    /// The rotation accumulates in the model's vertices. `None` disables it.
    pub mesh_nudge_rad: Option<Real>,
    /// Draw the detected corners under the overlay.
    pub show_detections: bool,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            mesh_nudge_rad: Some(0.1),
            show_detections: false,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    pub session: SessionConfig,
    pub calibration: LinearCalibrationOptions,
    pub projector: ProjectorConfig,
}

impl AugmentConfig {
    pub fn validate(&self) -> Result<()> {
        self.session.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg: AugmentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AugmentConfig::default());
        assert_eq!(cfg.session.pattern, PatternSize { rows: 6, cols: 9 });
        assert_eq!(cfg.session.min_samples, 5);
        assert_eq!(cfg.projector.mesh_nudge_rad, Some(0.1));
        assert!(!cfg.projector.show_detections);
    }

    #[test]
    fn partial_override() {
        let cfg: AugmentConfig = serde_json::from_str(
            r#"{ "session": { "min_samples": 3 }, "projector": { "mesh_nudge_rad": null } }"#,
        )
        .unwrap();
        assert_eq!(cfg.session.min_samples, 3);
        assert_eq!(cfg.session.pattern, PatternSize::default());
        assert_eq!(cfg.projector.mesh_nudge_rad, None);
    }

    #[test]
    fn zero_min_samples_is_rejected() {
        let cfg = SessionConfig {
            min_samples: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidArgument(_))));
    }
}
