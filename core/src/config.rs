//! Modeling tolerances and sampling settings.
//!
//! Every field has a default matching the construction contract, so an empty
//! JSON object (or a partial one) yields a usable configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`ModelingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelingConfig {
    /// Two mapped sketch points closer than this are treated as one vertex.
    pub coincidence_tolerance: f64,
    /// Geometric tolerance handed to the loft-through-sections primitive.
    pub loft_tolerance: f64,
    /// Samples per full turn when the analytic kernel discretises curves.
    pub samples_per_turn: usize,
    /// Points per section ring used by analytic lofts and sweeps.
    pub ring_samples: usize,
    /// Interpolated rings inserted between sections of a smooth analytic loft.
    pub smooth_subdivisions: usize,
    /// Vertex-merging distance used by the Truck B-rep adapter.
    pub truck_tolerance: f64,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            coincidence_tolerance: 1e-7,
            loft_tolerance: 1e-6,
            samples_per_turn: 256,
            ring_samples: 256,
            smooth_subdivisions: 8,
            truck_tolerance: 1e-7,
        }
    }
}

impl ModelingConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("coincidence_tolerance", self.coincidence_tolerance),
            ("loft_tolerance", self.loft_tolerance),
            ("truck_tolerance", self.truck_tolerance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        for (field, value) in [
            ("samples_per_turn", self.samples_per_turn),
            ("ring_samples", self.ring_samples),
        ] {
            if value < 8 {
                return Err(ConfigError::InvalidValue { field, value: value as f64 });
            }
        }
        Ok(())
    }
}
