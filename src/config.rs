//! Grouping configuration.
//!
//! The configuration is plain data that can be loaded from JSON (or TOML with
//! the `toml` feature) and swapped at runtime, for example from a debug panel.
//! It takes effect on the next regroup.

use crate::error::{ClusterError, Result};
use crate::quadkey::{MAX_PRECISION, Precision};
use crate::spatial::DistanceMetric;
use serde::{Deserialize, Serialize};

/// Tuning knobs for the clustering pass.
///
/// # Example
///
/// ```rust
/// use quadcluster::GroupingConfig;
///
/// let config = GroupingConfig::default();
/// assert_eq!(config.max_precision, 16);
///
/// let json = r#"{
///     "max_precision": 18,
///     "aggressiveness": 0.5
/// }"#;
/// let config = GroupingConfig::from_json(json).unwrap();
/// assert_eq!(config.precision_delta, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupingConfig {
    /// Finest precision clustering will ever run at (1-32, default: 16)
    #[serde(default = "GroupingConfig::default_max_precision")]
    pub max_precision: Precision,

    /// Levels added to the zoom-derived precision before clustering (default: 4)
    #[serde(default = "GroupingConfig::default_precision_delta")]
    pub precision_delta: Precision,

    /// Fraction of a cell diagonal under which adjacent buckets merge (default: 0.67)
    #[serde(default = "GroupingConfig::default_aggressiveness")]
    pub aggressiveness: f64,

    /// Metric used for the merge distance test
    #[serde(default)]
    pub distance_metric: DistanceMetric,
}

impl GroupingConfig {
    const fn default_max_precision() -> Precision {
        16
    }

    const fn default_precision_delta() -> Precision {
        4
    }

    const fn default_aggressiveness() -> f64 {
        0.67
    }

    pub fn with_max_precision(mut self, max_precision: Precision) -> Self {
        self.max_precision = max_precision;
        self
    }

    pub fn with_precision_delta(mut self, precision_delta: Precision) -> Self {
        self.precision_delta = precision_delta;
        self
    }

    pub fn with_aggressiveness(mut self, aggressiveness: f64) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    pub fn with_distance_metric(mut self, metric: DistanceMetric) -> Self {
        self.distance_metric = metric;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_precision < 1 || self.max_precision > MAX_PRECISION {
            return Err(ClusterError::InvalidConfig(format!(
                "max_precision must be between 1 and {}, got {}",
                MAX_PRECISION, self.max_precision
            )));
        }

        if self.precision_delta > MAX_PRECISION {
            return Err(ClusterError::InvalidConfig(format!(
                "precision_delta must be at most {}, got {}",
                MAX_PRECISION, self.precision_delta
            )));
        }

        if !self.aggressiveness.is_finite() {
            return Err(ClusterError::InvalidConfig(
                "aggressiveness must be finite (not NaN or infinity)".to_string(),
            ));
        }

        if self.aggressiveness < 0.0 {
            return Err(ClusterError::InvalidConfig(format!(
                "aggressiveness must not be negative, got {}",
                self.aggressiveness
            )));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GroupingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: GroupingConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_precision: Self::default_max_precision(),
            precision_delta: Self::default_precision_delta(),
            aggressiveness: Self::default_aggressiveness(),
            distance_metric: DistanceMetric::default(),
        }
    }
}
