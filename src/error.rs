//! Error types for the grouping engine.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors surfaced by the grouping engine.
///
/// Bad individual items never produce an error during a regroup; they are
/// skipped and logged. Errors are reserved for caller mistakes.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Latitude/longitude outside the valid range or not finite
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Configuration rejected by validation; the previous configuration stays active
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A completion token was signalled for a run that is no longer in flight
    #[error("stale completion token for run {token_run} (current run: {current_run:?})")]
    StaleCompletion {
        token_run: u64,
        current_run: Option<u64>,
    },

    /// Configuration could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ClusterError {
    fn from(err: toml::de::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::ser::Error> for ClusterError {
    fn from(err: toml::ser::Error) -> Self {
        ClusterError::Serialization(err.to_string())
    }
}
