//! Error types for otelop-manifests

use thiserror::Error;

/// Result type for manifest composition
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Errors a manifest builder can report. Any of them aborts the whole composition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// The collector configuration in `spec.config` is not valid YAML
    #[error("invalid collector configuration: {0}")]
    InvalidCollectorConfig(String),

    /// The target allocator needs a Prometheus receiver to take scrape configs from
    #[error("no prometheus receiver configuration found in collector '{name}'")]
    NoPrometheusReceiver { name: String },

    /// `service.telemetry.metrics.address` has no usable port
    #[error("invalid metrics address '{address}': {reason}")]
    InvalidMetricsAddress { address: String, reason: String },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ManifestError {
    fn from(e: serde_json::Error) -> Self {
        ManifestError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for ManifestError {
    fn from(e: serde_yaml::Error) -> Self {
        ManifestError::Serialization(e.to_string())
    }
}
