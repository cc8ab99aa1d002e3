//! Error types for otelop-kube

use std::time::Duration;
use thiserror::Error;

/// Result type for otelop-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur while talking to the cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// The namespace to watch does not exist
    #[error("namespace '{0}' not found")]
    NamespaceNotFound(String),

    /// Timeout
    #[error("{what} not ready after {timeout:?}")]
    Timeout { what: String, timeout: Duration },
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = KubeError::Timeout {
            what: "hpa 'simplest-collector'".to_string(),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "hpa 'simplest-collector' not ready after 2s");
    }

    #[test]
    fn test_namespace_not_found_is_not_api_404() {
        let err = KubeError::NamespaceNotFound("missing".to_string());
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("missing"));
    }
}
