//! CLI error types with exit code handling

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Instance or configuration could not be loaded
    #[error("Input error: {message}")]
    #[diagnostic(code(otelop::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest composition failed, nothing was rendered
    #[error("Composition failed: {message}")]
    #[diagnostic(
        code(otelop::cli::composition),
        help("check the collector configuration in spec.config")
    )]
    Composition { message: String },

    /// Talking to the cluster failed
    #[error("Cluster error: {message}")]
    #[diagnostic(code(otelop::cli::cluster))]
    Cluster { message: String },

    /// Waited too long
    #[error("{message}")]
    #[diagnostic(code(otelop::cli::timeout))]
    Timeout { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Composition { .. } => exit_codes::COMPOSITION_ERROR,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Timeout { .. } => exit_codes::TIMEOUT,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }
}

impl From<otelop_manifests::ManifestError> for CliError {
    fn from(err: otelop_manifests::ManifestError) -> Self {
        CliError::Composition {
            message: err.to_string(),
        }
    }
}

impl From<otelop_kube::KubeError> for CliError {
    fn from(err: otelop_kube::KubeError) -> Self {
        match err {
            otelop_kube::KubeError::Timeout { .. } => CliError::Timeout {
                message: err.to_string(),
            },
            _ => CliError::Cluster {
                message: err.to_string(),
            },
        }
    }
}

impl From<kube::Error> for CliError {
    fn from(err: kube::Error) -> Self {
        CliError::Cluster {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
