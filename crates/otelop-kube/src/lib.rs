//! otelop Kube - cluster-facing helpers for otelop
//!
//! This crate provides:
//! - **Capability detection**: which optional APIs (Prometheus operator,
//!   OpenShift routes) the cluster serves, usable as feature gates
//! - **Autoscaler readiness**: polling an HPA until it reports metrics

pub mod autodetect;
pub mod error;
pub mod hpa;

pub use autodetect::ClusterCapabilities;
pub use error::{KubeError, Result};
pub use hpa::{WaitOptions, wait_until_ready};
