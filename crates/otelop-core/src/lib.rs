//! Otelop Core - Core types for the OpenTelemetry collector manifest engine
//!
//! This crate provides the foundational types used throughout otelop:
//! - `OpenTelemetryCollector`: The custom resource describing a collector deployment
//! - `Config`: Operator-wide runtime settings passed to every manifest builder
//! - `CoreError`: Loading and parsing errors

pub mod collector;
pub mod config;
pub mod error;

pub use collector::{
    AutoscalerSpec, CollectorSpec, IngressSpec, IngressType, MetricsConfigSpec, Mode,
    ObservabilitySpec, OpenTelemetryCollector, PrometheusCrSpec, RouteSpec,
    TargetAllocatorSpec, TlsRouteTermination,
};
pub use config::{Config, RoutesAvailability};
pub use error::{CoreError, Result};
