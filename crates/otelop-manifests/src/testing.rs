//! Shared test doubles and fixtures

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_core::{CollectorSpec, OpenTelemetryCollector};

use crate::error::ManifestError;
use crate::factory::ManifestFactory;
use crate::manifest::Manifest;

pub const OTLP_CONFIG: &str = r#"
receivers:
  otlp:
    protocols:
      grpc:
      http:
exporters:
  debug:
service:
  pipelines:
    traces:
      receivers: [otlp]
      exporters: [debug]
"#;

pub const PROMETHEUS_CONFIG: &str = r#"
receivers:
  prometheus:
    config:
      scrape_configs:
        - job_name: otel-collector
          scrape_interval: 10s
          static_configs:
            - targets: ["0.0.0.0:8888"]
exporters:
  debug:
service:
  pipelines:
    metrics:
      receivers: [prometheus]
      exporters: [debug]
"#;

pub fn sample_instance() -> OpenTelemetryCollector {
    OpenTelemetryCollector::new("simplest", "observability").with_spec(CollectorSpec {
        config: OTLP_CONFIG.to_string(),
        ..Default::default()
    })
}

pub fn named_config_map(name: &str) -> Manifest {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
    .into()
}

/// A factory that counts its invocations and returns a fixed result.
/// `Err(message)` becomes `ManifestError::InvalidCollectorConfig(message)`.
pub fn counting(
    name: &'static str,
    calls: Arc<AtomicUsize>,
    result: std::result::Result<Option<Manifest>, String>,
) -> ManifestFactory {
    ManifestFactory::fallible(name, move |_, _| {
        calls.fetch_add(1, Ordering::SeqCst);
        result
            .clone()
            .map_err(ManifestError::InvalidCollectorConfig)
    })
}
