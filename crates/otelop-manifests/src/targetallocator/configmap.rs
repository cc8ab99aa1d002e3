use k8s_openapi::api::core::v1::ConfigMap;
use otelop_core::{Config, OpenTelemetryCollector};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ManifestError, Result};
use crate::labels::{self, COLLECTOR_COMPONENT, TARGET_ALLOCATOR_COMPONENT};
use crate::naming;
use crate::otelconfig::CollectorConfig;

pub const DEFAULT_ALLOCATION_STRATEGY: &str = "least-weighted";

/// Contents of the target allocator configuration file
#[derive(Debug, Serialize)]
struct TargetAllocatorConfig<'a> {
    allocation_strategy: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_strategy: Option<&'a str>,
    /// Collector pods the targets are distributed over
    label_selector: BTreeMap<String, String>,
    config: &'a serde_yaml::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    prometheus_cr: Option<PrometheusCr<'a>>,
}

#[derive(Debug, Serialize)]
struct PrometheusCr<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    scrape_interval: Option<&'a str>,
}

/// ConfigMap with the scrape configuration taken from the collector's
/// Prometheus receiver.
///
/// Fails when the collector configuration cannot be parsed or has no
/// Prometheus receiver, since the allocator would have nothing to distribute.
pub fn config_map(config: &Config, instance: &OpenTelemetryCollector) -> Result<Option<ConfigMap>> {
    let ta = &instance.spec.target_allocator;

    let parsed = CollectorConfig::parse(&instance.spec.config)?;
    let prometheus = parsed
        .prometheus_config()
        .ok_or_else(|| ManifestError::NoPrometheusReceiver {
            name: instance.name().to_string(),
        })?;

    let content = serde_yaml::to_string(&TargetAllocatorConfig {
        allocation_strategy: ta
            .allocation_strategy
            .as_deref()
            .unwrap_or(DEFAULT_ALLOCATION_STRATEGY),
        filter_strategy: ta.filter_strategy.as_deref(),
        label_selector: labels::selector(instance, COLLECTOR_COMPONENT),
        config: prometheus,
        prometheus_cr: ta.prometheus_cr.enabled.then(|| PrometheusCr {
            scrape_interval: ta.prometheus_cr.scrape_interval.as_deref(),
        }),
    })?;

    let name = naming::target_allocator(instance.name());
    Ok(Some(ConfigMap {
        metadata: labels::object_meta(config, instance, &name, TARGET_ALLOCATOR_COMPONENT),
        data: Some(BTreeMap::from([(
            config.target_allocator_config_map_entry.clone(),
            content,
        )])),
        ..Default::default()
    }))
}
