//! Prometheus operator ServiceMonitor scraping the collector's own metrics

use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use otelop_core::{Config, OpenTelemetryCollector};
use serde_json::json;
use std::collections::BTreeMap;

use crate::collector::service::{MONITORING_LABEL, MONITORING_PORT_NAME};
use crate::error::Result;
use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;
use crate::otelconfig::CollectorConfig;

pub const GROUP: &str = "monitoring.coreos.com";
pub const VERSION: &str = "v1";
pub const KIND: &str = "ServiceMonitor";

/// Fails when the collector configuration or its metrics address is invalid,
/// since the monitor would point at a port that does not exist.
pub fn service_monitor(
    config: &Config,
    instance: &OpenTelemetryCollector,
) -> Result<Option<DynamicObject>> {
    // Validates the address the monitoring service is built from
    CollectorConfig::parse(&instance.spec.config)?.metrics_port()?;

    let name = naming::collector(instance.name());
    let resource = ApiResource::from_gvk(&GroupVersionKind::gvk(GROUP, VERSION, KIND));

    let match_labels = BTreeMap::from([
        (labels::MANAGED_BY, labels::OPERATOR.to_string()),
        (labels::INSTANCE, labels::instance_label(instance)),
        (MONITORING_LABEL, "Exists".to_string()),
    ]);

    let mut monitor = DynamicObject::new(&name, &resource).data(json!({
        "spec": {
            "endpoints": [{ "port": MONITORING_PORT_NAME }],
            "namespaceSelector": { "matchNames": [instance.namespace()] },
            "selector": { "matchLabels": match_labels }
        }
    }));
    monitor.metadata = labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT);

    Ok(Some(monitor))
}
