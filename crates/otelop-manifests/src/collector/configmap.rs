use k8s_openapi::api::core::v1::ConfigMap;
use otelop_core::{Config, OpenTelemetryCollector};
use std::collections::BTreeMap;

use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;

/// ConfigMap holding the collector configuration, mounted by the workload
pub fn config_map(config: &Config, instance: &OpenTelemetryCollector) -> Option<ConfigMap> {
    let name = naming::config_map(instance.name());

    Some(ConfigMap {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        data: Some(BTreeMap::from([(
            config.collector_config_map_entry.clone(),
            instance.spec.config.clone(),
        )])),
        ..Default::default()
    })
}
