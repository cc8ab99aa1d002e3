use k8s_openapi::api::core::v1::ServiceAccount;
use otelop_core::{Config, OpenTelemetryCollector};

use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;

/// Service account for the collector pods, unless the instance brings its own
pub fn service_account(config: &Config, instance: &OpenTelemetryCollector) -> Option<ServiceAccount> {
    if instance.spec.service_account.is_some() {
        return None;
    }

    let name = naming::service_account(instance.name());
    Some(ServiceAccount {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        ..Default::default()
    })
}
