use k8s_openapi::api::core::v1::ServiceAccount;
use otelop_core::{Config, OpenTelemetryCollector};

use crate::labels::{self, TARGET_ALLOCATOR_COMPONENT};
use crate::naming;

pub fn service_account(config: &Config, instance: &OpenTelemetryCollector) -> Option<ServiceAccount> {
    if instance.spec.target_allocator.service_account.is_some() {
        return None;
    }

    let name = naming::target_allocator(instance.name());
    Some(ServiceAccount {
        metadata: labels::object_meta(config, instance, &name, TARGET_ALLOCATOR_COMPONENT),
        ..Default::default()
    })
}
