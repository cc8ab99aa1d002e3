use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use otelop_core::{Config, OpenTelemetryCollector};

use super::deployment::HTTP_PORT_NAME;
use crate::labels::{self, TARGET_ALLOCATOR_COMPONENT};
use crate::naming;

pub const PORT_NAME: &str = "targetallocation";
pub const PORT: i32 = 80;

/// Service the collectors query for their assigned targets
pub fn service(config: &Config, instance: &OpenTelemetryCollector) -> Option<Service> {
    let name = naming::target_allocator(instance.name());

    Some(Service {
        metadata: labels::object_meta(config, instance, &name, TARGET_ALLOCATOR_COMPONENT),
        spec: Some(ServiceSpec {
            selector: Some(labels::selector(instance, TARGET_ALLOCATOR_COMPONENT)),
            ports: Some(vec![ServicePort {
                name: Some(PORT_NAME.to_string()),
                port: PORT,
                target_port: Some(IntOrString::String(HTTP_PORT_NAME.to_string())),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}
