use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use otelop_core::{Config, IngressType, OpenTelemetryCollector};
use std::collections::BTreeMap;

use crate::collector::service::collector_ports;
use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;

/// Ingress routing `/{port}` to each collector service port.
///
/// Only built for `ingress.type: ingress`.
pub fn ingress(config: &Config, instance: &OpenTelemetryCollector) -> Option<Ingress> {
    let spec = &instance.spec.ingress;
    if spec.type_ != Some(IngressType::Ingress) {
        return None;
    }

    let ports = collector_ports(instance)?;
    let service_name = naming::service(instance.name());

    let paths = ports
        .iter()
        .filter_map(|port| port.name.as_ref())
        .map(|port_name| HTTPIngressPath {
            path: Some(format!("/{}", port_name)),
            path_type: "Prefix".to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service_name.clone(),
                    port: Some(ServiceBackendPort {
                        name: Some(port_name.clone()),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
        })
        .collect();

    let name = naming::ingress(instance.name());
    let mut metadata = labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT);
    if !spec.annotations.is_empty() {
        metadata
            .annotations
            .get_or_insert_with(BTreeMap::new)
            .extend(spec.annotations.clone());
    }

    Some(Ingress {
        metadata,
        spec: Some(IngressSpec {
            ingress_class_name: spec.ingress_class_name.clone(),
            tls: Some(spec.tls.clone()).filter(|tls| !tls.is_empty()),
            rules: Some(vec![IngressRule {
                host: spec.hostname.clone(),
                http: Some(HTTPIngressRuleValue { paths }),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}
