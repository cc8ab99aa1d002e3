//! OpenShift routes, one per collector service port

use kube::api::{ApiResource, DynamicObject};
use kube::core::GroupVersionKind;
use otelop_core::{Config, IngressType, Mode, OpenTelemetryCollector, RoutesAvailability};
use serde_json::json;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::manifest::Manifest;
use crate::naming;
use crate::otelconfig::{self, CollectorConfig};

pub const GROUP: &str = "route.openshift.io";
pub const VERSION: &str = "v1";
pub const KIND: &str = "Route";

/// Routes for `ingress.type: route` on clusters serving the routes API.
///
/// Yields zero or more objects in service port order. Unlike the service
/// builders, an unparsable collector configuration is an error here.
pub fn routes(config: &Config, instance: &OpenTelemetryCollector) -> Result<Vec<Manifest>> {
    let spec = &instance.spec.ingress;
    if spec.type_ != Some(IngressType::Route) {
        return Ok(Vec::new());
    }
    if config.openshift_routes != RoutesAvailability::Available {
        tracing::debug!(
            instance = instance.name(),
            "routes requested but the routes API is not available"
        );
        return Ok(Vec::new());
    }
    if instance.spec.mode == Mode::Sidecar {
        tracing::debug!(instance = instance.name(), "routes are not supported in sidecar mode");
        return Ok(Vec::new());
    }

    let parsed = CollectorConfig::parse(&instance.spec.config)?;
    let ports = otelconfig::service_ports(&instance.spec.ports, &parsed);

    let resource = ApiResource::from_gvk(&GroupVersionKind::gvk(GROUP, VERSION, KIND));
    let service_name = naming::service(instance.name());

    let routes = ports
        .iter()
        .filter_map(|port| port.name.as_deref())
        .map(|port_name| {
            let name = naming::route(instance.name(), port_name);

            let mut route_spec = json!({
                "to": { "kind": "Service", "name": service_name },
                "port": { "targetPort": port_name },
                "wildcardPolicy": "None",
            });
            if let Some(hostname) = &spec.hostname {
                route_spec["host"] = json!(format!("{}.{}", port_name, hostname));
            }
            if let Some(termination) = spec.route.termination.as_route_value() {
                route_spec["tls"] = json!({ "termination": termination });
            }

            let mut route = DynamicObject::new(&name, &resource).data(json!({ "spec": route_spec }));
            route.metadata = labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT);
            if !spec.annotations.is_empty() {
                route
                    .metadata
                    .annotations
                    .get_or_insert_with(BTreeMap::new)
                    .extend(spec.annotations.clone());
            }
            Manifest::from(route)
        })
        .collect();

    Ok(routes)
}
