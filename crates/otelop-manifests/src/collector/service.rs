//! Collector services: the main service, its headless twin, and the
//! monitoring service exposing the collector's own metrics

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use otelop_core::{Config, Mode, OpenTelemetryCollector};
use std::collections::BTreeMap;

use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;
use crate::otelconfig::{self, CollectorConfig};

pub const HEADLESS_LABEL: &str = "operator.opentelemetry.io/collector-headless-service";
pub const MONITORING_LABEL: &str = "operator.opentelemetry.io/collector-monitoring-service";
pub const SERVING_CERT_ANNOTATION: &str = "service.beta.openshift.io/serving-cert-secret-name";

/// Name of the monitoring service port, referenced by the ServiceMonitor
pub const MONITORING_PORT_NAME: &str = "monitoring";

/// Ports the collector service exposes, or `None` when there is nothing to expose
pub(crate) fn collector_ports(instance: &OpenTelemetryCollector) -> Option<Vec<ServicePort>> {
    let parsed = match CollectorConfig::parse(&instance.spec.config) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(
                instance = instance.name(),
                error = %e,
                "couldn't parse the collector configuration, skipping service"
            );
            return None;
        }
    };

    let ports = otelconfig::service_ports(&instance.spec.ports, &parsed);
    if ports.is_empty() {
        tracing::debug!(instance = instance.name(), "no ports to expose, skipping service");
        return None;
    }
    Some(ports)
}

pub fn service(config: &Config, instance: &OpenTelemetryCollector) -> Option<Service> {
    if instance.spec.mode == Mode::Sidecar {
        return None;
    }
    let ports = collector_ports(instance)?;

    let name = naming::service(instance.name());
    Some(Service {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        spec: Some(ServiceSpec {
            selector: Some(labels::selector(instance, COLLECTOR_COMPONENT)),
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Headless variant of [`service`], used for per-pod DNS
pub fn headless_service(config: &Config, instance: &OpenTelemetryCollector) -> Option<Service> {
    let mut headless = service(config, instance)?;
    let name = naming::headless_service(instance.name());

    let mut metadata = labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT);
    metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(HEADLESS_LABEL.to_string(), "Exists".to_string());
    metadata.annotations.get_or_insert_with(BTreeMap::new).insert(
        SERVING_CERT_ANNOTATION.to_string(),
        format!("{}-tls", name),
    );
    headless.metadata = metadata;

    if let Some(spec) = headless.spec.as_mut() {
        spec.cluster_ip = Some("None".to_string());
    }
    Some(headless)
}

pub fn monitoring_service(config: &Config, instance: &OpenTelemetryCollector) -> Option<Service> {
    if instance.spec.mode == Mode::Sidecar {
        return None;
    }

    let metrics_port = match CollectorConfig::parse(&instance.spec.config)
        .and_then(|parsed| parsed.metrics_port())
    {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(
                instance = instance.name(),
                error = %e,
                "couldn't determine metrics port, skipping monitoring service"
            );
            return None;
        }
    };

    let name = naming::monitoring_service(instance.name());
    let mut metadata = labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT);
    metadata
        .labels
        .get_or_insert_with(BTreeMap::new)
        .insert(MONITORING_LABEL.to_string(), "Exists".to_string());

    Some(Service {
        metadata,
        spec: Some(ServiceSpec {
            selector: Some(labels::selector(instance, COLLECTOR_COMPONENT)),
            cluster_ip: Some(String::new()),
            ports: Some(vec![ServicePort {
                name: Some(MONITORING_PORT_NAME.to_string()),
                port: metrics_port,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_instance;

    fn port_numbers(service: &Service) -> Vec<i32> {
        service
            .spec
            .as_ref()
            .unwrap()
            .ports
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.port)
            .collect()
    }

    #[test]
    fn test_service() {
        let service = service(&Config::default(), &sample_instance()).unwrap();
        assert_eq!(service.metadata.name.as_deref(), Some("simplest-collector"));
        assert_eq!(port_numbers(&service), vec![4317, 4318]);
        assert!(service.spec.unwrap().cluster_ip.is_none());
    }

    #[test]
    fn test_no_ports_no_service() {
        let mut instance = sample_instance();
        instance.spec.config = "receivers:\n  hostmetrics:\n".to_string();
        assert!(service(&Config::default(), &instance).is_none());
        assert!(headless_service(&Config::default(), &instance).is_none());
    }

    #[test]
    fn test_invalid_config_no_service() {
        let mut instance = sample_instance();
        instance.spec.config = "receivers: [".to_string();
        assert!(service(&Config::default(), &instance).is_none());
    }

    #[test]
    fn test_sidecar_has_no_services() {
        let mut instance = sample_instance();
        instance.spec.mode = Mode::Sidecar;
        assert!(service(&Config::default(), &instance).is_none());
        assert!(headless_service(&Config::default(), &instance).is_none());
        assert!(monitoring_service(&Config::default(), &instance).is_none());
    }

    #[test]
    fn test_headless_service() {
        let headless = headless_service(&Config::default(), &sample_instance()).unwrap();

        assert_eq!(
            headless.metadata.name.as_deref(),
            Some("simplest-collector-headless")
        );
        assert_eq!(headless.metadata.labels.as_ref().unwrap()[HEADLESS_LABEL], "Exists");
        assert_eq!(
            headless.metadata.annotations.as_ref().unwrap()[SERVING_CERT_ANNOTATION],
            "simplest-collector-headless-tls"
        );
        assert_eq!(port_numbers(&headless), vec![4317, 4318]);
        assert_eq!(headless.spec.unwrap().cluster_ip.as_deref(), Some("None"));
    }

    #[test]
    fn test_monitoring_service() {
        let monitoring = monitoring_service(&Config::default(), &sample_instance()).unwrap();

        assert_eq!(
            monitoring.metadata.name.as_deref(),
            Some("simplest-collector-monitoring")
        );
        assert_eq!(
            monitoring.metadata.labels.as_ref().unwrap()[MONITORING_LABEL],
            "Exists"
        );
        assert_eq!(port_numbers(&monitoring), vec![8888]);
    }

    #[test]
    fn test_monitoring_service_invalid_address() {
        let mut instance = sample_instance();
        instance.spec.config =
            "service:\n  telemetry:\n    metrics:\n      address: nowhere\n".to_string();
        assert!(monitoring_service(&Config::default(), &instance).is_none());
    }
}
