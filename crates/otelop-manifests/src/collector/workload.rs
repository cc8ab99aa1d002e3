//! Collector workloads: Deployment, StatefulSet and DaemonSet
//!
//! All three share one pod template; they differ only in the controller
//! fields around it.

use k8s_openapi::api::apps::v1::{
    DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec, StatefulSet, StatefulSetSpec,
};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EnvVar, EnvVarSource, KeyToPath,
    ObjectFieldSelector, PodSpec, PodTemplateSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use otelop_core::{Config, OpenTelemetryCollector};

use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;
use crate::otelconfig::{self, CollectorConfig, DEFAULT_METRICS_PORT};

const CONFIG_MOUNT_PATH: &str = "/conf";

pub fn deployment(config: &Config, instance: &OpenTelemetryCollector) -> Option<Deployment> {
    let name = naming::collector(instance.name());

    Some(Deployment {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        spec: Some(DeploymentSpec {
            replicas: instance.spec.replicas,
            selector: selector(instance),
            template: pod_template(config, instance),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub fn stateful_set(config: &Config, instance: &OpenTelemetryCollector) -> Option<StatefulSet> {
    let name = naming::collector(instance.name());

    Some(StatefulSet {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        spec: Some(StatefulSetSpec {
            replicas: instance.spec.replicas,
            service_name: naming::headless_service(instance.name()),
            selector: selector(instance),
            template: pod_template(config, instance),
            pod_management_policy: Some("Parallel".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

pub fn daemon_set(config: &Config, instance: &OpenTelemetryCollector) -> Option<DaemonSet> {
    let name = naming::collector(instance.name());

    Some(DaemonSet {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        spec: Some(DaemonSetSpec {
            selector: selector(instance),
            template: pod_template(config, instance),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn selector(instance: &OpenTelemetryCollector) -> LabelSelector {
    LabelSelector {
        match_labels: Some(labels::selector(instance, COLLECTOR_COMPONENT)),
        ..Default::default()
    }
}

fn pod_template(config: &Config, instance: &OpenTelemetryCollector) -> PodTemplateSpec {
    let spec = &instance.spec;
    let name = naming::collector(instance.name());

    let service_account = spec
        .service_account
        .clone()
        .unwrap_or_else(|| naming::service_account(instance.name()));

    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels::labels(config, instance, &name, COLLECTOR_COMPONENT)),
            annotations: Some(spec.pod_annotations.clone()).filter(|a| !a.is_empty()),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            service_account_name: Some(service_account),
            containers: vec![container(config, instance)],
            volumes: Some(vec![Volume {
                name: naming::config_volume().to_string(),
                config_map: Some(ConfigMapVolumeSource {
                    name: naming::config_map(instance.name()),
                    items: Some(vec![KeyToPath {
                        key: config.collector_config_map_entry.clone(),
                        path: config.collector_config_map_entry.clone(),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            node_selector: Some(spec.node_selector.clone()).filter(|n| !n.is_empty()),
            host_network: spec.host_network.then_some(true),
            ..Default::default()
        }),
    }
}

fn container(config: &Config, instance: &OpenTelemetryCollector) -> Container {
    let spec = &instance.spec;

    let mut env = vec![EnvVar {
        name: "POD_NAME".to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: "metadata.name".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }];
    env.extend(spec.env.iter().cloned());

    Container {
        name: naming::container().to_string(),
        image: Some(
            spec.image
                .clone()
                .unwrap_or_else(|| config.collector_image.clone()),
        ),
        image_pull_policy: spec.image_pull_policy.clone(),
        args: Some(vec![format!(
            "--config={}/{}",
            CONFIG_MOUNT_PATH, config.collector_config_map_entry
        )]),
        ports: Some(ports(instance)),
        env: Some(env),
        volume_mounts: Some(vec![VolumeMount {
            name: naming::config_volume().to_string(),
            mount_path: CONFIG_MOUNT_PATH.to_string(),
            ..Default::default()
        }]),
        resources: spec.resources.clone(),
        ..Default::default()
    }
}

/// Receiver ports plus the collector's own metrics port.
///
/// The workload is still rendered when the config is invalid; the pod will
/// report the configuration error itself.
fn ports(instance: &OpenTelemetryCollector) -> Vec<ContainerPort> {
    let parsed = match CollectorConfig::parse(&instance.spec.config) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(instance = instance.name(), error = %e, "could not infer container ports");
            None
        }
    };

    let mut ports = match &parsed {
        Some(parsed) => otelconfig::container_ports(&otelconfig::service_ports(
            &instance.spec.ports,
            parsed,
        )),
        None => otelconfig::container_ports(&instance.spec.ports),
    };

    let metrics_port = parsed
        .as_ref()
        .and_then(|p| p.metrics_port().ok())
        .unwrap_or(DEFAULT_METRICS_PORT);
    if !ports.iter().any(|p| p.container_port == metrics_port) {
        ports.push(ContainerPort {
            name: Some("metrics".to_string()),
            container_port: metrics_port,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        });
    }

    ports
}
