use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, EnvVar, EnvVarSource, KeyToPath,
    ObjectFieldSelector, PodSpec, PodTemplateSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use otelop_core::{Config, OpenTelemetryCollector};

use crate::labels::{self, TARGET_ALLOCATOR_COMPONENT};
use crate::naming;

const CONFIG_MOUNT_PATH: &str = "/conf";

/// Port the allocator serves its HTTP API on
pub const HTTP_PORT: i32 = 8080;
pub const HTTP_PORT_NAME: &str = "http";

pub fn deployment(config: &Config, instance: &OpenTelemetryCollector) -> Option<Deployment> {
    let ta = &instance.spec.target_allocator;
    let name = naming::target_allocator(instance.name());

    let service_account = ta
        .service_account
        .clone()
        .unwrap_or_else(|| naming::target_allocator(instance.name()));

    let container = Container {
        name: naming::target_allocator_container().to_string(),
        image: Some(
            ta.image
                .clone()
                .unwrap_or_else(|| config.target_allocator_image.clone()),
        ),
        ports: Some(vec![ContainerPort {
            name: Some(HTTP_PORT_NAME.to_string()),
            container_port: HTTP_PORT,
            protocol: Some("TCP".to_string()),
            ..Default::default()
        }]),
        env: Some(vec![EnvVar {
            name: "OTELCOL_NAMESPACE".to_string(),
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    field_path: "metadata.namespace".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        volume_mounts: Some(vec![VolumeMount {
            name: naming::target_allocator_config_volume().to_string(),
            mount_path: CONFIG_MOUNT_PATH.to_string(),
            ..Default::default()
        }]),
        resources: ta.resources.clone(),
        ..Default::default()
    };

    let template = PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels::labels(
                config,
                instance,
                &name,
                TARGET_ALLOCATOR_COMPONENT,
            )),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            service_account_name: Some(service_account),
            containers: vec![container],
            volumes: Some(vec![Volume {
                name: naming::target_allocator_config_volume().to_string(),
                config_map: Some(ConfigMapVolumeSource {
                    name: naming::target_allocator(instance.name()),
                    items: Some(vec![KeyToPath {
                        key: config.target_allocator_config_map_entry.clone(),
                        path: config.target_allocator_config_map_entry.clone(),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            node_selector: Some(ta.node_selector.clone()).filter(|n| !n.is_empty()),
            ..Default::default()
        }),
    };

    Some(Deployment {
        metadata: labels::object_meta(config, instance, &name, TARGET_ALLOCATOR_COMPONENT),
        spec: Some(DeploymentSpec {
            replicas: ta.replicas,
            selector: LabelSelector {
                match_labels: Some(labels::selector(instance, TARGET_ALLOCATOR_COMPONENT)),
                ..Default::default()
            },
            template,
            ..Default::default()
        }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_instance;

    #[test]
    fn test_deployment() {
        let mut instance = sample_instance();
        instance.spec.target_allocator.enabled = true;
        instance.spec.target_allocator.replicas = Some(2);

        let deployment = deployment(&Config::default(), &instance).unwrap();
        assert_eq!(
            deployment.metadata.name.as_deref(),
            Some("simplest-targetallocator")
        );

        let spec = deployment.spec.unwrap();
        assert_eq!(spec.replicas, Some(2));
        assert_eq!(
            spec.selector.match_labels.as_ref().unwrap()[labels::COMPONENT],
            "opentelemetry-targetallocator"
        );

        let pod = spec.template.spec.unwrap();
        assert_eq!(
            pod.service_account_name.as_deref(),
            Some("simplest-targetallocator")
        );
        let container = &pod.containers[0];
        assert_eq!(container.name, "ta-container");
        assert_eq!(
            container.image.as_deref(),
            Some(otelop_core::config::DEFAULT_TARGET_ALLOCATOR_IMAGE)
        );
        assert_eq!(container.ports.as_ref().unwrap()[0].container_port, 8080);

        let volume = &pod.volumes.unwrap()[0];
        assert_eq!(volume.name, "ta-internal");
        let source = volume.config_map.as_ref().unwrap();
        assert_eq!(source.name, "simplest-targetallocator");
        assert_eq!(source.items.as_ref().unwrap()[0].key, "targetallocator.yaml");
    }

    #[test]
    fn test_image_and_service_account_overrides() {
        let mut instance = sample_instance();
        instance.spec.target_allocator.image = Some("ta:custom".to_string());
        instance.spec.target_allocator.service_account = Some("existing".to_string());

        let deployment = deployment(&Config::default(), &instance).unwrap();
        let pod = deployment.spec.unwrap().template.spec.unwrap();
        assert_eq!(pod.service_account_name.as_deref(), Some("existing"));
        assert_eq!(pod.containers[0].image.as_deref(), Some("ta:custom"));
    }
}
