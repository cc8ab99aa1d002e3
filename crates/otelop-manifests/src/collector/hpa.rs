//! Horizontal pod autoscaler for scalable collector workloads

use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::{
    CrossVersionObjectReference, HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec,
    MetricSpec, MetricTarget, ResourceMetricSource,
};
use k8s_openapi::Resource;
use otelop_core::{Config, Mode, OpenTelemetryCollector};

use crate::labels::{self, COLLECTOR_COMPONENT};
use crate::naming;

pub const DEFAULT_CPU_UTILIZATION: i32 = 90;

/// Built only when `autoscaler.maxReplicas` is set and the mode can scale
pub fn horizontal_pod_autoscaler(
    config: &Config,
    instance: &OpenTelemetryCollector,
) -> Option<HorizontalPodAutoscaler> {
    let autoscaler = instance.spec.autoscaler.as_ref()?;
    let max_replicas = autoscaler.max_replicas?;

    let (api_version, kind) = match instance.spec.mode {
        Mode::Deployment => (Deployment::API_VERSION, Deployment::KIND),
        Mode::StatefulSet => (StatefulSet::API_VERSION, StatefulSet::KIND),
        Mode::DaemonSet | Mode::Sidecar => {
            tracing::debug!(
                instance = instance.name(),
                mode = %instance.spec.mode,
                "autoscaler ignored for mode"
            );
            return None;
        }
    };

    let min_replicas = autoscaler
        .min_replicas
        .or(instance.spec.replicas)
        .unwrap_or(1);

    let mut metrics = vec![utilization_metric(
        "cpu",
        autoscaler
            .target_cpu_utilization
            .unwrap_or(DEFAULT_CPU_UTILIZATION),
    )];
    if let Some(memory) = autoscaler.target_memory_utilization {
        metrics.push(utilization_metric("memory", memory));
    }

    let name = naming::horizontal_pod_autoscaler(instance.name());

    Some(HorizontalPodAutoscaler {
        metadata: labels::object_meta(config, instance, &name, COLLECTOR_COMPONENT),
        spec: Some(HorizontalPodAutoscalerSpec {
            scale_target_ref: CrossVersionObjectReference {
                api_version: Some(api_version.to_string()),
                kind: kind.to_string(),
                name: naming::collector(instance.name()),
            },
            min_replicas: Some(min_replicas),
            max_replicas,
            metrics: Some(metrics),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn utilization_metric(resource: &str, utilization: i32) -> MetricSpec {
    MetricSpec {
        type_: "Resource".to_string(),
        resource: Some(ResourceMetricSource {
            name: resource.to_string(),
            target: MetricTarget {
                type_: "Utilization".to_string(),
                average_utilization: Some(utilization),
                ..Default::default()
            },
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_instance;
    use otelop_core::AutoscalerSpec;

    fn autoscaled(mode: Mode) -> OpenTelemetryCollector {
        let mut instance = sample_instance();
        instance.spec.mode = mode;
        instance.spec.replicas = Some(2);
        instance.spec.autoscaler = Some(AutoscalerSpec {
            max_replicas: Some(10),
            target_memory_utilization: Some(80),
            ..Default::default()
        });
        instance
    }

    #[test]
    fn test_absent_without_max_replicas() {
        let mut instance = sample_instance();
        assert!(horizontal_pod_autoscaler(&Config::default(), &instance).is_none());

        instance.spec.autoscaler = Some(AutoscalerSpec {
            min_replicas: Some(2),
            ..Default::default()
        });
        assert!(horizontal_pod_autoscaler(&Config::default(), &instance).is_none());
    }

    #[test]
    fn test_deployment_target() {
        let hpa = horizontal_pod_autoscaler(&Config::default(), &autoscaled(Mode::Deployment))
            .unwrap();
        let spec = hpa.spec.unwrap();

        assert_eq!(spec.scale_target_ref.kind, "Deployment");
        assert_eq!(spec.scale_target_ref.api_version.as_deref(), Some("apps/v1"));
        assert_eq!(spec.scale_target_ref.name, "simplest-collector");
        assert_eq!(spec.min_replicas, Some(2));
        assert_eq!(spec.max_replicas, 10);

        let metrics = spec.metrics.unwrap();
        assert_eq!(metrics.len(), 2);
        let cpu = metrics[0].resource.as_ref().unwrap();
        assert_eq!(cpu.name, "cpu");
        assert_eq!(cpu.target.average_utilization, Some(DEFAULT_CPU_UTILIZATION));
        assert_eq!(metrics[1].resource.as_ref().unwrap().name, "memory");
    }

    #[test]
    fn test_stateful_set_target() {
        let hpa = horizontal_pod_autoscaler(&Config::default(), &autoscaled(Mode::StatefulSet))
            .unwrap();
        assert_eq!(hpa.spec.unwrap().scale_target_ref.kind, "StatefulSet");
    }

    #[test]
    fn test_unscalable_modes() {
        for mode in [Mode::DaemonSet, Mode::Sidecar] {
            assert!(horizontal_pod_autoscaler(&Config::default(), &autoscaled(mode)).is_none());
        }
    }
}
