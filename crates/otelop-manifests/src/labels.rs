//! Common labels and object metadata

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use otelop_core::{Config, OpenTelemetryCollector};
use std::collections::BTreeMap;

pub const MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const INSTANCE: &str = "app.kubernetes.io/instance";
pub const PART_OF: &str = "app.kubernetes.io/part-of";
pub const COMPONENT: &str = "app.kubernetes.io/component";
pub const NAME: &str = "app.kubernetes.io/name";

pub const OPERATOR: &str = "opentelemetry-operator";

pub const COLLECTOR_COMPONENT: &str = "opentelemetry-collector";
pub const TARGET_ALLOCATOR_COMPONENT: &str = "opentelemetry-targetallocator";

/// `{namespace}.{name}`, unique across the cluster
pub fn instance_label(instance: &OpenTelemetryCollector) -> String {
    format!("{}.{}", instance.namespace(), instance.name())
}

/// Labels identifying the pods of one component of an instance
pub fn selector(instance: &OpenTelemetryCollector, component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (MANAGED_BY.to_string(), OPERATOR.to_string()),
        (INSTANCE.to_string(), instance_label(instance)),
        (PART_OF.to_string(), "opentelemetry".to_string()),
        (COMPONENT.to_string(), component.to_string()),
    ])
}

/// Instance labels (minus filtered ones) plus the selector labels and object name
pub fn labels(
    config: &Config,
    instance: &OpenTelemetryCollector,
    name: &str,
    component: &str,
) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = instance
        .metadata
        .labels
        .iter()
        .flatten()
        .filter(|(key, _)| !config.is_label_filtered(key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    labels.extend(selector(instance, component));
    labels.insert(NAME.to_string(), name.to_string());
    labels
}

/// Metadata for an object owned by the instance
pub fn object_meta(
    config: &Config,
    instance: &OpenTelemetryCollector,
    name: &str,
    component: &str,
) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(instance.namespace().to_string()),
        labels: Some(labels(config, instance, name, component)),
        annotations: instance
            .metadata
            .annotations
            .clone()
            .filter(|annotations| !annotations.is_empty()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_instance;

    #[test]
    fn test_selector() {
        let selector = selector(&sample_instance(), COLLECTOR_COMPONENT);
        assert_eq!(selector[INSTANCE], "observability.simplest");
        assert_eq!(selector[MANAGED_BY], OPERATOR);
        assert_eq!(selector.len(), 4);
    }

    #[test]
    fn test_labels_propagate_and_filter() {
        let mut instance = sample_instance();
        instance.metadata.labels = Some(BTreeMap::from([
            ("team".to_string(), "platform".to_string()),
            ("secret.example.com/owner".to_string(), "x".to_string()),
            // Operator labels win over user labels
            (COMPONENT.to_string(), "mine".to_string()),
        ]));
        let config =
            Config::default().with_labels_filter(vec!["secret.example.com/*".to_string()]);

        let labels = labels(&config, &instance, "simplest-collector", COLLECTOR_COMPONENT);

        assert_eq!(labels["team"], "platform");
        assert!(!labels.contains_key("secret.example.com/owner"));
        assert_eq!(labels[COMPONENT], COLLECTOR_COMPONENT);
        assert_eq!(labels[NAME], "simplest-collector");
    }

    #[test]
    fn test_object_meta() {
        let meta = object_meta(
            &Config::default(),
            &sample_instance(),
            "simplest-collector",
            COLLECTOR_COMPONENT,
        );
        assert_eq!(meta.name.as_deref(), Some("simplest-collector"));
        assert_eq!(meta.namespace.as_deref(), Some("observability"));
        assert!(meta.annotations.is_none());
    }
}
