//! Manifests of the target allocator, which distributes Prometheus scrape
//! targets over the collector pods

pub mod configmap;
pub mod deployment;
pub mod service;
pub mod service_account;

use crate::Params;
use crate::error::Result;
use crate::factory::{self, ManifestFactory};
use crate::manifest::Manifest;

/// Target allocator factories, in execution order
pub fn factories() -> Vec<ManifestFactory> {
    vec![
        ManifestFactory::fallible("targetallocator-configmap", configmap::config_map),
        ManifestFactory::infallible("targetallocator-deployment", deployment::deployment),
        ManifestFactory::infallible(
            "targetallocator-serviceaccount",
            service_account::service_account,
        ),
        ManifestFactory::infallible("targetallocator-service", service::service),
    ]
}

/// Build the target allocator objects, or nothing when it is disabled
pub fn build(params: &Params<'_>) -> Result<Vec<Manifest>> {
    build_with(params, &factories())
}

/// Run the given factories for an enabled target allocator.
///
/// None of them is invoked when the allocator is disabled.
pub fn build_with(params: &Params<'_>, factories: &[ManifestFactory]) -> Result<Vec<Manifest>> {
    if !params.instance.spec.target_allocator.enabled {
        tracing::debug!(
            instance = params.instance.name(),
            "target allocator disabled, skipping"
        );
        return Ok(Vec::new());
    }

    let span = tracing::debug_span!(
        "targetallocator",
        instance = params.instance.name(),
        namespace = params.instance.namespace()
    );
    let _guard = span.enter();

    factory::run(factories, params.config, params.instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use crate::featuregate::StaticFeatureGates;
    use crate::testing::{PROMETHEUS_CONFIG, counting, named_config_map, sample_instance};
    use otelop_core::{Config, OpenTelemetryCollector};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn enabled_instance() -> OpenTelemetryCollector {
        let mut instance = sample_instance();
        instance.spec.config = PROMETHEUS_CONFIG.to_string();
        instance.spec.target_allocator.enabled = true;
        instance
    }

    #[test]
    fn test_disabled_invokes_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factories = vec![
            counting("a", calls.clone(), Ok(Some(named_config_map("a")))),
            counting("b", calls.clone(), Err("never".to_string())),
        ];
        let config = Config::default();
        let instance = sample_instance();
        let gates = StaticFeatureGates::none();

        let manifests = build_with(&Params::new(&config, &instance, &gates), &factories).unwrap();

        assert!(manifests.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_enabled_builds_four_objects_in_order() {
        let config = Config::default();
        let instance = enabled_instance();
        let gates = StaticFeatureGates::none();

        let manifests = build(&Params::new(&config, &instance, &gates)).unwrap();

        let keys: Vec<String> = manifests.iter().map(|m| m.key()).collect();
        assert_eq!(
            keys,
            vec![
                "ConfigMap/simplest-targetallocator",
                "Deployment/simplest-targetallocator",
                "ServiceAccount/simplest-targetallocator",
                "Service/simplest-targetallocator",
            ]
        );
    }

    #[test]
    fn test_enabled_runs_every_factory() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factories: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|name| counting(name, calls.clone(), Ok(Some(named_config_map(name)))))
            .collect();
        let config = Config::default();
        let instance = enabled_instance();
        let gates = StaticFeatureGates::none();

        let manifests = build_with(&Params::new(&config, &instance, &gates), &factories).unwrap();

        assert_eq!(manifests.len(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_config_map_error_aborts() {
        let config = Config::default();
        let mut instance = enabled_instance();
        instance.spec.config = crate::testing::OTLP_CONFIG.to_string();
        let gates = StaticFeatureGates::none();

        let err = build(&Params::new(&config, &instance, &gates)).unwrap_err();
        assert!(matches!(err, ManifestError::NoPrometheusReceiver { .. }));
    }

    #[test]
    fn test_user_service_account_skipped() {
        let config = Config::default();
        let mut instance = enabled_instance();
        instance.spec.target_allocator.service_account = Some("existing".to_string());
        let gates = StaticFeatureGates::none();

        let manifests = build(&Params::new(&config, &instance, &gates)).unwrap();
        let kinds: Vec<&str> = manifests.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec!["ConfigMap", "Deployment", "Service"]);
    }
}
