//! Manifests of the collector itself
//!
//! Composition runs in two stages:
//! 1. Single-object factories, selected from the mode, a fixed list, and the
//!    Prometheus operator gate, run in order with abort-on-first-error.
//! 2. The routes stage, which may yield any number of objects, appended last.

pub mod configmap;
pub mod hpa;
pub mod ingress;
pub mod route;
pub mod service;
pub mod service_account;
pub mod servicemonitor;
pub mod workload;

use otelop_core::Mode;

use crate::Params;
use crate::error::Result;
use crate::factory::{self, ManifestFactory};
use crate::featuregate::Capability;
use crate::manifest::Manifest;

/// Select the factories for an instance, in execution order
pub fn factories(params: &Params<'_>) -> Vec<ManifestFactory> {
    let spec = &params.instance.spec;
    let mut factories = Vec::new();

    match spec.mode {
        Mode::Deployment => {
            factories.push(ManifestFactory::infallible("deployment", workload::deployment))
        }
        Mode::StatefulSet => {
            factories.push(ManifestFactory::infallible("statefulset", workload::stateful_set))
        }
        Mode::DaemonSet => {
            factories.push(ManifestFactory::infallible("daemonset", workload::daemon_set))
        }
        Mode::Sidecar => {
            tracing::debug!(instance = params.instance.name(), "not building sidecar...");
        }
    }

    factories.extend([
        ManifestFactory::infallible("configmap", configmap::config_map),
        ManifestFactory::infallible("horizontalpodautoscaler", hpa::horizontal_pod_autoscaler),
        ManifestFactory::infallible("serviceaccount", service_account::service_account),
        ManifestFactory::infallible("service", service::service),
        ManifestFactory::infallible("headless-service", service::headless_service),
        ManifestFactory::infallible("monitoring-service", service::monitoring_service),
        ManifestFactory::infallible("ingress", ingress::ingress),
    ]);

    if spec.observability.metrics.enable_metrics
        && params.gates.is_enabled(Capability::PrometheusOperator)
    {
        factories.push(ManifestFactory::fallible(
            "servicemonitor",
            servicemonitor::service_monitor,
        ));
    }

    factories
}

/// Build every collector object for the instance.
///
/// On error nothing is returned; the caller must not apply a partial set.
pub fn build(params: &Params<'_>) -> Result<Vec<Manifest>> {
    let span = tracing::debug_span!(
        "collector",
        instance = params.instance.name(),
        namespace = params.instance.namespace()
    );
    let _guard = span.enter();

    let mut manifests = factory::run(&factories(params), params.config, params.instance)?;
    manifests.extend(route::routes(params.config, params.instance)?);

    Ok(manifests)
}
