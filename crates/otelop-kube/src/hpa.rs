//! Waiting for a HorizontalPodAutoscaler to start reporting metrics
//!
//! An autoscaler is considered ready once the metrics pipeline has produced
//! a first reading for it. The `autoscaling/v2` API is tried first, with a
//! fallback to `autoscaling/v1` for older clusters.

use std::future::Future;
use std::time::Duration;

use k8s_openapi::api::autoscaling::{v1, v2};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client};
use tokio::time::{Instant, sleep, timeout};

use crate::error::{KubeError, Result};

/// Polling settings for [`wait_until_ready`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5 * 60),
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Ready when the v2 status carries current metrics
pub fn v2_ready(hpa: &v2::HorizontalPodAutoscaler) -> bool {
    hpa.status
        .as_ref()
        .is_some_and(|status| status.current_metrics.is_some())
}

/// Ready when the v1 status carries a CPU reading
pub fn v1_ready(hpa: &v1::HorizontalPodAutoscaler) -> bool {
    hpa.status
        .as_ref()
        .is_some_and(|status| status.current_cpu_utilization_percentage.is_some())
}

/// Poll until the autoscaler reports metrics or the timeout elapses.
///
/// The namespace must exist. The first check happens one interval after the
/// call; missing or not-yet-ready autoscalers are retried.
pub async fn wait_until_ready(
    client: &Client,
    namespace: &str,
    name: &str,
    options: &WaitOptions,
) -> Result<()> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    match namespaces.get(namespace).await {
        Ok(_) => {}
        Err(kube::Error::Api(resp)) if resp.code == 404 => {
            return Err(KubeError::NamespaceNotFound(namespace.to_string()));
        }
        Err(e) => return Err(KubeError::Api(e)),
    }

    let v2_api: Api<v2::HorizontalPodAutoscaler> = Api::namespaced(client.clone(), namespace);
    let v1_api: Api<v1::HorizontalPodAutoscaler> = Api::namespaced(client.clone(), namespace);

    let ready = poll_until(options, || check_ready(&v2_api, &v1_api, name)).await;
    if !ready {
        return Err(KubeError::Timeout {
            what: format!("hpa '{}' in namespace '{}'", name, namespace),
            timeout: options.timeout,
        });
    }

    tracing::info!(hpa = name, namespace, "autoscaler is ready");
    Ok(())
}

/// Run `check` every interval until it passes or the timeout elapses.
///
/// The deadline also bounds a check in flight, so slow API reads cannot
/// stretch the wait past the timeout.
pub(crate) async fn poll_until<F, Fut>(options: &WaitOptions, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + options.timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }
        sleep(options.interval.min(remaining)).await;

        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, check()).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(_) => return false,
        }
    }
}

/// One readiness attempt; read errors are logged and count as not ready
async fn check_ready(
    v2_api: &Api<v2::HorizontalPodAutoscaler>,
    v1_api: &Api<v1::HorizontalPodAutoscaler>,
    name: &str,
) -> bool {
    match v2_api.get(name).await {
        Ok(hpa) => {
            let ready = v2_ready(&hpa);
            if !ready {
                tracing::info!(hpa = name, "autoscaler has no metrics yet");
            }
            ready
        }
        Err(e) => {
            tracing::debug!(hpa = name, error = %e, "autoscaling/v2 read failed, trying autoscaling/v1");
            match v1_api.get(name).await {
                Ok(hpa) => {
                    let ready = v1_ready(&hpa);
                    if !ready {
                        tracing::info!(hpa = name, "autoscaler has no CPU reading yet");
                    }
                    ready
                }
                Err(e) => {
                    tracing::info!(hpa = name, error = %e, "autoscaler not found yet");
                    false
                }
            }
        }
    }
}
