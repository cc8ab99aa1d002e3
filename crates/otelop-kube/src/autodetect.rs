//! Detection of optional cluster capabilities
//!
//! Discovery only looks at the API groups the manifests depend on, so it stays
//! cheap on clusters with many CRDs.

use kube::Client;
use kube::discovery::Discovery;
use otelop_core::{Config, RoutesAvailability};
use otelop_manifests::{Capability, FeatureGates};

/// API group served by the Prometheus operator CRDs
pub const PROMETHEUS_OPERATOR_GROUP: &str = "monitoring.coreos.com";

/// API group of OpenShift routes
pub const ROUTES_GROUP: &str = "route.openshift.io";

/// What the target cluster supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterCapabilities {
    pub prometheus_operator: bool,
    pub openshift_routes: bool,
}

impl ClusterCapabilities {
    /// Run API discovery against the cluster
    pub async fn detect(client: &Client) -> crate::Result<Self> {
        let discovery = Discovery::new(client.clone())
            .filter(&[PROMETHEUS_OPERATOR_GROUP, ROUTES_GROUP])
            .run()
            .await?;

        let capabilities = Self::from_groups(discovery.groups().map(|group| group.name()));
        tracing::debug!(?capabilities, "detected cluster capabilities");
        Ok(capabilities)
    }

    /// Capabilities implied by a set of served API group names
    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a str>) -> Self {
        groups
            .into_iter()
            .fold(Self::default(), |mut capabilities, group| {
                match group {
                    PROMETHEUS_OPERATOR_GROUP => capabilities.prometheus_operator = true,
                    ROUTES_GROUP => capabilities.openshift_routes = true,
                    _ => {}
                }
                capabilities
            })
    }

    pub fn routes_availability(&self) -> RoutesAvailability {
        if self.openshift_routes {
            RoutesAvailability::Available
        } else {
            RoutesAvailability::NotAvailable
        }
    }

    /// Record the detected routes availability in the operator configuration
    pub fn apply_to(&self, config: &mut Config) {
        config.openshift_routes = self.routes_availability();
    }
}

impl FeatureGates for ClusterCapabilities {
    fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::PrometheusOperator => self.prometheus_operator,
            _ => false,
        }
    }
}
