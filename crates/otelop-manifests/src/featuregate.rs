//! Feature gates for optional cluster capabilities
//!
//! Composition never detects capabilities itself. The caller injects a
//! [`FeatureGates`] implementation, read at composition time on every call.

use std::collections::BTreeSet;

/// An optional capability of the target cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Capability {
    /// The Prometheus operator CRDs (`monitoring.coreos.com`) are installed
    PrometheusOperator,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::PrometheusOperator => write!(f, "operator.observability.prometheus"),
        }
    }
}

/// Read-only boolean oracle for capabilities
pub trait FeatureGates: Send + Sync {
    fn is_enabled(&self, capability: Capability) -> bool;
}

/// Fixed set of enabled capabilities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFeatureGates {
    enabled: BTreeSet<Capability>,
}

impl StaticFeatureGates {
    /// No capability enabled
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.enabled.insert(capability);
        self
    }

    pub fn set(&mut self, capability: Capability, enabled: bool) {
        if enabled {
            self.enabled.insert(capability);
        } else {
            self.enabled.remove(&capability);
        }
    }
}

impl FromIterator<Capability> for StaticFeatureGates {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            enabled: iter.into_iter().collect(),
        }
    }
}

impl FeatureGates for StaticFeatureGates {
    fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }
}

impl<G: FeatureGates + ?Sized> FeatureGates for &G {
    fn is_enabled(&self, capability: Capability) -> bool {
        (**self).is_enabled(capability)
    }
}
