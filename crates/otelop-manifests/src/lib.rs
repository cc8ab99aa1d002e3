//! otelop Manifests - derive the Kubernetes objects of an OpenTelemetryCollector
//!
//! This crate provides:
//! - **Factories**: one contract for every resource builder, fallible or not
//! - **Collector pipeline**: workload, configuration, services, autoscaling,
//!   ingress, ServiceMonitor and routes for a collector instance
//! - **Target allocator pipeline**: the objects of the optional target allocator
//! - **Feature gates**: injected knowledge of optional cluster capabilities
//!
//! Composition is pure: no cluster I/O, no retry, no shared state. An error
//! means nothing from that composition should be applied.

pub mod collector;
pub mod error;
pub mod factory;
pub mod featuregate;
pub mod labels;
pub mod manifest;
pub mod naming;
pub mod otelconfig;
pub mod targetallocator;

#[cfg(test)]
mod testing;

pub use error::{ManifestError, Result};
pub use factory::ManifestFactory;
pub use featuregate::{Capability, FeatureGates, StaticFeatureGates};
pub use manifest::{Manifest, to_yaml_stream};

use otelop_core::{Config, OpenTelemetryCollector};

/// Inputs of one composition
#[derive(Clone, Copy)]
pub struct Params<'a> {
    pub config: &'a Config,
    pub instance: &'a OpenTelemetryCollector,
    pub gates: &'a dyn FeatureGates,
}

impl<'a> Params<'a> {
    pub fn new(
        config: &'a Config,
        instance: &'a OpenTelemetryCollector,
        gates: &'a dyn FeatureGates,
    ) -> Self {
        Self {
            config,
            instance,
            gates,
        }
    }
}

impl std::fmt::Debug for Params<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Params")
            .field("config", self.config)
            .field("instance", &self.instance.name())
            .finish_non_exhaustive()
    }
}

/// Collector objects followed by target allocator objects
pub fn build(params: &Params<'_>) -> Result<Vec<Manifest>> {
    let mut manifests = collector::build(params)?;
    manifests.extend(targetallocator::build(params)?);
    Ok(manifests)
}
