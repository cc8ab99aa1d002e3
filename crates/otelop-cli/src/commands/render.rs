//! Render command - print the objects derived from a collector instance

use clap::ValueEnum;
use otelop_core::{Config, OpenTelemetryCollector, RoutesAvailability};
use otelop_manifests::{Capability, Manifest, Params, StaticFeatureGates};
use std::path::Path;

use crate::error::{CliError, Result};

/// Which composition pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Component {
    Collector,
    TargetAllocator,
    All,
}

pub struct RenderOptions<'a> {
    pub config: Option<&'a Path>,
    pub prometheus_operator: bool,
    pub openshift_routes: bool,
    pub component: Component,
    pub json: bool,
}

pub fn run(instance_path: &Path, options: &RenderOptions<'_>) -> Result<()> {
    let instance = OpenTelemetryCollector::from_file(instance_path).map_err(|e| {
        CliError::input_with_help(
            format!("failed to load instance from {}: {}", instance_path.display(), e),
            "expected a YAML manifest of kind OpenTelemetryCollector with metadata.name set",
        )
    })?;

    let mut config = match options.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| CliError::input(format!("failed to load operator configuration: {}", e)))?;

    if options.openshift_routes {
        config = config.with_openshift_routes(RoutesAvailability::Available);
    }

    let mut gates = StaticFeatureGates::none();
    gates.set(Capability::PrometheusOperator, options.prometheus_operator);

    tracing::debug!(
        instance = instance.name(),
        namespace = instance.namespace(),
        mode = %instance.spec.mode,
        component = ?options.component,
        "rendering"
    );

    let params = Params::new(&config, &instance, &gates);
    let manifests = match options.component {
        Component::Collector => otelop_manifests::collector::build(&params),
        Component::TargetAllocator => otelop_manifests::targetallocator::build(&params),
        Component::All => otelop_manifests::build(&params),
    }?;

    // Everything is serialized before the first byte reaches stdout
    let output = if options.json {
        to_json(&manifests)?
    } else {
        otelop_manifests::to_yaml_stream(&manifests)?
    };

    print!("{}", output);
    if options.json {
        println!();
    }
    Ok(())
}

fn to_json(manifests: &[Manifest]) -> Result<String> {
    let values = manifests
        .iter()
        .map(Manifest::to_value)
        .collect::<otelop_manifests::Result<Vec<_>>>()?;

    serde_json::to_string_pretty(&values).map_err(|e| CliError::Composition {
        message: e.to_string(),
    })
}
