//! Manifest factories
//!
//! A factory wraps one resource builder behind a single contract:
//! `(config, instance) -> Result<Option<Manifest>>`. `Ok(None)` means the
//! builder elected not to produce an object for this instance; it is never an
//! error and never reaches the output list.

use otelop_core::{Config, OpenTelemetryCollector};

use crate::error::Result;
use crate::manifest::Manifest;

type BuildFn = dyn Fn(&Config, &OpenTelemetryCollector) -> Result<Option<Manifest>> + Send + Sync;

/// A named, stateless resource builder
pub struct ManifestFactory {
    name: &'static str,
    build: Box<BuildFn>,
}

impl ManifestFactory {
    /// Wrap a builder that can fail
    pub fn fallible<F, M>(name: &'static str, build: F) -> Self
    where
        F: Fn(&Config, &OpenTelemetryCollector) -> Result<Option<M>> + Send + Sync + 'static,
        M: Into<Manifest>,
    {
        Self {
            name,
            build: Box::new(move |config: &Config, instance: &OpenTelemetryCollector| {
                build(config, instance).map(|obj| obj.map(Into::into))
            }),
        }
    }

    /// Wrap a builder that cannot fail
    pub fn infallible<F, M>(name: &'static str, build: F) -> Self
    where
        F: Fn(&Config, &OpenTelemetryCollector) -> Option<M> + Send + Sync + 'static,
        M: Into<Manifest>,
    {
        Self {
            name,
            build: Box::new(move |config: &Config, instance: &OpenTelemetryCollector| {
                Ok(build(config, instance).map(Into::into))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(
        &self,
        config: &Config,
        instance: &OpenTelemetryCollector,
    ) -> Result<Option<Manifest>> {
        (self.build)(config, instance)
    }
}

impl std::fmt::Debug for ManifestFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Invoke every factory in order and collect the objects they produce.
///
/// The first error aborts the run and is returned unchanged; objects gathered
/// before it are dropped.
pub fn run(
    factories: &[ManifestFactory],
    config: &Config,
    instance: &OpenTelemetryCollector,
) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::with_capacity(factories.len());

    for factory in factories {
        match factory.invoke(config, instance)? {
            Some(manifest) => {
                tracing::debug!(factory = factory.name(), object = %manifest, "built object");
                manifests.push(manifest);
            }
            None => {
                tracing::debug!(factory = factory.name(), "factory produced no object");
            }
        }
    }

    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use crate::testing::{counting, named_config_map, sample_instance};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_infallible_reports_no_error() {
        let factory = ManifestFactory::infallible("config-map", |_, _| {
            Some(named_config_map("a"))
        });

        let result = factory
            .invoke(&Config::default(), &sample_instance())
            .unwrap();
        assert_eq!(result.unwrap().name(), "a");
    }

    #[test]
    fn test_absent_is_not_error() {
        let factory =
            ManifestFactory::infallible("nothing", |_, _| None::<k8s_openapi::api::core::v1::ConfigMap>);

        let result = factory.invoke(&Config::default(), &sample_instance());
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_fallible_passes_error_through() {
        let factory = ManifestFactory::fallible("broken", |_, _| {
            Err::<Option<Manifest>, _>(ManifestError::InvalidCollectorConfig("boom".to_string()))
        });

        let err = factory
            .invoke(&Config::default(), &sample_instance())
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidCollectorConfig(msg) if msg == "boom"));
    }

    #[test]
    fn test_factory_receives_inputs() {
        let factory = ManifestFactory::infallible("echo", |config: &Config, instance: &OpenTelemetryCollector| {
            Some(named_config_map(&format!(
                "{}-{}",
                instance.name(),
                config.collector_config_map_entry
            )))
        });

        let result = factory
            .invoke(&Config::default(), &sample_instance())
            .unwrap()
            .unwrap();
        assert_eq!(result.name(), "simplest-collector.yaml");
    }

    #[test]
    fn test_run_preserves_order_and_skips_absent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factories = vec![
            counting("first", calls.clone(), Ok(Some(named_config_map("first")))),
            counting("absent", calls.clone(), Ok(None)),
            counting("second", calls.clone(), Ok(Some(named_config_map("second")))),
        ];

        let manifests = run(&factories, &Config::default(), &sample_instance()).unwrap();

        let names: Vec<_> = manifests.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_run_aborts_on_first_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let factories = vec![
            counting("first", calls.clone(), Ok(Some(named_config_map("first")))),
            counting(
                "broken",
                calls.clone(),
                Err("invalid".to_string()),
            ),
            counting("never", calls.clone(), Ok(Some(named_config_map("never")))),
        ];

        let err = run(&factories, &Config::default(), &sample_instance()).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidCollectorConfig(_)));
        // Factories after the failing one are not invoked
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_run_empty() {
        let manifests = run(&[], &Config::default(), &sample_instance()).unwrap();
        assert!(manifests.is_empty());
    }

    #[test]
    fn test_debug_shows_name() {
        let factory = ManifestFactory::infallible("service", |_, _| None::<Manifest>);
        assert!(format!("{:?}", factory).contains("service"));
    }
}
