//! Operator runtime configuration
//!
//! Stored in `~/.config/otelop/config.yaml`. Every field has a default, so an
//! empty or missing file yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

pub const DEFAULT_COLLECTOR_IMAGE: &str =
    "ghcr.io/open-telemetry/opentelemetry-collector-releases/opentelemetry-collector:0.81.0";

pub const DEFAULT_TARGET_ALLOCATOR_IMAGE: &str =
    "ghcr.io/open-telemetry/opentelemetry-operator/target-allocator:0.81.0";

/// Operator-wide settings shared by every manifest builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Image used when the instance does not set one
    #[serde(default = "default_collector_image")]
    pub collector_image: String,

    #[serde(default = "default_target_allocator_image")]
    pub target_allocator_image: String,

    /// Key of the collector configuration in its ConfigMap
    #[serde(default = "default_collector_config_map_entry")]
    pub collector_config_map_entry: String,

    #[serde(default = "default_target_allocator_config_map_entry")]
    pub target_allocator_config_map_entry: String,

    /// Whether the cluster serves `route.openshift.io`
    #[serde(default)]
    pub openshift_routes: RoutesAvailability,

    /// Instance labels that are not propagated to generated objects.
    /// A trailing `*` matches by prefix.
    #[serde(default)]
    pub labels_filter: Vec<String>,
}

fn default_collector_image() -> String {
    DEFAULT_COLLECTOR_IMAGE.to_string()
}

fn default_target_allocator_image() -> String {
    DEFAULT_TARGET_ALLOCATOR_IMAGE.to_string()
}

fn default_collector_config_map_entry() -> String {
    "collector.yaml".to_string()
}

fn default_target_allocator_config_map_entry() -> String {
    "targetallocator.yaml".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector_image: default_collector_image(),
            target_allocator_image: default_target_allocator_image(),
            collector_config_map_entry: default_collector_config_map_entry(),
            target_allocator_config_map_entry: default_target_allocator_config_map_entry(),
            openshift_routes: RoutesAvailability::default(),
            labels_filter: Vec::new(),
        }
    }
}

/// Availability of the OpenShift routes API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoutesAvailability {
    Available,
    #[default]
    NotAvailable,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Ok(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("otelop").join("config.yaml"))
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("collectorImage", &self.collector_image),
            ("targetAllocatorImage", &self.target_allocator_image),
            ("collectorConfigMapEntry", &self.collector_config_map_entry),
            (
                "targetAllocatorConfigMapEntry",
                &self.target_allocator_config_map_entry,
            ),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidConfig {
                    message: format!("{} must not be empty", field),
                });
            }
        }
        Ok(())
    }

    pub fn with_collector_image(mut self, image: impl Into<String>) -> Self {
        self.collector_image = image.into();
        self
    }

    pub fn with_target_allocator_image(mut self, image: impl Into<String>) -> Self {
        self.target_allocator_image = image.into();
        self
    }

    pub fn with_openshift_routes(mut self, availability: RoutesAvailability) -> Self {
        self.openshift_routes = availability;
        self
    }

    pub fn with_labels_filter(mut self, filters: Vec<String>) -> Self {
        self.labels_filter = filters;
        self
    }

    /// Whether an instance label must be kept off generated objects
    pub fn is_label_filtered(&self, key: &str) -> bool {
        self.labels_filter.iter().any(|filter| {
            match filter.strip_suffix('*') {
                Some(prefix) => key.starts_with(prefix),
                None => key == filter,
            }
        })
    }
}
