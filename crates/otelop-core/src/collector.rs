//! OpenTelemetryCollector custom resource definition

use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements, ServicePort};
use k8s_openapi::api::networking::v1::IngressTLS;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{CoreError, Result};

/// API version of the collector custom resource
pub const API_VERSION: &str = "opentelemetry.io/v1alpha1";

/// Kind of the collector custom resource
pub const KIND: &str = "OpenTelemetryCollector";

/// Namespace assumed when the instance does not set one
pub const DEFAULT_NAMESPACE: &str = "default";

/// An OpenTelemetryCollector instance - the desired state the manifests are derived from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryCollector {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: CollectorSpec,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl OpenTelemetryCollector {
    /// Create an instance with the given name and namespace and a default spec
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(namespace.into()),
                ..Default::default()
            },
            spec: CollectorSpec::default(),
        }
    }

    /// Replace the spec
    pub fn with_spec(mut self, spec: CollectorSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Parse an instance from YAML and validate it
    pub fn from_yaml(content: &str) -> Result<Self> {
        let instance: Self = serde_yaml::from_str(content)?;
        instance.validate()?;
        Ok(instance)
    }

    /// Load an instance from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check the fields every builder relies on
    pub fn validate(&self) -> Result<()> {
        if self.kind != KIND {
            return Err(CoreError::InvalidInstance {
                message: format!("expected kind {}, got {}", KIND, self.kind),
            });
        }
        match self.metadata.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(CoreError::MissingField {
                field: "metadata.name".to_string(),
            }),
        }
    }

    /// Instance name
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Instance namespace, `default` when unset
    pub fn namespace(&self) -> &str {
        self.metadata
            .namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
    }
}

/// Collector deployment mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Deployment,
    StatefulSet,
    DaemonSet,
    /// Injected into workload pods by a separate webhook
    Sidecar,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Mode::Deployment => "deployment",
            Mode::StatefulSet => "statefulset",
            Mode::DaemonSet => "daemonset",
            Mode::Sidecar => "sidecar",
        };
        write!(f, "{}", s)
    }
}

/// Desired state of the collector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectorSpec {
    /// Workload shape
    #[serde(default)]
    pub mode: Mode,

    /// Raw collector configuration (YAML)
    #[serde(default)]
    pub config: String,

    #[serde(default)]
    pub replicas: Option<i32>,

    /// Overrides the operator's default collector image
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub image_pull_policy: Option<String>,

    /// Existing service account; the operator creates none when set
    #[serde(default)]
    pub service_account: Option<String>,

    /// Explicit service ports, merged with ports inferred from the config
    #[serde(default)]
    pub ports: Vec<ServicePort>,

    #[serde(default)]
    pub env: Vec<EnvVar>,

    #[serde(default)]
    pub resources: Option<ResourceRequirements>,

    #[serde(default)]
    pub node_selector: BTreeMap<String, String>,

    #[serde(default)]
    pub pod_annotations: BTreeMap<String, String>,

    #[serde(default)]
    pub host_network: bool,

    #[serde(default)]
    pub autoscaler: Option<AutoscalerSpec>,

    #[serde(default)]
    pub ingress: IngressSpec,

    #[serde(default)]
    pub observability: ObservabilitySpec,

    #[serde(default)]
    pub target_allocator: TargetAllocatorSpec,
}

/// Horizontal pod autoscaling settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalerSpec {
    #[serde(default)]
    pub min_replicas: Option<i32>,

    /// Autoscaling is only enabled when this is set
    #[serde(default)]
    pub max_replicas: Option<i32>,

    #[serde(default, rename = "targetCPUUtilization")]
    pub target_cpu_utilization: Option<i32>,

    #[serde(default)]
    pub target_memory_utilization: Option<i32>,
}

/// How the collector is exposed outside the cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressType {
    Ingress,
    Route,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    #[serde(default, rename = "type")]
    pub type_: Option<IngressType>,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(default)]
    pub annotations: BTreeMap<String, String>,

    #[serde(default)]
    pub ingress_class_name: Option<String>,

    #[serde(default)]
    pub tls: Vec<IngressTLS>,

    #[serde(default)]
    pub route: RouteSpec,
}

/// OpenShift route settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSpec {
    #[serde(default)]
    pub termination: TlsRouteTermination,
}

/// TLS termination of an OpenShift route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsRouteTermination {
    Insecure,
    #[default]
    Edge,
    Passthrough,
    Reencrypt,
}

impl TlsRouteTermination {
    /// Value of `spec.tls.termination` on the route, `None` for plain HTTP
    pub fn as_route_value(&self) -> Option<&'static str> {
        match self {
            TlsRouteTermination::Insecure => None,
            TlsRouteTermination::Edge => Some("edge"),
            TlsRouteTermination::Passthrough => Some("passthrough"),
            TlsRouteTermination::Reencrypt => Some("reencrypt"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservabilitySpec {
    #[serde(default)]
    pub metrics: MetricsConfigSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfigSpec {
    /// Create a ServiceMonitor when the Prometheus operator is available
    #[serde(default)]
    pub enable_metrics: bool,
}

/// Companion target allocator component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetAllocatorSpec {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub replicas: Option<i32>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub service_account: Option<String>,

    #[serde(default)]
    pub allocation_strategy: Option<String>,

    #[serde(default)]
    pub filter_strategy: Option<String>,

    #[serde(default, rename = "prometheusCR")]
    pub prometheus_cr: PrometheusCrSpec,

    #[serde(default)]
    pub resources: Option<ResourceRequirements>,

    #[serde(default)]
    pub node_selector: BTreeMap<String, String>,
}

/// Discovery of scrape targets from Prometheus operator custom resources
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusCrSpec {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub scrape_interval: Option<String>,
}
