//! The resource objects produced by composition
//!
//! Built-in Kubernetes kinds are carried as their `k8s-openapi` types. Kinds
//! served by optional CRDs (ServiceMonitor, Route) are `DynamicObject`s.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Service, ServiceAccount};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use serde::Serialize;

use crate::error::Result;

/// A fully-formed cluster object ready to be applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    ConfigMap(ConfigMap),
    DaemonSet(DaemonSet),
    Deployment(Deployment),
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
    Ingress(Ingress),
    Service(Service),
    ServiceAccount(ServiceAccount),
    StatefulSet(StatefulSet),
    /// Objects of custom resource kinds
    Dynamic(DynamicObject),
}

/// Evaluate `$body` with `$obj` bound to the typed object of any built-in variant
macro_rules! with_typed {
    ($manifest:expr, $obj:ident => $typed:expr, $dyn_obj:ident => $dynamic:expr) => {
        match $manifest {
            Manifest::ConfigMap($obj) => $typed,
            Manifest::DaemonSet($obj) => $typed,
            Manifest::Deployment($obj) => $typed,
            Manifest::HorizontalPodAutoscaler($obj) => $typed,
            Manifest::Ingress($obj) => $typed,
            Manifest::Service($obj) => $typed,
            Manifest::ServiceAccount($obj) => $typed,
            Manifest::StatefulSet($obj) => $typed,
            Manifest::Dynamic($dyn_obj) => $dynamic,
        }
    };
}

fn typed_kind<K: k8s_openapi::Resource>(_: &K) -> &'static str {
    K::KIND
}

fn typed_api_version<K: k8s_openapi::Resource>(_: &K) -> &'static str {
    K::API_VERSION
}

impl Manifest {
    /// Resource kind
    pub fn kind(&self) -> &str {
        with_typed!(self,
            obj => typed_kind(obj),
            obj => obj.types.as_ref().map(|t| t.kind.as_str()).unwrap_or_default()
        )
    }

    /// Resource apiVersion
    pub fn api_version(&self) -> &str {
        with_typed!(self,
            obj => typed_api_version(obj),
            obj => obj.types.as_ref().map(|t| t.api_version.as_str()).unwrap_or_default()
        )
    }

    pub fn metadata(&self) -> &ObjectMeta {
        with_typed!(self, obj => &obj.metadata, obj => &obj.metadata)
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    /// Get a unique key for this object (`Kind/name`)
    pub fn key(&self) -> String {
        format!("{}/{}", self.kind(), self.name())
    }

    /// Full object as JSON, including apiVersion and kind
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Full object as a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl std::fmt::Display for Manifest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.namespace() {
            Some(ns) => write!(f, "{}/{} ({})", self.kind(), self.name(), ns),
            None => write!(f, "{}", self.key()),
        }
    }
}

macro_rules! impl_from_typed {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Manifest {
                fn from(obj: $kind) -> Self {
                    Manifest::$kind(obj)
                }
            }
        )*
    };
}

impl_from_typed!(
    ConfigMap,
    DaemonSet,
    Deployment,
    HorizontalPodAutoscaler,
    Ingress,
    Service,
    ServiceAccount,
    StatefulSet,
);

impl From<DynamicObject> for Manifest {
    fn from(obj: DynamicObject) -> Self {
        Manifest::Dynamic(obj)
    }
}

/// Render a list of manifests as a multi-document YAML stream
pub fn to_yaml_stream(manifests: &[Manifest]) -> Result<String> {
    let mut out = String::new();
    for manifest in manifests {
        out.push_str("---\n");
        out.push_str(&manifest.to_yaml()?);
    }
    Ok(out)
}
