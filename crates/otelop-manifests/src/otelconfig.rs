//! Reading the collector configuration embedded in `spec.config`
//!
//! Builders only need a few facts from it: which ports the receivers listen
//! on, where the collector exposes its own metrics, and the scrape
//! configuration of the Prometheus receiver.

use k8s_openapi::api::core::v1::{ContainerPort, ServicePort};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;

use crate::error::{ManifestError, Result};
use crate::naming;

/// Port of the collector's own metrics endpoint when not configured
pub const DEFAULT_METRICS_PORT: i32 = 8888;

/// A parsed collector configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    root: Mapping,
}

/// A port a receiver listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverPort {
    pub name: String,
    pub port: i32,
    pub protocol: &'static str,
}

impl ReceiverPort {
    pub fn service_port(&self) -> ServicePort {
        ServicePort {
            name: Some(self.name.clone()),
            port: self.port,
            protocol: Some(self.protocol.to_string()),
            ..Default::default()
        }
    }
}

impl CollectorConfig {
    /// Parse `spec.config`. An empty string is an empty configuration.
    pub fn parse(config: &str) -> Result<Self> {
        if config.trim().is_empty() {
            return Ok(Self {
                root: Mapping::new(),
            });
        }

        let value: Value = serde_yaml::from_str(config)
            .map_err(|e| ManifestError::InvalidCollectorConfig(e.to_string()))?;

        match value {
            Value::Mapping(root) => Ok(Self { root }),
            Value::Null => Ok(Self {
                root: Mapping::new(),
            }),
            _ => Err(ManifestError::InvalidCollectorConfig(
                "expected a mapping at the top level".to_string(),
            )),
        }
    }

    fn receivers(&self) -> Option<&Mapping> {
        self.root.get("receivers").and_then(Value::as_mapping)
    }

    /// Ports of all receivers, in declaration order
    pub fn receiver_ports(&self) -> Vec<ReceiverPort> {
        let Some(receivers) = self.receivers() else {
            return Vec::new();
        };

        let mut ports = Vec::new();
        for (name, settings) in receivers {
            let Some(name) = name.as_str() else {
                continue;
            };
            let receiver_type = name.split('/').next().unwrap_or(name);

            if let Some(port) = endpoint_port(settings) {
                ports.push(ReceiverPort {
                    name: naming::port_name(name),
                    port,
                    protocol: "TCP",
                });
                continue;
            }

            let protocols = settings.get("protocols").and_then(Value::as_mapping);
            match protocols {
                Some(protocols) => {
                    for (protocol, protocol_settings) in protocols {
                        let Some(protocol) = protocol.as_str() else {
                            continue;
                        };
                        let port_name = naming::port_name(&format!("{}-{}", name, protocol));
                        let known = default_port(receiver_type, Some(protocol));
                        let port = endpoint_port(protocol_settings).or(known.map(|(p, _)| p));
                        match port {
                            Some(port) => ports.push(ReceiverPort {
                                name: port_name,
                                port,
                                protocol: known.map(|(_, proto)| proto).unwrap_or("TCP"),
                            }),
                            None => tracing::debug!(
                                receiver = name,
                                protocol,
                                "no port known for receiver protocol"
                            ),
                        }
                    }
                }
                None => match default_port(receiver_type, None) {
                    Some((port, protocol)) => ports.push(ReceiverPort {
                        name: naming::port_name(name),
                        port,
                        protocol,
                    }),
                    None => tracing::debug!(receiver = name, "receiver exposes no port"),
                },
            }
        }

        unique_names(ports)
    }

    /// Port of the collector's own metrics endpoint (`service.telemetry.metrics.address`)
    pub fn metrics_port(&self) -> Result<i32> {
        let address = self
            .root
            .get("service")
            .and_then(|s| s.get("telemetry"))
            .and_then(|t| t.get("metrics"))
            .and_then(|m| m.get("address"))
            .and_then(Value::as_str);

        let Some(address) = address else {
            return Ok(DEFAULT_METRICS_PORT);
        };

        let invalid = |reason: &str| ManifestError::InvalidMetricsAddress {
            address: address.to_string(),
            reason: reason.to_string(),
        };

        let (_, port) = address.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        port.parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .map(i32::from)
            .ok_or_else(|| invalid("port is not a number between 1 and 65535"))
    }

    /// The `config` block of the first Prometheus receiver
    pub fn prometheus_config(&self) -> Option<&Value> {
        self.receivers()?
            .iter()
            .filter(|(name, _)| {
                name.as_str()
                    .map(|n| n.split('/').next() == Some("prometheus"))
                    .unwrap_or(false)
            })
            .find_map(|(_, settings)| settings.get("config"))
    }
}

/// Truncation can give two ports the same name; later ones fall back to `port-{number}`
fn unique_names(mut ports: Vec<ReceiverPort>) -> Vec<ReceiverPort> {
    let mut seen = BTreeSet::new();
    for port in &mut ports {
        if !seen.insert(port.name.clone()) {
            let fallback = format!("port-{}", port.port);
            tracing::debug!(name = %port.name, %fallback, "port name already taken");
            port.name = fallback;
            seen.insert(port.name.clone());
        }
    }
    ports
}

fn endpoint_port(settings: &Value) -> Option<i32> {
    let endpoint = settings.get("endpoint")?.as_str()?;
    let (_, port) = endpoint.rsplit_once(':')?;
    port.parse::<u16>().ok().filter(|p| *p != 0).map(i32::from)
}

/// Well-known default ports of common receivers
fn default_port(receiver_type: &str, protocol: Option<&str>) -> Option<(i32, &'static str)> {
    match (receiver_type, protocol) {
        ("otlp", Some("grpc")) => Some((4317, "TCP")),
        ("otlp", Some("http")) => Some((4318, "TCP")),
        ("jaeger", Some("grpc")) => Some((14250, "TCP")),
        ("jaeger", Some("thrift_http")) => Some((14268, "TCP")),
        ("jaeger", Some("thrift_compact")) => Some((6831, "UDP")),
        ("jaeger", Some("thrift_binary")) => Some((6832, "UDP")),
        ("zipkin", None) => Some((9411, "TCP")),
        ("opencensus", None) => Some((55678, "TCP")),
        _ => None,
    }
}

/// Service ports of a collector: explicit ports first, then inferred receiver
/// ports that do not clash with them by name or number.
pub fn service_ports(explicit: &[ServicePort], config: &CollectorConfig) -> Vec<ServicePort> {
    let mut ports: Vec<ServicePort> = explicit.to_vec();

    for inferred in config.receiver_ports() {
        let clashes = ports
            .iter()
            .any(|p| p.port == inferred.port || p.name.as_deref() == Some(inferred.name.as_str()));
        if clashes {
            tracing::debug!(port = inferred.port, name = %inferred.name, "skipping inferred port");
            continue;
        }
        ports.push(inferred.service_port());
    }

    ports
}

/// Container ports matching a set of service ports
pub fn container_ports(service_ports: &[ServicePort]) -> Vec<ContainerPort> {
    service_ports
        .iter()
        .map(|p| ContainerPort {
            name: p.name.clone(),
            container_port: p.port,
            protocol: p.protocol.clone(),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OTLP_CONFIG, PROMETHEUS_CONFIG};

    #[test]
    fn test_otlp_default_ports() {
        let config = CollectorConfig::parse(OTLP_CONFIG).unwrap();
        let ports = config.receiver_ports();

        assert_eq!(
            ports,
            vec![
                ReceiverPort {
                    name: "otlp-grpc".to_string(),
                    port: 4317,
                    protocol: "TCP"
                },
                ReceiverPort {
                    name: "otlp-http".to_string(),
                    port: 4318,
                    protocol: "TCP"
                },
            ]
        );
    }

    #[test]
    fn test_endpoint_overrides_default() {
        let config = CollectorConfig::parse(
            r#"
receivers:
  otlp:
    protocols:
      grpc:
        endpoint: 0.0.0.0:14317
  zipkin:
  jaeger/custom:
    protocols:
      thrift_compact:
  statsd:
    endpoint: "localhost:8125"
  hostmetrics:
    collection_interval: 10s
"#,
        )
        .unwrap();

        let ports: Vec<(String, i32, &str)> = config
            .receiver_ports()
            .into_iter()
            .map(|p| (p.name, p.port, p.protocol))
            .collect();

        assert_eq!(
            ports,
            vec![
                ("otlp-grpc".to_string(), 14317, "TCP"),
                ("zipkin".to_string(), 9411, "TCP"),
                ("jaeger-custom-t".to_string(), 6831, "UDP"),
                ("statsd".to_string(), 8125, "TCP"),
            ]
        );
    }

    #[test]
    fn test_empty_config() {
        let config = CollectorConfig::parse("").unwrap();
        assert!(config.receiver_ports().is_empty());
        assert_eq!(config.metrics_port().unwrap(), DEFAULT_METRICS_PORT);
        assert!(config.prometheus_config().is_none());
    }

    #[test]
    fn test_invalid_config() {
        let err = CollectorConfig::parse("receivers: [unclosed").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidCollectorConfig(_)));

        let err = CollectorConfig::parse("just a string").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidCollectorConfig(_)));
    }

    #[test]
    fn test_metrics_port() {
        let config = CollectorConfig::parse(
            r#"
service:
  telemetry:
    metrics:
      address: ":9090"
"#,
        )
        .unwrap();
        assert_eq!(config.metrics_port().unwrap(), 9090);
    }

    #[test]
    fn test_invalid_metrics_address() {
        for address in ["localhost", "0.0.0.0:http", "0.0.0.0:0"] {
            let config = CollectorConfig::parse(&format!(
                "service:\n  telemetry:\n    metrics:\n      address: \"{}\"\n",
                address
            ))
            .unwrap();
            let err = config.metrics_port().unwrap_err();
            assert!(
                matches!(err, ManifestError::InvalidMetricsAddress { .. }),
                "address {} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_prometheus_config() {
        let config = CollectorConfig::parse(PROMETHEUS_CONFIG).unwrap();
        let prom = config.prometheus_config().unwrap();
        let jobs = prom.get("scrape_configs").unwrap().as_sequence().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0]["job_name"], Value::from("otel-collector"));
    }

    #[test]
    fn test_named_prometheus_receiver() {
        let config = CollectorConfig::parse(
            r#"
receivers:
  otlp:
  prometheus/apps:
    config:
      scrape_configs: []
"#,
        )
        .unwrap();
        assert!(config.prometheus_config().is_some());
    }

    #[test]
    fn test_service_ports_merge() {
        let config = CollectorConfig::parse(OTLP_CONFIG).unwrap();
        let explicit = vec![
            ServicePort {
                name: Some("custom".to_string()),
                port: 4317,
                ..Default::default()
            },
            ServicePort {
                name: Some("otlp-http".to_string()),
                port: 14318,
                ..Default::default()
            },
        ];

        let ports = service_ports(&explicit, &config);

        // Both inferred ports clash: 4317 by number, otlp-http by name
        assert_eq!(ports, explicit);
    }

    #[test]
    fn test_truncated_port_names_stay_unique() {
        let config = CollectorConfig::parse(
            "receivers:\n  jaeger/custom:\n    protocols:\n      thrift_compact:\n      thrift_binary:\n",
        )
        .unwrap();

        let inferred = config.receiver_ports();
        let names: Vec<&str> = inferred.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["jaeger-custom-t", "port-6832"]);

        let ports: Vec<i32> = service_ports(&[], &config).iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![6831, 6832]);
    }

    #[test]
    fn test_container_ports() {
        let config = CollectorConfig::parse(OTLP_CONFIG).unwrap();
        let ports = container_ports(&service_ports(&[], &config));
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].container_port, 4317);
        assert_eq!(ports[0].name.as_deref(), Some("otlp-grpc"));
    }
}
