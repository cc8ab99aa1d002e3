//! Names of generated objects
//!
//! All names are derived from the instance name so that two instances in one
//! namespace never collide.

/// Kubernetes limit for DNS-1123 label names
const MAX_NAME_LENGTH: usize = 63;

/// Kubernetes limit for port names (IANA service name)
const MAX_PORT_NAME_LENGTH: usize = 15;

pub fn collector(instance: &str) -> String {
    dns_name(&format!("{}-collector", instance))
}

pub fn config_map(instance: &str) -> String {
    collector(instance)
}

pub fn horizontal_pod_autoscaler(instance: &str) -> String {
    collector(instance)
}

pub fn service_account(instance: &str) -> String {
    collector(instance)
}

pub fn service(instance: &str) -> String {
    collector(instance)
}

pub fn headless_service(instance: &str) -> String {
    dns_name(&format!("{}-headless", collector(instance)))
}

pub fn monitoring_service(instance: &str) -> String {
    dns_name(&format!("{}-monitoring", collector(instance)))
}

pub fn ingress(instance: &str) -> String {
    dns_name(&format!("{}-ingress", instance))
}

pub fn route(instance: &str, port: &str) -> String {
    dns_name(&format!("{}-{}-route", port, instance))
}

pub fn container() -> &'static str {
    "otc-container"
}

pub fn config_volume() -> &'static str {
    "otc-internal"
}

pub fn target_allocator(instance: &str) -> String {
    dns_name(&format!("{}-targetallocator", instance))
}

pub fn target_allocator_container() -> &'static str {
    "ta-container"
}

pub fn target_allocator_config_volume() -> &'static str {
    "ta-internal"
}

/// Sanitize into a valid DNS-1123 label: lowercase alphanumerics and `-`,
/// at most 63 characters, starting and ending with an alphanumeric.
pub fn dns_name(name: &str) -> String {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let truncated: String = sanitized.chars().take(MAX_NAME_LENGTH).collect();
    truncated.trim_matches('-').to_string()
}

/// Sanitize into a valid port name
pub fn port_name(name: &str) -> String {
    let sanitized = dns_name(name);
    let truncated: String = sanitized.chars().take(MAX_PORT_NAME_LENGTH).collect();
    truncated.trim_end_matches('-').to_string()
}
