//! Detect command - report the optional APIs the current cluster serves

use console::style;
use otelop_kube::ClusterCapabilities;

use crate::error::Result;

pub async fn run(json: bool) -> Result<()> {
    let client = kube::Client::try_default().await?;
    let capabilities = ClusterCapabilities::detect(&client).await?;

    if json {
        let value = serde_json::json!({
            "prometheusOperator": capabilities.prometheus_operator,
            "openshiftRoutes": capabilities.openshift_routes,
        });
        println!("{}", value);
        return Ok(());
    }

    println!("{}", style("CLUSTER CAPABILITIES").bold().underlined());
    println!(
        "  Prometheus operator:  {}",
        availability(capabilities.prometheus_operator)
    );
    println!(
        "  OpenShift routes:     {}",
        availability(capabilities.openshift_routes)
    );
    Ok(())
}

fn availability(available: bool) -> console::StyledObject<&'static str> {
    if available {
        style("available").green()
    } else {
        style("not available").dim()
    }
}
