//! Wait-hpa command - block until an autoscaler reports metrics

use otelop_kube::WaitOptions;
use std::time::Duration;

use crate::error::Result;

pub async fn run(name: &str, namespace: &str, timeout: Duration) -> Result<()> {
    let client = kube::Client::try_default().await?;
    let options = WaitOptions::default().with_timeout(timeout);

    tracing::debug!(hpa = name, namespace, ?timeout, "waiting for autoscaler");
    otelop_kube::wait_until_ready(&client, namespace, name, &options).await?;

    println!("{} is ready!", name);
    Ok(())
}
