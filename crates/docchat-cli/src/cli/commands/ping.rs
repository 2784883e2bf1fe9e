//! Backend health check.

use anyhow::{Context, Result};
use docchat_core::backend::BackendClient;
use docchat_core::config::Config;

pub async fn run(config: &Config) -> Result<()> {
    let client = BackendClient::new(config).context("create backend client")?;
    let health = client
        .health()
        .await
        .with_context(|| format!("backend at {} is not reachable", config.backend_url))?;

    if health.message.is_empty() {
        println!("Backend at {} is up", config.backend_url);
    } else {
        println!("{}", health.message);
    }
    Ok(())
}
