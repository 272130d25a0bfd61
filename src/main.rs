//! Entry point for the Subsidy Engine binary.
//!
//! Running this binary starts an HTTP server exposing the estimation
//! engine.  Configuration comes from the environment; see
//! [`subsidy_engine::config`] for the recognised variables.

use subsidy_engine::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    subsidy_engine::telemetry::init(&config.log_level)?;
    if let Err(err) = subsidy_engine::api::serve(&config).await {
        tracing::error!(error = %err, "server stopped");
        return Err(err);
    }
    Ok(())
}
