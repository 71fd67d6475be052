//! # Serve: Run the permit-to-work HTTP API.
//!
//! Configuration comes from the environment (see `ptw_api::config`); flags
//! given here take precedence.
//!
//! ```bash
//! PTW_AUTH_TOKEN=s3cret DATABASE_URL=postgres://localhost/ptw ptw serve --bind 127.0.0.1:8080
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ptw_api::config::AppConfig;

/// Serve subcommand arguments.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Listen address; overrides PTW_BIND_ADDR.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// YAML capability table; overrides PTW_POLICY_FILE.
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Disable the Prometheus recorder and `/metrics`.
    #[arg(long)]
    pub no_metrics: bool,
}

impl ServeArgs {
    /// Apply flag overrides to an environment-derived configuration.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(policy) = &self.policy {
            config.policy_file = Some(policy.clone());
        }
        if self.no_metrics {
            config.metrics_enabled = false;
        }
        config
    }
}

/// Execute the serve subcommand. Blocks until Ctrl-C.
pub fn run_serve(config: AppConfig) -> Result<u8> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(serve(config))?;
    Ok(0)
}

async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr;
    let state = ptw_api::bootstrap::build_state(config)
        .await
        .context("bootstrap failed")?;
    let app = ptw_api::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("permit-to-work API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_environment() {
        let args = ServeArgs {
            bind: Some("127.0.0.1:9000".parse().unwrap()),
            policy: Some(PathBuf::from("site.yaml")),
            no_metrics: true,
        };
        let config = args.apply(AppConfig::default());
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.policy_file, Some(PathBuf::from("site.yaml")));
        assert!(!config.metrics_enabled);
    }

    #[test]
    fn test_no_flags_keep_environment() {
        let base = AppConfig {
            auth_token: Some("t".into()),
            ..AppConfig::default()
        };
        let config = ServeArgs::default().apply(base);
        assert_eq!(config.bind_addr, AppConfig::default().bind_addr);
        assert!(config.metrics_enabled);
        assert_eq!(config.auth_token.as_deref(), Some("t"));
    }
}
