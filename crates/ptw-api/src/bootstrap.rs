//! # Service Bootstrap
//!
//! Builds the [`AppState`] the server runs with.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Load Policy**: YAML capability table from `PTW_POLICY_FILE`, or the built-in table.
//! 2. **Connect Database**: Optional Postgres pool with migrations applied.
//! 3. **Hydrate**: Identities and permits from Postgres into the in-memory store.
//! 4. **Seed Administrator**: When the directory is empty, register one ADMIN.
//! 5. **Install Metrics**: Prometheus recorder, when enabled.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use ptw_core::{Identity, PrincipalId, Role};
use ptw_policy::{CapabilityTable, PolicyError};

use crate::config::AppConfig;
use crate::state::AppState;

/// Display name of the seeded administrator.
pub const BOOTSTRAP_ADMIN_NAME: &str = "Administrator";

/// Errors during service bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Capability table could not be loaded.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Database connection, migration, or hydration failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Prometheus recorder could not be installed.
    #[error("metrics recorder error: {0}")]
    Metrics(#[from] BuildError),
}

/// Assemble application state from `config`.
///
/// Installs the global metrics recorder when metrics are enabled, so call
/// this once per process.
pub async fn build_state(config: AppConfig) -> Result<AppState, BootstrapError> {
    let table = match &config.policy_file {
        Some(path) => {
            let table = CapabilityTable::load(path)?;
            tracing::info!(path = %path.display(), "capability table loaded");
            table
        }
        None => CapabilityTable::builtin(),
    };

    let db_pool = crate::db::init_pool(config.database_url.as_deref()).await?;
    let metrics_enabled = config.metrics_enabled;
    let state = AppState::with_config(config, table, db_pool);

    if let Some(pool) = &state.db_pool {
        let identities = crate::db::identities::load_all(pool).await?;
        let identity_count = identities.len();
        for identity in identities {
            state.repository.register_identity(identity);
        }
        let permits = crate::db::permits::load_all(pool).await?;
        let permit_count = permits.len();
        state.repository.restore(permits);
        tracing::info!(identities = identity_count, permits = permit_count, "hydrated from database");
    }

    seed_admin(&state).await?;

    if metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        tracing::info!("prometheus recorder installed");
        return Ok(state.with_metrics(handle));
    }
    Ok(state)
}

/// Register an administrator when the directory is empty, so the first
/// operator can create the remaining identities.
async fn seed_admin(state: &AppState) -> Result<Option<Identity>, BootstrapError> {
    if !state.repository.identities().is_empty() {
        return Ok(None);
    }
    let admin = Identity::new(PrincipalId::new(), BOOTSTRAP_ADMIN_NAME, Role::Admin);
    if let Some(pool) = &state.db_pool {
        crate::db::identities::upsert(pool, &admin).await?;
    }
    state.repository.register_identity(admin.clone());
    tracing::warn!(
        principal = %admin.id.as_uuid(),
        "identity directory was empty; seeded administrator, send this id as X-Principal-Id"
    );
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_admin_on_empty_directory() {
        let state = AppState::new();
        let seeded = seed_admin(&state).await.unwrap().unwrap();
        assert_eq!(seeded.role, Role::Admin);
        assert_eq!(state.repository.identities(), vec![seeded]);
    }

    #[tokio::test]
    async fn test_seed_admin_skipped_when_directory_populated() {
        let state = AppState::new();
        state
            .repository
            .register_identity(Identity::new(PrincipalId::new(), "Dana Reyes", Role::Supervisor));
        assert!(seed_admin(&state).await.unwrap().is_none());
        assert_eq!(state.repository.identities().len(), 1);
    }

    #[tokio::test]
    async fn test_build_state_in_memory_without_metrics() {
        let config = AppConfig {
            metrics_enabled: false,
            ..AppConfig::default()
        };
        let state = build_state(config).await.unwrap();
        assert!(state.db_pool.is_none());
        assert!(state.metrics.is_none());
        assert_eq!(state.repository.identities().len(), 1);
    }

    #[tokio::test]
    async fn test_build_state_missing_policy_file() {
        let config = AppConfig {
            metrics_enabled: false,
            policy_file: Some("/nonexistent/policy.yaml".into()),
            ..AppConfig::default()
        };
        let err = build_state(config).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Policy(PolicyError::FileNotFound { .. })));
    }
}
