//! # Application State
//!
//! Shared state passed to every handler through the `State` extractor.
//!
//! The in-memory [`MemoryRepository`] serves every read. When a database
//! pool is present it carries a [`PgJournal`], so each permit commit is
//! written to Postgres inside the repository's compare-and-swap and a
//! failed write leaves both stores unchanged.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use ptw_engine::{MemoryRepository, PermitEngine};
use ptw_policy::{AccessPolicy, CapabilityTable};

use crate::config::AppConfig;
use crate::db::journal::PgJournal;
use crate::inbox::NotificationInbox;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: PermitEngine,
    /// The engine's store, kept for start-up restore and the identity directory.
    pub repository: Arc<MemoryRepository>,
    pub inbox: NotificationInbox,
    pub db_pool: Option<PgPool>,
    pub config: AppConfig,
    /// Prometheus render handle, when metrics are enabled and installed.
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("permits", &self.repository.len())
            .field("notifications", &self.inbox.len())
            .field("database", &self.db_pool.is_some())
            .field("metrics", &self.metrics.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl AppState {
    /// In-memory state with default configuration and the built-in policy.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), CapabilityTable::builtin(), None)
    }

    /// State for `config`, governed by `table`, optionally backed by Postgres.
    pub fn with_config(config: AppConfig, table: CapabilityTable, db_pool: Option<PgPool>) -> Self {
        let mut repository = MemoryRepository::with_prefix(config.permit_prefix.clone());
        if let Some(pool) = &db_pool {
            repository = repository.with_journal(Arc::new(PgJournal::new(pool.clone())));
        }
        let repository = Arc::new(repository);
        let inbox = NotificationInbox::new();
        let engine = PermitEngine::new(
            repository.clone(),
            AccessPolicy::new(table),
            Arc::new(inbox.clone()),
        );
        Self {
            engine,
            repository,
            inbox,
            db_pool,
            config,
            metrics: None,
        }
    }

    /// Attach a Prometheus render handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
