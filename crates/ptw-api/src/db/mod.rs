//! # Database Persistence Layer
//!
//! Optional Postgres persistence via SQLx. When a database URL is
//! configured, identities and permits are loaded into the in-memory
//! repository at start-up, and [`journal::PgJournal`] writes every permit
//! commit before the repository applies it. Without one the service runs
//! in memory only.

pub mod identities;
pub mod journal;
pub mod permits;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect and apply migrations.
///
/// Returns `None` when no URL is configured.
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set, running in-memory only mode. \
             Permits will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;
    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
