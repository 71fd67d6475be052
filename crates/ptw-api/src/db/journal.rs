//! Postgres journal for the in-memory repository.
//!
//! The repository calls the journal synchronously while holding its write
//! lock. The journal bridges into SQLx with `Handle::block_on`, so engine
//! mutations must run on a blocking thread (`tokio::task::spawn_blocking`),
//! never directly on a runtime worker.

use sqlx::PgPool;
use tokio::runtime::Handle;

use ptw_core::{PermitError, StorageError};
use ptw_engine::PermitJournal;
use ptw_state::Permit;

/// Writes every permit commit to the `permits` table.
#[derive(Debug, Clone)]
pub struct PgJournal {
    pool: PgPool,
}

impl PgJournal {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn runtime() -> Result<Handle, PermitError> {
        Handle::try_current()
            .map_err(|_| StorageError::Backend("no async runtime for the database journal".into()).into())
    }
}

impl PermitJournal for PgJournal {
    fn record_insert(&self, permit: &Permit) -> Result<(), PermitError> {
        Self::runtime()?
            .block_on(super::permits::insert(&self.pool, permit))
            .map_err(|e| {
                tracing::error!(permit_id = %permit.id, error = %e, "failed to persist permit to database");
                StorageError::Backend(format!("database insert failed: {e}")).into()
            })
    }

    fn record_update(&self, permit: &Permit, previous_revision: u64) -> Result<(), PermitError> {
        let updated = Self::runtime()?
            .block_on(super::permits::update(&self.pool, permit, previous_revision))
            .map_err(|e| {
                tracing::error!(permit_id = %permit.id, error = %e, "failed to persist permit change to database");
                PermitError::from(StorageError::Backend(format!("database update failed: {e}")))
            })?;
        if !updated {
            tracing::error!(
                permit_id = %permit.id,
                revision = previous_revision,
                "database row is not at the expected revision"
            );
            return Err(StorageError::Backend(format!(
                "database row for {} is not at revision {previous_revision}",
                permit.id
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptw_core::{PermitId, PermitNumber, PermitType, PrincipalId, RiskLevel, Timestamp};
    use ptw_state::PermitAttributes;
    use sqlx::postgres::PgPoolOptions;

    fn permit() -> Permit {
        let start = Timestamp::parse("2026-10-20T08:00:00Z").unwrap();
        Permit::draft(
            PermitId::new(),
            PermitNumber::parse("PTW-20261019-000001").unwrap(),
            PrincipalId::new(),
            PermitAttributes {
                permit_type: PermitType::GeneralWork,
                title: "Sweep yard".into(),
                description: "Clear debris".into(),
                work_location: "yard 2".into(),
                start_date: start,
                end_date: start.plus_hours(1),
                safety_measures: None,
                required_ppe: None,
            },
            RiskLevel::Low,
            String::new(),
            start,
        )
    }

    #[test]
    fn test_journal_outside_runtime_is_storage_error() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let pool = runtime.block_on(async {
            PgPoolOptions::new()
                .connect_lazy("postgres://ptw@127.0.0.1:1/ptw")
                .unwrap()
        });
        let journal = PgJournal::new(pool);
        let err = journal.record_insert(&permit()).unwrap_err();
        assert!(matches!(err, PermitError::Storage(StorageError::Backend(_))));
    }
}
