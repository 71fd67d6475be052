//! # In-Memory Repository
//!
//! Authoritative store for a running service. All operations are
//! synchronous and take a `parking_lot` lock for their full duration, so a
//! compare-and-swap never interleaves with another write.
//!
//! With a [`PermitJournal`] attached, inserts and saves are journaled inside
//! that lock before the in-memory copy changes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use ptw_core::{
    Identity, PermitError, PermitId, PermitNumber, PrincipalId, ResourceKind, StorageError,
    Timestamp,
};
use ptw_state::Permit;

use crate::journal::PermitJournal;
use crate::numbering::PermitNumberGenerator;
use crate::repository::PermitRepository;

#[derive(Debug, Default)]
struct Permits {
    by_id: HashMap<PermitId, Permit>,
    by_number: HashMap<PermitNumber, PermitId>,
}

/// Thread-safe in-memory permit and identity store.
#[derive(Default)]
pub struct MemoryRepository {
    permits: RwLock<Permits>,
    identities: RwLock<HashMap<PrincipalId, Identity>>,
    numbers: PermitNumberGenerator,
    journal: Option<Arc<dyn PermitJournal>>,
}

impl std::fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("permits", &self.len())
            .field("numbers", &self.numbers)
            .field("journaled", &self.journal.is_some())
            .finish_non_exhaustive()
    }
}

impl MemoryRepository {
    /// Empty store issuing numbers with the default prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store issuing numbers with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            numbers: PermitNumberGenerator::new(prefix),
            ..Self::default()
        }
    }

    /// Journal every insert and save to `journal` before committing it.
    pub fn with_journal(mut self, journal: Arc<dyn PermitJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Add or replace an identity in the directory.
    pub fn register_identity(&self, identity: Identity) {
        self.identities.write().insert(identity.id, identity);
    }

    /// Every known identity.
    pub fn identities(&self) -> Vec<Identity> {
        self.identities.read().values().cloned().collect()
    }

    /// Load previously persisted permits as-is, keeping their revisions,
    /// and move the number sequence past every loaded number.
    pub fn restore(&self, permits: impl IntoIterator<Item = Permit>) {
        let mut guard = self.permits.write();
        for permit in permits {
            if let Some(sequence) = permit.permit_number.sequence() {
                self.numbers.seed_past(sequence);
            }
            guard.by_number.insert(permit.permit_number.clone(), permit.id);
            guard.by_id.insert(permit.id, permit);
        }
    }

    pub fn len(&self) -> usize {
        self.permits.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PermitRepository for MemoryRepository {
    fn load_permit(&self, id: &PermitId) -> Result<Permit, PermitError> {
        self.permits
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| PermitError::not_found(ResourceKind::Permit, id))
    }

    fn load_permit_by_number(&self, number: &PermitNumber) -> Result<Permit, PermitError> {
        let guard = self.permits.read();
        guard
            .by_number
            .get(number)
            .and_then(|id| guard.by_id.get(id))
            .cloned()
            .ok_or_else(|| PermitError::not_found(ResourceKind::Permit, number))
    }

    fn insert_permit(&self, permit: Permit) -> Result<Permit, PermitError> {
        let mut guard = self.permits.write();
        if guard.by_id.contains_key(&permit.id) {
            return Err(StorageError::Backend(format!("duplicate permit id {}", permit.id)).into());
        }
        if guard.by_number.contains_key(&permit.permit_number) {
            return Err(StorageError::Backend(format!(
                "duplicate permit number {}",
                permit.permit_number
            ))
            .into());
        }
        if let Some(journal) = &self.journal {
            journal.record_insert(&permit)?;
        }
        guard.by_number.insert(permit.permit_number.clone(), permit.id);
        guard.by_id.insert(permit.id, permit.clone());
        Ok(permit)
    }

    fn save_permit(&self, mut permit: Permit) -> Result<Permit, PermitError> {
        let mut guard = self.permits.write();
        let stored = guard
            .by_id
            .get_mut(&permit.id)
            .ok_or_else(|| PermitError::not_found(ResourceKind::Permit, permit.id))?;

        if stored.revision != permit.revision {
            return Err(PermitError::Conflict {
                permit_id: permit.id,
                read_revision: permit.revision,
                stored_revision: stored.revision,
                stored_status: stored.status().to_string(),
            });
        }
        if stored.permit_number != permit.permit_number {
            return Err(StorageError::Backend(format!(
                "permit number of {} is immutable",
                permit.id
            ))
            .into());
        }

        let previous_revision = permit.revision;
        permit.revision += 1;
        if let Some(journal) = &self.journal {
            journal.record_update(&permit, previous_revision)?;
        }
        *stored = permit.clone();
        Ok(permit)
    }

    fn list_permits(&self) -> Result<Vec<Permit>, PermitError> {
        Ok(self.permits.read().by_id.values().cloned().collect())
    }

    fn load_identity(&self, id: &PrincipalId) -> Result<Identity, PermitError> {
        self.identities
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| PermitError::not_found(ResourceKind::Identity, id))
    }

    fn next_permit_number(&self, issued: Timestamp) -> Result<PermitNumber, PermitError> {
        Ok(self.numbers.next(issued))
    }
}
