//! # Durable Journal
//!
//! Optional durable backing for [`MemoryRepository`](crate::MemoryRepository).
//! The repository calls the journal while it still holds its write lock and
//! before it changes its own copy, so a permit is committed in memory only
//! once the journal has accepted it. A journal error leaves the in-memory
//! record untouched and reaches the caller as the save's error.

use ptw_core::PermitError;
use ptw_state::Permit;

/// Durable store written inside the repository's compare-and-swap.
pub trait PermitJournal: Send + Sync {
    /// Record a newly created permit.
    fn record_insert(&self, permit: &Permit) -> Result<(), PermitError>;

    /// Record `permit`, whose stored predecessor carried `previous_revision`.
    fn record_update(&self, permit: &Permit, previous_revision: u64) -> Result<(), PermitError>;
}
