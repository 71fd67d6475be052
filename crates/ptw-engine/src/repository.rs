//! # Repository Facade
//!
//! The engine's only view of persistence. Every cross-entity read is an
//! explicit call; nothing is fetched lazily.
//!
//! ## Write Contract
//!
//! [`PermitRepository::save_permit`] is a compare-and-swap on
//! [`Permit::revision`]: the write succeeds only if the stored revision is
//! still the one the caller read, and the stored copy then carries the next
//! revision. A writer holding a stale read gets `PermitError::Conflict`.

use ptw_core::{Identity, PermitError, PermitId, PermitNumber, PrincipalId, Timestamp};
use ptw_state::Permit;

/// Persistence collaborator used by the lifecycle engine.
pub trait PermitRepository: Send + Sync {
    /// Load a permit by id, or `NotFound`.
    fn load_permit(&self, id: &PermitId) -> Result<Permit, PermitError>;

    /// Load a permit by its number, or `NotFound`.
    fn load_permit_by_number(&self, number: &PermitNumber) -> Result<Permit, PermitError>;

    /// Store a new permit. Fails if the id or number is already taken.
    fn insert_permit(&self, permit: Permit) -> Result<Permit, PermitError>;

    /// Conditionally overwrite a permit; returns the stored copy with its
    /// new revision.
    fn save_permit(&self, permit: Permit) -> Result<Permit, PermitError>;

    /// Snapshot of every permit.
    fn list_permits(&self) -> Result<Vec<Permit>, PermitError>;

    /// Resolve an identity reference, or `NotFound`.
    fn load_identity(&self, id: &PrincipalId) -> Result<Identity, PermitError>;

    /// A permit number never issued before in this deployment.
    fn next_permit_number(&self, issued: Timestamp) -> Result<PermitNumber, PermitError>;
}
