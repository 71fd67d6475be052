//! # ptw-state: Permit Lifecycle State Machine
//!
//! ## States
//!
//! ```text
//! (create) ──▶ Draft ──submit()──▶ Submitted ──approve()──▶ Approved (terminal)
//!                                      │
//!                                      └──reject()───▶ Rejected (terminal)
//! ```
//!
//! ## Design
//!
//! The lifecycle is a runtime enum rather than a typestate: permits are
//! always loaded from storage, so the state is never known at compile time.
//! Instead, the workflow data lives *inside* the status variant
//! ([`Workflow`]). An approved permit carries its approver and approval
//! time; a rejected one carries its rejector, time and reason. A permit
//! that is both approved and rejected, or approved without an approver,
//! cannot be constructed.
//!
//! - **Permit** (`permit.rs`): the record and its guarded transitions.
//! - **Request** (`request.rs`): validation of creation attributes.
//! - **History** (`history.rs`): the audit narrative, projected from the
//!   stamped fields rather than stored separately.

pub mod history;
pub mod permit;
pub mod request;

pub use history::{project_history, HistoryEntry, HistoryEventKind};
pub use permit::{Permit, PermitStatus, Workflow};
pub use request::{PermitAttributes, PermitRequest, MAX_LOCATION_LEN, MAX_TITLE_LEN};
