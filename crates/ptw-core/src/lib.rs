//! # ptw-core: Foundational Types for the Permit-to-Work Stack
//!
//! Every other crate in the workspace depends on `ptw-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `PermitId`, `PrincipalId` and
//!    `PermitNumber` are distinct types. A principal identifier cannot be
//!    passed where a permit identifier is expected.
//!
//! 2. **Closed enums for every vocabulary.** Permit type, risk level and role
//!    are sum types. Free-text values are parsed at the boundary and rejected
//!    there; nothing downstream matches on strings.
//!
//! 3. **UTC-only timestamps.** `Timestamp` stores UTC with seconds precision,
//!    so audit stamps compare and serialize deterministically.
//!
//! 4. **One error taxonomy.** `PermitError` carries the five domain failures
//!    plus an opaque storage variant. Each variant holds structured detail
//!    (field, resource, current vs required status) for the transport layer.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ptw-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod principal;
pub mod temporal;

pub use domain::{PermitType, RiskLevel};
pub use error::{PermitError, ResourceKind, StorageError};
pub use identity::{PermitId, PermitNumber, PrincipalId};
pub use principal::{Identity, Principal, Role};
pub use temporal::Timestamp;
