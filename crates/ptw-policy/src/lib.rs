//! # ptw-policy: Access Policy
//!
//! Maps `(role, action, resource owner)` to allow or deny.
//!
//! The role table is an immutable [`CapabilityTable`], either the built-in
//! default or loaded once from YAML at process start, and handed to
//! [`AccessPolicy`] explicitly. There is no global table.
//!
//! ## Default Capabilities
//!
//! | Role | Grants |
//! |---|---|
//! | EMPLOYEE | create, submit own, update own draft, read own |
//! | SUPERVISOR, SAFETY_OFFICER | create, submit own, update own draft, approve, reject, read any |
//! | SECURITY | read any |
//! | ADMIN | every action on any permit, manage users |

pub mod action;
pub mod error;
pub mod table;

pub use action::{Action, Scope};
pub use error::PolicyError;
pub use table::{AccessPolicy, CapabilityTable};
