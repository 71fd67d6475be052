//! # ptw-risk: Permit Risk Classifier
//!
//! A pure, total function from permit attributes to a [`RiskLevel`] and a
//! human-readable assessment report. There is no model behind it: the
//! classifier is a fixed rule table, so the same input always yields the
//! same level and byte-identical report.
//!
//! ## Cascade
//!
//! ```text
//! permit type ──▶ base level
//!                    │
//!     work location ─┴─▶ location escalation
//!                              │
//!               description ───┴─▶ description escalation ──▶ final level
//! ```
//!
//! Each stage may only raise the level it receives. Absent or blank inputs
//! leave the level unchanged, and an unknown permit type starts at `LOW`.
//!
//! ## Crate Policy
//!
//! - Depends on `ptw-core` only.
//! - Never returns an error and never panics.

pub mod classifier;
pub mod report;

pub use classifier::{classify, RiskAssessment, RiskInput, StageLevels};
pub use ptw_core::RiskLevel;
