//! # Permit History Projection
//!
//! The audit narrative is derived from the permit's stamped fields on
//! every read. Nothing is stored separately, so the history cannot drift
//! from the record it describes.
//!
//! Entries, in order:
//!
//! 1. `Created` at `created_at`.
//! 2. `CurrentStatus` at `updated_at`.
//! 3. `Submitted` at `submitted_at`, if submitted.
//! 4. `Approved` or `Rejected` at the decision time, with the decider's
//!    display name, and for rejections a `RejectionReason` entry.

use serde::{Deserialize, Serialize};

use ptw_core::{PrincipalId, Timestamp};

use crate::permit::{Permit, Workflow};

/// Kind of history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEventKind {
    Created,
    CurrentStatus,
    Submitted,
    Approved,
    Rejected,
    RejectionReason,
}

/// One line of a permit's audit narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// What happened.
    pub kind: HistoryEventKind,
    /// When it happened.
    pub at: Timestamp,
    /// Who did it, where the record names someone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<PrincipalId>,
    /// Human-readable rendering.
    pub message: String,
}

impl HistoryEntry {
    fn new(kind: HistoryEventKind, at: Timestamp, actor: Option<PrincipalId>, message: String) -> Self {
        Self {
            kind,
            at,
            actor,
            message,
        }
    }
}

/// Project the history of `permit`.
///
/// `decider_name` is the display name of the approver or rejector, resolved
/// by the caller. When it is unavailable the principal id is shown instead.
pub fn project_history(permit: &Permit, decider_name: Option<&str>) -> Vec<HistoryEntry> {
    use HistoryEventKind as K;

    let mut entries = vec![
        HistoryEntry::new(
            K::Created,
            permit.created_at,
            Some(permit.applicant_id),
            format!("Permit created on {}", permit.created_at),
        ),
        HistoryEntry::new(
            K::CurrentStatus,
            permit.updated_at,
            None,
            format!("Current status: {}", permit.status()),
        ),
    ];

    if let Some(submitted_at) = permit.submitted_at() {
        entries.push(HistoryEntry::new(
            K::Submitted,
            submitted_at,
            Some(permit.applicant_id),
            format!("Submitted on {submitted_at}"),
        ));
    }

    let name = |id: &PrincipalId| decider_name.map_or_else(|| id.to_string(), str::to_string);

    match &permit.workflow {
        Workflow::Approved {
            approver_id,
            approved_at,
            ..
        } => {
            entries.push(HistoryEntry::new(
                K::Approved,
                *approved_at,
                Some(*approver_id),
                format!("Approved on {approved_at} by {}", name(approver_id)),
            ));
        }
        Workflow::Rejected {
            rejector_id,
            rejected_at,
            rejection_reason,
            ..
        } => {
            entries.push(HistoryEntry::new(
                K::Rejected,
                *rejected_at,
                Some(*rejector_id),
                format!("Rejected on {rejected_at} by {}", name(rejector_id)),
            ));
            entries.push(HistoryEntry::new(
                K::RejectionReason,
                *rejected_at,
                Some(*rejector_id),
                format!("Rejection reason: {rejection_reason}"),
            ));
        }
        Workflow::Draft | Workflow::Submitted { .. } => {}
    }

    entries
}
