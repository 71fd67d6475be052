//! # Permit Record and Transitions
//!
//! The permit is the unit of work for the lifecycle engine. Its creation
//! attributes and risk outcome are fixed at construction; everything that
//! changes afterwards is held in [`Workflow`], whose variants carry exactly
//! the stamps that are valid for that status.
//!
//! ## Guard Order
//!
//! Decision transitions check, in order: the caller is not the applicant
//! (`Forbidden`), the reason is non-blank for rejections (`Validation`),
//! then the current status (`InvalidTransition`). Capability checks belong
//! to the access policy and run before any of these.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use ptw_core::{
    PermitError, PermitId, PermitNumber, PermitType, Principal, PrincipalId, RiskLevel, Timestamp,
};

use crate::request::{optional_text, PermitAttributes};

// ─── Permit Status ───────────────────────────────────────────────────

/// Lifecycle status of a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitStatus {
    /// Created, editable, not yet under review.
    Draft,
    /// Awaiting an approval decision.
    Submitted,
    /// Authorized (terminal).
    Approved,
    /// Refused (terminal).
    Rejected,
}

impl PermitStatus {
    /// All statuses in lifecycle order.
    pub fn all() -> &'static [PermitStatus] {
        &[Self::Draft, Self::Submitted, Self::Approved, Self::Rejected]
    }

    /// Canonical tag, e.g. `"SUBMITTED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Statuses reachable in one step.
    pub fn successors(&self) -> &'static [PermitStatus] {
        match self {
            Self::Draft => &[Self::Submitted],
            Self::Submitted => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }
}

impl std::fmt::Display for PermitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermitStatus {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == tag)
            .ok_or_else(|| PermitError::validation("status", format!("unknown permit status: {s}")))
    }
}

// ─── Workflow ────────────────────────────────────────────────────────

/// Status together with the stamps that status implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Workflow {
    /// Not yet submitted.
    Draft,
    /// Under review.
    Submitted {
        /// When the applicant submitted.
        submitted_at: Timestamp,
    },
    /// Approved by a reviewer other than the applicant.
    Approved {
        /// When the applicant submitted.
        submitted_at: Timestamp,
        /// The approving principal.
        approver_id: PrincipalId,
        /// When the decision was made.
        approved_at: Timestamp,
    },
    /// Rejected with a reason.
    Rejected {
        /// When the applicant submitted.
        submitted_at: Timestamp,
        /// The rejecting principal.
        rejector_id: PrincipalId,
        /// When the decision was made.
        rejected_at: Timestamp,
        /// Why the permit was refused. Never blank.
        rejection_reason: String,
    },
}

impl Workflow {
    /// The bare status.
    pub fn status(&self) -> PermitStatus {
        match self {
            Self::Draft => PermitStatus::Draft,
            Self::Submitted { .. } => PermitStatus::Submitted,
            Self::Approved { .. } => PermitStatus::Approved,
            Self::Rejected { .. } => PermitStatus::Rejected,
        }
    }

    /// Submission time, once submitted.
    pub fn submitted_at(&self) -> Option<Timestamp> {
        match self {
            Self::Draft => None,
            Self::Submitted { submitted_at }
            | Self::Approved { submitted_at, .. }
            | Self::Rejected { submitted_at, .. } => Some(*submitted_at),
        }
    }
}

// ─── Permit ──────────────────────────────────────────────────────────

/// A permit to work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// Internal identifier.
    pub id: PermitId,
    /// Human-readable unique number, immutable after creation.
    pub permit_number: PermitNumber,
    /// Kind of hazardous work.
    pub permit_type: PermitType,
    /// Short title.
    pub title: String,
    /// What work will be done.
    pub description: String,
    /// Where the work happens.
    pub work_location: String,
    /// Requested start.
    pub start_date: Timestamp,
    /// Requested end, strictly after `start_date`.
    pub end_date: Timestamp,
    /// Classified at creation, never recomputed.
    pub risk_level: RiskLevel,
    /// Report produced alongside `risk_level`.
    pub risk_report: String,
    /// Planned safety measures. Editable in DRAFT.
    pub safety_measures: Option<String>,
    /// Required PPE. Editable in DRAFT.
    pub required_ppe: Option<String>,
    /// The principal who created the permit.
    pub applicant_id: PrincipalId,
    /// Current status and its stamps.
    #[serde(flatten)]
    pub workflow: Workflow,
    /// Creation time.
    pub created_at: Timestamp,
    /// Time of the last committed change.
    pub updated_at: Timestamp,
    /// Write counter maintained by the repository for compare-and-swap.
    pub revision: u64,
}

impl Permit {
    /// Build a new DRAFT permit from validated attributes and a risk outcome.
    pub fn draft(
        id: PermitId,
        permit_number: PermitNumber,
        applicant_id: PrincipalId,
        attributes: PermitAttributes,
        risk_level: RiskLevel,
        risk_report: String,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            permit_number,
            permit_type: attributes.permit_type,
            title: attributes.title,
            description: attributes.description,
            work_location: attributes.work_location,
            start_date: attributes.start_date,
            end_date: attributes.end_date,
            risk_level,
            risk_report,
            safety_measures: attributes.safety_measures,
            required_ppe: attributes.required_ppe,
            applicant_id,
            workflow: Workflow::Draft,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    /// Current status.
    pub fn status(&self) -> PermitStatus {
        self.workflow.status()
    }

    /// Whether `principal` created this permit.
    pub fn is_owned_by(&self, principal: &PrincipalId) -> bool {
        &self.applicant_id == principal
    }

    pub fn submitted_at(&self) -> Option<Timestamp> {
        self.workflow.submitted_at()
    }

    pub fn approver_id(&self) -> Option<PrincipalId> {
        match &self.workflow {
            Workflow::Approved { approver_id, .. } => Some(*approver_id),
            _ => None,
        }
    }

    pub fn approved_at(&self) -> Option<Timestamp> {
        match &self.workflow {
            Workflow::Approved { approved_at, .. } => Some(*approved_at),
            _ => None,
        }
    }

    pub fn rejector_id(&self) -> Option<PrincipalId> {
        match &self.workflow {
            Workflow::Rejected { rejector_id, .. } => Some(*rejector_id),
            _ => None,
        }
    }

    pub fn rejected_at(&self) -> Option<Timestamp> {
        match &self.workflow {
            Workflow::Rejected { rejected_at, .. } => Some(*rejected_at),
            _ => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match &self.workflow {
            Workflow::Rejected {
                rejection_reason, ..
            } => Some(rejection_reason),
            _ => None,
        }
    }

    /// The principal who decided the permit, if decided.
    pub fn decider_id(&self) -> Option<PrincipalId> {
        self.approver_id().or_else(|| self.rejector_id())
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// DRAFT → SUBMITTED.
    pub fn submit(&mut self, now: Timestamp) -> Result<(), PermitError> {
        self.require_status(PermitStatus::Draft, PermitStatus::Submitted)?;
        self.workflow = Workflow::Submitted { submitted_at: now };
        self.updated_at = now;
        Ok(())
    }

    /// SUBMITTED → APPROVED. The approver must not be the applicant.
    ///
    /// The status guard runs first, so a permit that is not under review
    /// always reports `InvalidTransition`.
    pub fn approve(&mut self, approver: &Principal, now: Timestamp) -> Result<(), PermitError> {
        let submitted_at = self.require_submitted(PermitStatus::Approved)?;
        self.require_not_applicant(approver, "approve-permit")?;
        self.workflow = Workflow::Approved {
            submitted_at,
            approver_id: approver.id,
            approved_at: now,
        };
        self.updated_at = now;
        Ok(())
    }

    /// SUBMITTED → REJECTED with a non-blank reason. The rejector must not
    /// be the applicant.
    pub fn reject(
        &mut self,
        rejector: &Principal,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), PermitError> {
        let submitted_at = self.require_submitted(PermitStatus::Rejected)?;
        self.require_not_applicant(rejector, "reject-permit")?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(PermitError::validation("reason", "rejection reason must not be blank"));
        }
        self.workflow = Workflow::Rejected {
            submitted_at,
            rejector_id: rejector.id,
            rejected_at: now,
            rejection_reason: reason.to_string(),
        };
        self.updated_at = now;
        Ok(())
    }

    /// Replace the safety fields while in DRAFT. `None` leaves a field as
    /// is; a blank string clears it. Risk is not recomputed.
    pub fn update_draft(
        &mut self,
        safety_measures: Option<String>,
        required_ppe: Option<String>,
        now: Timestamp,
    ) -> Result<(), PermitError> {
        self.require_status(PermitStatus::Draft, PermitStatus::Draft)?;
        if let Some(value) = safety_measures {
            self.safety_measures = optional_text(Some(value));
        }
        if let Some(value) = required_ppe {
            self.required_ppe = optional_text(Some(value));
        }
        self.updated_at = now;
        Ok(())
    }

    // ── Guards ──────────────────────────────────────────────────────

    fn require_status(&self, expected: PermitStatus, to: PermitStatus) -> Result<(), PermitError> {
        let current = self.status();
        if current != expected {
            return Err(PermitError::InvalidTransition {
                from: current.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    fn require_submitted(&self, to: PermitStatus) -> Result<Timestamp, PermitError> {
        match &self.workflow {
            Workflow::Submitted { submitted_at } => Ok(*submitted_at),
            other => Err(PermitError::InvalidTransition {
                from: other.status().to_string(),
                to: to.to_string(),
            }),
        }
    }

    fn require_not_applicant(&self, caller: &Principal, action: &str) -> Result<(), PermitError> {
        if self.is_owned_by(&caller.id) {
            return Err(PermitError::forbidden(
                action,
                caller.role,
                "the applicant may not decide their own permit",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptw_core::Role;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn sample(applicant: PrincipalId) -> Permit {
        let start = ts("2026-10-20T08:00:00Z");
        let attrs = PermitAttributes {
            permit_type: PermitType::ChemicalWork,
            title: "Drain reactor loop".into(),
            description: "Flush and drain".into(),
            work_location: "reactor room".into(),
            start_date: start,
            end_date: start.plus_hours(4),
            safety_measures: None,
            required_ppe: None,
        };
        Permit::draft(
            PermitId::new(),
            PermitNumber::compose("PTW", start, 1),
            applicant,
            attrs,
            RiskLevel::High,
            "report".into(),
            ts("2026-10-19T09:00:00Z"),
        )
    }

    fn reviewer() -> Principal {
        Principal::new(PrincipalId::new(), Role::SafetyOfficer)
    }

    #[test]
    fn test_new_permit_is_draft() {
        let permit = sample(PrincipalId::new());
        assert_eq!(permit.status(), PermitStatus::Draft);
        assert_eq!(permit.submitted_at(), None);
        assert_eq!(permit.decider_id(), None);
        assert_eq!(permit.revision, 0);
    }

    #[test]
    fn test_submit_then_approve() {
        let mut permit = sample(PrincipalId::new());
        let reviewer = reviewer();
        permit.submit(ts("2026-10-19T10:00:00Z")).unwrap();
        assert_eq!(permit.status(), PermitStatus::Submitted);

        permit.approve(&reviewer, ts("2026-10-19T11:00:00Z")).unwrap();
        assert_eq!(permit.status(), PermitStatus::Approved);
        assert_eq!(permit.approver_id(), Some(reviewer.id));
        assert_eq!(permit.approved_at(), Some(ts("2026-10-19T11:00:00Z")));
        assert_eq!(permit.submitted_at(), Some(ts("2026-10-19T10:00:00Z")));
        assert_eq!(permit.rejector_id(), None);
        assert_eq!(permit.rejected_at(), None);
        assert_eq!(permit.updated_at, ts("2026-10-19T11:00:00Z"));
    }

    #[test]
    fn test_submit_then_reject_trims_reason() {
        let mut permit = sample(PrincipalId::new());
        permit.submit(Timestamp::now()).unwrap();
        permit
            .reject(&reviewer(), "  missing gas test  ", Timestamp::now())
            .unwrap();
        assert_eq!(permit.status(), PermitStatus::Rejected);
        assert_eq!(permit.rejection_reason(), Some("missing gas test"));
        assert_eq!(permit.approver_id(), None);
    }

    #[test]
    fn test_approve_draft_is_invalid_transition() {
        let mut permit = sample(PrincipalId::new());
        let err = permit.approve(&reviewer(), Timestamp::now()).unwrap_err();
        match err {
            PermitError::InvalidTransition { from, to } => {
                assert_eq!(from, "DRAFT");
                assert_eq!(to, "APPROVED");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(permit.status(), PermitStatus::Draft);
    }

    #[test]
    fn test_blank_reason_is_validation_error() {
        let mut permit = sample(PrincipalId::new());
        permit.submit(Timestamp::now()).unwrap();
        let err = permit.reject(&reviewer(), "   ", Timestamp::now()).unwrap_err();
        assert!(matches!(err, PermitError::Validation { ref field, .. } if field == "reason"));
        assert_eq!(permit.status(), PermitStatus::Submitted);
    }

    #[test]
    fn test_terminal_states_refuse_everything() {
        let mut approved = sample(PrincipalId::new());
        approved.submit(Timestamp::now()).unwrap();
        approved.approve(&reviewer(), Timestamp::now()).unwrap();

        assert!(matches!(
            approved.submit(Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
        assert!(matches!(
            approved.approve(&reviewer(), Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
        assert!(matches!(
            approved.reject(&reviewer(), "late", Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
        assert!(matches!(
            approved.update_draft(Some("x".into()), None, Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_self_approval_forbidden_even_for_reviewer_role() {
        let me = Principal::new(PrincipalId::new(), Role::Supervisor);
        let mut permit = sample(me.id);
        permit.submit(Timestamp::now()).unwrap();
        let err = permit.approve(&me, Timestamp::now()).unwrap_err();
        assert!(matches!(err, PermitError::Forbidden { .. }));
        let err = permit.reject(&me, "no", Timestamp::now()).unwrap_err();
        assert!(matches!(err, PermitError::Forbidden { .. }));
        assert_eq!(permit.status(), PermitStatus::Submitted);
    }

    #[test]
    fn test_decided_permit_reports_invalid_transition_first() {
        let me = Principal::new(PrincipalId::new(), Role::Admin);
        let mut permit = sample(me.id);
        permit.submit(Timestamp::now()).unwrap();
        permit.approve(&reviewer(), Timestamp::now()).unwrap();

        assert!(matches!(
            permit.reject(&reviewer(), " ", Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
        assert!(matches!(
            permit.approve(&me, Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
        assert!(matches!(
            permit.reject(&me, "", Timestamp::now()),
            Err(PermitError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_self_decision_checked_before_reason() {
        let me = Principal::new(PrincipalId::new(), Role::Supervisor);
        let mut permit = sample(me.id);
        permit.submit(Timestamp::now()).unwrap();
        assert!(matches!(
            permit.reject(&me, "  ", Timestamp::now()),
            Err(PermitError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_update_draft_keeps_risk() {
        let mut permit = sample(PrincipalId::new());
        permit
            .update_draft(Some("Fire watch".into()), Some("Respirator".into()), Timestamp::now())
            .unwrap();
        assert_eq!(permit.safety_measures.as_deref(), Some("Fire watch"));
        assert_eq!(permit.required_ppe.as_deref(), Some("Respirator"));

        permit.update_draft(None, Some("  ".into()), Timestamp::now()).unwrap();
        assert_eq!(permit.safety_measures.as_deref(), Some("Fire watch"));
        assert_eq!(permit.required_ppe, None);
        assert_eq!(permit.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_status_parse_and_successors() {
        assert_eq!("submitted".parse::<PermitStatus>().unwrap(), PermitStatus::Submitted);
        assert!("CLOSED".parse::<PermitStatus>().is_err());
        for status in PermitStatus::all() {
            assert_eq!(status.is_terminal(), status.successors().is_empty());
        }
    }

    #[test]
    fn test_serde_flattens_workflow() {
        let mut permit = sample(PrincipalId::new());
        permit.submit(ts("2026-10-19T10:00:00Z")).unwrap();
        let json = serde_json::to_value(&permit).unwrap();
        assert_eq!(json["status"], "SUBMITTED");
        assert!(json.get("submitted_at").is_some());
        assert_eq!(json["risk_level"], "HIGH");

        let back: Permit = serde_json::from_value(json).unwrap();
        assert_eq!(back, permit);
    }
}
