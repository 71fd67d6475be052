//! # Permit Lifecycle Engine
//!
//! Orchestrates one lifecycle operation per call against one permit:
//!
//! ```text
//! access policy ─▶ load via repository ─▶ transition on the record
//!               ─▶ conditional save ─▶ lifecycle event (fire-and-forget)
//! ```
//!
//! The engine holds no locks of its own and never retries. Serialization of
//! racing writers is the repository's compare-and-swap; the loser sees
//! `PermitError::Conflict`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ptw_core::{Identity, PermitError, PermitId, PermitNumber, Principal, PrincipalId, Timestamp};
use ptw_policy::{AccessPolicy, Action, Scope};
use ptw_risk::RiskInput;
use ptw_state::{project_history, HistoryEntry, Permit, PermitRequest};

use crate::notify::{LifecycleEvent, LifecycleEventKind, Notifier, TracingNotifier};
use crate::query::{Page, PageRequest, PermitFilter, PermitStats};
use crate::repository::PermitRepository;

/// Edit to the DRAFT-only safety fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftPatch {
    pub safety_measures: Option<String>,
    pub required_ppe: Option<String>,
}

/// The lifecycle engine.
#[derive(Clone)]
pub struct PermitEngine {
    repository: Arc<dyn PermitRepository>,
    policy: AccessPolicy,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for PermitEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl PermitEngine {
    pub fn new(
        repository: Arc<dyn PermitRepository>,
        policy: AccessPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository,
            policy,
            notifier,
        }
    }

    /// Engine that only logs lifecycle events.
    pub fn with_tracing_notifier(repository: Arc<dyn PermitRepository>, policy: AccessPolicy) -> Self {
        Self::new(repository, policy, Arc::new(TracingNotifier))
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Resolve an identity through the repository.
    pub fn identity(&self, id: &PrincipalId) -> Result<Identity, PermitError> {
        self.repository.load_identity(id)
    }

    // ─── Mutations ──────────────────────────────────────────────────

    /// Create a DRAFT permit for `applicant`, classifying its risk.
    pub fn create(&self, applicant: &Principal, request: PermitRequest) -> Result<Permit, PermitError> {
        self.policy.check(applicant, Action::CreatePermit, None)?;
        self.repository.load_identity(&applicant.id)?;
        let attributes = request.validate()?;

        let assessment = ptw_risk::classify(&RiskInput::for_permit(
            attributes.permit_type,
            &attributes.work_location,
            &attributes.description,
        ));
        let now = Timestamp::now();
        let permit_number = self.repository.next_permit_number(now)?;
        let permit = Permit::draft(
            PermitId::new(),
            permit_number,
            applicant.id,
            attributes,
            assessment.level,
            assessment.report,
            now,
        );
        let permit = self.repository.insert_permit(permit)?;

        tracing::info!(
            permit_id = %permit.id,
            permit_number = %permit.permit_number,
            permit_type = %permit.permit_type,
            risk_level = %permit.risk_level,
            "permit created"
        );
        record_transition("create");
        self.emit(&permit, LifecycleEventKind::Created, None);
        Ok(permit)
    }

    /// DRAFT → SUBMITTED, by the applicant or an admin.
    pub fn submit(&self, id: &PermitId, caller: &Principal) -> Result<Permit, PermitError> {
        let mut permit = self.repository.load_permit(id)?;
        self.policy
            .check(caller, Action::SubmitPermit, Some(&permit.applicant_id))?;
        permit.submit(Timestamp::now())?;
        let permit = self.repository.save_permit(permit)?;

        log_transition(&permit, caller);
        record_transition("submit");
        Ok(permit)
    }

    /// SUBMITTED → APPROVED, by a reviewer who is not the applicant.
    pub fn approve(&self, id: &PermitId, caller: &Principal) -> Result<Permit, PermitError> {
        let mut permit = self.repository.load_permit(id)?;
        self.policy
            .check(caller, Action::ApprovePermit, Some(&permit.applicant_id))?;
        permit.approve(caller, Timestamp::now())?;
        let permit = self.repository.save_permit(permit)?;

        log_transition(&permit, caller);
        record_transition("approve");
        self.emit(&permit, LifecycleEventKind::Approved, None);
        Ok(permit)
    }

    /// SUBMITTED → REJECTED with a non-blank reason, by a reviewer who is
    /// not the applicant.
    pub fn reject(
        &self,
        id: &PermitId,
        caller: &Principal,
        reason: &str,
    ) -> Result<Permit, PermitError> {
        let mut permit = self.repository.load_permit(id)?;
        self.policy
            .check(caller, Action::RejectPermit, Some(&permit.applicant_id))?;
        permit.reject(caller, reason, Timestamp::now())?;
        let permit = self.repository.save_permit(permit)?;

        log_transition(&permit, caller);
        record_transition("reject");
        let reason = permit.rejection_reason().map(str::to_string);
        self.emit(&permit, LifecycleEventKind::Rejected, reason);
        Ok(permit)
    }

    /// Edit safety measures and PPE while the permit is in DRAFT.
    pub fn update_draft(
        &self,
        id: &PermitId,
        caller: &Principal,
        patch: DraftPatch,
    ) -> Result<Permit, PermitError> {
        let mut permit = self.repository.load_permit(id)?;
        self.policy
            .check(caller, Action::UpdatePermit, Some(&permit.applicant_id))?;
        permit.update_draft(patch.safety_measures, patch.required_ppe, Timestamp::now())?;
        let permit = self.repository.save_permit(permit)?;

        tracing::info!(permit_id = %permit.id, permit_number = %permit.permit_number, "draft updated");
        record_transition("update");
        Ok(permit)
    }

    // ─── Queries ────────────────────────────────────────────────────

    pub fn get(&self, id: &PermitId, caller: &Principal) -> Result<Permit, PermitError> {
        let permit = self.repository.load_permit(id)?;
        self.policy
            .check(caller, Action::ReadPermit, Some(&permit.applicant_id))?;
        Ok(permit)
    }

    pub fn get_by_number(
        &self,
        number: &PermitNumber,
        caller: &Principal,
    ) -> Result<Permit, PermitError> {
        let permit = self.repository.load_permit_by_number(number)?;
        self.policy
            .check(caller, Action::ReadPermit, Some(&permit.applicant_id))?;
        Ok(permit)
    }

    /// Audit narrative for a permit, naming the decider where known.
    pub fn history(&self, id: &PermitId, caller: &Principal) -> Result<Vec<HistoryEntry>, PermitError> {
        let permit = self.get(id, caller)?;
        let decider = match permit.decider_id() {
            Some(decider_id) => match self.repository.load_identity(&decider_id) {
                Ok(identity) => Some(identity.display_name),
                Err(PermitError::NotFound { .. }) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        Ok(project_history(&permit, decider.as_deref()))
    }

    /// Permits visible to `caller` matching `filter`, newest first.
    pub fn list(
        &self,
        caller: &Principal,
        filter: &PermitFilter,
        page: PageRequest,
    ) -> Result<Page<Permit>, PermitError> {
        let mut permits = self.visible(caller)?;
        permits.retain(|p| filter.matches(p));
        permits.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.permit_number.cmp(&a.permit_number))
        });
        Ok(Page::slice(permits, page))
    }

    /// Status and risk counts over the permits visible to `caller`.
    pub fn stats(&self, caller: &Principal) -> Result<PermitStats, PermitError> {
        Ok(PermitStats::tally(&self.visible(caller)?))
    }

    fn visible(&self, caller: &Principal) -> Result<Vec<Permit>, PermitError> {
        let scope = self.policy.scope(caller, Action::ReadPermit).ok_or_else(|| {
            PermitError::forbidden(
                Action::ReadPermit.as_str(),
                caller.role,
                "role lacks this capability",
            )
        })?;
        let mut permits = self.repository.list_permits()?;
        if scope == Scope::Own {
            permits.retain(|p| p.is_owned_by(&caller.id));
        }
        Ok(permits)
    }

    // ─── Events ─────────────────────────────────────────────────────

    fn emit(&self, permit: &Permit, kind: LifecycleEventKind, reason: Option<String>) {
        let event = LifecycleEvent {
            recipient: permit.applicant_id,
            kind,
            permit_id: permit.id,
            permit_number: permit.permit_number.clone(),
            title: permit.title.clone(),
            reason,
            occurred_at: permit.updated_at,
        };
        if let Err(e) = self.notifier.notify(&event) {
            tracing::warn!(
                permit_id = %permit.id,
                kind = %kind,
                error = %e,
                "lifecycle notification failed"
            );
        }
    }
}

fn log_transition(permit: &Permit, caller: &Principal) {
    tracing::info!(
        permit_id = %permit.id,
        permit_number = %permit.permit_number,
        status = %permit.status(),
        actor = %caller.id,
        revision = permit.revision,
        "permit transitioned"
    );
}

fn record_transition(transition: &'static str) {
    metrics::counter!("ptw_permit_transitions_total", "transition" => transition).increment(1);
}
