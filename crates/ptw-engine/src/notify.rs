//! # Lifecycle Notifications
//!
//! The engine emits a [`LifecycleEvent`] after each committed creation and
//! decision. Delivery is fire-and-forget: a failing [`Notifier`] is logged
//! and never undoes the transition that triggered it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ptw_core::{PermitId, PermitNumber, PrincipalId, Timestamp};

/// What happened to the permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleEventKind {
    Created,
    Approved,
    Rejected,
}

impl LifecycleEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event addressed to one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    /// Who should hear about it.
    pub recipient: PrincipalId,
    pub kind: LifecycleEventKind,
    pub permit_id: PermitId,
    pub permit_number: PermitNumber,
    /// Permit title, for rendering.
    pub title: String,
    /// Rejection reason, for `Rejected` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub occurred_at: Timestamp,
}

impl LifecycleEvent {
    /// One-line human-readable summary.
    pub fn message(&self) -> String {
        match self.kind {
            LifecycleEventKind::Created => format!(
                "Permit {} \"{}\" was created",
                self.permit_number, self.title
            ),
            LifecycleEventKind::Approved => format!(
                "Permit {} \"{}\" was approved",
                self.permit_number, self.title
            ),
            LifecycleEventKind::Rejected => match &self.reason {
                Some(reason) => format!(
                    "Permit {} \"{}\" was rejected: {reason}",
                    self.permit_number, self.title
                ),
                None => format!(
                    "Permit {} \"{}\" was rejected",
                    self.permit_number, self.title
                ),
            },
        }
    }
}

/// Delivery failure reported by a notifier.
#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Delivers lifecycle events.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError>;
}

/// Notifier that only writes the event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %event.recipient,
            kind = %event.kind,
            permit_number = %event.permit_number,
            "{}",
            event.message()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: LifecycleEventKind, reason: Option<&str>) -> LifecycleEvent {
        let issued = Timestamp::parse("2026-10-19T08:00:00Z").unwrap();
        LifecycleEvent {
            recipient: PrincipalId::new(),
            kind,
            permit_id: PermitId::new(),
            permit_number: PermitNumber::compose("PTW", issued, 12),
            title: "Tank entry".into(),
            reason: reason.map(str::to_string),
            occurred_at: issued,
        }
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            event(LifecycleEventKind::Created, None).message(),
            "Permit PTW-20261019-000012 \"Tank entry\" was created"
        );
        assert_eq!(
            event(LifecycleEventKind::Rejected, Some("no gas test")).message(),
            "Permit PTW-20261019-000012 \"Tank entry\" was rejected: no gas test"
        );
    }

    #[test]
    fn test_tracing_notifier_never_fails() {
        assert!(TracingNotifier
            .notify(&event(LifecycleEventKind::Approved, None))
            .is_ok());
    }

    #[test]
    fn test_event_serializes_kind_tag() {
        let json = serde_json::to_value(event(LifecycleEventKind::Approved, None)).unwrap();
        assert_eq!(json["kind"], "APPROVED");
        assert!(json.get("reason").is_none());
    }
}
