//! # Notification Inbox
//!
//! The service's notifier: every lifecycle event becomes an unread
//! notification for its recipient. Inboxes live in memory only.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use ptw_core::{PermitError, PrincipalId, ResourceKind};
use ptw_engine::{LifecycleEvent, LifecycleEventKind, Notifier, NotifyError};

/// Upper bound on stored notifications; the oldest are dropped first.
pub const MAX_NOTIFICATIONS: usize = 10_000;

/// A delivered lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    #[schema(value_type = Uuid)]
    pub recipient: PrincipalId,
    #[schema(value_type = String)]
    pub kind: LifecycleEventKind,
    pub permit_id: Uuid,
    pub permit_number: String,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// In-memory notification store, shared between the engine and routes.
#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    entries: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications for `recipient`, newest first.
    pub fn list_for(&self, recipient: &PrincipalId) -> Vec<Notification> {
        let mut mine: Vec<_> = self
            .entries
            .read()
            .iter()
            .filter(|n| &n.recipient == recipient)
            .cloned()
            .collect();
        mine.reverse();
        mine
    }

    pub fn unread_count(&self, recipient: &PrincipalId) -> usize {
        self.entries
            .read()
            .iter()
            .filter(|n| &n.recipient == recipient && !n.read)
            .count()
    }

    /// Mark one of `recipient`'s notifications read. Someone else's
    /// notification is reported as not found.
    pub fn mark_read(&self, id: Uuid, recipient: &PrincipalId) -> Result<Notification, PermitError> {
        let mut guard = self.entries.write();
        let entry = guard
            .iter_mut()
            .find(|n| n.id == id && &n.recipient == recipient)
            .ok_or_else(|| PermitError::not_found(ResourceKind::Notification, id))?;
        entry.read = true;
        Ok(entry.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationInbox {
    fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        let notification = Notification {
            id: Uuid::new_v4(),
            recipient: event.recipient,
            kind: event.kind,
            permit_id: *event.permit_id.as_uuid(),
            permit_number: event.permit_number.to_string(),
            title: event.title.clone(),
            message: event.message(),
            read: false,
            created_at: *event.occurred_at.as_datetime(),
        };
        let mut guard = self.entries.write();
        if guard.len() >= MAX_NOTIFICATIONS {
            let excess = guard.len() + 1 - MAX_NOTIFICATIONS;
            guard.drain(..excess);
        }
        guard.push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptw_core::{PermitId, PermitNumber, Timestamp};

    fn event(recipient: PrincipalId, kind: LifecycleEventKind) -> LifecycleEvent {
        let now = Timestamp::now();
        LifecycleEvent {
            recipient,
            kind,
            permit_id: PermitId::new(),
            permit_number: PermitNumber::compose("PTW", now, 3),
            title: "Hot tap".into(),
            reason: None,
            occurred_at: now,
        }
    }

    #[test]
    fn test_delivery_and_listing() {
        let inbox = NotificationInbox::new();
        let alice = PrincipalId::new();
        let bob = PrincipalId::new();
        inbox.notify(&event(alice, LifecycleEventKind::Created)).unwrap();
        inbox.notify(&event(alice, LifecycleEventKind::Approved)).unwrap();
        inbox.notify(&event(bob, LifecycleEventKind::Created)).unwrap();

        let mine = inbox.list_for(&alice);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].kind, LifecycleEventKind::Approved);
        assert_eq!(inbox.unread_count(&alice), 2);
    }

    #[test]
    fn test_mark_read_only_own() {
        let inbox = NotificationInbox::new();
        let alice = PrincipalId::new();
        inbox.notify(&event(alice, LifecycleEventKind::Created)).unwrap();
        let id = inbox.list_for(&alice)[0].id;

        assert!(matches!(
            inbox.mark_read(id, &PrincipalId::new()),
            Err(PermitError::NotFound { .. })
        ));
        assert!(inbox.mark_read(id, &alice).unwrap().read);
        assert_eq!(inbox.unread_count(&alice), 0);
    }
}
