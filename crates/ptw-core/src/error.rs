//! # Error Types: Domain Error Taxonomy
//!
//! All lifecycle failures surface as [`PermitError`]. The five domain
//! variants are terminal for the single operation that raised them and are
//! never retried internally. [`StorageError`] wraps infrastructure failures
//! opaquely so callers can tell them apart from domain errors.

use thiserror::Error;

use crate::identity::PermitId;
use crate::principal::Role;

/// The kind of resource a lookup failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A permit record.
    Permit,
    /// An applicant, approver or rejector identity.
    Identity,
    /// A delivered notification.
    Notification,
}

impl ResourceKind {
    /// Lowercase resource name used in messages and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permit => "permit",
            Self::Identity => "identity",
            Self::Notification => "notification",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for permit operations.
#[derive(Error, Debug)]
pub enum PermitError {
    /// Malformed or missing input.
    #[error("validation failed for {field}: {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// A referenced permit or identity does not exist.
    #[error("{resource} {id} not found")]
    NotFound {
        /// Kind of resource that was looked up.
        resource: ResourceKind,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// The access policy denied the action.
    #[error("{role} may not {action}: {reason}")]
    Forbidden {
        /// The action that was attempted (e.g. "approve-permit").
        action: String,
        /// Role of the caller.
        role: Role,
        /// Why the request was denied.
        reason: String,
    },

    /// The state machine has no such transition from the current status.
    #[error("invalid permit transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: String,
        /// Attempted target status.
        to: String,
    },

    /// A concurrent writer changed the permit between read and write.
    #[error(
        "permit {permit_id} was modified concurrently: read revision {read_revision}, \
         stored revision {stored_revision} ({stored_status})"
    )]
    Conflict {
        /// The contended permit.
        permit_id: PermitId,
        /// Revision observed when the permit was read.
        read_revision: u64,
        /// Revision found at write time.
        stored_revision: u64,
        /// Status found at write time.
        stored_status: String,
    },

    /// Infrastructure failure in the persistence collaborator.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl PermitError {
    /// Build a validation error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build a not-found error for the given resource.
    pub fn not_found(resource: ResourceKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Build a policy denial.
    pub fn forbidden(action: impl Into<String>, role: Role, reason: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
            role,
            reason: reason.into(),
        }
    }

    /// Machine-readable code for this error (e.g. `"INVALID_TRANSITION"`).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Conflict { .. } => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether this is one of the five domain errors, as opposed to an
    /// infrastructure failure.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Opaque failure in the persistence collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend rejected or failed the operation.
    #[error("backend failure: {0}")]
    Backend(String),

    /// A stored record could not be decoded.
    #[error("corrupt record {id}: {reason}")]
    Corrupt {
        /// Identifier of the unreadable record.
        id: String,
        /// Decoding failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = PermitError::validation("title", "must not be blank");
        assert_eq!(err.to_string(), "validation failed for title: must not be blank");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_not_found_message() {
        let err = PermitError::not_found(ResourceKind::Identity, "abc");
        assert_eq!(err.to_string(), "identity abc not found");
    }

    #[test]
    fn test_forbidden_message_includes_role() {
        let err = PermitError::forbidden("approve-permit", Role::Employee, "missing capability");
        assert!(err.to_string().contains("EMPLOYEE"));
        assert!(err.to_string().contains("approve-permit"));
    }

    #[test]
    fn test_storage_is_not_domain() {
        let err = PermitError::from(StorageError::Backend("connection reset".into()));
        assert!(!err.is_domain());
        assert_eq!(err.code(), "STORAGE_ERROR");
        assert!(PermitError::validation("x", "y").is_domain());
    }

    #[test]
    fn test_conflict_reports_both_revisions() {
        let err = PermitError::Conflict {
            permit_id: PermitId::new(),
            read_revision: 2,
            stored_revision: 3,
            stored_status: "APPROVED".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("read revision 2"));
        assert!(msg.contains("stored revision 3 (APPROVED)"));
        assert_eq!(err.code(), "CONFLICT");
    }
}
