//! # Principals and Roles
//!
//! The identity provider is external. The core only sees two shapes:
//!
//! - [`Identity`]: a directory record (display name + role) loaded through
//!   the repository facade. Never mutated by the core.
//! - [`Principal`]: the authenticated caller of an operation: who they are
//!   and which role they act under.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PermitError;
use crate::identity::PrincipalId;

/// Site roles. Each maps to a fixed capability set in `ptw-policy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Requests permits for their own work.
    Employee,
    /// Line supervisor; reviews and decides permits.
    Supervisor,
    /// HSE officer; reviews and decides permits.
    SafetyOfficer,
    /// Site security; read access for gate checks.
    Security,
    /// Administrator with every capability.
    Admin,
}

impl Role {
    /// All roles in canonical order.
    pub fn all() -> &'static [Role] {
        &[
            Self::Employee,
            Self::Supervisor,
            Self::SafetyOfficer,
            Self::Security,
            Self::Admin,
        ]
    }

    /// The wire identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Supervisor => "SUPERVISOR",
            Self::SafetyOfficer => "SAFETY_OFFICER",
            Self::Security => "SECURITY",
            Self::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == upper)
            .ok_or_else(|| PermitError::validation("role", format!("unknown role: {s:?}")))
    }
}

/// A directory record for a person who can apply for or decide permits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier issued by the identity provider.
    pub id: PrincipalId,
    /// Name rendered in history entries and notifications.
    pub display_name: String,
    /// Role used for authorization checks.
    pub role: Role,
}

impl Identity {
    /// Create a directory record.
    pub fn new(id: PrincipalId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
        }
    }

    /// The principal this identity authenticates as.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

/// The authenticated caller of a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Who is calling.
    pub id: PrincipalId,
    /// The role they act under.
    pub role: Role,
}

impl Principal {
    /// Create a principal.
    pub fn new(id: PrincipalId, role: Role) -> Self {
        Self { id, role }
    }
}
