//! Actions subject to the access policy and the scopes they are granted at.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// An operation a principal may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    CreatePermit,
    SubmitPermit,
    UpdatePermit,
    ApprovePermit,
    RejectPermit,
    ReadPermit,
    ManageUsers,
}

impl Action {
    /// All actions.
    pub fn all() -> &'static [Action] {
        &[
            Self::CreatePermit,
            Self::SubmitPermit,
            Self::UpdatePermit,
            Self::ApprovePermit,
            Self::RejectPermit,
            Self::ReadPermit,
            Self::ManageUsers,
        ]
    }

    /// Kebab-case name, e.g. `"approve-permit"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatePermit => "create-permit",
            Self::SubmitPermit => "submit-permit",
            Self::UpdatePermit => "update-permit",
            Self::ApprovePermit => "approve-permit",
            Self::RejectPermit => "reject-permit",
            Self::ReadPermit => "read-permit",
            Self::ManageUsers => "manage-users",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| PolicyError::UnknownAction { name: s.to_string() })
    }
}

/// How far a grant reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only resources the principal owns.
    Own,
    /// Any resource.
    Any,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Any => "any",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
