//! # Capability Table and Access Decisions
//!
//! A [`CapabilityTable`] maps each role to the actions it may perform and
//! the [`Scope`] of each grant. Its YAML form mirrors the map directly:
//!
//! ```yaml
//! EMPLOYEE:
//!   create-permit: any
//!   submit-permit: own
//!   read-permit: own
//! SECURITY:
//!   read-permit: any
//! ```
//!
//! Roles absent from a loaded table have no capabilities.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ptw_core::{PermitError, Principal, PrincipalId, Role};

use crate::action::{Action, Scope};
use crate::error::PolicyError;

// ─── Capability Table ────────────────────────────────────────────────

/// Immutable role → (action → scope) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityTable(BTreeMap<Role, BTreeMap<Action, Scope>>);

impl CapabilityTable {
    /// The built-in site table.
    pub fn builtin() -> Self {
        use Action::*;
        use Scope::*;

        let reviewer = [
            (CreatePermit, Any),
            (SubmitPermit, Own),
            (UpdatePermit, Own),
            (ApprovePermit, Any),
            (RejectPermit, Any),
            (ReadPermit, Any),
        ];
        let mut table = BTreeMap::new();
        table.insert(
            Role::Employee,
            BTreeMap::from([
                (CreatePermit, Any),
                (SubmitPermit, Own),
                (UpdatePermit, Own),
                (ReadPermit, Own),
            ]),
        );
        table.insert(Role::Supervisor, BTreeMap::from(reviewer));
        table.insert(Role::SafetyOfficer, BTreeMap::from(reviewer));
        table.insert(Role::Security, BTreeMap::from([(ReadPermit, Any)]));
        table.insert(
            Role::Admin,
            Action::all().iter().map(|action| (*action, Any)).collect(),
        );
        Self(table)
    }

    /// Parse a table from YAML text. `origin` is only used in errors.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self, PolicyError> {
        serde_yaml::from_str(content).map_err(|source| PolicyError::YamlParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a table from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PolicyError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PolicyError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_yaml(&content, path)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Scope at which `role` holds `action`, if at all.
    pub fn scope(&self, role: Role, action: Action) -> Option<Scope> {
        self.0.get(&role).and_then(|grants| grants.get(&action)).copied()
    }

    /// Every grant held by `role`.
    pub fn grants(&self, role: Role) -> impl Iterator<Item = (Action, Scope)> + '_ {
        self.0
            .get(&role)
            .into_iter()
            .flat_map(|grants| grants.iter().map(|(a, s)| (*a, *s)))
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ─── Access Policy ───────────────────────────────────────────────────

/// Decides whether a principal may perform an action.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    table: CapabilityTable,
}

impl AccessPolicy {
    pub fn new(table: CapabilityTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CapabilityTable {
        &self.table
    }

    /// Scope at which `principal` holds `action`.
    pub fn scope(&self, principal: &Principal, action: Action) -> Option<Scope> {
        self.table.scope(principal.role, action)
    }

    /// Whether `principal` may perform `action` on a resource owned by
    /// `owner`.
    ///
    /// With no owner (an action not aimed at an existing resource, such as
    /// creation) any grant suffices. With an owner, an `Own` grant requires
    /// the principal to be that owner.
    pub fn permits(&self, principal: &Principal, action: Action, owner: Option<&PrincipalId>) -> bool {
        match (self.scope(principal, action), owner) {
            (None, _) => false,
            (Some(Scope::Any), _) | (Some(Scope::Own), None) => true,
            (Some(Scope::Own), Some(owner)) => owner == &principal.id,
        }
    }

    /// As [`permits`](Self::permits), surfacing a denial as
    /// `PermitError::Forbidden`.
    pub fn check(
        &self,
        principal: &Principal,
        action: Action,
        owner: Option<&PrincipalId>,
    ) -> Result<(), PermitError> {
        if self.permits(principal, action, owner) {
            return Ok(());
        }
        let reason = match self.scope(principal, action) {
            None => "role lacks this capability",
            Some(_) => "capability is limited to the principal's own permits",
        };
        Err(PermitError::forbidden(action.as_str(), principal.role, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal::new(PrincipalId::new(), role)
    }

    #[test]
    fn test_employee_own_only() {
        let policy = AccessPolicy::default();
        let me = principal(Role::Employee);
        let other = PrincipalId::new();

        assert!(policy.permits(&me, Action::CreatePermit, None));
        assert!(policy.permits(&me, Action::SubmitPermit, Some(&me.id)));
        assert!(!policy.permits(&me, Action::SubmitPermit, Some(&other)));
        assert!(policy.permits(&me, Action::ReadPermit, Some(&me.id)));
        assert!(!policy.permits(&me, Action::ReadPermit, Some(&other)));
        assert!(!policy.permits(&me, Action::ApprovePermit, Some(&other)));
        assert!(!policy.permits(&me, Action::ManageUsers, None));
    }

    #[test]
    fn test_reviewers_decide_any() {
        let policy = AccessPolicy::default();
        let other = PrincipalId::new();
        for role in [Role::Supervisor, Role::SafetyOfficer, Role::Admin] {
            let p = principal(role);
            assert!(policy.permits(&p, Action::ApprovePermit, Some(&other)), "{role}");
            assert!(policy.permits(&p, Action::RejectPermit, Some(&other)), "{role}");
            assert!(policy.permits(&p, Action::ReadPermit, Some(&other)), "{role}");
        }
    }

    #[test]
    fn test_only_admin_submits_for_others() {
        let policy = AccessPolicy::default();
        let other = PrincipalId::new();
        assert!(policy.permits(&principal(Role::Admin), Action::SubmitPermit, Some(&other)));
        assert!(!policy.permits(&principal(Role::Supervisor), Action::SubmitPermit, Some(&other)));
    }

    #[test]
    fn test_security_reads_only() {
        let policy = AccessPolicy::default();
        let guard = principal(Role::Security);
        let other = PrincipalId::new();
        assert!(policy.permits(&guard, Action::ReadPermit, Some(&other)));
        assert!(!policy.permits(&guard, Action::CreatePermit, None));
        assert!(!policy.permits(&guard, Action::ApprovePermit, Some(&other)));
    }

    #[test]
    fn test_check_reports_action_and_role() {
        let policy = AccessPolicy::default();
        let err = policy
            .check(&principal(Role::Employee), Action::ApprovePermit, Some(&PrincipalId::new()))
            .unwrap_err();
        match err {
            PermitError::Forbidden { action, role, .. } => {
                assert_eq!(action, "approve-permit");
                assert_eq!(role, Role::Employee);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_yaml_table() {
        let yaml = "EMPLOYEE:\n  create-permit: any\n  read-permit: own\nSECURITY:\n  read-permit: any\n";
        let table = CapabilityTable::from_yaml(yaml, Path::new("inline")).unwrap();
        assert_eq!(table.scope(Role::Employee, Action::ReadPermit), Some(Scope::Own));
        assert_eq!(table.scope(Role::Employee, Action::SubmitPermit), None);
        assert_eq!(table.scope(Role::Admin, Action::ReadPermit), None);
    }

    #[test]
    fn test_yaml_rejects_unknown_action() {
        let yaml = "EMPLOYEE:\n  delete-permit: any\n";
        assert!(matches!(
            CapabilityTable::from_yaml(yaml, Path::new("inline")),
            Err(PolicyError::YamlParse { .. })
        ));
    }

    #[test]
    fn test_builtin_survives_yaml() {
        let table = CapabilityTable::builtin();
        let yaml = table.to_yaml().unwrap();
        assert_eq!(CapabilityTable::from_yaml(&yaml, Path::new("inline")).unwrap(), table);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CapabilityTable::load(Path::new("/nonexistent/policy.yaml")),
            Err(PolicyError::FileNotFound { .. })
        ));
    }
}
