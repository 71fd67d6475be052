//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that cross the core boundary.
//! You cannot pass a `PrincipalId` where a `PermitId` is expected.
//!
//! `PermitNumber` is the human-readable permit identity. It is assigned once
//! at creation and never changes; uniqueness is guaranteed by the generator
//! in `ptw-engine`, not by this type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PermitError;
use crate::temporal::Timestamp;

/// Unique identifier for a permit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermitId(pub Uuid);

/// Unique identifier for a principal (applicant, approver, rejector).
///
/// Issued by the external identity provider; the core never mints these
/// outside tests and seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PermitId {
    /// Generate a new random permit identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PermitId {
    fn default() -> Self {
        Self::new()
    }
}

impl PrincipalId {
    /// Generate a new random principal identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PermitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "permit:{}", self.0)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "principal:{}", self.0)
    }
}

/// Accepts the bare UUID carried on the wire and the `principal:`-prefixed
/// form written by `Display`.
impl std::str::FromStr for PrincipalId {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let raw = s.strip_prefix("principal:").unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| PermitError::validation("principal_id", format!("not a UUID: {s:?}")))
    }
}

/// Human-readable permit number, e.g. `PTW-20261019-000042`.
///
/// Layout: `{prefix}-{YYYYMMDD}-{sequence:06}`. The date segment is
/// informational; the sequence segment carries uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermitNumber(String);

impl PermitNumber {
    /// Compose a permit number from its parts.
    pub fn compose(prefix: &str, issued: Timestamp, sequence: u64) -> Self {
        Self(format!(
            "{prefix}-{}-{sequence:06}",
            issued.as_datetime().format("%Y%m%d")
        ))
    }

    /// Wrap an existing permit number, e.g. one loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value is blank or contains
    /// whitespace.
    pub fn parse(value: &str) -> Result<Self, PermitError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(PermitError::validation("permit_number", "must not be blank"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(PermitError::validation(
                "permit_number",
                format!("must not contain whitespace: {value:?}"),
            ));
        }
        Ok(Self(value.to_string()))
    }

    /// The trailing sequence segment, if the number follows the standard layout.
    pub fn sequence(&self) -> Option<u64> {
        self.0.rsplit('-').next()?.parse().ok()
    }

    /// Borrow the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermitNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permit_number_layout() {
        let issued = Timestamp::parse("2026-10-19T08:30:00Z").unwrap();
        let number = PermitNumber::compose("PTW", issued, 42);
        assert_eq!(number.as_str(), "PTW-20261019-000042");
        assert_eq!(number.sequence(), Some(42));
    }

    #[test]
    fn test_sequence_wider_than_padding() {
        let issued = Timestamp::parse("2026-10-19T08:30:00Z").unwrap();
        let number = PermitNumber::compose("HW", issued, 1_234_567);
        assert_eq!(number.as_str(), "HW-20261019-1234567");
        assert_eq!(number.sequence(), Some(1_234_567));
    }

    #[test]
    fn test_parse_rejects_blank_and_whitespace() {
        assert!(PermitNumber::parse("   ").is_err());
        assert!(PermitNumber::parse("PTW 1").is_err());
        assert_eq!(PermitNumber::parse(" PTW-1 ").unwrap().as_str(), "PTW-1");
    }

    #[test]
    fn test_legacy_number_has_no_sequence() {
        let number = PermitNumber::parse("PERMIT").unwrap();
        assert_eq!(number.sequence(), None);
    }

    #[test]
    fn test_ids_are_distinct() {
        assert_ne!(PermitId::new(), PermitId::new());
        assert!(PrincipalId::new().to_string().starts_with("principal:"));
    }

    #[test]
    fn test_principal_id_parses_bare_and_display_forms() {
        let id = PrincipalId::new();
        assert_eq!(id.as_uuid().to_string().parse::<PrincipalId>().unwrap(), id);
        assert_eq!(id.to_string().parse::<PrincipalId>().unwrap(), id);
        assert_eq!(format!(" {} ", id.as_uuid()).parse::<PrincipalId>().unwrap(), id);
    }

    #[test]
    fn test_principal_id_rejects_garbage() {
        assert!("principal:".parse::<PrincipalId>().is_err());
        assert!("permit:0b9e6f0c-3a4e-4d43-9a57-0d3c3b0f6c11".parse::<PrincipalId>().is_err());
        assert!("not-a-uuid".parse::<PrincipalId>().is_err());
    }

    #[test]
    fn test_permit_number_serializes_as_string() {
        let number = PermitNumber::parse("PTW-20261019-000001").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"PTW-20261019-000001\"");
    }
}
