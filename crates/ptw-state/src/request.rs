//! # Permit Request Validation
//!
//! A [`PermitRequest`] is what the caller sends: every field optional,
//! nothing trusted. [`PermitRequest::validate`] turns it into
//! [`PermitAttributes`], the only shape the state machine accepts.

use serde::{Deserialize, Serialize};

use ptw_core::{PermitError, PermitType, Timestamp};

/// Maximum title length, in characters, after trimming.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum work location length, in characters, after trimming.
pub const MAX_LOCATION_LEN: usize = 200;

/// Unvalidated permit creation input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermitRequest {
    /// Permit type tag (e.g. `"HOT_WORK"`).
    pub permit_type: Option<String>,
    /// Short title.
    pub title: Option<String>,
    /// What work will be done.
    pub description: Option<String>,
    /// Where the work happens.
    pub work_location: Option<String>,
    /// Requested start.
    pub start_date: Option<Timestamp>,
    /// Requested end. Must be strictly after start.
    pub end_date: Option<Timestamp>,
    /// Planned safety measures.
    pub safety_measures: Option<String>,
    /// Required personal protective equipment.
    pub required_ppe: Option<String>,
}

/// Validated creation attributes. Immutable once a permit exists, apart
/// from the two safety fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitAttributes {
    /// Permit type.
    pub permit_type: PermitType,
    /// Trimmed, non-blank title.
    pub title: String,
    /// Trimmed, non-blank description.
    pub description: String,
    /// Trimmed, non-blank work location.
    pub work_location: String,
    /// Requested start.
    pub start_date: Timestamp,
    /// Requested end, strictly after `start_date`.
    pub end_date: Timestamp,
    /// Planned safety measures, if any.
    pub safety_measures: Option<String>,
    /// Required PPE, if any.
    pub required_ppe: Option<String>,
}

impl PermitRequest {
    /// Validate the request.
    ///
    /// Fields are checked in declaration order and the first failure is
    /// returned, naming the field.
    ///
    /// # Errors
    ///
    /// `PermitError::Validation` if a required field is missing or blank,
    /// the type is unknown, a length limit is exceeded, or
    /// `end_date <= start_date`.
    pub fn validate(self) -> Result<PermitAttributes, PermitError> {
        let permit_type = required_text("permit_type", self.permit_type)?.parse::<PermitType>()?;
        let title = required_text("title", self.title)?;
        check_len("title", &title, MAX_TITLE_LEN)?;
        let description = required_text("description", self.description)?;
        let work_location = required_text("work_location", self.work_location)?;
        check_len("work_location", &work_location, MAX_LOCATION_LEN)?;
        let start_date = self
            .start_date
            .ok_or_else(|| PermitError::validation("start_date", "is required"))?;
        let end_date = self
            .end_date
            .ok_or_else(|| PermitError::validation("end_date", "is required"))?;
        if end_date <= start_date {
            return Err(PermitError::validation(
                "end_date",
                format!("must be after start_date ({start_date}), got {end_date}"),
            ));
        }

        Ok(PermitAttributes {
            permit_type,
            title,
            description,
            work_location,
            start_date,
            end_date,
            safety_measures: optional_text(self.safety_measures),
            required_ppe: optional_text(self.required_ppe),
        })
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, PermitError> {
    optional_text(value).ok_or_else(|| PermitError::validation(field, "is required"))
}

pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), PermitError> {
    let len = value.chars().count();
    if len > max {
        return Err(PermitError::validation(
            field,
            format!("must not exceed {max} characters, got {len}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> PermitRequest {
        let start = Timestamp::parse("2026-10-20T08:00:00Z").unwrap();
        PermitRequest {
            permit_type: Some("HOT_WORK".into()),
            title: Some("  Weld pipe support  ".into()),
            description: Some("Replace corroded bracket".into()),
            work_location: Some("Pump house 3".into()),
            start_date: Some(start),
            end_date: Some(start.plus_hours(4)),
            safety_measures: Some("Fire watch".into()),
            required_ppe: Some("   ".into()),
        }
    }

    fn field_of(err: PermitError) -> String {
        match err {
            PermitError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let attrs = valid_request().validate().unwrap();
        assert_eq!(attrs.permit_type, PermitType::HotWork);
        assert_eq!(attrs.title, "Weld pipe support");
        assert_eq!(attrs.safety_measures.as_deref(), Some("Fire watch"));
        assert_eq!(attrs.required_ppe, None);
    }

    #[test]
    fn test_missing_type() {
        let req = PermitRequest {
            permit_type: None,
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "permit_type");
    }

    #[test]
    fn test_unknown_type() {
        let req = PermitRequest {
            permit_type: Some("DIVING".into()),
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "permit_type");
    }

    #[test]
    fn test_blank_title() {
        let req = PermitRequest {
            title: Some("   ".into()),
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "title");
    }

    #[test]
    fn test_title_too_long() {
        let req = PermitRequest {
            title: Some("x".repeat(MAX_TITLE_LEN + 1)),
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "title");
    }

    #[test]
    fn test_missing_description_and_location() {
        let req = PermitRequest {
            description: None,
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "description");
        let req = PermitRequest {
            work_location: Some(String::new()),
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "work_location");
    }

    #[test]
    fn test_end_equal_to_start_rejected() {
        let mut req = valid_request();
        req.end_date = req.start_date;
        assert_eq!(field_of(req.validate().unwrap_err()), "end_date");
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut req = valid_request();
        req.end_date = req.start_date.map(|s| s.plus_hours(-1));
        assert_eq!(field_of(req.validate().unwrap_err()), "end_date");
    }

    #[test]
    fn test_missing_dates() {
        let req = PermitRequest {
            start_date: None,
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "start_date");
        let req = PermitRequest {
            end_date: None,
            ..valid_request()
        };
        assert_eq!(field_of(req.validate().unwrap_err()), "end_date");
    }
}
