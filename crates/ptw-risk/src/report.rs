//! # Risk Assessment Report
//!
//! Renders the fixed report template. The text is a pure function of the
//! inputs and the computed level, so a stored report can always be
//! regenerated and compared.
//!
//! ```text
//! Risk Assessment Report
//! ======================
//! Permit Type: CHEMICAL_WORK
//! Work Location: reactor room
//! Risk Level: HIGH
//! Assessment: <level boilerplate>
//!
//! Work Description: <description>
//!
//! Location-specific considerations:
//! - Chemical exposure protocols required.
//! ```

use ptw_core::RiskLevel;

use crate::classifier::contains_any;

const NOT_SPECIFIED: &str = "Not specified";

const HIGH_ASSESSMENT: &str = "This work involves high-risk activities. \
Strict safety protocols must be followed. \
Supervisor approval and safety briefing required. \
Emergency procedures must be in place.";

const MEDIUM_ASSESSMENT: &str = "This work involves moderate risk. \
Standard safety measures should be implemented. \
Safety equipment verification required. \
Regular safety checks recommended.";

const LOW_ASSESSMENT: &str = "This work involves low risk. \
Basic safety measures are sufficient. \
Standard PPE requirements apply.";

/// Location triggers and the advisory line each one adds. Every matching
/// row is appended, in table order.
const LOCATION_ADVISORIES: &[(&[&str], &str)] = &[
    (&["chemical", "reactor"], "Chemical exposure protocols required."),
    (&["height", "roof"], "Fall protection equipment mandatory."),
    (&["confined", "tank"], "Atmospheric testing and ventilation required."),
    (&["electrical"], "Lockout/tagout procedures must be followed."),
];

/// Everything the template needs. Blank strings must already be `None`.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// Permit type tag as supplied.
    pub permit_type: Option<&'a str>,
    /// Work location as supplied.
    pub work_location: Option<&'a str>,
    /// Work description as supplied.
    pub description: Option<&'a str>,
    /// The computed level.
    pub level: RiskLevel,
}

/// The boilerplate paragraph for a risk level.
pub fn assessment_text(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => HIGH_ASSESSMENT,
        RiskLevel::Medium => MEDIUM_ASSESSMENT,
        RiskLevel::Low => LOW_ASSESSMENT,
    }
}

/// Advisory lines triggered by a work location.
pub fn location_advisories(work_location: &str) -> Vec<&'static str> {
    let location = work_location.to_lowercase();
    LOCATION_ADVISORIES
        .iter()
        .filter(|(triggers, _)| contains_any(&location, triggers))
        .map(|(_, line)| *line)
        .collect()
}

/// Render the report.
pub fn render(input: &ReportInput<'_>) -> String {
    let permit_type = input
        .permit_type
        .map(|t| t.to_ascii_uppercase())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string());

    let mut lines = vec![
        "Risk Assessment Report".to_string(),
        "======================".to_string(),
        format!("Permit Type: {permit_type}"),
        format!("Work Location: {}", input.work_location.unwrap_or(NOT_SPECIFIED)),
        format!("Risk Level: {}", input.level),
        format!("Assessment: {}", assessment_text(input.level)),
    ];

    if let Some(description) = input.description {
        lines.push(String::new());
        lines.push(format!("Work Description: {description}"));
    }

    let advisories = input
        .work_location
        .map(location_advisories)
        .unwrap_or_default();
    if !advisories.is_empty() {
        lines.push(String::new());
        lines.push("Location-specific considerations:".to_string());
        lines.extend(advisories.iter().map(|a| format!("- {a}")));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify, RiskInput};

    #[test]
    fn test_header_and_fields() {
        let report = classify(&RiskInput {
            permit_type: Some("HOT_WORK"),
            work_location: None,
            description: None,
        })
        .report;
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "Risk Assessment Report");
        assert_eq!(lines[2], "Permit Type: HOT_WORK");
        assert_eq!(lines[3], "Work Location: Not specified");
        assert_eq!(lines[4], "Risk Level: HIGH");
        assert!(lines[5].starts_with("Assessment: This work involves high-risk activities."));
        assert!(!report.contains("Work Description"));
        assert!(!report.contains("Location-specific"));
    }

    #[test]
    fn test_missing_type_is_not_specified() {
        let report = classify(&RiskInput::default()).report;
        assert!(report.contains("Permit Type: Not specified"));
        assert!(report.contains("Risk Level: LOW"));
        assert!(report.contains(LOW_ASSESSMENT));
    }

    #[test]
    fn test_description_is_echoed() {
        let report = classify(&RiskInput {
            permit_type: Some("GENERAL_WORK"),
            work_location: Some("canteen"),
            description: Some("Replace ceiling lights"),
        })
        .report;
        assert!(report.contains("\n\nWork Description: Replace ceiling lights"));
    }

    #[test]
    fn test_advisories_co_occur_in_table_order() {
        let advisories = location_advisories("Electrical room beside acid storage tank on roof");
        assert_eq!(
            advisories,
            vec![
                "Fall protection equipment mandatory.",
                "Atmospheric testing and ventilation required.",
                "Lockout/tagout procedures must be followed.",
            ]
        );
    }

    #[test]
    fn test_reactor_adds_chemical_protocol() {
        let report = classify(&RiskInput {
            permit_type: Some("CHEMICAL_WORK"),
            work_location: Some("reactor room"),
            description: Some("Catalyst change"),
        })
        .report;
        assert!(report.contains("Risk Level: HIGH"));
        assert!(report.ends_with("Location-specific considerations:\n- Chemical exposure protocols required."));
    }

    #[test]
    fn test_medium_boilerplate() {
        assert_eq!(assessment_text(RiskLevel::Medium), MEDIUM_ASSESSMENT);
        assert!(MEDIUM_ASSESSMENT.contains("Safety equipment verification required."));
    }
}
