//! # Three-Stage Risk Cascade
//!
//! Matching is case-insensitive substring search over the lowercased input.
//! The vocabularies below are the whole rule table.

use serde::{Deserialize, Serialize};

use ptw_core::{PermitType, RiskLevel};

use crate::report;

/// Locations that force `HIGH` regardless of the base level.
pub const HIGH_RISK_LOCATIONS: &[&str] = &[
    "chemical plant",
    "reactor",
    "storage tank",
    "furnace",
    "high voltage",
    "roof",
];

/// Locations that raise `LOW` to `MEDIUM`.
pub const MEDIUM_RISK_LOCATIONS: &[&str] = &["workshop", "machinery", "basement", "electrical room"];

/// Description keywords that force `HIGH`.
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "toxic",
    "explosive",
    "high pressure",
    "radioactive",
    "hazardous",
    "flammable",
];

/// Description keywords that raise `LOW` to `MEDIUM`.
pub const MEDIUM_RISK_KEYWORDS: &[&str] = &["heavy machinery", "overhead work", "electrical", "chemical"];

/// Input to the classifier. Every field is optional; `None` and blank
/// strings both mean "no information".
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskInput<'a> {
    /// Permit type tag, as submitted. Unrecognized tags are allowed.
    pub permit_type: Option<&'a str>,
    /// Free-text work location.
    pub work_location: Option<&'a str>,
    /// Free-text work description.
    pub description: Option<&'a str>,
}

impl<'a> RiskInput<'a> {
    /// Input for a validated permit request.
    pub fn for_permit(permit_type: PermitType, work_location: &'a str, description: &'a str) -> Self {
        Self {
            permit_type: Some(permit_type.as_str()),
            work_location: Some(work_location),
            description: Some(description),
        }
    }
}

/// The level after each stage of the cascade, kept for audit and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLevels {
    /// Stage 1: from permit type alone.
    pub base: RiskLevel,
    /// Stage 2: after location escalation.
    pub location: RiskLevel,
    /// Stage 3: after description escalation. Equals the final level.
    pub description: RiskLevel,
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Final risk level.
    pub level: RiskLevel,
    /// Assessment report text.
    pub report: String,
    /// Per-stage levels.
    pub stages: StageLevels,
}

/// Classify a permit request.
pub fn classify(input: &RiskInput<'_>) -> RiskAssessment {
    let permit_type = present(input.permit_type);
    let location = present(input.work_location).map(str::to_lowercase);
    let description = present(input.description).map(str::to_lowercase);

    let base = base_risk(permit_type.and_then(|t| t.parse::<PermitType>().ok()));
    let after_location = escalate(
        base,
        location.as_deref(),
        HIGH_RISK_LOCATIONS,
        MEDIUM_RISK_LOCATIONS,
    );
    let after_description = escalate(
        after_location,
        description.as_deref(),
        HIGH_RISK_KEYWORDS,
        MEDIUM_RISK_KEYWORDS,
    );

    let report = report::render(&report::ReportInput {
        permit_type,
        work_location: present(input.work_location),
        description: present(input.description),
        level: after_description,
    });

    RiskAssessment {
        level: after_description,
        report,
        stages: StageLevels {
            base,
            location: after_location,
            description: after_description,
        },
    }
}

/// Stage 1. Unknown or missing types start at `LOW`.
pub fn base_risk(permit_type: Option<PermitType>) -> RiskLevel {
    match permit_type {
        Some(PermitType::HotWork | PermitType::ConfinedSpace | PermitType::HeightWork) => {
            RiskLevel::High
        }
        Some(PermitType::ElectricalWork | PermitType::ChemicalWork) => RiskLevel::Medium,
        Some(PermitType::GeneralWork) | None => RiskLevel::Low,
    }
}

/// Stages 2 and 3 share one rule: a high-vocabulary hit forces `HIGH`; a
/// medium-vocabulary hit lifts `LOW` to `MEDIUM` and nothing else.
fn escalate(current: RiskLevel, text: Option<&str>, high: &[&str], medium: &[&str]) -> RiskLevel {
    let Some(text) = text else {
        return current;
    };
    if contains_any(text, high) {
        return RiskLevel::High;
    }
    if current == RiskLevel::Low && contains_any(text, medium) {
        return RiskLevel::Medium;
    }
    current
}

/// `haystack` must already be lowercase.
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(permit_type: Option<&str>, location: Option<&str>, description: Option<&str>) -> RiskLevel {
        classify(&RiskInput {
            permit_type,
            work_location: location,
            description,
        })
        .level
    }

    #[test]
    fn test_hot_work_alone_is_high() {
        assert_eq!(level(Some("HOT_WORK"), None, None), RiskLevel::High);
    }

    #[test]
    fn test_base_levels_by_type() {
        assert_eq!(base_risk(Some(PermitType::ConfinedSpace)), RiskLevel::High);
        assert_eq!(base_risk(Some(PermitType::HeightWork)), RiskLevel::High);
        assert_eq!(base_risk(Some(PermitType::ElectricalWork)), RiskLevel::Medium);
        assert_eq!(base_risk(Some(PermitType::ChemicalWork)), RiskLevel::Medium);
        assert_eq!(base_risk(Some(PermitType::GeneralWork)), RiskLevel::Low);
    }

    #[test]
    fn test_missing_and_unknown_type_start_low() {
        assert_eq!(level(None, None, None), RiskLevel::Low);
        assert_eq!(level(Some("UNDERWATER_WELDING"), None, None), RiskLevel::Low);
        assert_eq!(level(Some("   "), None, None), RiskLevel::Low);
    }

    #[test]
    fn test_type_tag_is_case_insensitive() {
        assert_eq!(level(Some("hot_work"), None, None), RiskLevel::High);
    }

    #[test]
    fn test_machinery_workshop_lifts_general_to_medium() {
        assert_eq!(
            level(Some("GENERAL_WORK"), Some("machinery workshop"), None),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_high_location_forces_high() {
        assert_eq!(level(Some("GENERAL_WORK"), Some("Main Reactor Hall"), None), RiskLevel::High);
        assert_eq!(level(Some("CHEMICAL_WORK"), Some("reactor room"), None), RiskLevel::High);
    }

    #[test]
    fn test_medium_location_does_not_lift_medium_to_high() {
        assert_eq!(
            level(Some("ELECTRICAL_WORK"), Some("basement"), None),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_medium_location_never_lowers_high() {
        assert_eq!(level(Some("HOT_WORK"), Some("workshop"), None), RiskLevel::High);
    }

    #[test]
    fn test_toxic_description_forces_high() {
        assert_eq!(
            level(Some("GENERAL_WORK"), None, Some("toxic fumes present")),
            RiskLevel::High
        );
    }

    #[test]
    fn test_medium_keyword_lifts_low_only() {
        assert_eq!(
            level(Some("GENERAL_WORK"), None, Some("Overhead work on conveyor")),
            RiskLevel::Medium
        );
        assert_eq!(
            level(Some("ELECTRICAL_WORK"), None, Some("electrical panel swap")),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_stage_trace_records_each_step() {
        let assessment = classify(&RiskInput {
            permit_type: Some("GENERAL_WORK"),
            work_location: Some("basement"),
            description: Some("flammable solvent cleanup"),
        });
        assert_eq!(
            assessment.stages,
            StageLevels {
                base: RiskLevel::Low,
                location: RiskLevel::Medium,
                description: RiskLevel::High,
            }
        );
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_blank_location_is_no_information() {
        let assessment = classify(&RiskInput {
            permit_type: Some("GENERAL_WORK"),
            work_location: Some("  "),
            description: None,
        });
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.report.contains("Work Location: Not specified"));
    }

    #[test]
    fn test_for_permit_matches_raw_input() {
        let typed = classify(&RiskInput::for_permit(
            PermitType::ChemicalWork,
            "reactor room",
            "catalyst change",
        ));
        let raw = classify(&RiskInput {
            permit_type: Some("CHEMICAL_WORK"),
            work_location: Some("reactor room"),
            description: Some("catalyst change"),
        });
        assert_eq!(typed, raw);
    }
}
