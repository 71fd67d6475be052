//! # Permit Vocabulary: Permit Types and Risk Levels
//!
//! The two closed vocabularies every permit carries. Both are exhaustive
//! enums: adding a permit type forces the classifier's base-risk table and
//! every other `match` to handle it at compile time.
//!
//! Wire format is SCREAMING_SNAKE_CASE (`HOT_WORK`, `HIGH`). Parsing is
//! case-insensitive so that `hot_work` from a form field is accepted.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PermitError;

/// Category of hazardous work a permit authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermitType {
    /// Welding, cutting, grinding or any open flame.
    HotWork,
    /// Entry into tanks, vessels, pits or other enclosed spaces.
    ConfinedSpace,
    /// Work above ground level requiring fall protection.
    HeightWork,
    /// Work on or near energized electrical equipment.
    ElectricalWork,
    /// Handling, transfer or exposure to process chemicals.
    ChemicalWork,
    /// Routine maintenance with no specific hazard category.
    GeneralWork,
}

impl PermitType {
    /// All permit types in canonical order.
    pub fn all() -> &'static [PermitType] {
        &[
            Self::HotWork,
            Self::ConfinedSpace,
            Self::HeightWork,
            Self::ElectricalWork,
            Self::ChemicalWork,
            Self::GeneralWork,
        ]
    }

    /// The wire identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotWork => "HOT_WORK",
            Self::ConfinedSpace => "CONFINED_SPACE",
            Self::HeightWork => "HEIGHT_WORK",
            Self::ElectricalWork => "ELECTRICAL_WORK",
            Self::ChemicalWork => "CHEMICAL_WORK",
            Self::GeneralWork => "GENERAL_WORK",
        }
    }
}

impl std::fmt::Display for PermitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermitType {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                PermitError::validation("permit_type", format!("unknown permit type: {s:?}"))
            })
    }
}

/// Risk level assigned by the classifier.
///
/// Ordered `Low < Medium < High` so escalation is `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Basic safety measures suffice.
    Low,
    /// Standard safety measures and equipment checks.
    Medium,
    /// Strict protocols, supervisor briefing and emergency procedures.
    High,
}

impl RiskLevel {
    /// All risk levels, lowest first.
    pub fn all() -> &'static [RiskLevel] {
        &[Self::Low, Self::Medium, Self::High]
    }

    /// The wire identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Raise to at least `floor`. Never lowers.
    pub fn at_least(self, floor: RiskLevel) -> RiskLevel {
        self.max(floor)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = PermitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(PermitError::validation(
                "risk_level",
                format!("unknown risk level: {s:?}"),
            )),
        }
    }
}
