//! Read-side types: list filters, pagination and summary counts.

use serde::{Deserialize, Serialize};

use ptw_core::{PermitType, PrincipalId, RiskLevel};
use ptw_state::{Permit, PermitStatus};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size honoured.
pub const MAX_PAGE_SIZE: usize = 100;

/// Criteria for listing permits. Unset fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermitFilter {
    pub status: Option<PermitStatus>,
    pub risk_level: Option<RiskLevel>,
    pub permit_type: Option<PermitType>,
    pub applicant_id: Option<PrincipalId>,
    /// Case-insensitive substring over title, description and location.
    pub query: Option<String>,
}

impl PermitFilter {
    pub fn matches(&self, permit: &Permit) -> bool {
        if self.status.is_some_and(|s| s != permit.status()) {
            return false;
        }
        if self.risk_level.is_some_and(|r| r != permit.risk_level) {
            return false;
        }
        if self.permit_type.is_some_and(|t| t != permit.permit_type) {
            return false;
        }
        if self.applicant_id.is_some_and(|a| a != permit.applicant_id) {
            return false;
        }
        match self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                [&permit.title, &permit.description, &permit.work_location]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            }
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Page `page` of `size` items, with `size` clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    /// Matches across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice `all` (already ordered) according to `request`.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.page.saturating_mul(request.size))
            .take(request.size)
            .collect();
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }
}

/// Counts over the permits visible to a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitStats {
    pub total: usize,
    pub draft: usize,
    pub submitted: usize,
    pub approved: usize,
    pub rejected: usize,
    pub low_risk: usize,
    pub medium_risk: usize,
    pub high_risk: usize,
}

impl PermitStats {
    pub fn tally<'a>(permits: impl IntoIterator<Item = &'a Permit>) -> Self {
        let mut stats = Self::default();
        for permit in permits {
            stats.total += 1;
            match permit.status() {
                PermitStatus::Draft => stats.draft += 1,
                PermitStatus::Submitted => stats.submitted += 1,
                PermitStatus::Approved => stats.approved += 1,
                PermitStatus::Rejected => stats.rejected += 1,
            }
            match permit.risk_level {
                RiskLevel::Low => stats.low_risk += 1,
                RiskLevel::Medium => stats.medium_risk += 1,
                RiskLevel::High => stats.high_risk += 1,
            }
        }
        stats
    }
}
