//! Permit persistence.
//!
//! The workflow is stored as flat nullable columns and rebuilt into its
//! variant on load. `update` is conditional on the previous revision, so a
//! row that has moved on is never overwritten.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ptw_core::{PermitId, PermitNumber, PermitType, PrincipalId, RiskLevel, StorageError, Timestamp};
use ptw_state::{Permit, PermitStatus, Workflow};

const COLUMNS: &str = "id, permit_number, permit_type, title, description, work_location, \
     start_date, end_date, risk_level, risk_report, safety_measures, required_ppe, status, \
     applicant_id, submitted_at, approver_id, approved_at, rejector_id, rejected_at, \
     rejection_reason, created_at, updated_at, revision";

/// Insert a newly created permit.
pub async fn insert(pool: &PgPool, permit: &Permit) -> Result<(), sqlx::Error> {
    let row = PermitRow::from_record(permit);
    sqlx::query(&format!(
        "INSERT INTO permits ({COLUMNS}) VALUES \
         ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)"
    ))
    .bind(row.id)
    .bind(row.permit_number)
    .bind(row.permit_type)
    .bind(row.title)
    .bind(row.description)
    .bind(row.work_location)
    .bind(row.start_date)
    .bind(row.end_date)
    .bind(row.risk_level)
    .bind(row.risk_report)
    .bind(row.safety_measures)
    .bind(row.required_ppe)
    .bind(row.status)
    .bind(row.applicant_id)
    .bind(row.submitted_at)
    .bind(row.approver_id)
    .bind(row.approved_at)
    .bind(row.rejector_id)
    .bind(row.rejected_at)
    .bind(row.rejection_reason)
    .bind(row.created_at)
    .bind(row.updated_at)
    .bind(row.revision)
    .execute(pool)
    .await?;
    Ok(())
}

/// Write the mutable columns of `permit`, provided the stored row is still
/// at `previous_revision`. Returns whether a row was updated.
pub async fn update(pool: &PgPool, permit: &Permit, previous_revision: u64) -> Result<bool, sqlx::Error> {
    let row = PermitRow::from_record(permit);
    let result = sqlx::query(
        "UPDATE permits SET status = $1, safety_measures = $2, required_ppe = $3, \
         submitted_at = $4, approver_id = $5, approved_at = $6, rejector_id = $7, \
         rejected_at = $8, rejection_reason = $9, updated_at = $10, revision = $11 \
         WHERE id = $12 AND revision = $13",
    )
    .bind(row.status)
    .bind(row.safety_measures)
    .bind(row.required_ppe)
    .bind(row.submitted_at)
    .bind(row.approver_id)
    .bind(row.approved_at)
    .bind(row.rejector_id)
    .bind(row.rejected_at)
    .bind(row.rejection_reason)
    .bind(row.updated_at)
    .bind(row.revision)
    .bind(row.id)
    .bind(revision_column(previous_revision))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load every permit for the start-up restore.
///
/// # Errors
///
/// A row that cannot be rebuilt fails the whole load with a decode error;
/// the service must not start with permits silently missing.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Permit>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PermitRow>(&format!(
        "SELECT {COLUMNS} FROM permits ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| row.into_record().map_err(|e| sqlx::Error::Decode(Box::new(e))))
        .collect()
}

fn revision_column(revision: u64) -> i64 {
    i64::try_from(revision).unwrap_or(i64::MAX)
}

/// Internal row type for SQLx mapping.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PermitRow {
    id: Uuid,
    permit_number: String,
    permit_type: String,
    title: String,
    description: String,
    work_location: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    risk_level: String,
    risk_report: String,
    safety_measures: Option<String>,
    required_ppe: Option<String>,
    status: String,
    applicant_id: Uuid,
    submitted_at: Option<DateTime<Utc>>,
    approver_id: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    rejector_id: Option<Uuid>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    revision: i64,
}

impl PermitRow {
    fn from_record(permit: &Permit) -> Self {
        Self {
            id: permit.id.0,
            permit_number: permit.permit_number.as_str().to_string(),
            permit_type: permit.permit_type.as_str().to_string(),
            title: permit.title.clone(),
            description: permit.description.clone(),
            work_location: permit.work_location.clone(),
            start_date: *permit.start_date.as_datetime(),
            end_date: *permit.end_date.as_datetime(),
            risk_level: permit.risk_level.as_str().to_string(),
            risk_report: permit.risk_report.clone(),
            safety_measures: permit.safety_measures.clone(),
            required_ppe: permit.required_ppe.clone(),
            status: permit.status().as_str().to_string(),
            applicant_id: permit.applicant_id.0,
            submitted_at: permit.submitted_at().map(|t| *t.as_datetime()),
            approver_id: permit.approver_id().map(|p| p.0),
            approved_at: permit.approved_at().map(|t| *t.as_datetime()),
            rejector_id: permit.rejector_id().map(|p| p.0),
            rejected_at: permit.rejected_at().map(|t| *t.as_datetime()),
            rejection_reason: permit.rejection_reason().map(str::to_string),
            created_at: *permit.created_at.as_datetime(),
            updated_at: *permit.updated_at.as_datetime(),
            revision: revision_column(permit.revision),
        }
    }

    fn into_record(self) -> Result<Permit, StorageError> {
        let corrupt = |reason: String| StorageError::Corrupt {
            id: self.id.to_string(),
            reason,
        };

        let status: PermitStatus = self.status.parse().map_err(|e| corrupt(format!("{e}")))?;
        let permit_type: PermitType = self.permit_type.parse().map_err(|e| corrupt(format!("{e}")))?;
        let risk_level: RiskLevel = self.risk_level.parse().map_err(|e| corrupt(format!("{e}")))?;
        let permit_number = PermitNumber::parse(&self.permit_number).map_err(|e| corrupt(format!("{e}")))?;
        let revision = u64::try_from(self.revision).map_err(|e| corrupt(format!("revision: {e}")))?;

        let stamp = |value: Option<DateTime<Utc>>, column: &str| {
            value
                .map(Timestamp::from_utc)
                .ok_or_else(|| corrupt(format!("{status} permit has no {column}")))
        };
        let actor = |value: Option<Uuid>, column: &str| {
            value
                .map(PrincipalId)
                .ok_or_else(|| corrupt(format!("{status} permit has no {column}")))
        };

        let workflow = match status {
            PermitStatus::Draft => Workflow::Draft,
            PermitStatus::Submitted => Workflow::Submitted {
                submitted_at: stamp(self.submitted_at, "submitted_at")?,
            },
            PermitStatus::Approved => Workflow::Approved {
                submitted_at: stamp(self.submitted_at, "submitted_at")?,
                approver_id: actor(self.approver_id, "approver_id")?,
                approved_at: stamp(self.approved_at, "approved_at")?,
            },
            PermitStatus::Rejected => Workflow::Rejected {
                submitted_at: stamp(self.submitted_at, "submitted_at")?,
                rejector_id: actor(self.rejector_id, "rejector_id")?,
                rejected_at: stamp(self.rejected_at, "rejected_at")?,
                rejection_reason: self
                    .rejection_reason
                    .clone()
                    .ok_or_else(|| corrupt("REJECTED permit has no rejection_reason".into()))?,
            },
        };

        Ok(Permit {
            id: PermitId(self.id),
            permit_number,
            permit_type,
            title: self.title,
            description: self.description,
            work_location: self.work_location,
            start_date: Timestamp::from_utc(self.start_date),
            end_date: Timestamp::from_utc(self.end_date),
            risk_level,
            risk_report: self.risk_report,
            safety_measures: self.safety_measures,
            required_ppe: self.required_ppe,
            applicant_id: PrincipalId(self.applicant_id),
            workflow,
            created_at: Timestamp::from_utc(self.created_at),
            updated_at: Timestamp::from_utc(self.updated_at),
            revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptw_core::{Principal, Role};
    use ptw_state::PermitAttributes;

    fn draft() -> Permit {
        let start = Timestamp::parse("2026-10-20T08:00:00Z").unwrap();
        Permit::draft(
            PermitId::new(),
            PermitNumber::parse("PTW-20261019-000007").unwrap(),
            PrincipalId::new(),
            PermitAttributes {
                permit_type: PermitType::HotWork,
                title: "Weld bracket".into(),
                description: "Weld a support bracket".into(),
                work_location: "bay 3".into(),
                start_date: start,
                end_date: start.plus_hours(2),
                safety_measures: Some("Fire watch".into()),
                required_ppe: None,
            },
            RiskLevel::High,
            "Risk Level: HIGH".into(),
            start,
        )
    }

    fn decided(approve: bool) -> Permit {
        let mut permit = draft();
        let now = permit.created_at.plus_hours(1);
        permit.submit(now).unwrap();
        let reviewer = Principal::new(PrincipalId::new(), Role::Supervisor);
        if approve {
            permit.approve(&reviewer, now).unwrap();
        } else {
            permit.reject(&reviewer, "dates overlap a shutdown", now).unwrap();
        }
        permit.revision = 2;
        permit
    }

    #[test]
    fn test_row_restores_each_status() {
        for permit in [draft(), decided(true), decided(false)] {
            let row = PermitRow::from_record(&permit);
            assert_eq!(row.into_record().unwrap(), permit);
        }
    }

    #[test]
    fn test_approved_row_without_approver_is_corrupt() {
        let mut row = PermitRow::from_record(&decided(true));
        row.approver_id = None;
        match row.into_record().unwrap_err() {
            StorageError::Corrupt { reason, .. } => assert!(reason.contains("approver_id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejected_row_without_reason_is_corrupt() {
        let mut row = PermitRow::from_record(&decided(false));
        row.rejection_reason = None;
        assert!(matches!(row.into_record(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let mut row = PermitRow::from_record(&draft());
        row.status = "ARCHIVED".into();
        assert!(matches!(row.into_record(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_negative_revision_is_corrupt() {
        let mut row = PermitRow::from_record(&draft());
        row.revision = -1;
        assert!(matches!(row.into_record(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_revision_column_saturates() {
        assert_eq!(revision_column(3), 3);
        assert_eq!(revision_column(u64::MAX), i64::MAX);
    }
}
