use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::validation_record;
use crate::errors::ServiceError;
use crate::models::{Actor, Decision};
use crate::repositories::{DecisionWrite, ReportRepository, ValidationFilter, ValidationRepository};
use crate::services::analytics::DateWindow;
use crate::services::derived_metrics::round2;
use crate::services::reports::ReportSummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ValidationRecordResponse {
    pub id: Uuid,
    pub report_id: Uuid,
    pub validator_id: Uuid,
    pub validator_name: String,
    pub decision: Decision,
    pub note: String,
    pub revision_items: Vec<String>,
    pub decided_at: DateTime<Utc>,
}

impl From<validation_record::Model> for ValidationRecordResponse {
    fn from(model: validation_record::Model) -> Self {
        Self {
            id: model.id,
            report_id: model.report_id,
            validator_id: model.validator_id,
            validator_name: model.validator_name,
            decision: model.decision,
            note: model.note,
            revision_items: model.revision_items.0,
            decided_at: model.decided_at,
        }
    }
}

/// One row of the supervisor audit list
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidationHistoryItem {
    #[serde(flatten)]
    pub record: ValidationRecordResponse,
    pub report: Option<ReportSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ValidationStats {
    pub window: Option<DateWindow>,
    pub approved: u64,
    pub rejected: u64,
    pub need_revision: u64,
    pub total: u64,
    pub approval_rate: f64,
}

impl ValidationStats {
    fn from_rows(window: DateWindow, rows: &[(Decision, i64)]) -> Self {
        let mut stats = ValidationStats {
            window: Some(window),
            ..Default::default()
        };
        for &(decision, count) in rows {
            let count = count.max(0) as u64;
            match decision {
                Decision::Approved => stats.approved += count,
                Decision::Rejected => stats.rejected += count,
                Decision::NeedRevision => stats.need_revision += count,
            }
            stats.total += count;
        }
        stats.approval_rate = round2(crate::services::analytics::stats::percent(
            stats.approved as f64,
            stats.total as f64,
        ));
        stats
    }
}

/// Keeps the single current decision of each report
#[derive(Clone)]
pub struct ValidationLedger {
    validations: ValidationRepository,
    reports: ReportRepository,
}

impl ValidationLedger {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            validations: ValidationRepository::new(db.clone()),
            reports: ReportRepository::new(db),
        }
    }

    /// Upserts the report's record on `conn`, which is normally the
    /// transaction that also moves the report's status
    pub async fn record_decision<C: ConnectionTrait>(
        conn: &C,
        report_id: Uuid,
        decision: Decision,
        note: &str,
        revision_items: Vec<String>,
        actor: &Actor,
        decided_at: DateTime<Utc>,
    ) -> Result<validation_record::Model, ServiceError> {
        let revision_items = if decision.accepts_revision_items() {
            revision_items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        let record = ValidationRepository::upsert(
            conn,
            DecisionWrite {
                report_id,
                decision,
                note: note.trim().to_string(),
                revision_items,
                actor: actor.clone(),
                decided_at,
            },
        )
        .await?;

        info!(
            report_id = %report_id,
            decision = %decision,
            validator_id = %actor.id,
            "Validation decision recorded"
        );
        Ok(record)
    }

    #[instrument(skip(self), fields(report_id = %report_id))]
    pub async fn current_decision(
        &self,
        report_id: Uuid,
    ) -> Result<Option<ValidationRecordResponse>, ServiceError> {
        Ok(self
            .validations
            .find_by_report(report_id)
            .await?
            .map(ValidationRecordResponse::from))
    }

    /// Audit list across reports, newest decision first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        filter: &ValidationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ValidationHistoryItem>, u64), ServiceError> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            DateWindow::new(from, to)?;
        }

        let (rows, total) = self.validations.history(filter, page, per_page).await?;
        let items = rows
            .into_iter()
            .map(|(record, report)| ValidationHistoryItem {
                record: record.into(),
                report: report.map(ReportSummary::from),
            })
            .collect();
        Ok((items, total))
    }

    /// Submitted reports waiting for a decision, oldest submission first
    #[instrument(skip(self))]
    pub async fn pending(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ReportSummary>, u64), ServiceError> {
        let (rows, total) = self.reports.find_pending(page, per_page).await?;
        Ok((rows.into_iter().map(ReportSummary::from).collect(), total))
    }

    #[instrument(skip(self), fields(start = %window.start, end = %window.end))]
    pub async fn stats(&self, window: DateWindow) -> Result<ValidationStats, ServiceError> {
        let rows = self
            .validations
            .decision_counts(window.start, window.end)
            .await?;
        Ok(ValidationStats::from_rows(window, &rows))
    }
}
