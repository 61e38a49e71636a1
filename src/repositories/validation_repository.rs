use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::entities::{
    production_report::{self, Entity as ProductionReport, Model as ReportModel},
    validation_record::{self, Column, Entity as ValidationRecord, Model as ValidationModel},
    StringList,
};
use crate::errors::AppError;
use crate::models::{Actor, Decision, ReportStatus};
use crate::repositories::Repository;

use super::BaseRepository;

/// History filters; combine with AND
#[derive(Debug, Clone, Default)]
pub struct ValidationFilter {
    pub decision: Option<Decision>,
    /// Current status of the validated report
    pub report_status: Option<ReportStatus>,
    pub validator_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ValidationFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(decision) = self.decision {
            condition = condition.add(Column::Decision.eq(decision));
        }
        if let Some(status) = self.report_status {
            condition = condition.add(production_report::Column::Status.eq(status));
        }
        if let Some(validator_id) = self.validator_id {
            condition = condition.add(Column::ValidatorId.eq(validator_id));
        }
        if let Some(from) = self.date_from {
            condition = condition.add(Column::DecidedAt.gte(start_of_day(from)));
        }
        if let Some(to) = self.date_to {
            condition = condition.add(Column::DecidedAt.lt(start_of_next_day(to)));
        }

        condition
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn start_of_next_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date.succ_opt().unwrap_or(date))
}

/// The decision to persist for a report
#[derive(Debug, Clone)]
pub struct DecisionWrite {
    pub report_id: Uuid,
    pub decision: Decision,
    pub note: String,
    pub revision_items: Vec<String>,
    pub actor: Actor,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ValidationRepository {
    base: BaseRepository,
}

impl ValidationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_report(
        &self,
        report_id: Uuid,
    ) -> Result<Option<ValidationModel>, AppError> {
        ValidationRecord::find()
            .filter(Column::ReportId.eq(report_id))
            .one(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Inserts the report's record or overwrites the existing one
    pub async fn upsert<C: ConnectionTrait>(
        conn: &C,
        write: DecisionWrite,
    ) -> Result<ValidationModel, AppError> {
        let existing = ValidationRecord::find()
            .filter(Column::ReportId.eq(write.report_id))
            .one(conn)
            .await?;

        let is_new = existing.is_none();
        let mut active = match existing {
            Some(record) => record.into_active_model(),
            None => validation_record::ActiveModel {
                report_id: Set(write.report_id),
                ..Default::default()
            },
        };

        active.validator_id = Set(write.actor.id);
        active.validator_name = Set(write.actor.name.clone());
        active.decision = Set(write.decision);
        active.note = Set(write.note.clone());
        active.revision_items = Set(StringList(write.revision_items.clone()));
        active.decided_at = Set(write.decided_at);

        let result = if is_new {
            active.insert(conn).await
        } else {
            active.update(conn).await
        };

        result.map_err(|e| {
            error!(error = %e, report_id = %write.report_id, "Failed to write validation record");
            AppError::DatabaseError(e)
        })
    }

    /// Records across reports, newest decision first, each with its report
    pub async fn history(
        &self,
        filter: &ValidationFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<(ValidationModel, Option<ReportModel>)>, u64), AppError> {
        let paginator = ValidationRecord::find()
            .find_also_related(ProductionReport)
            .filter(filter.condition())
            .order_by_desc(Column::DecidedAt)
            .paginate(self.base.get_db(), per_page.max(1));

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((rows, total))
    }

    /// Decision counts for records decided inside `[from, to]`
    pub async fn decision_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(Decision, i64)>, AppError> {
        let rows: Vec<(Decision, i64)> = ValidationRecord::find()
            .select_only()
            .column(Column::Decision)
            .column_as(Expr::col(Column::Id).count(), "count")
            .filter(Column::DecidedAt.gte(start_of_day(from)))
            .filter(Column::DecidedAt.lt(start_of_next_day(to)))
            .group_by(Column::Decision)
            .into_tuple()
            .all(self.base.get_db())
            .await?;
        Ok(rows)
    }
}
