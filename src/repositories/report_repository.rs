use chrono::NaiveDate;
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::entities::{
    detail_cutting::{self, Entity as DetailCutting},
    production_report::{self, Column, Entity as ProductionReport, Model as ReportModel},
    validation_record::{self, Entity as ValidationRecord},
};
use crate::errors::AppError;
use crate::models::{ReportFacts, ReportStatus};
use crate::repositories::Repository;
use crate::services::master_data::MasterDataKind;

use super::BaseRepository;

/// Listing filters; every field is optional and they combine with AND
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub operator_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Matches order, batch or report number
    pub search: Option<String>,
}

impl ReportFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();

        if let Some(status) = self.status {
            condition = condition.add(Column::Status.eq(status));
        }
        if let Some(id) = self.operator_id {
            condition = condition.add(Column::OperatorId.eq(id));
        }
        if let Some(id) = self.machine_id {
            condition = condition.add(Column::MachineId.eq(id));
        }
        if let Some(id) = self.shift_id {
            condition = condition.add(Column::ShiftId.eq(id));
        }
        if let Some(id) = self.customer_id {
            condition = condition.add(Column::CustomerId.eq(id));
        }
        if let Some(from) = self.date_from {
            condition = condition.add(Column::ProductionDate.gte(from));
        }
        if let Some(to) = self.date_to {
            condition = condition.add(Column::ProductionDate.lte(to));
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(Column::OrderNumber.contains(term))
                    .add(Column::BatchNumber.contains(term))
                    .add(Column::ReportNumber.contains(term)),
            );
        }

        condition
    }
}

/// A detail row to be written for a report
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetail {
    pub piece_name: String,
    pub size_label: String,
    pub piece_count: i32,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub waste_percentage: Option<f64>,
}

/// Repository for production reports and their detail rows
#[derive(Debug, Clone)]
pub struct ReportRepository {
    base: BaseRepository,
}

impl ReportRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReportModel>, AppError> {
        Self::find_by_id_on(self.base.get_db(), id).await
    }

    /// Same as [`find_by_id`](Self::find_by_id) on an explicit connection or transaction
    pub async fn find_by_id_on<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Option<ReportModel>, AppError> {
        ProductionReport::find_by_id(id)
            .one(conn)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn find_details(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<detail_cutting::Model>, AppError> {
        DetailCutting::find()
            .filter(detail_cutting::Column::ReportId.eq(report_id))
            .order_by_asc(detail_cutting::Column::CreatedAt)
            .all(self.base.get_db())
            .await
            .map_err(AppError::DatabaseError)
    }

    /// Newest production date first, then newest created
    pub async fn find_all(
        &self,
        filter: &ReportFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ReportModel>, u64), AppError> {
        let paginator = ProductionReport::find()
            .filter(filter.condition())
            .order_by_desc(Column::ProductionDate)
            .order_by_desc(Column::CreatedAt)
            .paginate(self.base.get_db(), per_page.max(1));

        let total = paginator.num_items().await?;
        let reports = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((reports, total))
    }

    /// Submitted reports waiting on a supervisor, oldest submission first
    pub async fn find_pending(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ReportModel>, u64), AppError> {
        let paginator = ProductionReport::find()
            .filter(Column::Status.eq(ReportStatus::Submitted))
            .order_by_asc(Column::SubmittedAt)
            .order_by_asc(Column::CreatedAt)
            .paginate(self.base.get_db(), per_page.max(1));

        let total = paginator.num_items().await?;
        let reports = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((reports, total))
    }

    /// Next `CUT-YYYYMMDD-NNNN` number for the production date.
    ///
    /// Reads the highest existing suffix, so numbers freed by deleted drafts
    /// are not reused while a later number still exists.
    pub async fn next_report_number<C: ConnectionTrait>(
        conn: &C,
        production_date: NaiveDate,
    ) -> Result<String, AppError> {
        let prefix = format!("CUT-{}-", production_date.format("%Y%m%d"));

        let latest: Option<String> = ProductionReport::find()
            .select_only()
            .column(Column::ReportNumber)
            .filter(Column::ReportNumber.starts_with(&prefix))
            .order_by_desc(Column::ReportNumber)
            .into_tuple()
            .one(conn)
            .await?;

        let next = latest
            .as_deref()
            .and_then(|number| number.strip_prefix(&prefix))
            .and_then(|suffix| suffix.parse::<u32>().ok())
            .unwrap_or(0)
            + 1;

        Ok(format!("{}{:04}", prefix, next))
    }

    /// True when `err` is a unique violation on the report number, which a
    /// concurrent create for the same production date can cause
    pub fn is_report_number_conflict(err: &AppError) -> bool {
        match err {
            AppError::DatabaseError(db_err) => matches!(
                db_err.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(message)) if message.contains("report_number")
            ),
            _ => false,
        }
    }

    /// Deletes every detail row of the report and inserts `details` in order
    pub async fn replace_details<C: ConnectionTrait>(
        conn: &C,
        report_id: Uuid,
        details: &[NewDetail],
    ) -> Result<Vec<detail_cutting::Model>, AppError> {
        DetailCutting::delete_many()
            .filter(detail_cutting::Column::ReportId.eq(report_id))
            .exec(conn)
            .await?;

        let mut inserted = Vec::with_capacity(details.len());
        for detail in details {
            let model = detail_cutting::ActiveModel {
                report_id: Set(report_id),
                piece_name: Set(detail.piece_name.clone()),
                size_label: Set(detail.size_label.clone()),
                piece_count: Set(detail.piece_count),
                length_cm: Set(detail.length_cm),
                width_cm: Set(detail.width_cm),
                waste_percentage: Set(detail.waste_percentage),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| {
                error!(error = %e, report_id = %report_id, "Failed to insert detail cutting row");
                AppError::DatabaseError(e)
            })?;
            inserted.push(model);
        }

        Ok(inserted)
    }

    /// Removes a report together with its details and validation record
    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<u64, AppError> {
        DetailCutting::delete_many()
            .filter(detail_cutting::Column::ReportId.eq(id))
            .exec(conn)
            .await?;
        ValidationRecord::delete_many()
            .filter(validation_record::Column::ReportId.eq(id))
            .exec(conn)
            .await?;

        let result = ProductionReport::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }

    /// Number of reports pointing at the given master-data row
    pub async fn count_referencing(&self, kind: MasterDataKind, id: Uuid) -> Result<u64, AppError> {
        let column = match kind {
            MasterDataKind::Machine => Column::MachineId,
            MasterDataKind::Shift => Column::ShiftId,
            MasterDataKind::ProductionLine => Column::ProductionLineId,
            MasterDataKind::Customer => Column::CustomerId,
            MasterDataKind::Pattern => Column::PatternId,
            MasterDataKind::FabricType => Column::FabricTypeId,
        };

        let count = ProductionReport::find()
            .filter(column.eq(id))
            .count(self.base.get_db())
            .await?;
        Ok(count)
    }

    /// Approved reports with a production date inside `[start, end]`
    pub async fn approved_facts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReportFacts>, AppError> {
        counter!("cutting_reports_db.analytics_window_loads", 1);

        ProductionReport::find()
            .select_only()
            .columns([
                Column::Id,
                Column::ProductionDate,
                Column::OperatorId,
                Column::OperatorName,
                Column::MachineId,
                Column::ShiftId,
                Column::CustomerId,
                Column::TargetQuantity,
                Column::ActualQuantity,
                Column::EfficiencyPercentage,
                Column::TotalYard,
                Column::DurationMinutes,
                Column::DefectCount,
                Column::DefectCategories,
                Column::QualityRating,
            ])
            .filter(Column::Status.eq(ReportStatus::Approved))
            .filter(Column::ProductionDate.between(start, end))
            .order_by_asc(Column::ProductionDate)
            .into_model::<ReportFacts>()
            .all(self.base.get_db())
            .await
            .map_err(|e| {
                error!(error = %e, %start, %end, "Failed to load analytics window");
                AppError::DatabaseError(e)
            })
    }

    /// Report count per status for production dates inside `[start, end]`
    pub async fn status_counts(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(ReportStatus, i64)>, AppError> {
        let rows: Vec<(ReportStatus, i64)> = ProductionReport::find()
            .select_only()
            .column(Column::Status)
            .column_as(Expr::col(Column::Id).count(), "count")
            .filter(Column::ProductionDate.between(start, end))
            .group_by(Column::Status)
            .into_tuple()
            .all(self.base.get_db())
            .await?;
        Ok(rows)
    }
}
