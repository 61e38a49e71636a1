//! Report lifecycle: creation, edits, supervisor decisions and deletion.
//!
//! Every write runs in one transaction together with its detail rows or its
//! validation record. Activity-log events are emitted only after commit and
//! never fail the write.

use chrono::{DateTime, NaiveDate, Utc};
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::db::{with_transaction, DbPool};
use crate::entities::{detail_cutting, production_report, StringList};
use crate::errors::ServiceError;
use crate::events::{ActivityAction, ActivityEntry, Event, EventSender};
use crate::models::{Actor, Decision, MachineCondition, QualityRating, ReportAction, ReportStatus};
use crate::repositories::{NewDetail, ReportFilter, ReportRepository, ValidationRepository};
use crate::services::derived_metrics::{round2, MetricsEngine, RawMeasurements};
use crate::services::master_data::{label_or_id, MasterDataKind, MasterDataLookup};
use crate::services::validations::{ValidationLedger, ValidationRecordResponse};

/// Order and batch numbers: letters, digits and `-_/.`
static REFERENCE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9\-_/\.]*$").unwrap());

const MAX_DEFECT_CATEGORIES: usize = 20;

/// Creates allowed per request when concurrent creates keep taking the
/// allocated report number
const REPORT_NUMBER_ATTEMPTS: u32 = 5;

/// Re-runs `create` while it fails only because its report number was taken
async fn retry_on_number_conflict<T, F, Fut>(mut create: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 1;
    loop {
        match create().await {
            Err(err)
                if attempt < REPORT_NUMBER_ATTEMPTS
                    && ReportRepository::is_report_number_conflict(&err) =>
            {
                warn!(attempt, "Report number taken by a concurrent create, allocating again");
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn validate_defect_categories(categories: &[String]) -> Result<(), ValidationError> {
    if categories.len() > MAX_DEFECT_CATEGORIES {
        let mut err = ValidationError::new("too_many");
        err.message = Some(Cow::from("at most 20 defect categories"));
        return Err(err);
    }
    if categories.iter().any(|c| c.trim().is_empty()) {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::from("defect categories must not be blank"));
        return Err(err);
    }
    Ok(())
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

/// One pattern-piece row of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct DetailInput {
    #[validate(length(min = 1, max = 100, message = "piece name is required"))]
    pub piece_name: String,
    #[validate(length(min = 1, max = 20, message = "size label is required"))]
    pub size_label: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub piece_count: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub length_cm: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub width_cm: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub waste_percentage: Option<f64>,
}

impl From<&DetailInput> for NewDetail {
    fn from(input: &DetailInput) -> Self {
        Self {
            piece_name: input.piece_name.trim().to_string(),
            size_label: input.size_label.trim().to_string(),
            piece_count: input.piece_count,
            length_cm: input.length_cm,
            width_cm: input.width_cm,
            waste_percentage: input.waste_percentage,
        }
    }
}

/// Operator-entered fields of a report, shared by create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportInput {
    #[validate(
        length(min = 1, max = 50, message = "order number is required"),
        regex(path = "REFERENCE_NUMBER", message = "invalid order number")
    )]
    pub order_number: String,
    #[validate(
        length(min = 1, max = 50, message = "batch number is required"),
        regex(path = "REFERENCE_NUMBER", message = "invalid batch number")
    )]
    pub batch_number: String,
    pub production_date: NaiveDate,
    pub machine_id: Uuid,
    pub shift_id: Uuid,
    pub production_line_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub pattern_id: Option<Uuid>,
    pub fabric_type_id: Option<Uuid>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub target_quantity: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub actual_quantity: i32,
    #[validate(range(min = 1, message = "at least one layer"))]
    pub layer_count: i32,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fabric_length_m: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub fabric_width_cm: f64,
    pub cutting_start: Option<DateTime<Utc>>,
    pub cutting_end: Option<DateTime<Utc>>,
    pub machine_condition: MachineCondition,
    pub quality_rating: QualityRating,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub defect_count: i32,
    #[serde(default)]
    #[validate(custom = "validate_defect_categories")]
    pub defect_categories: Vec<String>,
    #[validate(range(min = -50.0, max = 80.0, message = "must be between -50 and 80"))]
    pub temperature_c: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0, message = "must be between 0 and 100"))]
    pub humidity_pct: Option<f64>,
    #[validate(length(max = 2000))]
    pub operator_note: Option<String>,
    #[serde(default)]
    #[validate]
    pub details: Vec<DetailInput>,
}

impl ReportInput {
    /// Field rules plus the cutting window check
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let (Some(start), Some(end)) = (self.cutting_start, self.cutting_end) {
            if end < start {
                errors.add(
                    "cutting_end",
                    field_error("before_start", "cutting end must not be before cutting start"),
                );
            }
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn raw_measurements(&self) -> RawMeasurements {
        RawMeasurements {
            target_quantity: self.target_quantity,
            actual_quantity: self.actual_quantity,
            fabric_length_m: self.fabric_length_m,
            fabric_width_cm: self.fabric_width_cm,
            cutting_start: self.cutting_start,
            cutting_end: self.cutting_end,
        }
    }

    fn new_details(&self) -> Vec<NewDetail> {
        self.details.iter().map(NewDetail::from).collect()
    }

    /// Writes every input column and recomputes the derived figures
    fn apply_to(&self, active: &mut production_report::ActiveModel) {
        let derived = MetricsEngine::compute(&self.raw_measurements());

        active.order_number = Set(self.order_number.trim().to_string());
        active.batch_number = Set(self.batch_number.trim().to_string());
        active.production_date = Set(self.production_date);
        active.machine_id = Set(self.machine_id);
        active.shift_id = Set(self.shift_id);
        active.production_line_id = Set(self.production_line_id);
        active.customer_id = Set(self.customer_id);
        active.pattern_id = Set(self.pattern_id);
        active.fabric_type_id = Set(self.fabric_type_id);
        active.target_quantity = Set(self.target_quantity);
        active.actual_quantity = Set(self.actual_quantity);
        active.layer_count = Set(self.layer_count);
        active.fabric_length_m = Set(self.fabric_length_m);
        active.fabric_width_cm = Set(self.fabric_width_cm);
        active.cutting_start = Set(self.cutting_start);
        active.cutting_end = Set(self.cutting_end);
        active.machine_condition = Set(self.machine_condition);
        active.quality_rating = Set(self.quality_rating);
        active.defect_count = Set(self.defect_count);
        active.defect_categories = Set(StringList(
            self.defect_categories
                .iter()
                .map(|c| c.trim().to_string())
                .collect(),
        ));
        active.temperature_c = Set(self.temperature_c);
        active.humidity_pct = Set(self.humidity_pct);
        active.operator_note = Set(self
            .operator_note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string));
        active.total_yard = Set(derived.total_yard);
        active.duration_minutes = Set(derived.duration_minutes);
        active.efficiency_percentage = Set(derived.efficiency_percentage);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    #[serde(flatten)]
    pub input: ReportInput,
    /// Store the report as submitted instead of draft
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportRequest {
    #[serde(flatten)]
    pub input: ReportInput,
    /// When present, the update is refused unless it matches the stored version
    pub expected_version: Option<i32>,
}

/// Supervisor input for approve, reject and request-revision
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub note: String,
    /// Only kept when requesting a revision
    #[serde(default)]
    pub revision_items: Vec<String>,
}

/// List row; figures rounded for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    pub id: Uuid,
    pub report_number: String,
    pub order_number: String,
    pub batch_number: String,
    pub production_date: NaiveDate,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub machine_id: Uuid,
    pub shift_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub target_quantity: i32,
    pub actual_quantity: i32,
    pub total_yard: f64,
    pub duration_minutes: Option<i32>,
    pub efficiency_percentage: f64,
    pub quality_rating: QualityRating,
    pub status: ReportStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReportSummary {
    pub fn from_model(model: &production_report::Model) -> Self {
        Self {
            id: model.id,
            report_number: model.report_number.clone(),
            order_number: model.order_number.clone(),
            batch_number: model.batch_number.clone(),
            production_date: model.production_date,
            operator_id: model.operator_id,
            operator_name: model.operator_name.clone(),
            machine_id: model.machine_id,
            shift_id: model.shift_id,
            customer_id: model.customer_id,
            target_quantity: model.target_quantity,
            actual_quantity: model.actual_quantity,
            total_yard: round2(model.total_yard),
            duration_minutes: model.duration_minutes,
            efficiency_percentage: round2(model.efficiency_percentage),
            quality_rating: model.quality_rating,
            status: model.status,
            submitted_at: model.submitted_at,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<production_report::Model> for ReportSummary {
    fn from(model: production_report::Model) -> Self {
        Self::from_model(&model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetailResponse {
    pub id: Uuid,
    pub piece_name: String,
    pub size_label: String,
    pub piece_count: i32,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub waste_percentage: Option<f64>,
}

impl From<detail_cutting::Model> for DetailResponse {
    fn from(model: detail_cutting::Model) -> Self {
        Self {
            id: model.id,
            piece_name: model.piece_name,
            size_label: model.size_label,
            piece_count: model.piece_count,
            length_cm: model.length_cm,
            width_cm: model.width_cm,
            waste_percentage: model.waste_percentage,
        }
    }
}

/// Display labels of the master data a report points at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReferenceLabels {
    pub machine: String,
    pub shift: String,
    pub production_line: Option<String>,
    pub customer: Option<String>,
    pub pattern: Option<String>,
    pub fabric_type: Option<String>,
}

/// Full report with its details and current validation decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportResponse {
    pub id: Uuid,
    pub report_number: String,
    pub order_number: String,
    pub batch_number: String,
    pub production_date: NaiveDate,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub machine_id: Uuid,
    pub shift_id: Uuid,
    pub production_line_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub pattern_id: Option<Uuid>,
    pub fabric_type_id: Option<Uuid>,
    pub labels: ReferenceLabels,
    pub target_quantity: i32,
    pub actual_quantity: i32,
    pub layer_count: i32,
    pub fabric_length_m: f64,
    pub fabric_width_cm: f64,
    pub cutting_start: Option<DateTime<Utc>>,
    pub cutting_end: Option<DateTime<Utc>>,
    pub machine_condition: MachineCondition,
    pub quality_rating: QualityRating,
    pub defect_count: i32,
    pub defect_categories: Vec<String>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub operator_note: Option<String>,
    pub total_yard: f64,
    pub duration_minutes: Option<i32>,
    pub efficiency_percentage: f64,
    pub status: ReportStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: Vec<DetailResponse>,
    pub validation: Option<ValidationRecordResponse>,
}

impl ReportResponse {
    fn assemble(
        model: production_report::Model,
        labels: ReferenceLabels,
        details: Vec<detail_cutting::Model>,
        validation: Option<ValidationRecordResponse>,
    ) -> Self {
        Self {
            id: model.id,
            report_number: model.report_number,
            order_number: model.order_number,
            batch_number: model.batch_number,
            production_date: model.production_date,
            operator_id: model.operator_id,
            operator_name: model.operator_name,
            machine_id: model.machine_id,
            shift_id: model.shift_id,
            production_line_id: model.production_line_id,
            customer_id: model.customer_id,
            pattern_id: model.pattern_id,
            fabric_type_id: model.fabric_type_id,
            labels,
            target_quantity: model.target_quantity,
            actual_quantity: model.actual_quantity,
            layer_count: model.layer_count,
            fabric_length_m: model.fabric_length_m,
            fabric_width_cm: model.fabric_width_cm,
            cutting_start: model.cutting_start,
            cutting_end: model.cutting_end,
            machine_condition: model.machine_condition,
            quality_rating: model.quality_rating,
            defect_count: model.defect_count,
            defect_categories: model.defect_categories.0,
            temperature_c: model.temperature_c,
            humidity_pct: model.humidity_pct,
            operator_note: model.operator_note,
            total_yard: round2(model.total_yard),
            duration_minutes: model.duration_minutes,
            efficiency_percentage: round2(model.efficiency_percentage),
            status: model.status,
            submitted_at: model.submitted_at,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            details: details.into_iter().map(DetailResponse::from).collect(),
            validation,
        }
    }
}

fn transition_error(err: crate::models::TransitionError) -> ServiceError {
    ServiceError::PreconditionFailed(err.to_string())
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("Report {} not found", id))
}

fn activity_action(decision: Decision) -> ActivityAction {
    match decision {
        Decision::Approved => ActivityAction::Approved,
        Decision::Rejected => ActivityAction::Rejected,
        Decision::NeedRevision => ActivityAction::RevisionRequested,
    }
}

/// Service for the report lifecycle
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
    reports: ReportRepository,
    validations: ValidationRepository,
    event_sender: Option<Arc<EventSender>>,
    master_data: Arc<dyn MasterDataLookup>,
}

impl ReportService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        master_data: Arc<dyn MasterDataLookup>,
    ) -> Self {
        Self {
            reports: ReportRepository::new(db.clone()),
            validations: ValidationRepository::new(db.clone()),
            db,
            event_sender,
            master_data,
        }
    }

    fn emit(&self, entry: ActivityEntry) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(Event::Activity(entry));
        }
    }

    fn label(&self, kind: MasterDataKind, id: Uuid) -> String {
        label_or_id(&self.master_data.labels(kind, &[id]), id)
    }

    fn labels_for(&self, model: &production_report::Model) -> ReferenceLabels {
        ReferenceLabels {
            machine: self.label(MasterDataKind::Machine, model.machine_id),
            shift: self.label(MasterDataKind::Shift, model.shift_id),
            production_line: model
                .production_line_id
                .map(|id| self.label(MasterDataKind::ProductionLine, id)),
            customer: model
                .customer_id
                .map(|id| self.label(MasterDataKind::Customer, id)),
            pattern: model
                .pattern_id
                .map(|id| self.label(MasterDataKind::Pattern, id)),
            fabric_type: model
                .fabric_type_id
                .map(|id| self.label(MasterDataKind::FabricType, id)),
        }
    }

    fn respond(
        &self,
        model: production_report::Model,
        details: Vec<detail_cutting::Model>,
        validation: Option<ValidationRecordResponse>,
    ) -> ReportResponse {
        let labels = self.labels_for(&model);
        ReportResponse::assemble(model, labels, details, validation)
    }

    /// Creates a report owned by `actor`, as draft or directly submitted
    #[instrument(skip(self, input), fields(order_number = %input.order_number))]
    pub async fn create(
        &self,
        input: ReportInput,
        submit: bool,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        input.validate_all()?;

        let (report, details) = retry_on_number_conflict(|| {
            let db = self.db.clone();
            let input = input.clone();
            let operator = actor.clone();
            async move {
                with_transaction(&db, "report.create", move |txn| {
                    Box::pin(async move {
                        let report_number =
                            ReportRepository::next_report_number(txn, input.production_date)
                                .await?;
                        let now = Utc::now();

                        let mut active = production_report::ActiveModel {
                            report_number: Set(report_number),
                            operator_id: Set(operator.id),
                            operator_name: Set(operator.name.clone()),
                            status: Set(if submit {
                                ReportStatus::Submitted
                            } else {
                                ReportStatus::Draft
                            }),
                            submitted_at: Set(submit.then_some(now)),
                            ..Default::default()
                        };
                        input.apply_to(&mut active);

                        let report = active.insert(txn).await.map_err(|e| {
                            error!(error = %e, "Failed to insert production report");
                            ServiceError::DatabaseError(e)
                        })?;
                        let details = ReportRepository::replace_details(
                            txn,
                            report.id,
                            &input.new_details(),
                        )
                        .await?;
                        Ok((report, details))
                    })
                })
                .await
            }
        })
        .await?;

        counter!("cutting_reports.reports_created", 1, "status" => report.status.to_string());
        info!(
            report_id = %report.id,
            report_number = %report.report_number,
            status = %report.status,
            "Production report created"
        );

        self.emit(
            ActivityEntry::new(report.id, &report.report_number, ActivityAction::Created, actor)
                .with_after(&report),
        );
        if submit {
            self.emit(
                ActivityEntry::new(report.id, &report.report_number, ActivityAction::Submitted, actor)
                    .with_after(&report),
            );
        }

        Ok(self.respond(report, details, None))
    }

    /// Report with its details and current validation decision
    #[instrument(skip(self), fields(report_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<ReportResponse, ServiceError> {
        let report = self.reports.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
        let details = self.reports.find_details(id).await?;
        let validation = self
            .validations
            .find_by_report(id)
            .await?
            .map(ValidationRecordResponse::from);

        Ok(self.respond(report, details, validation))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &ReportFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<ReportSummary>, u64), ServiceError> {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            if from > to {
                return Err(ServiceError::ValidationError(
                    "date_from must not be after date_to".to_string(),
                ));
            }
        }

        let (rows, total) = self.reports.find_all(filter, page, per_page).await?;
        Ok((rows.into_iter().map(ReportSummary::from).collect(), total))
    }

    /// Replaces the operator fields and every detail row of a draft or
    /// submitted report
    #[instrument(skip(self, input), fields(report_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        input: ReportInput,
        expected_version: Option<i32>,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        input.validate_all()?;

        let (before, after, details) = with_transaction(&self.db, "report.update", move |txn| {
            Box::pin(async move {
                let existing = ReportRepository::find_by_id_on(txn, id)
                    .await?
                    .ok_or_else(|| not_found(id))?;

                if !existing.status.is_editable() {
                    return Err(ServiceError::PreconditionFailed(format!(
                        "cannot edit a report that is {}",
                        existing.status
                    )));
                }
                if let Some(expected) = expected_version {
                    if expected != existing.version {
                        return Err(ServiceError::Conflict(format!(
                            "report {} is at version {}, not {}",
                            existing.report_number, existing.version, expected
                        )));
                    }
                }

                let mut active: production_report::ActiveModel = existing.clone().into();
                input.apply_to(&mut active);
                active.version = Set(existing.version + 1);

                let updated = active.update(txn).await.map_err(|e| {
                    error!(error = %e, report_id = %id, "Failed to update production report");
                    ServiceError::DatabaseError(e)
                })?;
                let details = ReportRepository::replace_details(txn, id, &input.new_details()).await?;
                Ok((existing, updated, details))
            })
        })
        .await?;

        info!(report_id = %id, version = after.version, "Production report updated");
        self.emit(
            ActivityEntry::new(after.id, &after.report_number, ActivityAction::Updated, actor)
                .with_before(&before)
                .with_after(&after),
        );

        let validation = self
            .validations
            .find_by_report(id)
            .await?
            .map(ValidationRecordResponse::from);
        Ok(self.respond(after, details, validation))
    }

    #[instrument(skip(self), fields(report_id = %id))]
    pub async fn submit(&self, id: Uuid, actor: &Actor) -> Result<ReportResponse, ServiceError> {
        let (before, after) = with_transaction(&self.db, "report.submit", move |txn| {
            Box::pin(async move {
                let existing = ReportRepository::find_by_id_on(txn, id)
                    .await?
                    .ok_or_else(|| not_found(id))?;
                let next = existing
                    .status
                    .transition(ReportAction::Submit)
                    .map_err(transition_error)?;

                let mut active: production_report::ActiveModel = existing.clone().into();
                active.status = Set(next);
                active.submitted_at = Set(Some(Utc::now()));
                active.version = Set(existing.version + 1);
                let updated = active.update(txn).await?;
                Ok((existing, updated))
            })
        })
        .await?;

        info!(report_id = %id, report_number = %after.report_number, "Production report submitted");
        self.emit(
            ActivityEntry::new(after.id, &after.report_number, ActivityAction::Submitted, actor)
                .with_before(&before)
                .with_after(&after),
        );

        self.get(id).await
    }

    #[instrument(skip(self, review), fields(report_id = %id))]
    pub async fn approve(
        &self,
        id: Uuid,
        review: ReviewRequest,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        self.decide(id, Decision::Approved, review, actor).await
    }

    #[instrument(skip(self, review), fields(report_id = %id))]
    pub async fn reject(
        &self,
        id: Uuid,
        review: ReviewRequest,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        self.decide(id, Decision::Rejected, review, actor).await
    }

    /// Sends a submitted report back to draft with a list of items to fix
    #[instrument(skip(self, review), fields(report_id = %id))]
    pub async fn request_revision(
        &self,
        id: Uuid,
        review: ReviewRequest,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        self.decide(id, Decision::NeedRevision, review, actor).await
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
        review: ReviewRequest,
        actor: &Actor,
    ) -> Result<ReportResponse, ServiceError> {
        review.validate()?;
        if decision.requires_note() && review.note.trim().is_empty() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "note",
                field_error("required", "a note is required for this decision"),
            );
            return Err(errors.into());
        }

        let validator = actor.clone();
        let (before, after, record) =
            with_transaction(&self.db, "report.decide", move |txn| {
                Box::pin(async move {
                    let existing = ReportRepository::find_by_id_on(txn, id)
                        .await?
                        .ok_or_else(|| not_found(id))?;
                    let next = existing
                        .status
                        .transition(decision.action())
                        .map_err(transition_error)?;

                    let mut active: production_report::ActiveModel = existing.clone().into();
                    active.status = Set(next);
                    active.version = Set(existing.version + 1);
                    let updated = active.update(txn).await?;

                    let record = ValidationLedger::record_decision(
                        txn,
                        id,
                        decision,
                        &review.note,
                        review.revision_items,
                        &validator,
                        Utc::now(),
                    )
                    .await?;
                    Ok((existing, updated, record))
                })
            })
            .await?;

        counter!("cutting_reports.decisions", 1, "decision" => decision.to_string());
        info!(
            report_id = %id,
            decision = %decision,
            status = %after.status,
            "Supervisor decision applied"
        );
        self.emit(
            ActivityEntry::new(after.id, &after.report_number, activity_action(decision), actor)
                .with_before(&before)
                .with_after(&after),
        );

        let details = self.reports.find_details(id).await?;
        Ok(self.respond(after, details, Some(record.into())))
    }

    /// Removes a draft report with its details and any validation record
    #[instrument(skip(self), fields(report_id = %id))]
    pub async fn delete(&self, id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        let removed = with_transaction(&self.db, "report.delete", move |txn| {
            Box::pin(async move {
                let existing = ReportRepository::find_by_id_on(txn, id)
                    .await?
                    .ok_or_else(|| not_found(id))?;
                if !existing.status.is_deletable() {
                    return Err(ServiceError::PreconditionFailed(format!(
                        "cannot delete a report that is {}",
                        existing.status
                    )));
                }
                ReportRepository::delete(txn, id).await?;
                Ok(existing)
            })
        })
        .await?;

        info!(report_id = %id, report_number = %removed.report_number, "Production report deleted");
        self.emit(
            ActivityEntry::new(removed.id, &removed.report_number, ActivityAction::Deleted, actor)
                .with_before(&removed),
        );
        Ok(())
    }

    /// Fails with `ReferentialIntegrity` while any report points at the
    /// master-data row; hosts call this before deleting master data
    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    pub async fn ensure_unreferenced(
        &self,
        kind: MasterDataKind,
        id: Uuid,
    ) -> Result<(), ServiceError> {
        let count = self.reports.count_referencing(kind, id).await?;
        if count > 0 {
            warn!(count, "Master data still referenced by reports");
            return Err(ServiceError::ReferentialIntegrity(format!(
                "{} {} is referenced by {} report(s)",
                kind, id, count
            )));
        }
        Ok(())
    }
}
