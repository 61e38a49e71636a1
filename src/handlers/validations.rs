use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::common::{
        ensure_date_order, PaginatedResponse, PaginationParams, WindowQuery,
    },
    models::{Decision, ReportStatus},
    repositories::ValidationFilter,
    services::{
        reports::ReportSummary,
        validations::{ValidationHistoryItem, ValidationRecordResponse, ValidationStats},
    },
    ApiResponse, AppState,
};

/// Build the validations Router scoped under `/api/v1/validations`.
pub fn validations_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_validations))
        .route("/pending", get(pending_validations))
        .route("/stats", get(validation_stats))
        .route("/export", get(super::exports::export_validations))
        .route("/report/:id", get(current_decision))
}

/// History filters; all optional and combined with AND
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ValidationListQuery {
    pub decision: Option<Decision>,
    /// Current status of the validated report
    pub status: Option<ReportStatus>,
    pub validator_id: Option<Uuid>,
    /// First decision date (UTC), inclusive
    pub date_from: Option<NaiveDate>,
    /// Last decision date (UTC), inclusive
    pub date_to: Option<NaiveDate>,
}

impl ValidationListQuery {
    pub fn into_filter(self) -> Result<ValidationFilter, ServiceError> {
        ensure_date_order(self.date_from, self.date_to)?;
        Ok(ValidationFilter {
            decision: self.decision,
            report_status: self.status,
            validator_id: self.validator_id,
            date_from: self.date_from,
            date_to: self.date_to,
        })
    }
}

/// Validation history across reports, newest decision first
#[utoipa::path(
    get,
    path = "/api/v1/validations",
    params(PaginationParams, ValidationListQuery),
    responses(
        (status = 200, description = "History retrieved", body = ApiResponse<PaginatedResponse<ValidationHistoryItem>>),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse),
    ),
    tag = "Validations"
)]
pub async fn list_validations(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ValidationListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<ValidationHistoryItem>>>, ServiceError> {
    let (page, per_page) = pagination.resolve(&state.config);
    let filter = query.into_filter()?;

    let (items, total) = state
        .services
        .validations
        .history(&filter, page, per_page)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, page, per_page, total,
    ))))
}

/// Submitted reports waiting for a decision, oldest submission first
#[utoipa::path(
    get,
    path = "/api/v1/validations/pending",
    params(PaginationParams),
    responses(
        (status = 200, description = "Pending queue retrieved", body = ApiResponse<PaginatedResponse<ReportSummary>>),
    ),
    tag = "Validations"
)]
pub async fn pending_validations(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ReportSummary>>>, ServiceError> {
    let (page, per_page) = pagination.resolve(&state.config);
    let (reports, total) = state.services.validations.pending(page, per_page).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        reports, page, per_page, total,
    ))))
}

/// Decision counts for decisions taken inside the window
#[utoipa::path(
    get,
    path = "/api/v1/validations/stats",
    params(WindowQuery),
    responses(
        (status = 200, description = "Statistics retrieved", body = ApiResponse<ValidationStats>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse),
    ),
    tag = "Validations"
)]
pub async fn validation_stats(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<ApiResponse<ValidationStats>>, ServiceError> {
    let window = query.resolve(&state.config)?;
    let stats = state.services.validations.stats(window).await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// The report's current decision, if any
#[utoipa::path(
    get,
    path = "/api/v1/validations/report/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Current decision (null when none)", body = ApiResponse<Option<ValidationRecordResponse>>),
    ),
    tag = "Validations"
)]
pub async fn current_decision(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Option<ValidationRecordResponse>>>, ServiceError> {
    let record = state.services.validations.current_decision(id).await?;
    Ok(Json(ApiResponse::success(record)))
}
