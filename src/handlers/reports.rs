use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    handlers::common::{ensure_date_order, CurrentActor, PaginatedResponse, PaginationParams},
    models::ReportStatus,
    repositories::ReportFilter,
    services::reports::{
        CreateReportRequest, ReportResponse, ReportSummary, ReviewRequest, UpdateReportRequest,
    },
    ApiResponse, AppState,
};

/// Build the reports Router scoped under `/api/v1/reports`.
pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_report).get(list_reports))
        .route("/export", get(super::exports::export_reports))
        .route(
            "/:id",
            get(get_report).put(update_report).delete(delete_report),
        )
        .route("/:id/submit", post(submit_report))
        .route("/:id/approve", post(approve_report))
        .route("/:id/reject", post(reject_report))
        .route("/:id/request-revision", post(request_revision))
}

/// Listing filters; all optional and combined with AND
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportListQuery {
    pub status: Option<ReportStatus>,
    pub operator_id: Option<Uuid>,
    pub machine_id: Option<Uuid>,
    pub shift_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    /// First production date, inclusive
    pub date_from: Option<NaiveDate>,
    /// Last production date, inclusive
    pub date_to: Option<NaiveDate>,
    /// Matches order, batch or report number
    pub search: Option<String>,
}

impl ReportListQuery {
    pub fn into_filter(self) -> Result<ReportFilter, ServiceError> {
        ensure_date_order(self.date_from, self.date_to)?;
        Ok(ReportFilter {
            status: self.status,
            operator_id: self.operator_id,
            machine_id: self.machine_id,
            shift_id: self.shift_id,
            customer_id: self.customer_id,
            date_from: self.date_from,
            date_to: self.date_to,
            search: self.search,
        })
    }
}

/// Create a report as draft, or directly submitted with `submit = true`
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Invalid report fields", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing actor headers", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn create_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponse>>), ServiceError> {
    let report = state
        .services
        .reports
        .create(request.input, request.submit, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(report))))
}

/// List reports, newest production date first
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(PaginationParams, ReportListQuery),
    responses(
        (status = 200, description = "Reports retrieved", body = ApiResponse<PaginatedResponse<ReportSummary>>),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<ReportSummary>>>, ServiceError> {
    let (page, per_page) = pagination.resolve(&state.config);
    let filter = query.into_filter()?;

    let (reports, total) = state
        .services
        .reports
        .list(&filter, page, per_page)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        reports, page, per_page, total,
    ))))
}

/// Get a report with its detail rows and current validation decision
#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report retrieved", body = ApiResponse<ReportResponse>),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let report = state.services.reports.get(id).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Replace the fields and detail rows of a draft or submitted report
#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = UpdateReportRequest,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Invalid report fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Report is final or the version does not match", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn update_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<UpdateReportRequest>,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let report = state
        .services
        .reports
        .update(id, request.input, request.expected_version, &actor)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Delete a draft report
#[utoipa::path(
    delete,
    path = "/api/v1/reports/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 404, description = "Report not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Report is not a draft", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
) -> Result<StatusCode, ServiceError> {
    state.services.reports.delete(id, &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a draft report for validation
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/submit",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report submitted", body = ApiResponse<ReportResponse>),
        (status = 409, description = "Report is not a draft", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn submit_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let report = state.services.reports.submit(id, &actor).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Approve a submitted report; the note is optional
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/approve",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body(content = Option<ReviewRequest>, description = "Optional approval note"),
    responses(
        (status = 200, description = "Report approved", body = ApiResponse<ReportResponse>),
        (status = 409, description = "Report is not submitted", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn approve_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let review = body.map(|Json(review)| review).unwrap_or_default();
    let report = state.services.reports.approve(id, review, &actor).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Reject a submitted report; a note is required and a missing body counts
/// as a missing note
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/reject",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Report rejected", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Missing note", body = crate::errors::ErrorResponse),
        (status = 409, description = "Report is not submitted", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn reject_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let review = body.map(|Json(review)| review).unwrap_or_default();
    let report = state.services.reports.reject(id, review, &actor).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Return a submitted report to draft with the items to fix
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/request-revision",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Revision requested", body = ApiResponse<ReportResponse>),
        (status = 400, description = "Missing note", body = crate::errors::ErrorResponse),
        (status = 409, description = "Report is not submitted", body = crate::errors::ErrorResponse),
    ),
    tag = "Reports"
)]
pub async fn request_revision(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    CurrentActor(actor): CurrentActor,
    body: Option<Json<ReviewRequest>>,
) -> Result<Json<ApiResponse<ReportResponse>>, ServiceError> {
    let review = body.map(|Json(review)| review).unwrap_or_default();
    let report = state
        .services
        .reports
        .request_revision(id, review, &actor)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}
