use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    errors::ServiceError,
    handlers::{reports::ReportListQuery, validations::ValidationListQuery},
    services::export::CSV_CONTENT_TYPE,
    AppState,
};

/// Streams `body` as a CSV file download
fn csv_attachment(prefix: &str, body: Body) -> Response {
    let filename = format!("{}-{}.csv", prefix, Utc::now().format("%Y%m%d-%H%M%S"));
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// CSV of every report matching the listing filters
#[utoipa::path(
    get,
    path = "/api/v1/reports/export",
    params(ReportListQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse),
    ),
    tag = "Exports"
)]
pub async fn export_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> Result<Response, ServiceError> {
    let filter = query.into_filter()?;
    let chunks = state.services.exports.reports_csv(filter);
    Ok(csv_attachment("cutting-reports", Body::from_stream(chunks)))
}

/// CSV of the validation history matching the history filters
#[utoipa::path(
    get,
    path = "/api/v1/validations/export",
    params(ValidationListQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 400, description = "Invalid filters", body = crate::errors::ErrorResponse),
    ),
    tag = "Exports"
)]
pub async fn export_validations(
    State(state): State<AppState>,
    Query(query): Query<ValidationListQuery>,
) -> Result<Response, ServiceError> {
    let filter = query.into_filter()?;
    let chunks = state.services.exports.validations_csv(filter);
    Ok(csv_attachment("cutting-validations", Body::from_stream(chunks)))
}
