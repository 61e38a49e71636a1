use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cutting Reports API",
        version = "1.0.0",
        description = r#"
# Cutting Reports API

Daily production reports from the garment cutting floor, the supervisor
validation workflow around them, and production analytics.

## Features

- **Reports**: Create, edit, submit and delete cutting reports with derived yield and efficiency
- **Validations**: Approve, reject or send reports back for revision, with full history
- **Analytics**: Overview, trends, rollups, leaderboard, forecast, capacity, bottlenecks and quality
- **Exports**: CSV downloads of reports and validation history

## Identity

Every mutating endpoint reads the acting user from two headers:

```
X-Actor-Id: <uuid>
X-Actor-Name: <display name>
```

## Windows

Analytics and statistics endpoints accept `start_date`/`end_date` (inclusive, UTC) or
`days`. Without either, the window ends today and spans the configured default.

## Error Handling

```json
{
  "error": "Bad Request",
  "message": "Invalid input",
  "details": { "details[0].piece_count": ["range"] },
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Reports", description = "Cutting report lifecycle endpoints"),
        (name = "Validations", description = "Supervisor decision endpoints"),
        (name = "Analytics", description = "Production analytics endpoints"),
        (name = "Exports", description = "CSV export endpoints")
    ),
    paths(
        // Reports
        crate::handlers::reports::create_report,
        crate::handlers::reports::list_reports,
        crate::handlers::reports::get_report,
        crate::handlers::reports::update_report,
        crate::handlers::reports::delete_report,
        crate::handlers::reports::submit_report,
        crate::handlers::reports::approve_report,
        crate::handlers::reports::reject_report,
        crate::handlers::reports::request_revision,

        // Validations
        crate::handlers::validations::list_validations,
        crate::handlers::validations::pending_validations,
        crate::handlers::validations::validation_stats,
        crate::handlers::validations::current_decision,

        // Exports
        crate::handlers::exports::export_reports,
        crate::handlers::exports::export_validations,

        // Analytics
        crate::handlers::analytics::get_dashboard,
        crate::handlers::analytics::get_overview,
        crate::handlers::analytics::get_daily_trend,
        crate::handlers::analytics::get_weekly_efficiency,
        crate::handlers::analytics::get_machine_rollup,
        crate::handlers::analytics::get_operator_rollup,
        crate::handlers::analytics::get_customer_rollup,
        crate::handlers::analytics::get_shift_rollup,
        crate::handlers::analytics::get_leaderboard,
        crate::handlers::analytics::get_operator_scorecards,
        crate::handlers::analytics::get_team_consistency,
        crate::handlers::analytics::get_forecast,
        crate::handlers::analytics::get_capacity,
        crate::handlers::analytics::get_bottlenecks,
        crate::handlers::analytics::get_quality,
    ),
    components(
        schemas(
            // Report types
            crate::services::reports::ReportInput,
            crate::services::reports::DetailInput,
            crate::services::reports::CreateReportRequest,
            crate::services::reports::UpdateReportRequest,
            crate::services::reports::ReviewRequest,
            crate::services::reports::ReportSummary,
            crate::services::reports::ReportResponse,
            crate::services::reports::DetailResponse,
            crate::services::reports::ReferenceLabels,
            crate::models::ReportStatus,
            crate::models::MachineCondition,
            crate::models::QualityRating,
            crate::models::Decision,
            crate::models::Actor,

            // Validation types
            crate::services::validations::ValidationRecordResponse,
            crate::services::validations::ValidationHistoryItem,
            crate::services::validations::ValidationStats,

            // Analytics types
            crate::services::analytics::Dashboard,
            crate::services::analytics::OverviewStats,
            crate::services::analytics::TrendPoint,
            crate::services::analytics::EntityRollup,
            crate::services::analytics::RollupDimension,
            crate::services::analytics::OperatorScorecard,
            crate::services::analytics::TeamConsistency,
            crate::services::analytics::ProductionForecast,
            crate::services::analytics::CapacityUtilization,
            crate::services::analytics::Bottlenecks,
            crate::services::analytics::QualityDistribution,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_surface() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Cutting Reports API"));
        assert!(json.contains("/api/v1/reports"));
        assert!(json.contains("/api/v1/reports/{id}/approve"));
        assert!(json.contains("/api/v1/validations/pending"));
        assert!(json.contains("/api/v1/analytics/leaderboard"));
        assert!(json.contains("ErrorResponse"));
    }
}
