use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    errors::ServiceError,
    handlers::common::WindowQuery,
    services::analytics::{
        Bottlenecks, CapacityUtilization, Dashboard, EntityRollup, OperatorScorecard,
        OverviewStats, ProductionForecast, QualityDistribution, RollupDimension,
        TeamConsistency, TrendPoint,
    },
    ApiResponse, ApiResult, AppState,
};

/// Build the analytics Router scoped under `/api/v1/analytics`.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/overview", get(get_overview))
        .route("/trends/daily", get(get_daily_trend))
        .route("/trends/weekly", get(get_weekly_efficiency))
        .route("/machines", get(get_machine_rollup))
        .route("/operators", get(get_operator_rollup))
        .route("/operators/scorecard", get(get_operator_scorecards))
        .route("/customers", get(get_customer_rollup))
        .route("/shifts", get(get_shift_rollup))
        .route("/leaderboard", get(get_leaderboard))
        .route("/consistency", get(get_team_consistency))
        .route("/forecast", get(get_forecast))
        .route("/capacity", get(get_capacity))
        .route("/bottlenecks", get(get_bottlenecks))
        .route("/quality", get(get_quality))
}

/// Query parameters for the leaderboard
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Rows to return (default: configured leaderboard limit)
    #[param(minimum = 1, maximum = 500)]
    pub limit: Option<usize>,
}

/// Overview, trend, top rollups, quality, consistency, forecast and
/// bottlenecks from one window load
#[utoipa::path(
    get,
    path = "/api/v1/analytics/dashboard",
    params(WindowQuery),
    responses(
        (status = 200, description = "Dashboard computed", body = ApiResponse<Dashboard>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Dashboard> {
    let window = query.resolve(&state.config)?;
    let dashboard = state.services.analytics.dashboard(window).await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// Status counts and approved totals against the preceding window
#[utoipa::path(
    get,
    path = "/api/v1/analytics/overview",
    params(WindowQuery),
    responses(
        (status = 200, description = "Overview computed", body = ApiResponse<OverviewStats>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_overview(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<OverviewStats> {
    let window = query.resolve(&state.config)?;
    let overview = state.services.analytics.overview(window).await?;
    Ok(Json(ApiResponse::success(overview)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends/daily",
    params(WindowQuery),
    responses(
        (status = 200, description = "One point per production day", body = ApiResponse<Vec<TrendPoint>>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_daily_trend(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<TrendPoint>> {
    let window = query.resolve(&state.config)?;
    let trend = state.services.analytics.daily_trend(window).await?;
    Ok(Json(ApiResponse::success(trend)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends/weekly",
    params(WindowQuery),
    responses(
        (status = 200, description = "One point per ISO week", body = ApiResponse<Vec<TrendPoint>>),
        (status = 400, description = "Invalid window", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_weekly_efficiency(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<TrendPoint>> {
    let window = query.resolve(&state.config)?;
    let trend = state.services.analytics.weekly_efficiency(window).await?;
    Ok(Json(ApiResponse::success(trend)))
}

async fn rollup(
    state: &AppState,
    query: &WindowQuery,
    dimension: RollupDimension,
) -> ApiResult<Vec<EntityRollup>> {
    let window = query.resolve(&state.config)?;
    let rows = state.services.analytics.rollup(window, dimension).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Top machines by average efficiency
#[utoipa::path(
    get,
    path = "/api/v1/analytics/machines",
    params(WindowQuery),
    responses((status = 200, description = "Machine rollup", body = ApiResponse<Vec<EntityRollup>>)),
    tag = "Analytics"
)]
pub async fn get_machine_rollup(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<EntityRollup>> {
    rollup(&state, &query, RollupDimension::Machine).await
}

/// Top operators by average efficiency
#[utoipa::path(
    get,
    path = "/api/v1/analytics/operators",
    params(WindowQuery),
    responses((status = 200, description = "Operator rollup", body = ApiResponse<Vec<EntityRollup>>)),
    tag = "Analytics"
)]
pub async fn get_operator_rollup(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<EntityRollup>> {
    rollup(&state, &query, RollupDimension::Operator).await
}

/// Top customers by produced quantity
#[utoipa::path(
    get,
    path = "/api/v1/analytics/customers",
    params(WindowQuery),
    responses((status = 200, description = "Customer rollup", body = ApiResponse<Vec<EntityRollup>>)),
    tag = "Analytics"
)]
pub async fn get_customer_rollup(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<EntityRollup>> {
    rollup(&state, &query, RollupDimension::Customer).await
}

/// Top shifts by produced quantity
#[utoipa::path(
    get,
    path = "/api/v1/analytics/shifts",
    params(WindowQuery),
    responses((status = 200, description = "Shift rollup", body = ApiResponse<Vec<EntityRollup>>)),
    tag = "Analytics"
)]
pub async fn get_shift_rollup(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<EntityRollup>> {
    rollup(&state, &query, RollupDimension::Shift).await
}

/// Ranked operators with badges
#[utoipa::path(
    get,
    path = "/api/v1/analytics/leaderboard",
    params(WindowQuery, LeaderboardQuery),
    responses(
        (status = 200, description = "Leaderboard", body = ApiResponse<Vec<OperatorScorecard>>),
        (status = 400, description = "Invalid window or limit", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
    Query(params): Query<LeaderboardQuery>,
) -> ApiResult<Vec<OperatorScorecard>> {
    if let Some(limit) = params.limit {
        if !(1..=500).contains(&limit) {
            return Err(ServiceError::ValidationError(
                "limit must be between 1 and 500".to_string(),
            ));
        }
    }

    let window = query.resolve(&state.config)?;
    let board = state
        .services
        .analytics
        .leaderboard(window, params.limit)
        .await?;
    Ok(Json(ApiResponse::success(board)))
}

/// Productivity, consistency and ranking of every operator in the window
#[utoipa::path(
    get,
    path = "/api/v1/analytics/operators/scorecard",
    params(WindowQuery),
    responses((status = 200, description = "Operator scorecards", body = ApiResponse<Vec<OperatorScorecard>>)),
    tag = "Analytics"
)]
pub async fn get_operator_scorecards(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Vec<OperatorScorecard>> {
    let window = query.resolve(&state.config)?;
    let cards = state.services.analytics.operator_scorecards(window).await?;
    Ok(Json(ApiResponse::success(cards)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/consistency",
    params(WindowQuery),
    responses((status = 200, description = "Team consistency", body = ApiResponse<TeamConsistency>)),
    tag = "Analytics"
)]
pub async fn get_team_consistency(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<TeamConsistency> {
    let window = query.resolve(&state.config)?;
    let consistency = state.services.analytics.team_consistency(window).await?;
    Ok(Json(ApiResponse::success(consistency)))
}

/// Linear-trend estimate of the next 7 and 30 days
#[utoipa::path(
    get,
    path = "/api/v1/analytics/forecast",
    params(WindowQuery),
    responses((status = 200, description = "Production forecast", body = ApiResponse<ProductionForecast>)),
    tag = "Analytics"
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<ProductionForecast> {
    let window = query.resolve(&state.config)?;
    let forecast = state.services.analytics.forecast(window).await?;
    Ok(Json(ApiResponse::success(forecast)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/capacity",
    params(WindowQuery),
    responses((status = 200, description = "Capacity utilization", body = ApiResponse<CapacityUtilization>)),
    tag = "Analytics"
)]
pub async fn get_capacity(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<CapacityUtilization> {
    let window = query.resolve(&state.config)?;
    let capacity = state.services.analytics.capacity(window).await?;
    Ok(Json(ApiResponse::success(capacity)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/bottlenecks",
    params(WindowQuery),
    responses((status = 200, description = "Bottleneck lists", body = ApiResponse<Bottlenecks>)),
    tag = "Analytics"
)]
pub async fn get_bottlenecks(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Bottlenecks> {
    let window = query.resolve(&state.config)?;
    let bottlenecks = state.services.analytics.bottlenecks(window).await?;
    Ok(Json(ApiResponse::success(bottlenecks)))
}

#[utoipa::path(
    get,
    path = "/api/v1/analytics/quality",
    params(WindowQuery),
    responses((status = 200, description = "Quality distribution", body = ApiResponse<QualityDistribution>)),
    tag = "Analytics"
)]
pub async fn get_quality(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<QualityDistribution> {
    let window = query.resolve(&state.config)?;
    let quality = state.services.analytics.quality(window).await?;
    Ok(Json(ApiResponse::success(quality)))
}
