/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`): process is up
 * - Readiness check (`/health/ready`): the database answers a ping
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

use crate::AppState;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health check detail
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency_ms: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadinessInfo {
    pub ready: bool,
    pub database: HealthDetail,
    pub timestamp: DateTime<Utc>,
}

/// Creates router with health check endpoints
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
}

/// Basic health check endpoint
pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now(),
        })),
    )
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();

    let database = match state.db.ping().await {
        Ok(()) => HealthDetail {
            status: HealthStatus::Up,
            message: None,
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "Database health check failed");
            HealthDetail {
                status: HealthStatus::Down,
                message: Some("database unreachable".to_string()),
                latency_ms: started.elapsed().as_millis() as u64,
            }
        }
    };

    let ready = database.status == HealthStatus::Up;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessInfo {
            ready,
            database,
            timestamp: Utc::now(),
        }),
    )
}
