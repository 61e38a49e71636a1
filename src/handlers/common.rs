use async_trait::async_trait;
use axum::http::request::Parts;
use axum::extract::FromRequestParts;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::models::Actor;
use crate::services::analytics::DateWindow;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// The caller, taken from the `x-actor-id` and `x-actor-name` headers
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let id = header(ACTOR_ID_HEADER)
            .ok_or_else(|| ServiceError::Unauthorized(format!("missing {} header", ACTOR_ID_HEADER)))?;
        let id = Uuid::parse_str(id).map_err(|_| {
            ServiceError::Unauthorized(format!("{} must be a UUID", ACTOR_ID_HEADER))
        })?;
        let name = header(ACTOR_NAME_HEADER).ok_or_else(|| {
            ServiceError::Unauthorized(format!("missing {} header", ACTOR_NAME_HEADER))
        })?;

        Ok(CurrentActor(Actor::new(id, name)))
    }
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (defaults to the configured page size)
    pub per_page: Option<u64>,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: None,
        }
    }
}

impl PaginationParams {
    /// Page and page size clamped to the configured bounds
    pub fn resolve(&self, config: &AppConfig) -> (u64, u64) {
        let per_page = self
            .per_page
            .unwrap_or(config.api_default_page_size)
            .clamp(1, config.api_max_page_size.max(1));
        (self.page.max(1), per_page)
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 || per_page == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

/// Inclusive production-date window; omitted bounds default to the last
/// `days` days ending today (UTC)
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct WindowQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[param(minimum = 1)]
    pub days: Option<i64>,
}

impl WindowQuery {
    pub fn resolve(&self, config: &AppConfig) -> Result<DateWindow, ServiceError> {
        DateWindow::resolve_today(
            self.start_date,
            self.end_date,
            self.days,
            config.analytics.default_window_days,
        )
    }
}

/// Rejects a `from` date after the `to` date
pub fn ensure_date_order(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(), ServiceError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ServiceError::ValidationError(
            "date_from must not be after date_to".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn config() -> AppConfig {
        AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        )
    }

    async fn extract(request: Request<()>) -> Result<CurrentActor, ServiceError> {
        let (mut parts, _) = request.into_parts();
        CurrentActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn actor_comes_from_headers() {
        let id = Uuid::new_v4();
        let request = Request::builder()
            .header(ACTOR_ID_HEADER, id.to_string())
            .header(ACTOR_NAME_HEADER, " Rina ")
            .body(())
            .unwrap();

        let CurrentActor(actor) = extract(request).await.unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.name, "Rina");
    }

    #[tokio::test]
    async fn missing_or_malformed_actor_is_unauthorized() {
        let no_headers = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(no_headers).await,
            Err(ServiceError::Unauthorized(_))
        ));

        let bad_id = Request::builder()
            .header(ACTOR_ID_HEADER, "42")
            .header(ACTOR_NAME_HEADER, "Rina")
            .body(())
            .unwrap();
        assert!(matches!(extract(bad_id).await, Err(ServiceError::Unauthorized(_))));
    }

    #[test]
    fn page_size_is_clamped() {
        let config = config();
        let params = PaginationParams {
            page: 0,
            per_page: Some(100_000),
        };
        let (page, per_page) = params.resolve(&config);
        assert_eq!(page, 1);
        assert_eq!(per_page, config.api_max_page_size);

        let (_, per_page) = PaginationParams::default().resolve(&config);
        assert_eq!(per_page, config.api_default_page_size);
    }

    #[test]
    fn pagination_meta_rounds_up() {
        let meta = PaginationMeta::new(1, 20, 41);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(PaginationMeta::new(1, 20, 0).total_pages, 0);
    }
}
