pub mod analytics;
pub mod common;
pub mod exports;
pub mod reports;
pub mod validations;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    analytics::AnalyticsService, export::ExportService, master_data::MasterDataLookup,
    reports::ReportService, validations::ValidationLedger,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub reports: Arc<ReportService>,
    pub validations: Arc<ValidationLedger>,
    pub analytics: Arc<AnalyticsService>,
    pub exports: Arc<ExportService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        master_data: Arc<dyn MasterDataLookup>,
        config: &AppConfig,
    ) -> Self {
        Self {
            reports: Arc::new(ReportService::new(
                db_pool.clone(),
                Some(event_sender),
                master_data.clone(),
            )),
            validations: Arc::new(ValidationLedger::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(
                db_pool.clone(),
                master_data.clone(),
                config.analytics.clone(),
            )),
            exports: Arc::new(ExportService::new(
                db_pool,
                master_data,
                config.export_batch_size,
            )),
        }
    }
}
