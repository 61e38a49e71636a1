use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod report_repository;
pub mod validation_repository;

pub use report_repository::{NewDetail, ReportFilter, ReportRepository};
pub use validation_repository::{DecisionWrite, ValidationFilter, ValidationRepository};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
