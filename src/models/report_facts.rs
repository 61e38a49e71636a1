use chrono::NaiveDate;
use sea_orm::FromQueryResult;
use uuid::Uuid;

use super::QualityRating;
use crate::entities::StringList;

/// The slice of an approved report the analytics aggregations read
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct ReportFacts {
    pub id: Uuid,
    pub production_date: NaiveDate,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub machine_id: Uuid,
    pub shift_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub target_quantity: i32,
    pub actual_quantity: i32,
    pub efficiency_percentage: f64,
    pub total_yard: f64,
    pub duration_minutes: Option<i32>,
    pub defect_count: i32,
    pub defect_categories: StringList,
    pub quality_rating: QualityRating,
}

impl ReportFacts {
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes.unwrap_or(0).max(0) as f64 / 60.0
    }
}
