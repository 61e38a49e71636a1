use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StringList;
use crate::models::{MachineCondition, QualityRating, ReportStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub report_number: String,
    pub order_number: String,
    pub batch_number: String,
    pub production_date: NaiveDate,
    pub operator_id: Uuid,
    pub operator_name: String,
    pub machine_id: Uuid,
    pub shift_id: Uuid,
    pub production_line_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub pattern_id: Option<Uuid>,
    pub fabric_type_id: Option<Uuid>,
    pub target_quantity: i32,
    pub actual_quantity: i32,
    pub layer_count: i32,
    pub fabric_length_m: f64,
    pub fabric_width_cm: f64,
    pub cutting_start: Option<DateTime<Utc>>,
    pub cutting_end: Option<DateTime<Utc>>,
    pub machine_condition: MachineCondition,
    pub quality_rating: QualityRating,
    pub defect_count: i32,
    #[sea_orm(column_type = "Json")]
    pub defect_categories: StringList,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub operator_note: Option<String>,
    pub total_yard: f64,
    pub duration_minutes: Option<i32>,
    pub efficiency_percentage: f64,
    pub status: ReportStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::detail_cutting::Entity")]
    DetailCuttings,
    #[sea_orm(has_one = "super::validation_record::Entity")]
    ValidationRecord,
}

impl Related<super::detail_cutting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DetailCuttings.def()
    }
}

impl Related<super::validation_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ValidationRecord.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = self.id {
                self.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = self.version {
                self.version = Set(1);
            }
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);

        Ok(self)
    }
}
