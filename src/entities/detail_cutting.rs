use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-pattern-piece detail of a cutting report
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "detail_cuttings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub report_id: Uuid,
    pub piece_name: String,
    pub size_label: String,
    pub piece_count: i32,
    pub length_cm: Option<f64>,
    pub width_cm: Option<f64>,
    pub waste_percentage: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_report::Entity",
        from = "Column::ReportId",
        to = "super::production_report::Column::Id",
        on_delete = "Cascade"
    )]
    Report,
}

impl Related<super::production_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if let ActiveValue::NotSet = self.id {
                self.id = Set(Uuid::new_v4());
            }
            self.created_at = Set(Utc::now());
        }
        Ok(self)
    }
}
