use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::report_status::ReportAction;

/// Supervisor verdict stored on a validation record
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Decision {
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "need_revision")]
    NeedRevision,
}

impl Decision {
    /// Lifecycle action that records this decision
    pub fn action(self) -> ReportAction {
        match self {
            Decision::Approved => ReportAction::Approve,
            Decision::Rejected => ReportAction::Reject,
            Decision::NeedRevision => ReportAction::RequestRevision,
        }
    }

    /// Rejections and revision requests must explain themselves
    pub fn requires_note(self) -> bool {
        matches!(self, Decision::Rejected | Decision::NeedRevision)
    }

    pub fn accepts_revision_items(self) -> bool {
        matches!(self, Decision::NeedRevision)
    }
}
