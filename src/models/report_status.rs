use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a production report
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
pub enum ReportStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Actions that move a report between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReportAction {
    Submit,
    Approve,
    Reject,
    RequestRevision,
}

/// Rejected transition, carrying enough context for a caller-facing message
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} a report that is {from}")]
pub struct TransitionError {
    pub from: ReportStatus,
    pub action: ReportAction,
}

impl ReportStatus {
    /// Status reached by applying `action`, if the move is allowed
    pub fn transition(self, action: ReportAction) -> Result<ReportStatus, TransitionError> {
        use ReportAction::*;
        use ReportStatus::*;

        match (self, action) {
            (Draft, Submit) => Ok(Submitted),
            (Submitted, Approve) => Ok(Approved),
            (Submitted, Reject) => Ok(Rejected),
            (Submitted, RequestRevision) => Ok(Draft),
            (Draft, Approve | Reject | RequestRevision)
            | (Submitted, Submit)
            | (Approved | Rejected, _) => Err(TransitionError { from: self, action }),
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, ReportStatus::Draft | ReportStatus::Submitted)
    }

    pub fn is_deletable(self) -> bool {
        matches!(self, ReportStatus::Draft)
    }
}
