use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Kinds of externally owned reference data a report points at
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MasterDataKind {
    Machine,
    Shift,
    ProductionLine,
    Customer,
    Pattern,
    FabricType,
}

/// Resolves master-data ids to display labels.
///
/// Implementations return only the ids they know; callers fall back to the
/// id itself for anything missing.
#[cfg_attr(test, mockall::automock)]
pub trait MasterDataLookup: Send + Sync {
    fn labels(&self, kind: MasterDataKind, ids: &[Uuid]) -> HashMap<Uuid, String>;
}

/// Label for `id`, or the id string when the lookup does not know it
pub fn label_or_id(labels: &HashMap<Uuid, String>, id: Uuid) -> String {
    labels.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Process-local label registry the host application fills in
#[derive(Debug, Default)]
pub struct InMemoryMasterData {
    labels: DashMap<(MasterDataKind, Uuid), String>,
}

impl InMemoryMasterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: MasterDataKind, id: Uuid, label: impl Into<String>) {
        self.labels.insert((kind, id), label.into());
    }

    pub fn remove(&self, kind: MasterDataKind, id: Uuid) -> Option<String> {
        self.labels.remove(&(kind, id)).map(|(_, label)| label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl MasterDataLookup for InMemoryMasterData {
    fn labels(&self, kind: MasterDataKind, ids: &[Uuid]) -> HashMap<Uuid, String> {
        ids.iter()
            .filter_map(|id| {
                self.labels
                    .get(&(kind, *id))
                    .map(|label| (*id, label.value().clone()))
            })
            .collect()
    }
}
