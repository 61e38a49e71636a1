use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::stats::{mean, percent};
use crate::models::ReportFacts;
use crate::services::derived_metrics::round2;
use crate::services::master_data::{label_or_id, MasterDataKind};

/// Entity a rollup groups by
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RollupDimension {
    Machine,
    Operator,
    Customer,
    Shift,
}

impl RollupDimension {
    /// Grouping key; customers are optional so some reports have none
    pub fn key(self, fact: &ReportFacts) -> Option<Uuid> {
        match self {
            RollupDimension::Machine => Some(fact.machine_id),
            RollupDimension::Operator => Some(fact.operator_id),
            RollupDimension::Customer => fact.customer_id,
            RollupDimension::Shift => Some(fact.shift_id),
        }
    }

    /// Master-data kind holding labels; operators are labelled from the report
    pub fn master_data_kind(self) -> Option<MasterDataKind> {
        match self {
            RollupDimension::Machine => Some(MasterDataKind::Machine),
            RollupDimension::Operator => None,
            RollupDimension::Customer => Some(MasterDataKind::Customer),
            RollupDimension::Shift => Some(MasterDataKind::Shift),
        }
    }

    /// Efficiency ranks machines and operators; volume ranks customers and shifts
    fn primary_metric(self, rollup: &EntityRollup) -> f64 {
        match self {
            RollupDimension::Machine | RollupDimension::Operator => rollup.average_efficiency,
            RollupDimension::Customer | RollupDimension::Shift => rollup.total_quantity as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EntityRollup {
    pub entity_id: Uuid,
    pub label: String,
    pub report_count: u64,
    pub average_efficiency: f64,
    pub total_quantity: i64,
    pub total_duration_minutes: i64,
    pub total_yard: f64,
    pub total_defects: i64,
    pub defect_rate: f64,
}

/// Facts grouped per entity id
pub(crate) fn group_by<'a>(
    facts: &'a [ReportFacts],
    dimension: RollupDimension,
) -> HashMap<Uuid, Vec<&'a ReportFacts>> {
    let mut groups: HashMap<Uuid, Vec<&ReportFacts>> = HashMap::new();
    for fact in facts {
        if let Some(key) = dimension.key(fact) {
            groups.entry(key).or_default().push(fact);
        }
    }
    groups
}

pub(crate) fn summarize(entity_id: Uuid, label: String, group: &[&ReportFacts]) -> EntityRollup {
    let efficiencies: Vec<f64> = group.iter().map(|f| f.efficiency_percentage).collect();
    let total_quantity: i64 = group.iter().map(|f| f.actual_quantity as i64).sum();
    let total_defects: i64 = group.iter().map(|f| f.defect_count as i64).sum();

    EntityRollup {
        entity_id,
        label,
        report_count: group.len() as u64,
        average_efficiency: round2(mean(&efficiencies)),
        total_quantity,
        total_duration_minutes: group
            .iter()
            .map(|f| f.duration_minutes.unwrap_or(0).max(0) as i64)
            .sum(),
        total_yard: round2(group.iter().map(|f| f.total_yard).sum()),
        total_defects,
        defect_rate: round2(percent(total_defects as f64, total_quantity as f64)),
    }
}

/// Groups, summarizes and keeps the `top_n` entities by the dimension's primary metric
pub fn rollup(
    facts: &[ReportFacts],
    dimension: RollupDimension,
    labels: &HashMap<Uuid, String>,
    top_n: usize,
) -> Vec<EntityRollup> {
    let mut rows: Vec<EntityRollup> = group_by(facts, dimension)
        .into_iter()
        .map(|(id, group)| {
            let label = match dimension {
                RollupDimension::Operator => group[0].operator_name.clone(),
                _ => label_or_id(labels, id),
            };
            summarize(id, label, &group)
        })
        .collect();

    rows.sort_by(|a, b| {
        dimension
            .primary_metric(b)
            .partial_cmp(&dimension.primary_metric(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.report_count.cmp(&a.report_count))
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    rows.truncate(top_n);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::test_support::{fact, MACHINE_A, MACHINE_B};
    use test_case::test_case;

    #[test]
    fn machines_rank_by_average_efficiency() {
        let facts = vec![
            fact(0, 70, 100),
            fact(1, 90, 100),
            ReportFacts {
                machine_id: MACHINE_B,
                ..fact(1, 95, 100)
            },
        ];
        let labels = HashMap::from([(MACHINE_B, "Cutter B".to_string())]);

        let rows = rollup(&facts, RollupDimension::Machine, &labels, 10);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].entity_id, MACHINE_B);
        assert_eq!(rows[0].label, "Cutter B");
        assert_eq!(rows[1].entity_id, MACHINE_A);
        assert_eq!(rows[1].label, MACHINE_A.to_string());
        assert_eq!(rows[1].average_efficiency, 80.0);
        assert_eq!(rows[1].total_quantity, 160);
    }

    #[test]
    fn customers_without_id_are_skipped_and_rank_by_volume() {
        let small = Uuid::from_u128(0xC1);
        let large = Uuid::from_u128(0xC2);
        let facts = vec![
            fact(0, 100, 100),
            ReportFacts {
                customer_id: Some(small),
                ..fact(0, 50, 50)
            },
            ReportFacts {
                customer_id: Some(large),
                ..fact(0, 80, 200)
            },
        ];

        let rows = rollup(&facts, RollupDimension::Customer, &HashMap::new(), 10);
        let ids: Vec<Uuid> = rows.iter().map(|r| r.entity_id).collect();
        assert_eq!(ids, vec![large, small]);
    }

    #[test]
    fn truncates_to_top_n() {
        let facts: Vec<ReportFacts> = (0..15)
            .map(|i| ReportFacts {
                machine_id: Uuid::from_u128(1000 + i as u128),
                ..fact(0, 50 + i, 100)
            })
            .collect();
        let rows = rollup(&facts, RollupDimension::Machine, &HashMap::new(), 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].total_quantity, 64);
    }

    #[test]
    fn defect_rate_is_per_unit_produced() {
        let facts = vec![ReportFacts {
            defect_count: 6,
            ..fact(0, 100, 100)
        }];
        let rows = rollup(&facts, RollupDimension::Shift, &HashMap::new(), 10);
        assert_eq!(rows[0].defect_rate, 6.0);
        assert_eq!(rows[0].total_duration_minutes, 60);
    }

    #[test_case(RollupDimension::Machine, Some(MasterDataKind::Machine))]
    #[test_case(RollupDimension::Operator, None)]
    #[test_case(RollupDimension::Shift, Some(MasterDataKind::Shift))]
    fn label_sources(dimension: RollupDimension, kind: Option<MasterDataKind>) {
        assert_eq!(dimension.master_data_kind(), kind);
    }

    #[test]
    fn empty_window_has_no_rows() {
        assert!(rollup(&[], RollupDimension::Operator, &HashMap::new(), 10).is_empty());
    }
}
