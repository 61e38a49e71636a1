use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

use super::rollups::{group_by, summarize, EntityRollup, RollupDimension};
use super::stats::{mean, percent};
use crate::models::ReportFacts;
use crate::services::master_data::label_or_id;

/// Limits that turn a machine or shift into a reported issue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BottleneckThresholds {
    /// Average efficiency (percent) below which an entity is flagged
    pub efficiency: f64,
    /// Defects per produced unit (percent) above which a machine is flagged
    pub defect_rate: f64,
}

impl Default for BottleneckThresholds {
    fn default() -> Self {
        Self {
            efficiency: 80.0,
            defect_rate: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EfficiencyIssue {
    pub entity_id: Uuid,
    pub label: String,
    pub report_count: u64,
    pub average_efficiency: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DefectIssue {
    pub entity_id: Uuid,
    pub label: String,
    pub total_defects: i64,
    pub total_quantity: i64,
    pub defect_rate: f64,
    pub threshold: f64,
}

/// Three independent issue lists; an entity may appear in more than one
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Bottlenecks {
    pub low_efficiency_machines: Vec<EfficiencyIssue>,
    pub high_defect_machines: Vec<DefectIssue>,
    pub low_efficiency_shifts: Vec<EfficiencyIssue>,
}

/// A rollup row plus the unrounded figures the thresholds are compared against
struct Candidate {
    row: EntityRollup,
    efficiency: f64,
    defect_rate: f64,
}

fn candidates(
    facts: &[ReportFacts],
    dimension: RollupDimension,
    labels: &HashMap<Uuid, String>,
) -> Vec<Candidate> {
    group_by(facts, dimension)
        .into_iter()
        .map(|(id, group)| {
            let efficiencies: Vec<f64> = group.iter().map(|f| f.efficiency_percentage).collect();
            let defects: i64 = group.iter().map(|f| f.defect_count as i64).sum();
            let quantity: i64 = group.iter().map(|f| f.actual_quantity as i64).sum();
            Candidate {
                efficiency: mean(&efficiencies),
                defect_rate: percent(defects as f64, quantity as f64),
                row: summarize(id, label_or_id(labels, id), &group),
            }
        })
        .collect()
}

fn efficiency_issues(candidates: &[Candidate], threshold: f64) -> Vec<EfficiencyIssue> {
    let mut flagged: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.efficiency < threshold)
        .collect();
    flagged.sort_by(|a, b| {
        a.efficiency
            .partial_cmp(&b.efficiency)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.row.entity_id.cmp(&b.row.entity_id))
    });

    flagged
        .into_iter()
        .map(|c| EfficiencyIssue {
            entity_id: c.row.entity_id,
            label: c.row.label.clone(),
            report_count: c.row.report_count,
            average_efficiency: c.row.average_efficiency,
            threshold,
        })
        .collect()
}

fn defect_issues(candidates: &[Candidate], threshold: f64) -> Vec<DefectIssue> {
    let mut flagged: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.defect_rate > threshold)
        .collect();
    flagged.sort_by(|a, b| {
        b.defect_rate
            .partial_cmp(&a.defect_rate)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.row.entity_id.cmp(&b.row.entity_id))
    });

    flagged
        .into_iter()
        .map(|c| DefectIssue {
            entity_id: c.row.entity_id,
            label: c.row.label.clone(),
            total_defects: c.row.total_defects,
            total_quantity: c.row.total_quantity,
            defect_rate: c.row.defect_rate,
            threshold,
        })
        .collect()
}

/// Thresholds apply to full-precision averages; reported figures are rounded
pub fn detect_bottlenecks(
    facts: &[ReportFacts],
    machine_labels: &HashMap<Uuid, String>,
    shift_labels: &HashMap<Uuid, String>,
    thresholds: BottleneckThresholds,
) -> Bottlenecks {
    let machines = candidates(facts, RollupDimension::Machine, machine_labels);
    let shifts = candidates(facts, RollupDimension::Shift, shift_labels);

    Bottlenecks {
        low_efficiency_machines: efficiency_issues(&machines, thresholds.efficiency),
        high_defect_machines: defect_issues(&machines, thresholds.defect_rate),
        low_efficiency_shifts: efficiency_issues(&shifts, thresholds.efficiency),
    }
}
