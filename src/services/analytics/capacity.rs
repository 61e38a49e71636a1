use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use utoipa::ToSchema;
use uuid::Uuid;

use super::rollups::{group_by, RollupDimension};
use super::stats::{percent, ratio};
use super::window::DateWindow;
use crate::models::ReportFacts;
use crate::services::derived_metrics::round2;
use crate::services::master_data::label_or_id;

const HOURS_PER_DAY: f64 = 24.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MachineCapacity {
    pub machine_id: Uuid,
    pub label: String,
    pub operational_hours: f64,
    pub active_days: u64,
    pub average_hours_per_active_day: f64,
    pub utilization_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CapacityUtilization {
    pub elapsed_days: i64,
    pub machine_count: u64,
    pub operational_hours: f64,
    pub available_hours: f64,
    pub utilization_percentage: f64,
    pub machines: Vec<MachineCapacity>,
}

/// Cutting hours against `machines x 24h x elapsed days`, overall and per machine.
///
/// Only machines with at least one approved report in the window count
/// towards the available hours.
pub fn capacity_utilization(
    window: DateWindow,
    facts: &[ReportFacts],
    machine_labels: &HashMap<Uuid, String>,
) -> CapacityUtilization {
    let elapsed_days = window.length_days();
    let hours_per_machine = HOURS_PER_DAY * elapsed_days as f64;

    let mut machines: Vec<MachineCapacity> = group_by(facts, RollupDimension::Machine)
        .into_iter()
        .map(|(machine_id, group)| {
            let hours: f64 = group.iter().map(|f| f.duration_hours()).sum();
            let active_days = group
                .iter()
                .map(|f| f.production_date)
                .collect::<BTreeSet<_>>()
                .len() as u64;

            MachineCapacity {
                machine_id,
                label: label_or_id(machine_labels, machine_id),
                operational_hours: round2(hours),
                active_days,
                average_hours_per_active_day: round2(ratio(hours, active_days as f64)),
                utilization_percentage: round2(percent(hours, hours_per_machine)),
            }
        })
        .collect();

    machines.sort_by(|a, b| {
        b.utilization_percentage
            .partial_cmp(&a.utilization_percentage)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.machine_id.cmp(&b.machine_id))
    });

    let operational_hours: f64 = facts.iter().map(|f| f.duration_hours()).sum();
    let machine_count = machines.len() as u64;
    let available_hours = machine_count as f64 * hours_per_machine;

    CapacityUtilization {
        elapsed_days,
        machine_count,
        operational_hours: round2(operational_hours),
        available_hours: round2(available_hours),
        utilization_percentage: round2(percent(operational_hours, available_hours)),
        machines,
    }
}
