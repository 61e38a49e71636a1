use serde::Serialize;
use utoipa::ToSchema;

use super::stats::{growth_percent, mean};
use super::window::DateWindow;
use crate::models::{ReportFacts, ReportStatus};
use crate::services::derived_metrics::round2;

/// Reports per status in the window, approved or not
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub draft: u64,
    pub submitted: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

impl StatusCounts {
    pub fn from_rows(rows: &[(ReportStatus, i64)]) -> Self {
        let mut counts = StatusCounts::default();
        for &(status, count) in rows {
            let count = count.max(0) as u64;
            match status {
                ReportStatus::Draft => counts.draft += count,
                ReportStatus::Submitted => counts.submitted += count,
                ReportStatus::Approved => counts.approved += count,
                ReportStatus::Rejected => counts.rejected += count,
            }
            counts.total += count;
        }
        counts
    }
}

/// Totals over the approved reports of one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PeriodTotals {
    pub report_count: u64,
    pub average_efficiency: f64,
    pub total_quantity: i64,
    pub total_yard: f64,
    pub total_defects: i64,
}

impl PeriodTotals {
    pub fn from_facts(facts: &[ReportFacts]) -> Self {
        let efficiencies: Vec<f64> = facts.iter().map(|f| f.efficiency_percentage).collect();
        Self {
            report_count: facts.len() as u64,
            average_efficiency: round2(mean(&efficiencies)),
            total_quantity: facts.iter().map(|f| f.actual_quantity as i64).sum(),
            total_yard: round2(facts.iter().map(|f| f.total_yard).sum()),
            total_defects: facts.iter().map(|f| f.defect_count as i64).sum(),
        }
    }
}

/// Percentage change of each total against the previous window
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Growth {
    pub report_count: f64,
    pub average_efficiency: f64,
    pub total_quantity: f64,
    pub total_yard: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverviewStats {
    pub window: DateWindow,
    pub previous_window: DateWindow,
    pub status_counts: StatusCounts,
    pub current: PeriodTotals,
    pub previous: PeriodTotals,
    pub growth: Growth,
}

pub fn overview(
    window: DateWindow,
    status_rows: &[(ReportStatus, i64)],
    current: &[ReportFacts],
    previous: &[ReportFacts],
) -> OverviewStats {
    let current_totals = PeriodTotals::from_facts(current);
    let previous_totals = PeriodTotals::from_facts(previous);

    let growth = Growth {
        report_count: round2(growth_percent(
            current_totals.report_count as f64,
            previous_totals.report_count as f64,
        )),
        average_efficiency: round2(growth_percent(
            current_totals.average_efficiency,
            previous_totals.average_efficiency,
        )),
        total_quantity: round2(growth_percent(
            current_totals.total_quantity as f64,
            previous_totals.total_quantity as f64,
        )),
        total_yard: round2(growth_percent(
            current_totals.total_yard,
            previous_totals.total_yard,
        )),
    };

    OverviewStats {
        window,
        previous_window: window.previous(),
        status_counts: StatusCounts::from_rows(status_rows),
        current: current_totals,
        previous: previous_totals,
        growth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::test_support::{fact, window};

    #[test]
    fn empty_windows_yield_zeroes() {
        let stats = overview(window(), &[], &[], &[]);
        assert_eq!(stats.status_counts, StatusCounts::default());
        assert_eq!(stats.current, PeriodTotals::default());
        assert_eq!(stats.growth, Growth::default());
    }

    #[test]
    fn growth_compares_against_previous_window() {
        let current = vec![fact(1, 95, 100), fact(2, 105, 100)];
        let previous = vec![fact(1, 100, 100)];
        let rows = [(ReportStatus::Approved, 2), (ReportStatus::Draft, 3)];

        let stats = overview(window(), &rows, &current, &previous);

        assert_eq!(stats.status_counts.approved, 2);
        assert_eq!(stats.status_counts.draft, 3);
        assert_eq!(stats.status_counts.total, 5);
        assert_eq!(stats.current.total_quantity, 200);
        assert_eq!(stats.current.average_efficiency, 100.0);
        assert_eq!(stats.growth.report_count, 100.0);
        assert_eq!(stats.growth.total_quantity, 100.0);
        assert_eq!(stats.growth.average_efficiency, 0.0);
    }

    #[test]
    fn no_previous_activity_means_zero_growth() {
        let stats = overview(window(), &[], &[fact(1, 50, 100)], &[]);
        assert_eq!(stats.growth.total_quantity, 0.0);
        assert_eq!(stats.previous.report_count, 0);
    }
}
