use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::stats::mean;
use crate::models::ReportFacts;
use crate::services::derived_metrics::round2;

/// One bucket of a time series; `bucket` is `YYYY-MM-DD` or `YYYY-Www`
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendPoint {
    pub bucket: String,
    pub report_count: u64,
    pub total_quantity: i64,
    pub average_efficiency: f64,
    pub total_yard: f64,
}

#[derive(Default)]
struct Accumulator {
    efficiencies: Vec<f64>,
    quantity: i64,
    yard: f64,
}

impl Accumulator {
    fn push(&mut self, fact: &ReportFacts) {
        self.efficiencies.push(fact.efficiency_percentage);
        self.quantity += fact.actual_quantity as i64;
        self.yard += fact.total_yard;
    }

    fn into_point(self, bucket: String) -> TrendPoint {
        TrendPoint {
            bucket,
            report_count: self.efficiencies.len() as u64,
            total_quantity: self.quantity,
            average_efficiency: round2(mean(&self.efficiencies)),
            total_yard: round2(self.yard),
        }
    }
}

/// Per calendar day, ascending
pub fn daily_trend(facts: &[ReportFacts]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<chrono::NaiveDate, Accumulator> = BTreeMap::new();
    for fact in facts {
        buckets.entry(fact.production_date).or_default().push(fact);
    }

    buckets
        .into_iter()
        .map(|(day, acc)| acc.into_point(day.format("%Y-%m-%d").to_string()))
        .collect()
}

/// Per ISO year-week, ascending
pub fn weekly_trend(facts: &[ReportFacts]) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<(i32, u32), Accumulator> = BTreeMap::new();
    for fact in facts {
        let week = fact.production_date.iso_week();
        buckets
            .entry((week.year(), week.week()))
            .or_default()
            .push(fact);
    }

    buckets
        .into_iter()
        .map(|((year, week), acc)| acc.into_point(format!("{}-W{:02}", year, week)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics::test_support::fact;

    #[test]
    fn daily_buckets_are_sorted_and_summed() {
        let facts = vec![fact(2, 80, 100), fact(0, 90, 100), fact(2, 100, 100)];
        let trend = daily_trend(&facts);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].bucket, "2026-10-01");
        assert_eq!(trend[1].bucket, "2026-10-03");
        assert_eq!(trend[1].report_count, 2);
        assert_eq!(trend[1].total_quantity, 180);
        assert_eq!(trend[1].average_efficiency, 90.0);
    }

    #[test]
    fn weekly_buckets_follow_iso_weeks() {
        // 2026-10-04 is a Sunday, 2026-10-05 a Monday
        let facts = vec![fact(3, 50, 100), fact(4, 70, 100)];
        let trend = weekly_trend(&facts);

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].bucket, "2026-W40");
        assert_eq!(trend[1].bucket, "2026-W41");
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(daily_trend(&[]).is_empty());
        assert!(weekly_trend(&[]).is_empty());
    }
}
