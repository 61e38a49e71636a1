use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::stats::linear_fit;
use super::window::DateWindow;
use crate::models::ReportFacts;
use crate::services::derived_metrics::round2;

/// Minimum daily points before a line is fitted
pub const MIN_FORECAST_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    fn from_points(points: usize) -> Self {
        if points >= 7 {
            Confidence::High
        } else if points >= 5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductionForecast {
    pub data_points: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Fitted production for the first day after the window
    pub daily_estimate: f64,
    pub next_7_days: f64,
    pub next_30_days: f64,
    pub trend_direction: TrendDirection,
    pub confidence: Confidence,
}

impl ProductionForecast {
    fn insufficient(data_points: usize) -> Self {
        Self {
            data_points,
            slope: 0.0,
            intercept: 0.0,
            daily_estimate: 0.0,
            next_7_days: 0.0,
            next_30_days: 0.0,
            trend_direction: TrendDirection::Stable,
            confidence: Confidence::Low,
        }
    }
}

/// Fits daily total production against the day index inside `window`.
///
/// The fitted value one day past the window end is the daily estimate; the
/// 7 and 30 day figures scale that single estimate. Negative estimates are
/// floored at zero.
pub fn forecast(
    window: DateWindow,
    facts: &[ReportFacts],
    slope_threshold: f64,
) -> ProductionForecast {
    let mut daily: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
    for fact in facts.iter().filter(|f| window.contains(f.production_date)) {
        *daily.entry(fact.production_date).or_default() += fact.actual_quantity as i64;
    }

    let points: Vec<(f64, f64)> = daily
        .iter()
        .map(|(day, total)| (window.day_index(*day) as f64, *total as f64))
        .collect();

    if points.len() < MIN_FORECAST_POINTS {
        return ProductionForecast::insufficient(points.len());
    }

    let Some((slope, intercept)) = linear_fit(&points) else {
        return ProductionForecast::insufficient(points.len());
    };

    let next_day = window.length_days() as f64;
    let daily_estimate = (intercept + slope * next_day).max(0.0);

    let trend_direction = if slope > slope_threshold {
        TrendDirection::Increasing
    } else if slope < -slope_threshold {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    ProductionForecast {
        data_points: points.len(),
        slope: round2(slope),
        intercept: round2(intercept),
        daily_estimate: round2(daily_estimate),
        next_7_days: round2(daily_estimate * 7.0),
        next_30_days: round2(daily_estimate * 30.0),
        trend_direction,
        confidence: Confidence::from_points(points.len()),
    }
}
