//! Derived production figures computed from raw operator measurements.
//!
//! Every create and update recomputes all three figures from the raw inputs;
//! values already stored on a report are never read back.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Converts fabric length (m) times width (cm) into yards
pub const YARD_DIVISOR: f64 = 91.44;

/// Raw inputs the derived figures depend on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMeasurements {
    pub target_quantity: i32,
    pub actual_quantity: i32,
    pub fabric_length_m: f64,
    pub fabric_width_cm: f64,
    pub cutting_start: Option<DateTime<Utc>>,
    pub cutting_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub total_yard: f64,
    pub duration_minutes: Option<i32>,
    pub efficiency_percentage: f64,
}

pub struct MetricsEngine;

impl MetricsEngine {
    pub fn compute(raw: &RawMeasurements) -> DerivedMetrics {
        DerivedMetrics {
            total_yard: total_yard(raw.fabric_length_m, raw.fabric_width_cm),
            duration_minutes: duration_minutes(raw.cutting_start, raw.cutting_end),
            efficiency_percentage: efficiency_percentage(raw.actual_quantity, raw.target_quantity),
        }
    }
}

/// Fabric length (m) times width (cm), divided by 91.44
pub fn total_yard(fabric_length_m: f64, fabric_width_cm: f64) -> f64 {
    (fabric_length_m * fabric_width_cm) / YARD_DIVISOR
}

/// Whole minutes between start and end; `None` unless both are present
pub fn duration_minutes(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<i32> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let minutes = (end - start).num_minutes();
            Some(minutes.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        }
        _ => None,
    }
}

/// `actual / target * 100`, or 0 when there is no positive target
pub fn efficiency_percentage(actual_quantity: i32, target_quantity: i32) -> f64 {
    if target_quantity > 0 {
        actual_quantity as f64 / target_quantity as f64 * 100.0
    } else {
        0.0
    }
}

/// Presentation rounding; stored values keep full precision
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, hour, minute, second).unwrap()
    }

    #[test]
    fn computes_floor_sample() {
        let derived = MetricsEngine::compute(&RawMeasurements {
            target_quantity: 100,
            actual_quantity: 95,
            fabric_length_m: 10.0,
            fabric_width_cm: 150.0,
            cutting_start: Some(at(8, 0, 0)),
            cutting_end: Some(at(9, 30, 0)),
        });

        assert_eq!(round2(derived.total_yard), 16.40);
        assert_eq!(derived.efficiency_percentage, 95.0);
        assert_eq!(derived.duration_minutes, Some(90));
    }

    #[rstest]
    #[case(100, 0, 0.0)]
    #[case(0, 0, 0.0)]
    #[case(50, -5, 0.0)]
    #[case(120, 100, 120.0)]
    #[case(3, 4, 75.0)]
    fn efficiency_guards_non_positive_target(
        #[case] actual: i32,
        #[case] target: i32,
        #[case] expected: f64,
    ) {
        assert_eq!(efficiency_percentage(actual, target), expected);
    }

    #[test]
    fn duration_needs_both_timestamps() {
        assert_eq!(duration_minutes(Some(at(8, 0, 0)), None), None);
        assert_eq!(duration_minutes(None, Some(at(8, 0, 0))), None);
        assert_eq!(duration_minutes(None, None), None);
    }

    #[test]
    fn duration_truncates_partial_minutes() {
        let start = at(8, 0, 0);
        assert_eq!(
            duration_minutes(Some(start), Some(start + Duration::seconds(119))),
            Some(1)
        );
        assert_eq!(duration_minutes(Some(start), Some(start)), Some(0));
    }

    #[test]
    fn yardage_has_no_unit_inference() {
        assert_eq!(total_yard(0.0, 150.0), 0.0);
        assert!((total_yard(91.44, 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rounding_is_for_presentation_only() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(16.404_199), 16.40);
    }
}
