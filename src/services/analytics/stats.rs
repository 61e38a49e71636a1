//! Small numeric helpers shared by the aggregations. Every ratio treats a
//! zero denominator as a zero result.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for fewer than two samples
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn percent(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// `(current - previous) / previous * 100`, 0 when there is no previous value
pub fn growth_percent(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Ordinary least-squares fit of `y = intercept + slope * x`.
///
/// Returns `None` when fewer than two points are given or all `x` are equal.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;

    for &(x, y) in points {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[42.0]), 0.0);
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(growth_percent(10.0, 0.0), 0.0);
    }

    #[test]
    fn std_dev_is_population_form() {
        // mean 5, squared deviations sum to 32 over 8 samples
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_std_dev(&values), 2.0);
    }

    #[test]
    fn growth_is_signed() {
        assert_eq!(growth_percent(150.0, 100.0), 50.0);
        assert_eq!(growth_percent(50.0, 100.0), -50.0);
    }

    #[test]
    fn fit_recovers_exact_line() {
        let points = [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0), (3.0, 40.0)];
        let (slope, intercept) = linear_fit(&points).unwrap();
        assert!((slope - 10.0).abs() < 1e-9);
        assert!((intercept - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fit_needs_spread_in_x() {
        assert!(linear_fit(&[(1.0, 1.0)]).is_none());
        assert!(linear_fit(&[(2.0, 1.0), (2.0, 5.0)]).is_none());
    }
}
