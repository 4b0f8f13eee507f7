//! Trend classification
//!
//! Fits a least-squares line of value against sample index and labels the
//! direction by its slope.

use crate::config::DEFAULT_TREND_SLOPE_THRESHOLD;
use crate::models::TrendLabel;

/// Minimum samples required before a direction is reported
const MIN_SAMPLES_FOR_TREND: usize = 3;

/// Labels a value sequence as increasing, decreasing or stable
#[derive(Debug, Clone, Copy)]
pub struct TrendEstimator {
    /// Slope (per sample step) beyond which the series is moving
    pub slope_threshold: f64,
}

impl TrendEstimator {
    pub fn new(slope_threshold: f64) -> Self {
        Self { slope_threshold }
    }

    /// Classify `values` (newest last)
    pub fn classify(&self, values: &[f64]) -> TrendLabel {
        if values.len() < MIN_SAMPLES_FOR_TREND {
            return TrendLabel::Stable;
        }

        match linear_regression_slope(values) {
            Some(slope) if slope > self.slope_threshold => TrendLabel::Increasing,
            Some(slope) if slope < -self.slope_threshold => TrendLabel::Decreasing,
            _ => TrendLabel::Stable,
        }
    }
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_SLOPE_THRESHOLD)
    }
}

/// Least-squares slope of `values` against their index.
///
/// `None` when the fit is degenerate or not finite.
pub fn linear_regression_slope(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return None;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;

    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    slope.is_finite().then_some(slope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sequences_are_stable() {
        let estimator = TrendEstimator::default();
        assert_eq!(estimator.classify(&[]), TrendLabel::Stable);
        assert_eq!(estimator.classify(&[10.0]), TrendLabel::Stable);
        assert_eq!(estimator.classify(&[10.0, 90.0]), TrendLabel::Stable);
    }

    #[test]
    fn test_increasing() {
        let estimator = TrendEstimator::default();
        assert_eq!(estimator.classify(&[10.0, 11.0, 12.0]), TrendLabel::Increasing);
    }

    #[test]
    fn test_decreasing() {
        let estimator = TrendEstimator::default();
        assert_eq!(estimator.classify(&[50.0, 40.0, 35.0, 20.0]), TrendLabel::Decreasing);
    }

    #[test]
    fn test_small_slope_is_stable() {
        let estimator = TrendEstimator::default();
        // slope 0.4 per step
        assert_eq!(estimator.classify(&[10.0, 10.4, 10.8, 11.2]), TrendLabel::Stable);
        assert_eq!(estimator.classify(&[60.0, 62.0, 61.0, 60.5]), TrendLabel::Stable);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let estimator = TrendEstimator::new(1.0);
        assert_eq!(estimator.classify(&[0.0, 1.0, 2.0]), TrendLabel::Stable);
        assert_eq!(estimator.classify(&[2.0, 1.0, 0.0]), TrendLabel::Stable);
    }

    #[test]
    fn test_slope_value() {
        let slope = linear_regression_slope(&[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert!((slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_is_stable() {
        let estimator = TrendEstimator::default();
        assert_eq!(estimator.classify(&[1.0, f64::NAN, 3.0]), TrendLabel::Stable);
        assert!(linear_regression_slope(&[5.0]).is_none());
    }
}
