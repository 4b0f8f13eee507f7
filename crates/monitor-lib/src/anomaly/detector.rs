//! Threshold breach and spike detection
//!
//! A spike is a current value deviating from the mean of the three samples
//! before it by more than the resource's spike threshold. Breaches compare
//! the current value against warning/critical thresholds, critical first.

use crate::config::ThresholdConfig;
use crate::models::{Anomaly, Breach, Resource};

/// Minimum history length (including the current sample) for spike detection
pub const MIN_SAMPLES_FOR_SPIKE: usize = 4;

/// Number of samples preceding the current one that form the baseline
const SPIKE_BASELINE_WINDOW: usize = 3;

/// Flags breaches and spikes per resource
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    thresholds: ThresholdConfig,
}

impl AnomalyDetector {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Detect anomalies for `resource`.
    ///
    /// `values` is the ordered history, newest last, ending with `current`.
    /// Unconfigured resources never breach or spike. A configured resource
    /// without a spike limit flags any deviation from its baseline.
    pub fn detect(&self, resource: Resource, values: &[f64], current: f64) -> Anomaly {
        let Some(thresholds) = self.thresholds.get(resource) else {
            return Anomaly::default();
        };

        let spike = baseline_mean(values)
            .map(|mean| (current - mean).abs() > thresholds.spike_threshold())
            .unwrap_or(false);

        Anomaly {
            spike,
            breach: thresholds.breach(current),
        }
    }

    /// Breach level alone, without spike evaluation
    pub fn breach(&self, resource: Resource, current: f64) -> Breach {
        self.thresholds
            .get(resource)
            .map(|t| t.breach(current))
            .unwrap_or(Breach::None)
    }
}

/// Mean of the samples immediately preceding the newest one
fn baseline_mean(values: &[f64]) -> Option<f64> {
    if values.len() < MIN_SAMPLES_FOR_SPIKE {
        return None;
    }

    let end = values.len() - 1;
    let window = &values[end - SPIKE_BASELINE_WINDOW..end];
    Some(window.iter().sum::<f64>() / SPIKE_BASELINE_WINDOW as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceThresholds;

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(ThresholdConfig::default())
    }

    #[test]
    fn test_critical_breach() {
        let anomaly = detector().detect(Resource::Cpu, &[60.0, 62.0, 61.0, 90.0], 90.0);
        assert_eq!(anomaly.breach, Breach::Critical);
        assert!(anomaly.spike);
    }

    #[test]
    fn test_warning_breach_without_spike() {
        let anomaly = detector().detect(Resource::Cpu, &[72.0, 74.0, 73.0, 75.0], 75.0);
        assert_eq!(anomaly.breach, Breach::Warning);
        assert!(!anomaly.spike);
    }

    #[test]
    fn test_spike_needs_four_samples() {
        let anomaly = detector().detect(Resource::Cpu, &[10.0, 10.0, 60.0], 60.0);
        assert!(!anomaly.spike);
    }

    #[test]
    fn test_spike_baseline_excludes_current_and_older_samples() {
        // Baseline is mean(20, 20, 20) = 20, the leading 90 is ignored
        let anomaly = detector().detect(Resource::Cpu, &[90.0, 20.0, 20.0, 20.0, 30.0], 30.0);
        assert!(!anomaly.spike);

        let anomaly = detector().detect(Resource::Cpu, &[90.0, 20.0, 20.0, 20.0, 36.0], 36.0);
        assert!(anomaly.spike);
    }

    #[test]
    fn test_spike_is_symmetric() {
        let anomaly = detector().detect(Resource::Ram, &[60.0, 60.0, 60.0, 40.0], 40.0);
        assert!(anomaly.spike);
        assert_eq!(anomaly.breach, Breach::None);
    }

    #[test]
    fn test_spike_threshold_is_exclusive() {
        let anomaly = detector().detect(Resource::Cpu, &[10.0, 10.0, 10.0, 25.0], 25.0);
        assert!(!anomaly.spike);
    }

    #[test]
    fn test_no_spike_threshold_flags_any_change() {
        let anomaly = detector().detect(Resource::Disk, &[10.0, 10.0, 10.0, 80.0], 80.0);
        assert!(anomaly.spike);
        assert_eq!(anomaly.breach, Breach::None);

        let anomaly = detector().detect(Resource::Temp, &[40.0, 40.0, 40.0, 40.0], 40.0);
        assert!(!anomaly.spike);
    }

    #[test]
    fn test_unconfigured_resource_never_breaches() {
        let detector = AnomalyDetector::new(
            ThresholdConfig::empty().with(Resource::Cpu, ResourceThresholds::above(70.0, 85.0)),
        );
        let anomaly = detector.detect(Resource::Gpu, &[0.0, 0.0, 0.0, 1e9], 1e9);
        assert_eq!(anomaly, Anomaly::default());
        assert_eq!(detector.breach(Resource::Temp, 500.0), Breach::None);
    }

    #[test]
    fn test_nan_degrades_to_no_anomaly() {
        let anomaly = detector().detect(Resource::Cpu, &[10.0, 10.0, 10.0, f64::NAN], f64::NAN);
        assert_eq!(anomaly, Anomaly::default());
    }

    #[test]
    fn test_low_battery() {
        let anomaly = detector().detect(Resource::Battery, &[12.0], 12.0);
        assert_eq!(anomaly.breach, Breach::Critical);
        let anomaly = detector().detect(Resource::Battery, &[95.0], 95.0);
        assert_eq!(anomaly.breach, Breach::None);
    }
}
