//! Monitor configuration
//!
//! Thresholds, history capacities and alert timing are fixed for the life
//! of an analyzer and validated once when it is constructed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Breach, Resource, Volatility};

/// Default slope (value units per sample step) beyond which a trend is reported
pub const DEFAULT_TREND_SLOPE_THRESHOLD: f64 = 0.5;

/// Default minimum time between two emitted alerts
pub const DEFAULT_MIN_ALERT_INTERVAL_SECS: u64 = 120;

/// Default time the system must stay non-normal before a first alert
pub const DEFAULT_STABILITY_PERIOD_SECS: u64 = 60;

/// Default number of emitted alerts kept for deduplication
pub const DEFAULT_ALERT_HISTORY_CAPACITY: usize = 20;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{resource}: {field} threshold must be a finite, non-negative number (got {value})")]
    InvalidThreshold {
        resource: Resource,
        field: &'static str,
        value: f64,
    },

    #[error("{resource}: critical threshold {critical} is less severe than warning {warning}")]
    InvertedThresholds {
        resource: Resource,
        warning: f64,
        critical: f64,
    },

    #[error("history capacity for {0} resources must be at least 1")]
    ZeroHistoryCapacity(&'static str),

    #[error("alert history capacity must be at least 1")]
    ZeroAlertHistory,

    #[error("trend slope threshold must be finite and non-negative (got {0})")]
    InvalidSlopeThreshold(f64),

    #[error("{field} of {secs}s is out of range")]
    DurationOutOfRange { field: &'static str, secs: u64 },
}

/// Which side of the thresholds is bad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdDirection {
    /// Breach when the value rises past the threshold
    #[default]
    Above,
    /// Breach when the value drops past the threshold (battery charge)
    Below,
}

/// Per-resource thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceThresholds {
    pub warning: f64,
    pub critical: f64,
    /// Maximum deviation from the short-term mean before a spike is flagged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spike: Option<f64>,
    #[serde(default)]
    pub direction: ThresholdDirection,
}

impl ResourceThresholds {
    pub fn above(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            spike: None,
            direction: ThresholdDirection::Above,
        }
    }

    pub fn below(warning: f64, critical: f64) -> Self {
        Self {
            warning,
            critical,
            spike: None,
            direction: ThresholdDirection::Below,
        }
    }

    pub fn with_spike(mut self, spike: f64) -> Self {
        self.spike = Some(spike);
        self
    }

    /// Classify a value, critical taking precedence over warning
    pub fn breach(&self, current: f64) -> Breach {
        let past = |limit: f64| match self.direction {
            ThresholdDirection::Above => current > limit,
            ThresholdDirection::Below => current < limit,
        };

        if past(self.critical) {
            Breach::Critical
        } else if past(self.warning) {
            Breach::Warning
        } else {
            Breach::None
        }
    }

    /// Spike threshold; without one any change from the baseline is a spike
    pub fn spike_threshold(&self) -> f64 {
        self.spike.unwrap_or(0.0)
    }

    fn validate(&self, resource: Resource) -> Result<(), ConfigError> {
        let checks = [
            ("warning", Some(self.warning)),
            ("critical", Some(self.critical)),
            ("spike", self.spike),
        ];
        for (field, value) in checks {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::InvalidThreshold {
                        resource,
                        field,
                        value,
                    });
                }
            }
        }

        let inverted = match self.direction {
            ThresholdDirection::Above => self.critical < self.warning,
            ThresholdDirection::Below => self.critical > self.warning,
        };
        if inverted {
            return Err(ConfigError::InvertedThresholds {
                resource,
                warning: self.warning,
                critical: self.critical,
            });
        }

        Ok(())
    }
}

/// Threshold table keyed by resource.
///
/// A resource without an entry never breaches and never spikes.
///
/// Entries compare `above` their limits unless `direction = "below"` is set.
/// Battery charge is bad when low, so a battery entry must set
/// `direction = "below"` or a warning/critical pair such as 30/15 is rejected
/// as inverted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdConfig {
    entries: BTreeMap<Resource, ResourceThresholds>,
}

impl ThresholdConfig {
    /// Empty table: nothing is ever flagged
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, resource: Resource, thresholds: ResourceThresholds) -> Self {
        self.entries.insert(resource, thresholds);
        self
    }

    pub fn get(&self, resource: Resource) -> Option<&ResourceThresholds> {
        self.entries.get(&resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, &ResourceThresholds)> {
        self.entries.iter().map(|(r, t)| (*r, t))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.entries
            .iter()
            .try_for_each(|(resource, thresholds)| thresholds.validate(*resource))
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::empty()
            .with(Resource::Cpu, ResourceThresholds::above(70.0, 85.0).with_spike(15.0))
            .with(Resource::Ram, ResourceThresholds::above(70.0, 85.0).with_spike(15.0))
            .with(Resource::Disk, ResourceThresholds::above(90.0, 95.0))
            .with(Resource::Temp, ResourceThresholds::above(60.0, 85.0))
            .with(Resource::Gpu, ResourceThresholds::above(70.0, 90.0).with_spike(20.0))
            .with(Resource::Battery, ResourceThresholds::below(30.0, 15.0))
    }
}

/// Sample history capacity per volatility class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCapacity {
    /// cpu, ram
    pub fast: usize,
    /// disk, temp, gpu, battery
    pub slow: usize,
}

impl HistoryCapacity {
    pub fn for_resource(&self, resource: Resource) -> usize {
        match resource.volatility() {
            Volatility::Fast => self.fast,
            Volatility::Slow => self.slow,
        }
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self { fast: 30, slow: 10 }
    }
}

/// Complete analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub thresholds: ThresholdConfig,
    pub history: HistoryCapacity,
    pub alert_history_capacity: usize,
    pub trend_slope_threshold: f64,
    pub min_alert_interval_secs: u64,
    pub stability_period_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            thresholds: ThresholdConfig::default(),
            history: HistoryCapacity::default(),
            alert_history_capacity: DEFAULT_ALERT_HISTORY_CAPACITY,
            trend_slope_threshold: DEFAULT_TREND_SLOPE_THRESHOLD,
            min_alert_interval_secs: DEFAULT_MIN_ALERT_INTERVAL_SECS,
            stability_period_secs: DEFAULT_STABILITY_PERIOD_SECS,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;

        if self.history.fast == 0 {
            return Err(ConfigError::ZeroHistoryCapacity("fast"));
        }
        if self.history.slow == 0 {
            return Err(ConfigError::ZeroHistoryCapacity("slow"));
        }
        if self.alert_history_capacity == 0 {
            return Err(ConfigError::ZeroAlertHistory);
        }
        if !self.trend_slope_threshold.is_finite() || self.trend_slope_threshold < 0.0 {
            return Err(ConfigError::InvalidSlopeThreshold(self.trend_slope_threshold));
        }

        self.min_alert_interval()?;
        self.stability_period()?;
        Ok(())
    }

    pub fn min_alert_interval(&self) -> Result<chrono::Duration, ConfigError> {
        to_duration("min_alert_interval", self.min_alert_interval_secs)
    }

    pub fn stability_period(&self) -> Result<chrono::Duration, ConfigError> {
        to_duration("stability_period", self.stability_period_secs)
    }
}

fn to_duration(field: &'static str, secs: u64) -> Result<chrono::Duration, ConfigError> {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or(ConfigError::DurationOutOfRange { field, secs })
}
