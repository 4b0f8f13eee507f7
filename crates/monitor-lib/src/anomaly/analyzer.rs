//! Per-tick analysis pipeline
//!
//! `update` every reading of a tick, then `analyze` once, then
//! `should_alert` and, only if the alert was really delivered,
//! `record_alert` with the same `Analysis` instance.
//!
//! The analyzer does no locking and no I/O. Callers that feed readings from
//! several threads must guard the whole tick with a single lock.

use std::collections::BTreeMap;

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, MonitorConfig};
use crate::models::{AlertRecord, Analysis, MetricReading, Resource, ResourceAnalysis};

use super::{
    AlertGate, AnomalyDetector, GateDecision, MetricHistory, StatusAggregator, TrendEstimator,
};

/// Analysis and alert-decision engine for one monitored host
pub struct Analyzer<C: Clock = SystemClock> {
    config: MonitorConfig,
    history: MetricHistory,
    trend: TrendEstimator,
    detector: AnomalyDetector,
    aggregator: StatusAggregator,
    gate: AlertGate,
    clock: C,
}

impl Analyzer<SystemClock> {
    pub fn new(config: MonitorConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Analyzer<C> {
    /// Create an analyzer with an explicit time source
    pub fn with_clock(config: MonitorConfig, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;

        let gate = AlertGate::new(
            config.min_alert_interval()?,
            config.stability_period()?,
            config.alert_history_capacity,
            clock.now(),
        );

        Ok(Self {
            history: MetricHistory::new(config.history),
            trend: TrendEstimator::new(config.trend_slope_threshold),
            detector: AnomalyDetector::new(config.thresholds.clone()),
            aggregator: StatusAggregator,
            gate,
            clock,
            config,
        })
    }

    /// Route one reading into its resource history
    pub fn update(&mut self, reading: MetricReading) {
        self.history.append(reading);
    }

    /// Build a fresh snapshot from current history.
    ///
    /// Resources with no samples are left out.
    pub fn analyze(&self) -> Analysis {
        let mut resources = BTreeMap::new();
        let mut anomalies = BTreeMap::new();

        for resource in Resource::ALL {
            let Some(current) = self.history.latest(resource) else {
                continue;
            };
            let values = self.history.values(resource);
            let anomaly = self.detector.detect(resource, &values, current);

            anomalies.insert(resource, anomaly);
            resources.insert(
                resource,
                ResourceAnalysis {
                    current,
                    trend: self.trend.classify(&values),
                    anomaly,
                },
            );
        }

        let verdict = self.aggregator.aggregate(&anomalies);

        Analysis {
            generated_at: self.clock.now(),
            resources,
            status: verdict.status,
            cause: verdict.cause,
        }
    }

    /// Gate decision with the suppression reason
    pub fn evaluate(&mut self, analysis: &Analysis) -> GateDecision {
        let now = self.clock.now();
        self.gate.evaluate(analysis, now)
    }

    pub fn should_alert(&mut self, analysis: &Analysis) -> bool {
        self.evaluate(analysis).is_emit()
    }

    /// Record an alert that was emitted downstream for `analysis`
    pub fn record_alert(&mut self, analysis: &Analysis, message: impl Into<String>) -> AlertRecord {
        let now = self.clock.now();
        self.gate.record_alert(analysis, message, now)
    }

    /// Retained alerts, oldest first
    pub fn alert_history(&self) -> impl DoubleEndedIterator<Item = &AlertRecord> + '_ {
        self.gate.history()
    }

    pub fn history(&self) -> &MetricHistory {
        &self.history
    }

    pub fn gate(&self) -> &AlertGate {
        &self.gate
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
