//! Analysis and alert-decision engine
//!
//! This module provides:
//! - Bounded per-resource sample history
//! - Trend classification (least-squares slope)
//! - Threshold breach and spike detection
//! - Global status aggregation
//! - Alert gating (debounce, stability period, deduplication)
//! - The `Analyzer` that runs them as one per-tick pipeline

mod analyzer;
mod detector;
mod gate;
mod history;
mod status;
mod trend;

pub use analyzer::Analyzer;
pub use detector::{AnomalyDetector, MIN_SAMPLES_FOR_SPIKE};
pub use gate::{AlertGate, DedupKey, GateDecision};
pub use history::MetricHistory;
pub use status::{StatusAggregator, StatusVerdict};
pub use trend::{linear_regression_slope, TrendEstimator};
