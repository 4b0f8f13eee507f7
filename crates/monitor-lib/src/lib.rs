//! Resource monitoring library
//!
//! This crate provides the core functionality for:
//! - Bounded per-resource metric history
//! - Trend, spike and threshold analysis
//! - Alert gating (rate limit, stability period, deduplication)
//! - Host metric collection and the polling loop
//! - Health checks and observability

pub mod anomaly;
pub mod buffer;
pub mod clock;
pub mod collector;
pub mod config;
pub mod health;
pub mod models;
pub mod notify;
pub mod observability;

pub use anomaly::{Analyzer, GateDecision};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ConfigError, MonitorConfig, ResourceThresholds, ThresholdConfig, ThresholdDirection,
};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{MonitorMetrics, StructuredLogger};
