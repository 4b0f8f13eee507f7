//! Metrics collection and the polling loop
//!
//! Collectors read host resource usage as percentages (temperature in °C).
//! Resources a host cannot report are left out of the readings rather than
//! zero-filled.

mod board;
mod r#loop;
mod system;

pub use board::{StatusBoard, StatusSnapshot};
pub use r#loop::{LoopConfig, MonitorLoop, MonitorLoopBuilder, TickReport};
pub use system::SystemCollector;

use crate::models::MetricReading;
use anyhow::Result;

pub use async_trait::async_trait;

/// Trait for metrics collection implementations
#[async_trait]
pub trait MetricsCollector: Send + Sync {
    /// Read every resource this host can report, all stamped with one timestamp
    async fn collect(&self) -> Result<Vec<MetricReading>>;
}
