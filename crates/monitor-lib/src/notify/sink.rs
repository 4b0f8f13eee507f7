//! Alert delivery

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::models::Analysis;

/// Delivers an alert message downstream.
///
/// Returning `Ok` means the alert reached the user; only then is it
/// recorded for rate limiting and deduplication.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, analysis: &Analysis, message: &str) -> Result<()>;
}

/// Writes alerts to the log
#[derive(Debug, Clone)]
pub struct LogSink {
    host_name: String,
}

impl LogSink {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }
}

#[async_trait]
impl AlertSink for LogSink {
    async fn deliver(&self, analysis: &Analysis, message: &str) -> Result<()> {
        warn!(
            event = "alert",
            host = %self.host_name,
            status = %analysis.status,
            cause = ?analysis.cause,
            "{}",
            message
        );
        Ok(())
    }
}
