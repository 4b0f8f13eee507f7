//! Alert message composition

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Analysis, Breach, GlobalStatus, Resource};

/// Resources described in summaries and fallback messages
const SUMMARY_RESOURCES: [Resource; 4] =
    [Resource::Cpu, Resource::Ram, Resource::Disk, Resource::Temp];

/// Turns an analysis into alert text
#[async_trait]
pub trait MessageComposer: Send + Sync {
    async fn compose(&self, analysis: &Analysis) -> Result<String>;
}

/// One-line structured summary, e.g.
/// `CPU: 91.0% (critical, increasing) | RAM: 40.2% (normal, stable) | Global status: critical`
pub fn format_summary(analysis: &Analysis) -> String {
    let mut segments: Vec<String> = SUMMARY_RESOURCES
        .iter()
        .filter_map(|r| {
            analysis.get(*r).map(|entry| {
                format!(
                    "{}: {:.1}% ({}, {})",
                    r.as_str().to_uppercase(),
                    entry.current,
                    entry.anomaly.breach,
                    entry.trend
                )
            })
        })
        .collect();
    segments.push(format!("Global status: {}", analysis.status));
    segments.join(" | ")
}

/// Fixed wording that needs no external service
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackComposer;

impl FallbackComposer {
    pub fn message(&self, analysis: &Analysis) -> String {
        let first_with = |breach: Breach| {
            SUMMARY_RESOURCES
                .into_iter()
                .find(|r| analysis.get(*r).is_some_and(|e| e.anomaly.breach == breach))
        };

        if let Some(resource) = first_with(Breach::Critical) {
            return format!("Alert: {} critical.", resource);
        }
        if let Some(resource) = first_with(Breach::Warning) {
            return format!("Alert: {} high.", resource);
        }
        if analysis.status == GlobalStatus::Spike {
            return "Alert: system spike detected.".to_string();
        }
        "System alert.".to_string()
    }
}

#[async_trait]
impl MessageComposer for FallbackComposer {
    async fn compose(&self, analysis: &Analysis) -> Result<String> {
        Ok(self.message(analysis))
    }
}
