//! Latest analysis shared with the API

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::{AlertRecord, Analysis};

/// What `/status` returns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub analysis: Option<Analysis>,
    /// Retained alerts, oldest first
    pub alerts: Vec<AlertRecord>,
}

/// Shared, cloneable view of the monitor's latest state
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    inner: Arc<RwLock<StatusSnapshot>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish_analysis(&self, analysis: Analysis) {
        self.inner.write().await.analysis = Some(analysis);
    }

    pub async fn publish_alerts(&self, alerts: Vec<AlertRecord>) {
        self.inner.write().await.alerts = alerts;
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        self.inner.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GlobalStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_board_starts_empty() {
        let board = StatusBoard::new();
        let snapshot = board.snapshot().await;
        assert!(snapshot.analysis.is_none());
        assert!(snapshot.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let board = StatusBoard::new();
        let reader = board.clone();

        board
            .publish_analysis(Analysis {
                generated_at: Utc::now(),
                resources: BTreeMap::new(),
                status: GlobalStatus::Spike,
                cause: None,
            })
            .await;

        let snapshot = reader.snapshot().await;
        assert_eq!(snapshot.analysis.map(|a| a.status), Some(GlobalStatus::Spike));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(StatusSnapshot::default()).unwrap();
        assert!(json["analysis"].is_null());
        assert!(json["alerts"].as_array().unwrap().is_empty());
    }
}
