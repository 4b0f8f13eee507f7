//! Alert gating
//!
//! Decides whether an abnormal analysis should become a user-facing alert:
//! - Normal ticks refresh the stability clock and never alert
//! - A global rate limit spaces emitted alerts
//! - The abnormal condition must persist for a stability period first
//! - Conditions already alerted on (same dedup key) are suppressed

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::buffer::RingBuffer;
use crate::models::{AlertRecord, Analysis, Resource};

/// Fixed-width key identifying "the same alert condition".
///
/// SHA-256 of each resource's tag and current value rounded to one
/// decimal, in fixed resource order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DedupKey([u8; 32]);

impl DedupKey {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let digest = Sha256::digest(Self::canonical(analysis).as_bytes());
        Self(digest.into())
    }

    /// Canonical form hashed into the key. Resources absent from the
    /// analysis render as `-` so they never collide with a zero reading.
    pub fn canonical(analysis: &Analysis) -> String {
        Resource::ALL
            .iter()
            .map(|r| match analysis.current(*r) {
                Some(value) => format!("{}:{:.1}|", r.tag(), value),
                None => format!("{}:-|", r.tag()),
            })
            .collect()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DedupKey({})", &hex::encode(self.0)[..12])
    }
}

impl Serialize for DedupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for DedupKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&s, &mut bytes).map_err(serde::de::Error::custom)?;
        Ok(Self(bytes))
    }
}

/// Outcome of evaluating one analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Status is normal; stability clock refreshed
    Stable,
    /// Too soon after the previous alert
    RateLimited,
    /// Abnormal for less than the stability period
    Cooling,
    /// Same condition already alerted on
    Duplicate,
    /// Alert should be emitted
    Emit,
}

impl GateDecision {
    pub fn is_emit(&self) -> bool {
        matches!(self, GateDecision::Emit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GateDecision::Stable => "stable",
            GateDecision::RateLimited => "rate_limited",
            GateDecision::Cooling => "cooling",
            GateDecision::Duplicate => "duplicate",
            GateDecision::Emit => "emit",
        }
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debounce, stability gating and deduplication state
#[derive(Debug, Clone)]
pub struct AlertGate {
    min_alert_interval: Duration,
    stability_period: Duration,
    last_alert_time: Option<DateTime<Utc>>,
    last_stable_time: DateTime<Utc>,
    history: RingBuffer<AlertRecord>,
}

impl AlertGate {
    /// Create a gate whose stability clock starts at `started_at`
    pub fn new(
        min_alert_interval: Duration,
        stability_period: Duration,
        history_capacity: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            min_alert_interval,
            stability_period,
            last_alert_time: None,
            last_stable_time: started_at,
            history: RingBuffer::new(history_capacity),
        }
    }

    /// Evaluate `analysis` at `now`, refreshing the stability clock on
    /// normal status
    pub fn evaluate(&mut self, analysis: &Analysis, now: DateTime<Utc>) -> GateDecision {
        if analysis.is_normal() {
            self.last_stable_time = now;
            return GateDecision::Stable;
        }

        if let Some(last) = self.last_alert_time {
            if now - last < self.min_alert_interval {
                return GateDecision::RateLimited;
            }
        }

        if now - self.last_stable_time < self.stability_period {
            return GateDecision::Cooling;
        }

        if self.is_duplicate(&DedupKey::from_analysis(analysis)) {
            return GateDecision::Duplicate;
        }

        GateDecision::Emit
    }

    pub fn should_alert(&mut self, analysis: &Analysis, now: DateTime<Utc>) -> bool {
        self.evaluate(analysis, now).is_emit()
    }

    /// Record an alert that was actually emitted downstream
    pub fn record_alert(
        &mut self,
        analysis: &Analysis,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> AlertRecord {
        let record = AlertRecord {
            timestamp: now,
            key: DedupKey::from_analysis(analysis),
            message: message.into(),
            severity: analysis.status,
        };
        self.history.push(record.clone());
        self.last_alert_time = Some(now);
        record
    }

    pub fn is_duplicate(&self, key: &DedupKey) -> bool {
        self.history.iter().any(|record| record.key == *key)
    }

    /// Retained alerts, oldest first
    pub fn history(&self) -> impl DoubleEndedIterator<Item = &AlertRecord> + '_ {
        self.history.iter()
    }

    pub fn last_alert_time(&self) -> Option<DateTime<Utc>> {
        self.last_alert_time
    }

    pub fn last_stable_time(&self) -> DateTime<Utc> {
        self.last_stable_time
    }
}
