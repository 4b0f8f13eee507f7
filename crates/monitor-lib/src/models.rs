//! Core data models for the resource monitor

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A monitored system quantity.
///
/// Variant order is the fixed iteration order used by status aggregation
/// and the alert dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Cpu,
    Ram,
    Disk,
    Temp,
    Gpu,
    Battery,
}

/// How quickly a resource's readings move, which sizes its history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volatility {
    Fast,
    Slow,
}

impl Resource {
    pub const COUNT: usize = 6;

    /// All resources in fixed order
    pub const ALL: [Resource; Self::COUNT] = [
        Resource::Cpu,
        Resource::Ram,
        Resource::Disk,
        Resource::Temp,
        Resource::Gpu,
        Resource::Battery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Cpu => "cpu",
            Resource::Ram => "ram",
            Resource::Disk => "disk",
            Resource::Temp => "temp",
            Resource::Gpu => "gpu",
            Resource::Battery => "battery",
        }
    }

    /// Short tag used in dedup keys
    pub fn tag(&self) -> &'static str {
        match self {
            Resource::Cpu => "cpu",
            Resource::Ram => "ram",
            Resource::Disk => "dis",
            Resource::Temp => "tem",
            Resource::Gpu => "gpu",
            Resource::Battery => "bat",
        }
    }

    pub fn volatility(&self) -> Volatility {
        match self {
            Resource::Cpu | Resource::Ram => Volatility::Fast,
            _ => Volatility::Slow,
        }
    }

    /// Whether a spike on this resource may raise the global status.
    /// Disk, temperature and battery move slowly, so a jump there is noise.
    pub fn spike_eligible(&self) -> bool {
        matches!(self, Resource::Cpu | Resource::Ram | Resource::Gpu)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource: {0}")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Resource::Cpu),
            "ram" | "memory" | "mem" => Ok(Resource::Ram),
            "disk" => Ok(Resource::Disk),
            "temp" | "temperature" => Ok(Resource::Temp),
            "gpu" => Ok(Resource::Gpu),
            "battery" => Ok(Resource::Battery),
            _ => Err(UnknownResource(s.to_string())),
        }
    }
}

/// One timestamped reading for a resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub resource: Resource,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Readings pushed in by a collector are stored as-is
pub type MetricReading = MetricSample;

impl MetricSample {
    pub fn new(resource: Resource, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            resource,
            value,
            timestamp,
        }
    }
}

/// Direction of a resource's recent history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendLabel::Increasing => write!(f, "increasing"),
            TrendLabel::Decreasing => write!(f, "decreasing"),
            TrendLabel::Stable => write!(f, "stable"),
        }
    }
}

/// Threshold breach level for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breach {
    #[default]
    None,
    Warning,
    Critical,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::None => write!(f, "normal"),
            Breach::Warning => write!(f, "warning"),
            Breach::Critical => write!(f, "critical"),
        }
    }
}

/// Anomaly flags for one resource at one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Anomaly {
    pub spike: bool,
    pub breach: Breach,
}

/// Global severity, ordered `Normal < Spike < Warning < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalStatus {
    Normal,
    Spike,
    Warning,
    Critical,
}

impl GlobalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalStatus::Normal => "normal",
            GlobalStatus::Spike => "spike",
            GlobalStatus::Warning => "warning",
            GlobalStatus::Critical => "critical",
        }
    }

    /// Numeric level exported as a gauge
    pub fn level(&self) -> i64 {
        match self {
            GlobalStatus::Normal => 0,
            GlobalStatus::Spike => 1,
            GlobalStatus::Warning => 2,
            GlobalStatus::Critical => 3,
        }
    }
}

impl fmt::Display for GlobalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource part of an analysis snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnalysis {
    pub current: f64,
    pub trend: TrendLabel,
    pub anomaly: Anomaly,
}

/// Snapshot produced once per tick.
///
/// Resources that never reported are absent rather than zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub generated_at: DateTime<Utc>,
    pub resources: BTreeMap<Resource, ResourceAnalysis>,
    pub status: GlobalStatus,
    /// First resource, in fixed order, that determined `status`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cause: Option<Resource>,
}

impl Analysis {
    pub fn get(&self, resource: Resource) -> Option<&ResourceAnalysis> {
        self.resources.get(&resource)
    }

    pub fn current(&self, resource: Resource) -> Option<f64> {
        self.resources.get(&resource).map(|r| r.current)
    }

    pub fn is_normal(&self) -> bool {
        self.status == GlobalStatus::Normal
    }
}

/// An alert that was actually emitted downstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub timestamp: DateTime<Utc>,
    pub key: crate::anomaly::DedupKey,
    pub message: String,
    pub severity: GlobalStatus,
}
