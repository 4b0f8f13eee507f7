//! Offline replay of recorded readings
//!
//! Input is newline-delimited JSON, one reading per line:
//! `{"resource": "cpu", "value": 91.2, "timestamp": "2024-01-01T08:00:00Z"}`.
//! Timestamps may also be unix seconds. Consecutive lines with the same
//! timestamp form one tick.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::Colorize;
use monitor_lib::{
    notify::FallbackComposer, Analyzer, GateDecision, GlobalStatus, ManualClock, MetricSample,
    MonitorConfig, Resource,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;

use crate::config::load_monitor_config;
use crate::output::{
    color_status, format_value, print_info, print_json, print_table, print_warning, OutputFormat,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Rfc3339(DateTime<Utc>),
    Unix(f64),
}

impl RawTimestamp {
    fn resolve(self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Rfc3339(at) => Some(at),
            RawTimestamp::Unix(secs) if secs.is_finite() => {
                let millis = (secs * 1000.0).round() as i64;
                DateTime::from_timestamp_millis(millis)
            }
            RawTimestamp::Unix(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawReading {
    resource: String,
    value: f64,
    timestamp: RawTimestamp,
}

/// Readings sharing one timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub at: DateTime<Utc>,
    pub readings: Vec<MetricSample>,
}

/// Parsed input plus one warning per skipped line
#[derive(Debug, Default)]
pub struct ParsedInput {
    pub ticks: Vec<Tick>,
    pub warnings: Vec<String>,
}

fn parse_line(line: &str) -> Result<MetricSample> {
    let raw: RawReading = serde_json::from_str(line).context("invalid JSON reading")?;
    let resource: Resource = raw.resource.parse()?;
    anyhow::ensure!(raw.value.is_finite(), "value is not a finite number");
    let timestamp = raw
        .timestamp
        .resolve()
        .context("timestamp out of range")?;
    Ok(MetricSample::new(resource, raw.value, timestamp))
}

/// Group NDJSON readings into ticks; blank lines and `#` comments are ignored
pub fn parse_ticks(input: &str) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let sample = match parse_line(line) {
            Ok(sample) => sample,
            Err(e) => {
                parsed
                    .warnings
                    .push(format!("line {}: {:#}, skipped", index + 1, e));
                continue;
            }
        };

        match parsed.ticks.last_mut() {
            Some(tick) if tick.at == sample.timestamp => tick.readings.push(sample),
            _ => parsed.ticks.push(Tick {
                at: sample.timestamp,
                readings: vec![sample],
            }),
        }
    }

    parsed
}

/// Outcome of one replayed tick
#[derive(Debug, Clone, Serialize)]
pub struct ReplayStep {
    pub timestamp: DateTime<Utc>,
    pub status: GlobalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Resource>,
    pub values: BTreeMap<Resource, f64>,
    pub decision: GateDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

/// Run ticks through a fresh analyzer whose clock follows the recording.
///
/// Every emitted alert counts as delivered.
pub fn replay(ticks: &[Tick], config: MonitorConfig) -> Result<Vec<ReplayStep>> {
    let Some(first) = ticks.first() else {
        return Ok(Vec::new());
    };

    let clock = Arc::new(ManualClock::new(first.at));
    let mut analyzer = Analyzer::with_clock(config, clock.clone())?;
    let mut steps = Vec::with_capacity(ticks.len());

    for tick in ticks {
        clock.set(tick.at);
        for reading in &tick.readings {
            analyzer.update(*reading);
        }

        let analysis = analyzer.analyze();
        let decision = analyzer.evaluate(&analysis);
        let alert = decision.is_emit().then(|| {
            let message = FallbackComposer.message(&analysis);
            analyzer.record_alert(&analysis, message).message
        });

        steps.push(ReplayStep {
            timestamp: tick.at,
            status: analysis.status,
            cause: analysis.cause,
            values: analysis
                .resources
                .iter()
                .map(|(resource, entry)| (*resource, entry.current))
                .collect(),
            decision,
            alert,
        });
    }

    Ok(steps)
}

/// Row for replay table
#[derive(Tabled)]
struct ReplayRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Cause")]
    cause: String,
    #[tabled(rename = "Values")]
    values: String,
    #[tabled(rename = "Decision")]
    decision: String,
    #[tabled(rename = "Alert")]
    alert: String,
}

impl From<&ReplayStep> for ReplayRow {
    fn from(step: &ReplayStep) -> Self {
        let values = step
            .values
            .iter()
            .map(|(resource, value)| format!("{} {}", resource, format_value(*value)))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            time: step.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: color_status(step.status),
            cause: step.cause.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            values,
            decision: step.decision.to_string(),
            alert: step.alert.clone().unwrap_or_default(),
        }
    }
}

/// `skyctl replay`
pub fn run_replay(file: &Path, config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_monitor_config(config_path)?;
    let input = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let parsed = parse_ticks(&input);
    for warning in &parsed.warnings {
        print_warning(warning);
    }

    let steps = replay(&parsed.ticks, config)?;

    match format {
        OutputFormat::Json => print_json(&steps)?,
        OutputFormat::Table => {
            if steps.is_empty() {
                print_info("No readings to replay");
                return Ok(());
            }
            let alerts = steps.iter().filter(|s| s.alert.is_some()).count();
            print_table(steps.iter().map(ReplayRow::from).collect::<Vec<_>>());
            println!(
                "\n{} ticks, {} alerts",
                steps.len(),
                alerts.to_string().bold()
            );
        }
    }

    Ok(())
}
