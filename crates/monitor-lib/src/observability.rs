//! Observability infrastructure for the monitor
//!
//! Provides:
//! - Prometheus metrics (tick latency, alert decisions, current status and values)
//! - Structured JSON logging of monitor events with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use crate::anomaly::GateDecision;
use crate::models::{AlertRecord, Analysis, GlobalStatus, Resource};

/// Histogram buckets for tick latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<MonitorMetricsInner> = OnceLock::new();

struct MonitorMetricsInner {
    tick_latency_seconds: Histogram,
    ticks: IntCounter,
    collection_errors: IntCounter,
    alerts_emitted: IntCounterVec,
    alerts_suppressed: IntCounterVec,
    delivery_failures: IntCounter,
    global_status: IntGauge,
    resource_value: GaugeVec,
}

impl MonitorMetricsInner {
    fn new() -> Self {
        Self {
            tick_latency_seconds: register_histogram!(
                "skynotify_tick_latency_seconds",
                "Time spent on one collect/analyze/alert tick",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register tick_latency_seconds"),

            ticks: register_int_counter!("skynotify_ticks_total", "Total number of monitor ticks")
                .expect("Failed to register ticks_total"),

            collection_errors: register_int_counter!(
                "skynotify_collection_errors_total",
                "Total number of failed metric collections"
            )
            .expect("Failed to register collection_errors_total"),

            alerts_emitted: register_int_counter_vec!(
                "skynotify_alerts_emitted_total",
                "Alerts delivered downstream, by severity",
                &["severity"]
            )
            .expect("Failed to register alerts_emitted_total"),

            alerts_suppressed: register_int_counter_vec!(
                "skynotify_alerts_suppressed_total",
                "Abnormal analyses that did not alert, by gate reason",
                &["reason"]
            )
            .expect("Failed to register alerts_suppressed_total"),

            delivery_failures: register_int_counter!(
                "skynotify_delivery_failures_total",
                "Alerts that could not be composed or delivered"
            )
            .expect("Failed to register delivery_failures_total"),

            global_status: register_int_gauge!(
                "skynotify_global_status",
                "Current global status (0 normal, 1 spike, 2 warning, 3 critical)"
            )
            .expect("Failed to register global_status"),

            resource_value: register_gauge_vec!(
                "skynotify_resource_value",
                "Latest value per monitored resource",
                &["resource"]
            )
            .expect("Failed to register resource_value"),
        }
    }
}

/// Lightweight handle to the process-wide monitor metrics.
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct MonitorMetrics {
    _private: (),
}

impl Default for MonitorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &MonitorMetricsInner {
        GLOBAL_METRICS.get_or_init(MonitorMetricsInner::new)
    }

    pub fn observe_tick_latency(&self, duration_secs: f64) {
        let inner = self.inner();
        inner.tick_latency_seconds.observe(duration_secs);
        inner.ticks.inc();
    }

    pub fn inc_collection_errors(&self) {
        self.inner().collection_errors.inc();
    }

    pub fn inc_delivery_failures(&self) {
        self.inner().delivery_failures.inc();
    }

    pub fn inc_alerts_emitted(&self, severity: GlobalStatus) {
        self.inner()
            .alerts_emitted
            .with_label_values(&[severity.as_str()])
            .inc();
    }

    /// Count gate suppressions; stable and emitted ticks are not suppressions
    pub fn record_decision(&self, decision: GateDecision) {
        if matches!(decision, GateDecision::Stable | GateDecision::Emit) {
            return;
        }
        self.inner()
            .alerts_suppressed
            .with_label_values(&[decision.as_str()])
            .inc();
    }

    /// Publish status and per-resource values of the latest analysis
    pub fn set_analysis(&self, analysis: &Analysis) {
        let inner = self.inner();
        inner.global_status.set(analysis.status.level());

        // Resources that stopped reporting disappear from the export
        inner.resource_value.reset();
        for (resource, entry) in &analysis.resources {
            inner
                .resource_value
                .with_label_values(&[resource.as_str()])
                .set(entry.current);
        }
    }
}

/// Structured logger for monitor events
#[derive(Clone)]
pub struct StructuredLogger {
    host_name: String,
}

impl StructuredLogger {
    pub fn new(host_name: impl Into<String>) -> Self {
        Self {
            host_name: host_name.into(),
        }
    }

    pub fn log_startup(&self, version: &str, check_interval_secs: u64) {
        info!(
            event = "monitor_started",
            host = %self.host_name,
            version = %version,
            check_interval_secs = check_interval_secs,
            "Resource monitor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "monitor_shutdown",
            host = %self.host_name,
            reason = %reason,
            "Resource monitor shutting down"
        );
    }

    pub fn log_status_change(&self, from: GlobalStatus, to: GlobalStatus, cause: Option<Resource>) {
        let cause = cause.map(|r| r.as_str()).unwrap_or("none");
        if to > from {
            warn!(
                event = "status_changed",
                host = %self.host_name,
                from = %from,
                to = %to,
                cause = %cause,
                "System status degraded"
            );
        } else {
            info!(
                event = "status_changed",
                host = %self.host_name,
                from = %from,
                to = %to,
                cause = %cause,
                "System status improved"
            );
        }
    }

    pub fn log_alert_emitted(&self, record: &AlertRecord, summary: &str) {
        warn!(
            event = "alert_emitted",
            host = %self.host_name,
            severity = %record.severity,
            dedup_key = %record.key,
            summary = %summary,
            alert_message = %record.message,
            "Alert emitted"
        );
    }

    pub fn log_alert_suppressed(&self, decision: GateDecision, status: GlobalStatus) {
        debug!(
            event = "alert_suppressed",
            host = %self.host_name,
            reason = %decision,
            status = %status,
            "Alert suppressed"
        );
    }

    pub fn log_delivery_failed(&self, status: GlobalStatus, error: &anyhow::Error) {
        warn!(
            event = "alert_delivery_failed",
            host = %self.host_name,
            status = %status,
            error = %error,
            "Alert delivery failed, condition stays alertable"
        );
    }

    pub fn log_collection_failed(&self, error: &anyhow::Error) {
        warn!(
            event = "collection_failed",
            host = %self.host_name,
            error = %error,
            "Metric collection failed"
        );
    }
}
