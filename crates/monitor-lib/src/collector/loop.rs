//! Monitor polling loop
//!
//! Every tick collects readings, feeds the analyzer, publishes the snapshot
//! and, when the gate allows it, composes and delivers one alert.

use super::{MetricsCollector, StatusBoard};
use crate::anomaly::{Analyzer, GateDecision};
use crate::clock::{Clock, SystemClock};
use crate::health::{components, HealthRegistry};
use crate::models::{AlertRecord, Analysis, GlobalStatus};
use crate::notify::{format_summary, AlertSink, FallbackComposer, LogSink, MessageComposer};
use crate::observability::{MonitorMetrics, StructuredLogger};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for the polling loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Time between ticks (default: 10 seconds)
    pub interval: Duration,
    /// Host name attached to log events
    pub host_name: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            host_name: "localhost".to_string(),
        }
    }
}

/// Outcome of one tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub analysis: Analysis,
    pub decision: GateDecision,
    /// Set only when an alert was delivered and recorded
    pub alert: Option<AlertRecord>,
}

/// Polling loop that owns the analyzer
pub struct MonitorLoop<C: Clock = SystemClock> {
    collector: Arc<dyn MetricsCollector>,
    analyzer: Analyzer<C>,
    composer: Arc<dyn MessageComposer>,
    sink: Arc<dyn AlertSink>,
    board: StatusBoard,
    health: HealthRegistry,
    metrics: MonitorMetrics,
    logger: StructuredLogger,
    config: LoopConfig,
    last_status: GlobalStatus,
}

impl<C: Clock> MonitorLoop<C> {
    /// Run until a shutdown signal arrives
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            "Starting monitor loop"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.health.set_ready(true).await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Ok(report) = self.tick().await {
                        debug!(
                            status = %report.analysis.status,
                            decision = %report.decision,
                            "Tick complete"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    info!("Shutting down monitor loop");
                    break;
                }
            }
        }

        self.health.set_ready(false).await;
    }

    /// Run one collect, analyze, alert cycle
    pub async fn tick(&mut self) -> Result<TickReport> {
        let start = Instant::now();
        let result = self.tick_inner().await;
        self.metrics
            .observe_tick_latency(start.elapsed().as_secs_f64());
        result
    }

    async fn tick_inner(&mut self) -> Result<TickReport> {
        let readings = match self.collector.collect().await {
            Ok(readings) => readings,
            Err(e) => {
                self.metrics.inc_collection_errors();
                self.logger.log_collection_failed(&e);
                self.health
                    .set_degraded(components::COLLECTOR, e.to_string())
                    .await;
                return Err(e);
            }
        };
        self.health.set_healthy(components::COLLECTOR).await;

        for reading in readings {
            self.analyzer.update(reading);
        }

        let analysis = self.analyzer.analyze();
        self.metrics.set_analysis(&analysis);
        if analysis.status != self.last_status {
            self.logger
                .log_status_change(self.last_status, analysis.status, analysis.cause);
            self.last_status = analysis.status;
        }
        self.board.publish_analysis(analysis.clone()).await;
        self.health.set_healthy(components::ANALYZER).await;

        let decision = self.analyzer.evaluate(&analysis);
        self.metrics.record_decision(decision);

        let alert = if decision.is_emit() {
            self.emit(&analysis).await
        } else {
            if !analysis.is_normal() {
                self.logger.log_alert_suppressed(decision, analysis.status);
            }
            None
        };

        Ok(TickReport {
            analysis,
            decision,
            alert,
        })
    }

    /// Compose and deliver; record only once delivery succeeded
    async fn emit(&mut self, analysis: &Analysis) -> Option<AlertRecord> {
        let message = match self.composer.compose(analysis).await {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Message composer failed, using fallback wording");
                FallbackComposer.message(analysis)
            }
        };

        let delivered = self.sink.deliver(analysis, &message).await;
        self.health.report(components::NOTIFIER, &delivered).await;

        if let Err(e) = delivered {
            self.metrics.inc_delivery_failures();
            self.logger.log_delivery_failed(analysis.status, &e);
            return None;
        }

        let record = self.analyzer.record_alert(analysis, message);
        self.metrics.inc_alerts_emitted(record.severity);
        self.logger
            .log_alert_emitted(&record, &format_summary(analysis));
        self.board
            .publish_alerts(self.analyzer.alert_history().cloned().collect())
            .await;

        Some(record)
    }

    pub fn analyzer(&self) -> &Analyzer<C> {
        &self.analyzer
    }

    pub fn board(&self) -> &StatusBoard {
        &self.board
    }
}

/// Builder for the monitor loop
pub struct MonitorLoopBuilder<C: Clock = SystemClock> {
    collector: Option<Arc<dyn MetricsCollector>>,
    analyzer: Option<Analyzer<C>>,
    composer: Arc<dyn MessageComposer>,
    sink: Option<Arc<dyn AlertSink>>,
    board: StatusBoard,
    health: HealthRegistry,
    config: LoopConfig,
}

impl<C: Clock> MonitorLoopBuilder<C> {
    /// Create a new builder with the fallback composer and default configuration
    pub fn new() -> Self {
        Self {
            collector: None,
            analyzer: None,
            composer: Arc::new(FallbackComposer),
            sink: None,
            board: StatusBoard::new(),
            health: HealthRegistry::new(),
            config: LoopConfig::default(),
        }
    }

    pub fn collector(mut self, collector: Arc<dyn MetricsCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn analyzer(mut self, analyzer: Analyzer<C>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn composer(mut self, composer: Arc<dyn MessageComposer>) -> Self {
        self.composer = composer;
        self
    }

    /// Alert sink (default: log sink)
    pub fn sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Board shared with the status API
    pub fn board(mut self, board: StatusBoard) -> Self {
        self.board = board;
        self
    }

    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = health;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn host_name(mut self, host_name: impl Into<String>) -> Self {
        self.config.host_name = host_name.into();
        self
    }

    pub fn build(self) -> Result<MonitorLoop<C>> {
        let collector = self
            .collector
            .ok_or_else(|| anyhow::anyhow!("Collector is required"))?;
        let analyzer = self
            .analyzer
            .ok_or_else(|| anyhow::anyhow!("Analyzer is required"))?;
        anyhow::ensure!(!self.config.interval.is_zero(), "Interval must be positive");

        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(LogSink::new(self.config.host_name.clone())));

        Ok(MonitorLoop {
            collector,
            analyzer,
            composer: self.composer,
            sink,
            board: self.board,
            health: self.health,
            metrics: MonitorMetrics::new(),
            logger: StructuredLogger::new(self.config.host_name.clone()),
            config: self.config,
            last_status: GlobalStatus::Normal,
        })
    }
}

impl<C: Clock> Default for MonitorLoopBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
