//! Host collector backed by `sysinfo`

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sysinfo::{Components, Disks, System};
use tracing::debug;

use super::MetricsCollector;
use crate::models::{MetricReading, MetricSample, Resource};

/// Reads cpu, ram, disk and temperature from the local host.
///
/// GPU and battery are not reported.
pub struct SystemCollector {
    system: Mutex<System>,
    disk_mount: PathBuf,
}

impl SystemCollector {
    pub fn new(disk_mount: impl Into<PathBuf>) -> Self {
        let mut system = System::new();
        // CPU usage is a delta between refreshes, prime it once
        system.refresh_cpu_all();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
            disk_mount: disk_mount.into(),
        }
    }

    pub fn disk_mount(&self) -> &Path {
        &self.disk_mount
    }

    fn cpu_and_ram(&self) -> (f64, Option<f64>) {
        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_cpu_all();
        system.refresh_memory();

        let cpu = f64::from(system.global_cpu_usage());
        let total = system.total_memory();
        let ram = (total > 0).then(|| system.used_memory() as f64 / total as f64 * 100.0);
        (cpu, ram)
    }

    fn disk_percent(&self) -> Result<f64> {
        let disks = Disks::new_with_refreshed_list();
        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.disk_mount.as_path())
            .with_context(|| format!("no disk mounted at {}", self.disk_mount.display()))?;

        let total = disk.total_space();
        anyhow::ensure!(total > 0, "disk at {} reports zero size", self.disk_mount.display());
        let used = total.saturating_sub(disk.available_space());
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn hottest_component() -> Option<f64> {
        Components::new_with_refreshed_list()
            .list()
            .iter()
            .filter_map(|c| c.temperature())
            .filter(|t| t.is_finite())
            .map(f64::from)
            .reduce(f64::max)
    }
}

#[async_trait]
impl MetricsCollector for SystemCollector {
    async fn collect(&self) -> Result<Vec<MetricReading>> {
        let timestamp = Utc::now();
        let mut readings = Vec::with_capacity(4);

        let (cpu, ram) = self.cpu_and_ram();
        readings.push(MetricSample::new(Resource::Cpu, cpu, timestamp));
        if let Some(ram) = ram {
            readings.push(MetricSample::new(Resource::Ram, ram, timestamp));
        }

        match self.disk_percent() {
            Ok(disk) => readings.push(MetricSample::new(Resource::Disk, disk, timestamp)),
            Err(e) => debug!(error = %e, "Disk usage unavailable"),
        }

        if let Some(temp) = Self::hottest_component() {
            readings.push(MetricSample::new(Resource::Temp, temp, timestamp));
        }

        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_reports_cpu_with_shared_timestamp() {
        let collector = SystemCollector::new("/");
        let readings = collector.collect().await.unwrap();

        assert!(readings.iter().any(|r| r.resource == Resource::Cpu));
        assert!(readings
            .iter()
            .all(|r| r.timestamp == readings[0].timestamp));
        assert!(readings
            .iter()
            .all(|r| !matches!(r.resource, Resource::Gpu | Resource::Battery)));
    }

    #[tokio::test]
    async fn test_unknown_mount_skips_disk() {
        let collector = SystemCollector::new("/definitely/not/a/mount");
        let readings = collector.collect().await.unwrap();
        assert!(readings.iter().all(|r| r.resource != Resource::Disk));
    }
}
