//! Daemon configuration

use anyhow::{Context, Result};
use monitor_lib::MonitorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Overrides the configuration file path
pub const CONFIG_PATH_ENV: &str = "SKYNOTIFY_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "skynotify.toml";

/// Daemon configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Host name attached to logs and alerts
    pub host_name: String,

    /// API server port for health/metrics/status
    pub api_port: u16,

    /// Seconds between monitor ticks
    pub check_interval_secs: u64,

    /// Mount point whose usage is reported as disk
    pub disk_mount: PathBuf,

    /// Thresholds, history sizes and alert gating
    pub monitor: MonitorConfig,
}

fn default_host_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string())
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host_name: default_host_name(),
            api_port: 8080,
            check_interval_secs: 10,
            disk_mount: PathBuf::from("/"),
            monitor: MonitorConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the optional config file and environment
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// File values first, then `SKYNOTIFY_*` variables (`__` for nesting)
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("SKYNOTIFY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        let config: DaemonConfig = config
            .try_deserialize()
            .context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.check_interval_secs > 0,
            "check_interval_secs must be positive"
        );
        self.monitor.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::{Resource, ThresholdDirection};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.check_interval_secs, 10);
        assert_eq!(config.disk_mount, PathBuf::from("/"));
        assert_eq!(config.monitor.min_alert_interval_secs, 120);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaemonConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let file = toml_file(
            r#"
host_name = "desk-01"
check_interval_secs = 5
disk_mount = "/home"

[monitor]
stability_period_secs = 30

[monitor.thresholds.cpu]
warning = 60.0
critical = 80.0
spike = 10.0

[monitor.thresholds.battery]
warning = 25.0
critical = 10.0
direction = "below"
"#,
        );

        let config = DaemonConfig::load_from(file.path()).unwrap();
        assert_eq!(config.host_name, "desk-01");
        assert_eq!(config.check_interval_secs, 5);
        assert_eq!(config.disk_mount, PathBuf::from("/home"));
        assert_eq!(config.monitor.stability_period_secs, 30);
        assert_eq!(config.monitor.min_alert_interval_secs, 120);

        let cpu = config.monitor.thresholds.get(Resource::Cpu).unwrap();
        assert_eq!(cpu.critical, 80.0);
        assert_eq!(cpu.spike, Some(10.0));
        let battery = config.monitor.thresholds.get(Resource::Battery).unwrap();
        assert_eq!(battery.direction, ThresholdDirection::Below);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let file = toml_file(
            r#"
[monitor.thresholds.ram]
warning = 90.0
critical = 80.0
"#,
        );
        assert!(DaemonConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let file = toml_file("check_interval_secs = 0\n");
        assert!(DaemonConfig::load_from(file.path()).is_err());
    }
}
