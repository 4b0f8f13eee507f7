//! Monitor configuration for offline commands

use anyhow::{Context, Result};
use monitor_lib::MonitorConfig;
use serde::Deserialize;
use std::path::Path;

/// The part of the daemon's configuration file the CLI understands
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    monitor: MonitorConfig,
}

/// Read the `[monitor]` table of a daemon configuration file, or defaults
pub fn load_monitor_config(path: Option<&Path>) -> Result<MonitorConfig> {
    let Some(path) = path else {
        return Ok(MonitorConfig::default());
    };

    let file: ConfigFile = config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .with_context(|| format!("Failed to read config file {}", path.display()))?
        .try_deserialize()
        .context("Failed to parse config file")?;

    file.monitor.validate()?;
    Ok(file.monitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::Resource;
    use std::io::Write;

    #[test]
    fn test_no_path_gives_defaults() {
        assert_eq!(load_monitor_config(None).unwrap(), MonitorConfig::default());
    }

    #[test]
    fn test_reads_monitor_table() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_port = 9000\n\n[monitor]\nmin_alert_interval_secs = 30\n\n[monitor.thresholds.disk]\nwarning = 80.0\ncritical = 90.0"
        )
        .unwrap();

        let config = load_monitor_config(Some(file.path())).unwrap();
        assert_eq!(config.min_alert_interval_secs, 30);
        assert_eq!(config.thresholds.get(Resource::Disk).unwrap().warning, 80.0);
        assert!(config.thresholds.get(Resource::Cpu).is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_monitor_config(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
