//! Effective analyzer configuration

use anyhow::Result;
use colored::Colorize;
use monitor_lib::{MonitorConfig, Resource, ThresholdDirection};
use std::path::Path;
use tabled::Tabled;

use crate::config::load_monitor_config;
use crate::output::{format_value, print_json, print_table, OutputFormat};

/// Row for thresholds table
#[derive(Tabled)]
struct ThresholdRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Direction")]
    direction: String,
    #[tabled(rename = "Warning")]
    warning: String,
    #[tabled(rename = "Critical")]
    critical: String,
    #[tabled(rename = "Spike")]
    spike: String,
    #[tabled(rename = "History")]
    history: usize,
}

fn rows(config: &MonitorConfig) -> Vec<ThresholdRow> {
    Resource::ALL
        .into_iter()
        .map(|resource| {
            let history = config.history.for_resource(resource);
            match config.thresholds.get(resource) {
                Some(t) => ThresholdRow {
                    resource: resource.to_string(),
                    direction: match t.direction {
                        ThresholdDirection::Above => "above".to_string(),
                        ThresholdDirection::Below => "below".to_string(),
                    },
                    warning: format_value(t.warning),
                    critical: format_value(t.critical),
                    spike: t.spike.map(format_value).unwrap_or_else(|| "-".to_string()),
                    history,
                },
                None => ThresholdRow {
                    resource: resource.to_string(),
                    direction: "-".to_string(),
                    warning: "-".to_string(),
                    critical: "-".to_string(),
                    spike: "-".to_string(),
                    history,
                },
            }
        })
        .collect()
}

/// `skyctl thresholds`
pub fn show_thresholds(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let config = load_monitor_config(config_path)?;

    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Table => {
            println!("{}", "Thresholds".bold());
            print_table(rows(&config));
            println!();
            println!("Minimum alert interval: {}s", config.min_alert_interval_secs);
            println!("Stability period:       {}s", config.stability_period_secs);
            println!("Trend slope threshold:  {}", config.trend_slope_threshold);
            println!("Alert history:          {}", config.alert_history_capacity);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::ThresholdConfig;

    #[test]
    fn test_rows_cover_every_resource() {
        let rows = rows(&MonitorConfig::default());
        assert_eq!(rows.len(), Resource::COUNT);

        let battery = rows.iter().find(|r| r.resource == "battery").unwrap();
        assert_eq!(battery.direction, "below");
        assert_eq!(battery.critical, "15.0");
        assert_eq!(battery.spike, "-");

        let cpu = rows.iter().find(|r| r.resource == "cpu").unwrap();
        assert_eq!(cpu.spike, "15.0");
        assert_eq!(cpu.history, 30);
    }

    #[test]
    fn test_unconfigured_resource_row() {
        let config = MonitorConfig {
            thresholds: ThresholdConfig::empty(),
            ..Default::default()
        };
        let rows = rows(&config);
        assert!(rows.iter().all(|r| r.warning == "-"));
        assert_eq!(rows.iter().find(|r| r.resource == "disk").unwrap().history, 10);
    }
}
