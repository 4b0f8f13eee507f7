//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use monitor_lib::{Breach, GlobalStatus};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a percentage or temperature reading
pub fn format_value(value: f64) -> String {
    format!("{:.1}", value)
}

/// Color global status by severity
pub fn color_status(status: GlobalStatus) -> String {
    let text = status.as_str();
    match status {
        GlobalStatus::Normal => text.green().to_string(),
        GlobalStatus::Spike => text.blue().to_string(),
        GlobalStatus::Warning => text.yellow().to_string(),
        GlobalStatus::Critical => text.red().bold().to_string(),
    }
}

/// Color a per-resource breach level
pub fn color_breach(breach: Breach) -> String {
    let text = breach.to_string();
    match breach {
        Breach::None => text.green().to_string(),
        Breach::Warning => text.yellow().to_string(),
        Breach::Critical => text.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(92.34), "92.3");
        assert_eq!(format_value(0.0), "0.0");
    }

    #[test]
    fn test_color_status_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(color_status(GlobalStatus::Critical), "critical");
        assert_eq!(color_breach(Breach::None), "normal");
    }
}
