//! Live status from a running daemon

use anyhow::Result;
use colored::Colorize;
use monitor_lib::collector::StatusSnapshot;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_breach, color_status, format_value, print_info, print_json, print_table, OutputFormat,
};

/// Row for resources table
#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "Breach")]
    breach: String,
    #[tabled(rename = "Spike")]
    spike: String,
}

/// Row for alerts table
#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// `skyctl status`
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let snapshot = client.status().await?;

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => render(&snapshot),
    }

    Ok(())
}

fn render(snapshot: &StatusSnapshot) {
    let Some(analysis) = &snapshot.analysis else {
        print_info("Monitor has not completed a tick yet");
        return;
    };

    println!("{}", "System Status".bold());
    println!("{}", "=".repeat(50));
    println!("Status:     {}", color_status(analysis.status));
    if let Some(cause) = analysis.cause {
        println!("Cause:      {}", cause.to_string().cyan());
    }
    println!(
        "Updated:    {}",
        analysis.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if analysis.resources.is_empty() {
        print_info("No resources reported");
    } else {
        let rows = analysis
            .resources
            .iter()
            .map(|(resource, entry)| ResourceRow {
                resource: resource.to_string(),
                value: format_value(entry.current),
                trend: entry.trend.to_string(),
                breach: color_breach(entry.anomaly.breach),
                spike: if entry.anomaly.spike { "yes".red().to_string() } else { "-".to_string() },
            })
            .collect();
        print_table::<ResourceRow>(rows);
    }

    if snapshot.alerts.is_empty() {
        return;
    }

    println!();
    println!("{}", "Recent Alerts".bold());
    let rows = snapshot
        .alerts
        .iter()
        .rev()
        .map(|alert| AlertRow {
            time: alert.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            severity: color_status(alert.severity),
            message: alert.message.clone(),
        })
        .collect();
    print_table::<AlertRow>(rows);
}
