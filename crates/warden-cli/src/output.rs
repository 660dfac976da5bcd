// crates/warden-cli/src/output.rs
//
// Output formatting utilities for the Warden CLI.
// Supports table and JSON output modes.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

use warden_core::record::{ReputationInfo, ReputationStatus};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// One labelled value in a vertical table.
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    fn new(field: &'static str, value: impl ToString) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// A row of the audit-history window table.
#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Window start")]
    window_start: String,
    #[tabled(rename = "Online")]
    online: u32,
    #[tabled(rename = "Total")]
    total: u32,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

fn timestamp(t: &Option<DateTime<Utc>>) -> String {
    t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "--".to_string())
}

/// Rows describing a node status.
pub fn status_rows(status: &ReputationStatus) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Active", status.is_active()),
        FieldRow::new("Contained", status.contained),
        FieldRow::new("Vetted at", timestamp(&status.vetted_at)),
        FieldRow::new("Disqualified", timestamp(&status.disqualified)),
        FieldRow::new(
            "Unknown-audit suspended",
            timestamp(&status.unknown_audit_suspended),
        ),
        FieldRow::new("Offline suspended", timestamp(&status.offline_suspended)),
    ]
}

/// Print a status in the requested format.
pub fn print_status(status: &ReputationStatus, changed: Option<bool>, format: OutputFormat) {
    match format {
        OutputFormat::Json => match changed {
            Some(changed) => println!(
                "{}",
                format_json(&serde_json::json!({ "status": status, "changed": changed }))
            ),
            None => println!("{}", format_json(status)),
        },
        OutputFormat::Table => {
            let mut rows = status_rows(status);
            if let Some(changed) = changed {
                rows.insert(0, FieldRow::new("Changed", changed));
            }
            println!("{}", format_table(&rows));
        }
    }
}

/// Print the full reputation view in the requested format.
pub fn print_info(info: &ReputationInfo, format: OutputFormat) {
    if format == OutputFormat::Json {
        println!("{}", format_json(info));
        return;
    }

    let rows = vec![
        FieldRow::new("Total audits", info.total_audit_count),
        FieldRow::new("Successful audits", info.audit_success_count),
        FieldRow::new(
            "Audit alpha / beta",
            format!(
                "{:.4} / {:.4}",
                info.audit_reputation_alpha, info.audit_reputation_beta
            ),
        ),
        FieldRow::new("Audit score", format!("{:.4}", info.audit_score())),
        FieldRow::new(
            "Unknown alpha / beta",
            format!(
                "{:.4} / {:.4}",
                info.unknown_audit_reputation_alpha, info.unknown_audit_reputation_beta
            ),
        ),
        FieldRow::new("Unknown score", format!("{:.4}", info.unknown_audit_score())),
        FieldRow::new("Online score", format!("{:.4}", info.online_score)),
        FieldRow::new("Contained", info.contained),
        FieldRow::new("Vetted at", timestamp(&info.vetted_at)),
        FieldRow::new("Disqualified", timestamp(&info.disqualified)),
        FieldRow::new(
            "Unknown-audit suspended",
            timestamp(&info.unknown_audit_suspended),
        ),
        FieldRow::new("Offline suspended", timestamp(&info.offline_suspended)),
        FieldRow::new("Under review", timestamp(&info.under_review)),
        FieldRow::new("Last contact success", timestamp(&info.last_contact_success)),
        FieldRow::new("Last contact failure", timestamp(&info.last_contact_failure)),
    ];
    println!("{}", format_table(&rows));

    if !info.audit_history.windows.is_empty() {
        let windows: Vec<WindowRow> = info
            .audit_history
            .windows
            .iter()
            .map(|w| WindowRow {
                window_start: w.window_start.to_rfc3339(),
                online: w.online_count,
                total: w.total_count,
            })
            .collect();
        println!();
        println!("Audit history (score {:.4})", info.audit_history.score);
        println!("{}", format_table(&windows));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_rows_render_missing_timestamps() {
        let rows = status_rows(&ReputationStatus::default());
        assert_eq!(rows[0].value, "true");
        assert!(rows.iter().skip(2).all(|r| r.value == "--"));
        let table = format_table(&rows);
        assert!(table.contains("Unknown-audit suspended"));
    }
}
