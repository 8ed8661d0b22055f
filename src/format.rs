//! Output formatting for CLI commands: JSON or markdown tables.

use crate::ingest::{ApplicationStatus, IngestSummary, ProfileStatus};
use crate::types::StoredProperty;
use anyhow::Result;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    #[value(alias = "md", alias = "markdown")]
    Table,
}

/// Pretty JSON for any serializable result.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Escape a cell so it cannot break the table layout.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "\\n")
}

/// Render stored rows as a markdown table.
pub fn format_properties_table(rows: &[StoredProperty]) -> String {
    let mut md = String::from("| application | profile | label | key | value |\n");
    md.push_str("|---|---|---|---|---|\n");
    for p in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            cell(&p.row.application),
            cell(&p.row.profile),
            cell(&p.row.label),
            cell(&p.row.prop_key),
            cell(&p.row.value)
        ));
    }
    md
}

/// Render an ingestion summary as markdown.
pub fn format_summary_table(summary: &IngestSummary) -> String {
    let mut md = String::from("## Ingestion summary\n");
    md.push_str(&format!(
        "- **applications**: {} loaded, {} skipped\n",
        summary.applications_loaded(),
        summary.applications_skipped()
    ));
    md.push_str(&format!("- **rows written**: {}\n", summary.rows_written()));
    md.push_str(&format!("- **failed profiles**: {}\n", summary.profiles_failed()));
    md.push_str(&format!("- **duration**: {} ms\n\n", summary.duration_ms));

    md.push_str("| application | profile | file | result |\n");
    md.push_str("|---|---|---|---|\n");
    for app in &summary.applications {
        if let ApplicationStatus::Skipped { reason } = &app.status {
            md.push_str(&format!(
                "| {} | - | - | skipped: {} |\n",
                cell(&app.application),
                cell(reason)
            ));
            continue;
        }
        for profile in &app.profiles {
            let result = match &profile.status {
                ProfileStatus::Loaded { rows } => format!("{rows} rows"),
                ProfileStatus::Failed {
                    reason,
                    rows_written,
                } => format!("failed after {rows_written} rows: {reason}"),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                cell(&app.application),
                cell(profile.profile.as_deref().unwrap_or("-")),
                cell(&profile.file),
                cell(&result)
            ));
        }
    }
    md
}
