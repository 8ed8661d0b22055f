//! Ingest subcommand: one load of the source tree into the store.

use crate::db::Database;
use crate::discovery::SourceTree;
use crate::format::{OutputFormat, format_summary_table, to_json};
use crate::ingest::{IngestSummary, Ingestor};
use crate::settings::Settings;
use anyhow::Result;
use clap::Args;

/// Arguments for the ingest subcommand
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Summary output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Ingest into the store named by `settings` and return the summary.
pub fn run_ingest(settings: &Settings) -> Result<IngestSummary> {
    let db = Database::open(&settings.store.db_path)?;
    let tree = SourceTree::new(&settings.sources.root);
    Ok(Ingestor::new(&tree, &db).run()?)
}

/// Render a summary for the terminal.
pub fn render_summary(summary: &IngestSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(summary),
        OutputFormat::Table => Ok(format_summary_table(summary)),
    }
}
