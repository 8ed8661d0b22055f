//! Query subcommand: look up stored configuration from the terminal.

use crate::db::Database;
use crate::error::QueryError;
use crate::format::{OutputFormat, format_properties_table, to_json};
use crate::query::{PropertyQuery, Resolver};
use crate::settings::Settings;
use anyhow::{Result, anyhow};
use clap::Args;

/// Arguments for the query subcommand
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Application name
    pub application: String,

    /// Profile name
    pub profile: Option<String>,

    /// Property key (requires a profile)
    #[arg(requires = "profile")]
    pub key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl QueryArgs {
    pub fn to_query(&self) -> PropertyQuery {
        PropertyQuery::from_parts(
            &self.application,
            self.profile.as_deref(),
            self.key.as_deref(),
        )
    }
}

/// Resolve `args` against the store and render the rows.
///
/// Not-found and storage failures are returned as errors.
pub fn run_query(settings: &Settings, args: &QueryArgs) -> Result<String> {
    let db = Database::open(&settings.store.db_path)?;
    let rows = Resolver::new(db)
        .resolve(&args.to_query())
        .map_err(|e| match e {
            QueryError::NotFound { key } => anyhow!("No configuration found for {key}"),
            QueryError::Storage(source) => source,
        })?;
    match args.format {
        OutputFormat::Json => to_json(&rows),
        OutputFormat::Table => Ok(format_properties_table(&rows)),
    }
}
