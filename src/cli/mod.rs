//! CLI command definitions for config-hub.
//!
//! The main entry point is the `Cli` struct; each subcommand has its own
//! argument struct and runner.

pub mod ingest;
pub mod query;
pub mod serve;

use crate::settings::Settings;
use clap::{Parser, Subcommand};
use ingest::IngestArgs;
use query::QueryArgs;
use serve::ServeArgs;
use std::path::PathBuf;

/// Centralized configuration server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a settings file (highest file tier)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides settings)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Root of the configuration source tree (overrides settings)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Apply the global path overrides to loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(ref db_path) = self.database {
            settings.store.db_path = db_path.clone();
        }
        if let Some(ref source_dir) = self.source_dir {
            settings.sources.root = source_dir.clone();
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load configuration sources, then serve lookups over HTTP (default)
    Serve(ServeArgs),

    /// Run one ingestion pass and print the summary
    Ingest(IngestArgs),

    /// Look up stored configuration
    Query(QueryArgs),
}
