//! config-hub
//!
//! Centralized configuration server: one ingestion pass at startup, then
//! HTTP lookups by application, profile and key.

use anyhow::Result;
use clap::Parser;
use config_hub::cli::ingest::{render_summary, run_ingest};
use config_hub::cli::query::run_query;
use config_hub::cli::serve::run_serve;
use config_hub::cli::{Cli, Command};
use config_hub::logging::{self, LogTarget};
use config_hub::settings::{SettingsLoader, SettingsPaths};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = SettingsPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_explicit_file(config_path);
    }
    let mut loader = SettingsLoader::load_with_paths(paths)?;
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = %path.display(), "Settings file applied");
    }

    let settings = loader.settings_mut();
    cli.apply_overrides(settings);

    match cli.command {
        Some(Command::Ingest(args)) => {
            let summary = tokio::task::spawn_blocking({
                let settings = settings.clone();
                move || run_ingest(&settings)
            })
            .await??;
            println!("{}", render_summary(&summary, args.format)?);
        }
        Some(Command::Query(args)) => {
            println!("{}", run_query(settings, &args)?);
        }
        Some(Command::Serve(args)) => {
            args.apply_overrides(settings);
            run_serve(settings).await?;
        }
        None => run_serve(settings).await?,
    }

    Ok(())
}
