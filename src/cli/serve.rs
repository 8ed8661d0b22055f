//! Serve subcommand: ingest once, then answer lookups until interrupted.

use crate::db::Database;
use crate::discovery::SourceTree;
use crate::ingest::Ingestor;
use crate::query::Resolver;
use crate::server::start_server;
use crate::settings::Settings;
use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

/// Arguments for the serve subcommand
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (overrides settings)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (overrides settings)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Serve what is already stored without loading sources
    #[arg(long)]
    pub no_ingest: bool,
}

impl ServeArgs {
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(ref host) = self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if self.no_ingest {
            settings.sources.ingest_on_start = false;
        }
    }
}

pub async fn run_serve(settings: &Settings) -> Result<()> {
    let addr = settings.server.listen_addr().await?;
    let db = Database::open(&settings.store.db_path)?;
    info!(path = %settings.store.db_path.display(), "Database initialized");

    if settings.sources.ingest_on_start {
        let tree = SourceTree::new(&settings.sources.root);
        let sink = db.clone();
        // A missing source root leaves the previously stored rows in service
        let outcome = tokio::task::spawn_blocking(move || Ingestor::new(&tree, &sink).run()).await?;
        if let Err(e) = outcome {
            warn!(error = %e, "Configuration sources not loaded; serving stored rows");
        }
    }

    let handle = start_server(Resolver::new(db), addr).await?;

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");
    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply() {
        let args = ServeArgs {
            host: Some("0.0.0.0".into()),
            port: Some(9999),
            no_ingest: true,
        };
        let mut settings = Settings::default();
        args.apply_overrides(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9999);
        assert!(!settings.sources.ingest_on_start);
    }
}
