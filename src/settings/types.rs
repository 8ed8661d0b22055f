//! Settings types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8888;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub sources: SourceSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port (default: 8888).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Resolve `host` (an IP literal or a host name) to the address to bind.
    pub async fn listen_addr(&self) -> Result<SocketAddr> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("cannot resolve listen address {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("{} resolved to no addresses", self.host))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Property store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("config-hub.db")
}

/// Configuration source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Directory holding one sub-directory per application.
    #[serde(default = "default_source_root")]
    pub root: PathBuf,

    /// Run one ingestion pass when `serve` starts (default: true).
    #[serde(default = "default_ingest_on_start")]
    pub ingest_on_start: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            root: default_source_root(),
            ingest_on_start: default_ingest_on_start(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("configurations")
}

fn default_ingest_on_start() -> bool {
    true
}
