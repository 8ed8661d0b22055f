//! Settings loader with tier-based merging.

use super::merge::overlay_all;
use super::types::Settings;
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Settings file name looked up in the project and user directories.
pub const SETTINGS_FILE: &str = "config.yaml";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SettingsTier {
    Defaults = 0,
    Project = 1,
    User = 2,
    Explicit = 3,
    Environment = 4,
}

impl std::fmt::Display for SettingsTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsTier::Defaults => write!(f, "defaults"),
            SettingsTier::Project => write!(f, "project"),
            SettingsTier::User => write!(f, "user"),
            SettingsTier::Explicit => write!(f, "explicit"),
            SettingsTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where each file tier lives.
#[derive(Debug, Clone, Default)]
pub struct SettingsPaths {
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
    /// Explicit settings file; unlike the directory tiers it must exist.
    pub explicit_file: Option<PathBuf>,
}

impl SettingsPaths {
    /// Discover tier locations from the environment and defaults.
    pub fn discover() -> Self {
        let user_dir = std::env::var("CONFIG_HUB_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config-hub")));

        let project_dir = std::env::var("CONFIG_HUB_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("config-hub")));

        let explicit_file = std::env::var("CONFIG_HUB_CONFIG_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            explicit_file,
        }
    }

    /// Paths with explicit directories and no explicit file.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }

    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Loads and merges settings from every tier.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    pub paths: SettingsPaths,
    settings: Settings,
    /// Files that contributed, lowest tier first.
    sources: Vec<(SettingsTier, PathBuf)>,
}

impl SettingsLoader {
    /// Load with explicit tier locations. Environment overrides still apply.
    pub fn load_with_paths(paths: SettingsPaths) -> Result<Self> {
        let mut layers: Vec<Value> = vec![serde_yaml::to_value(Settings::default())?];
        let mut sources = Vec::new();

        let tiers = [
            (SettingsTier::Project, paths.project_dir.as_deref()),
            (SettingsTier::User, paths.user_dir.as_deref()),
        ];
        for (tier, dir) in tiers {
            let Some(file) = dir.map(|d| d.join(SETTINGS_FILE)) else {
                continue;
            };
            if !file.exists() {
                continue;
            }
            match read_layer(&file) {
                Ok(layer) => {
                    debug!(tier = %tier, path = %file.display(), "Loaded settings tier");
                    layers.push(layer);
                    sources.push((tier, file));
                }
                Err(e) => {
                    warn!(tier = %tier, path = %file.display(), error = %e, "Ignoring unreadable settings file");
                }
            }
        }

        if let Some(ref file) = paths.explicit_file {
            layers.push(read_layer(file)?);
            sources.push((SettingsTier::Explicit, file.clone()));
        }

        let merged = overlay_all(layers);
        let mut settings: Settings =
            serde_yaml::from_value(merged).context("settings do not match the expected shape")?;

        Self::apply_env_overrides(&mut settings)?;

        Ok(Self {
            paths,
            settings,
            sources,
        })
    }

    fn apply_env_overrides(settings: &mut Settings) -> Result<()> {
        if let Ok(db_path) = std::env::var("CONFIG_HUB_DB_PATH") {
            settings.store.db_path = PathBuf::from(db_path);
        }

        if let Ok(root) = std::env::var("CONFIG_HUB_SOURCE_DIR") {
            settings.sources.root = PathBuf::from(root);
        }

        if let Ok(host) = std::env::var("CONFIG_HUB_HOST") {
            settings.server.host = host;
        }

        if let Ok(port) = std::env::var("CONFIG_HUB_PORT") {
            settings.server.port = port
                .parse()
                .with_context(|| format!("CONFIG_HUB_PORT is not a valid port: {port}"))?;
        }

        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Settings files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(SettingsTier, PathBuf)] {
        &self.sources
    }

    /// The highest-priority file that contributed, if any.
    pub fn settings_path(&self) -> Option<&Path> {
        self.sources.last().map(|(_, p)| p.as_path())
    }
}

fn read_layer(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("parsing settings file {}", path.display()))
}
