//! Settings for the config-hub process itself.
//!
//! Layers, lowest to highest priority, merged field by field:
//! 1. **Defaults** - built in
//! 2. **Project** - `$CWD/config-hub/config.yaml`
//! 3. **User** - `~/.config-hub/config.yaml`
//! 4. **Explicit** - the file named by `--config` / `CONFIG_HUB_CONFIG_PATH`
//! 5. **Environment** - the variables below
//!
//! ## Environment Variables
//! - `CONFIG_HUB_CONFIG_PATH` - Explicit settings file
//! - `CONFIG_HUB_DB_PATH` - Database path
//! - `CONFIG_HUB_SOURCE_DIR` - Configuration source root
//! - `CONFIG_HUB_HOST` - HTTP bind address
//! - `CONFIG_HUB_PORT` - HTTP port
//! - `CONFIG_HUB_USER_DIR` - User settings dir (default: `~/.config-hub`)
//! - `CONFIG_HUB_PROJECT_DIR` - Project settings dir (default: `./config-hub`)

mod loader;
mod merge;
mod types;

pub use loader::{SettingsLoader, SettingsPaths, SettingsTier};
pub use types::*;
