//! Core data types shared by ingestion, storage and resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Profile identifier given to the base file of every application.
pub const BASE_PROFILE: &str = "application";

/// Fixed label marking the current configuration snapshot.
pub const LABEL: &str = "latest";

/// Flat property key to property value mapping.
///
/// Ordered so that rows, logs and test output are stable; ordering carries
/// no meaning.
pub type PropertyMap = BTreeMap<String, String>;

/// A configuration file found under an application directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Owning application (the parent directory name).
    pub application: String,
    /// Profile identifier derived from the file name.
    pub profile: String,
    /// Full path to the file.
    pub path: PathBuf,
}

impl ConfigFile {
    /// File name without its directory, for log and report output.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_base(&self) -> bool {
        self.profile == BASE_PROFILE
    }
}

/// The persisted unit: one effective property of one application profile.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyRow {
    pub application: String,
    pub profile: String,
    pub label: String,
    pub prop_key: String,
    pub value: String,
}

impl PropertyRow {
    /// Build a row carrying the fixed current label.
    pub fn current(
        application: impl Into<String>,
        profile: impl Into<String>,
        prop_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            profile: profile.into(),
            label: LABEL.to_string(),
            prop_key: prop_key.into(),
            value: value.into(),
        }
    }
}

/// A row as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProperty {
    #[serde(flatten)]
    pub row: PropertyRow,
    /// Epoch milliseconds of the first insert of this row.
    pub created_on: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_row_uses_fixed_label() {
        let row = PropertyRow::current("orders", "prod", "timeout", "5");
        assert_eq!(row.label, LABEL);
        assert_eq!(row.prop_key, "timeout");
    }

    #[test]
    fn stored_property_serializes_flat() {
        let stored = StoredProperty {
            row: PropertyRow::current("orders", "prod", "timeout", "5"),
            created_on: 42,
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["application"], "orders");
        assert_eq!(json["prop_key"], "timeout");
        assert_eq!(json["label"], "latest");
        assert_eq!(json["created_on"], 42);
    }

    #[test]
    fn config_file_reports_bare_file_name() {
        let file = ConfigFile {
            application: "orders".into(),
            profile: "dev".into(),
            path: PathBuf::from("/cfg/orders/orders-dev.local.yml"),
        };
        assert_eq!(file.file_name(), "orders-dev.local.yml");
        assert!(!file.is_base());
    }
}
