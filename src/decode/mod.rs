//! Format decoding: configuration file bytes to a flat [`PropertyMap`].
//!
//! The format is selected from the file extension. Each format flattens its
//! input to string keys and string values; nothing is type-inferred.

mod properties;
mod yaml;

use crate::error::DecodeError;
use crate::types::PropertyMap;
use std::path::Path;
use tracing::debug;

/// Supported configuration formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `key=value` lines in the `java.util.Properties` grammar.
    Properties,
    /// Hierarchical YAML flattened to dotted keys.
    Yaml,
}

impl Format {
    /// Look up the format for a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "properties" => Some(Format::Properties),
            "yml" | "yaml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Resolve the format of `path` from its final extension.
    pub fn for_path(path: &Path) -> Result<Self, DecodeError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&ext).ok_or_else(|| DecodeError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext,
        })
    }

    /// Decode `bytes` read from `path`. The path is only used in errors.
    pub fn decode(self, path: &Path, bytes: &[u8]) -> Result<PropertyMap, DecodeError> {
        match self {
            Format::Properties => properties::decode(path, bytes),
            Format::Yaml => yaml::decode(path, bytes),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Properties => "properties",
            Format::Yaml => "yaml",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read and decode one configuration file.
///
/// The format check happens before the read so an unsupported file is
/// reported as such even when it is also unreadable.
pub fn decode_file(path: &Path) -> Result<PropertyMap, DecodeError> {
    let format = Format::for_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), format = %format, bytes = bytes.len(), "Decoding configuration file");
    format.decode(path, &bytes)
}
