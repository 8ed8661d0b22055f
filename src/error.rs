//! Error types for discovery, decoding, ingestion and resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while walking the source tree.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The source root could not be listed.
    #[error("Unable to read source directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file without a hyphen is not named `application.<ext>`.
    #[error("Invalid base file '{file}': base files must be named application.<ext>")]
    InvalidBaseFile { file: String },

    /// A profile file name from which no identifier can be derived.
    #[error("Malformed profile file name '{file}'")]
    MalformedProfileName { file: String },

    /// Two files in one application derive the same profile identifier.
    #[error("Profile '{profile}' is defined by more than one file: {}", files.join(", "))]
    DuplicateProfile { profile: String, files: Vec<String> },
}

/// Errors raised while turning a file into a property map.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported configuration format '{extension}' for {path}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("Invalid properties syntax in {path} at line {line}: {message}")]
    Properties {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid YAML in {path}: {message}")]
    Yaml { path: PathBuf, message: String },
}

/// Errors that stop one application or one profile during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No base file (application.<ext>) found")]
    MissingBaseFile,

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Storage write failed: {0}")]
    Storage(#[source] anyhow::Error),
}

/// Outcome of a lookup that produced no rows.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Zero rows matched. `key` is the slash-joined lookup key.
    #[error("{key}")]
    NotFound { key: String },

    /// The store could not be read.
    #[error("Storage read failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}
