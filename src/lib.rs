//! config-hub library
//!
//! Loads per-application configuration files from a source tree, merges each
//! profile over the application's base file, stores the effective properties
//! as rows, and answers hierarchical lookups over them.

pub mod cli;
pub mod db;
pub mod decode;
pub mod discovery;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod merge;
pub mod query;
pub mod server;
pub mod settings;
pub mod store;
pub mod types;
