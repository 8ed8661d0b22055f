//! Storage seams between the engine and the persistence layer.
//!
//! [`crate::db::Database`] implements both traits; tests substitute their own.

use crate::query::PropertyQuery;
use crate::types::{PropertyRow, StoredProperty};
use anyhow::Result;
use std::sync::Arc;

/// Write side, consumed by ingestion.
pub trait PropertySink {
    /// Insert `row`, replacing the value of an existing row with the same
    /// application, profile, label and key.
    fn upsert(&self, row: &PropertyRow) -> Result<()>;
}

/// Read side, consumed by resolution.
pub trait PropertySource {
    /// Return every stored row matching `query` exactly. Zero rows is `Ok`.
    fn fetch(&self, query: &PropertyQuery) -> Result<Vec<StoredProperty>>;
}

impl<T: PropertySink + ?Sized> PropertySink for Arc<T> {
    fn upsert(&self, row: &PropertyRow) -> Result<()> {
        (**self).upsert(row)
    }
}

impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn fetch(&self, query: &PropertyQuery) -> Result<Vec<StoredProperty>> {
        (**self).fetch(query)
    }
}
