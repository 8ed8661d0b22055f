//! Property row upserts and lookups.

use super::{Database, now_ms};
use crate::query::PropertyQuery;
use crate::store::{PropertySink, PropertySource};
use crate::types::{PropertyRow, StoredProperty};
use anyhow::Result;
use rusqlite::{Row, params, params_from_iter};

const SELECT_COLUMNS: &str =
    "SELECT application, profile, label, prop_key, value, created_on FROM properties";

fn parse_property_row(row: &Row<'_>) -> rusqlite::Result<StoredProperty> {
    Ok(StoredProperty {
        row: PropertyRow {
            application: row.get(0)?,
            profile: row.get(1)?,
            label: row.get(2)?,
            prop_key: row.get(3)?,
            value: row.get(4)?,
        },
        created_on: row.get(5)?,
    })
}

impl Database {
    /// Insert a row or replace the value of the row with the same identity.
    ///
    /// `created_on` keeps the time of the first insert.
    pub fn upsert_property(&self, row: &PropertyRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO properties (application, profile, label, prop_key, value, created_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (application, profile, label, prop_key)
                 DO UPDATE SET value = excluded.value",
                params![
                    row.application,
                    row.profile,
                    row.label,
                    row.prop_key,
                    row.value,
                    now_ms()
                ],
            )?;
            Ok(())
        })
    }

    /// Rows matching `query` exactly, ordered by profile then key.
    pub fn find_properties(&self, query: &PropertyQuery) -> Result<Vec<StoredProperty>> {
        let (filter, values): (&str, Vec<&str>) = match query {
            PropertyQuery::Application { application } => {
                ("WHERE application = ?1", vec![application.as_str()])
            }
            PropertyQuery::ApplicationProfile {
                application,
                profile,
            } => (
                "WHERE application = ?1 AND profile = ?2",
                vec![application.as_str(), profile.as_str()],
            ),
            PropertyQuery::ApplicationProfileKey {
                application,
                profile,
                key,
            } => (
                "WHERE application = ?1 AND profile = ?2 AND prop_key = ?3",
                vec![application.as_str(), profile.as_str(), key.as_str()],
            ),
        };
        let sql = format!("{SELECT_COLUMNS} {filter} ORDER BY profile, prop_key");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values), parse_property_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Total number of stored rows.
    pub fn count_properties(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))?)
        })
    }
}

impl PropertySink for Database {
    fn upsert(&self, row: &PropertyRow) -> Result<()> {
        self.upsert_property(row)
    }
}

impl PropertySource for Database {
    fn fetch(&self, query: &PropertyQuery) -> Result<Vec<StoredProperty>> {
        self.find_properties(query)
    }
}
