//! Hierarchical lookups over stored properties.
//!
//! Lookups match exactly on application, profile and key. There is no
//! fallback from a missing profile to the base profile: each profile's rows
//! already hold the base values merged in at ingestion time.

use crate::error::QueryError;
use crate::store::PropertySource;
use crate::types::StoredProperty;
use tracing::{error, info};

/// The three lookup shapes, from least to most specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyQuery {
    Application {
        application: String,
    },
    ApplicationProfile {
        application: String,
        profile: String,
    },
    ApplicationProfileKey {
        application: String,
        profile: String,
        key: String,
    },
}

impl PropertyQuery {
    /// Build the most specific query the given parts allow.
    ///
    /// A key without a profile is ignored, since keys are scoped to a profile.
    pub fn from_parts(application: &str, profile: Option<&str>, key: Option<&str>) -> Self {
        match (profile, key) {
            (Some(profile), Some(key)) => PropertyQuery::ApplicationProfileKey {
                application: application.to_string(),
                profile: profile.to_string(),
                key: key.to_string(),
            },
            (Some(profile), None) => PropertyQuery::ApplicationProfile {
                application: application.to_string(),
                profile: profile.to_string(),
            },
            (None, _) => PropertyQuery::Application {
                application: application.to_string(),
            },
        }
    }

    pub fn application(&self) -> &str {
        match self {
            PropertyQuery::Application { application }
            | PropertyQuery::ApplicationProfile { application, .. }
            | PropertyQuery::ApplicationProfileKey { application, .. } => application,
        }
    }

    pub fn profile(&self) -> Option<&str> {
        match self {
            PropertyQuery::Application { .. } => None,
            PropertyQuery::ApplicationProfile { profile, .. }
            | PropertyQuery::ApplicationProfileKey { profile, .. } => Some(profile),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            PropertyQuery::ApplicationProfileKey { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Slash-joined lookup key, e.g. `orders/prod/timeout`.
    pub fn lookup_key(&self) -> String {
        let mut parts = vec![self.application()];
        parts.extend(self.profile());
        parts.extend(self.key());
        parts.join("/")
    }
}

impl std::fmt::Display for PropertyQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lookup_key())
    }
}

/// Answers lookups against a [`PropertySource`].
///
/// Holds no row cache; every call reads the source afresh.
#[derive(Debug, Clone)]
pub struct Resolver<S> {
    source: S,
}

impl<S: PropertySource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn by_application(&self, application: &str) -> Result<Vec<StoredProperty>, QueryError> {
        self.resolve(&PropertyQuery::from_parts(application, None, None))
    }

    pub fn by_application_profile(
        &self,
        application: &str,
        profile: &str,
    ) -> Result<Vec<StoredProperty>, QueryError> {
        self.resolve(&PropertyQuery::from_parts(application, Some(profile), None))
    }

    pub fn by_application_profile_key(
        &self,
        application: &str,
        profile: &str,
        key: &str,
    ) -> Result<Vec<StoredProperty>, QueryError> {
        self.resolve(&PropertyQuery::from_parts(
            application,
            Some(profile),
            Some(key),
        ))
    }

    /// Run `query`. Zero rows becomes [`QueryError::NotFound`]; a read
    /// failure becomes [`QueryError::Storage`] and is never reported as
    /// not-found.
    pub fn resolve(&self, query: &PropertyQuery) -> Result<Vec<StoredProperty>, QueryError> {
        let rows = self.source.fetch(query).map_err(|e| {
            error!(key = %query, error = %e, "Configuration lookup failed");
            QueryError::Storage(e)
        })?;

        if rows.is_empty() {
            info!(key = %query, "No configuration found");
            return Err(QueryError::NotFound {
                key: query.lookup_key(),
            });
        }

        info!(key = %query, rows = rows.len(), "Configuration found");
        Ok(rows)
    }
}
