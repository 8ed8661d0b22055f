//! Ingestion: source tree to stored property rows.
//!
//! One pass walks every application, decodes its base file, merges each
//! profile over the base and upserts the effective properties. Failures are
//! isolated: a broken application is skipped, a broken profile is reported,
//! and neither stops the rest of the pass. Everything that happened is
//! returned as an [`IngestSummary`].

use crate::decode::decode_file;
use crate::discovery::SourceTree;
use crate::error::{DiscoveryError, IngestError};
use crate::merge::merge;
use crate::store::PropertySink;
use crate::types::{ConfigFile, PropertyMap, PropertyRow};
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of one profile (the base included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileStatus {
    Loaded { rows: usize },
    Failed { reason: String, rows_written: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    /// Absent when no identifier could be derived from the file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub file: String,
    #[serde(flatten)]
    pub status: ProfileStatus,
}

impl ProfileReport {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, ProfileStatus::Loaded { .. })
    }

    fn rows_written(&self) -> usize {
        match self.status {
            ProfileStatus::Loaded { rows } => rows,
            ProfileStatus::Failed { rows_written, .. } => rows_written,
        }
    }
}

/// Outcome of one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Loaded,
    Skipped { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationReport {
    pub application: String,
    #[serde(flatten)]
    pub status: ApplicationStatus,
    pub profiles: Vec<ProfileReport>,
}

impl ApplicationReport {
    fn skipped(application: &str, err: IngestError) -> Self {
        warn!(application = %application, error = %err, "Skipping application");
        Self {
            application: application.to_string(),
            status: ApplicationStatus::Skipped {
                reason: err.to_string(),
            },
            profiles: Vec::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == ApplicationStatus::Loaded
    }

    /// Report for `profile`, if one was produced.
    pub fn profile(&self, profile: &str) -> Option<&ProfileReport> {
        self.profiles
            .iter()
            .find(|p| p.profile.as_deref() == Some(profile))
    }
}

/// Result of one ingestion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub applications: Vec<ApplicationReport>,
    pub duration_ms: u64,
}

impl IngestSummary {
    pub fn application(&self, name: &str) -> Option<&ApplicationReport> {
        self.applications.iter().find(|a| a.application == name)
    }

    pub fn rows_written(&self) -> usize {
        self.applications
            .iter()
            .flat_map(|a| &a.profiles)
            .map(ProfileReport::rows_written)
            .sum()
    }

    pub fn applications_loaded(&self) -> usize {
        self.applications.iter().filter(|a| a.is_loaded()).count()
    }

    pub fn applications_skipped(&self) -> usize {
        self.applications.len() - self.applications_loaded()
    }

    pub fn profiles_failed(&self) -> usize {
        self.applications
            .iter()
            .flat_map(|a| &a.profiles)
            .filter(|p| !p.is_loaded())
            .count()
    }

    /// Skipped applications plus failed profiles.
    pub fn failures(&self) -> usize {
        self.applications_skipped() + self.profiles_failed()
    }
}

/// Drives discovery, decoding and merging, and writes rows to a sink.
pub struct Ingestor<'a, S: PropertySink + ?Sized> {
    tree: &'a SourceTree,
    sink: &'a S,
}

impl<'a, S: PropertySink + ?Sized> Ingestor<'a, S> {
    pub fn new(tree: &'a SourceTree, sink: &'a S) -> Self {
        Self { tree, sink }
    }

    /// Ingest every application under the source root.
    ///
    /// Only an unreadable source root is returned as an error; everything
    /// else lands in the summary.
    pub fn run(&self) -> Result<IngestSummary, DiscoveryError> {
        let started = Instant::now();
        info!(root = %self.tree.root().display(), "Loading configuration sources");

        let applications = self
            .tree
            .applications()?
            .iter()
            .map(|app| self.ingest_application(app))
            .collect();

        let summary = IngestSummary {
            applications,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            applications = summary.applications.len(),
            skipped = summary.applications_skipped(),
            profiles_failed = summary.profiles_failed(),
            rows = summary.rows_written(),
            duration_ms = summary.duration_ms,
            "Configuration load complete"
        );
        Ok(summary)
    }

    /// Ingest one application directory.
    pub fn ingest_application(&self, application: &str) -> ApplicationReport {
        let mut set = match self.tree.profiles(application) {
            Ok(set) => set,
            Err(e) => return ApplicationReport::skipped(application, e.into()),
        };

        let Some(base_file) = set.take_base() else {
            return ApplicationReport::skipped(application, IngestError::MissingBaseFile);
        };
        let base = match decode_file(&base_file.path) {
            Ok(base) => base,
            Err(e) => return ApplicationReport::skipped(application, e.into()),
        };

        let mut profiles = Vec::with_capacity(set.files.len() + set.rejected.len() + 1);
        profiles.push(self.write_profile(&base_file, &base));

        for file in set.files.values() {
            let report = match decode_file(&file.path) {
                Ok(overrides) => self.write_profile(file, &merge(&base, &overrides)),
                Err(e) => failed(file, e.into(), 0),
            };
            profiles.push(report);
        }

        for rejected in set.rejected {
            profiles.push(ProfileReport {
                profile: rejected.profile,
                file: rejected.file,
                status: ProfileStatus::Failed {
                    reason: rejected.error.to_string(),
                    rows_written: 0,
                },
            });
        }

        ApplicationReport {
            application: application.to_string(),
            status: ApplicationStatus::Loaded,
            profiles,
        }
    }

    /// Upsert one row per property. The first write failure stops the
    /// profile; rows already written are kept.
    fn write_profile(&self, file: &ConfigFile, properties: &PropertyMap) -> ProfileReport {
        let mut written = 0;
        for (key, value) in properties {
            let row = PropertyRow::current(&file.application, &file.profile, key, value);
            if let Err(e) = self.sink.upsert(&row) {
                return failed(file, IngestError::Storage(e), written);
            }
            written += 1;
        }

        info!(
            application = %file.application,
            profile = %file.profile,
            file = %file.file_name(),
            rows = written,
            "Loaded profile"
        );
        ProfileReport {
            profile: Some(file.profile.clone()),
            file: file.file_name(),
            status: ProfileStatus::Loaded { rows: written },
        }
    }
}

fn failed(file: &ConfigFile, err: IngestError, rows_written: usize) -> ProfileReport {
    warn!(
        application = %file.application,
        profile = %file.profile,
        file = %file.file_name(),
        rows_written,
        error = %err,
        "Failed to load profile"
    );
    ProfileReport {
        profile: Some(file.profile.clone()),
        file: file.file_name(),
        status: ProfileStatus::Failed {
            reason: err.to_string(),
            rows_written,
        },
    }
}
