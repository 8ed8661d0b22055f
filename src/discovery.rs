//! Source tree discovery.
//!
//! The source root holds one directory per application. Each application
//! directory holds one base file named `application.<ext>` and any number of
//! profile files named `<anything>-<profile>.<ext>`. Only immediate children
//! are considered; nested directories are ignored.

use crate::error::DiscoveryError;
use crate::types::{BASE_PROFILE, ConfigFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Derive the profile identifier for a file name.
///
/// - A name containing both a hyphen and a dot is a profile file; the
///   identifier is the text between the first hyphen and the first dot
///   (`app-dev.yml` gives `dev`).
/// - A name without a hyphen is the base file and yields `application`, but
///   only when the part before the first dot equals `application`
///   (case-insensitively).
pub fn profile_for_file_name(file_name: &str) -> Result<String, DiscoveryError> {
    let hyphen = file_name.find('-');
    let dot = file_name.find('.');

    match (hyphen, dot) {
        (Some(h), Some(d)) => {
            if d <= h + 1 {
                return Err(DiscoveryError::MalformedProfileName {
                    file: file_name.to_string(),
                });
            }
            Ok(file_name[h + 1..d].to_string())
        }
        (Some(_), None) => Err(DiscoveryError::MalformedProfileName {
            file: file_name.to_string(),
        }),
        (None, _) => {
            let stem = dot.map_or(file_name, |d| &file_name[..d]);
            if stem.eq_ignore_ascii_case(BASE_PROFILE) {
                Ok(BASE_PROFILE.to_string())
            } else {
                Err(DiscoveryError::InvalidBaseFile {
                    file: file_name.to_string(),
                })
            }
        }
    }
}

/// A file that discovery could not assign to a profile.
#[derive(Debug)]
pub struct RejectedFile {
    /// Profile the file was rejected for, when one could be derived.
    pub profile: Option<String>,
    pub file: String,
    pub error: DiscoveryError,
}

/// The profile files of one application.
#[derive(Debug, Default)]
pub struct ProfileSet {
    pub application: String,
    /// Profile identifier to file, base included until taken.
    pub files: BTreeMap<String, ConfigFile>,
    /// Files left out: malformed names and colliding profiles.
    pub rejected: Vec<RejectedFile>,
}

impl ProfileSet {
    fn empty(application: &str) -> Self {
        Self {
            application: application.to_string(),
            ..Default::default()
        }
    }

    /// Remove and return the base file so it is not processed as a profile.
    pub fn take_base(&mut self) -> Option<ConfigFile> {
        self.files.remove(BASE_PROFILE)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.rejected.is_empty()
    }
}

/// A root directory of per-application configuration.
#[derive(Debug, Clone)]
pub struct SourceTree {
    root: PathBuf,
}

impl SourceTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List application identifiers, one per immediate sub-directory, sorted.
    ///
    /// Plain files and hidden entries at the root are ignored. Symlinks are
    /// followed.
    pub fn applications(&self) -> Result<Vec<String>, DiscoveryError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| DiscoveryError::ReadDir {
            path: self.root.clone(),
            source,
        })?;

        let mut apps: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        apps.sort();

        debug!(root = %self.root.display(), count = apps.len(), "Discovered applications");
        Ok(apps)
    }

    /// Map every profile of `application` to its file.
    ///
    /// An unreadable application directory yields an empty set. A misnamed
    /// base file or a second base file fails the whole application. Colliding
    /// profile files are all rejected so neither silently wins.
    pub fn profiles(&self, application: &str) -> Result<ProfileSet, DiscoveryError> {
        let dir = self.root.join(application);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    application = %application,
                    path = %dir.display(),
                    error = %e,
                    "Unable to list application directory"
                );
                return Ok(ProfileSet::empty(application));
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .map(|n| !n.to_string_lossy().starts_with('.'))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        let mut set = ProfileSet::empty(application);
        let mut by_profile: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match profile_for_file_name(&file_name) {
                Ok(profile) => by_profile.entry(profile).or_default().push(path),
                Err(e @ DiscoveryError::InvalidBaseFile { .. }) => return Err(e),
                Err(error) => {
                    warn!(application = %application, file = %file_name, error = %error, "Skipping file");
                    set.rejected.push(RejectedFile {
                        profile: None,
                        file: file_name,
                        error,
                    });
                }
            }
        }

        for (profile, mut paths) in by_profile {
            if paths.len() == 1 {
                let path = paths.remove(0);
                set.files.insert(
                    profile.clone(),
                    ConfigFile {
                        application: application.to_string(),
                        profile,
                        path,
                    },
                );
                continue;
            }

            let names: Vec<String> = paths
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            let error = DiscoveryError::DuplicateProfile {
                profile: profile.clone(),
                files: names.clone(),
            };
            if profile == BASE_PROFILE {
                return Err(error);
            }
            warn!(application = %application, profile = %profile, error = %error, "Profile collision");
            set.rejected.push(RejectedFile {
                profile: Some(profile),
                file: names.join(", "),
                error,
            });
        }

        Ok(set)
    }
}
