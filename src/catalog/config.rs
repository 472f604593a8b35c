//! Configuration types and loading.

use crate::ops::Operation;
use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// ConfigError is fatal: nothing is migrated for a chart whose
/// configuration does not parse and validate.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid catalog version {version:?}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("duplicate catalog version {0}")]
    DuplicateVersion(Version),

    #[error("{chart_name}: min_version {min} is greater than max_version {max}")]
    VersionRange {
        chart_name: String,
        min: Version,
        max: Version,
    },
}

/// ChartRequirement describes the governed version range for one chart and
/// the version the updater should bring it to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChartRequirement {
    pub chart_name: String,
    pub min_version: Version,
    pub max_version: Version,
    pub update_to_version: Version,
}

impl ChartRequirement {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_version > self.max_version {
            return Err(ConfigError::VersionRange {
                chart_name: self.chart_name.clone(),
                min: self.min_version.clone(),
                max: self.max_version.clone(),
            });
        }
        Ok(())
    }
}

/// ChangeCatalog maps chart versions to their ordered change-sets.
///
/// Versions iterate in ascending semantic-version order; the operations
/// of one version keep exactly their declared order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeCatalog {
    changes: BTreeMap<Version, Vec<Operation>>,
}

impl ChangeCatalog {
    pub fn new() -> Self {
        ChangeCatalog::default()
    }

    /// Registers a change-set, rejecting a version already present.
    pub fn insert(
        &mut self,
        version: Version,
        operations: Vec<Operation>,
    ) -> Result<(), ConfigError> {
        if self.changes.contains_key(&version) {
            return Err(ConfigError::DuplicateVersion(version));
        }
        self.changes.insert(version, operations);
        Ok(())
    }

    /// All catalog versions, ascending.
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.changes.keys()
    }

    /// The change-set declared for one version.
    pub fn get(&self, version: &Version) -> Option<&[Operation]> {
        self.changes.get(version).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    base_requirements: RawBaseRequirements,
    #[serde(default)]
    version_changes: IndexMap<String, Vec<Operation>>,
}

#[derive(Debug, Deserialize)]
struct RawBaseRequirements {
    #[serde(default)]
    path_for_charts: Vec<PathBuf>,
    #[serde(default)]
    version_requirements: Vec<ChartRequirement>,
}

/// Config is the fully validated content of a `version_changes.yaml`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories to scan for `Chart.yaml` files.
    pub chart_roots: Vec<PathBuf>,
    /// One requirement per governed chart.
    pub requirements: Vec<ChartRequirement>,
    /// All declared change-sets.
    pub catalog: ChangeCatalog,
}

impl Config {
    /// Parses and validates a configuration document.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(source)?;

        for requirement in &raw.base_requirements.version_requirements {
            requirement.validate()?;
        }

        let mut catalog = ChangeCatalog::new();
        for (version, operations) in raw.version_changes {
            let parsed =
                Version::parse(&version).map_err(|source| ConfigError::InvalidVersion {
                    version: version.clone(),
                    source,
                })?;
            catalog.insert(parsed, operations)?;
        }

        Ok(Config {
            chart_roots: raw.base_requirements.path_for_charts,
            requirements: raw.base_requirements.version_requirements,
            catalog,
        })
    }

    /// Reads and parses a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::parse(&source)
    }
}
