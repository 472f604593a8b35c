//! Chart.yaml handling.

use crate::value::{from_yaml, to_yaml, Value};
use semver::Version;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// ChartError covers file-level failures around a chart directory.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{path}: dependency {chart_name} has invalid version {version:?}")]
    InvalidVersion {
        path: PathBuf,
        chart_name: String,
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// ChartFile is a loaded `Chart.yaml` document.
#[derive(Debug, Clone)]
pub struct ChartFile {
    path: PathBuf,
    document: Value,
}

impl ChartFile {
    /// Reads and parses a `Chart.yaml`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ChartError> {
        let path = path.into();
        let source = std::fs::read_to_string(&path).map_err(|source| ChartError::Io {
            path: path.clone(),
            source,
        })?;
        let document = from_yaml(&source).map_err(|source| ChartError::Yaml {
            path: path.clone(),
            source,
        })?;
        Ok(ChartFile { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The version pinned for the named entry of the `dependencies` list,
    /// or `None` when no such dependency exists or it carries no version.
    pub fn dependency_version(&self, chart_name: &str) -> Result<Option<Version>, ChartError> {
        let Some(dependency) = self.find_dependency(chart_name) else {
            return Ok(None);
        };
        let Some(version) = dependency.get("version").and_then(Value::as_str) else {
            return Ok(None);
        };
        Version::parse(version)
            .map(Some)
            .map_err(|source| ChartError::InvalidVersion {
                path: self.path.clone(),
                chart_name: chart_name.to_string(),
                version: version.to_string(),
                source,
            })
    }

    fn find_dependency(&self, chart_name: &str) -> Option<&crate::value::Map> {
        self.document
            .as_map()?
            .get("dependencies")?
            .as_list()?
            .iter()
            .filter_map(Value::as_map)
            .find(|dep| dep.get("name").and_then(Value::as_str) == Some(chart_name))
    }

    /// Pins the named dependency to `version`. Returns true when the
    /// document changed, false when the dependency is absent or already
    /// at that version.
    pub fn set_dependency_version(&mut self, chart_name: &str, version: &Version) -> bool {
        let Some(dependencies) = self
            .document
            .as_map_mut()
            .and_then(|m| m.get_mut("dependencies"))
            .and_then(Value::as_list_mut)
        else {
            return false;
        };
        for dependency in dependencies.iter_mut().filter_map(Value::as_map_mut) {
            if dependency.get("name").and_then(Value::as_str) != Some(chart_name) {
                continue;
            }
            let rendered = version.to_string();
            if dependency.get("version").and_then(Value::as_str) == Some(rendered.as_str()) {
                return false;
            }
            dependency.set("version".to_string(), Value::String(rendered));
            debug!(chart = chart_name, version = %version, path = %self.path.display(),
                "pinned dependency version");
            return true;
        }
        false
    }

    /// Writes the document back, keys in their original order.
    pub fn save(&self) -> Result<(), ChartError> {
        let rendered = to_yaml(&self.document).map_err(|source| ChartError::Yaml {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, rendered).map_err(|source| ChartError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
