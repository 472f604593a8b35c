//! values.yaml handling.

use super::chart_file::ChartError;
use crate::value::{from_yaml, to_yaml, Value};
use std::path::{Path, PathBuf};

/// ValuesFile is a loaded `values.yaml` document.
///
/// The document round-trips with its keys in the original order.
#[derive(Debug, Clone)]
pub struct ValuesFile {
    path: PathBuf,
    document: Value,
}

impl ValuesFile {
    /// Reads and parses a `values.yaml`.
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
        Ok(ValuesFile { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Mutable access for the engine to migrate in place.
    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.document
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
