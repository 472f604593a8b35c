//! Operation types.

use crate::keypath::Path;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Operation is one declarative change-set entry.
///
/// The serde shape matches the `version_changes` entries of the
/// configuration file: the variant is selected by the `action` field and
/// each variant carries only the fields its action needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Operation {
    /// Sets the value at `key`, creating missing parent containers.
    AddKey {
        key: Path,
        overwrite: bool,
        #[serde(default)]
        overwrite_value: Value,
    },
    /// Moves the value at `old_key` to `new_key`, optionally merging with
    /// a value already present at the destination.
    RenameKey {
        old_key: Path,
        new_key: Path,
        merge: bool,
    },
    /// Deletes the value at `key`, if any.
    RemoveKey { key: Path },
}

impl Operation {
    /// The `action` name of this operation as written in the catalog.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::AddKey { .. } => "add_key",
            Operation::RenameKey { .. } => "rename_key",
            Operation::RemoveKey { .. } => "remove_key",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::AddKey { key, .. } => write!(f, "add_key {}", key),
            Operation::RenameKey {
                old_key, new_key, ..
            } => write!(f, "rename_key {} -> {}", old_key, new_key),
            Operation::RemoveKey { key } => write!(f, "remove_key {}", key),
        }
    }
}
