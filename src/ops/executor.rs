//! Applies single operations to a document.

use super::operation::Operation;
use crate::keypath::{lookup, slot_mut, ListGrowth, Path};
use crate::value::Value;
use semver::Version;
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of one applied operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// The document was changed.
    Applied,
    /// An add found the key already present and overwrite was off.
    SkippedExisting,
    /// A rename or remove found nothing at the source path.
    SkippedAbsent,
    /// The operation could not be carried out; the document is unchanged.
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Applied => "applied",
            Outcome::SkippedExisting => "skipped-existing",
            Outcome::SkippedAbsent => "skipped-absent",
            Outcome::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// OperationResult records what happened to one operation of one version's
/// change-set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub operation: Operation,
    pub version: Version,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Applies one operation to the document.
///
/// Never returns an error: anything that prevents the operation from
/// completing is reported as [`Outcome::Failed`] with a detail message,
/// and the document is left as it was before the attempt.
pub fn apply(document: &mut Value, operation: &Operation, growth: ListGrowth) -> (Outcome, Option<String>) {
    match operation {
        Operation::AddKey {
            key,
            overwrite,
            overwrite_value,
        } => add_key(document, key, *overwrite, overwrite_value, growth),
        Operation::RenameKey {
            old_key,
            new_key,
            merge,
        } => rename_key(document, old_key, new_key, *merge, growth),
        Operation::RemoveKey { key } => remove_key(document, key, growth),
    }
}

fn add_key(
    document: &mut Value,
    key: &Path,
    overwrite: bool,
    value: &Value,
    growth: ListGrowth,
) -> (Outcome, Option<String>) {
    let mut slot = match slot_mut(document, key, true, growth) {
        Ok(Some(slot)) => slot,
        Ok(None) => return (Outcome::Failed, Some(format!("{}: path did not resolve", key))),
        Err(e) => return (Outcome::Failed, Some(e.to_string())),
    };
    // A null leaf counts as absent: adding over `key: ~` fills it in even
    // without overwrite.
    let existing = matches!(slot.get(), Some(v) if !v.is_null());
    if existing && !overwrite {
        debug!(key = %key, "key already exists");
        return (Outcome::SkippedExisting, None);
    }
    if let Err(e) = slot.set(value.clone(), key) {
        return (Outcome::Failed, Some(e.to_string()));
    }
    debug!(key = %key, "key {}", if existing { "overwritten" } else { "added" });
    (Outcome::Applied, None)
}

fn rename_key(
    document: &mut Value,
    old_key: &Path,
    new_key: &Path,
    merge: bool,
    growth: ListGrowth,
) -> (Outcome, Option<String>) {
    let old_value = match lookup(document, old_key) {
        Ok(Some(v)) if !v.is_null() => v.clone(),
        Ok(_) => {
            debug!(old_key = %old_key, "cannot rename key, the old key does not exist");
            return (Outcome::SkippedAbsent, None);
        }
        Err(e) => return (Outcome::Failed, Some(e.to_string())),
    };
    // A null destination counts as absent and is overwritten by the move.
    let existing = match lookup(document, new_key) {
        Ok(v) => v.filter(|v| !v.is_null()).cloned(),
        Err(e) => return (Outcome::Failed, Some(e.to_string())),
    };

    // Decide mergeability before touching the document so a failed merge
    // leaves the old value where it was.
    let moved = match (&existing, merge) {
        (Some(Value::Map(dest)), true) => match &old_value {
            Value::Map(old_map) => {
                // Keys already present at the destination win; the rename
                // only adds what is missing.
                let mut merged = dest.clone();
                for (k, v) in old_map.iter() {
                    if !merged.has(k) {
                        merged.set(k.clone(), v.clone());
                    }
                }
                Value::Map(merged)
            }
            _ => {
                return (
                    Outcome::Failed,
                    Some("merge requires map values".to_string()),
                )
            }
        },
        (Some(_), true) => {
            return (
                Outcome::Failed,
                Some("merge requires map values".to_string()),
            )
        }
        // Destination absent, or overwrite rename: the old value moves as is.
        _ => old_value.clone(),
    };

    match slot_mut(document, old_key, false, growth) {
        Ok(Some(mut slot)) => {
            slot.remove();
        }
        Ok(None) => return (Outcome::Failed, Some(format!("{}: path did not resolve", old_key))),
        Err(e) => return (Outcome::Failed, Some(e.to_string())),
    }

    let write = slot_mut(document, new_key, true, growth)
        .map_err(|e| e.to_string())
        .and_then(|slot| match slot {
            Some(mut slot) => slot.set(moved, new_key).map_err(|e| e.to_string()),
            None => Err(format!("{}: path did not resolve", new_key)),
        });
    if let Err(detail) = write {
        if let Err(restore_detail) = restore(document, old_key, old_value, growth) {
            warn!(old_key = %old_key, error = %restore_detail,
                "could not put value back after failed rename");
            return (
                Outcome::Failed,
                Some(format!("{}; restoring {} failed: {}", detail, old_key, restore_detail)),
            );
        }
        return (Outcome::Failed, Some(detail));
    }

    debug!(old_key = %old_key, new_key = %new_key, merged = merge && existing.is_some(),
        "renamed key");
    (Outcome::Applied, None)
}

// Puts a removed value back after a rename that could not complete.
fn restore(
    document: &mut Value,
    path: &Path,
    value: Value,
    growth: ListGrowth,
) -> Result<(), String> {
    match slot_mut(document, path, true, growth).map_err(|e| e.to_string())? {
        Some(mut slot) => slot.set(value, path).map_err(|e| e.to_string()),
        None => Err(format!("{}: path did not resolve", path)),
    }
}

fn remove_key(document: &mut Value, key: &Path, growth: ListGrowth) -> (Outcome, Option<String>) {
    let mut slot = match slot_mut(document, key, false, growth) {
        Ok(Some(slot)) => slot,
        Ok(None) => {
            debug!(key = %key, "no section found for key");
            return (Outcome::SkippedAbsent, None);
        }
        Err(e) => return (Outcome::Failed, Some(e.to_string())),
    };
    match slot.remove() {
        Some(_) => {
            debug!(key = %key, "removed section");
            (Outcome::Applied, None)
        }
        None => {
            debug!(key = %key, "no section found for key");
            (Outcome::SkippedAbsent, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypath::PathSegment;
    use crate::value::from_yaml;
    use pretty_assertions::assert_eq;

    fn path(segments: &[&str]) -> Path {
        segments.iter().copied().map(PathSegment::field).collect()
    }

    fn add(key: &[&str], overwrite: bool, value: Value) -> Operation {
        Operation::AddKey {
            key: path(key),
            overwrite,
            overwrite_value: value,
        }
    }

    fn rename(old: &[&str], new: &[&str], merge: bool) -> Operation {
        Operation::RenameKey {
            old_key: path(old),
            new_key: path(new),
            merge,
        }
    }

    #[test]
    fn test_add_key_creates_missing_key() {
        let mut doc = from_yaml("serviceAccount: {}\n").unwrap();
        let op = add(&["serviceAccount", "create"], false, Value::Bool(false));
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!((outcome, detail), (Outcome::Applied, None));
        assert_eq!(doc, from_yaml("serviceAccount:\n  create: false\n").unwrap());
    }

    #[test]
    fn test_add_key_existing_without_overwrite_is_skipped() {
        let source = "image:\n  tag: v1.2.0\n";
        let mut doc = from_yaml(source).unwrap();
        let op = add(&["image", "tag"], false, Value::from("v9.9.9"));
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::SkippedExisting);
        // Pre-existing value is preserved exactly.
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_add_key_existing_with_overwrite_replaces() {
        let mut doc = from_yaml("image:\n  tag: v1.2.0\n").unwrap();
        let op = add(&["image", "tag"], true, Value::from("v2.1.0"));
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("image:\n  tag: v2.1.0\n").unwrap());
    }

    #[test]
    fn test_add_key_list_element_overwrite() {
        let mut doc = from_yaml("env:\n- name: HOST\n- name: PORT\n  value: '80'\n").unwrap();
        let op = Operation::AddKey {
            key: Path::from_segments(vec![PathSegment::field("env"), PathSegment::index(1)]),
            overwrite: true,
            overwrite_value: from_yaml("{name: PORT, value: '8080'}").unwrap(),
        };
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            doc,
            from_yaml("env:\n- name: HOST\n- name: PORT\n  value: '8080'\n").unwrap()
        );
    }

    #[test]
    fn test_add_key_fills_in_null_leaf_without_overwrite() {
        let mut doc = from_yaml("serviceAccount:\n  create: ~\n").unwrap();
        let op = add(&["serviceAccount", "create"], false, Value::Bool(false));
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!((outcome, detail), (Outcome::Applied, None));
        assert_eq!(doc, from_yaml("serviceAccount:\n  create: false\n").unwrap());
    }

    #[test]
    fn test_add_key_rejected_list_index_leaves_document() {
        let source = "microservice: {}\n";
        let mut doc = from_yaml(source).unwrap();
        let op = Operation::AddKey {
            key: Path::from_segments(vec![
                PathSegment::field("microservice"),
                PathSegment::field("env"),
                PathSegment::index(5),
            ]),
            overwrite: false,
            overwrite_value: Value::from("late"),
        };
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::Reject);
        assert_eq!(outcome, Outcome::Failed);
        assert!(detail.unwrap().contains("past the end"));
        // The failed add must not leave a freshly created env list behind.
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_add_key_type_mismatch_fails_and_leaves_document() {
        let source = "image: just-a-string\n";
        let mut doc = from_yaml(source).unwrap();
        let op = add(&["image", "tag"], true, Value::from("v2"));
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Failed);
        assert!(detail.unwrap().contains("expects a map"));
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_remove_key() {
        let mut doc = from_yaml("image:\n  repository: repo\n  tag: v1\n").unwrap();
        let op = Operation::RemoveKey {
            key: path(&["image", "tag"]),
        };
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("image:\n  repository: repo\n").unwrap());
    }

    #[test]
    fn test_remove_key_is_idempotent() {
        let mut doc = from_yaml("image:\n  tag: v1\n").unwrap();
        let op = Operation::RemoveKey {
            key: path(&["image", "tag"]),
        };
        apply(&mut doc, &op, ListGrowth::default());
        let after_first = doc.clone();
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::SkippedAbsent);
        assert_eq!(doc, after_first);
    }

    #[test]
    fn test_remove_absent_key_is_a_noop() {
        let source = "image:\n  tag: v1\n";
        let mut doc = from_yaml(source).unwrap();
        let op = Operation::RemoveKey {
            key: path(&["image", "taggy"]),
        };
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::SkippedAbsent);
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_rename_key_moves_value() {
        let mut doc = from_yaml("image:\n  repository: repo\n").unwrap();
        let op = rename(&["image", "repository"], &["image", "registry"], false);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("image:\n  registry: repo\n").unwrap());
    }

    #[test]
    fn test_rename_key_absent_source_is_skipped() {
        let source = "image:\n  repository: repo\n";
        let mut doc = from_yaml(source).unwrap();
        let op = rename(&["image", "repositorry"], &["image", "repository"], false);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::SkippedAbsent);
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_rename_key_null_source_is_skipped() {
        let source = "image:\n  repository: ~\n";
        let mut doc = from_yaml(source).unwrap();
        let op = rename(&["image", "repository"], &["image", "registry"], false);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::SkippedAbsent);
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_rename_key_overwrites_null_destination() {
        let mut doc = from_yaml("podAnnotations:\n  a: '1'\nannotations: ~\n").unwrap();
        let op = rename(&["podAnnotations"], &["annotations"], true);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("annotations:\n  a: '1'\n").unwrap());
    }

    #[test]
    fn test_rename_key_overwrites_destination_without_merge() {
        let mut doc = from_yaml("podAnnotations:\n  a: '1'\nannotations:\n  b: '2'\n").unwrap();
        let op = rename(&["podAnnotations"], &["annotations"], false);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("annotations:\n  a: '1'\n").unwrap());
    }

    #[test]
    fn test_rename_key_merge_destination_wins() {
        let mut doc = from_yaml(concat!(
            "podAnnotations:\n",
            "  sidecar.istio.io/inject: 'true'\n",
            "  shared: from-old\n",
            "annotations:\n",
            "  reloader.stakater.com/auto: 'true'\n",
            "  shared: from-new\n",
        ))
        .unwrap();
        let op = rename(&["podAnnotations"], &["annotations"], true);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(
            doc,
            from_yaml(concat!(
                "annotations:\n",
                "  reloader.stakater.com/auto: 'true'\n",
                "  shared: from-new\n",
                "  sidecar.istio.io/inject: 'true'\n",
            ))
            .unwrap()
        );
    }

    #[test]
    fn test_rename_key_merge_non_map_fails_without_data_loss() {
        let source = "old: scalar\nnew:\n  k: v\n";
        let mut doc = from_yaml(source).unwrap();
        let op = rename(&["old"], &["new"], true);
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(detail.as_deref(), Some("merge requires map values"));
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_rename_key_write_failure_restores_old_value() {
        // The destination write is only refused after the old value has been
        // removed, so the executor has to put it back.
        let source = "a:\n  b: 1\nc: []\n";
        let mut doc = from_yaml(source).unwrap();
        let op = Operation::RenameKey {
            old_key: path(&["a", "b"]),
            new_key: Path::from_segments(vec![PathSegment::field("c"), PathSegment::index(2)]),
            merge: false,
        };
        let (outcome, detail) = apply(&mut doc, &op, ListGrowth::Reject);
        assert_eq!(outcome, Outcome::Failed);
        assert!(detail.unwrap().contains("past the end"));
        assert_eq!(doc, from_yaml(source).unwrap());
    }

    #[test]
    fn test_rename_key_into_new_subtree() {
        let mut doc = from_yaml("a:\n  x: 1\n").unwrap();
        let op = rename(&["a", "x"], &["b", "c", "x"], true);
        let (outcome, _) = apply(&mut doc, &op, ListGrowth::default());
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(doc, from_yaml("a: {}\nb:\n  c:\n    x: 1\n").unwrap());
    }
}
