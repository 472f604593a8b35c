//! Chart directory discovery.

use std::path::PathBuf;
use tracing::warn;
use walkdir::WalkDir;

/// Recursively finds every `Chart.yaml` under the given roots.
///
/// Unreadable entries are logged and skipped; results are sorted so runs
/// are deterministic across filesystems.
pub fn discover_charts(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for root in roots {
        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && entry.file_name() == "Chart.yaml" {
                found.push(entry.into_path());
            }
        }
    }
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discovers_nested_charts() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("charts/app");
        let b = dir.path().join("charts/deep/nested/svc");
        std::fs::create_dir_all(&a).unwrap();
        std::fs::create_dir_all(&b).unwrap();
        std::fs::write(a.join("Chart.yaml"), "name: app\n").unwrap();
        std::fs::write(b.join("Chart.yaml"), "name: svc\n").unwrap();
        std::fs::write(a.join("values.yaml"), "{}\n").unwrap();

        let found = discover_charts(&[dir.path().to_path_buf()]);
        assert_eq!(found, vec![a.join("Chart.yaml"), b.join("Chart.yaml")]);
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let found = discover_charts(&[dir.path().join("does-not-exist")]);
        assert!(found.is_empty());
    }
}
