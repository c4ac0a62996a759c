//! Directory reconciliation against the current schema.
//!
//! The mappers directory holds one subdirectory per model. Before emission,
//! directories of models that disappeared from the schema are removed so
//! stale artifacts never linger.

use crate::codegen::utils::to_kebab_name;
use crate::error::{MapperError, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Directory names that are never treated as model directories
pub const EXCLUDED_DIRS: &[&str] = &["node_modules"];

/// Outcome of a reconciliation pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub removed: Vec<String>,
    pub created: Vec<String>,
}

/// Canonical directory names for a set of model names
pub fn canonical_dirs<'a, I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().map(to_kebab_name).collect()
}

fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

/// List model directories currently on disk, sorted by name
pub fn existing_model_dirs(mappers_dir: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();

    let read_dir = fs::read_dir(mappers_dir).map_err(|e| MapperError::io(mappers_dir, e))?;
    for entry in read_dir {
        let entry = entry.map_err(|e| MapperError::io(mappers_dir, e))?;
        let file_type = entry.file_type().map_err(|e| MapperError::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            if !is_excluded(name) {
                dirs.push(name.to_string());
            }
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Remove model directories not in `canonical`, then create the missing ones.
///
/// Unrelated directories (`node_modules`, hidden directories) and plain files
/// are left alone.
pub fn reconcile_model_dirs(
    mappers_dir: &Path,
    canonical: &BTreeSet<String>,
) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for dir in existing_model_dirs(mappers_dir)? {
        if canonical.contains(&dir) {
            continue;
        }

        let path = mappers_dir.join(&dir);
        fs::remove_dir_all(&path).map_err(|e| MapperError::io(&path, e))?;
        tracing::info!("Removed directory for non-existent model: {}", dir);
        report.removed.push(dir);
    }

    for dir in canonical {
        let path = mappers_dir.join(dir);
        if !path.is_dir() {
            fs::create_dir_all(&path).map_err(|e| MapperError::write(&path, e))?;
            tracing::debug!("Created model directory: {}", dir);
            report.created.push(dir.clone());
        }
    }

    Ok(report)
}

/// Remove one artifact file from every model directory not in `canonical`.
///
/// `artifact_name` maps a directory name to the artifact's file name. The
/// forms pipeline shares model directories with the schema pipeline, so it
/// removes its own files instead of whole directories.
pub fn remove_stale_artifacts<F>(
    mappers_dir: &Path,
    canonical: &BTreeSet<String>,
    artifact_name: F,
) -> Result<Vec<String>>
where
    F: Fn(&str) -> String,
{
    let mut removed = Vec::new();

    for dir in existing_model_dirs(mappers_dir)? {
        if canonical.contains(&dir) {
            continue;
        }

        let path = mappers_dir.join(&dir).join(artifact_name(&dir));
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| MapperError::io(&path, e))?;
            tracing::info!("Removed stale artifact: {}", path.display());
            removed.push(dir);
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_canonical_dirs_use_kebab_names() {
        let dirs = canonical_dirs(["UserProfile", "Post"]);
        assert!(dirs.contains("user-profile"));
        assert!(dirs.contains("post"));
    }

    #[test]
    fn test_reconcile_removes_stale_and_creates_missing() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("user")).unwrap();
        fs::create_dir_all(root.join("legacy")).unwrap();
        fs::write(root.join("legacy/legacy.model.ts"), "stale").unwrap();

        let report = reconcile_model_dirs(root, &canonical_dirs(["User", "Post"])).unwrap();

        assert_eq!(report.removed, vec!["legacy".to_string()]);
        assert_eq!(report.created, vec!["post".to_string()]);
        assert!(!root.join("legacy").exists());
        assert!(root.join("user").is_dir());
        assert!(root.join("post").is_dir());
    }

    #[test]
    fn test_reconcile_keeps_excluded_dirs_and_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("node_modules/zod")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("schema.tw"), "# schema").unwrap();

        let report = reconcile_model_dirs(root, &canonical_dirs(["User"])).unwrap();

        assert!(report.removed.is_empty());
        assert!(root.join("node_modules/zod").is_dir());
        assert!(root.join(".cache").is_dir());
        assert!(root.join("schema.tw").is_file());
    }

    #[test]
    fn test_remove_stale_artifacts_only_touches_matching_files() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("post")).unwrap();
        fs::write(root.join("post/post.form.ts"), "old").unwrap();
        fs::write(root.join("post/post.model.ts"), "keep").unwrap();
        fs::create_dir_all(root.join("user")).unwrap();
        fs::write(root.join("user/user.form.ts"), "keep").unwrap();

        let removed = remove_stale_artifacts(root, &canonical_dirs(["User"]), |dir| format!("{}.form.ts", dir)).unwrap();

        assert_eq!(removed, vec!["post".to_string()]);
        assert!(!root.join("post/post.form.ts").exists());
        assert!(root.join("post/post.model.ts").exists());
        assert!(root.join("user/user.form.ts").exists());
    }
}
