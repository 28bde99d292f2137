//! Path validation and normalization for CLI arguments.
//!
//! Every lifecycle tool validates and normalizes its path arguments before
//! any external command runs; failures here are validation errors and the
//! process exits without side effects.

use std::env;

use anyhow::Result;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use crate::error::ChrootctlError;

/// Returns `path` as an absolute, lexically normalized path.
///
/// Relative paths are resolved against the current directory; `.` and `..`
/// components are folded without touching the filesystem, so the result is
/// well-defined for paths that do not exist yet.
pub fn normalized(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        let cwd = env::current_dir()
            .map_err(|e| ChrootctlError::io("failed to determine current directory", e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
            ChrootctlError::Validation(format!(
                "current directory {} is not valid UTF-8",
                p.display()
            ))
        })?;
        cwd.join(path)
    };

    let mut parts: Vec<&str> = Vec::new();
    for component in absolute.components() {
        match component {
            Utf8Component::RootDir | Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                parts.pop();
            }
            Utf8Component::Normal(name) => parts.push(name),
            Utf8Component::Prefix(_) => {}
        }
    }

    let mut result = Utf8PathBuf::from("/");
    for part in parts {
        result.push(part);
    }
    Ok(result)
}

/// Normalizes `path` and requires it to be an existing directory.
pub fn existing_dir(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = normalized(path)?;
    if !path.exists() {
        return Err(ChrootctlError::Validation(format!("{} does not exist", path)).into());
    }
    if !path.is_dir() {
        return Err(ChrootctlError::Validation(format!("{} is not a directory", path)).into());
    }
    Ok(path)
}

/// Normalizes `path` and requires that nothing exists there yet.
pub fn vacant_path(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = normalized(path)?;
    if path.exists() || path.symlink_metadata().is_ok() {
        return Err(ChrootctlError::Validation(format!("{} already exists", path)).into());
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_folds_dot_components() {
        let path = normalized(Utf8Path::new("/srv/./containers/../box")).unwrap();
        assert_eq!(path, "/srv/box");
    }

    #[test]
    fn normalized_keeps_absolute_paths() {
        let path = normalized(Utf8Path::new("/srv/box")).unwrap();
        assert_eq!(path, "/srv/box");
    }

    #[test]
    fn normalized_excess_parents_stop_at_root() {
        let path = normalized(Utf8Path::new("/../../srv/box")).unwrap();
        assert_eq!(path, "/srv/box");
    }

    #[test]
    fn normalized_resolves_relative_against_cwd() {
        let path = normalized(Utf8Path::new("some/dir")).unwrap();
        assert!(path.is_absolute());
        assert!(path.as_str().ends_with("some/dir"));
    }

    #[test]
    fn existing_dir_accepts_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        assert_eq!(existing_dir(&path).unwrap(), path);
    }

    #[test]
    fn existing_dir_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("missing")).unwrap();
        let err = existing_dir(&path).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn existing_dir_rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        let path = Utf8PathBuf::from_path_buf(file).unwrap();
        let err = existing_dir(&path).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn vacant_path_rejects_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let err = vacant_path(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn vacant_path_rejects_dangling_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink("/nonexistent-target", &link).unwrap();
        let path = Utf8PathBuf::from_path_buf(link).unwrap();
        let err = vacant_path(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn vacant_path_accepts_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("new-box")).unwrap();
        assert_eq!(vacant_path(&path).unwrap(), path);
    }
}
