//! Output storage
//!
//! This module is the filesystem side of the runner: it prepares the output
//! directory, resolves target filenames against it, and writes capture bytes.
//! Write failures are classified so a permissions problem, a full disk, and a
//! malformed path stay distinguishable in diagnostics.

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

/// A prepared output directory that target filenames resolve against
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Prepare the output directory, creating it if absent
    #[instrument]
    pub async fn prepare(root: &Path) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| classify_dir_error(root, e))?;

        let meta = tokio::fs::metadata(root)
            .await
            .map_err(|e| classify_dir_error(root, e))?;
        if !meta.is_dir() {
            return Err(StorageError::InvalidPath(format!(
                "{} exists but is not a directory",
                root.display()
            )));
        }

        debug!("Output directory ready: {}", root.display());
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// The directory all writes go under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative filename against the output directory
    ///
    /// Rejects absolute paths and parent-directory components so a target
    /// filename can never escape the output directory.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, StorageError> {
        if filename.is_empty() {
            return Err(StorageError::InvalidPath("empty filename".to_string()));
        }
        let relative = Path::new(filename);
        if relative.is_absolute() {
            return Err(StorageError::InvalidPath(format!(
                "absolute path not allowed: {}",
                filename
            )));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) => {}
                Component::ParentDir => {
                    return Err(StorageError::InvalidPath(format!(
                        "path escapes output directory: {}",
                        filename
                    )))
                }
                _ => {
                    return Err(StorageError::InvalidPath(format!(
                        "unsupported path component in: {}",
                        filename
                    )))
                }
            }
        }
        Ok(self.root.join(relative))
    }

    /// Write capture bytes to `filename` under the output directory,
    /// creating parent directories as needed. Returns the full path written.
    #[instrument(skip(self, data))]
    pub async fn write(&self, filename: &str, data: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.resolve(filename)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| classify_dir_error(parent, e))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| classify_write_error(&path, e))?;

        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(path)
    }
}

fn classify_dir_error(path: &Path, err: std::io::Error) -> StorageError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => StorageError::NotWritable {
            path: path.to_path_buf(),
            source: err,
        },
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => StorageError::DiskFull {
            path: path.to_path_buf(),
        },
        ErrorKind::NotADirectory | ErrorKind::InvalidInput => {
            StorageError::InvalidPath(path.display().to_string())
        }
        _ => StorageError::CreateDirFailed {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

fn classify_write_error(path: &Path, err: std::io::Error) -> StorageError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => StorageError::NotWritable {
            path: path.to_path_buf(),
            source: err,
        },
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => StorageError::DiskFull {
            path: path.to_path_buf(),
        },
        ErrorKind::NotADirectory | ErrorKind::InvalidInput => {
            StorageError::InvalidPath(path.display().to_string())
        }
        _ => StorageError::WriteFailed {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("nested").join("out");
        let dir = OutputDir::prepare(&root).await.unwrap();
        assert!(dir.root().is_dir());
    }

    #[tokio::test]
    async fn test_prepare_rejects_file_at_path() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        tokio::fs::write(&file, b"x").await.unwrap();
        let result = OutputDir::prepare(&file).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_joins_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        let path = dir.resolve("home.png").unwrap();
        assert_eq!(path, tmp.path().join("home.png"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_absolute_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        assert!(matches!(
            dir.resolve("/etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_rejects_parent_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        match dir.resolve("../escape.png") {
            Err(StorageError::InvalidPath(msg)) => assert!(msg.contains("escapes")),
            other => panic!("expected invalid path error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_rejects_curdir_component_without_escape_wording() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        match dir.resolve("./home.png") {
            Err(StorageError::InvalidPath(msg)) => {
                assert!(msg.contains("unsupported path component"));
                assert!(!msg.contains("escapes"));
            }
            other => panic!("expected invalid path error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        let path = dir.write("mobile/pages/home.png", b"data").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"data");
        assert!(path.starts_with(tmp.path()));
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = OutputDir::prepare(tmp.path()).await.unwrap();
        dir.write("home.png", b"first").await.unwrap();
        let path = dir.write("home.png", b"second").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");
    }
}
