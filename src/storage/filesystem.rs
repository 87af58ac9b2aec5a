//! File system storage backend
//!
//! ## Security
//!
//! Every path is resolved below the base directory. Parent-directory
//! components are rejected and resolved paths that escape the base directory
//! (for instance through a symlink) are refused.

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Storage backend rooted at a directory on the native file system
#[derive(Debug, Clone)]
pub struct FileSystemStorageBackend {
    base_path: PathBuf,
}

impl FileSystemStorageBackend {
    /// Create a backend rooted at `base_path`. The directory does not have to
    /// exist yet; it is created by the first write.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabular_schema::storage::filesystem::FileSystemStorageBackend;
    ///
    /// let backend = FileSystemStorageBackend::new("/tmp/site");
    /// assert!(backend.base_path().ends_with("site"));
    /// ```
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path.trim_start_matches('/'));

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(StorageError::PermissionDenied(format!(
                        "Path '{}' leaves the storage root",
                        path
                    )));
                }
            }
        }

        let full = self.base_path.join(relative);

        // Check the deepest existing ancestor against the canonical base so
        // symlinks cannot point outside of it
        let Ok(base) = self.base_path.canonicalize() else {
            return Ok(full);
        };
        let existing = full.ancestors().find(|p| p.exists());
        if let Some(existing) = existing {
            let canonical = existing
                .canonicalize()
                .map_err(|e| StorageError::IoError(format!("Failed to resolve {}: {}", path, e)))?;
            if !canonical.starts_with(&base) {
                return Err(StorageError::PermissionDenied(format!(
                    "Path '{}' escapes the storage root",
                    path
                )));
            }
        }

        Ok(full)
    }
}

fn io_error(action: &str, path: &str, e: std::io::Error) -> StorageError {
    StorageError::IoError(format!("Failed to {} {}: {}", action, path, e))
}

#[async_trait(?Send)]
impl StorageBackend for FileSystemStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve_path(path)?;

        fs::read(&full_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::FileNotFound(path.to_string()),
            _ => io_error("read", path, e),
        })
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve_path(path)?;

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", path, e))?;
        }

        fs::write(&full_path, content)
            .await
            .map_err(|e| io_error("write", path, e))?;
        debug!(path = %full_path.display(), bytes = content.len(), "Wrote file");
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let root = self.resolve_path(dir)?;

        let mut files = Vec::new();
        let mut pending = vec![root.clone()];
        while let Some(current) = pending.pop() {
            let mut read_dir = fs::read_dir(&current).await.map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::DirectoryNotFound(dir.to_string()),
                _ => io_error("read directory", dir, e),
            })?;

            while let Some(entry) = read_dir
                .next_entry()
                .await
                .map_err(|e| io_error("read directory entry in", dir, e))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| io_error("inspect entry in", dir, e))?;
                let entry_path = entry.path();
                if file_type.is_dir() {
                    pending.push(entry_path);
                } else if file_type.is_file()
                    && let Ok(relative) = entry_path.strip_prefix(&root)
                {
                    let parts: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().into_owned())
                        .collect();
                    files.push(parts.join("/"));
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve_path(path)?;

        match fs::metadata(&full_path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error("check existence of", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parent_components_rejected() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        for bad in ["../etc/passwd", "/foo/../../etc/passwd", "a/../../b"] {
            assert!(
                matches!(backend.resolve_path(bad), Err(StorageError::PermissionDenied(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_paths_allowed() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        assert!(backend.resolve_path("file.txt").is_ok());
        assert!(backend.resolve_path("_data/records.yml").is_ok());
        assert!(backend.resolve_path("/_records/person.md").is_ok());
        // Dots inside a name are not traversal
        assert!(backend.resolve_path("person.first_name.md").is_ok());
    }

    #[tokio::test]
    async fn test_write_read_and_list() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path().join("site"));

        backend.write_file("_data/records.yml", b"- id: person\n").await.unwrap();
        backend.write_file("_records/person.md", b"---\n").await.unwrap();
        backend.write_file("index.md", b"home").await.unwrap();

        assert_eq!(
            backend.read_to_string("_data/records.yml").await.unwrap(),
            "- id: person\n"
        );
        assert!(backend.file_exists("index.md").await.unwrap());
        assert!(!backend.file_exists("_data").await.unwrap());
        assert!(!backend.file_exists("missing.md").await.unwrap());

        let files = backend.list_files("").await.unwrap();
        assert_eq!(files, vec!["_data/records.yml", "_records/person.md", "index.md"]);
        assert_eq!(backend.list_files("_records").await.unwrap(), vec!["person.md"]);
    }

    #[tokio::test]
    async fn test_missing_paths() {
        let temp = TempDir::new().unwrap();
        let backend = FileSystemStorageBackend::new(temp.path());

        assert!(matches!(
            backend.read_file("nope.yml").await,
            Err(StorageError::FileNotFound(_))
        ));
        assert!(matches!(
            backend.list_files("nope").await,
            Err(StorageError::DirectoryNotFound(_))
        ));
    }
}
