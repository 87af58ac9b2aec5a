//! Storage backend abstraction
//!
//! Schema documents are read from, and generated site files written to, a
//! [`StorageBackend`]:
//! - [`filesystem::FileSystemStorageBackend`]: a directory on the native file system
//! - [`memory::MemoryStorageBackend`]: an in-process map of paths to contents
//!
//! Paths are `/`-separated and relative to the backend root.

use async_trait::async_trait;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Trait for storage backends
#[async_trait(?Send)]
pub trait StorageBackend: Send + Sync {
    /// Read a file
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write a file, creating parent directories as needed and replacing any
    /// existing content
    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError>;

    /// List all files below a directory, recursively, as paths relative to
    /// that directory in lexical order
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError>;

    /// Check if a file exists
    async fn file_exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Read a file as UTF-8 text
    async fn read_to_string(&self, path: &str) -> Result<String, StorageError> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| StorageError::IoError(format!("File {} is not valid UTF-8: {}", path, e)))
    }
}

/// Join two storage paths with a single `/`, ignoring empty parts
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match (base.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, path),
    }
}

#[cfg(feature = "native-fs")]
pub mod filesystem;

pub mod memory;
