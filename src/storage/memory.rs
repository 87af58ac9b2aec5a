//! In-memory storage backend

use super::{StorageBackend, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Storage backend holding files in memory, keyed by normalized path
#[derive(Debug, Default)]
pub struct MemoryStorageBackend {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-populated with files
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<Vec<u8>>,
    {
        let files = files
            .into_iter()
            .map(|(path, content)| (normalize(path.as_ref()), content.into()))
            .collect();
        Self {
            files: Mutex::new(files),
        }
    }

    /// All stored paths in lexical order
    pub fn paths(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A poisoned map is still a consistent map
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn checked(path: &str) -> Result<String, StorageError> {
    if path.split('/').any(|part| part == "..") {
        return Err(StorageError::PermissionDenied(format!(
            "Path '{}' leaves the storage root",
            path
        )));
    }
    Ok(normalize(path))
}

#[async_trait(?Send)]
impl StorageBackend for MemoryStorageBackend {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = checked(path)?;
        self.lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::FileNotFound(path.to_string()))
    }

    async fn write_file(&self, path: &str, content: &[u8]) -> Result<(), StorageError> {
        let key = checked(path)?;
        if key.is_empty() {
            return Err(StorageError::IoError("Cannot write to the storage root".to_string()));
        }
        self.lock().insert(key, content.to_vec());
        Ok(())
    }

    async fn list_files(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let dir = checked(dir)?;
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };
        let files: Vec<String> = self
            .lock()
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect();
        if files.is_empty() && !dir.is_empty() {
            return Err(StorageError::DirectoryNotFound(dir));
        }
        Ok(files)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, StorageError> {
        let key = checked(path)?;
        Ok(self.lock().contains_key(&key))
    }
}
