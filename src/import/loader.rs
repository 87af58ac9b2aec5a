//! Schema loading through a storage backend

use super::{ImportError, SchemaImporter};
use crate::models::Schema;
use crate::storage::{StorageBackend, join_path};
use tracing::{info, warn};

/// File extensions recognised as schema documents
pub const SCHEMA_EXTENSIONS: [&str; 4] = ["yml", "yaml", "json", "json5"];

/// A schema loaded from storage, with the path it was read from
#[derive(Debug)]
pub struct LoadedSchema {
    pub path: String,
    pub schema: Schema,
}

/// Result of loading every schema document in a directory
#[derive(Debug, Default)]
pub struct SchemaLoadResult {
    pub schemas: Vec<LoadedSchema>,
    /// Documents that failed to load, with the reason
    pub failures: Vec<(String, String)>,
}

/// Loads schema documents from a storage backend
pub struct SchemaLoader<B: StorageBackend> {
    storage: B,
    importer: SchemaImporter,
}

impl<B: StorageBackend> SchemaLoader<B> {
    /// Create a new schema loader with the given storage backend
    pub fn new(storage: B) -> Self {
        Self {
            storage,
            importer: SchemaImporter::new(),
        }
    }

    pub fn storage(&self) -> &B {
        &self.storage
    }

    /// Load and parse a single schema document
    pub async fn load(&self, path: &str) -> Result<Schema, ImportError> {
        let content = self.storage.read_to_string(path).await?;
        self.importer.parse_str(&content)
    }

    /// Load every schema document below `dir`.
    ///
    /// Documents that fail to parse are reported in
    /// [`SchemaLoadResult::failures`] rather than aborting the load.
    pub async fn load_all(&self, dir: &str) -> Result<SchemaLoadResult, ImportError> {
        let mut result = SchemaLoadResult::default();

        for file_name in self.storage.list_files(dir).await? {
            let is_schema = file_name
                .rsplit_once('.')
                .is_some_and(|(_, ext)| SCHEMA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_schema {
                continue;
            }

            let path = join_path(dir, &file_name);
            match self.load(&path).await {
                Ok(schema) => result.schemas.push(LoadedSchema { path, schema }),
                Err(e) => {
                    warn!("Failed to load schema from {}: {}", path, e);
                    result.failures.push((path, e.to_string()));
                }
            }
        }

        info!(
            "Loaded {} schemas ({} failed) from {}",
            result.schemas.len(),
            result.failures.len(),
            dir
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorageBackend;

    #[tokio::test]
    async fn test_load() {
        let storage = MemoryStorageBackend::with_files([(
            "schemas/pets.yml",
            "id: pets\nrecords:\n  person:\n    fields: ['*id']\n",
        )]);
        let loader = SchemaLoader::new(storage);

        let schema = loader.load("schemas/pets.yml").await.unwrap();
        assert_eq!(schema.id(), "pets");

        assert!(matches!(
            loader.load("schemas/missing.yml").await,
            Err(ImportError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_all_collects_failures() {
        let storage = MemoryStorageBackend::with_files([
            ("schemas/a.yml", "id: a\n"),
            ("schemas/b.json", "{\"id\": \"b\"}"),
            ("schemas/broken.yaml", "records: 3\n"),
            ("schemas/README.md", "# not a schema"),
        ]);
        let loader = SchemaLoader::new(storage);

        let result = loader.load_all("schemas").await.unwrap();
        let ids: Vec<&str> = result.schemas.iter().map(|s| s.schema.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].0, "schemas/broken.yaml");
    }
}
