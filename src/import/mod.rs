//! Import functionality
//!
//! Builds a [`Schema`](crate::models::Schema) from a schema document:
//! - YAML
//! - JSON, including JSON with comments and trailing commas (JSON5)
//! - an in-memory `serde_json::Value`
//!
//! [`SchemaLoader`] reads documents through a
//! [`StorageBackend`](crate::storage::StorageBackend).

pub mod loader;
pub mod schema;

use crate::models::SchemaError;
use crate::storage::StorageError;

/// Error during import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("IO error: {0}")]
    IoError(String),
}

// Re-export for convenience
pub use loader::SchemaLoader;
pub use schema::{DocumentFormat, SchemaImporter};
