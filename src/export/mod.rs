//! Export functionality
//!
//! Provides exporters for documentation artifacts:
//! - ERD (Graphviz DOT, optionally rendered to SVG/PNG by the `circo` engine)
//! - Static-site data files and collection pages (Jekyll layout)

pub mod config;
pub mod erd;
pub mod site;

use crate::models::SchemaError;
use crate::storage::StorageError;

/// Result of an export operation
#[derive(Debug)]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Renderer error: {0}")]
    RendererError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        ExportError::SerializationError(err.to_string())
    }
}

// Re-export for convenience
pub use config::DocgenConfig;
pub use erd::{ErdContext, ErdExporter};
pub use site::SiteWriter;
