//! Tabular Schema SDK - object model for tabular data schemas
//!
//! Provides unified interfaces for:
//! - The schema object model (records, fields, datatypes, foreign keys)
//! - Parsing schema documents (YAML, JSON, JSON5)
//! - Entity relationship diagrams (Graphviz)
//! - Static-site documentation (Jekyll data files and collections)
//! - Schema validation
//! - File operations via storage backends

pub mod cli;
pub mod export;
pub mod import;
pub mod models;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use storage::memory::MemoryStorageBackend;
pub use storage::{StorageBackend, StorageError};
#[cfg(feature = "native-fs")]
pub use storage::filesystem::FileSystemStorageBackend;

pub use export::{DocgenConfig, ErdExporter, ExportError, ExportResult, SiteWriter};
pub use import::{ImportError, SchemaImporter, SchemaLoader};
pub use validation::{SchemaValidator, Severity, ValidationError, ValidationIssue, ValidationReport};

// Re-export models
pub use models::{
    Cardinality, ConstructionError, Datatype, DatatypeRegistry, DatatypeRestriction, Field,
    FieldRef, ItemKind, Options, Record, RecordMut, Relationship, Row, RowType, Schema,
    SchemaError,
};
