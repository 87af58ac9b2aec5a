//! Error types for the schema object model

use std::fmt;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Kind of schema item, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Schema,
    Record,
    Field,
    Datatype,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemKind::Schema => "Schema",
            ItemKind::Record => "Record",
            ItemKind::Field => "Field",
            ItemKind::Datatype => "Datatype",
        };
        f.write_str(name)
    }
}

/// Errors raised while building or querying a schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// A record, field or datatype id does not exist in its container
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: String },

    /// A qualified field reference is not of the form `<record>.<field>`
    #[error("Invalid reference '{0}': expected '<record_id>.<field_id>'")]
    InvalidReference(String),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// A key or row projection was built with missing or unknown fields
    #[error("Invalid row for {type_name}: {message}")]
    InvalidRow { type_name: String, message: String },
}

impl SchemaError {
    pub(crate) fn not_found(kind: ItemKind, id: impl Into<String>) -> Self {
        SchemaError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SchemaError::NotFound { .. })
    }
}

/// Errors raised while constructing schema items
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Duplicate {kind} id '{id}' in {container}")]
    DuplicateId {
        kind: ItemKind,
        id: String,
        container: String,
    },

    #[error("Cannot define datatype '{id}': datatype '{extends}' not found")]
    UnknownExtends { id: String, extends: String },

    #[error("Missing required id for {0}")]
    MissingId(ItemKind),

    #[error("{kind} '{id}' is already attached to '{attached}', cannot attach to '{requested}'")]
    AlreadyAttached {
        kind: ItemKind,
        id: String,
        attached: String,
        requested: String,
    },
}
