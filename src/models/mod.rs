//! Schema object model
//!
//! Records, fields and datatypes, owned by a [`Schema`] which resolves
//! references between them (field to datatype, field to foreign key) on
//! access rather than at construction time.

pub mod datatype;
pub mod error;
pub mod field;
pub mod record;
pub mod reference;
pub mod relationship;
pub mod row;
pub mod schema;

pub use datatype::{
    Datatype, DatatypeRegistry, DatatypeRestriction, STANDARD_TYPE_IDS, WhitespaceRestriction,
    standard_types,
};
pub use error::{ConstructionError, ItemKind, Result, SchemaError};
pub use field::{Field, FieldRef};
pub use record::Record;
pub use reference::{ContainerRef, UNATTACHED};
pub use relationship::{Cardinality, Relationship};
pub use row::{Row, RowType};
pub use schema::{RecordMut, Schema, split_qname};

/// Free-form extension metadata attached to schema items
pub type Options = serde_json::Map<String, serde_json::Value>;
