//! Relationships derived from foreign keys

use super::error::Result;
use super::schema::Schema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality on the referencing side of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// The referencing field alone is the record's primary key
    #[serde(rename = "0,1")]
    ZeroOrOne,
    #[serde(rename = "0..N")]
    ZeroOrMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::ZeroOrOne => "0,1",
            Cardinality::ZeroOrMany => "0..N",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed relationship from a referencing record to a referenced record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_record_id: String,
    pub target_record_id: String,
    /// Qualified name of the field carrying the foreign key
    pub source_field: String,
    /// Qualified name of the referenced field
    pub target_field: String,
    pub source_cardinality: Cardinality,
    pub target_cardinality: u32,
}

impl Relationship {
    /// Derive one relationship per foreign key, in record then field order.
    ///
    /// The source side is `0,1` when the foreign-keyed field alone is the
    /// complete primary key of its record, `0..N` otherwise. The target side
    /// is always 1. Fails if any foreign key does not resolve.
    pub fn derive_all(schema: &Schema) -> Result<Vec<Relationship>> {
        let mut relationships = Vec::new();
        for field in schema.all_fields().filter(|f| f.has_foreign_keys()) {
            let source_cardinality = if field.is_sole_primary_key() {
                Cardinality::ZeroOrOne
            } else {
                Cardinality::ZeroOrMany
            };
            for target in field.foreign_keys()? {
                relationships.push(Relationship {
                    source_record_id: field.record().id().to_string(),
                    target_record_id: target.record().id().to_string(),
                    source_field: field.qname(),
                    target_field: target.qname(),
                    source_cardinality,
                    target_cardinality: 1,
                });
            }
        }
        Ok(relationships)
    }
}
