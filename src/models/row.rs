//! Key and row projections of a record
//!
//! A [`RowType`] is the layout of a record's rows (all fields) or keys
//! (primary key fields only), generated from the record's field order. Rows
//! built from it offer positional and named access to their values.

use super::Options;
use super::error::{Result, SchemaError};
use serde_json::Value;
use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

/// Layout of a row derived from a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowType {
    name: String,
    record_id: String,
    fields: Vec<String>,
    key_fields: Vec<String>,
}

impl RowType {
    pub(crate) fn new(record_id: &str, fields: Vec<String>, key_fields: Vec<String>) -> Self {
        Self {
            name: pascalize(&format!("{}_record", record_id)),
            record_id: record_id.to_string(),
            fields,
            key_fields,
        }
    }

    /// Layout of the primary key part of this row type
    pub fn key_type(&self) -> RowType {
        RowType {
            name: pascalize(&format!("{}_key", self.record_id)),
            record_id: self.record_id.clone(),
            fields: self.key_fields.clone(),
            key_fields: self.key_fields.clone(),
        }
    }

    /// Type name, e.g. `PersonRecord` or `PersonKey`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    pub fn key_field_names(&self) -> &[String] {
        &self.key_fields
    }

    /// Build a row from named values.
    ///
    /// Every field must be given exactly once; missing, unknown or repeated
    /// names are rejected.
    pub fn build<I, K>(&self, values: I) -> Result<Row>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.fields.len()];
        let mut unknown = Vec::new();
        for (name, value) in values {
            let name = name.into();
            match self.fields.iter().position(|f| *f == name) {
                Some(idx) if slots[idx].is_some() => {
                    return Err(self.invalid(format!("field '{}' given more than once", name)));
                }
                Some(idx) => slots[idx] = Some(value),
                None => unknown.push(name),
            }
        }
        if !unknown.is_empty() {
            return Err(self.invalid(format!("unknown field(s): {}", unknown.join(", "))));
        }

        let missing: Vec<&str> = self
            .fields
            .iter()
            .zip(&slots)
            .filter(|(_, slot)| slot.is_none())
            .map(|(name, _)| name.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(self.invalid(format!("missing field(s): {}", missing.join(", "))));
        }

        Ok(Row {
            row_type: Arc::new(self.clone()),
            values: slots.into_iter().flatten().collect(),
        })
    }

    /// Build a row from values given in field order
    pub fn from_values(&self, values: Vec<Value>) -> Result<Row> {
        if values.len() != self.fields.len() {
            return Err(self.invalid(format!(
                "expected {} value(s), got {}",
                self.fields.len(),
                values.len()
            )));
        }
        Ok(Row {
            row_type: Arc::new(self.clone()),
            values,
        })
    }

    fn invalid(&self, message: String) -> SchemaError {
        SchemaError::InvalidRow {
            type_name: self.name.clone(),
            message,
        }
    }
}

/// A row of values laid out by a [`RowType`]
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    row_type: Arc<RowType>,
    values: Vec<Value>,
}

impl Row {
    pub fn row_type(&self) -> &RowType {
        &self.row_type
    }

    /// Id of the record this row belongs to
    pub fn record_id(&self) -> &str {
        &self.row_type.record_id
    }

    /// Positional access
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Named access
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.row_type
            .fields
            .iter()
            .position(|f| f == name)
            .map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Field values keyed by field name
    pub fn field_values(&self) -> Options {
        self.row_type
            .fields
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// The primary key tuple of this row
    pub fn primary_key(&self) -> Result<Row> {
        let key_type = self.row_type.key_type();
        let key_names: HashSet<&str> = key_type.fields.iter().map(String::as_str).collect();
        let values = self
            .row_type
            .fields
            .iter()
            .zip(&self.values)
            .filter(|(name, _)| key_names.contains(name.as_str()))
            .map(|(_, value)| value.clone())
            .collect();
        key_type.from_values(values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

/// `person_phone_key` -> `PersonPhoneKey`
pub(crate) fn pascalize(value: &str) -> String {
    value
        .split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
