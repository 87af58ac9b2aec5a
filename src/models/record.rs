//! Record model
//!
//! A record is an ordered collection of fields, the equivalent of a table in
//! a database or a sheet in a workbook.

use super::Options;
use super::error::{ConstructionError, ItemKind, Result, SchemaError};
use super::field::Field;
use super::reference::ContainerRef;
use super::row::RowType;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// A named, ordered collection of fields
///
/// Field order is insertion order and is preserved by every view.
///
/// # Example
///
/// ```rust
/// use tabular_schema::models::{Field, Record};
///
/// let pet = Record::with_fields(
///     "pet",
///     [Field::from("*id"), Field::new("owner_id").with_foreign_key("person.id"), Field::from("name")],
/// )
/// .unwrap();
/// assert_eq!(pet.primary_keys().len(), 1);
/// assert_eq!(pet.get_field("owner_id").unwrap().qname(), "pet.owner_id");
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    id: String,
    label: Option<String>,
    description: Option<String>,
    options: Options,
    fields: Vec<Field>,
    schema: ContainerRef,
}

impl Record {
    /// Create an empty, orphaned record
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            description: None,
            options: Options::new(),
            fields: Vec::new(),
            schema: ContainerRef::detached(),
        }
    }

    /// Create a record that takes ownership of `fields`, in order.
    ///
    /// Every field is checked before any is attached, so on failure all of
    /// them stay orphaned.
    pub fn with_fields<I>(id: impl Into<String>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = Field>,
    {
        let mut record = Record::new(id);
        let fields: Vec<Field> = fields.into_iter().collect();

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.id()) {
                return Err(record.duplicate_field(field.id()));
            }
            field
                .owner()
                .check_attach(&record.id, ItemKind::Field, field.id())?;
        }

        for field in fields {
            record.add_field(field)?;
        }
        Ok(record)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Append a field, attaching it to this record.
    ///
    /// Field ids are unique within a record; a duplicate is rejected rather
    /// than shadowing the existing field.
    pub fn add_field(&mut self, field: Field) -> Result<&Field> {
        if self.contains_field(field.id()) {
            return Err(self.duplicate_field(field.id()));
        }
        field.owner().attach(&self.id, ItemKind::Field, field.id())?;
        self.fields.push(field);
        Ok(&self.fields[self.fields.len() - 1])
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, defaulting to the id
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// All fields in insertion order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields flagged as primary key, in field order
    pub fn primary_keys(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_primary_key()).collect()
    }

    /// Fields carrying at least one foreign key, in field order
    pub fn foreign_key_fields(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.has_foreign_keys()).collect()
    }

    pub fn get_field(&self, id: &str) -> Result<&Field> {
        self.fields
            .iter()
            .find(|f| f.id() == id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Field, format!("{}.{}", self.id, id)))
    }

    pub fn contains_field(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id() == id)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Id of the owning schema, `"None"` while the record is orphaned
    pub fn schema_id(&self) -> &str {
        self.schema.id()
    }

    pub fn is_attached(&self) -> bool {
        self.schema.is_attached()
    }

    /// Copy of this record that does not share the schema reference
    pub fn to_detached(&self) -> Record {
        Record {
            schema: ContainerRef::detached(),
            ..self.clone()
        }
    }

    /// Layout of the primary key tuple, named `<Id>Key`
    pub fn key_type(&self) -> RowType {
        self.row_type().key_type()
    }

    /// Layout of a full row, named `<Id>Record`
    pub fn row_type(&self) -> RowType {
        RowType::new(
            &self.id,
            self.fields.iter().map(|f| f.id().to_string()).collect(),
            self.primary_keys()
                .into_iter()
                .map(|f| f.id().to_string())
                .collect(),
        )
    }

    fn duplicate_field(&self, field_id: &str) -> SchemaError {
        ConstructionError::DuplicateId {
            kind: ItemKind::Field,
            id: field_id.to_string(),
            container: format!("record '{}'", self.id),
        }
        .into()
    }

    pub(crate) fn owner(&self) -> &ContainerRef {
        &self.schema
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Record {
        Record::with_fields(
            "person",
            [
                Field::from("*id"),
                Field::from("first_name"),
                Field::from("last_name"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let record = person();
        let ids: Vec<&str> = record.field_ids().collect();
        assert_eq!(ids, vec!["id", "first_name", "last_name"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_fields_are_attached() {
        let record = person();
        for field in record.fields() {
            assert_eq!(field.record_id(), "person");
        }
        assert_eq!(record.get_field("id").unwrap().qname(), "person.id");
    }

    #[test]
    fn test_attachment_visible_through_earlier_clone() {
        let field = Field::new("owner_id");
        let alias = field.clone();
        let _record = Record::with_fields("pet", [field]).unwrap();
        assert_eq!(alias.qname(), "pet.owner_id");
    }

    #[test]
    fn test_field_cannot_move_between_records() {
        let field = Field::new("id");
        let alias = field.clone();
        Record::with_fields("a", [field]).unwrap();
        let err = Record::with_fields("b", [alias]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Construction(ConstructionError::AlreadyAttached { .. })
        ));
    }

    #[test]
    fn test_failed_construction_leaves_fields_orphaned() {
        let field = Field::new("id");
        let alias = field.clone();
        let err = Record::with_fields("a", [field, Field::new("id")]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Construction(ConstructionError::DuplicateId { .. })
        ));
        assert!(!alias.is_attached());
        assert_eq!(alias.qname(), "None.id");

        let record = Record::with_fields("b", [alias.clone()]).unwrap();
        assert_eq!(alias.qname(), "b.id");
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_attached_field_rejected_before_any_attach() {
        let owned = Field::new("id");
        Record::with_fields("a", [owned.clone()]).unwrap();
        let fresh = Field::new("name");
        let alias = fresh.clone();

        assert!(Record::with_fields("b", [fresh, owned]).is_err());
        assert!(!alias.is_attached());
    }

    #[test]
    fn test_primary_keys_subset_of_fields() {
        let record = Record::with_fields(
            "address",
            [
                Field::new("owner_id").with_primary_key(true),
                "*type".into(),
                "address".into(),
            ],
        )
        .unwrap();
        let keys: Vec<&str> = record.primary_keys().iter().map(|f| f.id()).collect();
        assert_eq!(keys, vec!["owner_id", "type"]);
        assert!(record.primary_keys().len() <= record.fields().len());
        assert!(record.primary_keys().iter().all(|f| f.is_primary_key()));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let mut record = person();
        let err = record.add_field(Field::new("id")).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Construction(ConstructionError::DuplicateId { .. })
        ));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_get_field_not_found() {
        let err = person().get_field("age").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_label_defaults_to_id() {
        assert_eq!(person().label(), "person");
        assert_eq!(person().with_label("People").label(), "People");
    }

    #[test]
    fn test_orphaned_record_schema_placeholder() {
        assert_eq!(person().schema_id(), "None");
    }

    #[test]
    fn test_foreign_key_fields() {
        let record = Record::with_fields(
            "pet",
            ["*id".into(), Field::new("owner_id").with_foreign_key("person.id")],
        )
        .unwrap();
        let fks: Vec<&str> = record.foreign_key_fields().iter().map(|f| f.id()).collect();
        assert_eq!(fks, vec!["owner_id"]);
    }
}
