//! Schema model
//!
//! The schema is the aggregate root: it owns all records and datatypes and is
//! the only entry point for cross-entity lookups.

use super::Options;
use super::datatype::{Datatype, DatatypeRegistry};
use super::error::{ConstructionError, ItemKind, Result, SchemaError};
use super::field::{Field, FieldRef};
use super::record::Record;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use tracing::debug;

/// Separator between record id and field id in a qualified name
pub const QNAME_SEPARATOR: char = '.';

/// Split a qualified field name into `(record_id, field_id)`.
///
/// Exactly one separator with a non-empty id on each side is accepted.
pub fn split_qname(qname: &str) -> Result<(&str, &str)> {
    let mut parts = qname.split(QNAME_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(record), Some(field), None) if !record.is_empty() && !field.is_empty() => {
            Ok((record, field))
        }
        _ => Err(SchemaError::InvalidReference(qname.to_string())),
    }
}

/// A tabular schema: a collection of datatypes and records
///
/// Schemas can be assembled declaratively from pre-built records
/// ([`Schema::from_records`]) or incrementally through
/// [`Schema::add_record`] and [`RecordMut::add_field`]; both produce the same
/// object graph.
///
/// # Example
///
/// ```rust
/// use tabular_schema::models::{Field, Record, Schema};
///
/// let mut schema = Schema::new("pets");
/// schema
///     .add_record(Record::new("person"))
///     .unwrap()
///     .add_field(Field::from("*id"))
///     .unwrap();
/// schema
///     .add_record(Record::new("pet"))
///     .unwrap()
///     .add_field(Field::new("owner_id").with_foreign_key("person.id"))
///     .unwrap();
///
/// let owner = schema.get_field("pet.owner_id").unwrap();
/// assert_eq!(owner.foreign_keys().unwrap()[0].qname(), "person.id");
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    id: String,
    version: Option<String>,
    description: Option<String>,
    options: Options,
    records: Vec<Record>,
    datatypes: DatatypeRegistry,
}

impl Schema {
    /// Create an empty schema with the standard datatypes
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_datatypes(id, DatatypeRegistry::standard())
    }

    /// Create an empty schema with a replacement datatype collection
    pub fn with_datatypes(id: impl Into<String>, datatypes: DatatypeRegistry) -> Self {
        Self {
            id: id.into(),
            version: None,
            description: None,
            options: Options::new(),
            records: Vec::new(),
            datatypes,
        }
    }

    /// Create a schema owning the given records, in order
    pub fn from_records<I>(id: impl Into<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut schema = Schema::new(id);
        schema.add_records(records)?;
        Ok(schema)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
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

    /// Append a record and attach it to this schema.
    ///
    /// The record may already carry fields; each field's datatype must be
    /// registered. Returns a handle for adding further fields.
    pub fn add_record(&mut self, record: Record) -> Result<RecordMut<'_>> {
        if self.records.iter().any(|r| r.id() == record.id()) {
            return Err(self.duplicate_record(record.id()));
        }
        self.check_record(&record)?;
        record
            .owner()
            .attach(&self.id, ItemKind::Record, record.id())?;

        debug!(
            schema = %self.id,
            record = %record.id(),
            fields = record.len(),
            "Added record"
        );
        self.records.push(record);
        let idx = self.records.len() - 1;
        Ok(RecordMut {
            record: &mut self.records[idx],
            datatypes: &self.datatypes,
        })
    }

    /// Append several records.
    ///
    /// Every record is checked before any is attached, so on failure the
    /// schema is unchanged and all of them stay orphaned.
    pub fn add_records<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Record>,
    {
        let records: Vec<Record> = records.into_iter().collect();

        let mut seen: HashSet<&str> = self.records.iter().map(Record::id).collect();
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(self.duplicate_record(record.id()));
            }
            self.check_record(record)?;
        }

        for record in records {
            self.add_record(record)?;
        }
        Ok(())
    }

    /// Datatypes resolve and the record is free to join this schema
    fn check_record(&self, record: &Record) -> Result<()> {
        for field in record.fields() {
            self.datatypes.get(field.datatype_id())?;
        }
        record
            .owner()
            .check_attach(&self.id, ItemKind::Record, record.id())
    }

    fn duplicate_record(&self, record_id: &str) -> SchemaError {
        ConstructionError::DuplicateId {
            kind: ItemKind::Record,
            id: record_id.to_string(),
            container: format!("schema '{}'", self.id),
        }
        .into()
    }

    /// Handle on an existing record for adding fields
    pub fn record_mut(&mut self, id: &str) -> Result<RecordMut<'_>> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Record, id))?;
        Ok(RecordMut {
            record,
            datatypes: &self.datatypes,
        })
    }

    /// Register an additional datatype
    pub fn add_datatype(&mut self, datatype: Datatype) -> Result<&Datatype> {
        self.datatypes.register(datatype)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Records in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn datatypes(&self) -> &DatatypeRegistry {
        &self.datatypes
    }

    pub fn get_record(&self, id: &str) -> Result<&Record> {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Record, id))
    }

    pub fn get_datatype(&self, id: &str) -> Result<&Datatype> {
        self.datatypes.get(id)
    }

    /// Look up a field by qualified name `<record_id>.<field_id>`.
    ///
    /// A malformed name is an [`SchemaError::InvalidReference`]; a well-formed
    /// name without a matching field is [`SchemaError::NotFound`].
    pub fn get_field(&self, qname: &str) -> Result<FieldRef<'_>> {
        let (record_id, field_id) = split_qname(qname)?;
        let record = self
            .records
            .iter()
            .find(|r| r.id() == record_id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Field, qname))?;
        let field = record
            .fields()
            .iter()
            .find(|f| f.id() == field_id)
            .ok_or_else(|| SchemaError::not_found(ItemKind::Field, qname))?;
        Ok(FieldRef::new(self, record, field))
    }

    /// All fields, in record order then field order
    pub fn all_fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        self.records.iter().flat_map(move |record| {
            record
                .fields()
                .iter()
                .map(move |field| FieldRef::new(self, record, field))
        })
    }

    /// Qualified names of all fields, in record order then field order
    pub fn field_names(&self) -> impl Iterator<Item = String> + '_ {
        self.all_fields().map(|f| f.qname())
    }

    pub fn field_count(&self) -> usize {
        self.records.iter().map(Record::len).sum()
    }

    /// Resolve the datatype of a field owned by this schema
    pub fn resolve_datatype(&self, field: &Field) -> Result<&Datatype> {
        self.datatypes.get(field.datatype_id())
    }

    /// Resolve the foreign keys of a field owned by this schema
    pub fn resolve_foreign_keys(&self, field: &Field) -> Result<Vec<FieldRef<'_>>> {
        field
            .foreign_key_refs()
            .iter()
            .map(|qname| self.get_field(qname))
            .collect()
    }

    /// Datatypes referenced by fields, plus the datatypes they extend, in
    /// registry order
    pub fn used_datatypes(&self) -> Vec<&Datatype> {
        let mut used: HashSet<&str> = HashSet::new();
        for field in self.records.iter().flat_map(Record::fields) {
            if let Ok(datatype) = self.datatypes.get(field.datatype_id()) {
                used.insert(datatype.id());
                used.extend(datatype.ancestors().map(Datatype::id));
            }
        }
        self.datatypes
            .iter()
            .filter(|dt| used.contains(dt.id()))
            .collect()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Mutable handle on a record owned by a schema
///
/// Fields added through the handle have their datatype checked against the
/// schema's registry.
#[derive(Debug)]
pub struct RecordMut<'a> {
    record: &'a mut Record,
    datatypes: &'a DatatypeRegistry,
}

impl RecordMut<'_> {
    pub fn add_field(&mut self, field: Field) -> Result<&Field> {
        self.datatypes.get(field.datatype_id())?;
        self.record.add_field(field)
    }

    /// Add several fields, stopping at the first failure
    pub fn add_fields<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = Field>,
    {
        for field in fields {
            self.add_field(field)?;
        }
        Ok(())
    }
}

impl Deref for RecordMut<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record
    }
}
