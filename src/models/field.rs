//! Field model
//!
//! A field is a single column of a table or element of a record. Its
//! datatype and foreign keys are stored by reference (ids and qualified
//! names) and resolved against the owning schema when accessed through a
//! [`FieldRef`].

use super::Options;
use super::datatype::{DEFAULT_DATATYPE, Datatype};
use super::error::Result;
use super::record::Record;
use super::reference::ContainerRef;
use super::schema::Schema;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

/// Prefix marking a primary key in the field shorthand notation (`"*id"`)
pub const PRIMARY_KEY_MARKER: char = '*';

/// A named column belonging to a record
///
/// # Example
///
/// ```rust
/// use tabular_schema::models::Field;
///
/// let owner = Field::new("owner_id")
///     .with_datatype("integer")
///     .with_foreign_key("person.id");
/// assert_eq!(owner.qname(), "None.owner_id");
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    id: String,
    label: Option<String>,
    datatype: String,
    primary_key: bool,
    foreign_keys: Vec<String>,
    description: Option<String>,
    options: Options,
    record: ContainerRef,
}

impl Field {
    /// Create an orphaned field of the default datatype
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            datatype: DEFAULT_DATATYPE.to_string(),
            primary_key: false,
            foreign_keys: Vec::new(),
            description: None,
            options: Options::new(),
            record: ContainerRef::detached(),
        }
    }

    /// Parse the shorthand notation used in record literals: a plain id, or
    /// an id prefixed with `*` for a primary key.
    pub fn from_shorthand(value: &str) -> Self {
        match value.strip_prefix(PRIMARY_KEY_MARKER) {
            Some(id) => Field::new(id).with_primary_key(true),
            None => Field::new(value),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the datatype, by id or from a [`Datatype`]
    pub fn with_datatype(mut self, datatype: impl AsRef<str>) -> Self {
        self.datatype = datatype.as_ref().to_string();
        self
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Add a foreign key to the field with qualified name `qname`
    pub fn with_foreign_key(mut self, qname: impl Into<String>) -> Self {
        self.foreign_keys.push(qname.into());
        self
    }

    pub fn with_foreign_keys<I, S>(mut self, qnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.foreign_keys.extend(qnames.into_iter().map(Into::into));
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

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, defaulting to the id
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Id of the referenced datatype (unresolved)
    pub fn datatype_id(&self) -> &str {
        &self.datatype
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Qualified names of the referenced fields (unresolved)
    pub fn foreign_key_refs(&self) -> &[String] {
        &self.foreign_keys
    }

    pub fn has_foreign_keys(&self) -> bool {
        !self.foreign_keys.is_empty()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Id of the owning record, `"None"` while the field is orphaned
    pub fn record_id(&self) -> &str {
        self.record.id()
    }

    pub fn is_attached(&self) -> bool {
        self.record.is_attached()
    }

    /// Qualified name `<record_id>.<field_id>`
    pub fn qname(&self) -> String {
        format!("{}.{}", self.record.id(), self.id)
    }

    /// Copy of this field that does not share the owner reference
    pub fn to_detached(&self) -> Field {
        Field {
            record: ContainerRef::detached(),
            ..self.clone()
        }
    }

    pub(crate) fn owner(&self) -> &ContainerRef {
        &self.record
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::from_shorthand(value)
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::from_shorthand(&value)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A field resolved within its schema
///
/// Gives access to the owning record and schema and resolves the datatype
/// and foreign keys lazily, on each call.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'s> {
    schema: &'s Schema,
    record: &'s Record,
    field: &'s Field,
}

impl<'s> FieldRef<'s> {
    pub(crate) fn new(schema: &'s Schema, record: &'s Record, field: &'s Field) -> Self {
        Self {
            schema,
            record,
            field,
        }
    }

    pub fn field(&self) -> &'s Field {
        self.field
    }

    pub fn record(&self) -> &'s Record {
        self.record
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Resolve the datatype in the schema registry
    pub fn datatype(&self) -> Result<&'s Datatype> {
        self.schema.get_datatype(self.field.datatype_id())
    }

    /// Resolve every foreign key through the schema's field lookup
    pub fn foreign_keys(&self) -> Result<Vec<FieldRef<'s>>> {
        self.field
            .foreign_key_refs()
            .iter()
            .map(|qname| self.schema.get_field(qname))
            .collect()
    }

    /// Whether this field alone is the complete primary key of its record
    pub fn is_sole_primary_key(&self) -> bool {
        let keys = self.record.primary_keys();
        keys.len() == 1 && keys[0].id() == self.field.id()
    }
}

impl Deref for FieldRef<'_> {
    type Target = Field;

    fn deref(&self) -> &Field {
        self.field
    }
}

impl PartialEq for FieldRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.record.id() == other.record.id() && self.field.id() == other.field.id()
    }
}

impl Eq for FieldRef<'_> {}

impl fmt::Display for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.record.id(), self.field.id())
    }
}
