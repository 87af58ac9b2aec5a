//! Schema document parser
//!
//! A schema document is a mapping with optional `id`, `version`,
//! `description`, `datatypes` and `records` keys. Records, fields and
//! datatypes may each be given either as a mapping keyed by id or as a list
//! of items carrying their own `id`; an explicit `id` always wins over the
//! mapping key.
//!
//! ```yaml
//! id: pets
//! datatypes:
//!   postcode:
//!     extends: string
//!     restriction: { max_length: 8 }
//! records:
//!   person:
//!     color: LightPink       # unknown keys end up in the record options
//!     fields:
//!       id: { primary_key: true, type: integer }
//!       name: {}
//!   pet:
//!     fields:
//!       - "*id"              # shorthand: `*` marks a primary key
//!       - id: owner_id
//!         foreign_keys: person.id
//! ```

use super::ImportError;
use crate::models::{
    ConstructionError, Datatype, DatatypeRegistry, DatatypeRestriction, Field, ItemKind, Options,
    Record, Schema, SchemaError,
};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Schema id used when a document does not name one
pub const UNKNOWN_SCHEMA_ID: &str = "unknown";

/// Syntax of a schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    /// JSON, with JSON5 extensions such as comments
    Json,
}

impl DocumentFormat {
    /// Documents whose first non-blank character is `{` are JSON, everything
    /// else is YAML
    pub fn detect(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }
}

/// Parser for schema documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaImporter;

impl SchemaImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse a YAML or JSON schema document
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabular_schema::import::SchemaImporter;
    ///
    /// let schema = SchemaImporter::new()
    ///     .parse_str("records:\n  person:\n    fields: ['*id', name]\n")
    ///     .unwrap();
    /// assert_eq!(schema.id(), "unknown");
    /// assert!(schema.get_field("person.id").unwrap().is_primary_key());
    /// ```
    pub fn parse_str(&self, content: &str) -> Result<Schema, ImportError> {
        let document = self.parse_document(content)?;
        self.parse_value(document)
    }

    /// Parse a schema document from a file on the local file system
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Schema, ImportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ImportError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Parsing schema document");
        self.parse_str(&content)
    }

    /// Parse document text into a generic value without interpreting it
    pub fn parse_document(&self, content: &str) -> Result<Value, ImportError> {
        match DocumentFormat::detect(content) {
            DocumentFormat::Json => json5::from_str(content)
                .map_err(|e| ImportError::ParseError(format!("Failed to parse JSON: {}", e))),
            DocumentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ImportError::ParseError(format!("Failed to parse YAML: {}", e))),
        }
    }

    /// Build a schema from an already parsed document
    pub fn parse_value(&self, document: Value) -> Result<Schema, ImportError> {
        let Value::Object(mut document) = document else {
            return Err(parse_error("Schema document must be a mapping"));
        };

        let datatypes = self.parse_datatypes(document.remove("datatypes").unwrap_or(Value::Null))?;
        let records = document.remove("records").unwrap_or(Value::Null);

        let id = take_string(&mut document, "id")?.unwrap_or_else(|| UNKNOWN_SCHEMA_ID.to_string());
        let version = take_string(&mut document, "version")?;
        let description = take_string(&mut document, "description")?;

        let mut schema = Schema::with_datatypes(id, datatypes).with_options(take_options(document)?);
        if let Some(version) = version {
            schema = schema.with_version(version);
        }
        if let Some(description) = description {
            schema = schema.with_description(description);
        }

        for (key, record) in entries(records, "records")? {
            self.parse_record(&mut schema, key, record)?;
        }

        info!(
            schema = %schema.id(),
            records = schema.records().len(),
            fields = schema.field_count(),
            datatypes = schema.datatypes().len(),
            "Parsed schema"
        );
        Ok(schema)
    }

    /// Parse a single datatype definition.
    ///
    /// `extends` is resolved against `datatypes`; a definition that extends
    /// another datatype cannot be parsed without them.
    pub fn parse_datatype(
        &self,
        definition: Value,
        datatypes: Option<&DatatypeRegistry>,
    ) -> Result<Datatype, ImportError> {
        let (id, body) = item_body(None, definition, ItemKind::Datatype)?;
        datatype_from_body(id, body, datatypes)
    }

    /// Parse a collection of datatype definitions into a registry seeded with
    /// the standard types.
    ///
    /// Definitions are registered in document order, so a datatype can only
    /// extend standard types and datatypes defined before it.
    pub fn parse_datatypes(&self, definitions: Value) -> Result<DatatypeRegistry, ImportError> {
        let mut registry = DatatypeRegistry::standard();
        for (key, definition) in entries(definitions, "datatypes")? {
            let (id, body) = item_body(key, definition, ItemKind::Datatype)?;
            let datatype = datatype_from_body(id, body, Some(&registry))?;
            registry.register(datatype)?;
        }
        Ok(registry)
    }

    fn parse_record(
        &self,
        schema: &mut Schema,
        key: Option<String>,
        definition: Value,
    ) -> Result<(), ImportError> {
        // A bare list is shorthand for a record with only fields
        let definition = match definition {
            Value::Array(fields) => {
                let mut body = Map::new();
                body.insert("fields".to_string(), Value::Array(fields));
                Value::Object(body)
            }
            other => other,
        };

        let (id, mut body) = item_body(key, definition, ItemKind::Record)?;
        let fields = body.remove("fields").unwrap_or(Value::Null);

        let mut record = Record::new(id);
        if let Some(label) = take_string(&mut body, "label")? {
            record = record.with_label(label);
        }
        if let Some(description) = take_string(&mut body, "description")? {
            record = record.with_description(description);
        }
        let record = record.with_options(take_options(body)?);

        let mut handle = schema.add_record(record)?;
        for (key, field) in entries(fields, "fields")? {
            handle.add_field(self.parse_field(key, field)?)?;
        }
        Ok(())
    }

    fn parse_field(&self, key: Option<String>, definition: Value) -> Result<Field, ImportError> {
        match (key, definition) {
            (None, Value::String(shorthand)) => return Ok(Field::from_shorthand(&shorthand)),
            // `name: integer` names the datatype
            (Some(id), Value::String(datatype)) => return Ok(Field::new(id).with_datatype(datatype)),
            (key, definition) => {
                let (id, mut body) = item_body(key, definition, ItemKind::Field)?;

                let mut field = Field::new(id.as_str());
                if let Some(label) = take_string(&mut body, "label")? {
                    field = field.with_label(label);
                }
                let datatype = take_string(&mut body, "datatype")?;
                let type_alias = take_string(&mut body, "type")?;
                match (datatype, type_alias) {
                    (Some(_), Some(_)) => {
                        return Err(parse_error(format!(
                            "Field '{}' sets both 'datatype' and 'type'",
                            id
                        )));
                    }
                    (Some(datatype), None) | (None, Some(datatype)) => {
                        field = field.with_datatype(datatype);
                    }
                    (None, None) => {}
                }
                if let Some(primary_key) = take_bool(&mut body, "primary_key")? {
                    field = field.with_primary_key(primary_key);
                }
                field = field.with_foreign_keys(take_string_list(&mut body, "foreign_keys")?);
                if let Some(description) = take_string(&mut body, "description")? {
                    field = field.with_description(description);
                }
                Ok(field.with_options(take_options(body)?))
            }
        }
    }
}

fn datatype_from_body(
    id: String,
    mut body: Map<String, Value>,
    datatypes: Option<&DatatypeRegistry>,
) -> Result<Datatype, ImportError> {
    let mut datatype = Datatype::new(id.as_str());

    if let Some(description) = take_string(&mut body, "description")? {
        datatype = datatype.with_description(description);
    }

    if let Some(base_id) = take_string(&mut body, "extends")? {
        let registry = datatypes.ok_or_else(|| {
            ImportError::ValidationError(format!(
                "Datatype '{}' extends '{}' but no datatypes are known",
                id, base_id
            ))
        })?;
        let base = registry.get(&base_id).map_err(|_| {
            SchemaError::from(ConstructionError::UnknownExtends {
                id: id.clone(),
                extends: base_id.clone(),
            })
        })?;
        datatype = datatype.with_extends(base.clone());
    }

    match body.remove("restriction") {
        None | Some(Value::Null) => {}
        Some(restriction) => {
            let restriction: DatatypeRestriction = serde_json::from_value(restriction)
                .map_err(|e| parse_error(format!("Invalid restriction on datatype '{}': {}", id, e)))?;
            datatype = datatype.with_restriction(restriction);
        }
    }

    Ok(datatype.with_options(take_options(body)?))
}

fn parse_error(message: impl Into<String>) -> ImportError {
    ImportError::ParseError(message.into())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

/// Items of a collection given either as a mapping keyed by id or as a list
fn entries(collection: Value, name: &str) -> Result<Vec<(Option<String>, Value)>, ImportError> {
    match collection {
        Value::Null => Ok(Vec::new()),
        Value::Object(items) => Ok(items.into_iter().map(|(k, v)| (Some(k), v)).collect()),
        Value::Array(items) => Ok(items.into_iter().map(|v| (None, v)).collect()),
        other => Err(parse_error(format!(
            "'{}' must be a mapping or a list, got {}",
            name,
            type_name(&other)
        ))),
    }
}

/// The mapping defining an item, and its id (explicit `id` first, then the
/// collection key)
fn item_body(
    key: Option<String>,
    definition: Value,
    kind: ItemKind,
) -> Result<(String, Map<String, Value>), ImportError> {
    let mut body = match definition {
        Value::Null => Map::new(),
        Value::Object(body) => body,
        other => {
            return Err(parse_error(format!(
                "{} '{}' must be a mapping, got {}",
                kind,
                key.as_deref().unwrap_or("<unnamed>"),
                type_name(&other)
            )));
        }
    };
    let id = take_string(&mut body, "id")?
        .or(key)
        .ok_or_else(|| SchemaError::from(ConstructionError::MissingId(kind)))?;
    Ok((id, body))
}

fn take_string(body: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ImportError> {
    match body.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        // Unquoted YAML scalars such as `version: 1.0`
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(Value::Bool(value)) => Ok(Some(value.to_string())),
        Some(other) => Err(parse_error(format!(
            "'{}' must be a string, got {}",
            key,
            type_name(&other)
        ))),
    }
}

fn take_bool(body: &mut Map<String, Value>, key: &str) -> Result<Option<bool>, ImportError> {
    match body.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(value)),
        Some(other) => Err(parse_error(format!(
            "'{}' must be a boolean, got {}",
            key,
            type_name(&other)
        ))),
    }
}

/// A single string or a list of strings
fn take_string_list(body: &mut Map<String, Value>, key: &str) -> Result<Vec<String>, ImportError> {
    match body.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(value)) => Ok(vec![value]),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(value) => Ok(value),
                other => Err(parse_error(format!(
                    "'{}' entries must be strings, got {}",
                    key,
                    type_name(&other)
                ))),
            })
            .collect(),
        Some(other) => Err(parse_error(format!(
            "'{}' must be a string or a list of strings, got {}",
            key,
            type_name(&other)
        ))),
    }
}

/// Explicit `options` merged with every remaining key
fn take_options(mut body: Map<String, Value>) -> Result<Options, ImportError> {
    let mut options = match body.remove("options") {
        None | Some(Value::Null) => Options::new(),
        Some(Value::Object(options)) => options,
        Some(other) => {
            return Err(parse_error(format!(
                "'options' must be a mapping, got {}",
                type_name(&other)
            )));
        }
    };
    options.extend(body);
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PETS_YAML: &str = r#"
id: pets
version: 1.0
description: People and their pets
datatypes:
  postcode:
    description: UK postcode
    extends: string
    restriction:
      max_length: 8
records:
  person:
    color: LightPink
    fields:
      id:
        primary_key: true
        type: integer
      first_name: {}
      last_name:
  pet:
    fields:
      - "*id"
      - id: owner_id
        foreign_keys: person.id
      - name
  address:
    fields:
      owner_id:
        primary_key: true
        foreign_keys: [person.id]
      type:
        primary_key: true
      postcode: postcode
"#;

    #[test]
    fn test_parse_yaml() {
        let schema = SchemaImporter::new().parse_str(PETS_YAML).unwrap();

        assert_eq!(schema.id(), "pets");
        assert_eq!(schema.version(), Some("1.0"));
        assert_eq!(schema.description(), Some("People and their pets"));

        let names: Vec<String> = schema.field_names().collect();
        assert_eq!(
            names,
            vec![
                "person.id",
                "person.first_name",
                "person.last_name",
                "pet.id",
                "pet.owner_id",
                "pet.name",
                "address.owner_id",
                "address.type",
                "address.postcode",
            ]
        );

        let person_id = schema.get_field("person.id").unwrap();
        assert!(person_id.is_primary_key());
        assert_eq!(person_id.datatype_id(), "integer");
        assert!(schema.get_field("pet.id").unwrap().is_primary_key());
        assert!(!schema.get_field("pet.name").unwrap().is_primary_key());

        let owner = schema.get_field("pet.owner_id").unwrap();
        assert_eq!(owner.foreign_keys().unwrap()[0], person_id);

        let postcode = schema.get_field("address.postcode").unwrap().datatype().unwrap();
        assert_eq!(postcode.extends().map(Datatype::id), Some("string"));
        assert_eq!(postcode.restriction().and_then(|r| r.max_length), Some(8));

        assert_eq!(
            schema.get_record("person").unwrap().options().get("color"),
            Some(&json!("LightPink"))
        );
    }

    #[test]
    fn test_parse_json_with_comments() {
        let content = r#"{
            // JSON5 allows comments and trailing commas
            "id": "single",
            "records": {
                "person": {"fields": {"id": {"primary_key": true}, "name": {},}},
                "address": {
                    "fields": {
                        "person_id": {"primary_key": true, "foreign_keys": ["person.id"]},
                        "street": {},
                    },
                },
            },
        }"#;
        assert_eq!(DocumentFormat::detect(content), DocumentFormat::Json);

        let schema = SchemaImporter::new().parse_str(content).unwrap();
        assert_eq!(schema.id(), "single");
        let fks = schema.get_field("address.person_id").unwrap().foreign_keys().unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].qname(), "person.id");
    }

    #[test]
    fn test_missing_schema_id_defaults() {
        let schema = SchemaImporter::new()
            .parse_value(json!({"records": {"r": {"fields": ["f"]}}}))
            .unwrap();
        assert_eq!(schema.id(), UNKNOWN_SCHEMA_ID);
        assert_eq!(schema.get_record("r").unwrap().schema_id(), "unknown");
    }

    #[test]
    fn test_explicit_id_overrides_key() {
        let schema = SchemaImporter::new()
            .parse_value(json!({
                "records": {"key": {"id": "actual", "fields": {"k": {"id": "f"}}}}
            }))
            .unwrap();
        assert!(schema.get_field("actual.f").is_ok());
        assert!(schema.get_record("key").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_keys_become_options() {
        let schema = SchemaImporter::new()
            .parse_value(json!({
                "owner": "data team",
                "records": {"r": {"fields": {"f": {
                    "sensitive": true,
                    "options": {"unit": "cm"}
                }}}}
            }))
            .unwrap();
        assert_eq!(schema.options().get("owner"), Some(&json!("data team")));
        let field = schema.get_field("r.f").unwrap();
        assert_eq!(field.options().get("sensitive"), Some(&json!(true)));
        assert_eq!(field.options().get("unit"), Some(&json!("cm")));
    }

    #[test]
    fn test_list_item_without_id_fails() {
        let err = SchemaImporter::new()
            .parse_value(json!({"records": [{"fields": []}]}))
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::SchemaError(SchemaError::Construction(ConstructionError::MissingId(
                ItemKind::Record
            )))
        ));
    }

    #[test]
    fn test_unknown_field_datatype_fails() {
        let err = SchemaImporter::new()
            .parse_value(json!({"records": {"r": {"fields": {"f": {"datatype": "uuid"}}}}}))
            .unwrap_err();
        match err {
            ImportError::SchemaError(e) => assert!(e.is_not_found()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_datatype_keys() {
        let result = SchemaImporter::new().parse_value(json!({
            "records": {"r": {"fields": {"f": {"datatype": "string", "type": "integer"}}}}
        }));
        assert!(matches!(result, Err(ImportError::ParseError(_))));
    }

    #[test]
    fn test_duplicate_field_fails() {
        let result = SchemaImporter::new()
            .parse_value(json!({"records": {"r": {"fields": ["*id", "id"]}}}));
        assert!(matches!(
            result,
            Err(ImportError::SchemaError(SchemaError::Construction(
                ConstructionError::DuplicateId { .. }
            )))
        ));
    }

    #[test]
    fn test_record_shorthand_list() {
        let schema = SchemaImporter::new()
            .parse_value(json!({"records": {"person": ["*id", "name"]}}))
            .unwrap();
        let record = schema.get_record("person").unwrap();
        assert_eq!(record.field_ids().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(record.primary_keys().len(), 1);
    }

    #[test]
    fn test_document_must_be_mapping() {
        assert!(matches!(
            SchemaImporter::new().parse_str("- a\n- b\n"),
            Err(ImportError::ParseError(_))
        ));
        assert!(SchemaImporter::new().parse_str("{ not json").is_err());
    }

    #[test]
    fn test_parse_datatype() {
        let importer = SchemaImporter::new();
        let dt = importer
            .parse_datatype(json!({"id": "testtype1", "description": "This is a test type"}), None)
            .unwrap();
        assert_eq!(dt.id(), "testtype1");
        assert_eq!(dt.description(), Some("This is a test type"));
    }

    #[test]
    fn test_parse_datatype_extends() {
        let importer = SchemaImporter::new();
        let standard = DatatypeRegistry::standard();
        let dt = importer
            .parse_datatype(
                json!({
                    "id": "testtype1",
                    "extends": "string",
                    "restriction": {"enumeration": ["a", "b", "c"]}
                }),
                Some(&standard),
            )
            .unwrap();
        assert_eq!(dt.extends(), Some(&Datatype::new("string")));
        assert_eq!(
            dt.restriction().and_then(|r| r.enumeration.clone()),
            Some(vec![json!("a"), json!("b"), json!("c")])
        );

        let err = importer
            .parse_datatype(json!({"id": "t", "extends": "string"}), None)
            .unwrap_err();
        assert!(matches!(err, ImportError::ValidationError(_)));

        let err = importer
            .parse_datatype(json!({"id": "t", "extends": "nope"}), Some(&standard))
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::SchemaError(SchemaError::Construction(ConstructionError::UnknownExtends { .. }))
        ));
    }

    #[test]
    fn test_parse_datatypes() {
        let registry = SchemaImporter::new()
            .parse_datatypes(json!({
                "testtype1": {"description": "This is a test type", "extends": "string"},
                "testtype2": {"id": "customtype", "extends": "testtype1"}
            }))
            .unwrap();
        assert_eq!(registry.len(), 12);
        let custom = registry.get("customtype").unwrap();
        assert_eq!(custom.extends().map(Datatype::id), Some("testtype1"));
        assert_eq!(custom.base().id(), "string");
        assert!(!registry.contains("testtype2"));
    }

    #[test]
    fn test_invalid_restriction_facet() {
        let result = SchemaImporter::new()
            .parse_datatypes(json!({"t": {"restriction": {"max_size": 3}}}));
        assert!(matches!(result, Err(ImportError::ParseError(_))));
    }
}
