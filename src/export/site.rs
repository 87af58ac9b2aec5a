//! Static-site (Jekyll) documentation writer
//!
//! Writes two kinds of output below the site root:
//! - data files (`<data_prefix>/records.yml`, `fields.yml`, `datatypes.yml`)
//!   listing every item in schema order
//! - collection pages (`<collection_prefix>/_records/<id>.md`,
//!   `_fields/<qname>.md`, `_datatypes/<id>.md`), one per item, whose YAML
//!   front matter carries the layout name and the item itself under `spec`

use super::erd::ErdExporter;
use super::{DocgenConfig, ExportError};
use crate::models::{Datatype, DatatypeRestriction, FieldRef, Options, Record, Schema};
use crate::storage::{StorageBackend, join_path};
use serde::Serialize;
use tracing::{debug, info};

/// Site skeleton copied by [`SiteWriter::copy_default_templates`]
const DEFAULT_TEMPLATES: [(&str, &str); 6] = [
    ("_config.yml", include_str!("templates/jekyll/_config.yml")),
    ("index.md", include_str!("templates/jekyll/index.md")),
    ("_layouts/default.html", include_str!("templates/jekyll/_layouts/default.html")),
    ("_layouts/record.html", include_str!("templates/jekyll/_layouts/record.html")),
    ("_layouts/field.html", include_str!("templates/jekyll/_layouts/field.html")),
    ("_layouts/datatype.html", include_str!("templates/jekyll/_layouts/datatype.html")),
];

/// Serialized form of a datatype
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatatypeDoc {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Box<DatatypeDoc>>,
    pub options: Options,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restriction: Option<DatatypeRestriction>,
}

impl DatatypeDoc {
    pub fn from_datatype(datatype: &Datatype) -> Self {
        Self {
            id: datatype.id().to_string(),
            description: datatype.description().map(str::to_string),
            extends: datatype
                .extends()
                .map(|base| Box::new(DatatypeDoc::from_datatype(base))),
            options: datatype.options().clone(),
            restriction: datatype.restriction().cloned(),
        }
    }
}

/// Serialized form of a field, with its datatype inlined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDoc {
    pub id: String,
    pub qname: String,
    pub record: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub datatype: DatatypeDoc,
    pub primary_key: bool,
    pub foreign_keys: Vec<String>,
    pub options: Options,
}

impl FieldDoc {
    /// Fails if the datatype or a foreign key of the field does not resolve
    pub fn from_field(field: FieldRef<'_>) -> Result<Self, ExportError> {
        let foreign_keys = field
            .foreign_keys()?
            .into_iter()
            .map(|target| target.qname())
            .collect();
        Ok(Self {
            id: field.id().to_string(),
            qname: field.qname(),
            record: field.record().id().to_string(),
            label: field.label().to_string(),
            description: field.description().map(str::to_string),
            datatype: DatatypeDoc::from_datatype(field.datatype()?),
            primary_key: field.is_primary_key(),
            foreign_keys,
            options: field.options().clone(),
        })
    }
}

/// Serialized form of a record, with its fields inlined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDoc {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Options,
    pub fields: Vec<FieldDoc>,
}

impl RecordDoc {
    pub fn from_record(schema: &Schema, record: &Record) -> Result<Self, ExportError> {
        let fields = record
            .fields()
            .iter()
            .map(|field| FieldDoc::from_field(schema.get_field(&field.qname())?))
            .collect::<Result<Vec<_>, ExportError>>()?;
        Ok(Self {
            id: record.id().to_string(),
            label: record.label().to_string(),
            description: record.description().map(str::to_string),
            options: record.options().clone(),
            fields,
        })
    }
}

#[derive(Serialize)]
struct RecordPage<'a> {
    layout: &'static str,
    record_id: &'a str,
    spec: RecordDoc,
}

#[derive(Serialize)]
struct FieldPage<'a> {
    layout: &'static str,
    field_id: &'a str,
    record_id: &'a str,
    field_qname: &'a str,
    spec: FieldDoc,
}

#[derive(Serialize)]
struct DatatypePage<'a> {
    layout: &'static str,
    datatype_id: &'a str,
    spec: DatatypeDoc,
}

/// A page: YAML front matter between `---` lines, then the content
fn with_front_matter<T: Serialize>(content: &str, front_matter: &T) -> Result<String, ExportError> {
    let yaml = serde_yaml::to_string(front_matter)?;
    Ok(format!("---\n{}---\n{}", yaml, content))
}

/// Writes schema documentation for a Jekyll site to a storage backend
pub struct SiteWriter<B: StorageBackend> {
    storage: B,
    config: DocgenConfig,
}

impl<B: StorageBackend> SiteWriter<B> {
    /// Create a writer with the default configuration; paths are relative
    /// to the backend root
    pub fn new(storage: B) -> Self {
        Self::with_config(storage, DocgenConfig::default())
    }

    pub fn with_config(storage: B, config: DocgenConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &B {
        &self.storage
    }

    pub fn config(&self) -> &DocgenConfig {
        &self.config
    }

    fn data_path(&self, file_name: &str) -> String {
        join_path(&self.config.data_prefix, file_name)
    }

    fn collection_dir(&self, collection: &str) -> String {
        join_path(&self.config.collection_prefix, collection)
    }

    async fn write_text(&self, path: &str, content: &str) -> Result<(), ExportError> {
        self.storage.write_file(path, content.as_bytes()).await?;
        debug!(path = %path, bytes = content.len(), "Wrote site file");
        Ok(())
    }

    fn datatypes<'s>(schema: &'s Schema, only_used: bool) -> Vec<&'s Datatype> {
        if only_used {
            schema.used_datatypes()
        } else {
            schema.datatypes().iter().collect()
        }
    }

    /// Write `records.yml`; returns its path
    pub async fn write_record_data(&self, schema: &Schema) -> Result<String, ExportError> {
        let records = schema
            .records()
            .iter()
            .map(|record| RecordDoc::from_record(schema, record))
            .collect::<Result<Vec<_>, _>>()?;

        let path = self.data_path("records.yml");
        self.write_text(&path, &serde_yaml::to_string(&records)?).await?;
        info!("Wrote {} records to {}", records.len(), path);
        Ok(path)
    }

    /// Write `fields.yml`; returns its path
    pub async fn write_field_data(&self, schema: &Schema) -> Result<String, ExportError> {
        let fields = schema
            .all_fields()
            .map(FieldDoc::from_field)
            .collect::<Result<Vec<_>, _>>()?;

        let path = self.data_path("fields.yml");
        self.write_text(&path, &serde_yaml::to_string(&fields)?).await?;
        info!("Wrote {} fields to {}", fields.len(), path);
        Ok(path)
    }

    /// Write `datatypes.yml`, listing only datatypes in use when `only_used`
    /// is set; returns its path
    pub async fn write_datatypes_data(
        &self,
        schema: &Schema,
        only_used: bool,
    ) -> Result<String, ExportError> {
        let datatypes: Vec<DatatypeDoc> = Self::datatypes(schema, only_used)
            .into_iter()
            .map(DatatypeDoc::from_datatype)
            .collect();

        let path = self.data_path("datatypes.yml");
        self.write_text(&path, &serde_yaml::to_string(&datatypes)?).await?;
        info!("Wrote {} datatypes to {}", datatypes.len(), path);
        Ok(path)
    }

    /// Write one page per record; returns the collection directory
    pub async fn write_record_collection(&self, schema: &Schema) -> Result<String, ExportError> {
        let dir = self.collection_dir("_records");
        for record in schema.records() {
            let page = RecordPage {
                layout: "record",
                record_id: record.id(),
                spec: RecordDoc::from_record(schema, record)?,
            };
            let path = join_path(&dir, &format!("{}.md", record.id()));
            self.write_text(&path, &with_front_matter("", &page)?).await?;
        }
        info!("Wrote {} record pages to {}", schema.records().len(), dir);
        Ok(dir)
    }

    /// Write one page per field, named by qualified name; returns the
    /// collection directory
    pub async fn write_field_collection(&self, schema: &Schema) -> Result<String, ExportError> {
        let dir = self.collection_dir("_fields");
        for field in schema.all_fields() {
            let qname = field.qname();
            let page = FieldPage {
                layout: "field",
                field_id: field.id(),
                record_id: field.record().id(),
                field_qname: &qname,
                spec: FieldDoc::from_field(field)?,
            };
            let path = join_path(&dir, &format!("{}.md", qname));
            self.write_text(&path, &with_front_matter("", &page)?).await?;
        }
        info!("Wrote {} field pages to {}", schema.field_count(), dir);
        Ok(dir)
    }

    /// Write one page per datatype; returns the collection directory
    pub async fn write_datatype_collection(
        &self,
        schema: &Schema,
        only_used: bool,
    ) -> Result<String, ExportError> {
        let dir = self.collection_dir("_datatypes");
        let datatypes = Self::datatypes(schema, only_used);
        for datatype in &datatypes {
            let page = DatatypePage {
                layout: "datatype",
                datatype_id: datatype.id(),
                spec: DatatypeDoc::from_datatype(datatype),
            };
            let path = join_path(&dir, &format!("{}.md", datatype.id()));
            self.write_text(&path, &with_front_matter("", &page)?).await?;
        }
        info!("Wrote {} datatype pages to {}", datatypes.len(), dir);
        Ok(dir)
    }

    /// Write all three data files
    pub async fn write_all_data(&self, schema: &Schema) -> Result<(), ExportError> {
        self.write_record_data(schema).await?;
        self.write_field_data(schema).await?;
        self.write_datatypes_data(schema, self.config.only_used_datatypes)
            .await?;
        Ok(())
    }

    /// Write all three collections
    pub async fn write_all_collections(&self, schema: &Schema) -> Result<(), ExportError> {
        self.write_record_collection(schema).await?;
        self.write_field_collection(schema).await?;
        self.write_datatype_collection(schema, self.config.only_used_datatypes)
            .await?;
        Ok(())
    }

    /// Copy every file below `dir` of `source` into the site, keeping files
    /// that already exist. Returns the paths copied.
    pub async fn copy_templates<S: StorageBackend>(
        &self,
        source: &S,
        dir: &str,
    ) -> Result<Vec<String>, ExportError> {
        let mut copied = Vec::new();
        for file in source.list_files(dir).await? {
            if self.storage.file_exists(&file).await? {
                debug!("Skipping {} because it already exists", file);
                continue;
            }
            let content = source.read_file(&join_path(dir, &file)).await?;
            self.storage.write_file(&file, &content).await?;
            copied.push(file);
        }
        info!("Copied {} template files", copied.len());
        Ok(copied)
    }

    /// Copy the bundled site skeleton (configuration, index and layouts),
    /// keeping files that already exist. Returns the paths copied.
    pub async fn copy_default_templates(&self) -> Result<Vec<String>, ExportError> {
        let mut copied = Vec::new();
        for (path, content) in DEFAULT_TEMPLATES {
            if self.storage.file_exists(path).await? {
                debug!("Skipping {} because it already exists", path);
                continue;
            }
            self.write_text(path, content).await?;
            copied.push(path.to_string());
        }
        info!("Copied {} template files", copied.len());
        Ok(copied)
    }

    /// Render the embeddable ERD with Graphviz and write it to the
    /// configured include path; returns that path
    pub async fn write_erd_include(&self, schema: &Schema) -> Result<String, ExportError> {
        let svg = ErdExporter::embeddable(self.config.clone()).render_embeddable_svg(schema)?;
        self.store_erd_include(&svg).await
    }

    pub(crate) async fn store_erd_include(&self, svg: &str) -> Result<String, ExportError> {
        let path = self.config.erd_include_path.clone();
        self.write_text(&path, svg).await?;
        info!("Wrote ERD include to {}", path);
        Ok(path)
    }
}
