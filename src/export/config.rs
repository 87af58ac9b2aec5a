//! Configuration for documentation generation

use super::ExportError;
use serde::{Deserialize, Serialize};

/// Configuration for ERD and static-site generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocgenConfig {
    /// Directory (relative to the site root) for data files
    pub data_prefix: String,

    /// Directory (relative to the site root) holding the collection folders
    pub collection_prefix: String,

    /// Link target for record nodes in the embedded ERD; `{record_id}` is
    /// replaced by the record id
    pub link_pattern: String,

    /// Graphviz layout engine used to render diagrams
    pub layout_engine: String,

    /// Only document datatypes that fields actually use
    pub only_used_datatypes: bool,

    /// Path (relative to the site root) of the embeddable ERD
    pub erd_include_path: String,
}

impl Default for DocgenConfig {
    fn default() -> Self {
        Self {
            data_prefix: "_data".to_string(),
            collection_prefix: String::new(),
            link_pattern: "{{ site.baseurl }}/records/{record_id}.html".to_string(),
            layout_engine: "circo".to_string(),
            only_used_datatypes: true,
            erd_include_path: "_includes/erd.svg".to_string(),
        }
    }
}

impl DocgenConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> DocgenConfigBuilder {
        DocgenConfigBuilder::default()
    }

    /// Parse a TOML configuration; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ExportError> {
        toml::from_str(content).map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Link for the record with id `record_id`
    pub fn record_link(&self, record_id: &str) -> String {
        self.link_pattern.replace("{record_id}", record_id)
    }
}

/// Builder for DocgenConfig
#[derive(Debug, Default)]
pub struct DocgenConfigBuilder {
    config: DocgenConfig,
}

impl DocgenConfigBuilder {
    pub fn data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.data_prefix = prefix.into();
        self
    }

    pub fn collection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.collection_prefix = prefix.into();
        self
    }

    pub fn link_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.link_pattern = pattern.into();
        self
    }

    pub fn layout_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.layout_engine = engine.into();
        self
    }

    pub fn only_used_datatypes(mut self, only_used: bool) -> Self {
        self.config.only_used_datatypes = only_used;
        self
    }

    pub fn erd_include_path(mut self, path: impl Into<String>) -> Self {
        self.config.erd_include_path = path.into();
        self
    }

    pub fn build(self) -> DocgenConfig {
        self.config
    }
}
