//! CLI command implementations

pub mod graphviz;
pub mod jekyll;
pub mod validate;

use crate::cli::error::CliError;
use crate::export::DocgenConfig;
use crate::import::SchemaImporter;
use crate::models::Schema;
use std::path::Path;

/// Parse the schema document at `path`
pub fn load_schema(path: &Path) -> Result<Schema, CliError> {
    if !path.is_file() {
        return Err(CliError::FileReadError(
            path.to_path_buf(),
            "no such file".to_string(),
        ));
    }
    Ok(SchemaImporter::new().parse_file(path)?)
}

/// Load a TOML configuration file, or the defaults when none is given
pub fn load_config(path: Option<&Path>) -> Result<DocgenConfig, CliError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
            Ok(DocgenConfig::from_toml_str(&content)?)
        }
        None => Ok(DocgenConfig::default()),
    }
}
