//! Graphviz command implementation

use super::load_schema;
use crate::cli::error::CliError;
use crate::export::{DocgenConfig, ErdExporter};
use std::path::Path;

/// Output format implied by the extension of `output`
pub fn output_format(output: &Path) -> Result<String, CliError> {
    output
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "Cannot infer an image format from '{}'; use an extension such as .svg, .png or .dot",
                output.display()
            ))
        })
}

/// Handle the graphviz command: render the ERD of `schema_path` to `output`.
///
/// A `.dot` output receives the DOT source; any other extension is passed
/// to the Graphviz layout engine as the output format.
pub fn handle_graphviz(
    schema_path: &Path,
    output: &Path,
    config: DocgenConfig,
) -> Result<(), CliError> {
    println!(
        "Generating ERD diagram for {} and writing to {}",
        schema_path.display(),
        output.display()
    );

    let format = output_format(output)?;
    let schema = load_schema(schema_path)?;
    let exporter = ErdExporter::with_config(config);

    let content = if format == "dot" || format == "gv" {
        exporter.render_dot(&schema)?.into_bytes()
    } else {
        exporter.render_with_graphviz(&schema, &format)?
    };

    std::fs::write(output, content)
        .map_err(|e| CliError::FileWriteError(output.to_path_buf(), e.to_string()))?;
    println!("✅ Exported ERD to: {}", output.display());
    Ok(())
}
