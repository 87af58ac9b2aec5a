//! Validate command implementation

use super::load_schema;
use crate::cli::error::CliError;
use crate::cli::output::{format_schema_summary, format_validation_report};
use crate::validation::{SchemaValidator, ValidationReport};
use std::path::Path;

/// Handle the validate command.
///
/// Prints a summary and every finding; fails when the schema has
/// error-level findings, or any finding at all when `strict` is set.
pub fn handle_validate(schema_path: &Path, strict: bool) -> Result<ValidationReport, CliError> {
    let schema = load_schema(schema_path)?;
    print!("{}", format_schema_summary(&schema));

    let report = SchemaValidator::new().validate(&schema);
    print!("{}", format_validation_report(&report));

    if strict && !report.issues.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "{} finding(s) in strict mode",
            report.issues.len()
        )));
    }
    SchemaValidator::new().ensure_valid(&schema)?;
    Ok(report)
}
