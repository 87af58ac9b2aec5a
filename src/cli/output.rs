//! Output formatting for CLI

use crate::models::Schema;
use crate::validation::ValidationReport;

/// One-paragraph summary of a parsed schema
pub fn format_schema_summary(schema: &Schema) -> String {
    let mut output = format!("Schema '{}'", schema.id());
    if let Some(version) = schema.version() {
        output.push_str(&format!(" (version {})", version));
    }
    output.push_str(&format!(
        ": {} record(s), {} field(s), {} datatype(s)\n",
        schema.records().len(),
        schema.field_count(),
        schema.datatypes().len()
    ));
    for record in schema.records() {
        let keys: Vec<&str> = record.primary_keys().into_iter().map(|f| f.id()).collect();
        output.push_str(&format!("  - {} [{}]", record.id(), record.len()));
        if !keys.is_empty() {
            output.push_str(&format!(" key: {}", keys.join(", ")));
        }
        output.push('\n');
    }
    output
}

/// Human-readable validation report
pub fn format_validation_report(report: &ValidationReport) -> String {
    let mut output = String::new();

    let errors: Vec<_> = report.errors().collect();
    if !errors.is_empty() {
        output.push_str(&format!("\n❌ {} error(s):\n", errors.len()));
        for issue in errors {
            output.push_str(&format!("  - [{}] {}: {}\n", issue.code, issue.item, issue.message));
        }
    }

    let warnings: Vec<_> = report.warnings().collect();
    if !warnings.is_empty() {
        output.push_str(&format!("\n⚠️  {} warning(s):\n", warnings.len()));
        for issue in warnings {
            output.push_str(&format!("  - [{}] {}: {}\n", issue.code, issue.item, issue.message));
        }
    }

    if report.issues.is_empty() {
        output.push_str(&format!("\n✅ Schema '{}': all checks passed!\n", report.schema_id));
    } else if report.is_valid() {
        output.push_str(&format!("\n✅ Schema '{}' is valid\n", report.schema_id));
    }

    output
}
