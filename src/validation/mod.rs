//! Validation functionality
//!
//! Schemas resolve references lazily, so a schema can be built with foreign
//! keys or datatypes that do not resolve. [`SchemaValidator`] checks a
//! complete schema up front:
//! - reference validation (field datatypes, foreign keys)
//! - relationship validation (self-references, circular dependencies)
//! - datatype validation (restriction facets)

pub mod datatypes;
pub mod references;
pub mod relationships;

use crate::models::Schema;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub use datatypes::DatatypeValidator;
pub use references::ReferenceValidator;
pub use relationships::{CircularDependency, RelationshipValidator, SelfReference};

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Stable identifier of the check, e.g. `unresolved-foreign-key`
    pub code: &'static str,
    /// Item the finding is about: a record id, qualified field name or
    /// datatype id
    pub item: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(code: &'static str, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            item: item.into(),
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, item: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            item: item.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}: {}", self.severity, self.code, self.item, self.message)
    }
}

/// All findings for a schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub schema_id: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when there are no errors; warnings are allowed
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// Error during validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Schema '{schema_id}' has {count} validation error(s); first: {first}")]
    Invalid {
        schema_id: String,
        count: usize,
        first: String,
    },
}

/// Runs every validator over a schema
#[derive(Debug, Default)]
pub struct SchemaValidator {
    references: ReferenceValidator,
    relationships: RelationshipValidator,
    datatypes: DatatypeValidator,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every finding for the schema
    pub fn validate(&self, schema: &Schema) -> ValidationReport {
        let mut issues = Vec::new();
        issues.extend(self.references.validate(schema));
        issues.extend(self.relationships.validate(schema));
        issues.extend(self.datatypes.validate(schema));

        for issue in &issues {
            debug!(schema = %schema.id(), "{}", issue);
        }
        let report = ValidationReport {
            schema_id: schema.id().to_string(),
            issues,
        };
        info!(
            "Validated schema {}: {} error(s), {} warning(s)",
            schema.id(),
            report.error_count(),
            report.warnings().count()
        );
        report
    }

    /// Validate and fail on the first error-level finding
    pub fn ensure_valid(&self, schema: &Schema) -> Result<ValidationReport, ValidationError> {
        let report = self.validate(schema);
        let first = report.errors().next().map(ToString::to_string);
        match first {
            Some(first) => Err(ValidationError::Invalid {
                schema_id: report.schema_id.clone(),
                count: report.error_count(),
                first,
            }),
            None => Ok(report),
        }
    }
}
