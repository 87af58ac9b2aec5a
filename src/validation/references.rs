//! Reference validation
//!
//! Checks that every field datatype and foreign key resolves within the
//! schema, and flags records without a primary key.

use super::ValidationIssue;
use crate::models::{Schema, SchemaError};

/// Validator for references held by fields
#[derive(Debug, Default)]
pub struct ReferenceValidator;

impl ReferenceValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, schema: &Schema) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for record in schema.records() {
            if record.primary_keys().is_empty() {
                issues.push(ValidationIssue::warning(
                    "no-primary-key",
                    record.id(),
                    "Record has no primary key",
                ));
            }
        }

        for field in schema.all_fields() {
            if field.datatype().is_err() {
                issues.push(ValidationIssue::error(
                    "unresolved-datatype",
                    field.qname(),
                    format!("Datatype '{}' is not defined", field.datatype_id()),
                ));
            }

            for target in field.foreign_key_refs() {
                match schema.get_field(target) {
                    Ok(_) => {}
                    Err(SchemaError::InvalidReference(_)) => {
                        issues.push(ValidationIssue::error(
                            "malformed-foreign-key",
                            field.qname(),
                            format!(
                                "Foreign key '{}' is not of the form <record>.<field>",
                                target
                            ),
                        ));
                    }
                    Err(_) => {
                        issues.push(ValidationIssue::error(
                            "unresolved-foreign-key",
                            field.qname(),
                            format!("Foreign key '{}' does not match any field", target),
                        ));
                    }
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Record};

    #[test]
    fn test_foreign_key_findings() {
        let schema = Schema::from_records(
            "s",
            [Record::with_fields(
                "pet",
                [
                    Field::from("*id"),
                    Field::new("owner").with_foreign_key("person.id"),
                    Field::new("vet").with_foreign_key("badformat"),
                ],
            )
            .unwrap()],
        )
        .unwrap();

        let issues = ReferenceValidator::new().validate(&schema);
        let codes: Vec<(&str, &str)> = issues.iter().map(|i| (i.code, i.item.as_str())).collect();
        assert_eq!(
            codes,
            vec![
                ("unresolved-foreign-key", "pet.owner"),
                ("malformed-foreign-key", "pet.vet"),
            ]
        );
    }

    #[test]
    fn test_missing_primary_key_is_warning() {
        let schema = Schema::from_records(
            "s",
            [Record::with_fields("log", [Field::new("message")]).unwrap()],
        )
        .unwrap();

        let issues = ReferenceValidator::new().validate(&schema);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, crate::validation::Severity::Warning);
    }
}
