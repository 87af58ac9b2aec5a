//! Datatype restriction validation
//!
//! Checks the restriction of every datatype, merged along its `extends`
//! chain, for facets that cannot be satisfied together.

use super::ValidationIssue;
use crate::models::{Datatype, DatatypeRestriction, Schema};
use regex::Regex;

/// Validator for datatype restrictions
#[derive(Debug, Default)]
pub struct DatatypeValidator;

impl DatatypeValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, schema: &Schema) -> Vec<ValidationIssue> {
        schema
            .datatypes()
            .iter()
            .flat_map(|datatype| self.validate_datatype(datatype))
            .collect()
    }

    /// Findings for a single datatype
    pub fn validate_datatype(&self, datatype: &Datatype) -> Vec<ValidationIssue> {
        match datatype.effective_restriction() {
            Some(restriction) => restriction_problems(&restriction)
                .into_iter()
                .map(|message| ValidationIssue::error("invalid-restriction", datatype.id(), message))
                .collect(),
            None => Vec::new(),
        }
    }
}

fn restriction_problems(r: &DatatypeRestriction) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(pattern) = &r.pattern
        && let Err(e) = Regex::new(pattern)
    {
        problems.push(format!("Pattern '{}' is not a valid regular expression: {}", pattern, e));
    }

    if let Some(values) = &r.enumeration
        && values.is_empty()
    {
        problems.push("Enumeration must list at least one value".to_string());
    }

    // Every lower bound must sit below every upper bound; equality is only
    // allowed between two inclusive bounds
    let lower = [("min_inclusive", r.min_inclusive, true), ("min_exclusive", r.min_exclusive, false)];
    let upper = [("max_inclusive", r.max_inclusive, true), ("max_exclusive", r.max_exclusive, false)];
    for (lo_name, lo, lo_inclusive) in lower {
        for (hi_name, hi, hi_inclusive) in upper {
            if let (Some(lo), Some(hi)) = (lo, hi) {
                let satisfiable = if lo_inclusive && hi_inclusive { lo <= hi } else { lo < hi };
                if !satisfiable {
                    problems.push(format!("{} ({}) conflicts with {} ({})", lo_name, lo, hi_name, hi));
                }
            }
        }
    }

    if let (Some(min), Some(max)) = (r.min_length, r.max_length)
        && min > max
    {
        problems.push(format!("min_length ({}) exceeds max_length ({})", min, max));
    }
    if let Some(length) = r.length
        && (r.min_length.is_some_and(|min| length < min)
            || r.max_length.is_some_and(|max| length > max))
    {
        problems.push(format!("length ({}) is outside min_length/max_length", length));
    }

    if let (Some(fraction), Some(total)) = (r.fraction_digits, r.total_digits)
        && fraction > total
    {
        problems.push(format!(
            "fraction_digits ({}) exceeds total_digits ({})",
            fraction, total
        ));
    }
    if r.total_digits == Some(0) {
        problems.push("total_digits must be positive".to_string());
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatatypeRegistry;
    use serde_json::json;

    fn restricted(restriction: DatatypeRestriction) -> Datatype {
        Datatype::new("t").with_restriction(restriction)
    }

    #[test]
    fn test_valid_restriction() {
        let dt = restricted(DatatypeRestriction {
            min_inclusive: Some(0.0),
            max_inclusive: Some(0.0),
            pattern: Some(r"^[A-Z]{2}\d+$".to_string()),
            enumeration: Some(vec![json!("AB1")]),
            ..Default::default()
        });
        assert!(DatatypeValidator::new().validate_datatype(&dt).is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let dt = restricted(DatatypeRestriction {
            pattern: Some("[unclosed".to_string()),
            ..Default::default()
        });
        let issues = DatatypeValidator::new().validate_datatype(&dt);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "invalid-restriction");
        assert_eq!(issues[0].item, "t");
    }

    #[test]
    fn test_conflicting_bounds() {
        let dt = restricted(DatatypeRestriction {
            min_exclusive: Some(5.0),
            max_inclusive: Some(5.0),
            min_length: Some(3),
            max_length: Some(2),
            enumeration: Some(vec![]),
            ..Default::default()
        });
        let issues = DatatypeValidator::new().validate_datatype(&dt);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_inherited_conflict() {
        let mut registry = DatatypeRegistry::standard();
        registry
            .register_extending(
                Datatype::new("short").with_restriction(DatatypeRestriction {
                    max_length: Some(4),
                    ..Default::default()
                }),
                "string",
            )
            .unwrap();
        registry
            .register_extending(
                Datatype::new("shorter").with_restriction(DatatypeRestriction {
                    min_length: Some(6),
                    ..Default::default()
                }),
                "short",
            )
            .unwrap();
        let schema = Schema::with_datatypes("s", registry);

        let issues = DatatypeValidator::new().validate(&schema);
        let items: Vec<&str> = issues.iter().map(|i| i.item.as_str()).collect();
        assert_eq!(items, vec!["shorter"]);
    }
}
