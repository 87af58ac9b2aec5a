//! Relationship validation functionality
//!
//! Validates the record dependency graph induced by foreign keys for
//! self-references and circular dependencies.

use super::ValidationIssue;
use crate::models::Schema;
use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use std::collections::{HashMap, HashSet, VecDeque};

/// Circular dependency between records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependency {
    /// Record ids on the cycle, in schema order
    pub cycle_path: Vec<String>,
}

/// A foreign key pointing into its own record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfReference {
    pub record_id: String,
    /// Qualified name of the referencing field
    pub field: String,
}

/// Record dependency graph: an edge per resolvable foreign key, labelled with
/// the referencing field
struct DependencyGraph {
    graph: Graph<String, String, Directed>,
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    fn build(schema: &Schema) -> Self {
        let mut graph = Graph::<String, String, Directed>::new();
        let mut node_map = HashMap::new();

        // Add all records as nodes, in schema order
        for record in schema.records() {
            let node = graph.add_node(record.id().to_string());
            node_map.insert(record.id().to_string(), node);
        }

        for field in schema.all_fields() {
            for target in field.foreign_key_refs() {
                // Unresolvable keys are reported by the reference validator
                let Ok(target) = schema.get_field(target) else {
                    continue;
                };
                if let (Some(&source_node), Some(&target_node)) = (
                    node_map.get(field.record().id()),
                    node_map.get(target.record().id()),
                ) {
                    graph.add_edge(source_node, target_node, field.qname());
                }
            }
        }

        Self { graph, node_map }
    }

    fn can_reach(&self, from: &str, to: &str) -> bool {
        self.find_path(from, to).is_some()
    }

    /// Shortest path of record ids from `from` to `to`
    fn find_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let (&from_idx, &to_idx) = (self.node_map.get(from)?, self.node_map.get(to)?);

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut parent = HashMap::new();

        queue.push_back(from_idx);
        visited.insert(from_idx);

        while let Some(node) = queue.pop_front() {
            if node == to_idx {
                let mut path = Vec::new();
                let mut current = Some(to_idx);
                while let Some(node_idx) = current {
                    path.push(self.graph[node_idx].clone());
                    current = parent.get(&node_idx).copied();
                }
                path.reverse();
                return Some(path);
            }

            for neighbor in self.graph.neighbors(node) {
                if visited.insert(neighbor) {
                    parent.insert(neighbor, node);
                    queue.push_back(neighbor);
                }
            }
        }
        None
    }
}

/// Relationship validator
#[derive(Debug, Default)]
pub struct RelationshipValidator;

impl RelationshipValidator {
    pub fn new() -> Self {
        Self
    }

    /// Foreign keys that reference a field of their own record
    pub fn self_references(&self, schema: &Schema) -> Vec<SelfReference> {
        let mut found = Vec::new();
        for field in schema.all_fields() {
            for target in field.foreign_key_refs() {
                if let Ok(target) = schema.get_field(target)
                    && target.record().id() == field.record().id()
                {
                    found.push(SelfReference {
                        record_id: field.record().id().to_string(),
                        field: field.qname(),
                    });
                }
            }
        }
        found
    }

    /// Groups of records that depend on each other through foreign keys.
    ///
    /// Self-references are not reported here.
    pub fn circular_dependencies(&self, schema: &Schema) -> Vec<CircularDependency> {
        let deps = DependencyGraph::build(schema);

        let mut cycles: Vec<CircularDependency> = petgraph::algo::tarjan_scc(&deps.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort();
                CircularDependency {
                    cycle_path: component
                        .into_iter()
                        .map(|node| deps.graph[node].clone())
                        .collect(),
                }
            })
            .collect();
        cycles.sort_by_key(|c| deps.node_map.get(&c.cycle_path[0]).copied());
        cycles
    }

    /// Check whether a relationship from `source_record_id` to
    /// `target_record_id` would close a cycle.
    ///
    /// Returns the existing path from target back to source when it would.
    pub fn check_circular_dependency(
        &self,
        schema: &Schema,
        source_record_id: &str,
        target_record_id: &str,
    ) -> Option<Vec<String>> {
        if source_record_id == target_record_id {
            return None;
        }
        let deps = DependencyGraph::build(schema);
        if deps.can_reach(target_record_id, source_record_id) {
            deps.find_path(target_record_id, source_record_id)
        } else {
            None
        }
    }

    pub fn validate(&self, schema: &Schema) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = self
            .self_references(schema)
            .into_iter()
            .map(|s| {
                ValidationIssue::warning(
                    "self-reference",
                    s.field,
                    format!("Foreign key references its own record '{}'", s.record_id),
                )
            })
            .collect();

        issues.extend(self.circular_dependencies(schema).into_iter().map(|c| {
            ValidationIssue::warning(
                "circular-dependency",
                c.cycle_path[0].clone(),
                format!("Records depend on each other: {}", c.cycle_path.join(", ")),
            )
        }));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, Record};

    fn chain() -> Schema {
        Schema::from_records(
            "s",
            [
                Record::with_fields("a", [Field::from("*id"), Field::new("c_id").with_foreign_key("c.id")])
                    .unwrap(),
                Record::with_fields("b", [Field::from("*id"), Field::new("a_id").with_foreign_key("a.id")])
                    .unwrap(),
                Record::with_fields("c", [Field::from("*id"), Field::new("b_id").with_foreign_key("b.id")])
                    .unwrap(),
                Record::with_fields(
                    "tree",
                    [Field::from("*id"), Field::new("parent").with_foreign_key("tree.id")],
                )
                .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_self_references() {
        let found = RelationshipValidator::new().self_references(&chain());
        assert_eq!(
            found,
            vec![SelfReference {
                record_id: "tree".to_string(),
                field: "tree.parent".to_string(),
            }]
        );
    }

    #[test]
    fn test_circular_dependencies() {
        let cycles = RelationshipValidator::new().circular_dependencies(&chain());
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].cycle_path, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_check_circular_dependency() {
        let schema = Schema::from_records(
            "s",
            [
                Record::with_fields("person", [Field::from("*id")]).unwrap(),
                Record::with_fields(
                    "pet",
                    [Field::from("*id"), Field::new("owner_id").with_foreign_key("person.id")],
                )
                .unwrap(),
            ],
        )
        .unwrap();

        let validator = RelationshipValidator::new();
        assert_eq!(
            validator.check_circular_dependency(&schema, "person", "pet"),
            Some(vec!["pet".to_string(), "person".to_string()])
        );
        assert_eq!(validator.check_circular_dependency(&schema, "pet", "person"), None);
    }

    #[test]
    fn test_validate_reports_warnings() {
        let issues = RelationshipValidator::new().validate(&chain());
        let codes: Vec<&str> = issues.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec!["self-reference", "circular-dependency"]);
    }
}
