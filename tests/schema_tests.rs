//! Schema object model tests

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tabular_schema::{
    Cardinality, ConstructionError, Datatype, Field, ItemKind, Record, Relationship, Schema,
    SchemaError,
};

fn person() -> Record {
    Record::with_fields(
        "person",
        [
            Field::from("*id"),
            Field::from("first_name"),
            Field::from("last_name"),
        ],
    )
    .unwrap()
}

fn pet() -> Record {
    Record::with_fields(
        "pet",
        [
            Field::from("*id"),
            Field::new("owner_id").with_foreign_key("person.id"),
            Field::from("name"),
        ],
    )
    .unwrap()
}

fn address() -> Record {
    Record::with_fields(
        "address",
        [
            Field::from("*owner_id").with_foreign_key("person.id"),
            Field::from("*type"),
            Field::from("address"),
        ],
    )
    .unwrap()
}

fn primary_phone() -> Record {
    Record::with_fields(
        "primary_phone",
        [
            Field::from("*id").with_foreign_key("person.id"),
            Field::from("number"),
        ],
    )
    .unwrap()
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

mod relationship_tests {
    use super::*;

    #[test]
    fn test_single_foreign_key() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        let relationships = Relationship::derive_all(&schema).unwrap();

        assert_eq!(relationships.len(), 1);
        let rel = &relationships[0];
        assert_eq!(rel.source_record_id, "pet");
        assert_eq!(rel.target_record_id, "person");
        assert_eq!(rel.source_field, "pet.owner_id");
        assert_eq!(rel.target_field, "person.id");
        assert_eq!(rel.source_cardinality.as_str(), "0..N");
        assert_eq!(rel.target_cardinality, 1);
    }

    #[test]
    fn test_composite_key_is_many() {
        let schema = Schema::from_records("contacts", [person(), address()]).unwrap();
        let relationships = Relationship::derive_all(&schema).unwrap();

        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source_record_id, "address");
        assert_eq!(relationships[0].source_cardinality, Cardinality::ZeroOrMany);
    }

    #[test]
    fn test_sole_primary_key_is_optional_one() {
        let schema = Schema::from_records("contacts", [person(), primary_phone()]).unwrap();
        let relationships = Relationship::derive_all(&schema).unwrap();

        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source_cardinality, Cardinality::ZeroOrOne);
        assert_eq!(relationships[0].source_cardinality.to_string(), "0,1");
    }

    #[test]
    fn test_relationships_follow_record_order() {
        let schema =
            Schema::from_records("all", [person(), pet(), address(), primary_phone()]).unwrap();
        let sources: Vec<_> = Relationship::derive_all(&schema)
            .unwrap()
            .into_iter()
            .map(|r| r.source_record_id)
            .collect();
        assert_eq!(sources, vec!["pet", "address", "primary_phone"]);
    }

    #[test]
    fn test_unresolved_foreign_key_fails() {
        let schema = Schema::from_records("pets", [pet()]).unwrap();
        let err = Relationship::derive_all(&schema).unwrap_err();
        assert!(err.is_not_found());
    }
}

mod lookup_tests {
    use super::*;

    #[test]
    fn test_get_field_requires_separator() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        assert!(matches!(
            schema.get_field("badformat"),
            Err(SchemaError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_get_field_missing() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        assert!(matches!(
            schema.get_field("person.nonexistent"),
            Err(SchemaError::NotFound {
                kind: ItemKind::Field,
                ..
            })
        ));
        assert!(schema.get_field("nobody.id").unwrap_err().is_not_found());
    }

    #[test]
    fn test_foreign_keys_resolve_to_target_field() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        let owner = schema.get_field("pet.owner_id").unwrap();
        let targets = owner.foreign_keys().unwrap();

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0], schema.get_field("person.id").unwrap());
        assert_eq!(targets[0].record().id(), "person");
        assert!(targets[0].is_primary_key());
    }

    #[test]
    fn test_field_names_in_order() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        let names: Vec<String> = schema.field_names().collect();
        assert_eq!(
            names,
            vec![
                "person.id",
                "person.first_name",
                "person.last_name",
                "pet.id",
                "pet.owner_id",
                "pet.name",
            ]
        );
        assert_eq!(schema.field_count(), 6);
    }

    #[test]
    fn test_records_are_attached() {
        let schema = Schema::from_records("pets", [person(), pet()]).unwrap();
        let record = schema.get_record("pet").unwrap();
        assert_eq!(record.schema_id(), "pets");
        assert_eq!(record.get_field("owner_id").unwrap().record_id(), "pet");
        assert_eq!(
            schema.get_datatype("string").unwrap(),
            schema.get_field("pet.name").unwrap().datatype().unwrap()
        );
    }
}

mod construction_tests {
    use super::*;

    #[test]
    fn test_duplicate_record_rejected() {
        let mut schema = Schema::from_records("pets", [person()]).unwrap();
        let err = schema.add_record(person()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Construction(ConstructionError::DuplicateId {
                kind: ItemKind::Record,
                ..
            })
        ));
        assert_eq!(schema.records().len(), 1);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Record::with_fields("person", [Field::from("*id"), Field::from("id")]);
        assert!(err.is_err());
    }

    #[test]
    fn test_record_cannot_join_two_schemas() {
        let schema = Schema::from_records("pets", [person()]).unwrap();
        let attached = schema.get_record("person").unwrap().clone();
        let mut other = Schema::new("other");
        assert!(other.add_record(attached).is_err());

        let detached = schema.get_record("person").unwrap().to_detached();
        assert!(!detached.is_attached());
        assert!(other.add_record(detached).is_ok());
    }

    #[test]
    fn test_fields_added_through_schema() {
        let mut schema = Schema::new("pets");
        {
            let mut record = schema.add_record(Record::new("person")).unwrap();
            record.add_field(Field::from("*id")).unwrap();
            record.add_field(Field::from("name")).unwrap();
        }
        let field = schema.get_field("person.name").unwrap();
        assert_eq!(field.record_id(), "person");
        assert_eq!(field.qname(), "person.name");
    }

    #[test]
    fn test_unknown_datatype_rejected() {
        let record = Record::with_fields(
            "person",
            [Field::from("*id"), Field::new("age").with_datatype("years")],
        )
        .unwrap();
        assert!(Schema::from_records("people", [record]).is_err());
    }
}

mod datatype_tests {
    use super::*;

    #[test]
    fn test_datatypes_equal_by_id() {
        let first = Datatype::new("postcode").with_description("UK postcode");
        let second = Datatype::new("postcode").with_description("Postal code");

        assert_eq!(first, second);
        assert_eq!(hash_of(&first), hash_of(&second));
        assert_ne!(first, Datatype::new("zipcode"));
    }

    #[test]
    fn test_used_datatypes_include_ancestors() {
        let mut schema = Schema::new("contacts");
        let string = schema.get_datatype("string").unwrap().clone();
        schema
            .add_datatype(Datatype::new("postcode").with_extends(string))
            .unwrap();
        schema
            .add_record(
                Record::with_fields(
                    "address",
                    [
                        Field::from("*id"),
                        Field::new("postal_code").with_datatype("postcode"),
                    ],
                )
                .unwrap(),
            )
            .unwrap();

        let used: Vec<&str> = schema.used_datatypes().iter().map(|dt| dt.id()).collect();
        assert_eq!(used, vec!["string", "postcode"]);
    }
}

#[test]
fn test_schema_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Schema>();
    assert_send_sync::<Record>();
    assert_send_sync::<Field>();
}
