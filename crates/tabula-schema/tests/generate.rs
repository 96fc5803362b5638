//! Integration tests: full schema documents generated from small model
//! registries, covering every walker variant, both decision policies, both
//! reference modes, filters, overrides, depth limits, and cyclic graphs.
//!
//! Expected documents are compared through their serialized form where key
//! order matters; `serde_json` is built with `preserve_order`, so the
//! comparison is exact.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tabula_model::{Column, Direction, Model, ModelRegistry, NativeType, RelationshipProperty};
use tabula_schema::{
    ChildFactory, GenerateOptions, Override, ReferenceMode, RelationDecision, RelationHandling,
    SchemaError, SchemaFactory, WalkerVariant,
};

/// Two mutually related models: a group holding many users.
fn registry() -> ModelRegistry {
    let registry = ModelRegistry::new()
        .register(
            Model::new("Group", "groups")
                .with_doc("A named group of users.")
                .column(Column::new("id", NativeType::Integer).not_null())
                .column(Column::new("name", NativeType::String { length: Some(255) }).not_null())
                .column(Column::new(
                    "color",
                    NativeType::Enum {
                        values: vec![
                            "red".to_string(),
                            "green".to_string(),
                            "yellow".to_string(),
                            "blue".to_string(),
                        ],
                    },
                ))
                .relationship(
                    RelationshipProperty::new("users", "User", Direction::OneToMany)
                        .with_back_reference("group")
                        .with_local_columns(["id"])
                        .with_remote_side(["group_id"]),
                ),
        )
        .register(
            Model::new("User", "users")
                .column(Column::new("id", NativeType::Integer).not_null())
                .column(Column::new("name", NativeType::String { length: Some(255) }).not_null())
                .column(Column::new("created_at", NativeType::DateTime))
                .column(
                    Column::new("group_id", NativeType::Integer)
                        .not_null()
                        .with_foreign_key(),
                )
                .relationship(
                    RelationshipProperty::new("group", "Group", Direction::ManyToOne)
                        .with_back_reference("users")
                        .with_local_columns(["group_id"])
                        .with_remote_side(["id"]),
                ),
        );
    registry.validate().expect("fixture registry is coherent");
    registry
}

fn property_keys(schema: &serde_json::Map<String, Value>, pointer: &str) -> Vec<String> {
    let root = Value::Object(schema.clone());
    let mut node = &root;
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        node = &node[segment];
    }
    node.as_object()
        .expect("pointer target is an object")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn test_scalar_document_shape() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let doc = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();

    let expected = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "title": "User",
        "type": "object",
        "properties": {
            "id": {"type": "integer"},
            "name": {"type": "string", "maxLength": 255},
            "created_at": {"type": "string", "format": "date-time"},
            "group_id": {"type": "integer"}
        },
        "required": ["id", "name", "group_id"]
    });
    assert_eq!(
        serde_json::to_string_pretty(&doc.schema).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap()
    );
    assert_eq!(doc.name, "users");
}

#[test]
fn test_structural_walk_inlines_definitions() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Group", &GenerateOptions::default())
        .unwrap();

    let expected = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "title": "Group",
        "type": "object",
        "definitions": {
            "User": {
                "type": "object",
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string", "maxLength": 255},
                    "created_at": {"type": "string", "format": "date-time"}
                },
                "required": ["id", "name"]
            }
        },
        "properties": {
            "id": {"type": "integer"},
            "name": {"type": "string", "maxLength": 255},
            "color": {"type": "string", "enum": ["red", "green", "yellow", "blue"]},
            "users": {"type": "array", "items": {"$ref": "#/definitions/User"}}
        },
        "description": "A named group of users.",
        "required": ["id", "name"]
    });
    assert_eq!(
        serde_json::to_string_pretty(&doc.schema).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap()
    );
}

#[test]
fn test_many_to_one_reference_is_single_valued() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        doc.schema["properties"]["group"],
        json!({"$ref": "#/definitions/Group"})
    );
    let group_def = &doc.schema["definitions"]["Group"];
    assert_eq!(group_def["type"], json!("object"));
    assert_eq!(
        property_keys(&doc.schema, "definitions/Group/properties"),
        vec!["id", "name", "color"]
    );
    assert_eq!(group_def["required"], json!(["id", "name"]));
}

#[test]
fn test_required_omits_nullable_and_defaulted() {
    let registry = ModelRegistry::new().register(
        Model::new("Account", "accounts")
            .column(Column::new("id", NativeType::Integer).not_null())
            .column(
                Column::new("name", NativeType::String { length: Some(100) })
                    .not_null()
                    .with_default(),
            )
            .column(Column::new("email", NativeType::String { length: None })),
    );
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Account", &GenerateOptions::default())
        .unwrap();
    assert_eq!(doc.schema["required"], json!(["id"]));
}

#[test]
fn test_required_absent_when_nothing_is_mandatory() {
    let registry = ModelRegistry::new().register(
        Model::new("Note", "notes")
            .column(Column::new("body", NativeType::Text { length: None }))
            .column(Column::new("pinned", NativeType::Boolean).with_default()),
    );
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Note", &GenerateOptions::default())
        .unwrap();
    assert!(doc.schema.get("required").is_none());
}

#[test]
fn test_column_doc_becomes_description() {
    let registry = ModelRegistry::new().register(
        Model::new("Note", "notes").column(
            Column::new("body", NativeType::Text { length: None })
                .with_doc("Free-form\n    note text."),
        ),
    );
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Note", &GenerateOptions::default())
        .unwrap();
    assert_eq!(
        doc.schema["properties"]["body"],
        json!({"type": "string", "description": "Free-form note text."})
    );
}

#[test]
fn test_override_replaces_whole_field() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let opts = GenerateOptions::new().override_field(
        "name",
        Override::Replace(json!({"type": "string", "pattern": "^[a-z]+$"})),
    );
    let doc = factory.generate(&registry, "User", &opts).unwrap();

    // Replacement is wholesale; the generated maxLength does not survive.
    assert_eq!(
        doc.schema["properties"]["name"],
        json!({"type": "string", "pattern": "^[a-z]+$"})
    );
}

#[test]
fn test_override_removes_field() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let opts = GenerateOptions::new().override_field("created_at", Override::Remove);
    let doc = factory.generate(&registry, "User", &opts).unwrap();

    assert_eq!(
        property_keys(&doc.schema, "properties"),
        vec!["id", "name", "group_id"]
    );
}

#[test]
fn test_unmatched_override_is_an_error() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let opts = GenerateOptions::new()
        .override_field("no_such_field", Override::Replace(json!({"type": "null"})));
    let err = factory.generate(&registry, "User", &opts).err().unwrap();

    assert!(matches!(
        err,
        SchemaError::UnusedOverrides { keys } if keys == vec!["no_such_field".to_string()]
    ));
}

#[test]
fn test_nested_override_reaches_child_fields() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let opts = GenerateOptions::new().override_field(
        "users.name",
        Override::Replace(json!({"type": "string", "minLength": 1})),
    );
    let doc = factory.generate(&registry, "Group", &opts).unwrap();

    assert_eq!(
        doc.schema["definitions"]["User"]["properties"]["name"],
        json!({"type": "string", "minLength": 1})
    );
    // The parent's own column of the same name is untouched.
    assert_eq!(
        doc.schema["properties"]["name"],
        json!({"type": "string", "maxLength": 255})
    );
}

#[test]
fn test_includes_limit_properties() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let opts = GenerateOptions::new().include(["id", "name"]);
    let doc = factory.generate(&registry, "User", &opts).unwrap();

    assert_eq!(property_keys(&doc.schema, "properties"), vec!["id", "name"]);
    assert_eq!(doc.schema["required"], json!(["id", "name"]));
}

#[test]
fn test_conflicting_filters_rejected() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let opts = GenerateOptions::new().include(["id", "name"]).exclude(["name"]);
    let err = factory.generate(&registry, "User", &opts).err().unwrap();

    assert!(matches!(
        err,
        SchemaError::ConflictingFilters { keys } if keys == vec!["name".to_string()]
    ));
}

#[test]
fn test_self_referential_model_terminates() {
    let registry = ModelRegistry::new().register(
        Model::new("Node", "nodes")
            .column(Column::new("id", NativeType::Integer).not_null())
            .column(Column::new("parent_id", NativeType::Integer).with_foreign_key())
            .relationship(
                RelationshipProperty::new("parent", "Node", Direction::ManyToOne)
                    .with_back_reference("children")
                    .with_local_columns(["parent_id"])
                    .with_remote_side(["id"]),
            )
            .relationship(
                RelationshipProperty::new("children", "Node", Direction::OneToMany)
                    .with_back_reference("parent")
                    .with_remote_side(["parent_id"]),
            ),
    );
    registry.validate().unwrap();

    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Node", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        doc.schema["properties"]["parent"],
        json!({"$ref": "#/definitions/Node"})
    );
    assert_eq!(
        doc.schema["properties"]["children"],
        json!({"type": "array", "items": {"$ref": "#/definitions/Node"}})
    );
    // The definition keeps the first visit's view of the model.
    assert_eq!(
        property_keys(&doc.schema, "definitions/Node/properties"),
        vec!["id"]
    );
}

#[test]
fn test_generation_is_repeatable_across_calls() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let opts = GenerateOptions::default();
    let first = factory.generate(&registry, "Group", &opts).unwrap();
    let second = factory.generate(&registry, "Group", &opts).unwrap();
    assert_eq!(
        serde_json::to_string(&first.schema).unwrap(),
        serde_json::to_string(&second.schema).unwrap()
    );
}

#[test]
fn test_depth_limits_nesting() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Group", &GenerateOptions::new().with_depth(1))
        .unwrap();

    let user_def = &doc.schema["definitions"]["User"];
    assert!(user_def["properties"].as_object().unwrap().is_empty());
    // The depth cut empties the nested properties; required still reflects
    // the related model's walker.
    assert_eq!(user_def["required"], json!(["id", "name"]));
}

#[test]
fn test_comfortable_flattens_many_to_one_at_top_level() {
    let registry = registry();
    let factory =
        SchemaFactory::new(WalkerVariant::Structural).with_decision(RelationDecision::Comfortable);
    let doc = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        doc.schema["properties"],
        json!({
            "id": {"type": "integer"},
            "name": {"type": "string", "maxLength": 255},
            "created_at": {"type": "string", "format": "date-time"},
            "group_id": {"type": "integer", "relation": "group"}
        })
    );
    assert!(doc.schema.get("definitions").is_none());
}

#[test]
fn test_comfortable_keeps_child_link_out_of_parent_schema() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::Structural)
        .with_decision(RelationDecision::Comfortable)
        .with_child_factory(ChildFactory::default().bidirectional());
    let doc = factory
        .generate(&registry, "Group", &GenerateOptions::default())
        .unwrap();

    // The child's many-to-one link points straight back at the parent via
    // the same columns, so neither a reference nor a flattened foreign key
    // appears in the nested schema.
    assert_eq!(
        property_keys(&doc.schema, "definitions/User/properties"),
        vec!["id", "name", "created_at"]
    );
}

#[test]
fn test_comfortable_many_to_many_placeholder() {
    let registry = ModelRegistry::new()
        .register(
            Model::new("Article", "articles")
                .column(Column::new("id", NativeType::Integer).not_null())
                .relationship(
                    RelationshipProperty::new("tags", "Tag", Direction::ManyToMany)
                        .with_back_reference("articles"),
                ),
        )
        .register(
            Model::new("Tag", "tags")
                .column(Column::new("id", NativeType::Integer).not_null())
                .column(Column::new("label", NativeType::String { length: Some(50) }).not_null())
                .relationship(
                    RelationshipProperty::new("articles", "Article", Direction::ManyToMany)
                        .with_back_reference("tags"),
                ),
        );
    let factory =
        SchemaFactory::new(WalkerVariant::Structural).with_decision(RelationDecision::Comfortable);
    let doc = factory
        .generate(&registry, "Article", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        doc.schema["properties"]["tags"],
        json!({"type": "array", "items": {"type": "string"}})
    );
    assert!(doc.schema.get("definitions").is_none());
}

#[test]
fn test_hand_controlled_expands_chosen_relationships() {
    let registry = registry();
    let decisions = BTreeMap::from([("group".to_string(), RelationHandling::ForeignKey)]);
    let factory = SchemaFactory::new(WalkerVariant::HandControlled { decisions });
    let doc = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        property_keys(&doc.schema, "properties"),
        vec!["id", "name", "created_at", "group_id"]
    );
    assert_eq!(doc.schema["required"], json!(["id", "name", "group_id"]));
    assert!(doc.schema.get("definitions").is_none());
}

#[test]
fn test_hand_controlled_missing_decision_fails() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::HandControlled {
        decisions: BTreeMap::new(),
    });
    let err = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .err()
        .unwrap();

    assert!(matches!(
        err,
        SchemaError::MissingDecision { relationship, .. } if relationship == "group"
    ));
}

#[test]
fn test_file_reference_mode() {
    let registry = registry();
    let factory =
        SchemaFactory::new(WalkerVariant::Structural).with_reference_mode(ReferenceMode::Files);

    let user = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();
    assert_eq!(
        user.schema["properties"]["group"],
        json!({"$ref": "groups.json#"})
    );
    assert!(user.schema.get("definitions").is_none());

    let group = factory
        .generate(&registry, "Group", &GenerateOptions::default())
        .unwrap();
    assert_eq!(
        group.schema["properties"]["users"],
        json!({"type": "array", "items": {"$ref": "users.json#"}})
    );
}

#[test]
fn test_aliased_column_is_addressable_both_ways() {
    let registry = ModelRegistry::new().register(
        Model::new("Legacy", "legacy").column_group(
            "pk",
            vec![Column::new("legacy_id", NativeType::Integer).not_null()],
        ),
    );
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Legacy", &GenerateOptions::default())
        .unwrap();

    assert_eq!(
        property_keys(&doc.schema, "properties"),
        vec!["legacy_id", "pk"]
    );
    assert_eq!(
        doc.schema["properties"]["pk"],
        doc.schema["properties"]["legacy_id"]
    );
    assert_eq!(doc.schema["required"], json!(["pk"]));
}

#[test]
fn test_multi_column_group_keeps_column_names_only() {
    let registry = ModelRegistry::new().register(
        Model::new("Point", "points").column_group(
            "coords",
            vec![
                Column::new("x", NativeType::Integer).not_null(),
                Column::new("y", NativeType::Integer).not_null(),
            ],
        ),
    );
    let factory = SchemaFactory::new(WalkerVariant::Structural);
    let doc = factory
        .generate(&registry, "Point", &GenerateOptions::default())
        .unwrap();

    assert_eq!(property_keys(&doc.schema, "properties"), vec!["x", "y"]);
    // required speaks in property keys, not column names.
    assert_eq!(doc.schema["required"], json!(["coords"]));
}

#[test]
fn test_generated_documents_compile_as_draft04() {
    let registry = registry();
    let strict = SchemaFactory::new(WalkerVariant::Structural);
    let comfortable = SchemaFactory::new(WalkerVariant::NoForeignKey)
        .with_decision(RelationDecision::Comfortable);

    for (factory, model) in [
        (&strict, "User"),
        (&strict, "Group"),
        (&comfortable, "User"),
    ] {
        let doc = factory
            .generate(&registry, model, &GenerateOptions::default())
            .unwrap();
        let schema = Value::Object(doc.schema);
        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft4)
            .build(&schema)
            .unwrap_or_else(|e| panic!("{model} schema does not compile as draft-04: {e}"));
    }
}

#[test]
fn test_generated_schema_accepts_and_rejects_instances() {
    let registry = registry();
    let factory = SchemaFactory::new(WalkerVariant::SingleModel);
    let doc = factory
        .generate(&registry, "User", &GenerateOptions::default())
        .unwrap();
    let schema = Value::Object(doc.schema);
    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft4)
        .build(&schema)
        .expect("generated schema compiles");

    let valid = json!({
        "id": 7,
        "name": "ada",
        "created_at": "2024-05-01T10:30:00Z",
        "group_id": 1
    });
    assert!(validator.is_valid(&valid));

    let missing_required = json!({"name": "ada"});
    assert!(!validator.is_valid(&missing_required));

    let wrong_type = json!({"id": "seven", "name": "ada", "group_id": 1});
    assert!(!validator.is_valid(&wrong_type));
}
