//! # Relation decision policies
//!
//! For each property a walker yields, a decision policy says how it lands
//! in the schema: as a nested relationship, as flattened foreign-key
//! columns, or as a literal inline fragment. The policy is consulted per
//! property, so one walked relationship can expand into several scalar
//! fields or into nothing at all.

use std::collections::BTreeSet;

use serde_json::{json, Map, Value};
use tabula_model::{ColumnProperty, Direction, Model, PropertyRef, RelationshipProperty};

use crate::error::SchemaError;

/// One instruction produced by a decision policy.
#[derive(Debug, Clone)]
pub enum DecisionStep<'r> {
    /// Descend into the related model and attach a nested schema or
    /// reference under the relationship's key.
    Relationship(&'r RelationshipProperty),

    /// Emit the column property's fields, merging `extra` into each one.
    ForeignKey {
        prop: &'r ColumnProperty,
        extra: Map<String, Value>,
    },

    /// Attach a literal fragment under the given key.
    Inline { key: &'r str, fragment: Value },
}

/// Policy deciding how walked properties become schema fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationDecision {
    /// Relationships stay relationships; columns stay columns.
    #[default]
    Strict,

    /// Many-to-one relationships flatten into their local foreign-key
    /// columns, each tagged `{"relation": <key>}` to record its origin.
    /// Many-to-many degrades to a string-array placeholder. One-to-many
    /// stays a full nested relationship.
    Comfortable,
}

impl RelationDecision {
    /// Decides the steps for one walked property.
    ///
    /// `via` is the relationship the build descended through to reach this
    /// model, if any. Comfortable mode uses it to avoid re-flattening the
    /// same link back toward its own parent, which would duplicate the
    /// parent linkage at every nesting level.
    pub fn decide<'r>(
        &self,
        model: &'r Model,
        prop: PropertyRef<'r>,
        toplevel: bool,
        via: Option<&RelationshipProperty>,
    ) -> Result<Vec<DecisionStep<'r>>, SchemaError> {
        match (self, prop) {
            (_, PropertyRef::Column(prop)) => Ok(vec![DecisionStep::ForeignKey {
                prop,
                extra: Map::new(),
            }]),
            (Self::Strict, PropertyRef::Relationship(rel)) => {
                Ok(vec![DecisionStep::Relationship(rel)])
            }
            (Self::Comfortable, PropertyRef::Relationship(rel)) => {
                comfortable_relationship(model, rel, toplevel, via)
            }
        }
    }
}

fn comfortable_relationship<'r>(
    model: &'r Model,
    rel: &'r RelationshipProperty,
    toplevel: bool,
    via: Option<&RelationshipProperty>,
) -> Result<Vec<DecisionStep<'r>>, SchemaError> {
    match rel.direction {
        Direction::ManyToOne => {
            // Below the top level, a many-to-one whose local columns are
            // exactly the parent's remote side is the link we just came
            // down through; flattening it again would re-emit the parent
            // linkage inside every child.
            if !toplevel {
                if let Some(parent) = via {
                    if name_set(&rel.local_columns) == name_set(&parent.remote_side) {
                        return Ok(Vec::new());
                    }
                }
            }
            let mut steps = Vec::new();
            for column in &rel.local_columns {
                let prop = model.column_property(column).ok_or_else(|| {
                    SchemaError::UnknownColumn {
                        model: model.name.clone(),
                        relationship: rel.key.clone(),
                        column: column.clone(),
                    }
                })?;
                let mut extra = Map::new();
                extra.insert("relation".to_string(), json!(rel.key));
                steps.push(DecisionStep::ForeignKey { prop, extra });
            }
            Ok(steps)
        }
        Direction::ManyToMany => {
            tracing::warn!(
                model = %model.name,
                relationship = %rel.key,
                "many-to-many relationship degrades to a string-array placeholder"
            );
            Ok(vec![DecisionStep::Inline {
                key: &rel.key,
                fragment: json!({"type": "array", "items": {"type": "string"}}),
            }])
        }
        Direction::OneToMany => Ok(vec![DecisionStep::Relationship(rel)]),
    }
}

fn name_set(names: &[String]) -> BTreeSet<&str> {
    names.iter().map(String::as_str).collect()
}
