//! # Models and the model registry
//!
//! A [`Model`] is the immutable reflection snapshot of one mapped class:
//! its class name, table name, optional docstring, and ordered column and
//! relationship properties. A [`ModelRegistry`] holds every model of one
//! mapped universe and resolves relationship targets by class name.
//!
//! Registries are typically loaded from a YAML or JSON descriptor:
//!
//! ```yaml
//! models:
//!   - name: User
//!     table: users
//!     columns:
//!       - { name: id, type: { class: integer }, nullable: false }
//!       - { name: name, type: { class: string, length: 50 } }
//!     relationships:
//!       - { key: items, target: Item, direction: one_to_many,
//!           back_reference: user, remote_side: [user_id] }
//! ```
//!
//! Loading validates referential integrity up front: relationship targets
//! must exist, and the column names a relationship mentions must exist on
//! the model that should carry them. Schema generation can then assume a
//! closed, coherent model graph.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::property::{Column, ColumnProperty, RelationshipProperty};

/// Reflection snapshot of one mapped class.
///
/// Ordering matters: `columns` and `relationships` keep declaration order,
/// and generated schema properties follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Declared class name, e.g. `User`. Also the registry lookup key.
    pub name: String,

    /// Mapped table name, e.g. `users`.
    pub table: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,

    #[serde(default)]
    pub columns: Vec<ColumnProperty>,

    #[serde(default)]
    pub relationships: Vec<RelationshipProperty>,
}

impl Model {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            doc: None,
            columns: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Appends a single-column property keyed by the column name.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(ColumnProperty::from_column(column));
        self
    }

    /// Appends a multi-column property under an explicit key.
    pub fn column_group(mut self, key: impl Into<String>, columns: Vec<Column>) -> Self {
        self.columns.push(ColumnProperty::grouped(key, columns));
        self
    }

    pub fn relationship(mut self, rel: RelationshipProperty) -> Self {
        self.relationships.push(rel);
        self
    }

    /// Looks up a column property by key, falling back to the name of any
    /// underlying column. The fallback covers aliased attributes whose key
    /// differs from the storage column name.
    pub fn column_property(&self, name: &str) -> Option<&ColumnProperty> {
        self.columns
            .iter()
            .find(|prop| prop.key == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .find(|prop| prop.columns.iter().any(|c| c.name == name))
            })
    }

    pub fn relationship_property(&self, key: &str) -> Option<&RelationshipProperty> {
        self.relationships.iter().find(|rel| rel.key == key)
    }
}

/// All models of one mapped universe, keyed by class name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub models: Vec<Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model. Integrity is checked by [`validate`](Self::validate),
    /// not here, so registries can be assembled in any order.
    pub fn register(mut self, model: Model) -> Self {
        self.models.push(model);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Checks referential integrity of the whole registry.
    ///
    /// Model names must be unique, every relationship target must resolve,
    /// `local_columns` must exist on the owning model, and `remote_side`
    /// columns must exist on the target model.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = std::collections::BTreeSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(ModelError::DuplicateModel {
                    name: model.name.clone(),
                });
            }
        }

        for model in &self.models {
            for rel in &model.relationships {
                let Some(target) = self.get(&rel.target) else {
                    return Err(ModelError::UnknownTarget {
                        model: model.name.clone(),
                        relationship: rel.key.clone(),
                        target: rel.target.clone(),
                    });
                };
                for column in &rel.local_columns {
                    if model.column_property(column).is_none() {
                        return Err(ModelError::UnknownColumn {
                            model: model.name.clone(),
                            relationship: rel.key.clone(),
                            column: column.clone(),
                            owner: model.name.clone(),
                        });
                    }
                }
                for column in &rel.remote_side {
                    if target.column_property(column).is_none() {
                        return Err(ModelError::UnknownColumn {
                            model: model.name.clone(),
                            relationship: rel.key.clone(),
                            column: column.clone(),
                            owner: target.name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a YAML descriptor.
    pub fn from_yaml_str(input: &str) -> Result<Self, ModelError> {
        let registry: Self = serde_yaml::from_str(input)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Parses and validates a JSON descriptor.
    pub fn from_json_str(input: &str) -> Result<Self, ModelError> {
        let registry: Self = serde_json::from_str(input)?;
        registry.validate()?;
        Ok(registry)
    }
}
