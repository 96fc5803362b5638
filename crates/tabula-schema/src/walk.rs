//! # Model walkers
//!
//! A walker enumerates the properties of one model that participate in
//! schema generation, in declaration order: columns first, then
//! relationships for the variants that traverse them. Include and exclude
//! filters apply at every level; a shared traversal history keeps cyclic
//! model graphs finite by never re-entering a relationship already visited
//! anywhere in the current root build.
//!
//! Walkers are cheap, borrowed views created per generation call and per
//! recursion level. Descending into a related model derives a child walker
//! of the same variant with filters narrowed to the child's dotted
//! namespace.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tabula_model::{Model, PropertyRef};

use crate::error::SchemaError;

/// Per-relationship instruction for the hand-controlled walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationHandling {
    /// Traverse into the related model.
    Relationship,
    /// Flatten the relationship into its local foreign-key columns.
    ForeignKey,
}

/// Relationship properties visited so far in one root build.
///
/// Entries are `(model name, property key)` pairs and are never removed:
/// once a relationship has been descended, no deeper level may descend it
/// again, regardless of which branch got there first.
#[derive(Debug, Clone, Default)]
pub struct TraversalHistory {
    visited: Vec<(String, String)>,
}

impl TraversalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, model: &str, key: &str) -> bool {
        self.visited.iter().any(|(m, k)| m == model && k == key)
    }

    pub fn record(&mut self, model: impl Into<String>, key: impl Into<String>) {
        self.visited.push((model.into(), key.into()));
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Traversal strategy for one model.
#[derive(Debug, Clone)]
pub enum WalkerVariant {
    /// Raw column properties only, foreign keys included.
    SingleModel,
    /// Column properties only, skipping any with a foreign-key column.
    NoForeignKey,
    /// Non-foreign-key columns plus relationships.
    Structural,
    /// Like structural, but every relationship needs an explicit decision:
    /// traverse it, or expand it into its local foreign-key columns.
    /// Decisions for nested levels use dotted keys.
    HandControlled {
        decisions: BTreeMap<String, RelationHandling>,
    },
}

/// Property enumerator scoped to one model.
#[derive(Debug, Clone)]
pub struct Walker<'r> {
    model: &'r Model,
    variant: WalkerVariant,
    includes: Option<BTreeSet<String>>,
    excludes: Option<BTreeSet<String>>,
}

impl<'r> Walker<'r> {
    /// Builds a walker, rejecting overlapping includes and excludes.
    pub fn new(
        model: &'r Model,
        variant: WalkerVariant,
        includes: Option<BTreeSet<String>>,
        excludes: Option<BTreeSet<String>>,
    ) -> Result<Self, SchemaError> {
        if let (Some(inc), Some(exc)) = (&includes, &excludes) {
            let overlap: Vec<String> = inc.intersection(exc).cloned().collect();
            if !overlap.is_empty() {
                return Err(SchemaError::ConflictingFilters { keys: overlap });
            }
        }
        Ok(Self {
            model,
            variant,
            includes,
            excludes,
        })
    }

    pub fn model(&self) -> &'r Model {
        self.model
    }

    pub fn includes(&self) -> Option<&BTreeSet<String>> {
        self.includes.as_ref()
    }

    pub fn excludes(&self) -> Option<&BTreeSet<String>> {
        self.excludes.as_ref()
    }

    fn passes(&self, key: &str) -> bool {
        let included = match &self.includes {
            None => true,
            Some(keys) => keys.contains(key),
        };
        let excluded = match &self.excludes {
            None => false,
            Some(keys) => keys.contains(key),
        };
        included && !excluded
    }

    /// Enumerates the properties this walker selects, filtered against the
    /// given traversal history.
    ///
    /// The sequence is finite and ordered: column properties in declaration
    /// order, then relationship handling in relationship order. Callers
    /// descending into relationships must re-check the history at descend
    /// time; it may have grown since this snapshot was taken.
    pub fn walk(&self, history: &TraversalHistory) -> Result<Vec<PropertyRef<'r>>, SchemaError> {
        let mut props: Vec<PropertyRef<'r>> = Vec::new();

        let skip_foreign_keys = !matches!(self.variant, WalkerVariant::SingleModel);
        for prop in &self.model.columns {
            if self.passes(&prop.key) && !(skip_foreign_keys && prop.has_foreign_key()) {
                props.push(PropertyRef::Column(prop));
            }
        }

        match &self.variant {
            WalkerVariant::SingleModel | WalkerVariant::NoForeignKey => {}
            WalkerVariant::Structural => {
                for rel in &self.model.relationships {
                    if self.passes(&rel.key) && !history.contains(&self.model.name, &rel.key) {
                        props.push(PropertyRef::Relationship(rel));
                    }
                }
            }
            WalkerVariant::HandControlled { decisions } => {
                for rel in &self.model.relationships {
                    let handling = decisions.get(&rel.key).ok_or_else(|| {
                        SchemaError::MissingDecision {
                            model: self.model.name.clone(),
                            relationship: rel.key.clone(),
                        }
                    })?;
                    match handling {
                        RelationHandling::Relationship => {
                            if self.passes(&rel.key)
                                && !history.contains(&self.model.name, &rel.key)
                            {
                                props.push(PropertyRef::Relationship(rel));
                            }
                        }
                        // Expanded columns bypass the foreign-key skip;
                        // flattening them is the whole point.
                        RelationHandling::ForeignKey => {
                            for column in &rel.local_columns {
                                let prop = self.model.column_property(column).ok_or_else(|| {
                                    SchemaError::UnknownColumn {
                                        model: self.model.name.clone(),
                                        relationship: rel.key.clone(),
                                        column: column.clone(),
                                    }
                                })?;
                                if self.passes(&prop.key) {
                                    props.push(PropertyRef::Column(prop));
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(props)
    }

    /// Derives the walker for a related model.
    ///
    /// The variant is preserved; a hand-controlled walker narrows its
    /// decision map to the namespace under `name`. Includes and excludes
    /// are supplied by the caller, already scoped.
    pub fn child(
        &self,
        name: &str,
        splitter: &str,
        target: &'r Model,
        includes: Option<BTreeSet<String>>,
        excludes: Option<BTreeSet<String>>,
    ) -> Result<Walker<'r>, SchemaError> {
        let variant = match &self.variant {
            WalkerVariant::HandControlled { decisions } => WalkerVariant::HandControlled {
                decisions: scoped_map(name, splitter, decisions),
            },
            other => other.clone(),
        };
        Walker::new(target, variant, includes, excludes)
    }
}

/// Narrows a dotted-key filter set to the namespace under `name`.
///
/// `None` stays `None` (no filtering); a present set becomes the set of
/// suffixes under `name`, possibly empty, which then filters everything out.
pub(crate) fn scoped_set(
    name: &str,
    splitter: &str,
    set: Option<&BTreeSet<String>>,
) -> Option<BTreeSet<String>> {
    set.map(|entries| {
        let prefix = format!("{name}{splitter}");
        entries
            .iter()
            .filter_map(|entry| entry.strip_prefix(&prefix).map(str::to_string))
            .collect()
    })
}

fn scoped_map(
    name: &str,
    splitter: &str,
    map: &BTreeMap<String, RelationHandling>,
) -> BTreeMap<String, RelationHandling> {
    let prefix = format!("{name}{splitter}");
    map.iter()
        .filter_map(|(key, handling)| {
            key.strip_prefix(&prefix)
                .map(|rest| (rest.to_string(), *handling))
        })
        .collect()
}
