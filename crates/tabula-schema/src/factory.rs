//! # Schema factory
//!
//! Assembles a complete JSON Schema draft-04 document for one root model.
//! The factory instantiates the configured walker, consults the relation
//! decision policy per walked property, classifies columns, applies
//! restrictions and overrides, and recurses through relationships with a
//! shared traversal history keeping cyclic graphs finite.
//!
//! Related models attach in one of two reference modes: inline
//! `definitions` with `#/definitions/<Class>` references in the same
//! document, or cross-file `<table>.json#` references when every model's
//! schema is published as its own file.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{json, Map, Value};
use tabula_model::{
    ColumnProperty, Direction, Model, ModelRegistry, PropertyRef, RelationshipProperty,
};

use crate::classify::{Classifier, Primitive};
use crate::decision::{DecisionStep, RelationDecision};
use crate::error::SchemaError;
use crate::overrides::{Override, OverrideSet};
use crate::restrict::Restrictions;
use crate::walk::{scoped_set, TraversalHistory, Walker, WalkerVariant};

/// URI of the JSON Schema draft this generator targets.
pub const SCHEMA_DRAFT04: &str = "http://json-schema.org/draft-04/schema#";

/// How related models are referenced from the root document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Register related models under `definitions` and reference them as
    /// `#/definitions/<Class>`.
    #[default]
    Definitions,
    /// Reference related models as external `<table>.json#` files.
    Files,
}

/// Derives the walker, overrides, and schema shape for a child model.
#[derive(Debug, Clone)]
pub struct ChildFactory {
    splitter: String,
    bidirectional: bool,
}

impl Default for ChildFactory {
    fn default() -> Self {
        Self {
            splitter: ".".to_string(),
            bidirectional: false,
        }
    }
}

impl ChildFactory {
    /// Child factory using `splitter` to scope nested filter and override
    /// keys.
    pub fn new(splitter: impl Into<String>) -> Self {
        Self {
            splitter: splitter.into(),
            bidirectional: false,
        }
    }

    /// Keeps back-references walkable instead of auto-excluding them.
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    pub fn splitter(&self) -> &str {
        &self.splitter
    }

    /// Walker for the related model: parent filters narrowed to the
    /// relationship's dotted namespace, plus the relationship's own
    /// back-reference excluded so the child does not walk straight back to
    /// the parent.
    pub fn child_walker<'r>(
        &self,
        rel: &RelationshipProperty,
        walker: &Walker<'r>,
        target: &'r Model,
    ) -> Result<Walker<'r>, SchemaError> {
        let includes = scoped_set(&rel.key, &self.splitter, walker.includes());
        let mut excludes =
            scoped_set(&rel.key, &self.splitter, walker.excludes()).unwrap_or_default();
        if !self.bidirectional {
            if let Some(back) = &rel.back_reference {
                excludes.insert(back.clone());
            }
        }
        walker.child(&rel.key, &self.splitter, target, includes, Some(excludes))
    }

    /// Override set scoped to the relationship's dotted namespace.
    pub fn child_overrides(&self, rel: &RelationshipProperty, overrides: &OverrideSet) -> OverrideSet {
        overrides.child(&rel.key, &self.splitter)
    }

    /// Builds the child's field mapping one nesting level down and wraps it
    /// in the shape the relationship calls for: an array for one-to-many,
    /// an object otherwise.
    pub(crate) fn child_schema<'r>(
        &self,
        factory: &SchemaFactory,
        ctx: &mut BuildContext<'r>,
        rel: &RelationshipProperty,
        subwalker: &Walker<'r>,
        suboverrides: &mut OverrideSet,
        depth: Option<u32>,
    ) -> Result<Map<String, Value>, SchemaError> {
        let sub = factory.build_properties(
            ctx,
            subwalker,
            suboverrides,
            depth.map(|d| d.saturating_sub(1)),
            false,
            Some(rel),
        )?;
        let mut value = Map::new();
        if rel.direction == Direction::OneToMany {
            value.insert("type".to_string(), json!("array"));
            value.insert("items".to_string(), Value::Object(sub));
        } else {
            value.insert("type".to_string(), json!("object"));
            value.insert("properties".to_string(), Value::Object(sub));
        }
        Ok(value)
    }
}

/// Per-call generation options.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Keys to include, dotted for nested levels. `None` includes all.
    pub includes: Option<BTreeSet<String>>,
    /// Keys to exclude, dotted for nested levels.
    pub excludes: Option<BTreeSet<String>>,
    /// Per-field replacements and removals, dotted for nested levels.
    pub overrides: BTreeMap<String, Override>,
    /// Maximum relationship nesting; unlimited when unset.
    pub depth: Option<u32>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn override_field(mut self, key: impl Into<String>, value: Override) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// A generated schema document: the root table name plus the schema tree.
#[derive(Debug, Clone, Serialize)]
pub struct SchemaDocument {
    /// Root table name. File-reference mode assumes the document is
    /// published as `<name>.json`.
    pub name: String,
    pub schema: Map<String, Value>,
}

/// State threaded through one generation call.
pub(crate) struct BuildContext<'r> {
    registry: &'r ModelRegistry,
    history: TraversalHistory,
    definitions: Map<String, Value>,
}

/// Generates JSON Schema draft-04 documents from model snapshots.
///
/// A factory is configured once (walker variant, decision policy,
/// classifier, restrictions, reference mode) and may generate any number
/// of documents; each call builds its own walker, override set, and
/// traversal history, so calls are independent and deterministic.
#[derive(Debug, Clone)]
pub struct SchemaFactory {
    walker: WalkerVariant,
    classifier: Classifier,
    restrictions: Restrictions,
    child_factory: ChildFactory,
    decision: RelationDecision,
    mode: ReferenceMode,
}

impl SchemaFactory {
    /// Factory over the given walker variant with default classifier,
    /// restrictions, strict decisions, and inline definitions.
    pub fn new(walker: WalkerVariant) -> Self {
        Self {
            walker,
            classifier: Classifier::default(),
            restrictions: Restrictions::default(),
            child_factory: ChildFactory::default(),
            decision: RelationDecision::Strict,
            mode: ReferenceMode::Definitions,
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_restrictions(mut self, restrictions: Restrictions) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn with_child_factory(mut self, child_factory: ChildFactory) -> Self {
        self.child_factory = child_factory;
        self
    }

    pub fn with_decision(mut self, decision: RelationDecision) -> Self {
        self.decision = decision;
        self
    }

    pub fn with_reference_mode(mut self, mode: ReferenceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Generates the schema document for one root model.
    ///
    /// Output keys follow property declaration order; `definitions`
    /// entries appear in first-visit order. `required` and `description`
    /// are omitted when empty, and any override key that never matched a
    /// produced field fails the whole call.
    pub fn generate(
        &self,
        registry: &ModelRegistry,
        model: &str,
        opts: &GenerateOptions,
    ) -> Result<SchemaDocument, SchemaError> {
        let model = registry.get(model).ok_or_else(|| SchemaError::UnknownModel {
            name: model.to_string(),
        })?;
        let span = tracing::debug_span!("generate", model = %model.name);
        let _enter = span.enter();

        let walker = Walker::new(
            model,
            self.walker.clone(),
            opts.includes.clone(),
            opts.excludes.clone(),
        )?;
        let mut overrides = OverrideSet::new(opts.overrides.clone());
        let mut ctx = BuildContext {
            registry,
            history: TraversalHistory::new(),
            definitions: Map::new(),
        };

        let properties =
            self.build_properties(&mut ctx, &walker, &mut overrides, opts.depth, true, None)?;

        if !overrides.fully_consumed() {
            return Err(SchemaError::UnusedOverrides {
                keys: overrides.unused(),
            });
        }

        let required = self.detect_required(&walker, &ctx.history)?;

        let mut schema = Map::new();
        schema.insert("$schema".to_string(), json!(SCHEMA_DRAFT04));
        schema.insert("title".to_string(), json!(model.name));
        schema.insert("type".to_string(), json!("object"));
        if !ctx.definitions.is_empty() {
            schema.insert("definitions".to_string(), Value::Object(ctx.definitions));
        }
        schema.insert("properties".to_string(), Value::Object(properties));
        if let Some(doc) = &model.doc {
            schema.insert("description".to_string(), json!(clean_doc(doc)));
        }
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }

        tracing::debug!(
            model = %model.name,
            visited = ctx.history.len(),
            "schema assembled"
        );
        Ok(SchemaDocument {
            name: model.table.clone(),
            schema,
        })
    }

    fn build_properties<'r>(
        &self,
        ctx: &mut BuildContext<'r>,
        walker: &Walker<'r>,
        overrides: &mut OverrideSet,
        depth: Option<u32>,
        toplevel: bool,
        via: Option<&RelationshipProperty>,
    ) -> Result<Map<String, Value>, SchemaError> {
        if depth == Some(0) {
            return Ok(Map::new());
        }

        let mut properties = Map::new();
        for prop in walker.walk(&ctx.history)? {
            for step in self.decision.decide(walker.model(), prop, toplevel, via)? {
                match step {
                    DecisionStep::Relationship(rel) => {
                        // The history may have grown since this walker's
                        // sequence was taken; a relationship visited by a
                        // deeper branch in the meantime stays closed.
                        if ctx.history.contains(&walker.model().name, &rel.key) {
                            continue;
                        }
                        ctx.history.record(walker.model().name.clone(), rel.key.clone());

                        let target = ctx.registry.get(&rel.target).ok_or_else(|| {
                            SchemaError::UnknownTarget {
                                model: walker.model().name.clone(),
                                relationship: rel.key.clone(),
                                target: rel.target.clone(),
                            }
                        })?;
                        let subwalker = self.child_factory.child_walker(rel, walker, target)?;
                        let mut suboverrides = self.child_factory.child_overrides(rel, overrides);
                        let value = self.child_factory.child_schema(
                            self,
                            ctx,
                            rel,
                            &subwalker,
                            &mut suboverrides,
                            depth,
                        )?;
                        overrides.absorb(&rel.key, self.child_factory.splitter(), &suboverrides);
                        self.attach_reference(ctx, &mut properties, &subwalker, rel, value)?;
                    }
                    DecisionStep::ForeignKey { prop, extra } => {
                        self.add_column_fields(&mut properties, prop, &extra, overrides)?;
                    }
                    DecisionStep::Inline { key, fragment } => {
                        properties.insert(key.to_string(), fragment);
                    }
                }
            }
        }
        Ok(properties)
    }

    /// Emits the scalar fields of one column property.
    fn add_column_fields(
        &self,
        properties: &mut Map<String, Value>,
        prop: &ColumnProperty,
        extra: &Map<String, Value>,
        overrides: &mut OverrideSet,
    ) -> Result<(), SchemaError> {
        let mut last: Option<Value> = None;
        for column in &prop.columns {
            if let Some(type_name) = column.native.unresolved_name() {
                return Err(SchemaError::UnresolvedType {
                    column: column.name.clone(),
                    type_name: type_name.to_string(),
                });
            }
            let (matched, primitive) = self.classifier.classify(&column.native)?;

            let mut field = Map::new();
            field.insert("type".to_string(), json!(primitive.as_str()));

            if primitive == Primitive::Array {
                if let Some(item) = column.native.item() {
                    let (_, item_primitive) = self.classifier.classify(item)?;
                    let mut items = Map::new();
                    items.insert("type".to_string(), json!(item_primitive.as_str()));
                    if item_primitive == Primitive::String {
                        if let Some(length) = item.length() {
                            if length > 0 {
                                items.insert("maxLength".to_string(), json!(length));
                            }
                        }
                    }
                    field.insert("items".to_string(), Value::Object(items));
                }
            }

            self.restrictions.apply(matched, &column.native, &mut field);

            if let Some(doc) = &column.doc {
                field.insert("description".to_string(), json!(clean_doc(doc)));
            }

            let Some(mut value) = overrides.apply(&column.name, Value::Object(field)) else {
                // Removed by override; nothing to store or alias.
                last = None;
                continue;
            };

            if !extra.is_empty() {
                if let Value::Object(map) = &mut value {
                    for (k, v) in extra {
                        map.insert(k.clone(), v.clone());
                    }
                }
            }

            properties.insert(column.name.clone(), value.clone());
            last = Some(value);
        }

        // An aliased single-column property stays addressable under its own
        // key as well. Multi-column properties keep per-column names only;
        // a shared key slot would retain just the last column.
        if prop.columns.len() == 1 {
            if let Some(value) = last {
                if prop.key != prop.columns[0].name {
                    properties.insert(prop.key.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Attaches a built child schema to the parent, as a cross-file
    /// reference or an inline definition depending on the reference mode.
    fn attach_reference(
        &self,
        ctx: &mut BuildContext<'_>,
        properties: &mut Map<String, Value>,
        subwalker: &Walker<'_>,
        rel: &RelationshipProperty,
        mut value: Map<String, Value>,
    ) -> Result<(), SchemaError> {
        match self.mode {
            ReferenceMode::Files => {
                let reference = json!({"$ref": format!("{}.json#", subwalker.model().table)});
                let attached = if rel.direction.many_valued() {
                    json!({"type": "array", "items": reference})
                } else {
                    reference
                };
                properties.insert(rel.key.clone(), attached);
            }
            ReferenceMode::Definitions => {
                let class_name = subwalker.model().name.clone();
                let reference = json!({"$ref": format!("#/definitions/{class_name}")});

                let array_shaped = value.get("type") == Some(&json!("array"));
                if array_shaped {
                    // Definitions always describe the related object itself;
                    // the use site carries the array wrapper.
                    let items = value.remove("items").unwrap_or_else(|| json!({}));
                    value.insert("type".to_string(), json!("object"));
                    value.insert("properties".to_string(), items);
                    properties.insert(
                        rel.key.clone(),
                        json!({"type": "array", "items": reference}),
                    );
                } else {
                    properties.insert(rel.key.clone(), reference);
                }

                let required = self.detect_required(subwalker, &ctx.history)?;
                if !required.is_empty() {
                    value.insert("required".to_string(), json!(required));
                }
                // First visit wins; later visits reuse the stored entry.
                ctx.definitions
                    .entry(class_name)
                    .or_insert(Value::Object(value));
            }
        }
        Ok(())
    }

    /// Keys of properties whose columns are all non-nullable and carry no
    /// default.
    fn detect_required(
        &self,
        walker: &Walker<'_>,
        history: &TraversalHistory,
    ) -> Result<Vec<String>, SchemaError> {
        let mut required = Vec::new();
        for prop in walker.walk(history)? {
            if let PropertyRef::Column(prop) = prop {
                if !prop.columns.is_empty()
                    && prop.columns.iter().all(|c| !c.nullable && !c.has_default)
                {
                    required.push(prop.key.clone());
                }
            }
        }
        Ok(required)
    }
}

/// Collapses a docstring's internal whitespace into single spaces.
fn clean_doc(doc: &str) -> String {
    doc.split_whitespace().collect::<Vec<_>>().join(" ")
}
