//! # tabula-schema — JSON Schema Generation
//!
//! Turns [`tabula_model`] snapshots into JSON Schema draft-04 documents.
//!
//! ## Pipeline
//!
//! A [`SchemaFactory`] owns the configuration and drives one generation
//! call per root model:
//!
//! - [`walk`] selects the properties a document describes. Variants range
//!   from a flat single-model view to a structural walk that descends
//!   relationships, plus a hand-controlled mode with an explicit decision
//!   per relationship.
//! - [`classify`] maps each column's native type to a draft-04 primitive
//!   via an inheritance-chain lookup; [`restrict`] then layers validation
//!   keywords (`maxLength`, `enum`, `format`) on top.
//! - [`decision`] chooses per walked property whether to emit columns,
//!   descend the relationship, or flatten it away; [`overrides`] lets
//!   callers replace or remove individual fields, with unused override
//!   keys treated as errors.
//! - [`factory`] assembles the document: root keys in fixed order,
//!   related models attached inline under `definitions` or as external
//!   file references, and a shared traversal history keeping cyclic
//!   model graphs finite.
//!
//! ## Crate Policy
//!
//! - Depends only on `tabula-model` internally.
//! - Generation is deterministic: identical registry and options produce
//!   byte-identical documents, with object keys in declaration order.
//! - All failures are structured [`SchemaError`] values; nothing panics
//!   on malformed input.

pub mod classify;
pub mod decision;
pub mod error;
pub mod factory;
pub mod overrides;
pub mod restrict;
pub mod walk;

pub use classify::{default_mapping, Classifier, Primitive};
pub use decision::{DecisionStep, RelationDecision};
pub use error::SchemaError;
pub use factory::{
    ChildFactory, GenerateOptions, ReferenceMode, SchemaDocument, SchemaFactory, SCHEMA_DRAFT04,
};
pub use overrides::{Override, OverrideSet};
pub use restrict::{default_rules, RestrictionRule, Restrictions};
pub use walk::{RelationHandling, TraversalHistory, Walker, WalkerVariant};
