//! # tabula-model — Reflection Snapshots of Mapped Models
//!
//! This crate defines the immutable model metadata that schema generation
//! consumes: models, column and relationship properties, native column
//! types, and the registry that ties a mapped universe together. It holds
//! no generation logic; `tabula-schema` builds on top of it.
//!
//! ## Key Design Principles
//!
//! 1. **Snapshots, not live metadata.** A `Model` is a value extracted once
//!    from mapper internals. Traversal never reads back into a mutable ORM
//!    structure, so concurrent generation over the same registry is safe.
//!
//! 2. **Property kind is a closed enum.** A field is either a
//!    `ColumnProperty` or a `RelationshipProperty`, decided at extraction
//!    time. Consumers match; they never probe attributes.
//!
//! 3. **Type chains are data.** Every `TypeClass` carries its inheritance
//!    chain as a static slice, so classification fallback is an ordered
//!    lookup rather than a runtime hierarchy walk.
//!
//! 4. **Declaration order is preserved.** Columns and relationships stay in
//!    the order the model declared them, and everything downstream inherits
//!    that order.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tabula-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and the descriptor-facing
//!   ones implement `Serialize`/`Deserialize`.

pub mod error;
pub mod model;
pub mod property;
pub mod types;

// Re-export primary types for ergonomic imports.
pub use error::ModelError;
pub use model::{Model, ModelRegistry};
pub use property::{Column, ColumnProperty, Direction, PropertyRef, RelationshipProperty};
pub use types::{NativeType, TypeClass};
