//! # Schema generation errors
//!
//! Every failure aborts the whole generation call. There is no partial
//! output and nothing is retried; callers get one error with enough context
//! to name the offending keys or type.

use thiserror::Error;

/// Errors raised during schema generation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The same keys were supplied in both includes and excludes.
    #[error("conflicting filters, keys in both includes and excludes: {keys:?}")]
    ConflictingFilters { keys: Vec<String> },

    /// A native type has no primitive mapping anywhere in its chain.
    #[error("no schema primitive registered for native type '{type_name}' or its ancestors")]
    UnmappedType { type_name: String },

    /// A column carries the placeholder for a type the snapshot extractor
    /// could not resolve. Treated as an invariant violation, not user input.
    #[error("column '{column}' carries unresolved native type '{type_name}'")]
    UnresolvedType { column: String, type_name: String },

    /// Override keys that never matched a produced field.
    #[error("unused override keys: {keys:?}")]
    UnusedOverrides { keys: Vec<String> },

    /// A hand-controlled walker met a relationship it has no decision for.
    #[error("no decision registered for relationship '{relationship}' on model '{model}'")]
    MissingDecision { model: String, relationship: String },

    /// The requested root model is not in the registry.
    #[error("model '{name}' is not in the registry")]
    UnknownModel { name: String },

    /// A relationship targets a model the registry does not contain.
    #[error("relationship '{relationship}' on model '{model}' targets unknown model '{target}'")]
    UnknownTarget {
        model: String,
        relationship: String,
        target: String,
    },

    /// A relationship names a local column the model does not have.
    #[error("relationship '{relationship}' on model '{model}' references unknown column '{column}'")]
    UnknownColumn {
        model: String,
        relationship: String,
        column: String,
    },
}
