//! # Model layer errors

use thiserror::Error;

/// Errors raised while loading or validating a model registry.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Two models in one registry share a class name.
    #[error("duplicate model '{name}' in registry")]
    DuplicateModel { name: String },

    /// A relationship names a target model the registry does not contain.
    #[error("model '{model}' relationship '{relationship}' targets unknown model '{target}'")]
    UnknownTarget {
        model: String,
        relationship: String,
        target: String,
    },

    /// A relationship references a column that does not exist on the model
    /// that should carry it.
    #[error("model '{model}' relationship '{relationship}' references unknown column '{column}' on '{owner}'")]
    UnknownColumn {
        model: String,
        relationship: String,
        column: String,
        owner: String,
    },

    /// A YAML descriptor failed to parse.
    #[error("descriptor parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON descriptor failed to parse.
    #[error("descriptor parse error: {0}")]
    Json(#[from] serde_json::Error),
}
