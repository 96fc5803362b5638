//! # tabula-cli — Schema Generation CLI
//!
//! Provides the `tabula` command-line interface over the library crates.
//!
//! ## Subcommands
//!
//! - `tabula generate` — Generate JSON Schema draft-04 documents from a
//!   model descriptor, for selected models or all of them, to stdout or
//!   one file per model.
//! - `tabula list` — List the models a descriptor declares.
//!
//! Exit codes follow the usual convention: 0 on success, 1 when generation
//! or parsing fails for some model, 2 on operational errors such as an
//! unreadable descriptor file.

pub mod generate;
pub mod list;

use std::path::Path;

use anyhow::{Context, Result};
use tabula_model::ModelRegistry;

/// Loads and validates a model registry from a descriptor file.
///
/// The format follows the file extension: `.json` is parsed as JSON,
/// anything else as YAML.
pub fn load_registry(path: &Path) -> Result<ModelRegistry> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read descriptor {}", path.display()))?;
    let registry = if path.extension().is_some_and(|ext| ext == "json") {
        ModelRegistry::from_json_str(&raw)
    } else {
        ModelRegistry::from_yaml_str(&raw)
    }
    .with_context(|| format!("invalid descriptor {}", path.display()))?;
    Ok(registry)
}
