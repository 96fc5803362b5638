//! # List Subcommand
//!
//! Prints the models a descriptor declares, one per line.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::load_registry;

/// Arguments for the `tabula list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Model descriptor file (YAML or JSON).
    #[arg(value_name = "DESCRIPTOR")]
    pub descriptor: PathBuf,
}

/// Execute the list subcommand: one `<model> <table>` line per model.
pub fn run_list(args: &ListArgs) -> Result<u8> {
    let registry = load_registry(&args.descriptor)?;
    for model in registry.iter() {
        println!("{} ({})", model.name, model.table);
    }
    Ok(0)
}
