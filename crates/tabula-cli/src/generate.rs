//! # Generate Subcommand
//!
//! Loads a model descriptor and generates one JSON Schema draft-04
//! document per selected model, printed to stdout or written as one file
//! per model table.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tabula_schema::{
    ChildFactory, GenerateOptions, ReferenceMode, RelationDecision, SchemaDocument, SchemaFactory,
    WalkerVariant,
};

use crate::load_registry;

/// Property selection strategy.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkerChoice {
    /// Columns and relationships, recursing into related models.
    Structural,
    /// Columns only, keeping foreign keys.
    SingleModel,
    /// Columns only, skipping foreign keys.
    NoForeignKey,
}

impl WalkerChoice {
    fn variant(self) -> WalkerVariant {
        match self {
            Self::Structural => WalkerVariant::Structural,
            Self::SingleModel => WalkerVariant::SingleModel,
            Self::NoForeignKey => WalkerVariant::NoForeignKey,
        }
    }
}

/// Relationship handling policy.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionChoice {
    /// Keep every relationship as a nested schema or reference.
    Strict,
    /// Flatten many-to-one links into their foreign-key columns.
    Comfortable,
}

impl DecisionChoice {
    fn policy(self) -> RelationDecision {
        match self {
            Self::Strict => RelationDecision::Strict,
            Self::Comfortable => RelationDecision::Comfortable,
        }
    }
}

/// Serialization format for generated documents.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Arguments for the `tabula generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Model descriptor file (YAML or JSON).
    #[arg(value_name = "DESCRIPTOR")]
    pub descriptor: PathBuf,

    /// Model to generate a schema for. Repeatable.
    #[arg(short, long = "model", value_name = "NAME")]
    pub models: Vec<String>,

    /// Generate a schema for every model in the descriptor.
    #[arg(long, conflicts_with = "models")]
    pub all: bool,

    /// Property selection strategy.
    #[arg(long, value_enum, default_value_t = WalkerChoice::Structural)]
    pub walker: WalkerChoice,

    /// Relationship handling policy.
    #[arg(long, value_enum, default_value_t = DecisionChoice::Strict)]
    pub decision: DecisionChoice,

    /// Maximum relationship nesting depth.
    #[arg(long, value_name = "N")]
    pub depth: Option<u32>,

    /// Property key to include; dotted keys reach nested levels. Repeatable.
    #[arg(long = "include", value_name = "KEY")]
    pub includes: Vec<String>,

    /// Property key to exclude; dotted keys reach nested levels. Repeatable.
    #[arg(long = "exclude", value_name = "KEY")]
    pub excludes: Vec<String>,

    /// Reference related models as external `<table>.json` files instead of
    /// inline definitions.
    #[arg(long)]
    pub ref_files: bool,

    /// Keep back-references walkable instead of pruning them.
    #[arg(long)]
    pub bidirectional: bool,

    /// Write one file per schema into this directory instead of printing
    /// to stdout.
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Serialization format for the generated documents.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

/// Execute the generate subcommand.
///
/// Returns exit code 0 on success and 1 when any selected model fails to
/// generate. Operational errors, such as an unreadable descriptor or an
/// unwritable output directory, surface as `Err`.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let registry = load_registry(&args.descriptor)?;

    let selected: Vec<String> = if args.all {
        registry.names().map(str::to_string).collect()
    } else if !args.models.is_empty() {
        args.models.clone()
    } else {
        println!("Usage: tabula generate DESCRIPTOR --model NAME [--model NAME ...] | --all");
        return Ok(1);
    };

    let mut factory =
        SchemaFactory::new(args.walker.variant()).with_decision(args.decision.policy());
    if args.ref_files {
        factory = factory.with_reference_mode(ReferenceMode::Files);
    }
    if args.bidirectional {
        factory = factory.with_child_factory(ChildFactory::default().bidirectional());
    }

    let mut opts = GenerateOptions::new();
    if !args.includes.is_empty() {
        opts = opts.include(args.includes.iter().cloned());
    }
    if !args.excludes.is_empty() {
        opts = opts.exclude(args.excludes.iter().cloned());
    }
    if let Some(depth) = args.depth {
        opts = opts.with_depth(depth);
    }

    if let Some(out) = &args.out {
        fs::create_dir_all(out)
            .with_context(|| format!("failed to create output directory {}", out.display()))?;
    }

    let mut failures = 0usize;
    for name in &selected {
        match factory.generate(&registry, name, &opts) {
            Ok(doc) => emit(args, &doc)?,
            Err(e) => {
                eprintln!("FAIL: {name}: {e}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        eprintln!(
            "{failures} of {} schema(s) failed to generate.",
            selected.len()
        );
        Ok(1)
    } else {
        Ok(0)
    }
}

fn emit(args: &GenerateArgs, doc: &SchemaDocument) -> Result<()> {
    let rendered = render(doc, args.format)?;
    match &args.out {
        Some(dir) => {
            let path = dir.join(format!("{}.{}", doc.name, args.format.extension()));
            fs::write(&path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "schema written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render(doc: &SchemaDocument, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&doc.schema).context("failed to serialize schema")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(&doc.schema).context("failed to serialize schema")
        }
    }
}
