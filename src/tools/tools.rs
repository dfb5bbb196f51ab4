use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use barewire::schema::validator;
use barewire::{HostPlatform, Schema, SchemaType};

/// Inspect, validate, and compare BAREWire schemas.
#[derive(Clone, Debug, Parser)]
struct Args {
    /// platform word size in bytes, used to resolve natural sizes/alignment
    #[arg(long, default_value_t = HostPlatform::default().word_size)]
    word_size: u32,
    /// platform pointer size in bytes
    #[arg(long, default_value_t = HostPlatform::default().pointer_size)]
    pointer_size: u32,
    /// platform pointer alignment in bytes
    #[arg(long, default_value_t = HostPlatform::default().pointer_align)]
    pointer_align: u32,
    #[command(subcommand)]
    operation: Operation,
}

#[derive(Clone, Debug, Subcommand)]
enum Operation {
    /// Validate a schema file and report every violation found.
    Validate(SchemaArgs),
    /// Print the root type's size, alignment, and top-level field layout.
    Inspect(SchemaArgs),
    /// Compare two schema versions and report their compatibility.
    Compat(CompatArgs),
}

/// A schema stored as JSON, matching `Schema`'s `serde::Serialize` /
/// `serde::Deserialize` derive.
#[derive(Clone, Debug, Parser)]
struct SchemaArgs {
    /// path to a JSON-encoded schema
    schema: PathBuf,
}

#[derive(Clone, Debug, Parser)]
struct CompatArgs {
    /// path to the older JSON-encoded schema
    old: PathBuf,
    /// path to the newer JSON-encoded schema
    new: PathBuf,
}

impl Args {
    fn platform(&self) -> HostPlatform {
        HostPlatform {
            word_size: self.word_size,
            pointer_size: self.pointer_size,
            pointer_align: self.pointer_align,
        }
    }
}

/// Loads a schema from disk. Deserializing goes around `SchemaBuilder`'s
/// validation, by design: `validate` exists precisely to check a schema
/// that might not be valid yet.
fn load_schema(path: &PathBuf) -> Result<Schema> {
    let file = File::open(path)
        .with_context(|| format!("opening schema file {}", path.display()))?;
    let schema: Schema = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema file {}", path.display()))?;
    Ok(schema)
}

fn run_validate(args: &SchemaArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    info!(root = schema.root_name(), "validating schema");
    match validator::validate(&schema) {
        Ok(()) => {
            println!("schema is valid (root: {})", schema.root_name());
            Ok(())
        }
        Err(violations) => {
            println!("schema is invalid ({} violation(s)):", violations.len());
            for violation in &violations {
                println!("  - {violation}");
            }
            std::process::exit(1);
        }
    }
}

fn run_inspect(top: &Args, args: &SchemaArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    validator::validate(&schema)
        .map_err(|violations| anyhow::anyhow!("schema is invalid: {violations:?}"))?;
    let platform = top.platform();
    debug!(?platform, "resolved platform context");

    let root = schema.root_type();
    let size = barewire::schema::analyzer::size_of(&schema, &platform, root);
    let align = barewire::schema::analyzer::align_of(&schema, &platform, root);
    println!("root: {} ({})", schema.root_name(), root.kind_name());
    println!(
        "  size: {}..{} ({})",
        size.min,
        size.max.map(|m| m.to_string()).unwrap_or_else(|| "unbounded".to_string()),
        if size.is_fixed { "fixed" } else { "variable" }
    );
    println!("  alignment: {align}");

    if let SchemaType::Struct(fields) = root {
        println!("  fields:");
        for field in fields {
            let field_size = barewire::schema::analyzer::size_of(&schema, &platform, &field.field_type);
            let field_align = barewire::schema::analyzer::align_of(&schema, &platform, &field.field_type);
            println!(
                "    {}: {} (size {}..{}, align {})",
                field.name,
                field.field_type.kind_name(),
                field_size.min,
                field_size.max.map(|m| m.to_string()).unwrap_or_else(|| "unbounded".to_string()),
                field_align
            );
        }
    }
    Ok(())
}

fn run_compat(args: &CompatArgs) -> Result<()> {
    let old = load_schema(&args.old)?;
    let new = load_schema(&args.new)?;
    validator::validate(&old).map_err(|v| anyhow::anyhow!("old schema is invalid: {v:?}"))?;
    validator::validate(&new).map_err(|v| anyhow::anyhow!("new schema is invalid: {v:?}"))?;
    info!("comparing schema roots {} -> {}", old.root_name(), new.root_name());

    let result = barewire::schema::analyzer::check_compatibility(&old, &new);
    println!("{result:?}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match &args.operation {
        Operation::Validate(schema_args) => run_validate(schema_args),
        Operation::Inspect(schema_args) => run_inspect(&args, schema_args),
        Operation::Compat(compat_args) => run_compat(compat_args),
    }
}
