// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! hdds-typeconv - inspect type names and convert JSON documents through the
//! serialization engine.
//!
//! ```text
//! hdds-typeconv name 'Float[3].required'
//! hdds-typeconv --schema types.json deserialize -t geo/Point -i point.json
//! hdds-typeconv serialize -t 'Blob[...]' --format base64 < blobs.json
//! ```

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use hdds_serializer::{
    config, EngineConfig, RecordField, TypeDescriptor, TypeKind, TypeRegistry, Value, WireFormat,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hdds-typeconv")]
#[command(about = "Resolve type names and convert JSON data between wire and internal formats")]
#[command(version)]
struct Cli {
    /// Engine configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Record definitions: a JSON object of `name -> {field: type}`
    #[arg(long, global = true, value_name = "FILE")]
    schema: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a type name and describe it
    Name {
        /// Type reference, e.g. `Int.hex[2,...]` or `Dict(String,Float)`
        type_name: String,
    },

    /// Convert wire data to the internal representation
    Deserialize {
        /// Type reference
        #[arg(short, long = "type", value_name = "TYPE")]
        type_name: String,

        /// Wire format name, or a JSON list/object for per-part formats
        #[arg(short, long)]
        format: Option<String>,

        /// Input JSON file (stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Convert internal data to a wire representation
    Serialize {
        /// Type reference
        #[arg(short, long = "type", value_name = "TYPE")]
        type_name: String,

        /// Wire format name, or a JSON list/object for per-part formats
        #[arg(short, long)]
        format: Option<String>,

        /// Input JSON file (stdin when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// List builtin and registered type names
    Builtins,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let engine = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(engine.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    config::install(engine);

    let registry = TypeRegistry::global();
    if let Some(path) = &cli.schema {
        load_schema(registry, path)?;
    }

    match cli.command {
        Commands::Name { type_name } => cmd_name(registry, &type_name),
        Commands::Deserialize {
            type_name,
            format,
            input,
        } => cmd_convert(registry, &type_name, format.as_deref(), input.as_deref(), true),
        Commands::Serialize {
            type_name,
            format,
            input,
        } => cmd_convert(registry, &type_name, format.as_deref(), input.as_deref(), false),
        Commands::Builtins => cmd_builtins(registry),
    }
}

fn load_schema(registry: &TypeRegistry, path: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing schema {}", path.display()))?;
    let serde_json::Value::Object(records) = json else {
        bail!("schema must be a JSON object of record definitions");
    };

    for (name, body) in records {
        let serde_json::Value::Object(body) = body else {
            bail!("record {} must map field names to type names", name);
        };
        let mut fields = Vec::with_capacity(body.len());
        for (field, ty) in body {
            let ty = ty
                .as_str()
                .ok_or_else(|| anyhow!("{}.{}: type must be a string", name, field))?;
            fields.push(RecordField::new(field, registry.get(ty)?));
        }
        let record = registry.create_record(&name, fields, None)?;
        info!("registered record {}", record.name());
    }
    Ok(())
}

fn parse_format(format: Option<&str>) -> anyhow::Result<Option<WireFormat>> {
    let Some(format) = format else {
        return Ok(None);
    };
    let trimmed = format.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let json: serde_json::Value =
            serde_json::from_str(format).context("parsing structured wire format")?;
        return Ok(WireFormat::from_value(&Value::from_json(json)));
    }
    Ok(Some(WireFormat::name(format)))
}

fn read_input(input: Option<&Path>) -> anyhow::Result<Value> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    let json: serde_json::Value = serde_json::from_str(&text).context("parsing input JSON")?;
    Ok(Value::from_json(json))
}

fn cmd_convert(
    registry: &TypeRegistry,
    type_name: &str,
    format: Option<&str>,
    input: Option<&Path>,
    deserialize: bool,
) -> anyhow::Result<()> {
    let ty = registry.get(type_name)?;
    let wire = parse_format(format)?;
    let data = read_input(input)?;
    debug!("converting {} with wire format {:?}", ty.name(), wire);

    let out = if deserialize {
        hdds_serializer::deserialize(&ty, data, wire.as_ref())?
    } else {
        hdds_serializer::serialize(&ty, data, wire.as_ref())?
    };
    let out = hdds_serializer::binary_to_text(out)?;
    println!("{}", serde_json::to_string_pretty(&out.to_json()?)?);
    Ok(())
}

fn cmd_name(registry: &TypeRegistry, type_name: &str) -> anyhow::Result<()> {
    let ty = registry.get(type_name)?;
    println!("name:      {}", ty.name());
    println!("kind:      {}", kind_label(&ty));
    println!("base:      {}", ty.base_type().name());
    println!("required:  {}", ty.is_required());
    if let Some(internal) = ty.internal_format() {
        println!("internal:  {}", internal);
    }
    if let Some(known) = ty.known_wire_formats() {
        let names: Vec<String> = known.iter().map(ToString::to_string).collect();
        println!("wire:      [{}]", names.join(", "));
    }
    println!("binary:    {}", ty.is_binary(None));
    if let TypeKind::Record(record) = ty.kind() {
        for field in record.fields() {
            println!("  {}: {}", field.name, field.ty.name());
        }
    }
    Ok(())
}

fn kind_label(ty: &TypeDescriptor) -> &'static str {
    match ty.kind() {
        TypeKind::Scalar(_) => "scalar",
        TypeKind::Record(_) => "record",
        TypeKind::List(_) => "list",
        TypeKind::Dict(_) => "dict",
    }
}

fn cmd_builtins(registry: &TypeRegistry) -> anyhow::Result<()> {
    println!("builtin:");
    for name in registry.builtin_names() {
        println!("  {}", name);
    }
    let names = registry.type_names();
    if !names.is_empty() {
        println!("registered:");
        for name in names {
            println!("  {}", name);
        }
    }
    Ok(())
}
