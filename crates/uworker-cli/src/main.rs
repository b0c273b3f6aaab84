//! uworker - offline tooling for uworker I/O envelopes
//!
//! ## Commands
//!
//! - `inspect`: decode an input or output envelope and print it
//! - `validate`: check an output envelope against its error type
//! - `diff`: compute the change between two snapshots of an entity
//! - `apply`: merge a change into the current copy of an entity
//! - `task-kind`: show how a command is split between trusted and untrusted machines

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn, Level};
use uworker_protocol::{
    apply_change, decode_input, decode_output, diff_entity, digest, execution_mode,
    is_trusted_portion_of_utask, stale_fields, validate_output, Entity, EntityChange, IoConfig,
    LogFormat,
};

#[derive(Parser)]
#[command(name = "uworker")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and merge uworker task envelopes", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines (overrides UWORKER_LOG_FORMAT)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an envelope file and pretty-print it
    Inspect {
        /// Encoded envelope
        file: PathBuf,

        /// Treat the file as an output envelope (default: input)
        #[arg(long)]
        output: bool,
    },

    /// Check that an output envelope is consistent with its error type
    Validate {
        /// Encoded output envelope
        file: PathBuf,
    },

    /// Diff two snapshots of the same entity into a change
    Diff {
        /// Entity as the worker received it (JSON)
        #[arg(long)]
        base: PathBuf,

        /// Entity after the worker's mutations (JSON)
        #[arg(long)]
        mutated: PathBuf,
    },

    /// Apply a change to the current copy of its entity
    Apply {
        /// Orchestrator's current entity (JSON)
        #[arg(long)]
        current: PathBuf,

        /// Change produced by `diff` or carried in an output envelope (JSON)
        #[arg(long)]
        change: PathBuf,
    },

    /// Show the execution mode for a command
    TaskKind {
        /// Command name, e.g. `analyze` or `uworker_postprocess`
        command: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = IoConfig::from_env().context("Invalid uworker environment")?;
    let format = if cli.json {
        LogFormat::Json
    } else {
        config.log_format
    };
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    uworker_protocol::init_tracing(format, level);

    let rendered = match cli.command {
        Commands::Inspect { file, output } => cmd_inspect(&file, output)?,
        Commands::Validate { file } => cmd_validate(&file)?,
        Commands::Diff { base, mutated } => cmd_diff(&base, &mutated)?,
        Commands::Apply { current, change } => cmd_apply(&current, &change)?,
        Commands::TaskKind { command } => cmd_task_kind(&command)?,
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_inspect(path: &Path, as_output: bool) -> Result<String> {
    let bytes = read_bytes(path)?;
    let body = if as_output {
        let output = decode_output(&bytes)
            .with_context(|| format!("Not an output envelope: {:?}", path))?;
        pretty(&output)?
    } else {
        let input = decode_input(&bytes)
            .with_context(|| format!("Not an input envelope: {:?}", path))?;
        pretty(&input)?
    };

    let kind = if as_output { "output" } else { "input" };
    Ok(format!(
        "kind:   {kind}\nsize:   {} bytes\nsha256: {}\n{body}",
        bytes.len(),
        digest(&bytes)
    ))
}

fn cmd_validate(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    let output =
        decode_output(&bytes).with_context(|| format!("Not an output envelope: {:?}", path))?;
    validate_output(&output).with_context(|| format!("Rejected output: {:?}", path))?;

    info!(path = ?path, error = %output.error, "output is valid");
    Ok(format!("ok ({})", output.error))
}

fn cmd_diff(base: &Path, mutated: &Path) -> Result<String> {
    let base: Entity = read_json_file(base)?;
    let mutated: Entity = read_json_file(mutated)?;
    if base.key != mutated.key {
        bail!("Snapshots are of different entities: {} vs {}", base.key, mutated.key);
    }
    pretty(&diff_entity(&base, &mutated))
}

fn cmd_apply(current: &Path, change: &Path) -> Result<String> {
    let current: Entity = read_json_file(current)?;
    let change: EntityChange = read_json_file(change)?;
    if current.key != *change.key() {
        bail!("Change targets {}, but current entity is {}", change.key(), current.key);
    }

    for conflict in stale_fields(&current, &change) {
        warn!(
            entity = %current.key,
            property = %conflict.property,
            "field changed since the worker's snapshot; overwriting"
        );
    }
    let merged = apply_change(&current, &change)?;
    pretty(&merged)
}

fn cmd_task_kind(command: &str) -> Result<String> {
    let Some(mode) = execution_mode(command) else {
        bail!("Unknown command: {command}");
    };
    let mut out = format!("{command}: {mode}");
    if is_trusted_portion_of_utask(command) {
        out.push_str(" (trusted portion of a utask)");
    }
    Ok(out)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
