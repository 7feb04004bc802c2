// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Command line entry point for the trace generator.
//!
//! Selects a built-in model, harvests every composite in dependency
//! order, and prints the chosen rendering of the top-level composite to
//! stdout. Progress and statistics go to the log; `-v` raises the level
//! to debug and `-q` restricts it to warnings.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, Level};

use trace_gen::harvest::Generator;
use trace_gen::models;
use trace_gen::output::{json, render};
use trace_gen::stats::Counters;

#[derive(Parser)]
#[command(
    name = "tracegen",
    version,
    about = "Exhaustive generator of causally-ordered event traces"
)]
struct Cli {
    /// Built-in model to generate traces for.
    #[arg(long, default_value = "handshake")]
    model: String,

    /// Branch count for models that repeat a structure.
    #[arg(long, default_value_t = 2)]
    scope: usize,

    /// Output format for the top-level composite's traces.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Increase log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.quiet {
        Level::WARN
    } else {
        match cli.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let Some((grammar, top)) = models::build(&cli.model, cli.scope) else {
        bail!(
            "unknown model {:?}; available models: {}",
            cli.model,
            models::available().join(", ")
        );
    };

    let mut generator = Generator::new(grammar);
    let report = generator.harvest_all();
    let stats = generator.statistics();
    info!(
        traces = stats.get(Counters::TracesStored),
        events = stats.get(Counters::EventsEmitted),
        attempts = stats.get(Counters::Attempts),
        failed = stats.get(Counters::FailedAttempts),
        spliced = stats.get(Counters::SegmentsSpliced),
        violations = stats.violations(),
        storage_bytes = stats.get(Counters::StorageBytes),
        events_per_second = report.events_per_second as u64,
        "run statistics"
    );

    let grammar = generator.grammar();
    let id = grammar
        .lookup_name(&top)
        .and_then(|symbol| grammar.composite(symbol))
        .context("model did not define its top composite")?;
    match cli.format {
        Format::Text => print!("{}", render::show_traces(grammar, generator.library(), id)),
        Format::Json => {
            let value = json::traces_value(grammar, generator.library(), id);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
