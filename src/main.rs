//! formtree - replay form events against a form tree
//!
//! Reads one JSON event per line and prints one JSON outcome per line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formtree::app::{App, Event};
use formtree::presets::Preset;
use formtree::{EngineConfig, FormSchema};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "formtree")]
#[command(version)]
#[command(about = "Dynamic validated form trees", long_about = None)]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay JSON-lines events and print one outcome per event
    Run {
        /// Shipped form to drive
        #[arg(long, value_enum, default_value = "student")]
        form: Preset,
        /// Load the form from a JSON schema file instead of a preset
        #[arg(long, value_name = "FILE")]
        schema: Option<PathBuf>,
        /// Read events from a file instead of stdin
        #[arg(long, value_name = "FILE")]
        events: Option<PathBuf>,
    },
    /// Print a shipped form's schema as JSON
    Schema {
        #[arg(long, value_enum)]
        form: Preset,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formtree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            form,
            schema,
            events,
        } => {
            let schema = match schema {
                Some(path) => read_schema(&path)?,
                None => form.schema(&config)?,
            };
            let mut app = App::from_schema(schema)?;
            match events {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("opening events file {}", path.display()))?;
                    run_events(&mut app, BufReader::new(file), io::stdout().lock())
                }
                None => run_events(&mut app, io::stdin().lock(), io::stdout().lock()),
            }
        }
        Commands::Schema { form } => {
            let json = form.schema(&config)?.to_json()?;
            println!("{json}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    }
}

fn read_schema(path: &Path) -> Result<FormSchema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading schema {}", path.display()))?;
    let schema = FormSchema::from_json(&content)
        .with_context(|| format!("parsing schema {}", path.display()))?;
    Ok(schema)
}

/// Blank lines are skipped; a malformed line aborts the run
fn run_events(app: &mut App, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("malformed event on line {}", number + 1))?;
        tracing::debug!(?event, "handling event");
        let outcome = app.handle_event(event);
        serde_json::to_writer(&mut output, &outcome)?;
        writeln!(output)?;
    }
    output.flush()?;
    Ok(())
}
