//! verigym: drive verifiable-reward episodes from the command line.
//!
//! Provides subcommands:
//!
//! - `run`      -- Run episodes over a task file with a scripted responder
//! - `inspect`  -- Check a task file for unusable items

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use verigym::agent::{EchoResponder, OracleResponder};
use verigym::config::EnvironmentConfig;
use verigym::env::EpisodeController;
use verigym::extract::{DelimitedExtractor, Extractor, PassthroughExtractor};
use verigym::task::{InMemoryTaskSource, TaskSource};
use verigym::trajectory::{EpisodeRecord, EpisodeRunner, RunSummary};
use verigym::verify::ExactMatchVerifier;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// verigym: episode controller for verifiable-reward training loops
#[derive(Parser)]
#[command(name = "verigym", version, about)]
struct Cli {
    /// Path to a JSON configuration file (uses defaults if not provided).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the per-episode step budget.
    #[arg(long, global = true)]
    max_steps: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum Responder {
    /// Answer with the reference answer.
    Oracle,
    /// Repeat the question.
    Echo,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum ExtractorChoice {
    /// Use the whole (trimmed) response.
    Plain,
    /// Use the last `\boxed{...}` span.
    Boxed,
}

#[derive(Subcommand)]
enum Commands {
    /// Run episodes over a task file.
    Run {
        /// JSON array of task items.
        #[arg(long)]
        tasks: PathBuf,

        /// Number of episodes to run.
        #[arg(long, default_value_t = 1)]
        episodes: usize,

        /// Scripted responder standing in for the model.
        #[arg(long, default_value = "oracle")]
        responder: Responder,

        /// How to extract the answer from a response.
        #[arg(long, default_value = "plain")]
        extractor: ExtractorChoice,

        /// Compare answers case-insensitively.
        #[arg(long)]
        ignore_case: bool,

        /// Where to write the episode records (JSON).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Check a task file for unusable items.
    Inspect {
        /// JSON array of task items.
        path: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Entrypoint
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (reads RUST_LOG env var, defaults to info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EnvironmentConfig::from_json_file(path)?,
        None => EnvironmentConfig::default(),
    };
    if cli.max_steps.is_some() {
        config.max_steps = cli.max_steps;
    }

    match cli.command {
        Commands::Run {
            tasks,
            episodes,
            responder,
            extractor,
            ignore_case,
            output,
        } => {
            let verifier = if ignore_case {
                ExactMatchVerifier::case_insensitive()
            } else {
                ExactMatchVerifier::new()
            };
            let run = RunArgs {
                config,
                tasks: &tasks,
                episodes,
                responder,
                verifier,
                output: output.as_deref(),
            };
            match extractor {
                ExtractorChoice::Plain => cmd_run(run, PassthroughExtractor).await,
                ExtractorChoice::Boxed => cmd_run(run, DelimitedExtractor::boxed()).await,
            }
        }
        Commands::Inspect { path } => cmd_inspect(&path),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

struct RunArgs<'a> {
    config: EnvironmentConfig,
    tasks: &'a Path,
    episodes: usize,
    responder: Responder,
    verifier: ExactMatchVerifier,
    output: Option<&'a Path>,
}

async fn cmd_run<X: Extractor>(args: RunArgs<'_>, extractor: X) -> Result<()> {
    let source = InMemoryTaskSource::from_json_file(args.tasks)?;
    let label = args
        .tasks
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks".into());

    tracing::info!(
        tasks = source.len(),
        episodes = args.episodes,
        max_steps = ?args.config.step_budget(),
        "Running episodes"
    );

    let mut env = EpisodeController::new(args.config, source, args.verifier, extractor);
    let runner = EpisodeRunner::new(&label);

    let records = match args.responder {
        Responder::Oracle => {
            runner
                .collect_episodes(&mut env, &OracleResponder, args.episodes)
                .await
        }
        Responder::Echo => {
            runner
                .collect_episodes(&mut env, &EchoResponder, args.episodes)
                .await
        }
    };
    env.teardown().await.context("Failed to tear down environment")?;
    let records = records?;

    let summary = RunSummary::from_records(&records);
    tracing::info!(
        episodes = summary.episodes,
        steps = summary.steps,
        mean_reward = summary.mean_reward,
        accuracy = format!("{:.2}%", summary.accuracy * 100.0),
        "Run complete"
    );

    if let Some(path) = args.output {
        save_records(path, &records)?;
    }
    Ok(())
}

fn save_records(path: &Path, records: &[EpisodeRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), count = records.len(), "Saved episode records");
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let source = InMemoryTaskSource::from_json_file(path)?;
    let items = source.items();

    println!("Task file: {}", path.display());
    println!("  Items: {}", items.len());

    let unusable: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_complete())
        .map(|(i, _)| i)
        .collect();
    println!("  Usable: {}", items.len() - unusable.len());

    if !unusable.is_empty() {
        println!();
        println!("Items missing a question or final answer:");
        for i in &unusable {
            println!("  [{i}] {:?}", items[*i].question);
        }
    }

    let with_difficulty = items.iter().filter(|i| i.difficulty.is_some()).count();
    let with_rationale = items.iter().filter(|i| i.rationale.is_some()).count();
    println!();
    println!("  With difficulty: {with_difficulty}");
    println!("  With rationale: {with_rationale}");

    Ok(())
}
