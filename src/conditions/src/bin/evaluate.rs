//! # Condition Evaluation CLI
//!
//! Loads an engine configuration and a policy file, then decides access
//! requests read from JSON documents.
//!
//! ## Usage
//!
//! ```text
//! conditions-eval --config engine.toml check --policies policies.json --request request.json
//! conditions-eval kinds
//! ```
//!
//! Logs go to stderr; decisions are printed to stdout as JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cretoai_conditions::{AccessRequest, EngineConfig, Policy, PolicyEngine};
use std::path::{Path, PathBuf};
use tracing::info;

/// Tag-based policy condition evaluator
#[derive(Parser)]
#[command(name = "conditions-eval")]
#[command(about = "Evaluate access requests against tag-based policy conditions")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, env = "CONDITIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decide one access request
    Check {
        /// JSON file with an array of policies
        #[arg(short, long)]
        policies: PathBuf,

        /// JSON file with the access request
        #[arg(short, long)]
        request: PathBuf,
    },

    /// List registered condition kinds
    Kinds,
}

fn init_tracing(config: &EngineConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.logging.level.as_str() };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},cretoai_conditions={}", level, level).into()),
        )
        .with_target(config.logging.with_target)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    init_tracing(&config, cli.verbose);

    match cli.command {
        Command::Kinds => {
            let registry = config.build_registry()?;
            for kind in registry.kinds() {
                println!("{}", kind);
            }
        }
        Command::Check { policies, request } => {
            let engine = PolicyEngine::new(&config)?;

            let policy_list: Vec<Policy> = read_json(&policies)?;
            engine
                .load_policies(policy_list)
                .context("Failed to load policies")?;
            info!("Loaded {} policies from {:?}", engine.policy_count(), policies);

            let access_request: AccessRequest = read_json(&request)?;
            let decision = engine.evaluate(&access_request);

            println!("{}", serde_json::to_string_pretty(&decision)?);
        }
    }

    Ok(())
}
