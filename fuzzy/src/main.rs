//! Fuzzy decision area tool.
//!
//! ```bash
//! fuzzy init climate.json
//! fuzzy evaluate climate.json -i Temperature=30
//! fuzzy headless climate.json
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use fuzzy::commands::{
    parse_assignments, write_area_list, write_crisp, write_curve, write_issues, write_rules,
    DEFAULT_CURVE_STEP,
};
use fuzzy::config::{CliConfig, DEFAULT_LOG_LEVEL};
use fuzzy::headless::run_headless;
use fuzzy::persist::{list_areas, load_area, save_area};
use fuzzy_core::validate::{check_snapshot, has_errors};
use fuzzy_core::InferenceEngine;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fuzzy")]
#[command(about = "Evaluate fuzzy decision areas")]
struct Args {
    /// Log filter (trace, debug, info, warn, error or a directive list)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Refuse to evaluate areas with unusable fuzzy sets
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an area for the given inputs
    Evaluate {
        file: PathBuf,
        /// Input value as NAME=VALUE (repeatable)
        #[arg(short, long = "input", value_name = "NAME=VALUE")]
        inputs: Vec<String>,
        /// Print the full evaluation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Report problems in an area; exits with status 1 on errors
    Check { file: PathBuf },
    /// Print the rules of an area
    Rules { file: PathBuf },
    /// Print the membership curves of one variable
    Curve {
        file: PathBuf,
        variable: String,
        /// Sampling step across the variable's universe
        #[arg(long, default_value_t = DEFAULT_CURVE_STEP)]
        step: f64,
    },
    /// Write the sample fan controller area
    Init { file: PathBuf },
    /// List saved areas in a directory
    List { dir: Option<PathBuf> },
    /// Evaluate interactively from stdin
    Headless { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = CliConfig::from_env();
    if args.strict {
        config = config.with_strict(true);
    }
    if let Some(level) = &args.log_level {
        config = config.with_log_level(level.clone());
    }

    // Logs go to stderr so JSON on stdout stays clean
    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let engine = InferenceEngine::new(config.engine_config());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Evaluate { file, inputs, json } => {
            let snapshot = load(&file).await?;
            let values = parse_assignments(inputs.iter().map(String::as_str))?;
            let report = engine.report(&snapshot, &values)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                write_crisp(&mut out, &report.evaluation)?;
            }
        }
        Command::Check { file } => {
            let snapshot = load(&file).await?;
            let issues = check_snapshot(&snapshot);
            write_issues(&mut out, &issues)?;
            if has_errors(&issues) {
                out.flush()?;
                std::process::exit(1);
            }
        }
        Command::Rules { file } => {
            let snapshot = load(&file).await?;
            write_rules(&mut out, &snapshot)?;
        }
        Command::Curve {
            file,
            variable,
            step,
        } => {
            let snapshot = load(&file).await?;
            let found = snapshot
                .variable_by_name(&variable)
                .ok_or_else(|| anyhow!("No variable named {variable} in {}", file.display()))?;
            write_curve(&mut out, found, step)?;
        }
        Command::Init { file } => {
            save_area(&file, fuzzy_core::testing::fan_controller())
                .await
                .with_context(|| format!("Failed to write {}", file.display()))?;
            info!(path = %file.display(), "Sample area written");
            writeln!(out, "Wrote sample area to {}", file.display())?;
        }
        Command::List { dir } => {
            let dir = dir.unwrap_or_else(|| config.area_dir.clone());
            let areas = list_areas(&dir)
                .await
                .with_context(|| format!("Failed to list {}", dir.display()))?;
            write_area_list(&mut out, &areas)?;
        }
        Command::Headless { file } => {
            let snapshot = load(&file).await?;
            let stdin = io::stdin();
            run_headless(&snapshot, engine, stdin.lock(), &mut out)?;
        }
    }

    Ok(())
}

async fn load(path: &Path) -> anyhow::Result<fuzzy_core::AreaSnapshot> {
    load_area(path)
        .await
        .with_context(|| format!("Failed to load area from {}", path.display()))
}
