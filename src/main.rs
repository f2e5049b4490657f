//! Growth Allocator CLI
//!
//! Runs the baseline and optimal budget allocators over a channel table and
//! prints the comparison as JSON.
//!
//! # Usage
//!
//! ```bash
//! growth-allocator --config allocator.toml allocate --budget 750000
//! growth-allocator sweep --min 100000 --max 2000000 --step 50000 -o sweep.json
//! growth-allocator validate
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 2: Input or validation error (invalid bounds, infeasible budget)
//! - 3: Runtime error (config I/O, output I/O)

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use growth_allocator::allocation::{
    resolve_channels, sweep_budgets, validate, AllocationError, AllocationReport, AllocationRun,
    BudgetSweep, SweepPoint, MAX_SWEEP_POINTS,
};
use growth_allocator::config::AllocatorConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_INPUT_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

/// Marketing budget allocator
#[derive(Parser, Debug)]
#[command(name = "growth-allocator")]
#[command(about = "Allocate an acquisition budget across channels by incremental value")]
struct Cli {
    /// Path to the TOML config (falls back to ALLOCATOR_CONFIG_PATH, then defaults)
    #[arg(short, long, env = "ALLOCATOR_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run baseline and optimal allocation and compare them
    Allocate {
        /// Override the configured total budget
        #[arg(short, long)]
        budget: Option<f64>,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate a range of budgets
    Sweep {
        #[arg(long)]
        min: Option<f64>,

        #[arg(long)]
        max: Option<f64>,

        #[arg(long)]
        step: Option<f64>,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check the channel table without allocating
    Validate {
        /// Override the configured total budget
        #[arg(short, long)]
        budget: Option<f64>,
    },
}

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    generated_at: DateTime<Utc>,
    version: &'static str,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Serialize)]
struct SweepOutput {
    sweep: BudgetSweep,
    points: Vec<SweepPoint>,
}

#[derive(Debug, Serialize)]
struct AllocateOutput {
    report: AllocationReport,
}

fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            match e.downcast_ref::<AllocationError>() {
                Some(alloc_err) if alloc_err.is_input_error() => ExitCode::from(EXIT_INPUT_ERROR),
                _ => ExitCode::from(EXIT_RUNTIME_ERROR),
            }
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "growth_allocator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<AllocatorConfig> {
    match path {
        Some(p) => AllocatorConfig::load(p),
        None => AllocatorConfig::from_env(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;
    info!(channels = config.channels.len(), "Loaded allocator config");

    match cli.command {
        Commands::Allocate { budget, output } => {
            let total_budget = budget.unwrap_or(config.total_budget);
            let report = AllocationRun::new().execute(&config.channels, total_budget)?;
            write_output(&envelope(AllocateOutput { report }), output.as_ref())
        }
        Commands::Sweep {
            min,
            max,
            step,
            output,
        } => {
            let sweep = BudgetSweep {
                min_budget: min.unwrap_or(config.sweep.min_budget),
                max_budget: max.unwrap_or(config.sweep.max_budget),
                step: step.unwrap_or(config.sweep.step),
            };
            if sweep.point_count().is_none() {
                bail!(
                    "Unusable sweep {:?}: needs a positive step, min <= max, and at most {} points",
                    sweep,
                    MAX_SWEEP_POINTS
                );
            }
            let points = sweep_budgets(&config.channels, &sweep);
            write_output(&envelope(SweepOutput { sweep, points }), output.as_ref())
        }
        Commands::Validate { budget } => {
            let total_budget = budget.unwrap_or(config.total_budget);
            let (economics, bounds) = resolve_channels(&config.channels, total_budget);
            let problem = validate(&economics, &bounds, total_budget)?;
            problem.ensure_feasible()?;
            println!(
                "OK: {} channels, min spend {:.2}, max spend {:.2}, budget {:.2}",
                problem.len(),
                problem.min_spend_total(),
                problem.max_spend_total(),
                total_budget
            );
            Ok(())
        }
    }
}

fn envelope<T: Serialize>(body: T) -> Envelope<T> {
    Envelope {
        generated_at: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
        body,
    }
}

fn write_output<T: Serialize>(value: &T, output: Option<&PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
