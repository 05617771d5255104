//! Headless CSAI runner.
//!
//! Replays a RON scenario against the AI and prints a JSON report of what
//! it did. Designed for CI and for tuning configuration offline.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario with default configuration
//! cargo run -p csai_headless -- run --scenario scenarios/reclaim_field.ron
//!
//! # Run with a configuration file and save the report
//! cargo run -p csai_headless -- run --scenario s.ron --config csai.ron --output report.json
//!
//! # Validate a configuration file
//! cargo run -p csai_headless -- check-config csai.ron
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use csai_core::config::AiConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use csai_headless::{Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "csai_headless")]
#[command(about = "Headless CSAI scenario runner for testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and report the AI's orders
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// AI configuration file (RON); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the JSON report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a configuration file and print the effective values
    CheckConfig {
        /// Configuration file (RON)
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs to stderr (stdout is for the report)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            output,
        } => cmd_run(scenario, config, output),
        Commands::CheckConfig { path } => cmd_check_config(path),
    }
}

fn load_config(path: Option<PathBuf>) -> AiConfig {
    let Some(path) = path else {
        return AiConfig::default();
    };
    match AiConfig::load(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to load config");
            std::process::exit(1);
        }
    }
}

/// Run a scenario
fn cmd_run(scenario_path: PathBuf, config: Option<PathBuf>, output: Option<PathBuf>) {
    let config = load_config(config);
    let scenario = match Scenario::load(&scenario_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, path = %scenario_path.display(), "Failed to load scenario");
            std::process::exit(1);
        }
    };

    let report = match ScenarioRunner::new(scenario, config).run() {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Scenario run failed");
            std::process::exit(1);
        }
    };
    let json = match report.to_json() {
        Ok(j) => j,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            std::process::exit(1);
        }
    };

    if let Some(out_path) = output {
        if let Err(e) = std::fs::write(&out_path, &json) {
            tracing::error!(error = %e, path = %out_path.display(), "Failed to write report");
            std::process::exit(1);
        }
        eprintln!("Report saved to: {}", out_path.display());
    } else {
        println!("{json}");
    }

    eprintln!(
        "{}: {} orders, {} failed callbacks",
        report.scenario,
        report.orders.len(),
        report.failures.len()
    );
    for (kind, count) in &report.order_counts {
        eprintln!("  {kind}: {count}");
    }
}

/// Validate a configuration file
fn cmd_check_config(path: PathBuf) {
    let config = load_config(Some(path));
    match ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to print config");
            std::process::exit(1);
        }
    }
}
