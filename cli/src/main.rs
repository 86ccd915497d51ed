//! # Vigil CLI
//!
//! Vigil scans CI/CD workflow definitions against a declarative check set
//! and reports misconfigurations before they reach a runner.
//!
//! ## Usage
//!
//! ```bash
//! # Scan the current repository
//! vigil scan --directory .
//!
//! # Scan specific files, machine-readably
//! vigil scan --file ci.yml --output json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use vigil::commands;

/// Initialize the tracing subscriber based on the verbose flag.
///
/// `RUST_LOG` still takes precedence when set, so `RUST_LOG=debug vigil ...`
/// works regardless of `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Output format options for the scan command
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output (default)
    Console,
    /// JSON output format
    Json,
}

/// Main CLI structure
#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Vigil — declarative security scanning for CI/CD workflows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Scan workflow definitions against the declarative check set
    Scan {
        /// Root directory to walk for workflow files
        #[arg(long, short = 'd', value_name = "PATH")]
        directory: Option<PathBuf>,
        /// Explicit file to scan (can be specified multiple times)
        #[arg(long, short = 'f', value_name = "FILE")]
        file: Vec<PathBuf>,
        /// Run only these check IDs (can be specified multiple times)
        #[arg(long, short = 'c', value_name = "CHECK_ID")]
        check: Vec<String>,
        /// Skip these check IDs (can be specified multiple times)
        #[arg(long, value_name = "CHECK_ID")]
        skip_check: Vec<String>,
        /// Scan only these frameworks (can be specified multiple times)
        /// Available: github_actions
        #[arg(long, value_name = "FRAMEWORK")]
        framework: Vec<String>,
        /// Skip checks below this severity (info, low, medium, high, critical)
        #[arg(long, value_name = "SEVERITY")]
        min_severity: Option<String>,
        /// Output format
        #[arg(long, value_name = "OUTPUT", default_value = "console")]
        output: OutputFormat,
        /// Enable verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = run_command(cli.command).await;
    std::process::exit(exit_code);
}

async fn run_command(command: Commands) -> i32 {
    use vigil::exit_codes::*;

    match command {
        Commands::Scan {
            directory,
            file,
            check,
            skip_check,
            framework,
            min_severity,
            output,
            verbose,
        } => {
            init_tracing(verbose);
            let args = commands::scan::ScanArgs {
                directory,
                files: file,
                checks: check,
                skip_checks: skip_check,
                frameworks: framework,
                min_severity,
                json: matches!(output, OutputFormat::Json),
            };
            match commands::scan::execute(args).await {
                Ok(exit_code) => exit_code,
                Err(e) => {
                    eprintln!("Scan error: {}", e);
                    EXIT_ERROR
                }
            }
        }
    }
}
