//! # Scan Command
//!
//! Implements the workflow scan command for the Vigil CLI.
//!
//! ## Usage
//!
//! ```bash
//! vigil scan --directory .                       # Scan a repository tree
//! vigil scan --file .github/workflows/ci.yml     # Scan explicit files
//! vigil scan --directory . --check VGL_GHA_3     # Run one check only
//! vigil scan --directory . --output json
//! ```

use std::path::PathBuf;

use anyhow::Result;

use crate::exit_codes::*;
use crate::output;
use vigil_engine::engine::Engine;
use vigil_engine::error::EngineError;
use vigil_engine::filter::RunnerFilter;
use vigil_engine::report::Severity;

/// Arguments for the scan command
pub struct ScanArgs {
    /// Root directory to walk for workflow files
    pub directory: Option<PathBuf>,
    /// Explicit files to scan, regardless of location
    pub files: Vec<PathBuf>,
    /// Allow-list of check IDs (empty = all checks)
    pub checks: Vec<String>,
    /// Deny-list of check IDs
    pub skip_checks: Vec<String>,
    /// Frameworks to scan (empty = all frameworks)
    pub frameworks: Vec<String>,
    /// Minimum severity, lower-severity checks are skipped
    pub min_severity: Option<String>,
    /// Emit JSON instead of terminal output
    pub json: bool,
}

/// Execute the scan command.
///
/// # Returns
///
/// * `Ok(EXIT_SUCCESS)` - Scan completed with no failed checks
/// * `Ok(EXIT_FINDINGS_FOUND)` - Scan completed with failed checks
/// * `Ok(EXIT_INVALID_INPUT)` - No scan target or bad severity name
pub async fn execute(args: ScanArgs) -> Result<i32> {
    let mut filter = RunnerFilter::new(args.frameworks);
    if !args.checks.is_empty() {
        filter = filter.with_checks(args.checks);
    }
    if !args.skip_checks.is_empty() {
        filter = filter.with_skip_checks(args.skip_checks);
    }
    if let Some(name) = &args.min_severity {
        let Some(severity) = parse_severity(name) else {
            eprintln!("Unknown severity: {name}");
            return Ok(EXIT_INVALID_INPUT);
        };
        filter = filter.with_min_severity(severity);
    }

    let engine = Engine::with_default_config();
    let report = match engine
        .scan(args.directory.as_deref(), &args.files, &filter)
        .await
    {
        Ok(report) => report,
        Err(EngineError::InvalidInput(reason)) => {
            eprintln!("Invalid input: {reason}");
            return Ok(EXIT_INVALID_INPUT);
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", output::render_json(&report)?);
    } else {
        print!("{}", output::render_console(&report));
    }

    if report.has_failures() {
        Ok(EXIT_FINDINGS_FOUND)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn parse_severity(name: &str) -> Option<Severity> {
    match name.to_ascii_lowercase().as_str() {
        "info" => Some(Severity::Info),
        "low" => Some(Severity::Low),
        "medium" => Some(Severity::Medium),
        "high" => Some(Severity::High),
        "critical" => Some(Severity::Critical),
        _ => None,
    }
}
