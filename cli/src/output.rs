//! Report rendering for the terminal and for machine consumption.

use colored::Colorize;

use vigil_engine::report::{Report, Severity};

/// Render a report as pretty-printed JSON.
pub fn render_json(report: &Report) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render a report for the terminal.
pub fn render_console(report: &Report) -> String {
    let mut out = String::new();

    for record in &report.failed_checks {
        out.push_str(&format!(
            "{} {} {}\n",
            "FAILED".red().bold(),
            severity_tag(record.severity),
            record.check_id.bold()
        ));
        out.push_str(&format!("       {}\n", record.check_name));
        out.push_str(&format!(
            "       {} ({}:{}-{})\n",
            record.resource, record.file_path, record.start_line, record.end_line
        ));
        if let Some(job) = &record.job {
            out.push_str(&format!("       job: {job}\n"));
        }
        out.push('\n');
    }

    for record in &report.skipped_checks {
        out.push_str(&format!(
            "{} {} {} ({})\n",
            "SKIPPED".yellow(),
            record.check_id,
            record.resource,
            record.skip_reason.as_deref().unwrap_or("no reason given")
        ));
    }
    if !report.skipped_checks.is_empty() {
        out.push('\n');
    }

    for error in &report.parsing_errors {
        out.push_str(&format!(
            "{} {}: {}\n",
            "PARSE ERROR".red(),
            error.file_path,
            error.message
        ));
    }
    if !report.parsing_errors.is_empty() {
        out.push('\n');
    }

    out.push_str(&summary_line(report));
    out.push('\n');
    out
}

fn severity_tag(severity: Severity) -> String {
    let label = format!("[{severity:?}]").to_lowercase();
    match severity {
        Severity::Critical | Severity::High => label.red().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low | Severity::Info => label.normal().to_string(),
    }
}

fn summary_line(report: &Report) -> String {
    format!(
        "{} passed, {} failed, {} skipped, {} parsing errors",
        report.passed_checks.len(),
        report.failed_checks.len(),
        report.skipped_checks.len(),
        report.parsing_errors.len()
    )
}
