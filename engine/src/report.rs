//! Report aggregation: per-(check, vertex) verdicts partitioned into
//! passed/failed/skipped buckets plus parsing-error records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Check severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Verdict for one (check, vertex) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckResult {
    Passed,
    Failed,
    /// Explicitly suppressed, not applicable, or undecidable due to an
    /// evaluation error (see `skip_reason`).
    Skipped,
}

/// One verdict record with its location and caller-facing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub check_id: String,
    pub check_name: String,
    pub severity: Severity,
    pub result: CheckResult,

    /// Resource the verdict applies to, e.g. `jobs.build.steps[0]`.
    pub resource: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,

    /// Containing job identifier, when inside a job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
    /// Trigger set of the containing workflow.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub triggers: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

/// A file the external parser could not handle. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsingErrorRecord {
    pub file_path: String,
    pub message: String,
}

/// Final partitioned collection of verdicts for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub passed_checks: Vec<CheckRecord>,
    pub failed_checks: Vec<CheckRecord>,
    pub skipped_checks: Vec<CheckRecord>,
    pub parsing_errors: Vec<ParsingErrorRecord>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// File the record into its outcome bucket.
    pub fn add_record(&mut self, record: CheckRecord) {
        match record.result {
            CheckResult::Passed => self.passed_checks.push(record),
            CheckResult::Failed => self.failed_checks.push(record),
            CheckResult::Skipped => self.skipped_checks.push(record),
        }
    }

    pub fn add_parsing_error(&mut self, error: ParsingErrorRecord) {
        self.parsing_errors.push(error);
    }

    /// Total number of verdict records across all buckets.
    pub fn record_count(&self) -> usize {
        self.passed_checks.len() + self.failed_checks.len() + self.skipped_checks.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_checks.is_empty()
    }

    /// Deterministic ordering within every bucket, independent of the
    /// worker-pool scheduling that produced the records.
    pub fn sort(&mut self) {
        let key = |r: &CheckRecord| {
            (
                r.check_id.clone(),
                r.file_path.clone(),
                r.resource.clone(),
                r.start_line,
            )
        };
        self.passed_checks.sort_by_key(key);
        self.failed_checks.sort_by_key(key);
        self.skipped_checks.sort_by_key(key);
        self.parsing_errors
            .sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.message.cmp(&b.message)));
    }
}
