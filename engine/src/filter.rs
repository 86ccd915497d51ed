//! Runner filter: which checks and frameworks are active for one run.

use serde::{Deserialize, Serialize};

use crate::report::Severity;

/// Check/framework selection for one analysis run.
///
/// Precedence: a non-empty allow-list restricts evaluation to exactly those
/// IDs; the deny-list is applied after; the severity threshold last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerFilter {
    /// Dialects to activate. Empty means all registered frameworks.
    #[serde(default)]
    pub framework: Vec<String>,
    /// Explicit allow-list of check IDs.
    #[serde(default)]
    pub checks: Vec<String>,
    /// Deny-list of check IDs, applied after the allow-list.
    #[serde(default)]
    pub skip_checks: Vec<String>,
    /// Minimum severity threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_by_severity: Option<Severity>,
}

impl RunnerFilter {
    pub fn new(framework: Vec<String>) -> Self {
        Self {
            framework,
            ..Self::default()
        }
    }

    pub fn with_checks(mut self, checks: Vec<String>) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_skip_checks(mut self, skip_checks: Vec<String>) -> Self {
        self.skip_checks = skip_checks;
        self
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.checks_by_severity = Some(severity);
        self
    }

    /// Whether a check participates in this run at all.
    pub fn should_run(&self, check_id: &str, severity: Severity) -> bool {
        if !self.checks.is_empty() && !self.checks.iter().any(|c| c == check_id) {
            return false;
        }
        if self.skip_checks.iter().any(|c| c == check_id) {
            return false;
        }
        if let Some(min) = self.checks_by_severity {
            if severity < min {
                return false;
            }
        }
        true
    }

    /// Whether a framework/dialect is active.
    pub fn framework_enabled(&self, name: &str) -> bool {
        self.framework.is_empty() || self.framework.iter().any(|f| f == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_runs_everything() {
        let filter = RunnerFilter::default();
        assert!(filter.should_run("X", Severity::Info));
        assert!(filter.framework_enabled("github_actions"));
    }

    #[test]
    fn test_allow_list_restricts_exactly() {
        let filter = RunnerFilter::default().with_checks(vec!["X".to_string(), "Y".to_string()]);
        assert!(filter.should_run("X", Severity::Info));
        assert!(filter.should_run("Y", Severity::Info));
        assert!(!filter.should_run("Z", Severity::Critical));
    }

    #[test]
    fn test_deny_list_applies_after_allow_list() {
        // checks = [X, Y], skip_checks = [Y] → only X runs.
        let filter = RunnerFilter::default()
            .with_checks(vec!["X".to_string(), "Y".to_string()])
            .with_skip_checks(vec!["Y".to_string()]);
        assert!(filter.should_run("X", Severity::Info));
        assert!(!filter.should_run("Y", Severity::Info));
    }

    #[test]
    fn test_severity_threshold() {
        let filter = RunnerFilter::default().with_min_severity(Severity::High);
        assert!(filter.should_run("X", Severity::High));
        assert!(filter.should_run("X", Severity::Critical));
        assert!(!filter.should_run("X", Severity::Medium));
    }

    #[test]
    fn test_allow_list_does_not_override_severity() {
        let filter = RunnerFilter::default()
            .with_checks(vec!["X".to_string()])
            .with_min_severity(Severity::High);
        assert!(!filter.should_run("X", Severity::Low));
    }

    #[test]
    fn test_framework_selection() {
        let filter = RunnerFilter::new(vec!["github_actions".to_string()]);
        assert!(filter.framework_enabled("github_actions"));
        assert!(!filter.framework_enabled("cloudformation"));
    }
}
