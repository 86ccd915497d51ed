//! Inline check suppression.
//!
//! A `# vigil:skip=CHECK_ID optional reason` comment anywhere in a scanned
//! file suppresses that check for every resource in the file; the verdict is
//! recorded as skipped with the given reason rather than dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SKIP_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#\s*vigil:skip=([A-Za-z0-9_.-]+)(?:\s+(.+?))?\s*$")
        .expect("skip directive pattern is valid")
});

/// One suppression directive found in a scanned file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    pub check_id: String,
    /// 1-based line of the directive comment.
    pub comment_line: u32,
    /// Free text after the check ID.
    pub reason: Option<String>,
}

/// Scan file text for skip directives.
pub fn parse_suppressions(source: &str) -> Vec<Suppression> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            SKIP_DIRECTIVE.captures(line).map(|caps| Suppression {
                check_id: caps[1].to_string(),
                comment_line: idx as u32 + 1,
                reason: caps.get(2).map(|m| m.as_str().trim().to_string()),
            })
        })
        .collect()
}

/// The suppression covering `check_id`, if any.
pub fn suppression_for<'a>(
    suppressions: &'a [Suppression],
    check_id: &str,
) -> Option<&'a Suppression> {
    suppressions.iter().find(|s| s.check_id == check_id)
}
