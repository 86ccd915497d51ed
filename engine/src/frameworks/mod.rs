//! Framework/dialect parsers.
//!
//! A parser turns raw definition files into the graph's initial vertex and
//! edge set, plus the raw source text per attribute used for
//! variable-dependence detection. The engine consumes parsers through this
//! seam only; everything downstream of [`ParsedDocument`] is
//! framework-agnostic.

pub mod github_actions;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::ParseError;
use crate::graph::{EdgeKind, Vertex};
use crate::suppression::Suppression;

/// Parser output for one definition file.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub file_path: String,
    pub vertices: Vec<Vertex>,
    /// Edges as (from, to, kind) indices into `vertices`; the runner remaps
    /// them onto graph vertex ids at insertion time.
    pub edges: Vec<(usize, usize, EdgeKind)>,
    /// Inline skip directives found in the file.
    pub suppressions: Vec<Suppression>,
}

/// One configuration dialect the engine can scan.
#[async_trait]
pub trait FrameworkParser: Send + Sync + fmt::Debug {
    /// Dialect name used by the runner filter, e.g. `github_actions`.
    fn framework(&self) -> &'static str;

    /// Whether a path discovered while walking a root folder belongs to
    /// this framework.
    fn claims_discovered(&self, path: &Path) -> bool;

    /// Whether an explicitly listed path can be parsed by this framework.
    /// Defaults to the discovery rule.
    fn claims_listed(&self, path: &Path) -> bool {
        self.claims_discovered(path)
    }

    /// Read and parse one file. A failure here becomes a parsing-error
    /// record; it never aborts the run.
    async fn parse(&self, path: &Path) -> Result<ParsedDocument, ParseError>;
}
