use thiserror::Error;

/// Top-level error type exposed by the engine.
///
/// No variant here is process-fatal during a run: the failure-isolation unit
/// is a single file (recorded as a parsing error), a single check (skipped
/// for all vertices), or a single (check, vertex) pair (recorded as skipped).
/// `EngineError` only bubbles out of `run` for caller mistakes and genuinely
/// unexpected internal failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("check definition error: {0}")]
    Check(#[from] CheckCompileError),

    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// "Catch-all" for unexpected internal failures.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Errors that occur while parsing individual definition files.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {file_path}: {source}")]
    File {
        file_path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to read {file_path}: {source}")]
    Io {
        file_path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// The file this error is attributed to.
    pub fn file_path(&self) -> &str {
        match self {
            ParseError::File { file_path, .. } => file_path,
            ParseError::Io { file_path, .. } => file_path,
        }
    }
}

/// Errors compiling a declarative check definition into a solver tree.
///
/// A broken check is logged and skipped for all vertices; the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckCompileError {
    #[error("check {check_id}: unknown operator '{operator}'")]
    UnknownOperator { check_id: String, operator: String },

    #[error("check {check_id}: malformed definition: {reason}")]
    MalformedCheck { check_id: String, reason: String },
}

/// An unexpected condition inside a solver (e.g. an invalid regex pattern or
/// a missing expected value). Caught at per-(check, vertex) granularity and
/// recorded as a skipped check with diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operator {operator} cannot evaluate: {reason}")]
pub struct EvaluationError {
    pub operator: String,
    pub reason: String,
}

impl EvaluationError {
    pub fn new(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            reason: reason.into(),
        }
    }
}
