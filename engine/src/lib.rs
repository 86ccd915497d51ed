//! vigil-engine: graph-based declarative check evaluation
//!
//! This crate scans parsed infrastructure definitions (CI/CD workflows,
//! resource templates) against a library of declarative checks:
//! - a resource graph of typed vertices and reference edges
//! - a variable resolver that propagates literal values to a fixed point
//! - attribute and connection solvers with three-valued outcomes
//! - a check compiler turning declarative definitions into solver trees
//! - a runner that evaluates every (check, vertex) pair in parallel and
//!   aggregates verdicts into a report
//!
//! # Example
//!
//! ```ignore
//! use vigil_engine::{Engine, RunnerFilter};
//!
//! let engine = Engine::with_default_config();
//! let filter = RunnerFilter::default();
//! let report = engine.scan(Some(root), &[], &filter).await?;
//! ```

pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod filter;
pub mod frameworks;
pub mod graph;
pub mod report;
pub mod resolver;
pub mod runner;
pub mod solvers;
pub mod suppression;

// Re-export commonly used types
pub use checks::definition::{RawCheckDefinition, RawPredicate};
pub use checks::registry::CheckRegistry;
pub use checks::{CompiledCheck, Logic, SolverTree};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{CheckCompileError, EngineError, EvaluationError, ParseError};
pub use filter::RunnerFilter;
pub use graph::{EdgeKind, ResourceGraph, SourceLocation, Vertex, VertexContext, VertexId};
pub use report::{CheckRecord, CheckResult, ParsingErrorRecord, Report, Severity};
pub use runner::Runner;
pub use solvers::{Operator, SolverOutcome};
