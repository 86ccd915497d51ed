//! Declarative checks: raw definitions, the compiler that turns them into
//! solver trees, and the registry that holds the compiled set.

pub mod builtin;
pub mod compiler;
pub mod definition;
pub mod registry;

use std::sync::Arc;

use serde_json::Value;

use crate::report::Severity;
use crate::solvers::{AttributeSolver, ConnectionSolver};

/// Logical composition of predicate children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
    Not,
}

/// A compiled predicate tree. Every leaf is bound to a concrete solver
/// instance; the tree is immutable and shared read-only across concurrent
/// evaluations.
#[derive(Debug, Clone)]
pub enum SolverTree {
    Attribute {
        solver: Arc<dyn AttributeSolver>,
        attribute: String,
        expected: Option<Value>,
    },
    Connection {
        solver: Arc<dyn ConnectionSolver>,
        target_type: String,
    },
    Composite {
        logic: Logic,
        children: Vec<SolverTree>,
    },
}

/// One compiled, immutable check.
#[derive(Debug, Clone)]
pub struct CompiledCheck {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    /// Resource/entity types this check applies to.
    pub entities: Vec<String>,
    pub tree: SolverTree,
}

impl CompiledCheck {
    pub fn applies_to(&self, resource_type: &str) -> bool {
        self.entities.iter().any(|e| e == resource_type)
    }
}
