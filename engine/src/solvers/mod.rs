//! Attribute and connection solver libraries.
//!
//! A solver is a pure predicate over one vertex attribute (attribute solver)
//! or over graph connectivity (connection solver). Solvers never mutate the
//! graph. Before its operator-specific logic runs, an attribute solver
//! applies the shared variable-dependence short-circuit: if the raw source
//! text at the attribute path still contains an unrendered template
//! placeholder, the predicate cannot be decided soundly and the solver
//! reports [`SolverOutcome::Undecidable`]. Each solver declares what that
//! maps to (`pass_through_on_undecidable`, true for every built-in solver:
//! flagging an unknown value as a violation is worse than missing one).
//! Existence operators opt out of the short-circuit entirely, since key
//! presence is decidable even when the value is templated.

pub mod attribute;
pub mod connection;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EvaluationError;
use crate::graph::{ResourceGraph, Vertex, VertexId};

/// The closed set of attribute operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Exists,
    NotExists,
    Contains,
    NotContains,
    StartingWith,
    EndingWith,
    RegexMatch,
    NotRegexMatch,
    IsEmpty,
    GreaterThan,
    LessThan,
    Within,
}

impl Operator {
    /// Resolve a declarative operator name. `None` feeds the compiler's
    /// `UnknownOperator` error.
    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartingWith => "starting_with",
            Operator::EndingWith => "ending_with",
            Operator::RegexMatch => "regex_match",
            Operator::NotRegexMatch => "not_regex_match",
            Operator::IsEmpty => "is_empty",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::Within => "within",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-valued solver result. `Undecidable` means the attribute is still
/// variable-dependent; the evaluation engine maps it through the solver's
/// pass-through policy at the leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverOutcome {
    True,
    False,
    Undecidable,
}

impl SolverOutcome {
    pub fn from_bool(value: bool) -> Self {
        if value {
            SolverOutcome::True
        } else {
            SolverOutcome::False
        }
    }
}

/// One atomic predicate over a vertex attribute.
///
/// Implementations are pure: they read the vertex and return a verdict.
pub trait AttributeSolver: Send + Sync + fmt::Debug {
    fn operator(&self) -> Operator;

    /// Existence-style operators decide on key presence alone and skip the
    /// variable-dependence short-circuit.
    fn bypasses_variable_check(&self) -> bool {
        false
    }

    /// The verdict reported when the attribute is variable-dependent.
    fn pass_through_on_undecidable(&self) -> bool {
        true
    }

    /// Operator semantics over the resolved value. `actual` is `None` when
    /// the attribute path is absent; a present null arrives as
    /// `Some(Value::Null)`.
    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError>;

    /// Full evaluation: shared variable-dependence short-circuit, then
    /// operator semantics.
    fn evaluate(
        &self,
        vertex: &Vertex,
        attribute_path: &str,
        expected: Option<&Value>,
    ) -> Result<SolverOutcome, EvaluationError> {
        if !self.bypasses_variable_check() && vertex.has_unresolved_source(attribute_path) {
            return Ok(SolverOutcome::Undecidable);
        }
        self.decide(vertex.attribute(attribute_path), expected)
            .map(SolverOutcome::from_bool)
    }
}

/// One atomic predicate over graph connectivity.
pub trait ConnectionSolver: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether `source` has an edge (either direction) to a vertex of
    /// `target_type`, or does not, depending on the solver.
    fn evaluate(
        &self,
        source: VertexId,
        target_type: &str,
        graph: &ResourceGraph,
    ) -> Result<bool, EvaluationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_parse_known_names() {
        assert_eq!(Operator::parse("is_empty"), Some(Operator::IsEmpty));
        assert_eq!(Operator::parse("not_regex_match"), Some(Operator::NotRegexMatch));
        assert_eq!(Operator::parse("within"), Some(Operator::Within));
    }

    #[test]
    fn test_operator_parse_unknown_name() {
        assert_eq!(Operator::parse("foo_bar"), None);
    }

    #[test]
    fn test_operator_display_round_trips() {
        for op in [
            Operator::Equals,
            Operator::NotEquals,
            Operator::Exists,
            Operator::NotExists,
            Operator::Contains,
            Operator::NotContains,
            Operator::StartingWith,
            Operator::EndingWith,
            Operator::RegexMatch,
            Operator::NotRegexMatch,
            Operator::IsEmpty,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::Within,
        ] {
            assert_eq!(Operator::parse(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_solver_outcome_from_bool() {
        assert_eq!(SolverOutcome::from_bool(true), SolverOutcome::True);
        assert_eq!(SolverOutcome::from_bool(false), SolverOutcome::False);
    }
}
