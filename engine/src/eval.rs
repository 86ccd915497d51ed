//! Solver tree evaluation.
//!
//! Recursive walk over a compiled tree against one vertex. AND short-circuits
//! on the first false child, OR on the first true child, NOT negates its
//! single child; children are visited in definition order so diagnostics are
//! reproducible. Attribute leaves map an undecidable outcome through the
//! solver's pass-through policy.

use crate::checks::{Logic, SolverTree};
use crate::error::EvaluationError;
use crate::graph::{ResourceGraph, Vertex, VertexId};
use crate::solvers::SolverOutcome;

/// Evaluate `tree` against one vertex of the graph.
pub fn evaluate_tree(
    tree: &SolverTree,
    vertex: &Vertex,
    vertex_id: VertexId,
    graph: &ResourceGraph,
) -> Result<bool, EvaluationError> {
    match tree {
        SolverTree::Attribute {
            solver,
            attribute,
            expected,
        } => {
            let outcome = solver.evaluate(vertex, attribute, expected.as_ref())?;
            Ok(match outcome {
                SolverOutcome::True => true,
                SolverOutcome::False => false,
                SolverOutcome::Undecidable => solver.pass_through_on_undecidable(),
            })
        }
        SolverTree::Connection {
            solver,
            target_type,
        } => solver.evaluate(vertex_id, target_type, graph),
        SolverTree::Composite { logic, children } => match logic {
            Logic::And => {
                for child in children {
                    if !evaluate_tree(child, vertex, vertex_id, graph)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Logic::Or => {
                for child in children {
                    if evaluate_tree(child, vertex, vertex_id, graph)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Logic::Not => {
                // Arity is validated at compile time.
                let child = children.first().ok_or_else(|| {
                    EvaluationError::new("not", "composite lost its child after compilation")
                })?;
                Ok(!evaluate_tree(child, vertex, vertex_id, graph)?)
            }
        },
    }
}
