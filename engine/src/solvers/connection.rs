//! Connection solvers: predicates over graph edges.
//!
//! Same read-only, side-effect-free contract as attribute solvers; these
//! test whether a vertex is connected (in either direction) to a vertex of
//! a required resource type.

use std::sync::Arc;

use crate::error::EvaluationError;
use crate::graph::{ResourceGraph, VertexId};
use crate::solvers::ConnectionSolver;

/// Resolve a connection solver by its declarative operator name.
pub fn connection_solver_for(name: &str) -> Option<Arc<dyn ConnectionSolver>> {
    match name {
        "exists" => Some(Arc::new(ConnectionExistsSolver)),
        "not_exists" => Some(Arc::new(ConnectionNotExistsSolver)),
        _ => None,
    }
}

fn connected_to_type(source: VertexId, target_type: &str, graph: &ResourceGraph) -> bool {
    graph
        .outgoing(source)
        .iter()
        .chain(graph.incoming(source).iter())
        .any(|(other, _)| graph.vertex(*other).resource_type == target_type)
}

#[derive(Debug)]
pub struct ConnectionExistsSolver;

impl ConnectionSolver for ConnectionExistsSolver {
    fn name(&self) -> &'static str {
        "exists"
    }

    fn evaluate(
        &self,
        source: VertexId,
        target_type: &str,
        graph: &ResourceGraph,
    ) -> Result<bool, EvaluationError> {
        Ok(connected_to_type(source, target_type, graph))
    }
}

#[derive(Debug)]
pub struct ConnectionNotExistsSolver;

impl ConnectionSolver for ConnectionNotExistsSolver {
    fn name(&self) -> &'static str {
        "not_exists"
    }

    fn evaluate(
        &self,
        source: VertexId,
        target_type: &str,
        graph: &ResourceGraph,
    ) -> Result<bool, EvaluationError> {
        Ok(!connected_to_type(source, target_type, graph))
    }
}
