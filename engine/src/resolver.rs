//! Variable resolver: fixed-point propagation of literal values across
//! reference edges.
//!
//! Each `References` edge records the exact placeholder text embedded in the
//! source vertex's attribute and the target attribute it refers to. A pass
//! substitutes placeholders whose targets resolve to non-templated scalars.
//! Passes repeat until the graph's attribute state stops changing or an
//! iteration ceiling is hit; cycles are broken by leaving residual
//! attributes marked variable-dependent rather than erroring.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::graph::{path, EdgeKind, ResourceGraph};

// `${{ ... }}` actions-style interpolation and `${VAR}` env substitution.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{.+?\}\}|\$\{[A-Za-z_][A-Za-z0-9_]*\}").expect("placeholder pattern is valid")
});

/// Shared variable-dependence helper consumed by every solver before its
/// operator-specific logic runs.
pub fn is_templated(text: &str) -> bool {
    PLACEHOLDER.is_match(text)
}

/// Outcome of one resolution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// No further change was observed within the ceiling.
    Converged { passes: usize },
    /// The ceiling was hit first; residual attributes stay templated.
    CeilingExceeded { passes: usize },
}

/// Run literal propagation to a fixed point, bounded by `max_passes`.
pub fn resolve(graph: &mut ResourceGraph, max_passes: usize) -> ResolutionOutcome {
    let mut previous_hash = attribute_state_hash(graph);

    for pass in 1..=max_passes {
        propagate_once(graph);

        let current_hash = attribute_state_hash(graph);
        if current_hash == previous_hash {
            debug!(passes = pass, "variable resolution converged");
            return ResolutionOutcome::Converged { passes: pass };
        }
        previous_hash = current_hash;
    }

    warn!(
        passes = max_passes,
        "resolution cycle ceiling exceeded; residual attributes remain variable-dependent"
    );
    ResolutionOutcome::CeilingExceeded { passes: max_passes }
}

/// One substitution sweep over all reference edges.
fn propagate_once(graph: &mut ResourceGraph) {
    for (from, to, kind) in graph.edges() {
        let EdgeKind::References {
            attribute,
            placeholder,
            target_attribute,
        } = kind
        else {
            continue;
        };

        // Only literal, fully-rendered scalars propagate.
        let Some(literal) = literal_scalar(graph, to, &target_attribute) else {
            continue;
        };

        let vertex = graph.vertex_mut(from);
        let Some(Value::String(current)) = path::lookup_mut(&mut vertex.attributes, &attribute)
        else {
            continue;
        };
        if !current.contains(placeholder.as_str()) {
            continue;
        }

        let rendered = current.replace(placeholder.as_str(), &literal);
        *current = rendered.clone();
        // Keep the variable-dependence marker in sync with the value.
        vertex.source.insert(attribute.clone(), rendered);
    }
}

/// The target's value as a string, only when present, scalar, and not
/// itself variable-dependent.
fn literal_scalar(
    graph: &ResourceGraph,
    id: crate::graph::VertexId,
    attribute_path: &str,
) -> Option<String> {
    if graph.vertex(id).has_unresolved_source(attribute_path) {
        return None;
    }
    match graph.attribute(id, attribute_path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn attribute_state_hash(graph: &ResourceGraph) -> u64 {
    let mut hasher = DefaultHasher::new();
    for id in graph.vertex_ids() {
        let vertex = graph.vertex(id);
        vertex.attributes.to_string().hash(&mut hasher);
        vertex.source.hash(&mut hasher);
    }
    hasher.finish()
}
