//! Resource graph built from parsed infrastructure definitions.
//!
//! Vertices are typed resource instances (a workflow, a job, a step) carrying
//! a nested attribute value plus the raw source text per attribute path, used
//! to detect unresolved template placeholders. Edges capture containment and
//! cross-resource references. The graph is mutated only by the variable
//! resolver; solvers read it through shared references.

pub mod path;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::is_templated;

/// Stable vertex identifier for the lifetime of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Where a vertex came from in its source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_path: String,
    /// 1-based, inclusive.
    pub start_line: u32,
    pub end_line: u32,
}

/// Domain context surfaced on report records for caller diagnostics.
/// The engine itself never interprets these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexContext {
    /// Containing job identifier, when the vertex lives inside a job.
    pub job: Option<String>,
    /// Trigger set of the containing workflow (e.g. `push`, `pull_request`).
    pub triggers: BTreeSet<String>,
    /// Name of the containing workflow/document.
    pub workflow_name: Option<String>,
}

/// One parsed resource instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    /// Resource/entity type, e.g. `workflow`, `jobs`, `steps`.
    pub resource_type: String,
    /// Human-readable resource name, e.g. `jobs.build`.
    pub name: String,
    /// Nested attribute value, addressed by dot/bracket paths.
    pub attributes: Value,
    /// Raw source text per attribute path, as originally written (possibly
    /// templated). Every path present here must resolve in `attributes`.
    pub source: BTreeMap<String, String>,
    pub location: SourceLocation,
    pub context: VertexContext,
}

impl Vertex {
    /// Attribute lookup. `None` means the path is absent, which is distinct
    /// from a present `Value::Null`.
    pub fn attribute(&self, attribute_path: &str) -> Option<&Value> {
        path::lookup(&self.attributes, attribute_path)
    }

    /// Whether the value at `attribute_path` still depends on an unrendered
    /// template placeholder. Both the current value (when it is a string)
    /// and the recorded raw source text are consulted; the resolver updates
    /// both when it substitutes a literal.
    pub fn has_unresolved_source(&self, attribute_path: &str) -> bool {
        if let Some(Value::String(current)) = self.attribute(attribute_path) {
            if is_templated(current) {
                return true;
            }
        }
        self.source
            .get(attribute_path)
            .is_some_and(|raw| is_templated(raw))
    }

    /// Invariant check: every `source` path resolves in `attributes`.
    pub fn source_paths_resolvable(&self) -> bool {
        self.source
            .keys()
            .all(|attribute_path| self.attribute(attribute_path).is_some())
    }
}

/// Directed relation between two vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Structural containment (workflow → job, job → step).
    Contains,
    /// The source vertex's attribute at `attribute` embeds `placeholder`,
    /// which refers to the target vertex's value at `target_attribute`.
    References {
        attribute: String,
        placeholder: String,
        target_attribute: String,
    },
    /// Explicit ordering dependency (e.g. a job's `needs`).
    DependsOn,
}

/// Container of typed vertices and directed edges for one analysis run.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    graph: DiGraph<Vertex, EdgeKind>,
    // VertexId(i) -> NodeIndex; ids are dense and stable for the run.
    indices: Vec<NodeIndex>,
    reverse: HashMap<NodeIndex, VertexId>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> VertexId {
        let idx = self.graph.add_node(vertex);
        let id = VertexId(self.indices.len() as u32);
        self.indices.push(idx);
        self.reverse.insert(idx, id);
        id
    }

    pub fn add_edge(&mut self, from: VertexId, to: VertexId, kind: EdgeKind) {
        self.graph
            .add_edge(self.indices[from.0 as usize], self.indices[to.0 as usize], kind);
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.graph[self.indices[id.0 as usize]]
    }

    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        let idx = self.indices[id.0 as usize];
        &mut self.graph[idx]
    }

    pub fn vertex_count(&self) -> usize {
        self.indices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.indices.len() as u32).map(VertexId)
    }

    /// All vertices of the given resource type, in insertion order.
    pub fn vertices_of_type(&self, resource_type: &str) -> Vec<VertexId> {
        self.vertex_ids()
            .filter(|id| self.vertex(*id).resource_type == resource_type)
            .collect()
    }

    /// Attribute lookup through the graph. `None` means absent.
    pub fn attribute(&self, id: VertexId, attribute_path: &str) -> Option<&Value> {
        self.vertex(id).attribute(attribute_path)
    }

    /// Outgoing edges of `id` as (target, kind) pairs.
    pub fn outgoing(&self, id: VertexId) -> Vec<(VertexId, &EdgeKind)> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Incoming edges of `id` as (source, kind) pairs.
    pub fn incoming(&self, id: VertexId) -> Vec<(VertexId, &EdgeKind)> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: VertexId, direction: Direction) -> Vec<(VertexId, &EdgeKind)> {
        let idx = self.indices[id.0 as usize];
        self.graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (self.vertex_id_of(other), edge.weight())
            })
            .collect()
    }

    /// All edges as (from, to, kind) triples, in insertion order.
    pub fn edges(&self) -> Vec<(VertexId, VertexId, EdgeKind)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.vertex_id_of(edge.source()),
                    self.vertex_id_of(edge.target()),
                    edge.weight().clone(),
                )
            })
            .collect()
    }

    fn vertex_id_of(&self, idx: NodeIndex) -> VertexId {
        // Nodes are never removed, so the reverse map stays complete.
        self.reverse[&idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_vertex(resource_type: &str, name: &str, attributes: Value) -> Vertex {
        Vertex {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            attributes,
            source: BTreeMap::new(),
            location: SourceLocation::default(),
            context: VertexContext::default(),
        }
    }

    #[test]
    fn test_add_vertex_returns_stable_ids() {
        let mut graph = ResourceGraph::new();
        let a = graph.add_vertex(make_vertex("jobs", "build", json!({})));
        let b = graph.add_vertex(make_vertex("jobs", "test", json!({})));
        assert_eq!(a, VertexId(0));
        assert_eq!(b, VertexId(1));
        assert_eq!(graph.vertex(a).name, "build");
        assert_eq!(graph.vertex(b).name, "test");
    }

    #[test]
    fn test_vertices_of_type() {
        let mut graph = ResourceGraph::new();
        graph.add_vertex(make_vertex("workflow", "ci", json!({})));
        let job = graph.add_vertex(make_vertex("jobs", "build", json!({})));
        graph.add_vertex(make_vertex("steps", "build.steps[0]", json!({})));

        assert_eq!(graph.vertices_of_type("jobs"), vec![job]);
        assert!(graph.vertices_of_type("unknown").is_empty());
    }

    #[test]
    fn test_attribute_absent_vs_null() {
        let mut graph = ResourceGraph::new();
        let id = graph.add_vertex(make_vertex("jobs", "build", json!({"env": null})));

        assert_eq!(graph.attribute(id, "env"), Some(&Value::Null));
        assert_eq!(graph.attribute(id, "missing"), None);
    }

    #[test]
    fn test_edges_and_direction() {
        let mut graph = ResourceGraph::new();
        let wf = graph.add_vertex(make_vertex("workflow", "ci", json!({})));
        let job = graph.add_vertex(make_vertex("jobs", "build", json!({})));
        graph.add_edge(wf, job, EdgeKind::Contains);

        let out = graph.outgoing(wf);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, job);
        assert_eq!(*out[0].1, EdgeKind::Contains);

        let inc = graph.incoming(job);
        assert_eq!(inc.len(), 1);
        assert_eq!(inc[0].0, wf);
        assert!(graph.outgoing(job).is_empty());
    }

    #[test]
    fn test_has_unresolved_source_from_raw_text() {
        let mut vertex = make_vertex("steps", "s", json!({"steps": []}));
        vertex
            .source
            .insert("steps".to_string(), "${{ inputs.steps }}".to_string());

        // Resolved value is an empty sequence, but the raw text is templated.
        assert!(vertex.has_unresolved_source("steps"));
    }

    #[test]
    fn test_has_unresolved_source_from_current_value() {
        let vertex = make_vertex("steps", "s", json!({"run": "echo ${{ inputs.cmd }}"}));
        assert!(vertex.has_unresolved_source("run"));
    }

    #[test]
    fn test_literal_value_is_not_variable_dependent() {
        let mut vertex = make_vertex("steps", "s", json!({"run": "make build"}));
        vertex
            .source
            .insert("run".to_string(), "make build".to_string());
        assert!(!vertex.has_unresolved_source("run"));
    }

    #[test]
    fn test_source_paths_resolvable_invariant() {
        let mut vertex = make_vertex("jobs", "build", json!({"env": {"A": "1"}}));
        vertex.source.insert("env.A".to_string(), "1".to_string());
        assert!(vertex.source_paths_resolvable());

        vertex.source.insert("env.B".to_string(), "2".to_string());
        assert!(!vertex.source_paths_resolvable());
    }
}
