use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on concurrent (check, vertex) evaluations.
    pub max_parallel_evaluations: usize,

    /// Resolver iteration ceiling is `max(8, factor × edge_count)`.
    pub resolver_pass_factor: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel_evaluations: 16,
            resolver_pass_factor: 2,
        }
    }
}

impl EngineConfig {
    /// The resolver iteration ceiling for a graph with `edge_count` edges.
    pub fn resolver_pass_ceiling(&self, edge_count: usize) -> usize {
        (self.resolver_pass_factor * edge_count).max(8)
    }
}
