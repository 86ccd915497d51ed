//! Registry of compiled checks shared read-only across a run.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::checks::builtin::builtin_definitions;
use crate::checks::compiler::CheckCompiler;
use crate::checks::definition::RawCheckDefinition;
use crate::checks::CompiledCheck;
use crate::error::CheckCompileError;

#[derive(Debug, Default)]
pub struct CheckRegistry {
    checks: Vec<Arc<CompiledCheck>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: Arc<CompiledCheck>) {
        self.checks.push(check);
    }

    /// Compile and register a raw definition.
    pub fn register_raw(&mut self, raw: &RawCheckDefinition) -> Result<(), CheckCompileError> {
        let compiled = CheckCompiler::compile(raw)?;
        self.register(Arc::new(compiled));
        Ok(())
    }

    /// Compile and register a batch. A definition that fails to compile is
    /// logged and skipped; the rest of the batch still registers.
    pub fn register_all(&mut self, definitions: &[RawCheckDefinition]) {
        for raw in definitions {
            if let Err(e) = self.register_raw(raw) {
                warn!(check_id = %raw.id, error = %e, "skipping broken check definition");
            }
        }
    }

    pub fn all(&self) -> &[Arc<CompiledCheck>] {
        &self.checks
    }

    pub fn get(&self, id: &str) -> Option<Arc<CompiledCheck>> {
        self.checks.iter().find(|c| c.id == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.checks.iter().any(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Checks applicable to a resource type, in registration order.
    pub fn applicable_to(&self, resource_type: &str) -> Vec<Arc<CompiledCheck>> {
        self.checks
            .iter()
            .filter(|c| c.applies_to(resource_type))
            .cloned()
            .collect()
    }

    /// A new registry containing only checks with the given IDs.
    /// IDs not found are silently ignored.
    pub fn filter_by_ids(&self, ids: &[String]) -> Self {
        let id_set: HashSet<&str> = ids.iter().map(|s| s.as_str()).collect();
        Self {
            checks: self
                .checks
                .iter()
                .filter(|c| id_set.contains(c.id.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Convenience factory with the built-in check set.
    pub fn with_builtin_checks() -> Self {
        let mut registry = CheckRegistry::new();
        registry.register_all(&builtin_definitions());
        registry
    }
}
