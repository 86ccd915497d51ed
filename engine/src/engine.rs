use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::checks::registry::CheckRegistry;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::filter::RunnerFilter;
use crate::report::Report;
use crate::runner::Runner;

/// The Vigil scan engine.
///
/// Thread-safe and designed for concurrent use. Configuration and the check
/// registry can be hot-swapped via `ArcSwap`, so long-lived processes can
/// pick up new checks without restarting in-flight scans.
///
/// # Usage
///
/// ```rust,ignore
/// use vigil_engine::engine::Engine;
/// use vigil_engine::filter::RunnerFilter;
///
/// let engine = Engine::with_default_config();
/// let report = engine.scan(Some(Path::new(".")), &[], &RunnerFilter::default()).await?;
/// ```
pub struct Engine {
    pub config: ArcSwap<EngineConfig>,
    pub check_registry: ArcSwap<CheckRegistry>,
}

impl Engine {
    /// Create a new engine with the given configuration and checks.
    pub fn new(config: EngineConfig, check_registry: CheckRegistry) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            check_registry: ArcSwap::from_pointee(check_registry),
        }
    }

    /// Convenience constructor with default configuration and built-in checks.
    pub fn with_default_config() -> Self {
        Self::new(EngineConfig::default(), CheckRegistry::with_builtin_checks())
    }

    /// Convenience constructor with default config and an empty registry.
    ///
    /// Useful for testing when you want to register checks manually.
    pub fn with_empty_registry() -> Self {
        Self::new(EngineConfig::default(), CheckRegistry::new())
    }

    /// Main entry point: scan a directory tree and/or an explicit file list
    /// and return the full report.
    ///
    /// This is pure from the caller's perspective: one request in, one
    /// report out. The engine is stateless between calls; all scan state
    /// lives inside the call.
    pub async fn scan(
        &self,
        root_folder: Option<&Path>,
        files: &[PathBuf],
        filter: &RunnerFilter,
    ) -> Result<Report, EngineError> {
        let config = self.config.load_full();
        let registry = self.check_registry.load_full();
        let runner = Runner::with_builtin_frameworks(config, registry);
        runner.run(root_folder, files, filter).await
    }

    /// Get the check registry.
    pub fn checks(&self) -> arc_swap::Guard<Arc<CheckRegistry>> {
        self.check_registry.load()
    }
}
