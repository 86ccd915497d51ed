//! Runner: one analysis pass over a set of definition files.
//!
//! Pipeline:
//!  1. collect candidate files (root folder walk and/or explicit list)
//!  2. parse each file; failures become parsing-error records
//!  3. assemble the resource graph
//!  4. run the variable resolver to its fixed point
//!  5. select applicable checks through the runner filter
//!  6. evaluate every (check, vertex) pair across a bounded task set
//!  7. merge per-task records and sort for deterministic output

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::checks::registry::CheckRegistry;
use crate::checks::CompiledCheck;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::eval::evaluate_tree;
use crate::filter::RunnerFilter;
use crate::frameworks::github_actions::GithubActionsParser;
use crate::frameworks::{FrameworkParser, ParsedDocument};
use crate::graph::{ResourceGraph, Vertex, VertexId};
use crate::report::{CheckRecord, CheckResult, ParsingErrorRecord, Report};
use crate::resolver;
use crate::suppression::{suppression_for, Suppression};

pub struct Runner {
    config: Arc<EngineConfig>,
    registry: Arc<CheckRegistry>,
    parsers: Vec<Arc<dyn FrameworkParser>>,
}

impl Runner {
    pub fn new(
        config: Arc<EngineConfig>,
        registry: Arc<CheckRegistry>,
        parsers: Vec<Arc<dyn FrameworkParser>>,
    ) -> Self {
        Self {
            config,
            registry,
            parsers,
        }
    }

    /// Runner wired with every built-in framework parser.
    pub fn with_builtin_frameworks(config: Arc<EngineConfig>, registry: Arc<CheckRegistry>) -> Self {
        Self::new(config, registry, vec![Arc::new(GithubActionsParser::new())])
    }

    /// One analysis pass. `root_folder` is walked recursively; `files` are
    /// taken as-is. At least one of the two must be provided.
    pub async fn run(
        &self,
        root_folder: Option<&Path>,
        files: &[PathBuf],
        filter: &RunnerFilter,
    ) -> Result<Report, EngineError> {
        if root_folder.is_none() && files.is_empty() {
            return Err(EngineError::InvalidInput(
                "either a root folder or an explicit file list is required".to_string(),
            ));
        }

        let mut report = Report::new();

        // 1–2) Collect and parse. One malformed file must not prevent
        // evaluation of the rest.
        let documents = self.parse_all(root_folder, files, filter, &mut report).await;

        // 3) Assemble the graph; remember per-file suppressions.
        let mut graph = ResourceGraph::new();
        let mut suppressions: HashMap<String, Vec<Suppression>> = HashMap::new();
        for doc in documents {
            insert_document(&mut graph, doc, &mut suppressions);
        }

        // 4) All mutation ends here: resolve to a fixed point, then share
        // the graph read-only with the evaluation tasks.
        let ceiling = self.config.resolver_pass_ceiling(graph.edge_count());
        if let resolver::ResolutionOutcome::CeilingExceeded { passes } =
            resolver::resolve(&mut graph, ceiling)
        {
            warn!(passes, "variable resolution stopped at the pass ceiling");
        }
        let graph = Arc::new(graph);
        let suppressions = Arc::new(suppressions);

        // 5) Select checks through the filter.
        let checks: Vec<Arc<CompiledCheck>> = self
            .registry
            .all()
            .iter()
            .filter(|c| filter.should_run(&c.id, c.severity))
            .cloned()
            .collect();
        debug!(
            checks = checks.len(),
            vertices = graph.vertex_count(),
            "starting evaluation"
        );

        // 6) Fan out per (check, applicable vertex) pair.
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_evaluations.max(1)));
        let mut tasks: JoinSet<CheckRecord> = JoinSet::new();
        for check in &checks {
            for entity in &check.entities {
                for vertex_id in graph.vertices_of_type(entity) {
                    let check = Arc::clone(check);
                    let graph = Arc::clone(&graph);
                    let suppressions = Arc::clone(&suppressions);
                    let semaphore = Arc::clone(&semaphore);
                    tasks.spawn(async move {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .expect("semaphore is never closed");
                        evaluate_pair(&check, vertex_id, &graph, &suppressions)
                    });
                }
            }
        }

        // 7) Merge and order.
        while let Some(joined) = tasks.join_next().await {
            let record = joined.map_err(|e| EngineError::Internal(e.into()))?;
            report.add_record(record);
        }
        report.sort();
        Ok(report)
    }

    /// Parse every candidate file with the active framework parsers.
    async fn parse_all(
        &self,
        root_folder: Option<&Path>,
        files: &[PathBuf],
        filter: &RunnerFilter,
        report: &mut Report,
    ) -> Vec<ParsedDocument> {
        let active: Vec<&Arc<dyn FrameworkParser>> = self
            .parsers
            .iter()
            .filter(|p| filter.framework_enabled(p.framework()))
            .collect();

        // A file reachable both through the root walk and the explicit list
        // must be scanned once.
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut candidates: Vec<(PathBuf, &Arc<dyn FrameworkParser>)> = Vec::new();
        if let Some(root) = root_folder {
            let mut discovered = Vec::new();
            collect_files(root, &mut discovered);
            discovered.sort();
            for path in discovered {
                if let Some(parser) = active.iter().find(|p| p.claims_discovered(&path)).copied() {
                    if seen.insert(candidate_key(&path)) {
                        candidates.push((path, parser));
                    }
                }
            }
        }
        for path in files {
            if let Some(parser) = active.iter().find(|p| p.claims_listed(path)).copied() {
                if seen.insert(candidate_key(path)) {
                    candidates.push((path.clone(), parser));
                }
            }
        }

        let mut documents = Vec::new();
        for (path, parser) in candidates {
            match parser.parse(&path).await {
                Ok(doc) => documents.push(doc),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "recording parsing error");
                    report.add_parsing_error(ParsingErrorRecord {
                        file_path: e.file_path().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        documents
    }
}

/// Evaluate one (check, vertex) pair into a verdict record. Evaluation
/// errors degrade to a skipped record; they never abort the run.
fn evaluate_pair(
    check: &CompiledCheck,
    vertex_id: VertexId,
    graph: &ResourceGraph,
    suppressions: &HashMap<String, Vec<Suppression>>,
) -> CheckRecord {
    let vertex = graph.vertex(vertex_id);

    if let Some(suppression) = suppressions
        .get(&vertex.location.file_path)
        .and_then(|list| suppression_for(list, &check.id))
    {
        let reason = suppression
            .reason
            .clone()
            .unwrap_or_else(|| "suppressed inline".to_string());
        return make_record(check, vertex, CheckResult::Skipped, Some(reason));
    }

    match evaluate_tree(&check.tree, vertex, vertex_id, graph) {
        Ok(true) => make_record(check, vertex, CheckResult::Passed, None),
        Ok(false) => make_record(check, vertex, CheckResult::Failed, None),
        Err(e) => {
            warn!(check_id = %check.id, resource = %vertex.name, error = %e, "evaluation error");
            make_record(check, vertex, CheckResult::Skipped, Some(e.to_string()))
        }
    }
}

fn make_record(
    check: &CompiledCheck,
    vertex: &Vertex,
    result: CheckResult,
    skip_reason: Option<String>,
) -> CheckRecord {
    CheckRecord {
        check_id: check.id.clone(),
        check_name: check.name.clone(),
        severity: check.severity,
        result,
        resource: vertex.name.clone(),
        file_path: vertex.location.file_path.clone(),
        start_line: vertex.location.start_line,
        end_line: vertex.location.end_line,
        job: vertex.context.job.clone(),
        triggers: vertex.context.triggers.clone(),
        workflow_name: vertex.context.workflow_name.clone(),
        skip_reason,
    }
}

/// Insert one parsed document's vertices and edges, remapping local indices
/// onto graph vertex ids.
fn insert_document(
    graph: &mut ResourceGraph,
    doc: ParsedDocument,
    suppressions: &mut HashMap<String, Vec<Suppression>>,
) {
    let ids: Vec<VertexId> = doc
        .vertices
        .into_iter()
        .map(|v| graph.add_vertex(v))
        .collect();
    for (from, to, kind) in doc.edges {
        graph.add_edge(ids[from], ids[to], kind);
    }
    suppressions
        .entry(doc.file_path)
        .or_default()
        .extend(doc.suppressions);
}

/// Identity for candidate dedup: the canonical path when the file exists,
/// the spelled path otherwise (a missing file still surfaces its Io error).
fn candidate_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Recursive directory walk; unreadable directories are skipped silently
/// (individual files surface errors at parse time instead).
fn collect_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}
