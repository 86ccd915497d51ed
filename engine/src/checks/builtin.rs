//! Built-in declarative checks for GitHub Actions workflows.
//!
//! Checks are data, not code: each entry below is a raw definition compiled
//! through the same path as externally loaded checks.

use crate::checks::definition::RawCheckDefinition;

const BUILTIN_CHECKS: &str = r#"
- id: VGL_GHA_1
  name: Ensure workflow_dispatch does not define build-affecting inputs
  severity: medium
  entities: [workflow]
  definition:
    or:
      - cond_type: attribute
        attribute: on.workflow_dispatch.inputs
        operator: not_exists
      - cond_type: attribute
        attribute: on.workflow_dispatch.inputs
        operator: is_empty

- id: VGL_GHA_2
  name: Ensure ACTIONS_ALLOW_UNSECURE_COMMANDS is not enabled
  severity: high
  entities: [jobs, steps]
  definition:
    cond_type: attribute
    attribute: env.ACTIONS_ALLOW_UNSECURE_COMMANDS
    operator: not_exists

- id: VGL_GHA_3
  name: Ensure run steps do not pipe downloads straight into a shell
  severity: high
  entities: [steps]
  definition:
    cond_type: attribute
    attribute: run
    operator: not_regex_match
    value: '(curl|wget)[^\n|]*\|\s*(sudo\s+)?(ba|z|fi)?sh'

- id: VGL_GHA_4
  name: Ensure run steps do not open reverse shells
  severity: critical
  entities: [steps]
  definition:
    cond_type: attribute
    attribute: run
    operator: not_regex_match
    value: '(\bnc\b|\bncat\b|\bnetcat\b)[^\n]*\s-e\s|/dev/(tcp|udp)/'

- id: VGL_GHA_5
  name: Ensure jobs define at least one step
  severity: low
  entities: [jobs]
  definition:
    cond_type: connection
    operator: exists
    target_type: steps

- id: VGL_GHA_6
  name: Ensure run steps download over TLS
  severity: medium
  entities: [steps]
  definition:
    cond_type: attribute
    attribute: run
    operator: not_regex_match
    value: '(curl|wget)\s[^\n]*http://'
"#;

/// The built-in check set in its raw declarative form.
pub fn builtin_definitions() -> Vec<RawCheckDefinition> {
    serde_yaml::from_str(BUILTIN_CHECKS).expect("built-in check definitions are valid YAML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::compiler::CheckCompiler;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_definitions_parse() {
        let definitions = builtin_definitions();
        assert_eq!(definitions.len(), 6);
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let definitions = builtin_definitions();
        let ids: HashSet<_> = definitions.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), definitions.len());
    }

    #[test]
    fn test_every_builtin_compiles() {
        for raw in builtin_definitions() {
            CheckCompiler::compile(&raw)
                .unwrap_or_else(|e| panic!("builtin {} must compile: {e}", raw.id));
        }
    }
}
