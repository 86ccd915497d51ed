//! The built-in attribute solver library.
//!
//! One solver type per operator, each bound into a process-wide lookup
//! table keyed by the [`Operator`] tag. Coercion rule for comparisons:
//! strict structural equality with no implicit coercion (`"5"` ≠ `5`);
//! ordering operators accept numbers and numeric strings and are false for
//! anything else.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;

use crate::error::EvaluationError;
use crate::solvers::{AttributeSolver, Operator};

static SOLVER_TABLE: LazyLock<HashMap<Operator, Arc<dyn AttributeSolver>>> = LazyLock::new(|| {
    let solvers: Vec<Arc<dyn AttributeSolver>> = vec![
        Arc::new(EqualsSolver),
        Arc::new(NotEqualsSolver),
        Arc::new(ExistsSolver),
        Arc::new(NotExistsSolver),
        Arc::new(ContainsSolver),
        Arc::new(NotContainsSolver),
        Arc::new(StartingWithSolver),
        Arc::new(EndingWithSolver),
        Arc::new(IsEmptySolver),
        Arc::new(GreaterThanSolver),
        Arc::new(LessThanSolver),
        Arc::new(WithinSolver),
    ];
    solvers.into_iter().map(|s| (s.operator(), s)).collect()
});

/// Resolve the solver singleton for an operator tag. Regex operators have no
/// singleton: their pattern is part of the instance, so the check compiler
/// constructs those per check.
pub fn solver_for(operator: Operator) -> Option<Arc<dyn AttributeSolver>> {
    SOLVER_TABLE.get(&operator).cloned()
}

fn expected_or_err(
    operator: Operator,
    expected: Option<&Value>,
) -> Result<&Value, EvaluationError> {
    expected.ok_or_else(|| EvaluationError::new(operator.as_str(), "missing expected value"))
}

/// Render a scalar as text for substring/prefix comparisons.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric interpretation for the ordering operators: numbers and numeric
/// strings only.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[derive(Debug)]
pub struct EqualsSolver;

impl AttributeSolver for EqualsSolver {
    fn operator(&self) -> Operator {
        Operator::Equals
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        Ok(actual == Some(expected))
    }
}

#[derive(Debug)]
pub struct NotEqualsSolver;

impl AttributeSolver for NotEqualsSolver {
    fn operator(&self) -> Operator {
        Operator::NotEquals
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        EqualsSolver.decide(actual, expected).map(|matched| !matched)
    }
}

#[derive(Debug)]
pub struct ExistsSolver;

impl AttributeSolver for ExistsSolver {
    fn operator(&self) -> Operator {
        Operator::Exists
    }

    // "Does this key exist" is decidable even when its value is templated.
    fn bypasses_variable_check(&self) -> bool {
        true
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        Ok(actual.is_some())
    }
}

#[derive(Debug)]
pub struct NotExistsSolver;

impl AttributeSolver for NotExistsSolver {
    fn operator(&self) -> Operator {
        Operator::NotExists
    }

    fn bypasses_variable_check(&self) -> bool {
        true
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        Ok(actual.is_none())
    }
}

#[derive(Debug)]
pub struct ContainsSolver;

impl AttributeSolver for ContainsSolver {
    fn operator(&self) -> Operator {
        Operator::Contains
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        let Some(actual) = actual else {
            return Ok(false);
        };
        Ok(match actual {
            Value::String(s) => scalar_text(expected).is_some_and(|needle| s.contains(&needle)),
            Value::Array(items) => items.contains(expected),
            Value::Object(map) => expected
                .as_str()
                .is_some_and(|key| map.contains_key(key)),
            _ => false,
        })
    }
}

#[derive(Debug)]
pub struct NotContainsSolver;

impl AttributeSolver for NotContainsSolver {
    fn operator(&self) -> Operator {
        Operator::NotContains
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        ContainsSolver.decide(actual, expected).map(|c| !c)
    }
}

#[derive(Debug)]
pub struct StartingWithSolver;

impl AttributeSolver for StartingWithSolver {
    fn operator(&self) -> Operator {
        Operator::StartingWith
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        Ok(match (actual.and_then(scalar_text), scalar_text(expected)) {
            (Some(actual), Some(prefix)) => actual.starts_with(&prefix),
            _ => false,
        })
    }
}

#[derive(Debug)]
pub struct EndingWithSolver;

impl AttributeSolver for EndingWithSolver {
    fn operator(&self) -> Operator {
        Operator::EndingWith
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        Ok(match (actual.and_then(scalar_text), scalar_text(expected)) {
            (Some(actual), Some(suffix)) => actual.ends_with(&suffix),
            _ => false,
        })
    }
}

/// Regex solvers carry their pattern pre-compiled: the check compiler builds
/// one instance per check, so a bad pattern is a compile error and evaluation
/// never pays for recompilation per vertex.
#[derive(Debug)]
pub struct RegexMatchSolver {
    pattern: Regex,
}

impl RegexMatchSolver {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    fn matches(&self, actual: Option<&Value>) -> bool {
        actual
            .and_then(Value::as_str)
            .is_some_and(|text| self.pattern.is_match(text))
    }
}

impl AttributeSolver for RegexMatchSolver {
    fn operator(&self) -> Operator {
        Operator::RegexMatch
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        Ok(self.matches(actual))
    }
}

#[derive(Debug)]
pub struct NotRegexMatchSolver {
    inner: RegexMatchSolver,
}

impl NotRegexMatchSolver {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            inner: RegexMatchSolver::new(pattern)?,
        })
    }
}

impl AttributeSolver for NotRegexMatchSolver {
    fn operator(&self) -> Operator {
        Operator::NotRegexMatch
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        Ok(!self.inner.matches(actual))
    }
}

/// True iff the value is a present container with zero elements. False for
/// scalars, for absent attributes, and for non-container types.
#[derive(Debug)]
pub struct IsEmptySolver;

impl AttributeSolver for IsEmptySolver {
    fn operator(&self) -> Operator {
        Operator::IsEmpty
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        _expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        Ok(match actual {
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::String(s)) => s.is_empty(),
            _ => false,
        })
    }
}

#[derive(Debug)]
pub struct GreaterThanSolver;

impl AttributeSolver for GreaterThanSolver {
    fn operator(&self) -> Operator {
        Operator::GreaterThan
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        Ok(match (actual.and_then(numeric), numeric(expected)) {
            (Some(actual), Some(expected)) => actual > expected,
            _ => false,
        })
    }
}

#[derive(Debug)]
pub struct LessThanSolver;

impl AttributeSolver for LessThanSolver {
    fn operator(&self) -> Operator {
        Operator::LessThan
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        Ok(match (actual.and_then(numeric), numeric(expected)) {
            (Some(actual), Some(expected)) => actual < expected,
            _ => false,
        })
    }
}

/// Membership of the actual value in the expected set.
#[derive(Debug)]
pub struct WithinSolver;

impl AttributeSolver for WithinSolver {
    fn operator(&self) -> Operator {
        Operator::Within
    }

    fn decide(
        &self,
        actual: Option<&Value>,
        expected: Option<&Value>,
    ) -> Result<bool, EvaluationError> {
        let expected = expected_or_err(self.operator(), expected)?;
        let set = expected.as_array().ok_or_else(|| {
            EvaluationError::new(self.operator().as_str(), "expected value must be a sequence")
        })?;
        Ok(actual.is_some_and(|actual| set.contains(actual)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SourceLocation, Vertex, VertexContext};
    use crate::solvers::SolverOutcome;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn make_vertex(attributes: Value) -> Vertex {
        Vertex {
            resource_type: "steps".to_string(),
            name: "build.steps[0]".to_string(),
            attributes,
            source: BTreeMap::new(),
            location: SourceLocation::default(),
            context: VertexContext::default(),
        }
    }

    #[test]
    fn test_table_covers_every_singleton_operator() {
        for op in [
            Operator::Equals,
            Operator::NotEquals,
            Operator::Exists,
            Operator::NotExists,
            Operator::Contains,
            Operator::NotContains,
            Operator::StartingWith,
            Operator::EndingWith,
            Operator::IsEmpty,
            Operator::GreaterThan,
            Operator::LessThan,
            Operator::Within,
        ] {
            assert_eq!(solver_for(op).unwrap().operator(), op);
        }
        // Regex solvers are built per check, never from the table.
        assert!(solver_for(Operator::RegexMatch).is_none());
        assert!(solver_for(Operator::NotRegexMatch).is_none());
    }

    // ==================== Equality & coercion ====================

    #[test]
    fn test_equals_strict_no_coercion() {
        let solver = EqualsSolver;
        assert!(solver.decide(Some(&json!(5)), Some(&json!(5))).unwrap());
        // Documented rule: structural equality, "5" != 5.
        assert!(!solver.decide(Some(&json!("5")), Some(&json!(5))).unwrap());
        assert!(!solver.decide(None, Some(&json!(5))).unwrap());
    }

    #[test]
    fn test_not_equals_inverts_including_absent() {
        let solver = NotEqualsSolver;
        assert!(solver.decide(None, Some(&json!("x"))).unwrap());
        assert!(!solver.decide(Some(&json!("x")), Some(&json!("x"))).unwrap());
    }

    #[test]
    fn test_equals_missing_expected_is_evaluation_error() {
        let err = EqualsSolver.decide(Some(&json!(1)), None).unwrap_err();
        assert!(err.to_string().contains("missing expected value"));
    }

    // ==================== Existence ====================

    #[test]
    fn test_exists_distinguishes_absent_from_null() {
        assert!(!ExistsSolver.decide(None, None).unwrap());
        assert!(ExistsSolver.decide(Some(&Value::Null), None).unwrap());
        assert!(NotExistsSolver.decide(None, None).unwrap());
        assert!(!NotExistsSolver.decide(Some(&Value::Null), None).unwrap());
    }

    #[test]
    fn test_exists_bypasses_variable_check() {
        let mut vertex = make_vertex(json!({"env": "${{ inputs.env }}"}));
        vertex
            .source
            .insert("env".to_string(), "${{ inputs.env }}".to_string());

        // Key presence is decidable even for a templated value.
        let outcome = ExistsSolver.evaluate(&vertex, "env", None).unwrap();
        assert_eq!(outcome, SolverOutcome::True);
        let outcome = NotExistsSolver.evaluate(&vertex, "env", None).unwrap();
        assert_eq!(outcome, SolverOutcome::False);
    }

    // ==================== Contains family ====================

    #[test]
    fn test_contains_string_array_object() {
        let solver = ContainsSolver;
        assert!(solver
            .decide(Some(&json!("curl | bash")), Some(&json!("| bash")))
            .unwrap());
        assert!(solver
            .decide(Some(&json!(["push", "issues"])), Some(&json!("push")))
            .unwrap());
        assert!(solver
            .decide(Some(&json!({"KEY": 1})), Some(&json!("KEY")))
            .unwrap());
        assert!(!solver.decide(Some(&json!(42)), Some(&json!("4"))).unwrap());
        assert!(!solver.decide(None, Some(&json!("x"))).unwrap());
    }

    #[test]
    fn test_starting_and_ending_with() {
        assert!(StartingWithSolver
            .decide(Some(&json!("ubuntu-22.04")), Some(&json!("ubuntu")))
            .unwrap());
        assert!(EndingWithSolver
            .decide(Some(&json!("deploy.sh")), Some(&json!(".sh")))
            .unwrap());
        // Non-string actuals are false, not an error.
        assert!(!StartingWithSolver
            .decide(Some(&json!(["a"])), Some(&json!("a")))
            .unwrap());
    }

    // ==================== Regex ====================

    #[test]
    fn test_regex_match_with_precompiled_pattern() {
        let solver = RegexMatchSolver::new(r"curl[^\n]*\|\s*bash").unwrap();
        assert!(solver
            .decide(Some(&json!("curl http://x.sh | bash")), None)
            .unwrap());
        assert!(!solver.decide(Some(&json!("make build")), None).unwrap());
        // Non-string actuals are false, not an error.
        assert!(!solver.decide(Some(&json!(42)), None).unwrap());
        assert!(!solver.decide(None, None).unwrap());
    }

    #[test]
    fn test_not_regex_match_inverts() {
        let solver = NotRegexMatchSolver::new("curl").unwrap();
        assert!(solver.decide(Some(&json!("make build")), None).unwrap());
        assert!(!solver.decide(Some(&json!("curl x.sh")), None).unwrap());
        assert!(solver.decide(None, None).unwrap());
    }

    #[test]
    fn test_regex_invalid_pattern_rejected_at_construction() {
        assert!(RegexMatchSolver::new("[").is_err());
        assert!(NotRegexMatchSolver::new("(unclosed").is_err());
    }

    // ==================== IsEmpty ====================

    #[test]
    fn test_is_empty_true_only_for_empty_containers() {
        let solver = IsEmptySolver;
        assert!(solver.decide(Some(&json!([])), None).unwrap());
        assert!(solver.decide(Some(&json!({})), None).unwrap());
        assert!(solver.decide(Some(&json!("")), None).unwrap());

        assert!(!solver.decide(Some(&json!(["a"])), None).unwrap());
        assert!(!solver.decide(Some(&json!({"a": 1})), None).unwrap());
        assert!(!solver.decide(Some(&json!(0)), None).unwrap());
        assert!(!solver.decide(Some(&Value::Null), None).unwrap());
        assert!(!solver.decide(None, None).unwrap());
    }

    #[test]
    fn test_is_empty_pass_through_on_templated_source() {
        // Resolved value is an empty sequence AND the raw source is
        // templated: the solver must report Undecidable, not a literal
        // empty-sequence verdict.
        let mut vertex = make_vertex(json!({"steps": []}));
        vertex
            .source
            .insert("steps".to_string(), "${{ inputs.steps }}".to_string());

        let solver = IsEmptySolver;
        let outcome = solver.evaluate(&vertex, "steps", None).unwrap();
        assert_eq!(outcome, SolverOutcome::Undecidable);
        assert!(solver.pass_through_on_undecidable());

        // Without the templated source the same value decides normally.
        let plain = make_vertex(json!({"steps": []}));
        assert_eq!(
            solver.evaluate(&plain, "steps", None).unwrap(),
            SolverOutcome::True
        );
    }

    // ==================== Ordering ====================

    #[test]
    fn test_ordering_numeric_and_numeric_strings() {
        assert!(GreaterThanSolver
            .decide(Some(&json!(10)), Some(&json!(5)))
            .unwrap());
        assert!(GreaterThanSolver
            .decide(Some(&json!("10")), Some(&json!("5")))
            .unwrap());
        assert!(LessThanSolver
            .decide(Some(&json!(3.5)), Some(&json!(4)))
            .unwrap());
    }

    #[test]
    fn test_ordering_non_numeric_is_false() {
        assert!(!GreaterThanSolver
            .decide(Some(&json!("abc")), Some(&json!(5)))
            .unwrap());
        assert!(!LessThanSolver
            .decide(Some(&json!({"a": 1})), Some(&json!(5)))
            .unwrap());
        assert!(!GreaterThanSolver.decide(None, Some(&json!(5))).unwrap());
    }

    // ==================== Within ====================

    #[test]
    fn test_within_membership() {
        let set = json!(["ubuntu-latest", "ubuntu-22.04"]);
        assert!(WithinSolver
            .decide(Some(&json!("ubuntu-latest")), Some(&set))
            .unwrap());
        assert!(!WithinSolver
            .decide(Some(&json!("macos-latest")), Some(&set))
            .unwrap());
        assert!(!WithinSolver.decide(None, Some(&set)).unwrap());
    }

    #[test]
    fn test_within_non_sequence_expected_is_evaluation_error() {
        let err = WithinSolver
            .decide(Some(&json!("x")), Some(&json!("not-a-seq")))
            .unwrap_err();
        assert!(err.reason.contains("sequence"));
    }

    // ==================== Variable-dependence policy ====================

    #[test]
    fn test_pass_through_solvers_never_evaluate_placeholder_literally() {
        // A templated string would literally "contain" the placeholder
        // marker text; the short-circuit must win before that comparison.
        let mut vertex = make_vertex(json!({"run": "${{ inputs.cmd }}"}));
        vertex
            .source
            .insert("run".to_string(), "${{ inputs.cmd }}".to_string());

        let outcome = ContainsSolver
            .evaluate(&vertex, "run", Some(&json!("${{")))
            .unwrap();
        assert_eq!(outcome, SolverOutcome::Undecidable);
    }
}
