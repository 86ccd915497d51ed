//! Check compiler: validates a raw declarative definition and binds every
//! atomic leaf to a concrete solver instance from the operator library.
//!
//! Compilation happens once per check; the resulting tree is immutable and
//! shared read-only across concurrent evaluation of many vertices/files.

use std::sync::Arc;

use crate::checks::definition::{CondType, RawAtomic, RawCheckDefinition, RawPredicate};
use crate::checks::{CompiledCheck, Logic, SolverTree};
use crate::error::CheckCompileError;
use crate::solvers::attribute::{solver_for, NotRegexMatchSolver, RegexMatchSolver};
use crate::solvers::connection::connection_solver_for;
use crate::solvers::{AttributeSolver, Operator};

pub struct CheckCompiler;

impl CheckCompiler {
    pub fn compile(raw: &RawCheckDefinition) -> Result<CompiledCheck, CheckCompileError> {
        if raw.entities.is_empty() {
            return Err(malformed(&raw.id, "at least one entity type is required"));
        }
        let tree = Self::compile_predicate(&raw.id, &raw.definition)?;
        Ok(CompiledCheck {
            id: raw.id.clone(),
            name: raw.name.clone(),
            severity: raw.severity,
            entities: raw.entities.clone(),
            tree,
        })
    }

    fn compile_predicate(
        check_id: &str,
        predicate: &RawPredicate,
    ) -> Result<SolverTree, CheckCompileError> {
        match predicate {
            RawPredicate::And(children) => {
                Self::compile_composite(check_id, Logic::And, children)
            }
            RawPredicate::Or(children) => Self::compile_composite(check_id, Logic::Or, children),
            RawPredicate::Not(children) => {
                if children.len() != 1 {
                    return Err(malformed(
                        check_id,
                        format!("'not' takes exactly one child, got {}", children.len()),
                    ));
                }
                Self::compile_composite(check_id, Logic::Not, children)
            }
            RawPredicate::Atomic(atomic) => Self::compile_atomic(check_id, atomic),
        }
    }

    fn compile_composite(
        check_id: &str,
        logic: Logic,
        children: &[RawPredicate],
    ) -> Result<SolverTree, CheckCompileError> {
        if children.is_empty() {
            return Err(malformed(check_id, "composite with zero children"));
        }
        // Definition order is preserved: it is the evaluation order.
        let children = children
            .iter()
            .map(|child| Self::compile_predicate(check_id, child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SolverTree::Composite { logic, children })
    }

    fn compile_atomic(check_id: &str, atomic: &RawAtomic) -> Result<SolverTree, CheckCompileError> {
        match atomic.cond_type {
            CondType::Attribute => {
                let operator = Operator::parse(&atomic.operator).ok_or_else(|| {
                    CheckCompileError::UnknownOperator {
                        check_id: check_id.to_string(),
                        operator: atomic.operator.clone(),
                    }
                })?;
                let attribute = atomic.attribute.clone().ok_or_else(|| {
                    malformed(check_id, "attribute condition without an attribute path")
                })?;
                Ok(SolverTree::Attribute {
                    solver: Self::attribute_solver(check_id, operator, atomic.value.as_ref())?,
                    attribute,
                    expected: atomic.value.clone(),
                })
            }
            CondType::Connection => {
                let solver = connection_solver_for(&atomic.operator).ok_or_else(|| {
                    CheckCompileError::UnknownOperator {
                        check_id: check_id.to_string(),
                        operator: atomic.operator.clone(),
                    }
                })?;
                let target_type = atomic.target_type.clone().ok_or_else(|| {
                    malformed(check_id, "connection condition without a target_type")
                })?;
                Ok(SolverTree::Connection {
                    solver,
                    target_type,
                })
            }
        }
    }
}

impl CheckCompiler {
    /// Bind an attribute operator to its solver instance. Regex operators
    /// compile their pattern here, once per check; everything else resolves
    /// to a shared singleton.
    fn attribute_solver(
        check_id: &str,
        operator: Operator,
        value: Option<&serde_json::Value>,
    ) -> Result<Arc<dyn AttributeSolver>, CheckCompileError> {
        match operator {
            Operator::RegexMatch => {
                let pattern = pattern_of(check_id, value)?;
                Ok(Arc::new(
                    RegexMatchSolver::new(pattern).map_err(|e| bad_pattern(check_id, pattern, e))?,
                ))
            }
            Operator::NotRegexMatch => {
                let pattern = pattern_of(check_id, value)?;
                Ok(Arc::new(
                    NotRegexMatchSolver::new(pattern)
                        .map_err(|e| bad_pattern(check_id, pattern, e))?,
                ))
            }
            _ => solver_for(operator).ok_or_else(|| CheckCompileError::UnknownOperator {
                check_id: check_id.to_string(),
                operator: operator.as_str().to_string(),
            }),
        }
    }
}

fn pattern_of<'a>(
    check_id: &str,
    value: Option<&'a serde_json::Value>,
) -> Result<&'a str, CheckCompileError> {
    value
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| malformed(check_id, "regex operator without a string pattern"))
}

fn bad_pattern(check_id: &str, pattern: &str, error: regex::Error) -> CheckCompileError {
    malformed(
        check_id,
        format!("invalid regex pattern '{pattern}': {error}"),
    )
}

fn malformed(check_id: &str, reason: impl Into<String>) -> CheckCompileError {
    CheckCompileError::MalformedCheck {
        check_id: check_id.to_string(),
        reason: reason.into(),
    }
}
