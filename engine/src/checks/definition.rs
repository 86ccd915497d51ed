//! Raw declarative check definitions, as parsed from their source format
//! (YAML or JSON). Compilation into solver trees happens in
//! [`crate::checks::compiler`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::Severity;

/// A declarative predicate tree in its source form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawPredicate {
    And(Vec<RawPredicate>),
    Or(Vec<RawPredicate>),
    Not(Vec<RawPredicate>),
    #[serde(untagged)]
    Atomic(RawAtomic),
}

/// Which solver library an atomic predicate binds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CondType {
    Attribute,
    Connection,
}

/// An atomic predicate: one operator applied to one attribute path
/// (attribute solvers) or one target type (connection solvers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAtomic {
    pub cond_type: CondType,
    /// Operator name, resolved against the solver library at compile time.
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
}

/// One declarative check definition as loaded from its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCheckDefinition {
    pub id: String,
    pub name: String,
    pub severity: Severity,
    /// Applicable resource/entity types.
    pub entities: Vec<String>,
    pub definition: RawPredicate,
}
