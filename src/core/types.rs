//! FG-001: All record types exchanged across the pipeline.
//!
//! Defines the card/cell/plan schemas: task cards, component cards with
//! their needs/provides contracts, code cells, the tagged parameter value
//! union, and the resolved pipeline plan. All types derive
//! Serialize/Deserialize so they can cross collaborator boundaries as YAML
//! or JSON without translation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Task card
// ============================================================================

/// Structured task description handed over by the semantic collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCard {
    /// Problem domain ("spin", "chemistry", "optimization", ...)
    pub domain: String,

    /// Free-form problem id, e.g. "tfim_ground_energy"
    pub problem: String,

    /// Algorithm id ("vqe", "qaoa", "qpe", ...)
    pub algorithm: String,

    /// Target backend id
    pub backend: String,

    /// Raw user/system parameters
    #[serde(default)]
    pub params: IndexMap<String, ParamValue>,
}

// ============================================================================
// Component cards
// ============================================================================

/// Declarative description of one code-generating unit: what logical
/// resources it needs and provides, and what parameters it accepts.
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCard {
    /// Unique component name, e.g. "Hamiltonian.TFIM"
    pub name: String,

    /// Component category
    pub kind: ComponentKind,

    /// Search/selection tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Resource names this component consumes ([] = source component)
    #[serde(default)]
    pub needs: Vec<String>,

    /// Resource names this component produces
    #[serde(default)]
    pub provides: Vec<String>,

    /// Parameter name → type/constraint descriptor
    #[serde(default)]
    pub params_schema: IndexMap<String, ParamSpec>,

    /// Resource name → concrete type label of the produced value
    #[serde(default)]
    pub yields: IndexMap<String, String>,
}

impl ComponentCard {
    /// A source component has no upstream needs.
    pub fn is_source(&self) -> bool {
        self.needs.is_empty()
    }

    /// Whether this component provides the named resource.
    pub fn can_satisfy(&self, need: &str) -> bool {
        self.provides.iter().any(|p| p == need)
    }
}

/// Component category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Hamiltonian,
    Ansatz,
    Primitive,
    Optimizer,
    Algorithm,
    Reporter,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hamiltonian => write!(f, "hamiltonian"),
            Self::Ansatz => write!(f, "ansatz"),
            Self::Primitive => write!(f, "primitive"),
            Self::Optimizer => write!(f, "optimizer"),
            Self::Algorithm => write!(f, "algorithm"),
            Self::Reporter => write!(f, "reporter"),
        }
    }
}

/// Parameter descriptor in a component's schema — either a plain type name
/// ("int") or an enumerated choice list (["periodic", "open"]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    Type(String),
    Choices(Vec<String>),
}

// ============================================================================
// Parameter values
// ============================================================================

/// Tagged parameter value union. Untagged on the wire so plain YAML/JSON
/// scalars load directly; core logic only ever sees these variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<ParamValue>),
    Map(IndexMap<String, ParamValue>),
}

impl ParamValue {
    /// Primitive type tag inferred from the value's shape.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Null => "unspecified",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }
}

/// Resolved parameter map produced by the upstream normalization
/// collaborator. Read-only input to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamMap {
    /// Resolved parameter values
    #[serde(default)]
    pub values: IndexMap<String, ParamValue>,

    /// Alternate name → canonical name
    #[serde(default)]
    pub aliases: IndexMap<String, String>,

    /// Canonical name → default value
    #[serde(default)]
    pub defaults: IndexMap<String, ParamValue>,

    /// Validation diagnostics accumulated upstream
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ParamMap {
    /// Resolve an alternate parameter name to its canonical form.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Values merged over defaults: every resolved value wins, defaults
    /// fill in the rest. Iteration order is values first, then the
    /// defaults-only entries in their stored order.
    pub fn merged(&self) -> IndexMap<String, ParamValue> {
        let mut out = self.values.clone();
        for (name, value) in &self.defaults {
            if !out.contains_key(name) {
                out.insert(name.clone(), value.clone());
            }
        }
        out
    }
}

// ============================================================================
// Pipeline plan
// ============================================================================

/// Output of dependency resolution. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelinePlan {
    /// Component names in a valid linear execution order
    pub execution_order: Vec<String>,

    /// Component name → needed resource names
    pub dependency_graph: IndexMap<String, Vec<String>>,

    /// Human-readable multi-provider conflict descriptions
    pub conflicts: Vec<String>,
}

// ============================================================================
// Code cells
// ============================================================================

/// A generated code fragment with delineated sections. Created once per
/// selected component by the upstream codegen collaborator; the engine
/// reads, copies, and transforms but never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCell {
    /// Unique cell id, e.g. "ham_tfim"
    pub id: String,

    /// Raw import statements
    #[serde(default)]
    pub imports: Vec<String>,

    /// Helper-function source blocks
    #[serde(default)]
    pub helpers: Vec<String>,

    /// Top-level definition lines
    #[serde(default)]
    pub definitions: Vec<String>,

    /// Invocation block executed in the entry routine
    #[serde(default)]
    pub invoke: String,

    /// Logical name → produced variable name
    #[serde(default)]
    pub exports: IndexMap<String, String>,
}

impl CodeCell {
    /// Whether this cell exports any variables.
    pub fn has_exports(&self) -> bool {
        !self.exports.is_empty()
    }

    /// The produced variable names, in export order.
    pub fn exported_vars(&self) -> Vec<String> {
        self.exports.values().cloned().collect()
    }

    /// Basic statement-sequence sanity check: bracket nesting across the
    /// invocation block must balance and never go negative. Catches
    /// truncated fragments before they reach the emitted program.
    pub fn invoke_balanced(&self) -> bool {
        let mut round = 0i64;
        let mut square = 0i64;
        let mut curly = 0i64;
        for c in self.invoke.chars() {
            match c {
                '(' => round += 1,
                ')' => round -= 1,
                '[' => square += 1,
                ']' => square -= 1,
                '{' => curly += 1,
                '}' => curly -= 1,
                _ => {}
            }
            if round < 0 || square < 0 || curly < 0 {
                return false;
            }
        }
        round == 0 && square == 0 && curly == 0
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fg001_component_card_parse() {
        let yaml = r#"
name: Hamiltonian.TFIM
kind: hamiltonian
tags: [spin, tfim]
needs: []
provides: [hamiltonian]
params_schema:
  n: int
  boundary: [periodic, open]
yields:
  hamiltonian: SparsePauliOp
"#;
        let card: ComponentCard = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(card.name, "Hamiltonian.TFIM");
        assert_eq!(card.kind, ComponentKind::Hamiltonian);
        assert!(card.is_source());
        assert!(card.can_satisfy("hamiltonian"));
        assert!(!card.can_satisfy("ansatz"));
        assert_eq!(card.params_schema["n"], ParamSpec::Type("int".to_string()));
        assert_eq!(
            card.params_schema["boundary"],
            ParamSpec::Choices(vec!["periodic".to_string(), "open".to_string()])
        );
        assert_eq!(card.yields["hamiltonian"], "SparsePauliOp");
    }

    #[test]
    fn test_fg001_kind_display() {
        assert_eq!(ComponentKind::Hamiltonian.to_string(), "hamiltonian");
        assert_eq!(ComponentKind::Optimizer.to_string(), "optimizer");
    }

    #[test]
    fn test_fg001_param_value_untagged() {
        let v: ParamValue = serde_yaml_ng::from_str("4").unwrap();
        assert_eq!(v, ParamValue::Int(4));
        let v: ParamValue = serde_yaml_ng::from_str("1.5").unwrap();
        assert_eq!(v, ParamValue::Float(1.5));
        let v: ParamValue = serde_yaml_ng::from_str("true").unwrap();
        assert_eq!(v, ParamValue::Bool(true));
        let v: ParamValue = serde_yaml_ng::from_str("[1, 2]").unwrap();
        assert_eq!(
            v,
            ParamValue::Seq(vec![ParamValue::Int(1), ParamValue::Int(2)])
        );
        let v: ParamValue = serde_yaml_ng::from_str("null").unwrap();
        assert_eq!(v, ParamValue::Null);
    }

    #[test]
    fn test_fg001_type_tags() {
        assert_eq!(ParamValue::Bool(true).type_tag(), "boolean");
        assert_eq!(ParamValue::Int(3).type_tag(), "integer");
        assert_eq!(ParamValue::Float(0.5).type_tag(), "float");
        assert_eq!(ParamValue::Str("x".to_string()).type_tag(), "string");
        assert_eq!(ParamValue::Seq(vec![]).type_tag(), "sequence");
        assert_eq!(ParamValue::Map(IndexMap::new()).type_tag(), "mapping");
        assert_eq!(ParamValue::Null.type_tag(), "unspecified");
    }

    #[test]
    fn test_fg001_param_map_alias_and_merge() {
        let yaml = r#"
values:
  n: 4
aliases:
  num_qubits: n
defaults:
  n: 2
  reps: 2
"#;
        let pm: ParamMap = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(pm.resolve_alias("num_qubits"), "n");
        assert_eq!(pm.resolve_alias("hx"), "hx");

        let merged = pm.merged();
        // The resolved value wins over the default; defaults fill the rest.
        assert_eq!(merged["n"], ParamValue::Int(4));
        assert_eq!(merged["reps"], ParamValue::Int(2));
        let keys: Vec<_> = merged.keys().collect();
        assert_eq!(keys, vec!["n", "reps"]);
    }

    #[test]
    fn test_fg001_code_cell_roundtrip() {
        let json = r#"{
            "id": "ham_tfim",
            "imports": ["import numpy as np"],
            "helpers": ["def build(n):\n    return n"],
            "definitions": ["n_qubits = 4"],
            "invoke": "H = build(n_qubits)",
            "exports": {"hamiltonian": "H"}
        }"#;
        let cell: CodeCell = serde_json::from_str(json).unwrap();
        assert_eq!(cell.id, "ham_tfim");
        assert!(cell.has_exports());
        assert_eq!(cell.exported_vars(), vec!["H"]);

        let back = serde_json::to_string(&cell).unwrap();
        let again: CodeCell = serde_json::from_str(&back).unwrap();
        assert_eq!(again, cell);
    }

    #[test]
    fn test_fg001_invoke_balance() {
        let mut cell = CodeCell {
            id: "c".to_string(),
            imports: vec![],
            helpers: vec![],
            definitions: vec![],
            invoke: "x = f(a[0], {'k': 1})".to_string(),
            exports: IndexMap::new(),
        };
        assert!(cell.invoke_balanced());

        cell.invoke = "x = f(a[0]".to_string();
        assert!(!cell.invoke_balanced());

        // Closing before opening is malformed even though counts balance.
        cell.invoke = ")x = f(".to_string();
        assert!(!cell.invoke_balanced());
    }

    #[test]
    fn test_fg001_pipeline_plan_serde() {
        let plan = PipelinePlan {
            execution_order: vec!["A".to_string(), "B".to_string()],
            dependency_graph: IndexMap::from([
                ("A".to_string(), vec![]),
                ("B".to_string(), vec!["x".to_string()]),
            ]),
            conflicts: vec![],
        };
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"execution_order\":[\"A\",\"B\"]"));
        let back: PipelinePlan = serde_json::from_str(&json).unwrap();
        assert_eq!(back.execution_order, plan.execution_order);
    }
}
