//! FG-006: The parameter-map boundary.
//!
//! Turns the externally resolved parameter map into the entry routine's
//! declared parameter list: values merged over defaults, a primitive type
//! tag inferred per value, the parameter name sanitized into a valid
//! Python identifier, and the value rendered as the default literal.

use super::types::{ParamMap, ParamValue};
use rustc_hash::FxHashSet;

/// Python keywords that cannot be used as parameter names.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];

/// One declared parameter of the synthesized entry routine.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    /// Sanitized identifier
    pub name: String,

    /// Python type annotation ("int", "float", ...); None when the value
    /// shape is unspecified.
    pub annotation: Option<&'static str>,

    /// Default value rendered as a Python literal
    pub default: String,
}

impl ParamBinding {
    /// Render as a `def`-signature fragment.
    pub fn render(&self) -> String {
        match self.annotation {
            Some(ann) => format!("{}: {} = {}", self.name, ann, self.default),
            None => format!("{}={}", self.name, self.default),
        }
    }
}

/// Derive the declared parameter list from a resolved parameter map.
/// Values win over defaults; entry order is values first, then the
/// defaults-only names in their stored order.
pub fn parameter_bindings(params: &ParamMap) -> Vec<ParamBinding> {
    let mut used: FxHashSet<String> = FxHashSet::default();
    params
        .merged()
        .iter()
        .map(|(name, value)| ParamBinding {
            name: unique_identifier(name, &mut used),
            annotation: annotation_for(value),
            default: python_literal(value),
        })
        .collect()
}

/// Map a value's type tag onto a Python annotation.
fn annotation_for(value: &ParamValue) -> Option<&'static str> {
    match value.type_tag() {
        "boolean" => Some("bool"),
        "integer" => Some("int"),
        "float" => Some("float"),
        "string" => Some("str"),
        "sequence" => Some("list"),
        "mapping" => Some("dict"),
        _ => None,
    }
}

/// Sanitize a parameter name into a valid Python identifier: illegal
/// characters become underscores, a leading digit is prefixed, and Python
/// keywords get a trailing underscore.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if PYTHON_KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Sanitize and disambiguate against the names already in use.
fn unique_identifier(name: &str, used: &mut FxHashSet<String>) -> String {
    let base = sanitize_identifier(name);
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2usize;
    loop {
        let candidate = format!("{}_{}", base, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Render a parameter value as a Python literal.
pub fn python_literal(value: &ParamValue) -> String {
    match value {
        ParamValue::Null => "None".to_string(),
        ParamValue::Bool(true) => "True".to_string(),
        ParamValue::Bool(false) => "False".to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => {
            if f.is_nan() {
                "float('nan')".to_string()
            } else if f.is_infinite() {
                if *f > 0.0 { "float('inf')" } else { "float('-inf')" }.to_string()
            } else {
                // Debug formatting keeps the decimal point on whole floats.
                format!("{:?}", f)
            }
        }
        ParamValue::Str(s) => {
            format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
        }
        ParamValue::Seq(items) => {
            let rendered: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", rendered.join(", "))
        }
        ParamValue::Map(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(k, v)| {
                    format!(
                        "'{}': {}",
                        k.replace('\\', "\\\\").replace('\'', "\\'"),
                        python_literal(v)
                    )
                })
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    #[test]
    fn test_fg006_literals() {
        assert_eq!(python_literal(&ParamValue::Bool(true)), "True");
        assert_eq!(python_literal(&ParamValue::Int(-3)), "-3");
        assert_eq!(python_literal(&ParamValue::Float(1.0)), "1.0");
        assert_eq!(python_literal(&ParamValue::Float(0.25)), "0.25");
        assert_eq!(
            python_literal(&ParamValue::Str("it's".to_string())),
            "'it\\'s'"
        );
        assert_eq!(python_literal(&ParamValue::Null), "None");
        assert_eq!(
            python_literal(&ParamValue::Seq(vec![
                ParamValue::Int(1),
                ParamValue::Str("a".to_string()),
            ])),
            "[1, 'a']"
        );
        let map = ParamValue::Map(IndexMap::from([(
            "k".to_string(),
            ParamValue::Bool(false),
        )]));
        assert_eq!(python_literal(&map), "{'k': False}");
    }

    #[test]
    fn test_fg006_sanitize() {
        assert_eq!(sanitize_identifier("n"), "n");
        assert_eq!(sanitize_identifier("coupling-strength"), "coupling_strength");
        assert_eq!(sanitize_identifier("2q"), "_2q");
        assert_eq!(sanitize_identifier("lambda"), "lambda_");
        assert_eq!(sanitize_identifier("field strength"), "field_strength");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_fg006_bindings_merge_and_annotate() {
        let yaml = r#"
values:
  n: 4
  hx: 1.0
  label: tfim
defaults:
  n: 2
  reps: 2
"#;
        let pm: ParamMap = serde_yaml_ng::from_str(yaml).unwrap();
        let bindings = parameter_bindings(&pm);
        let rendered: Vec<String> = bindings.iter().map(ParamBinding::render).collect();
        assert_eq!(
            rendered,
            vec!["n: int = 4", "hx: float = 1.0", "label: str = 'tfim'", "reps: int = 2"]
        );
    }

    #[test]
    fn test_fg006_unspecified_value_has_no_annotation() {
        let mut pm = ParamMap::default();
        pm.values.insert("seed".to_string(), ParamValue::Null);
        let bindings = parameter_bindings(&pm);
        assert_eq!(bindings[0].render(), "seed=None");
    }

    #[test]
    fn test_fg006_colliding_sanitized_names_disambiguated() {
        let mut pm = ParamMap::default();
        pm.values.insert("h-x".to_string(), ParamValue::Int(1));
        pm.values.insert("h x".to_string(), ParamValue::Int(2));
        let bindings = parameter_bindings(&pm);
        assert_eq!(bindings[0].name, "h_x");
        assert_eq!(bindings[1].name, "h_x_2");
    }
}
