//! FG-002: Pipeline file parsing and structural validation.
//!
//! Parses `fragua.yaml` (task card + component cards + resolved parameter
//! map) and CodeCell JSON records, and validates structural constraints:
//! - Version must be "1.0"
//! - Component names must be unique and non-empty
//! - A component must not provide a resource it also needs
//! - Every need should have at least one provider
//! - Parameter aliases must target a known parameter
//! Validation returns a list of errors (empty = valid); the caller decides
//! whether diagnostics are fatal.

use super::types::{CodeCell, ComponentCard, ParamMap, TaskCard};
use glob::glob;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Root pipeline file — everything one assembly run consumes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Task description from the semantic collaborator
    pub task: TaskCard,

    /// Selected component cards
    pub components: Vec<ComponentCard>,

    /// Resolved parameter map
    #[serde(default)]
    pub params: ParamMap,
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn err(message: String) -> ValidationError {
    ValidationError { message }
}

/// Parse a fragua.yaml file from disk.
pub fn parse_config_file(path: &Path) -> Result<PipelineConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_config(&content)
}

/// Parse a fragua.yaml from a string.
pub fn parse_config(yaml: &str) -> Result<PipelineConfig, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed config. Returns a list of errors (empty = valid).
pub fn validate_config(config: &PipelineConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(err(format!(
            "version must be \"1.0\", got \"{}\"",
            config.version
        )));
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    for card in &config.components {
        if card.name.is_empty() {
            errors.push(err("component with empty name".to_string()));
            continue;
        }
        if !seen.insert(card.name.as_str()) {
            errors.push(err(format!("duplicate component name '{}'", card.name)));
        }
        for need in &card.needs {
            if card.can_satisfy(need) {
                errors.push(err(format!(
                    "component '{}' provides its own need '{}'",
                    card.name, need
                )));
            }
            let provided = config
                .components
                .iter()
                .any(|other| other.can_satisfy(need));
            if !provided {
                errors.push(err(format!(
                    "need '{}' of component '{}' has no provider",
                    need, card.name
                )));
            }
        }
    }

    for (alias, canonical) in &config.params.aliases {
        let known = config.params.values.contains_key(canonical)
            || config.params.defaults.contains_key(canonical);
        if !known {
            errors.push(err(format!(
                "alias '{}' targets unknown parameter '{}'",
                alias, canonical
            )));
        }
    }

    errors
}

/// Parse one CodeCell JSON record.
pub fn parse_cell(json: &str) -> Result<CodeCell, String> {
    serde_json::from_str(json).map_err(|e| format!("cell parse error: {}", e))
}

/// Validate a single cell. Returns a list of errors (empty = valid).
pub fn validate_cell(cell: &CodeCell) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if cell.id.is_empty() {
        errors.push(err("cell with empty id".to_string()));
    }
    for (logical, var) in &cell.exports {
        let valid = !var.is_empty()
            && var
                .chars()
                .enumerate()
                .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
        if !valid {
            errors.push(err(format!(
                "cell '{}' export '{}' maps to invalid identifier '{}'",
                cell.id, logical, var
            )));
        }
    }
    if !cell.invoke_balanced() {
        errors.push(err(format!(
            "cell '{}' invocation block has unbalanced brackets",
            cell.id
        )));
    }
    errors
}

/// Load every `*.json` cell record under a directory, in lexicographic
/// path order for deterministic store population.
pub fn load_cells_dir(dir: &Path) -> Result<Vec<CodeCell>, String> {
    let pattern = dir.join("*.json");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| format!("non-UTF-8 cells path: {}", dir.display()))?;

    let mut paths: Vec<_> = glob(pattern)
        .map_err(|e| format!("bad cells pattern: {}", e))?
        .filter_map(Result::ok)
        .collect();
    paths.sort();

    let mut cells = Vec::new();
    for path in paths {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        let cell =
            parse_cell(&content).map_err(|e| format!("{}: {}", path.display(), e))?;
        cells.push(cell);
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
version: "1.0"
task:
  domain: spin
  problem: tfim_ground_energy
  algorithm: vqe
  backend: qiskit
  params:
    n: 4
components:
  - name: Hamiltonian.TFIM
    kind: hamiltonian
    tags: [spin]
    needs: []
    provides: [hamiltonian]
  - name: Algorithm.VQE
    kind: algorithm
    needs: [hamiltonian]
    provides: [energy]
params:
  values:
    n: 4
  aliases:
    num_qubits: n
  defaults:
    reps: 2
"#;

    #[test]
    fn test_fg002_parse_valid() {
        let config = parse_config(VALID).unwrap();
        assert_eq!(config.task.problem, "tfim_ground_energy");
        assert_eq!(config.components.len(), 2);
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_fg002_bad_version() {
        let mut config = parse_config(VALID).unwrap();
        config.version = "2.0".to_string();
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("version")));
    }

    #[test]
    fn test_fg002_duplicate_component() {
        let mut config = parse_config(VALID).unwrap();
        let dup = config.components[0].clone();
        config.components.push(dup);
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn test_fg002_self_provided_need() {
        let mut config = parse_config(VALID).unwrap();
        config.components[0].needs = vec!["hamiltonian".to_string()];
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| e.message.contains("provides its own need")));
    }

    #[test]
    fn test_fg002_unprovided_need() {
        let mut config = parse_config(VALID).unwrap();
        config.components[1].needs.push("ghost".to_string());
        let errors = validate_config(&config);
        assert!(errors.iter().any(|e| e.message.contains("no provider")));
    }

    #[test]
    fn test_fg002_unknown_alias_target() {
        let mut config = parse_config(VALID).unwrap();
        config
            .params
            .aliases
            .insert("qubits".to_string(), "missing".to_string());
        let errors = validate_config(&config);
        assert!(errors
            .iter()
            .any(|e| e.message.contains("unknown parameter")));
    }

    #[test]
    fn test_fg002_parse_invalid_yaml() {
        assert!(parse_config("not: [valid: yaml: {{").is_err());
    }

    #[test]
    fn test_fg002_cell_validation() {
        let cell = parse_cell(
            r#"{"id": "ham", "invoke": "H = build(n)", "exports": {"hamiltonian": "H"}}"#,
        )
        .unwrap();
        assert!(validate_cell(&cell).is_empty());

        let bad = parse_cell(
            r#"{"id": "ham", "invoke": "H = build(n", "exports": {"hamiltonian": "2H"}}"#,
        )
        .unwrap();
        let errors = validate_cell(&bad);
        assert!(errors.iter().any(|e| e.message.contains("invalid identifier")));
        assert!(errors.iter().any(|e| e.message.contains("unbalanced")));
    }

    #[test]
    fn test_fg002_load_cells_dir_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("b_run.json"),
            r#"{"id": "run", "invoke": ""}"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a_ham.json"),
            r#"{"id": "ham", "invoke": ""}"#,
        )
        .unwrap();

        let cells = load_cells_dir(dir.path()).unwrap();
        let ids: Vec<&str> = cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["ham", "run"]);
    }

    #[test]
    fn test_fg002_load_cells_dir_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_cells_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_fg002_load_cells_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.json"), "{nope").unwrap();
        assert!(load_cells_dir(dir.path()).is_err());
    }
}
