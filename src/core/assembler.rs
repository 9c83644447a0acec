//! FG-007: Program assembly — one emitted source unit.
//!
//! Orchestrates import normalization, symbol resolution, and the parameter
//! boundary into a single executable Python file: banner, import block,
//! deduplicated helpers/definitions, a synthesized `main` whose body runs
//! every cell's invocation block in dependency order, and the
//! run-when-invoked trailer. The generation timestamp is supplied by the
//! caller, so assembly is a pure function of its inputs and its output is
//! byte-deterministic.

use super::error::AssemblyError;
use super::imports::ImportNormalizer;
use super::memory::CellStore;
use super::params::{parameter_bindings, ParamBinding};
use super::symbols::resolve_symbols;
use super::types::{CodeCell, ParamMap, PipelinePlan, TaskCard};
use regex::Regex;
use rustc_hash::FxHashSet;

/// Generic-type tokens whose use in an annotation requires a typing import.
const TYPING_TOKENS: &[&str] = &[
    "Any", "Callable", "Dict", "List", "Optional", "Set", "Tuple", "Union",
];

/// The assembly engine. Owns its import-classification configuration;
/// construct once per run (or share read-only across runs).
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    normalizer: ImportNormalizer,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom import normalizer (e.g. different domain prefixes).
    pub fn with_normalizer(normalizer: ImportNormalizer) -> Self {
        Self { normalizer }
    }

    /// Assemble all cells into one executable source text.
    ///
    /// `generated_at` lands verbatim in the banner; pass a fixed value for
    /// reproducible output.
    pub fn assemble(
        &self,
        store: &CellStore,
        plan: &PipelinePlan,
        task: &TaskCard,
        params: &ParamMap,
        generated_at: &str,
    ) -> Result<String, AssemblyError> {
        if store.is_empty() {
            return Err(AssemblyError::EmptyInput);
        }
        for cell in store.cells() {
            if !cell.invoke_balanced() {
                return Err(AssemblyError::MalformedCodeCell {
                    id: cell.id.clone(),
                });
            }
        }

        // 1. Imports across all cells, stored order.
        let raw_imports: Vec<String> = store
            .cells()
            .flat_map(|c| c.imports.iter().cloned())
            .collect();
        let imports = self.normalizer.normalize(&raw_imports);

        // 2. Helpers/definitions with collisions resolved; definition lines
        // that are really call statements are dropped from the static block
        // (they belong inside invocation blocks).
        let resolved = resolve_symbols(store.cells());
        let definitions: Vec<String> = resolved
            .definitions
            .into_iter()
            .filter(|line| !is_call_assignment(line))
            .collect();

        // 3. Entry body order: execution order where an entry matches a
        // cell id, remaining cells in stored insertion order.
        let sequence = entry_sequence(store, plan);

        // 4. Declared parameter list.
        let bindings = parameter_bindings(params);

        // 5. Emit.
        let text = emit(task, generated_at, &imports, &resolved.helpers, &definitions, &sequence, &bindings);

        // 6. Typing imports for generic annotations.
        Ok(ensure_typing_imports(&text))
    }
}

/// Cells in entry-routine order: execution-order entries matched by cell
/// id first, then every unmatched cell in stored insertion order.
fn entry_sequence<'a>(store: &'a CellStore, plan: &PipelinePlan) -> Vec<&'a CodeCell> {
    let mut taken: FxHashSet<&str> = FxHashSet::default();
    let mut sequence: Vec<&CodeCell> = Vec::new();
    for name in &plan.execution_order {
        if let Some(cell) = store.get(name) {
            if taken.insert(cell.id.as_str()) {
                sequence.push(cell);
            }
        }
    }
    for cell in store.cells() {
        if !taken.contains(cell.id.as_str()) {
            sequence.push(cell);
        }
    }
    sequence
}

/// An assignment whose right-hand side is a call expression is an
/// execution statement, not a static definition.
fn is_call_assignment(line: &str) -> bool {
    let assign = Regex::new(r"^\s*[A-Za-z_][A-Za-z0-9_]*\s*=([^=]|$)").unwrap();
    let Some(m) = assign.find(line) else {
        return false;
    };
    let rhs = &line[m.end().saturating_sub(1)..];
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*\s*\(")
        .unwrap()
        .is_match(rhs)
}

/// Strip the common leading-space indent and re-indent to the entry
/// routine's body level.
fn reindent(block: &str, indent: &str) -> Vec<String> {
    let common = block
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    block
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, &l[common.min(l.len())..])
            }
        })
        .collect()
}

fn emit(
    task: &TaskCard,
    generated_at: &str,
    imports: &[String],
    helpers: &[String],
    definitions: &[String],
    sequence: &[&CodeCell],
    bindings: &[ParamBinding],
) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("\"\"\"".to_string());
    lines.push(format!("Quantum program: {}", task.problem));
    lines.push(format!("Generated by fragua {}", env!("CARGO_PKG_VERSION")));
    lines.push(String::new());
    lines.push(format!("Domain: {}", task.domain));
    lines.push(format!("Algorithm: {}", task.algorithm));
    lines.push(format!("Backend: {}", task.backend));
    lines.push(format!("Generated: {}", generated_at));
    lines.push("\"\"\"".to_string());

    if !imports.is_empty() {
        lines.push(String::new());
        lines.extend(imports.iter().cloned());
    }

    for block in helpers {
        lines.push(String::new());
        lines.extend(block.lines().map(str::to_string));
    }

    if !definitions.is_empty() {
        lines.push(String::new());
        lines.extend(definitions.iter().cloned());
    }

    lines.push(String::new());
    let signature: Vec<String> = bindings.iter().map(ParamBinding::render).collect();
    lines.push(format!("def main({}):", signature.join(", ")));

    let mut body_empty = true;
    for cell in sequence {
        if cell.invoke.trim().is_empty() {
            continue;
        }
        body_empty = false;
        lines.push(format!("    # --- {} ---", cell.id));
        lines.extend(reindent(&cell.invoke, "    "));
        lines.push(String::new());
    }
    if body_empty {
        lines.push("    pass".to_string());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.push(String::new());
    lines.push("if __name__ == \"__main__\":".to_string());
    lines.push("    main()".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Ensure a `from typing import ...` line exists for every generic-type
/// token used in an annotation. Idempotent — running it on its own output
/// changes nothing, and a token is never imported twice.
fn ensure_typing_imports(text: &str) -> String {
    let mut needed: Vec<&str> = Vec::new();
    for &token in TYPING_TOKENS {
        let pattern = if token == "Any" {
            r"(:|->)\s*Any\b".to_string()
        } else {
            format!(r"\b{}\s*\[", token)
        };
        if Regex::new(&pattern).unwrap().is_match(text) {
            needed.push(token);
        }
    }
    if needed.is_empty() {
        return text.to_string();
    }

    let typing_line = Regex::new(r"^from typing import (.+)$").unwrap();
    let mut imported: FxHashSet<String> = FxHashSet::default();
    for line in text.lines() {
        if let Some(caps) = typing_line.captures(line) {
            for name in caps[1].split(',') {
                let name = name.trim().split_whitespace().next().unwrap_or("");
                imported.insert(name.to_string());
            }
        }
    }

    let missing: Vec<&str> = needed
        .into_iter()
        .filter(|t| !imported.contains(*t))
        .collect();
    if missing.is_empty() {
        return text.to_string();
    }

    let stmt = format!("from typing import {}", missing.join(", "));
    let lines: Vec<&str> = text.lines().collect();

    // Insert ahead of the first import statement, or after the banner
    // docstring when there is no import block.
    let at = lines
        .iter()
        .position(|l| l.starts_with("import ") || l.starts_with("from "))
        .unwrap_or_else(|| {
            lines
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, l)| l.trim() == "\"\"\"")
                .map_or(0, |(i, _)| i + 1)
        });

    let mut out: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
    out.insert(at, stmt);
    let mut joined = out.join("\n");
    joined.push('\n');
    joined
}
