//! FG-005: Symbol collision resolution across cells.
//!
//! Cells are processed in stored order, helpers before definitions within
//! each cell, against one shared used-name registry. The defined name is
//! the function name of a helper's `def` signature or the left-hand-side
//! identifier of a definition line. A name that is already taken gets a
//! `__<cellId>` suffix, applied at the `def` keyword site and at any
//! `name =` assignment pattern on that same line.
//!
//! Scope limitation: renaming touches only the definition site within the
//! defining cell; references inside OTHER cells' invocation blocks are not
//! rewritten. That is safe only while every cell's invocation block calls
//! helpers the cell itself defines — a cell calling a neighbor's helper by
//! name would break silently if that helper is renamed.

use super::types::CodeCell;
use regex::Regex;
use rustc_hash::FxHashSet;

/// Helper and definition lines after collision resolution, in cell order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSymbols {
    pub helpers: Vec<String>,
    pub definitions: Vec<String>,
}

/// Resolve name collisions across all cells' helpers and definitions.
pub fn resolve_symbols<'a, I>(cells: I) -> ResolvedSymbols
where
    I: IntoIterator<Item = &'a CodeCell>,
{
    let def_re = Regex::new(r"^\s*def\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();
    let assign_re = Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=(?:[^=]|$)").unwrap();

    let mut used: FxHashSet<String> = FxHashSet::default();
    let mut out = ResolvedSymbols::default();

    for cell in cells {
        for helper in &cell.helpers {
            out.helpers
                .push(claim(helper, helper_name(&def_re, helper), &cell.id, &mut used));
        }
        for definition in &cell.definitions {
            out.definitions.push(claim(
                definition,
                assigned_name(&assign_re, definition),
                &cell.id,
                &mut used,
            ));
        }
    }
    out
}

/// Function name defined by a helper block's first `def` signature.
fn helper_name(def_re: &Regex, block: &str) -> Option<String> {
    block
        .lines()
        .find_map(|line| def_re.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Left-hand-side identifier of a definition line (skips `==`).
fn assigned_name(assign_re: &Regex, line: &str) -> Option<String> {
    assign_re
        .captures(line.lines().next().unwrap_or(line))
        .map(|caps| caps[1].to_string())
}

/// Register the block's defined name, renaming it on collision.
fn claim(
    block: &str,
    name: Option<String>,
    cell_id: &str,
    used: &mut FxHashSet<String>,
) -> String {
    let Some(name) = name else {
        // No extractable symbol: emit unchanged.
        return block.to_string();
    };
    if used.insert(name.clone()) {
        return block.to_string();
    }
    // One suffix resolves a cross-cell collision; a repeated name inside
    // the same cell keeps accruing suffixes until the name is free.
    let mut renamed = format!("{}__{}", name, cell_id);
    while !used.insert(renamed.clone()) {
        renamed = format!("{}__{}", renamed, cell_id);
    }
    rename_definition(block, &name, &renamed)
}

/// Apply a rename at the definition sites of `name` within one block:
/// the `def name(` signature and any `name =` / `name=` assignment.
fn rename_definition(block: &str, name: &str, renamed: &str) -> String {
    let escaped = regex::escape(name);
    let def_site = Regex::new(&format!(r"\bdef\s+{}\b", escaped)).unwrap();
    let assign_site = Regex::new(&format!(r"\b{}\b(\s*=)([^=]|$)", escaped)).unwrap();

    let with_def = def_site.replace_all(block, format!("def {}", renamed));
    assign_site
        .replace_all(&with_def, format!("{}${{1}}${{2}}", renamed))
        .into_owned()
}
