//! FG-004: Import statement normalization.
//!
//! Imports arrive as opaque statement strings collected across all cells.
//! Normalization whitespace-cleans each entry, drops exact duplicates
//! (first occurrence wins), classifies every statement into one of four
//! buckets — standard library, general third-party, domain library
//! (prefix-matched), local/relative — sorts each bucket lexicographically,
//! and joins the buckets in fixed priority order with a blank separator
//! entry between any two non-empty buckets. The bucket order is a
//! presentation convention; it is deterministic and idempotent.

use regex::Regex;
use rustc_hash::FxHashSet;

/// Python standard-library roots the classifier recognizes.
const STDLIB_MODULES: &[&str] = &[
    "abc",
    "collections",
    "copy",
    "dataclasses",
    "datetime",
    "functools",
    "itertools",
    "json",
    "math",
    "os",
    "pathlib",
    "pickle",
    "random",
    "re",
    "sys",
    "time",
    "typing",
];

/// Import bucket, in emission priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportGroup {
    Stdlib,
    ThirdParty,
    Domain,
    Local,
}

/// Import classifier and normalizer. Owns its configuration — there are no
/// process-wide tables.
#[derive(Debug, Clone)]
pub struct ImportNormalizer {
    stdlib: FxHashSet<&'static str>,
    domain_prefixes: Vec<String>,
    from_re: Regex,
}

impl Default for ImportNormalizer {
    fn default() -> Self {
        Self::new(&["qiskit", "qiskit_"])
    }
}

impl ImportNormalizer {
    /// Build a normalizer with the given domain-library name prefixes.
    pub fn new(domain_prefixes: &[&str]) -> Self {
        Self {
            stdlib: STDLIB_MODULES.iter().copied().collect(),
            domain_prefixes: domain_prefixes.iter().map(|s| s.to_string()).collect(),
            from_re: Regex::new(r"^from\s+(\S+)\s+import\b").unwrap(),
        }
    }

    /// Normalize a raw import list: dedup, classify, sort, separate.
    pub fn normalize(&self, imports: &[String]) -> Vec<String> {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut unique: Vec<String> = Vec::new();
        for raw in imports {
            let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if !cleaned.is_empty() && seen.insert(cleaned.clone()) {
                unique.push(cleaned);
            }
        }

        let mut buckets: [Vec<String>; 4] = Default::default();
        for stmt in unique {
            let group = self.classify(&stmt);
            buckets[group as usize].push(stmt);
        }
        for bucket in &mut buckets {
            bucket.sort();
        }

        let mut out: Vec<String> = Vec::new();
        for bucket in buckets {
            if bucket.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(String::new());
            }
            out.extend(bucket);
        }
        out
    }

    /// Classify one whitespace-normalized import statement.
    pub fn classify(&self, stmt: &str) -> ImportGroup {
        if stmt.starts_with("from .") {
            return ImportGroup::Local;
        }
        let module = self.module_name(stmt);
        if self
            .domain_prefixes
            .iter()
            .any(|p| module.starts_with(p.as_str()))
        {
            return ImportGroup::Domain;
        }
        let root = module.split('.').next().unwrap_or("");
        if self.stdlib.contains(root) {
            return ImportGroup::Stdlib;
        }
        ImportGroup::ThirdParty
    }

    /// Extract the referenced module path from an import statement.
    /// Handles "import X", "import X as y", "import X, Y" and
    /// "from X import y".
    fn module_name<'a>(&self, stmt: &'a str) -> &'a str {
        if let Some(rest) = stmt.strip_prefix("import ") {
            let first = rest.split(',').next().unwrap_or(rest);
            return first.split(" as ").next().unwrap_or(first).trim();
        }
        if let Some(caps) = self.from_re.captures(stmt) {
            return caps.get(1).map_or("", |m| m.as_str());
        }
        ""
    }
}
