//! FG-010: Engine error taxonomy.
//!
//! Fatal errors carry enough identifying context (component/cell ids) to be
//! logged or surfaced without re-derivation. Provider conflicts are NOT
//! errors — they travel as diagnostics on the `PipelinePlan`.

use thiserror::Error;

/// Fatal failures of the assembly engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// The needs/provides graph contains a cycle. `remaining` is the exact
    /// set of components left unscheduled, in input order.
    #[error("dependency cycle detected involving: {}", remaining.join(", "))]
    CycleDetected { remaining: Vec<String> },

    /// No code cells were supplied to the assembler.
    #[error("no code cells to assemble")]
    EmptyInput,

    /// A cell's invocation block failed the statement-sequence sanity check.
    #[error("code cell '{id}' has a malformed invocation block")]
    MalformedCodeCell { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fg010_cycle_message_lists_members() {
        let e = AssemblyError::CycleDetected {
            remaining: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(e.to_string(), "dependency cycle detected involving: A, B");
    }

    #[test]
    fn test_fg010_malformed_cell_names_id() {
        let e = AssemblyError::MalformedCodeCell {
            id: "ham_tfim".to_string(),
        };
        assert!(e.to_string().contains("ham_tfim"));
    }

    #[test]
    fn test_fg010_empty_input() {
        assert_eq!(
            AssemblyError::EmptyInput.to_string(),
            "no code cells to assemble"
        );
    }
}
