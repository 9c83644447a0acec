//! Fragua — deterministic assembly engine for generated quantum programs.
//!
//! Needs/provides dependency resolution over component cards, and a
//! multi-fragment merge that emits one executable source file: normalized
//! imports, collision-free symbols, a synthesized entry routine.

pub mod cli;
pub mod core;
