//! FG-008: The code-cell store.
//!
//! An insertion-order-preserving collection of CodeCells keyed by id. It is
//! populated exactly once per run before the engine executes and is only
//! read afterwards. Adding a cell under an existing id overwrites it in
//! place — the cell keeps its original position, so iteration order stays
//! deterministic across overwrites.

use super::types::CodeCell;
use indexmap::IndexMap;

/// Ordered CodeCell collection keyed by cell id.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    cells: IndexMap<String, CodeCell>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell. A duplicate id replaces the stored cell without moving
    /// it from its first-insertion position.
    pub fn add(&mut self, cell: CodeCell) {
        self.cells.insert(cell.id.clone(), cell);
    }

    /// Look up a cell by id.
    pub fn get(&self, id: &str) -> Option<&CodeCell> {
        self.cells.get(id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells in first-insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &CodeCell> {
        self.cells.values()
    }

    /// Cell ids in first-insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.cells.keys().cloned().collect()
    }
}

impl FromIterator<CodeCell> for CellStore {
    fn from_iter<T: IntoIterator<Item = CodeCell>>(iter: T) -> Self {
        let mut store = Self::new();
        for cell in iter {
            store.add(cell);
        }
        store
    }
}
