//! Cell selection painting
//!
//! A drag across a table selects every cell owning a position inside the
//! dragged rectangle. The result lives only in the editing engine; nothing
//! is written to the document, so a selection can never leak into saved
//! output or undo history.

use crate::{GridRect, TableGrid};
use doc_model::{DocumentTree, NodeId};

/// The cells painted as selected in one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSelection {
    table_id: NodeId,
    rect: GridRect,
    /// Keys of the selected real cells, row-major, without duplicates
    keys: Vec<NodeId>,
}

impl CellSelection {
    /// Paint the cells of `rect` in a table
    ///
    /// Returns `None` when the table is missing or the rectangle holds no
    /// cell.
    pub fn paint(tree: &DocumentTree, table_id: NodeId, rect: GridRect) -> Option<Self> {
        let grid = TableGrid::build(tree, table_id).ok()?;
        let selection = Self::from_grid(&grid, rect);
        (!selection.keys.is_empty()).then_some(selection)
    }

    /// Paint against an already built grid
    pub fn from_grid(grid: &TableGrid, rect: GridRect) -> Self {
        let mut keys: Vec<NodeId> = Vec::new();
        for (row, col) in rect.positions() {
            if let Some(owner) = grid.owner_at(row, col) {
                if !keys.contains(&owner.key) {
                    keys.push(owner.key);
                }
            }
        }
        Self {
            table_id: grid.table_id(),
            rect,
            keys,
        }
    }

    pub fn table_id(&self) -> NodeId {
        self.table_id
    }

    pub fn rect(&self) -> GridRect {
        self.rect
    }

    pub fn keys(&self) -> &[NodeId] {
        &self.keys
    }

    pub fn contains(&self, key: NodeId) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
