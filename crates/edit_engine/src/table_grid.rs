//! Grid view of a table
//!
//! The document stores a table as rows of cells where spanning is recorded
//! only on the anchor cell. [`TableGrid`] expands that tree into a dense
//! 2-D array: every grid position either holds the real (anchor) cell or a
//! covered copy pointing back at it. The grid is derived on demand and must
//! be rebuilt after any mutation of the table.

use doc_model::{DocModelError, DocumentTree, Node, NodeId, Path, Result};
use std::collections::HashMap;
use tracing::trace;

// =============================================================================
// Grid Cell
// =============================================================================

/// One position of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// Key of the tree cell owning this position
    pub key: NodeId,
    /// True only at the anchor (top-left) position of the owning cell
    pub is_real: bool,
    /// Grid row of this position
    pub row: usize,
    /// Grid column of this position
    pub col: usize,
    /// Path of the owning tree cell
    pub origin_path: Path,
    /// Grid row where the owning cell starts
    pub anchor_row: usize,
    /// Grid column where the owning cell starts
    pub anchor_col: usize,
    /// Rows covered by the owning cell, at least 1
    pub row_span: usize,
    /// Columns covered by the owning cell, at least 1
    pub col_span: usize,
}

impl GridCell {
    /// Last grid row covered by the owning cell
    pub fn end_row(&self) -> usize {
        self.anchor_row + self.row_span - 1
    }

    /// Last grid column covered by the owning cell
    pub fn end_col(&self) -> usize {
        self.anchor_col + self.col_span - 1
    }

    /// Whether the owning cell covers more than one position
    pub fn is_spanning(&self) -> bool {
        self.row_span > 1 || self.col_span > 1
    }

    /// Whether the owning cell covers `(row, col)`
    pub fn covers(&self, row: usize, col: usize) -> bool {
        (self.anchor_row..=self.end_row()).contains(&row)
            && (self.anchor_col..=self.end_col()).contains(&col)
    }

    /// Index of the owning cell within its tree row
    pub fn tree_index(&self) -> usize {
        self.origin_path.last().unwrap_or(0)
    }
}

// =============================================================================
// Table Grid
// =============================================================================

/// Dense 2-D view of a table
#[derive(Debug, Clone)]
pub struct TableGrid {
    table_id: NodeId,
    table_path: Path,
    /// Tree row IDs, indexed by grid row
    row_ids: Vec<NodeId>,
    /// Grid positions; `None` marks a hole left by a short row
    rows: Vec<Vec<Option<GridCell>>>,
    /// Key -> anchor position lookup
    anchors: HashMap<NodeId, (usize, usize)>,
    column_count: usize,
}

impl TableGrid {
    /// Build the grid of a table from the document tree
    pub fn build(tree: &DocumentTree, table_id: NodeId) -> Result<Self> {
        let table = tree
            .get_table(table_id)
            .ok_or(DocModelError::NodeNotFound(table_id))?;
        let table_path = tree.path_of(table_id).ok_or_else(|| {
            DocModelError::TreeStructureError(format!("Table {} is not attached", table_id))
        })?;

        let row_ids = table.rows().to_vec();
        let mut rows: Vec<Vec<Option<GridCell>>> = vec![Vec::new(); row_ids.len()];
        let mut anchors = HashMap::new();

        for (y, &row_id) in row_ids.iter().enumerate() {
            let row = tree
                .get_table_row(row_id)
                .ok_or(DocModelError::NodeNotFound(row_id))?;
            let mut cursor = 0;

            for (index, &cell_id) in row.cells().iter().enumerate() {
                let cell = tree
                    .get_table_cell(cell_id)
                    .ok_or(DocModelError::NodeNotFound(cell_id))?;

                // Skip slots already taken by spans from earlier rows
                while matches!(rows[y].get(cursor), Some(Some(_))) {
                    cursor += 1;
                }

                let row_span = cell.effective_row_span() as usize;
                let col_span = cell.effective_grid_span() as usize;
                let origin_path = table_path.child(y).child(index);

                for dy in 0..row_span {
                    let gy = y + dy;
                    if gy >= rows.len() {
                        rows.push(Vec::new());
                    }
                    for dx in 0..col_span {
                        let gx = cursor + dx;
                        let grid_row = &mut rows[gy];
                        if grid_row.len() <= gx {
                            grid_row.resize(gx + 1, None);
                        }
                        if grid_row[gx].is_some() {
                            trace!(target: "table_grid", key = %cell.id().short(), row = gy, col = gx, "overlapping span ignored");
                            continue;
                        }
                        grid_row[gx] = Some(GridCell {
                            key: cell.id(),
                            is_real: dy == 0 && dx == 0,
                            row: gy,
                            col: gx,
                            origin_path: origin_path.clone(),
                            anchor_row: y,
                            anchor_col: cursor,
                            row_span,
                            col_span,
                        });
                    }
                }

                anchors.insert(cell.id(), (y, cursor));
                cursor += col_span;
            }
        }

        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        trace!(
            target: "table_grid",
            table = %table_id.short(),
            rows = rows.len(),
            columns = column_count,
            "grid built"
        );

        Ok(Self {
            table_id,
            table_path,
            row_ids,
            rows,
            anchors,
            column_count,
        })
    }

    /// Build the grid and resolve the real cell for `key`
    ///
    /// Returns `None` when `key` is not a cell of the table.
    pub fn anchored(tree: &DocumentTree, table_id: NodeId, key: NodeId) -> Result<Option<(Self, GridCell)>> {
        let grid = Self::build(tree, table_id)?;
        let anchor = grid.real_cell(key).cloned();
        Ok(anchor.map(|cell| (grid, cell)))
    }

    pub fn table_id(&self) -> NodeId {
        self.table_id
    }

    pub fn table_path(&self) -> &Path {
        &self.table_path
    }

    /// Number of grid rows (spans past the last tree row add rows)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest grid row
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Number of rows in the tree
    pub fn tree_row_count(&self) -> usize {
        self.row_ids.len()
    }

    /// Tree row ID for a grid row
    pub fn row_id(&self, row: usize) -> Option<NodeId> {
        self.row_ids.get(row).copied()
    }

    pub fn rows(&self) -> &[Vec<Option<GridCell>>] {
        &self.rows
    }

    /// The grid position at `(row, col)`
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// The real cell owning `(row, col)`
    pub fn owner_at(&self, row: usize, col: usize) -> Option<&GridCell> {
        let key = self.cell_at(row, col)?.key;
        self.real_cell(key)
    }

    /// The real cell of a key
    pub fn real_cell(&self, key: NodeId) -> Option<&GridCell> {
        let &(row, col) = self.anchors.get(&key)?;
        self.cell_at(row, col).filter(|cell| cell.is_real)
    }

    /// The real cell whose tree path is `path`
    pub fn real_cell_at_path(&self, path: &Path) -> Option<&GridCell> {
        self.real_cells().find(|cell| &cell.origin_path == path)
    }

    /// All real cells in row-major anchor order
    pub fn real_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.positions().filter(|cell| cell.is_real)
    }

    /// Every occupied position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = &GridCell> {
        self.rows.iter().flatten().flatten()
    }

    /// Every occupied position accepted by `predicate`, row-major
    pub fn cells_matching<F>(&self, predicate: F) -> Vec<&GridCell>
    where
        F: Fn(&GridCell) -> bool,
    {
        self.positions().filter(|cell| predicate(cell)).collect()
    }

    /// Whether the grid has no holes and matches the tree row count
    pub fn is_rectangular(&self) -> bool {
        self.rows.len() == self.row_ids.len()
            && self
                .rows
                .iter()
                .all(|row| row.len() == self.column_count && row.iter().all(Option::is_some))
    }

    /// Whether every position is owned by exactly the real cell whose
    /// footprint covers it
    pub fn has_full_coverage(&self) -> bool {
        if !self.is_rectangular() {
            return false;
        }
        let positions_ok = self.positions().all(|cell| {
            self.real_cell(cell.key)
                .map(|owner| owner.covers(cell.row, cell.col))
                .unwrap_or(false)
        });
        let footprints_ok = self.real_cells().all(|owner| {
            (owner.anchor_row..=owner.end_row()).all(|row| {
                (owner.anchor_col..=owner.end_col())
                    .all(|col| self.cell_at(row, col).map(|c| c.key) == Some(owner.key))
            })
        });
        positions_ok && footprints_ok
    }
}
