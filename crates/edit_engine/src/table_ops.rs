//! Structural table edits
//!
//! Every operation here works on a grid built fresh from the tree at its
//! start and leaves the table rectangular on return. Preconditions that do
//! not hold (a missing anchor, a span crossing the insertion boundary, a
//! merge region that is not a perfect rectangle) turn the call into a no-op
//! reported as [`TableEditOutcome::Skipped`]. Only failures of the document
//! tree itself come back as errors.

use crate::{GridCell, GridRect, Result, TableGrid};
use doc_model::{CellSpec, DocumentTree, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

// =============================================================================
// Outcome
// =============================================================================

/// Why a table edit did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The table is not in the document
    TableNotFound,
    /// The anchor key is not a cell of the table
    AnchorNotFound,
    /// A spanning cell crosses the row or column boundary being extended
    SpanConflict,
    /// The cells to merge do not tile a rectangle
    NotRectangular,
    /// Fewer than two cells to merge
    TooFewCells,
    /// The rectangle holds no grid position
    EmptyRange,
    /// Nothing in the range needs the edit
    NotApplicable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::TableNotFound => "table not found",
            SkipReason::AnchorNotFound => "anchor cell not found",
            SkipReason::SpanConflict => "a spanning cell crosses the boundary",
            SkipReason::NotRectangular => "selection is not rectangular",
            SkipReason::TooFewCells => "fewer than two cells selected",
            SkipReason::EmptyRange => "range holds no cells",
            SkipReason::NotApplicable => "nothing to change",
        };
        f.write_str(text)
    }
}

/// Result of a structural table edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableEditOutcome {
    Applied,
    Skipped(SkipReason),
}

impl TableEditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, TableEditOutcome::Applied)
    }
}

fn skipped(operation: &str, table_id: NodeId, reason: SkipReason) -> Result<TableEditOutcome> {
    debug!(operation, table = %table_id.short(), %reason, "table edit skipped");
    Ok(TableEditOutcome::Skipped(reason))
}

fn applied(operation: &str, table_id: NodeId) -> Result<TableEditOutcome> {
    debug!(operation, table = %table_id.short(), "table edit applied");
    Ok(TableEditOutcome::Applied)
}

// =============================================================================
// Repair
// =============================================================================

/// Bring a malformed table back to a rectangular, fully covered grid
///
/// Row spans running past the last row are clamped, spans overlapping an
/// earlier cell are clipped to the rectangle the cell actually owns, then
/// every hole is filled with an empty unit cell. Returns true when anything
/// changed.
pub fn repair_table(tree: &mut DocumentTree, table_id: NodeId) -> Result<bool> {
    let grid = TableGrid::build(tree, table_id)?;
    if grid.has_full_coverage() {
        return Ok(false);
    }

    let last_row = grid.tree_row_count();
    let overlong: Vec<(NodeId, usize)> = grid
        .real_cells()
        .filter(|cell| cell.anchor_row + cell.row_span > last_row)
        .map(|cell| (cell.key, last_row - cell.anchor_row))
        .collect();
    for (key, row_span) in &overlong {
        if let Some(cell) = tree.get_table_cell_mut(*key) {
            cell.row_span = *row_span as u32;
        }
    }

    // Every clip shrinks a footprint, so this ends
    let mut clipped = 0;
    loop {
        let grid = TableGrid::build(tree, table_id)?;
        let clips = overlap_clips(&grid);
        if clips.is_empty() {
            break;
        }
        for &(key, row_span, col_span) in &clips {
            if let Some(cell) = tree.get_table_cell_mut(key) {
                cell.row_span = row_span as u32;
                cell.grid_span = col_span as u32;
            }
        }
        clipped += clips.len();
    }

    let grid = TableGrid::build(tree, table_id)?;
    let mut filled = 0;
    for y in 0..grid.row_count() {
        let holes = (0..grid.column_count())
            .filter(|&x| grid.cell_at(y, x).is_none())
            .count();
        let Some(row_id) = grid.row_id(y) else {
            continue;
        };
        // Holes only ever trail the cells anchored in their row
        for _ in 0..holes {
            tree.create_table_cell(row_id, None, &CellSpec::unit())?;
        }
        filled += holes;
    }

    warn!(
        table = %table_id.short(),
        clamped = overlong.len(),
        clipped,
        filled,
        "repaired malformed table"
    );
    Ok(true)
}

/// Spans to give every real cell that lost part of its footprint to an
/// earlier cell: the largest rectangle at its anchor that it still owns
fn overlap_clips(grid: &TableGrid) -> Vec<(NodeId, usize, usize)> {
    let owns = |key: NodeId, row: usize, col: usize| grid.cell_at(row, col).map(|c| c.key) == Some(key);

    grid.real_cells()
        .filter(|cell| {
            !(cell.anchor_row..=cell.end_row())
                .all(|row| (cell.anchor_col..=cell.end_col()).all(|col| owns(cell.key, row, col)))
        })
        .map(|cell| {
            let width = (cell.anchor_col..=cell.end_col())
                .take_while(|&col| owns(cell.key, cell.anchor_row, col))
                .count()
                .max(1);
            let height = (cell.anchor_row..=cell.end_row())
                .take_while(|&row| (cell.anchor_col..cell.anchor_col + width).all(|col| owns(cell.key, row, col)))
                .count()
                .max(1);
            (cell.key, height, width)
        })
        .collect()
}

/// Repair the table and build its grid, or `None` when it does not exist
fn prepared_grid(tree: &mut DocumentTree, table_id: NodeId) -> Result<Option<TableGrid>> {
    if tree.get_table(table_id).is_none() {
        return Ok(None);
    }
    repair_table(tree, table_id)?;
    Ok(Some(TableGrid::build(tree, table_id)?))
}

// =============================================================================
// Compaction
// =============================================================================

/// Drop empty rows and collapse unanchored columns
///
/// A tree row without cells is removed and every cell spanning across it
/// loses one row of span. A grid column where no cell is anchored is
/// collapsed and every cell covering it loses one column of span. Returns
/// the number of rows left in the table.
pub fn compact_table(tree: &mut DocumentTree, table_id: NodeId) -> Result<usize> {
    let grid = TableGrid::build(tree, table_id)?;

    let empty_rows: Vec<usize> = (0..grid.tree_row_count())
        .filter(|&y| {
            grid.row_id(y)
                .and_then(|row_id| tree.get_table_row(row_id))
                .map(|row| row.is_empty())
                .unwrap_or(false)
        })
        .collect();

    if !empty_rows.is_empty() {
        let shrink: Vec<(NodeId, usize)> = grid
            .real_cells()
            .map(|cell| {
                let crossed = empty_rows
                    .iter()
                    .filter(|&&y| y > cell.anchor_row && y <= cell.end_row())
                    .count();
                (cell.key, crossed)
            })
            .filter(|&(_, crossed)| crossed > 0)
            .collect();
        for (key, crossed) in shrink {
            if let Some(cell) = tree.get_table_cell_mut(key) {
                cell.row_span = (cell.effective_row_span() as usize - crossed).max(1) as u32;
            }
        }
        for &y in &empty_rows {
            if let Some(row_id) = grid.row_id(y) {
                tree.remove_table_row(row_id)?;
            }
        }
    }

    let grid = TableGrid::build(tree, table_id)?;
    let empty_columns: Vec<usize> = (0..grid.column_count())
        .filter(|&x| !grid.real_cells().any(|cell| cell.anchor_col == x))
        .collect();

    if !empty_columns.is_empty() {
        let shrink: Vec<(NodeId, usize)> = grid
            .real_cells()
            .map(|cell| {
                let crossed = empty_columns
                    .iter()
                    .filter(|&&x| x > cell.anchor_col && x <= cell.end_col())
                    .count();
                (cell.key, crossed)
            })
            .filter(|&(_, crossed)| crossed > 0)
            .collect();
        for (key, crossed) in shrink {
            if let Some(cell) = tree.get_table_cell_mut(key) {
                cell.grid_span = (cell.effective_grid_span() as usize - crossed).max(1) as u32;
            }
        }
    }

    debug!(
        table = %table_id.short(),
        rows_removed = empty_rows.len(),
        columns_collapsed = empty_columns.len(),
        "table compacted"
    );
    Ok(grid.tree_row_count())
}

/// Compact after a removal, deleting the table once no row is left
fn compact_or_remove(tree: &mut DocumentTree, table_id: NodeId) -> Result<()> {
    if compact_table(tree, table_id)? == 0 {
        debug!(table = %table_id.short(), "last row removed, deleting table");
        tree.remove_table(table_id)?;
        tree.ensure_body_not_empty()?;
    }
    Ok(())
}

// =============================================================================
// Insert Rows and Columns
// =============================================================================

/// Insert a row above the row where `anchor_key` starts
pub fn insert_row_above(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId) -> Result<TableEditOutcome> {
    insert_row(tree, table_id, anchor_key, RowSide::Above)
}

/// Insert a row below the last row covered by `anchor_key`
pub fn insert_row_below(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId) -> Result<TableEditOutcome> {
    insert_row(tree, table_id, anchor_key, RowSide::Below)
}

/// Insert a column left of the column where `anchor_key` starts
pub fn insert_column_left(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId) -> Result<TableEditOutcome> {
    insert_column(tree, table_id, anchor_key, ColumnSide::Left)
}

/// Insert a column right of the last column covered by `anchor_key`
pub fn insert_column_right(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId) -> Result<TableEditOutcome> {
    insert_column(tree, table_id, anchor_key, ColumnSide::Right)
}

/// Which side of the anchor a new row goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSide {
    Above,
    Below,
}

/// Which side of the anchor a new column goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSide {
    Left,
    Right,
}

fn insert_row(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId, side: RowSide) -> Result<TableEditOutcome> {
    let operation = match side {
        RowSide::Above => "insert_row_above",
        RowSide::Below => "insert_row_below",
    };
    let Some(grid) = prepared_grid(tree, table_id)? else {
        return skipped(operation, table_id, SkipReason::TableNotFound);
    };
    let Some(anchor) = grid.real_cell(anchor_key) else {
        return skipped(operation, table_id, SkipReason::AnchorNotFound);
    };

    let (boundary, insert_at) = match side {
        RowSide::Above => (anchor.anchor_row, anchor.anchor_row),
        RowSide::Below => (anchor.end_row(), anchor.end_row() + 1),
    };

    // One new cell per distinct owner of the boundary row, as wide as it
    let mut specs = Vec::new();
    let mut last_key = None;
    for x in 0..grid.column_count() {
        let Some(owner) = grid.owner_at(boundary, x) else {
            return skipped(operation, table_id, SkipReason::SpanConflict);
        };
        let fits = match side {
            RowSide::Above => owner.anchor_row == boundary,
            RowSide::Below => owner.end_row() == boundary,
        };
        if !fits {
            return skipped(operation, table_id, SkipReason::SpanConflict);
        }
        if last_key != Some(owner.key) {
            specs.push(CellSpec::spanning(1, owner.col_span as u32));
            last_key = Some(owner.key);
        }
    }

    tree.create_table_row(table_id, Some(insert_at), &specs)?;
    applied(operation, table_id)
}

fn insert_column(tree: &mut DocumentTree, table_id: NodeId, anchor_key: NodeId, side: ColumnSide) -> Result<TableEditOutcome> {
    let operation = match side {
        ColumnSide::Left => "insert_column_left",
        ColumnSide::Right => "insert_column_right",
    };
    let Some(grid) = prepared_grid(tree, table_id)? else {
        return skipped(operation, table_id, SkipReason::TableNotFound);
    };
    let Some(anchor) = grid.real_cell(anchor_key) else {
        return skipped(operation, table_id, SkipReason::AnchorNotFound);
    };

    let boundary = match side {
        ColumnSide::Left => anchor.anchor_col,
        ColumnSide::Right => anchor.end_col(),
    };

    let mut owners: Vec<&GridCell> = Vec::new();
    for y in 0..grid.row_count() {
        let Some(owner) = grid.owner_at(y, boundary) else {
            return skipped(operation, table_id, SkipReason::SpanConflict);
        };
        let fits = match side {
            ColumnSide::Left => owner.anchor_col == boundary,
            ColumnSide::Right => owner.end_col() == boundary,
        };
        if !fits {
            return skipped(operation, table_id, SkipReason::SpanConflict);
        }
        if owners.last().map(|last| last.key) != Some(owner.key) {
            owners.push(owner);
        }
    }

    // Owners sit in distinct tree rows, so each insertion leaves the other
    // rows' indexes untouched
    for owner in owners {
        let Some(row_id) = grid.row_id(owner.anchor_row) else {
            continue;
        };
        let index = match side {
            ColumnSide::Left => owner.tree_index(),
            ColumnSide::Right => owner.tree_index() + 1,
        };
        tree.create_table_cell(row_id, Some(index), &CellSpec::spanning(owner.row_span as u32, 1))?;
    }

    applied(operation, table_id)
}

// =============================================================================
// Split
// =============================================================================

/// Split every spanning cell that intersects `rect` into unit cells
///
/// The top-left unit keeps the original node, key and content; the other
/// units are new and empty.
pub fn split_cells(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect) -> Result<TableEditOutcome> {
    const OPERATION: &str = "split_cells";
    if prepared_grid(tree, table_id)?.is_none() {
        return skipped(OPERATION, table_id, SkipReason::TableNotFound);
    }
    if split_in(tree, table_id, rect)? == 0 {
        return skipped(OPERATION, table_id, SkipReason::NotApplicable);
    }
    applied(OPERATION, table_id)
}

/// Split the spanning cells touching `rect`, returning how many were split
fn split_in(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect) -> Result<usize> {
    let grid = TableGrid::build(tree, table_id)?;
    let targets: Vec<NodeId> = grid
        .real_cells()
        .filter(|cell| cell.is_spanning() && footprint(cell).intersects(&rect))
        .map(|cell| cell.key)
        .collect();

    let mut split = 0;
    for key in targets {
        // Each split shifts tree indexes, so look the cell up again
        let grid = TableGrid::build(tree, table_id)?;
        let Some(cell) = grid.real_cell(key).cloned() else {
            continue;
        };
        split_one(tree, &grid, &cell)?;
        split += 1;
    }
    Ok(split)
}

fn split_one(tree: &mut DocumentTree, grid: &TableGrid, cell: &GridCell) -> Result<()> {
    // Cells anchored left of the split column in each lower row, counted
    // before anything moves
    let lower_indexes: Vec<usize> = (1..cell.row_span)
        .map(|dy| {
            grid.real_cells()
                .filter(|other| other.anchor_row == cell.anchor_row + dy && other.anchor_col < cell.anchor_col)
                .count()
        })
        .collect();

    if let Some(node) = tree.get_table_cell_mut(cell.key) {
        node.row_span = 1;
        node.grid_span = 1;
        node.clear_size();
    }

    if let Some(row_id) = grid.row_id(cell.anchor_row) {
        for dx in 1..cell.col_span {
            tree.create_table_cell(row_id, Some(cell.tree_index() + dx), &CellSpec::unit())?;
        }
    }

    for (dy, &index) in (1..cell.row_span).zip(&lower_indexes) {
        let Some(row_id) = grid.row_id(cell.anchor_row + dy) else {
            continue;
        };
        for _ in 0..cell.col_span {
            tree.create_table_cell(row_id, Some(index), &CellSpec::unit())?;
        }
    }
    Ok(())
}

fn footprint(cell: &GridCell) -> GridRect {
    GridRect::new(cell.anchor_row, cell.anchor_col, cell.end_row(), cell.end_col())
}

// =============================================================================
// Remove Rows and Columns
// =============================================================================

/// Remove every row touched by `rect`
pub fn remove_rows(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect) -> Result<TableEditOutcome> {
    remove_band(tree, table_id, rect, Axis::Rows)
}

/// Remove every column touched by `rect`
pub fn remove_columns(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect) -> Result<TableEditOutcome> {
    remove_band(tree, table_id, rect, Axis::Columns)
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

fn remove_band(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect, axis: Axis) -> Result<TableEditOutcome> {
    let operation = match axis {
        Axis::Rows => "remove_rows",
        Axis::Columns => "remove_columns",
    };
    let Some(grid) = prepared_grid(tree, table_id)? else {
        return skipped(operation, table_id, SkipReason::TableNotFound);
    };
    if grid.row_count() == 0 || grid.column_count() == 0 {
        return skipped(operation, table_id, SkipReason::EmptyRange);
    }

    let band = match axis {
        Axis::Rows => {
            if rect.top >= grid.row_count() {
                return skipped(operation, table_id, SkipReason::EmptyRange);
            }
            GridRect::new(rect.top, 0, rect.bottom.min(grid.row_count() - 1), 0).full_rows(&grid)
        }
        Axis::Columns => {
            if rect.left >= grid.column_count() {
                return skipped(operation, table_id, SkipReason::EmptyRange);
            }
            GridRect::new(0, rect.left, 0, rect.right.min(grid.column_count() - 1)).full_columns(&grid)
        }
    };

    split_in(tree, table_id, band)?;

    let grid = TableGrid::build(tree, table_id)?;
    let doomed: Vec<NodeId> = grid
        .real_cells()
        .filter(|cell| band.contains(cell.anchor_row, cell.anchor_col))
        .map(|cell| cell.key)
        .collect();
    for key in doomed {
        tree.remove_table_cell(key)?;
    }

    compact_or_remove(tree, table_id)?;
    applied(operation, table_id)
}

// =============================================================================
// Merge
// =============================================================================

/// Check that the cells owning positions in `rect` can be merged
///
/// On success returns those cells in row-major anchor order; the first is
/// the top-left cell that survives the merge.
pub fn check_merge(grid: &TableGrid, rect: GridRect) -> std::result::Result<Vec<GridCell>, SkipReason> {
    let mut cells: Vec<GridCell> = Vec::new();
    for (row, col) in rect.positions() {
        if let Some(owner) = grid.owner_at(row, col) {
            if !cells.iter().any(|cell| cell.key == owner.key) {
                cells.push(owner.clone());
            }
        }
    }

    if cells.is_empty() {
        return Err(SkipReason::EmptyRange);
    }
    if cells.len() < 2 {
        return Err(SkipReason::TooFewCells);
    }

    cells.sort_by_key(|cell| (cell.anchor_row, cell.anchor_col));
    let bounds = cells
        .iter()
        .map(footprint)
        .reduce(|acc, next| acc.union(&next))
        .ok_or(SkipReason::EmptyRange)?;

    // Footprints never overlap, so matching areas means a perfect tiling
    let area: usize = cells.iter().map(|cell| cell.row_span * cell.col_span).sum();
    if area != bounds.height() * bounds.width() {
        return Err(SkipReason::NotRectangular);
    }
    Ok(cells)
}

/// Merge the cells owning positions in `rect` into their top-left cell
///
/// Donor content is appended to the survivor in row-major order, except that
/// a survivor with no text has its blank body replaced by the first donor
/// content that has some.
pub fn merge_cells(tree: &mut DocumentTree, table_id: NodeId, rect: GridRect) -> Result<TableEditOutcome> {
    const OPERATION: &str = "merge_cells";
    let Some(grid) = prepared_grid(tree, table_id)? else {
        return skipped(OPERATION, table_id, SkipReason::TableNotFound);
    };
    let cells = match check_merge(&grid, rect) {
        Ok(cells) => cells,
        Err(reason) => return skipped(OPERATION, table_id, reason),
    };

    let bounds = cells
        .iter()
        .map(footprint)
        .fold(footprint(&cells[0]), |acc, next| acc.union(&next));
    let survivor = cells[0].key;
    let mut survivor_blank = tree.is_text_empty(survivor);

    for donor in &cells[1..] {
        if !tree.is_text_empty(donor.key) {
            if survivor_blank {
                tree.clear_cell_blocks(survivor)?;
                survivor_blank = false;
            }
            tree.move_blocks(donor.key, survivor)?;
        }
        tree.remove_table_cell(donor.key)?;
    }

    if let Some(cell) = tree.get_table_cell_mut(survivor) {
        cell.row_span = bounds.height() as u32;
        cell.grid_span = bounds.width() as u32;
        cell.clear_size();
    }
    tree.normalize_cell_content(survivor)?;

    compact_table(tree, table_id)?;
    applied(OPERATION, table_id)
}

// =============================================================================
// Whole-table Edits
// =============================================================================

/// Flip whether the table draws borders
pub fn toggle_borders(tree: &mut DocumentTree, table_id: NodeId) -> Result<TableEditOutcome> {
    const OPERATION: &str = "toggle_borders";
    let Some(table) = tree.get_table_mut(table_id) else {
        return skipped(OPERATION, table_id, SkipReason::TableNotFound);
    };
    table.borderless = !table.borderless;
    applied(OPERATION, table_id)
}

/// Insert a `rows` x `columns` table at body `index` and keep paragraphs
/// around it
pub fn insert_table(tree: &mut DocumentTree, index: usize, rows: usize, columns: usize) -> Result<NodeId> {
    let table_id = tree.create_table(Some(index), rows, columns)?;
    tree.normalize_table_spacing()?;
    debug!(table = %table_id.short(), rows, columns, "table inserted");
    Ok(table_id)
}

/// Remove a whole table
pub fn delete_table(tree: &mut DocumentTree, table_id: NodeId) -> Result<TableEditOutcome> {
    const OPERATION: &str = "delete_table";
    if tree.get_table(table_id).is_none() {
        return skipped(OPERATION, table_id, SkipReason::TableNotFound);
    }
    tree.remove_table(table_id)?;
    tree.ensure_body_not_empty()?;
    applied(OPERATION, table_id)
}

/// The table holding a cell, for commands addressed by cell key
pub fn table_of_cell(tree: &DocumentTree, key: NodeId) -> Option<NodeId> {
    let row_id = tree.get_table_cell(key)?.parent()?;
    tree.get_table_row(row_id)?.parent()
}
