//! Table editing commands
//!
//! Undoable wrappers around the structural edits in `table_ops` and the
//! cell content edits in `cell_formatting`:
//! - InsertTable / DeleteTable: whole tables
//! - InsertTableRow / InsertTableColumn: grow next to an anchor cell
//! - RemoveTableRows / RemoveTableColumns: shrink over a grid rectangle
//! - MergeTableCells / SplitTableCells: change spans
//! - ToggleTableBorders: flip the borderless flag
//! - ToggleCellMark / ClearCellContents: act on painted cells
//!
//! Each command works on a copy of the tree. Its inverse is a snapshot of
//! the tree it started from, and a command that ends up skipped reports
//! `changed: false` so the engine records nothing.

use crate::{
    apply_mark_to_cells, clear_cell_contents, first_caret, surviving_selection, table_ops,
    ColumnSide, Command, CommandResult, GridRect, RestoreDocument, Result, RowSide, TableEditOutcome,
};
use doc_model::{DocumentTree, Mark, Node, NodeId, Selection};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Run an edit on a copy of `tree` and package the result
fn run_edit<F>(tree: &DocumentTree, selection: &Selection, edit: F) -> Result<CommandResult>
where
    F: FnOnce(&mut DocumentTree) -> Result<bool>,
{
    let mut new_tree = tree.clone();
    let changed = edit(&mut new_tree)?;
    let new_tree = if changed { new_tree } else { tree.clone() };

    Ok(CommandResult {
        selection: surviving_selection(&new_tree, selection),
        tree: new_tree,
        inverse: Box::new(RestoreDocument::new(tree.clone(), *selection)),
        changed,
    })
}

fn run_table_edit<F>(tree: &DocumentTree, selection: &Selection, edit: F) -> Result<CommandResult>
where
    F: FnOnce(&mut DocumentTree) -> Result<TableEditOutcome>,
{
    run_edit(tree, selection, |tree| Ok(edit(tree)?.is_applied()))
}

fn snapshot_inverse(tree: &DocumentTree) -> Box<dyn Command> {
    let caret = first_caret(tree).unwrap_or_default();
    Box::new(RestoreDocument::new(tree.clone(), caret))
}

// =============================================================================
// InsertTable Command
// =============================================================================

/// Insert a table after the block holding the caret
///
/// Does nothing unless the caret is collapsed and outside any table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertTable {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl InsertTable {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }
}

impl Command for InsertTable {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        let caret_ok = selection.is_collapsed()
            && tree.find_table_for_node(selection.focus.node_id).is_none();
        if !caret_ok {
            return run_edit(tree, selection, |_| Ok(false));
        }

        let index = tree
            .path_of(selection.focus.node_id)
            .and_then(|path| path.as_slice().first().copied())
            .map(|body_index| body_index + 1)
            .unwrap_or_else(|| tree.document.children().len());

        let mut new_tree = tree.clone();
        let table_id = table_ops::insert_table(&mut new_tree, index, self.rows, self.cols)?;

        // Caret goes into the first cell
        let new_selection = new_tree
            .get_table(table_id)
            .and_then(|table| table.rows().first().copied())
            .and_then(|row_id| new_tree.get_table_row(row_id))
            .and_then(|row| row.cells().first().copied())
            .and_then(|cell_id| new_tree.cell_blocks(cell_id).ok())
            .and_then(|blocks| blocks.first().copied())
            .map(Selection::at_start_of)
            .unwrap_or(*selection);

        Ok(CommandResult {
            tree: new_tree,
            selection: new_selection,
            inverse: Box::new(RestoreDocument::new(tree.clone(), *selection)),
            changed: true,
        })
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Insert Table"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// DeleteTable Command
// =============================================================================

/// Delete an entire table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTable {
    pub table_id: NodeId,
}

impl DeleteTable {
    pub fn new(table_id: NodeId) -> Self {
        Self { table_id }
    }
}

impl Command for DeleteTable {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::delete_table(tree, self.table_id))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Delete Table"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// InsertTableRow Command
// =============================================================================

/// Insert a row above or below an anchor cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertTableRow {
    pub table_id: NodeId,
    /// Key of the cell the new row is placed against
    pub anchor_key: NodeId,
    pub side: RowSide,
}

impl InsertTableRow {
    pub fn above(table_id: NodeId, anchor_key: NodeId) -> Self {
        Self {
            table_id,
            anchor_key,
            side: RowSide::Above,
        }
    }

    pub fn below(table_id: NodeId, anchor_key: NodeId) -> Self {
        Self {
            table_id,
            anchor_key,
            side: RowSide::Below,
        }
    }
}

impl Command for InsertTableRow {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| match self.side {
            RowSide::Above => table_ops::insert_row_above(tree, self.table_id, self.anchor_key),
            RowSide::Below => table_ops::insert_row_below(tree, self.table_id, self.anchor_key),
        })
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        match self.side {
            RowSide::Above => "Insert Row Above",
            RowSide::Below => "Insert Row Below",
        }
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// InsertTableColumn Command
// =============================================================================

/// Insert a column left or right of an anchor cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertTableColumn {
    pub table_id: NodeId,
    /// Key of the cell the new column is placed against
    pub anchor_key: NodeId,
    pub side: ColumnSide,
}

impl InsertTableColumn {
    pub fn left(table_id: NodeId, anchor_key: NodeId) -> Self {
        Self {
            table_id,
            anchor_key,
            side: ColumnSide::Left,
        }
    }

    pub fn right(table_id: NodeId, anchor_key: NodeId) -> Self {
        Self {
            table_id,
            anchor_key,
            side: ColumnSide::Right,
        }
    }
}

impl Command for InsertTableColumn {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| match self.side {
            ColumnSide::Left => table_ops::insert_column_left(tree, self.table_id, self.anchor_key),
            ColumnSide::Right => table_ops::insert_column_right(tree, self.table_id, self.anchor_key),
        })
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        match self.side {
            ColumnSide::Left => "Insert Column Left",
            ColumnSide::Right => "Insert Column Right",
        }
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Rectangle Commands
// =============================================================================

/// Remove every row touched by a grid rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTableRows {
    pub table_id: NodeId,
    pub rect: GridRect,
}

impl RemoveTableRows {
    pub fn new(table_id: NodeId, rect: GridRect) -> Self {
        Self { table_id, rect }
    }
}

impl Command for RemoveTableRows {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::remove_rows(tree, self.table_id, self.rect))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Delete Rows"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Remove every column touched by a grid rectangle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveTableColumns {
    pub table_id: NodeId,
    pub rect: GridRect,
}

impl RemoveTableColumns {
    pub fn new(table_id: NodeId, rect: GridRect) -> Self {
        Self { table_id, rect }
    }
}

impl Command for RemoveTableColumns {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::remove_columns(tree, self.table_id, self.rect))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Delete Columns"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Merge the cells of a grid rectangle into one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeTableCells {
    pub table_id: NodeId,
    pub rect: GridRect,
}

impl MergeTableCells {
    pub fn new(table_id: NodeId, rect: GridRect) -> Self {
        Self { table_id, rect }
    }
}

impl Command for MergeTableCells {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::merge_cells(tree, self.table_id, self.rect))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Merge Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Split the spanning cells of a grid rectangle into unit cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitTableCells {
    pub table_id: NodeId,
    pub rect: GridRect,
}

impl SplitTableCells {
    pub fn new(table_id: NodeId, rect: GridRect) -> Self {
        Self { table_id, rect }
    }
}

impl Command for SplitTableCells {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::split_cells(tree, self.table_id, self.rect))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Split Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// ToggleTableBorders Command
// =============================================================================

/// Show or hide the borders of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleTableBorders {
    pub table_id: NodeId,
}

impl ToggleTableBorders {
    pub fn new(table_id: NodeId) -> Self {
        Self { table_id }
    }
}

impl Command for ToggleTableBorders {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_table_edit(tree, selection, |tree| table_ops::toggle_borders(tree, self.table_id))
    }

    fn invert(&self, _tree: &DocumentTree) -> Box<dyn Command> {
        // Toggling is its own inverse
        Box::new(self.clone())
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Toggle Borders"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Cell Content Commands
// =============================================================================

/// Set or clear a mark on every run of the given cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleCellMark {
    pub keys: Vec<NodeId>,
    pub mark: Mark,
    pub enabled: bool,
}

impl ToggleCellMark {
    pub fn new(keys: Vec<NodeId>, mark: Mark, enabled: bool) -> Self {
        Self { keys, mark, enabled }
    }
}

impl Command for ToggleCellMark {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_edit(tree, selection, |tree| {
            Ok(apply_mark_to_cells(tree, &self.keys, &self.mark, self.enabled)? > 0)
        })
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    /// Repeated formatting of the same cells with the same kind of mark
    /// collapses into the latest one
    fn merge_with(&self, other: &dyn Command) -> Option<Box<dyn Command>> {
        let next = other.as_any().downcast_ref::<ToggleCellMark>()?;
        let same_kind = std::mem::discriminant(&self.mark) == std::mem::discriminant(&next.mark);
        (same_kind && self.keys == next.keys).then(|| next.clone_box())
    }

    fn display_name(&self) -> &str {
        "Format Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Empty the given cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCellContents {
    pub keys: Vec<NodeId>,
}

impl ClearCellContents {
    pub fn new(keys: Vec<NodeId>) -> Self {
        Self { keys }
    }
}

impl Command for ClearCellContents {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> Result<CommandResult> {
        run_edit(tree, selection, |tree| Ok(clear_cell_contents(tree, &self.keys)? > 0))
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        snapshot_inverse(tree)
    }

    fn transform_selection(&self, selection: &Selection) -> Selection {
        *selection
    }

    fn display_name(&self) -> &str {
        "Clear Cells"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
