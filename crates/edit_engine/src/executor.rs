//! Command execution engine

use crate::{
    first_caret, CellSelection, ClearCellContents, Command, EditError, EditorConfig, GridRect,
    InsertTable, MergeTableCells, RemoveTableColumns, RemoveTableRows, Result, SplitTableCells,
    TableGrid, ToggleCellMark, UndoManager,
};
use doc_model::{DocumentTree, Mark, Path, Selection};
use tracing::debug;

/// The main editing engine that manages document state and command execution
pub struct EditingEngine {
    /// Current document tree
    tree: DocumentTree,
    /// Current selection
    selection: Selection,
    /// Undo manager
    undo_manager: UndoManager,
    /// Editor settings
    config: EditorConfig,
    /// Cells painted by a drag across a table; never part of the document
    cell_selection: Option<CellSelection>,
}

impl EditingEngine {
    /// Create a new editing engine with an empty document
    pub fn new() -> Self {
        Self::with_tree(DocumentTree::with_empty_paragraph())
    }

    /// Create an editing engine with a specific document tree
    pub fn with_tree(tree: DocumentTree) -> Self {
        let config = EditorConfig::default();
        Self::build(tree, config)
    }

    /// Create an editing engine with custom settings
    pub fn with_config(tree: DocumentTree, config: EditorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(tree, config))
    }

    fn build(tree: DocumentTree, config: EditorConfig) -> Self {
        let selection = first_caret(&tree).unwrap_or_default();
        let undo_manager = UndoManager::with_limits(config.undo.max_entries, config.undo.batch_threshold());

        Self {
            tree,
            selection,
            undo_manager,
            config,
            cell_selection: None,
        }
    }

    /// Get the current document tree
    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Get the current selection
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Set the selection
    ///
    /// Any painted cell selection is dropped.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.cell_selection = None;
    }

    // =========================================================================
    // Cell Selection
    // =========================================================================

    /// Paint the cells between two tree addresses
    ///
    /// Both paths must land in cells of the same table; otherwise the painted
    /// selection is cleared and `None` returned.
    pub fn select_cells(&mut self, from: &Path, to: &Path) -> Option<&CellSelection> {
        self.cell_selection = self.paint_between(from, to);
        self.cell_selection.as_ref()
    }

    fn paint_between(&self, from: &Path, to: &Path) -> Option<CellSelection> {
        let from_table = self.tree.find_table_for_node(self.tree.node_at(from)?)?;
        let to_table = self.tree.find_table_for_node(self.tree.node_at(to)?)?;
        if from_table != to_table {
            return None;
        }
        let grid = TableGrid::build(&self.tree, from_table).ok()?;
        let rect = crate::resolve_range_in(&grid, from, to)?;
        Some(CellSelection::from_grid(&grid, rect))
    }

    /// Paint a grid rectangle of a table directly
    pub fn select_rect(&mut self, table_id: doc_model::NodeId, rect: GridRect) -> Option<&CellSelection> {
        self.cell_selection = CellSelection::paint(&self.tree, table_id, rect);
        self.cell_selection.as_ref()
    }

    pub fn cell_selection(&self) -> Option<&CellSelection> {
        self.cell_selection.as_ref()
    }

    pub fn clear_cell_selection(&mut self) {
        self.cell_selection = None;
    }

    /// Re-paint the cell selection against the current tree, clamped to the
    /// table's new bounds
    fn refresh_cell_selection(&mut self) {
        let Some(painted) = self.cell_selection.take() else {
            return;
        };
        let Ok(grid) = TableGrid::build(&self.tree, painted.table_id()) else {
            return;
        };
        if grid.row_count() == 0 || grid.column_count() == 0 {
            return;
        }
        let rect = painted.rect();
        let clamped = GridRect::new(
            rect.top.min(grid.row_count() - 1),
            rect.left.min(grid.column_count() - 1),
            rect.bottom.min(grid.row_count() - 1),
            rect.right.min(grid.column_count() - 1),
        );
        let repainted = CellSelection::from_grid(&grid, clamped);
        if !repainted.is_empty() {
            self.cell_selection = Some(repainted);
        }
    }

    fn painted(&self) -> Result<&CellSelection> {
        self.cell_selection.as_ref().ok_or(EditError::NoCellSelection)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute a command
    ///
    /// Returns whether the document changed. Unchanged results are not
    /// recorded for undo.
    pub fn execute(&mut self, command: Box<dyn Command>) -> Result<bool> {
        let result = command.apply(&self.tree, &self.selection)?;

        if !result.changed {
            debug!(command = command.display_name(), "command made no change");
            return Ok(false);
        }

        debug!(command = command.display_name(), "command applied");

        // Record for undo
        self.undo_manager.push(command, result.inverse);

        // Update state
        self.tree = result.tree;
        self.selection = result.selection;
        self.refresh_cell_selection();

        Ok(true)
    }

    /// Undo the last command
    pub fn undo(&mut self) -> Result<()> {
        let inverse = self.undo_manager.pop_undo()?;
        let result = inverse.apply(&self.tree, &self.selection)?;

        self.tree = result.tree;
        self.selection = result.selection;
        self.cell_selection = None;

        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self) -> Result<()> {
        let command = self.undo_manager.pop_redo()?;
        let result = command.apply(&self.tree, &self.selection)?;

        self.undo_manager.push_redone(command, result.inverse);
        self.tree = result.tree;
        self.selection = result.selection;
        self.cell_selection = None;

        Ok(())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.undo_manager.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.undo_manager.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_manager.undo_label()
    }

    // =========================================================================
    // Table Entry Points
    // =========================================================================

    /// Insert a table of the configured default size after the caret's block
    pub fn insert_table(&mut self) -> Result<bool> {
        let rows = self.config.table.default_rows;
        let columns = self.config.table.default_columns;
        self.execute(Box::new(InsertTable::new(rows, columns)))
    }

    /// Set or clear a mark on every painted cell
    pub fn apply_mark(&mut self, mark: Mark, enabled: bool) -> Result<bool> {
        let keys = self.painted()?.keys().to_vec();
        self.execute(Box::new(ToggleCellMark::new(keys, mark, enabled)))
    }

    /// Empty every painted cell
    pub fn clear_selected_cells(&mut self) -> Result<bool> {
        let keys = self.painted()?.keys().to_vec();
        self.execute(Box::new(ClearCellContents::new(keys)))
    }

    /// Merge the painted rectangle into one cell
    pub fn merge_selected_cells(&mut self) -> Result<bool> {
        let painted = self.painted()?;
        let command = MergeTableCells::new(painted.table_id(), painted.rect());
        self.execute(Box::new(command))
    }

    /// Split every spanning cell in the painted rectangle
    pub fn split_selected_cells(&mut self) -> Result<bool> {
        let painted = self.painted()?;
        let command = SplitTableCells::new(painted.table_id(), painted.rect());
        self.execute(Box::new(command))
    }

    /// Remove the rows the painted rectangle touches
    pub fn remove_selected_rows(&mut self) -> Result<bool> {
        let painted = self.painted()?;
        let command = RemoveTableRows::new(painted.table_id(), painted.rect());
        self.execute(Box::new(command))
    }

    /// Remove the columns the painted rectangle touches
    pub fn remove_selected_columns(&mut self) -> Result<bool> {
        let painted = self.painted()?;
        let command = RemoveTableColumns::new(painted.table_id(), painted.rect());
        self.execute(Box::new(command))
    }

    /// Whether backspace at the current selection must be swallowed
    pub fn blocks_delete_backward(&self) -> bool {
        crate::blocks_delete_backward(&self.tree, &self.selection)
    }
}

impl Default for EditingEngine {
    fn default() -> Self {
        Self::new()
    }
}
