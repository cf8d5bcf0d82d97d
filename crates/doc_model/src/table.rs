//! Table model - Tables, rows, cells, and cell content
//!
//! A table is a body-level block holding rows, rows hold cells, and every
//! cell holds exactly one [`TableContent`] wrapping its paragraphs. Spanning
//! is expressed with `row_span` and `grid_span` on the anchor cell only; the
//! positions a span covers have no node of their own. The 2-D grid view is
//! derived from this tree by the edit engine and never stored.

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

// =============================================================================
// Table
// =============================================================================

/// A table block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of the rows, top to bottom
    rows: Vec<NodeId>,
    /// Whether borders are hidden
    pub borderless: bool,
}

impl Table {
    /// Create a new table with no rows
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            rows: Vec::new(),
            borderless: false,
        }
    }

    /// Get the row IDs
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    /// Number of rows in the tree (not counting rows implied by spans)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Add a row at the end
    pub fn add_row(&mut self, row_id: NodeId) {
        self.rows.push(row_id);
    }

    /// Insert a row at `index`, clamped to the row count
    pub fn insert_row(&mut self, index: usize, row_id: NodeId) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row_id);
    }

    /// Remove a row by ID
    pub fn remove_row(&mut self, row_id: NodeId) -> bool {
        if let Some(pos) = self.rows.iter().position(|&id| id == row_id) {
            self.rows.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn row_index(&self, row_id: NodeId) -> Option<usize> {
        self.rows.iter().position(|&id| id == row_id)
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Table {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Table
    }

    fn children(&self) -> &[NodeId] {
        &self.rows
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

// =============================================================================
// Table Row
// =============================================================================

/// A row in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of the cells anchored in this row, left to right
    cells: Vec<NodeId>,
}

impl TableRow {
    /// Create a new empty row
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            cells: Vec::new(),
        }
    }

    /// Get the cell IDs
    pub fn cells(&self) -> &[NodeId] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Add a cell at the end
    pub fn add_cell(&mut self, cell_id: NodeId) {
        self.cells.push(cell_id);
    }

    /// Insert a cell at `index`, clamped to the cell count
    pub fn insert_cell(&mut self, index: usize, cell_id: NodeId) {
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell_id);
    }

    /// Remove a cell by ID
    pub fn remove_cell(&mut self, cell_id: NodeId) -> bool {
        if let Some(pos) = self.cells.iter().position(|&id| id == cell_id) {
            self.cells.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn cell_index(&self, cell_id: NodeId) -> Option<usize> {
        self.cells.iter().position(|&id| id == cell_id)
    }
}

impl Default for TableRow {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for TableRow {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableRow
    }

    fn children(&self) -> &[NodeId] {
        &self.cells
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

// =============================================================================
// Table Cell
// =============================================================================

/// A cell in a table row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    id: NodeId,
    parent: Option<NodeId>,
    /// The single content wrapper (empty only while the cell is being built)
    children: Vec<NodeId>,
    /// Number of grid columns this cell spans (colspan)
    pub grid_span: u32,
    /// Number of rows this cell spans (rowspan)
    pub row_span: u32,
    /// Rendered width in pixels, set by drag-resize
    pub width: Option<f32>,
    /// Rendered height in pixels, set by drag-resize
    pub height: Option<f32>,
}

impl TableCell {
    /// Create a new 1x1 cell
    pub fn new() -> Self {
        Self::spanning(1, 1)
    }

    /// Create a cell that spans both rows and columns
    pub fn spanning(grid_span: u32, row_span: u32) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            grid_span,
            row_span,
            width: None,
            height: None,
        }
    }

    /// The content wrapper of this cell
    pub fn content(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    /// Replace the content wrapper, returning the previous one
    pub fn set_content(&mut self, content_id: NodeId) -> Option<NodeId> {
        let previous = self.children.first().copied();
        self.children.clear();
        self.children.push(content_id);
        previous
    }

    pub(crate) fn clear_content(&mut self) -> Option<NodeId> {
        let previous = self.children.first().copied();
        self.children.clear();
        previous
    }

    /// Get effective grid span (at least 1)
    pub fn effective_grid_span(&self) -> u32 {
        self.grid_span.max(1)
    }

    /// Get effective row span (at least 1)
    pub fn effective_row_span(&self) -> u32 {
        self.row_span.max(1)
    }

    /// Whether this cell covers more than one grid position
    pub fn is_spanning(&self) -> bool {
        self.effective_grid_span() > 1 || self.effective_row_span() > 1
    }

    /// Drop the pixel sizes recorded by a resize
    pub fn clear_size(&mut self) {
        self.width = None;
        self.height = None;
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for TableCell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableCell
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

// =============================================================================
// Table Content
// =============================================================================

/// Wrapper holding a cell's blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableContent {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of the blocks (paragraphs or nested tables)
    children: Vec<NodeId>,
}

impl TableContent {
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Add a block at the end
    pub fn add_child(&mut self, child_id: NodeId) {
        self.children.push(child_id);
    }

    /// Insert a block at `index`, clamped to the block count
    pub fn insert_child(&mut self, index: usize, child_id: NodeId) {
        let index = index.min(self.children.len());
        self.children.insert(index, child_id);
    }

    /// Remove a block by ID
    pub fn remove_child(&mut self, child_id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|&id| id == child_id) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }
}

impl Default for TableContent {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for TableContent {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableContent
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

// =============================================================================
// Cell Spec
// =============================================================================

/// Shape of a cell to create: spans and optional initial text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSpec {
    pub row_span: u32,
    pub grid_span: u32,
    pub text: Option<String>,
}

impl CellSpec {
    /// An empty 1x1 cell
    pub fn unit() -> Self {
        Self {
            row_span: 1,
            grid_span: 1,
            text: None,
        }
    }

    pub fn spanning(row_span: u32, grid_span: u32) -> Self {
        Self {
            row_span,
            grid_span,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl Default for CellSpec {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_spans() {
        let mut cell = TableCell::spanning(0, 0);
        assert_eq!(cell.effective_grid_span(), 1);
        assert_eq!(cell.effective_row_span(), 1);
        assert!(!cell.is_spanning());

        cell.row_span = 2;
        assert!(cell.is_spanning());
    }

    #[test]
    fn test_cell_content_is_single() {
        let mut cell = TableCell::new();
        let first = NodeId::new();
        let second = NodeId::new();
        assert_eq!(cell.set_content(first), None);
        assert_eq!(cell.set_content(second), Some(first));
        assert_eq!(cell.children(), &[second]);
    }

    #[test]
    fn test_row_insert_clamps() {
        let mut row = TableRow::new();
        let a = NodeId::new();
        let b = NodeId::new();
        row.insert_cell(5, a);
        row.insert_cell(0, b);
        assert_eq!(row.cells(), &[b, a]);
        assert!(row.remove_cell(a));
        assert!(!row.remove_cell(a));
    }
}
