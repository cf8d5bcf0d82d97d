//! Document tree operations and storage

use crate::{
    CellSpec, Document, DocModelError, Node, NodeId, NodeType, Paragraph, Path, Result, Run,
    Selection, Table, TableCell, TableContent, TableRow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
    pub tables: HashMap<NodeId, Table>,
    pub table_rows: HashMap<NodeId, TableRow>,
    pub table_cells: HashMap<NodeId, TableCell>,
    pub table_contents: HashMap<NodeId, TableContent>,
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
}

impl DocumentTree {
    /// Create a new empty document tree
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
        }
    }

    /// Create a document tree with a single empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut tree = Self::new();
        let para = Paragraph::new();
        let para_id = para.id();
        tree.nodes.paragraphs.insert(para_id, para);
        tree.document.add_body_child(para_id);
        tree
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    /// Get a paragraph by ID
    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    /// Get a mutable paragraph by ID
    pub fn get_paragraph_mut(&mut self, id: NodeId) -> Option<&mut Paragraph> {
        self.nodes.paragraphs.get_mut(&id)
    }

    /// Get a run by ID
    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    /// Get a mutable run by ID
    pub fn get_run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.nodes.runs.get_mut(&id)
    }

    /// Get the node type for a given ID
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.node(id).map(|node| node.node_type())
    }

    /// Look up any node by ID
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        if id == self.document.id() {
            return Some(&self.document);
        }
        if let Some(para) = self.nodes.paragraphs.get(&id) {
            return Some(para);
        }
        if let Some(run) = self.nodes.runs.get(&id) {
            return Some(run);
        }
        if let Some(table) = self.nodes.tables.get(&id) {
            return Some(table);
        }
        if let Some(row) = self.nodes.table_rows.get(&id) {
            return Some(row);
        }
        if let Some(cell) = self.nodes.table_cells.get(&id) {
            return Some(cell);
        }
        if let Some(content) = self.nodes.table_contents.get(&id) {
            return Some(content);
        }
        None
    }

    /// Get the children of a node
    pub fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        self.node(id).map(|node| node.children())
    }

    /// Get the parent of a node
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent())
    }

    // =========================================================================
    // Path Addressing
    // =========================================================================

    /// Compute the path of a node from the root
    pub fn path_of(&self, id: NodeId) -> Option<Path> {
        let mut indexes = Vec::new();
        let mut current = id;
        while current != self.document.id() {
            let parent = self.parent_of(current)?;
            let index = self
                .children_of(parent)?
                .iter()
                .position(|&child| child == current)?;
            indexes.push(index);
            current = parent;
        }
        indexes.reverse();
        Some(Path::new(indexes))
    }

    /// Resolve a path to a node
    pub fn node_at(&self, path: &Path) -> Option<NodeId> {
        let mut current = self.document.id();
        for &index in path.as_slice() {
            current = *self.children_of(current)?.get(index)?;
        }
        Some(current)
    }

    /// Resolve a path to a node, failing with `InvalidPath`
    pub fn require_node_at(&self, path: &Path) -> Result<NodeId> {
        self.node_at(path)
            .ok_or_else(|| DocModelError::InvalidPath(path.clone()))
    }

    /// Depth-first scan of the subtree at `at`, the node itself included,
    /// returning every node accepted by `predicate` with its path.
    pub fn query_nodes<F>(&self, at: &Path, predicate: F) -> Vec<(NodeId, Path)>
    where
        F: Fn(NodeId, NodeType) -> bool,
    {
        let mut found = Vec::new();
        if let Some(start) = self.node_at(at) {
            self.collect_nodes(start, at.clone(), &predicate, &mut found);
        }
        found
    }

    fn collect_nodes<F>(&self, id: NodeId, path: Path, predicate: &F, found: &mut Vec<(NodeId, Path)>)
    where
        F: Fn(NodeId, NodeType) -> bool,
    {
        let Some(node) = self.node(id) else {
            return;
        };
        if predicate(id, node.node_type()) {
            found.push((id, path.clone()));
        }
        for (index, &child) in node.children().iter().enumerate() {
            self.collect_nodes(child, path.child(index), predicate, found);
        }
    }

    // =========================================================================
    // Paragraphs and Runs
    // =========================================================================

    /// Insert a paragraph into the body or into a cell content
    pub fn insert_paragraph(&mut self, mut para: Paragraph, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let para_id = para.id();
        para.set_parent(Some(parent_id));

        if parent_id == self.document.id() {
            match index {
                Some(idx) => self.document.insert_body_child(idx, para_id),
                None => self.document.add_body_child(para_id),
            }
        } else if let Some(content) = self.nodes.table_contents.get_mut(&parent_id) {
            match index {
                Some(idx) => content.insert_child(idx, para_id),
                None => content.add_child(para_id),
            }
        } else {
            return Err(DocModelError::InvalidOperation(
                "Paragraphs can only be children of the document or a cell content".into(),
            ));
        }

        self.nodes.paragraphs.insert(para_id, para);
        Ok(para_id)
    }

    /// Insert a run into a paragraph
    pub fn insert_run(&mut self, mut run: Run, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(para_id));

        let para = self.nodes.paragraphs.get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id))?;

        match index {
            Some(idx) => para.insert_child(idx, run_id),
            None => para.add_child(run_id),
        }

        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Remove a run from the tree
    pub fn remove_run(&mut self, run_id: NodeId) -> Result<Run> {
        let run = self.nodes.runs.remove(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id))?;

        if let Some(parent_id) = run.parent() {
            if let Some(para) = self.nodes.paragraphs.get_mut(&parent_id) {
                para.remove_child(run_id);
            }
        }

        Ok(run)
    }

    /// Remove a paragraph (and its runs) from the body or a cell content
    pub fn remove_paragraph(&mut self, para_id: NodeId) -> Result<Paragraph> {
        let para = self.nodes.paragraphs.remove(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id))?;

        for &child_id in para.children() {
            self.nodes.runs.remove(&child_id);
        }

        match para.parent() {
            Some(parent_id) if parent_id == self.document.id() => {
                self.document.remove_body_child(para_id);
            }
            Some(parent_id) => {
                if let Some(content) = self.nodes.table_contents.get_mut(&parent_id) {
                    content.remove_child(para_id);
                }
            }
            None => {}
        }

        Ok(para)
    }

    /// Iterate over body paragraphs in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.document.children()
            .iter()
            .filter_map(|id| self.nodes.paragraphs.get(id))
    }

    /// Concatenated text of the subtree rooted at `id`
    pub fn text_of(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.push_text(id, &mut text);
        text
    }

    fn push_text(&self, id: NodeId, text: &mut String) {
        if let Some(run) = self.nodes.runs.get(&id) {
            text.push_str(&run.text);
            return;
        }
        if let Some(children) = self.children_of(id) {
            for &child in children {
                self.push_text(child, text);
            }
        }
    }

    /// Whether the subtree rooted at `id` holds no text
    pub fn is_text_empty(&self, id: NodeId) -> bool {
        if let Some(run) = self.nodes.runs.get(&id) {
            return run.text.is_empty();
        }
        self.children_of(id)
            .map(|children| children.iter().all(|&child| self.is_text_empty(child)))
            .unwrap_or(true)
    }

    /// Get the total text content of the document, one line per body block
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        for &block in self.document.children() {
            result.push_str(&self.text_of(block));
            result.push('\n');
        }
        result
    }

    // =========================================================================
    // Table Methods
    // =========================================================================

    /// Get a table by ID
    pub fn get_table(&self, id: NodeId) -> Option<&Table> {
        self.nodes.tables.get(&id)
    }

    /// Get a mutable table by ID
    pub fn get_table_mut(&mut self, id: NodeId) -> Option<&mut Table> {
        self.nodes.tables.get_mut(&id)
    }

    /// Get a table row by ID
    pub fn get_table_row(&self, id: NodeId) -> Option<&TableRow> {
        self.nodes.table_rows.get(&id)
    }

    /// Get a mutable table row by ID
    pub fn get_table_row_mut(&mut self, id: NodeId) -> Option<&mut TableRow> {
        self.nodes.table_rows.get_mut(&id)
    }

    /// Get a table cell by ID
    pub fn get_table_cell(&self, id: NodeId) -> Option<&TableCell> {
        self.nodes.table_cells.get(&id)
    }

    /// Get a mutable table cell by ID
    pub fn get_table_cell_mut(&mut self, id: NodeId) -> Option<&mut TableCell> {
        self.nodes.table_cells.get_mut(&id)
    }

    /// Get a cell content wrapper by ID
    pub fn get_table_content(&self, id: NodeId) -> Option<&TableContent> {
        self.nodes.table_contents.get(&id)
    }

    /// Insert a table into the document body
    pub fn insert_table(&mut self, mut table: Table, index: Option<usize>) -> Result<NodeId> {
        let table_id = table.id();
        table.set_parent(Some(self.document.id()));

        match index {
            Some(idx) => self.document.insert_body_child(idx, table_id),
            None => self.document.add_body_child(table_id),
        }

        self.nodes.tables.insert(table_id, table);
        Ok(table_id)
    }

    /// Insert a row into a table
    pub fn insert_table_row(&mut self, mut row: TableRow, table_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let row_id = row.id();
        row.set_parent(Some(table_id));

        let table = self.nodes.tables.get_mut(&table_id)
            .ok_or(DocModelError::NodeNotFound(table_id))?;

        match index {
            Some(idx) => table.insert_row(idx, row_id),
            None => table.add_row(row_id),
        }

        self.nodes.table_rows.insert(row_id, row);
        Ok(row_id)
    }

    /// Insert a cell into a row
    pub fn insert_table_cell(&mut self, mut cell: TableCell, row_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let cell_id = cell.id();
        cell.set_parent(Some(row_id));

        let row = self.nodes.table_rows.get_mut(&row_id)
            .ok_or(DocModelError::NodeNotFound(row_id))?;

        match index {
            Some(idx) => row.insert_cell(idx, cell_id),
            None => row.add_cell(cell_id),
        }

        self.nodes.table_cells.insert(cell_id, cell);
        Ok(cell_id)
    }

    /// Build a `rows` x `columns` table of empty unit cells in the body
    pub fn create_table(&mut self, index: Option<usize>, rows: usize, columns: usize) -> Result<NodeId> {
        if rows == 0 || columns == 0 {
            return Err(DocModelError::InvalidOperation(format!(
                "Cannot create a {}x{} table",
                rows, columns
            )));
        }

        let table_id = self.insert_table(Table::new(), index)?;
        let specs = vec![CellSpec::unit(); columns];
        for _ in 0..rows {
            self.create_table_row(table_id, None, &specs)?;
        }
        Ok(table_id)
    }

    /// Build a row holding one new cell per spec
    pub fn create_table_row(&mut self, table_id: NodeId, index: Option<usize>, cells: &[CellSpec]) -> Result<NodeId> {
        let row_id = self.insert_table_row(TableRow::new(), table_id, index)?;
        for spec in cells {
            self.create_table_cell(row_id, None, spec)?;
        }
        Ok(row_id)
    }

    /// Build a cell with its content wrapper and one paragraph
    pub fn create_table_cell(&mut self, row_id: NodeId, index: Option<usize>, spec: &CellSpec) -> Result<NodeId> {
        let cell = TableCell::spanning(spec.grid_span.max(1), spec.row_span.max(1));
        let cell_id = self.insert_table_cell(cell, row_id, index)?;
        let content_id = self.attach_content(cell_id)?;
        let para_id = self.insert_paragraph(Paragraph::new(), content_id, None)?;
        if let Some(text) = &spec.text {
            self.insert_run(Run::new(text.clone()), para_id, None)?;
        }
        Ok(cell_id)
    }

    fn attach_content(&mut self, cell_id: NodeId) -> Result<NodeId> {
        let mut content = TableContent::new();
        let content_id = content.id();
        content.set_parent(Some(cell_id));

        let cell = self.nodes.table_cells.get_mut(&cell_id)
            .ok_or(DocModelError::NodeNotFound(cell_id))?;
        cell.set_content(content_id);

        self.nodes.table_contents.insert(content_id, content);
        Ok(content_id)
    }

    /// Get the content wrapper of a cell
    pub fn cell_content(&self, cell_id: NodeId) -> Result<NodeId> {
        let cell = self.nodes.table_cells.get(&cell_id)
            .ok_or(DocModelError::NodeNotFound(cell_id))?;
        cell.content().ok_or_else(|| {
            DocModelError::TreeStructureError(format!("Cell {} has no content", cell_id))
        })
    }

    /// Get the blocks held by a cell
    pub fn cell_blocks(&self, cell_id: NodeId) -> Result<Vec<NodeId>> {
        let content_id = self.cell_content(cell_id)?;
        let content = self.nodes.table_contents.get(&content_id)
            .ok_or(DocModelError::NodeNotFound(content_id))?;
        Ok(content.children().to_vec())
    }

    /// Move every block of `from_cell` to the end of `to_cell`
    ///
    /// `from_cell` is left with an empty content wrapper.
    pub fn move_blocks(&mut self, from_cell: NodeId, to_cell: NodeId) -> Result<()> {
        let from_content = self.cell_content(from_cell)?;
        let to_content = self.cell_content(to_cell)?;
        if from_content == to_content {
            return Ok(());
        }

        let blocks = self.cell_blocks(from_cell)?;
        if let Some(content) = self.nodes.table_contents.get_mut(&from_content) {
            for &block in &blocks {
                content.remove_child(block);
            }
        }

        let target = self.nodes.table_contents.get_mut(&to_content)
            .ok_or(DocModelError::NodeNotFound(to_content))?;
        for &block in &blocks {
            target.add_child(block);
        }
        for &block in &blocks {
            if let Some(para) = self.nodes.paragraphs.get_mut(&block) {
                para.set_parent(Some(to_content));
            }
        }
        Ok(())
    }

    /// Remove every block of a cell, keeping its content wrapper
    pub fn clear_cell_blocks(&mut self, cell_id: NodeId) -> Result<()> {
        for block in self.cell_blocks(cell_id)? {
            self.remove_paragraph(block)?;
        }
        Ok(())
    }

    /// Restore an empty paragraph into a cell left without blocks
    ///
    /// Returns true when a paragraph was added.
    pub fn normalize_cell_content(&mut self, cell_id: NodeId) -> Result<bool> {
        let content_id = match self.cell_content(cell_id) {
            Ok(id) => id,
            Err(DocModelError::TreeStructureError(_)) => self.attach_content(cell_id)?,
            Err(err) => return Err(err),
        };
        if self.cell_blocks(cell_id)?.is_empty() {
            self.insert_paragraph(Paragraph::new(), content_id, None)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Replace a cell's content with a fresh one holding an empty paragraph
    pub fn reset_cell_content(&mut self, cell_id: NodeId) -> Result<NodeId> {
        if !self.nodes.table_cells.contains_key(&cell_id) {
            return Err(DocModelError::NodeNotFound(cell_id));
        }
        self.remove_cell_contents(cell_id);
        let content_id = self.attach_content(cell_id)?;
        self.insert_paragraph(Paragraph::new(), content_id, None)?;
        Ok(content_id)
    }

    /// Remove a table from the document
    pub fn remove_table(&mut self, table_id: NodeId) -> Result<Table> {
        let table = self.nodes.tables.remove(&table_id)
            .ok_or(DocModelError::NodeNotFound(table_id))?;

        for &row_id in table.children() {
            self.remove_table_row_contents(row_id);
        }

        self.document.remove_body_child(table_id);

        Ok(table)
    }

    /// Remove a row (and its cells) from a table
    pub fn remove_table_row(&mut self, row_id: NodeId) -> Result<TableRow> {
        let row = self.nodes.table_rows.remove(&row_id)
            .ok_or(DocModelError::NodeNotFound(row_id))?;

        for &cell_id in row.children() {
            self.remove_table_cell_contents(cell_id);
        }

        if let Some(parent_id) = row.parent() {
            if let Some(table) = self.nodes.tables.get_mut(&parent_id) {
                table.remove_row(row_id);
            }
        }

        Ok(row)
    }

    /// Remove a cell (and its content) from a row
    pub fn remove_table_cell(&mut self, cell_id: NodeId) -> Result<TableCell> {
        if !self.nodes.table_cells.contains_key(&cell_id) {
            return Err(DocModelError::NodeNotFound(cell_id));
        }
        self.remove_cell_contents(cell_id);
        let cell = self.nodes.table_cells.remove(&cell_id)
            .ok_or(DocModelError::NodeNotFound(cell_id))?;

        if let Some(parent_id) = cell.parent() {
            if let Some(row) = self.nodes.table_rows.get_mut(&parent_id) {
                row.remove_cell(cell_id);
            }
        }

        Ok(cell)
    }

    /// Internal helper to remove row contents
    fn remove_table_row_contents(&mut self, row_id: NodeId) {
        if let Some(row) = self.nodes.table_rows.remove(&row_id) {
            for &cell_id in row.children() {
                self.remove_table_cell_contents(cell_id);
            }
        }
    }

    /// Internal helper to remove a cell and everything below it
    fn remove_table_cell_contents(&mut self, cell_id: NodeId) {
        self.remove_cell_contents(cell_id);
        self.nodes.table_cells.remove(&cell_id);
    }

    /// Drop the content wrapper of a cell with its paragraphs and runs
    fn remove_cell_contents(&mut self, cell_id: NodeId) {
        let Some(content_id) = self.nodes.table_cells.get_mut(&cell_id).and_then(|c| c.clear_content()) else {
            return;
        };
        if let Some(content) = self.nodes.table_contents.remove(&content_id) {
            for &block_id in content.children() {
                if let Some(para) = self.nodes.paragraphs.remove(&block_id) {
                    for &run_id in para.children() {
                        self.nodes.runs.remove(&run_id);
                    }
                }
            }
        }
    }

    /// Get all tables in the document
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.document.children()
            .iter()
            .filter_map(|id| self.nodes.tables.get(id))
    }

    /// Find the table containing a node
    pub fn find_table_for_node(&self, node_id: NodeId) -> Option<NodeId> {
        self.find_ancestor_of_type(node_id, NodeType::Table)
    }

    /// Find the cell containing a node
    pub fn find_cell_for_node(&self, node_id: NodeId) -> Option<NodeId> {
        self.find_ancestor_of_type(node_id, NodeType::TableCell)
    }

    fn find_ancestor_of_type(&self, node_id: NodeId, node_type: NodeType) -> Option<NodeId> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if self.node_type(id)? == node_type {
                return Some(id);
            }
            current = self.parent_of(id);
        }
        None
    }

    /// The table holding both ends of a selection, if they share one
    pub fn table_for_selection(&self, selection: &Selection) -> Option<NodeId> {
        let anchor_table = self.find_table_for_node(selection.anchor.node_id)?;
        let focus_table = self.find_table_for_node(selection.focus.node_id)?;
        (anchor_table == focus_table).then_some(anchor_table)
    }

    // =========================================================================
    // Body Normalization
    // =========================================================================

    /// Make sure the body holds at least one block
    pub fn ensure_body_not_empty(&mut self) -> Result<Option<NodeId>> {
        if !self.document.children().is_empty() {
            return Ok(None);
        }
        let root = self.document.id();
        self.insert_paragraph(Paragraph::new(), root, None).map(Some)
    }

    /// Insert empty paragraphs so that no table is the first or last body
    /// block or directly follows another table
    ///
    /// Returns the number of paragraphs inserted.
    pub fn normalize_table_spacing(&mut self) -> Result<usize> {
        let root = self.document.id();
        let mut inserted = 0;
        let mut index = 0;
        let mut previous_was_table = true;

        while index < self.document.children().len() {
            let block = self.document.children()[index];
            let is_table = self.nodes.tables.contains_key(&block);
            if is_table && previous_was_table {
                self.insert_paragraph(Paragraph::new(), root, Some(index))?;
                inserted += 1;
                index += 1;
            }
            previous_was_table = is_table;
            index += 1;
        }

        if previous_was_table {
            self.insert_paragraph(Paragraph::new(), root, None)?;
            inserted += 1;
        }

        Ok(inserted)
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_table(rows: usize, columns: usize) -> (DocumentTree, NodeId) {
        let mut tree = DocumentTree::with_empty_paragraph();
        let table_id = tree.create_table(Some(1), rows, columns).unwrap();
        (tree, table_id)
    }

    #[test]
    fn test_create_table_shape() {
        let (tree, table_id) = tree_with_table(2, 3);
        let table = tree.get_table(table_id).unwrap();
        assert_eq!(table.row_count(), 2);
        for &row_id in table.rows() {
            let row = tree.get_table_row(row_id).unwrap();
            assert_eq!(row.cell_count(), 3);
            for &cell_id in row.cells() {
                assert_eq!(tree.cell_blocks(cell_id).unwrap().len(), 1);
                assert!(tree.is_text_empty(cell_id));
            }
        }
    }

    #[test]
    fn test_create_table_rejects_zero() {
        let mut tree = DocumentTree::new();
        assert!(tree.create_table(None, 0, 3).is_err());
    }

    #[test]
    fn test_paths_round_trip() {
        let (tree, table_id) = tree_with_table(2, 2);
        assert_eq!(tree.path_of(table_id), Some(Path::from(vec![1])));

        let row_id = tree.get_table(table_id).unwrap().rows()[1];
        let cell_id = tree.get_table_row(row_id).unwrap().cells()[0];
        let path = tree.path_of(cell_id).unwrap();
        assert_eq!(path, Path::from(vec![1, 1, 0]));
        assert_eq!(tree.node_at(&path), Some(cell_id));
        assert_eq!(tree.node_at(&Path::from(vec![1, 5])), None);
        assert!(tree.require_node_at(&Path::from(vec![9])).is_err());
    }

    #[test]
    fn test_query_nodes_finds_cells_in_order() {
        let (tree, _) = tree_with_table(2, 2);
        let cells = tree.query_nodes(&Path::from(vec![1]), |_, ty| ty == NodeType::TableCell);
        let paths: Vec<_> = cells.into_iter().map(|(_, path)| path).collect();
        assert_eq!(
            paths,
            vec![
                Path::from(vec![1, 0, 0]),
                Path::from(vec![1, 0, 1]),
                Path::from(vec![1, 1, 0]),
                Path::from(vec![1, 1, 1]),
            ]
        );
    }

    #[test]
    fn test_text_and_emptiness() {
        let mut tree = DocumentTree::new();
        let table_id = tree.create_table(None, 1, 1).unwrap();
        let row_id = tree.get_table(table_id).unwrap().rows()[0];
        let cell_id = tree
            .create_table_cell(row_id, None, &CellSpec::unit().with_text("hi"))
            .unwrap();
        assert_eq!(tree.text_of(cell_id), "hi");
        assert!(!tree.is_text_empty(cell_id));
        assert!(!tree.is_text_empty(table_id));
    }

    #[test]
    fn test_move_blocks_reparents() {
        let mut tree = DocumentTree::new();
        let table_id = tree.create_table(None, 1, 1).unwrap();
        let row_id = tree.get_table(table_id).unwrap().rows()[0];
        let target = tree.get_table_row(row_id).unwrap().cells()[0];
        let source = tree
            .create_table_cell(row_id, None, &CellSpec::unit().with_text("moved"))
            .unwrap();

        tree.move_blocks(source, target).unwrap();
        assert!(tree.cell_blocks(source).unwrap().is_empty());

        let blocks = tree.cell_blocks(target).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(tree.find_cell_for_node(blocks[1]), Some(target));
        assert_eq!(tree.text_of(target), "moved");
    }

    #[test]
    fn test_reset_and_normalize_cell_content() {
        let mut tree = DocumentTree::new();
        let table_id = tree.create_table(None, 1, 1).unwrap();
        let row_id = tree.get_table(table_id).unwrap().rows()[0];
        let cell_id = tree
            .create_table_cell(row_id, None, &CellSpec::unit().with_text("old"))
            .unwrap();
        let old_content = tree.cell_content(cell_id).unwrap();
        let run_count = tree.nodes.runs.len();

        tree.reset_cell_content(cell_id).unwrap();
        assert!(tree.is_text_empty(cell_id));
        assert!(tree.get_table_content(old_content).is_none());
        assert_eq!(tree.nodes.runs.len(), run_count - 1);

        tree.clear_cell_blocks(cell_id).unwrap();
        assert!(tree.normalize_cell_content(cell_id).unwrap());
        assert!(!tree.normalize_cell_content(cell_id).unwrap());
    }

    #[test]
    fn test_remove_table_drops_descendants() {
        let (mut tree, table_id) = tree_with_table(2, 2);
        tree.remove_table(table_id).unwrap();
        assert!(tree.nodes.tables.is_empty());
        assert!(tree.nodes.table_rows.is_empty());
        assert!(tree.nodes.table_cells.is_empty());
        assert!(tree.nodes.table_contents.is_empty());
        assert_eq!(tree.nodes.paragraphs.len(), 1);
    }

    #[test]
    fn test_table_for_selection() {
        let (mut tree, first) = tree_with_table(1, 2);
        let second = tree.create_table(None, 1, 1).unwrap();
        let para_in = |tree: &DocumentTree, table: NodeId| {
            let row = tree.get_table(table).unwrap().rows()[0];
            let cell = tree.get_table_row(row).unwrap().cells()[0];
            tree.cell_blocks(cell).unwrap()[0]
        };
        let a = para_in(&tree, first);
        let b = para_in(&tree, second);

        let same = Selection::collapsed(crate::Position::start_of(a));
        assert_eq!(tree.table_for_selection(&same), Some(first));

        let across = Selection::new(crate::Position::start_of(a), crate::Position::start_of(b));
        assert_eq!(tree.table_for_selection(&across), None);
    }

    #[test]
    fn test_normalize_table_spacing() {
        let mut tree = DocumentTree::new();
        tree.create_table(None, 1, 1).unwrap();
        tree.create_table(None, 1, 1).unwrap();

        let inserted = tree.normalize_table_spacing().unwrap();
        assert_eq!(inserted, 3);

        let kinds: Vec<_> = tree
            .document
            .children()
            .iter()
            .map(|&id| tree.node_type(id).unwrap())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::Paragraph,
                NodeType::Table,
                NodeType::Paragraph,
                NodeType::Table,
                NodeType::Paragraph,
            ]
        );
        assert_eq!(tree.normalize_table_spacing().unwrap(), 0);
    }

    #[test]
    fn test_ensure_body_not_empty() {
        let mut tree = DocumentTree::new();
        assert!(tree.ensure_body_not_empty().unwrap().is_some());
        assert!(tree.ensure_body_not_empty().unwrap().is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let (tree, table_id) = tree_with_table(2, 2);
        let json = serde_json::to_string(&tree).unwrap();
        let restored: DocumentTree = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get_table(table_id).unwrap().row_count(), 2);
        assert_eq!(restored.path_of(table_id), tree.path_of(table_id));
    }
}
