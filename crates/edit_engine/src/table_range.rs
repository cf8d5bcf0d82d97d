//! Resolving tree addresses to grid rectangles

use crate::TableGrid;
use doc_model::{DocumentTree, NodeId, Path, Selection};
use serde::{Deserialize, Serialize};

/// An inclusive rectangle of grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl GridRect {
    /// Rectangle spanning two corners given in any order
    pub fn new(row_a: usize, col_a: usize, row_b: usize, col_b: usize) -> Self {
        Self {
            top: row_a.min(row_b),
            left: col_a.min(col_b),
            bottom: row_a.max(row_b),
            right: col_a.max(col_b),
        }
    }

    /// A single position
    pub fn single(row: usize, col: usize) -> Self {
        Self::new(row, col, row, col)
    }

    pub fn height(&self) -> usize {
        self.bottom - self.top + 1
    }

    pub fn width(&self) -> usize {
        self.right - self.left + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.top..=self.bottom).contains(&row) && (self.left..=self.right).contains(&col)
    }

    /// Whether the two rectangles share at least one position
    pub fn intersects(&self, other: &GridRect) -> bool {
        self.top <= other.bottom
            && other.top <= self.bottom
            && self.left <= other.right
            && other.left <= self.right
    }

    /// Smallest rectangle holding both
    pub fn union(&self, other: &GridRect) -> GridRect {
        GridRect {
            top: self.top.min(other.top),
            left: self.left.min(other.left),
            bottom: self.bottom.max(other.bottom),
            right: self.right.max(other.right),
        }
    }

    /// The same rows across every column of the grid
    pub fn full_rows(&self, grid: &TableGrid) -> GridRect {
        GridRect {
            top: self.top,
            left: 0,
            bottom: self.bottom,
            right: grid.column_count().saturating_sub(1),
        }
    }

    /// The same columns across every row of the grid
    pub fn full_columns(&self, grid: &TableGrid) -> GridRect {
        GridRect {
            top: 0,
            left: self.left,
            bottom: grid.row_count().saturating_sub(1),
            right: self.right,
        }
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.top..=self.bottom).flat_map(move |row| (self.left..=self.right).map(move |col| (row, col)))
    }
}

/// Resolve two tree addresses inside a table to the rectangle between their cells
///
/// Each path may point at a cell or anything inside one. Returns `None` when
/// either path does not land in a cell of the table.
pub fn resolve_range(tree: &DocumentTree, table_id: NodeId, from: &Path, to: &Path) -> Option<GridRect> {
    let grid = TableGrid::build(tree, table_id).ok()?;
    resolve_range_in(&grid, from, to)
}

/// [`resolve_range`] against an already built grid
pub fn resolve_range_in(grid: &TableGrid, from: &Path, to: &Path) -> Option<GridRect> {
    let head = anchor_for_path(grid, from)?;
    let tail = anchor_for_path(grid, to)?;
    Some(GridRect::new(head.0, head.1, tail.0, tail.1))
}

/// Resolve a text selection whose ends sit in cells of the table
pub fn resolve_selection(tree: &DocumentTree, table_id: NodeId, selection: &Selection) -> Option<GridRect> {
    let from = tree.path_of(selection.anchor.node_id)?;
    let to = tree.path_of(selection.focus.node_id)?;
    resolve_range(tree, table_id, &from, &to)
}

fn anchor_for_path(grid: &TableGrid, path: &Path) -> Option<(usize, usize)> {
    let cell_depth = grid.table_path().len() + 2;
    if path.len() < cell_depth || !path.is_within(grid.table_path()) {
        return None;
    }
    let cell = grid.real_cell_at_path(&path.truncated(cell_depth))?;
    Some((cell.anchor_row, cell.anchor_col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{CellSpec, Position, Table};

    #[test]
    fn test_rect_geometry() {
        let rect = GridRect::new(2, 3, 0, 1);
        assert_eq!(rect, GridRect { top: 0, left: 1, bottom: 2, right: 3 });
        assert_eq!(rect.height(), 3);
        assert_eq!(rect.width(), 3);
        assert!(rect.contains(1, 2));
        assert!(!rect.contains(1, 0));
        assert!(rect.intersects(&GridRect::single(2, 3)));
        assert!(!rect.intersects(&GridRect::single(3, 3)));
        assert_eq!(rect.positions().count(), 9);
        assert_eq!(rect.positions().next(), Some((0, 1)));
    }

    #[test]
    fn test_resolve_from_descendant_paths() {
        let mut tree = DocumentTree::with_empty_paragraph();
        let table_id = tree.create_table(None, 3, 3).unwrap();

        // Paragraph inside cell (2, 0) and the cell (0, 2) itself
        let from = Path::from(vec![1, 2, 0, 0, 0]);
        let to = Path::from(vec![1, 0, 2]);
        let rect = resolve_range(&tree, table_id, &from, &to).unwrap();
        assert_eq!(rect, GridRect::new(0, 0, 2, 2));
    }

    #[test]
    fn test_resolve_uses_grid_columns() {
        let mut tree = DocumentTree::new();
        let table_id = tree.insert_table(Table::new(), None).unwrap();
        tree.create_table_row(table_id, None, &[CellSpec::spanning(1, 2), CellSpec::unit()])
            .unwrap();
        tree.create_table_row(table_id, None, &[CellSpec::unit(), CellSpec::unit(), CellSpec::unit()])
            .unwrap();

        // Second tree cell of row 0 sits at grid column 2
        let rect = resolve_range(&tree, table_id, &Path::from(vec![0, 0, 1]), &Path::from(vec![0, 1, 1]))
            .unwrap();
        assert_eq!(rect, GridRect::new(0, 1, 1, 2));
    }

    #[test]
    fn test_paths_outside_table() {
        let mut tree = DocumentTree::with_empty_paragraph();
        let table_id = tree.create_table(None, 2, 2).unwrap();
        assert!(resolve_range(&tree, table_id, &Path::from(vec![0]), &Path::from(vec![1, 0, 0])).is_none());
        assert!(resolve_range(&tree, table_id, &Path::from(vec![1, 0]), &Path::from(vec![1, 0, 0])).is_none());
        assert!(resolve_range(&tree, table_id, &Path::from(vec![1, 9, 0]), &Path::from(vec![1, 0, 0])).is_none());
    }

    #[test]
    fn test_resolve_selection() {
        let mut tree = DocumentTree::with_empty_paragraph();
        let table_id = tree.create_table(None, 2, 2).unwrap();
        let para_at = |tree: &DocumentTree, row: usize, col: usize| {
            tree.node_at(&Path::from(vec![1, row, col, 0, 0])).unwrap()
        };
        let selection = Selection::new(
            Position::start_of(para_at(&tree, 1, 1)),
            Position::start_of(para_at(&tree, 0, 1)),
        );
        assert_eq!(
            resolve_selection(&tree, table_id, &selection),
            Some(GridRect::new(0, 1, 1, 1))
        );
    }
}
