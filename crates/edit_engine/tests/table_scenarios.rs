//! Integration tests for table grid editing
//!
//! These tests drive the structural edits the way a host editor would:
//! build a table, resolve cells through the grid, run commands through the
//! engine, and check that the grid stays rectangular with every position
//! owned by exactly one real cell.

use doc_model::{CellSpec, DocumentTree, Node, NodeId, Run};
use edit_engine::table_ops::{
    insert_column_right, insert_row_above, insert_row_below, merge_cells, remove_columns,
    remove_rows, split_cells,
};
use edit_engine::{
    EditingEngine, GridRect, InsertTableRow, MergeTableCells, SplitTableCells, TableEditOutcome,
    TableGrid,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn table(rows: usize, columns: usize) -> (DocumentTree, NodeId) {
    init_tracing();
    let mut tree = DocumentTree::with_empty_paragraph();
    let table_id = tree.create_table(None, rows, columns).unwrap();
    (tree, table_id)
}

fn grid(tree: &DocumentTree, table_id: NodeId) -> TableGrid {
    let grid = TableGrid::build(tree, table_id).unwrap();
    assert!(grid.has_full_coverage(), "broken grid: {:?}", grid.rows());
    grid
}

fn key_at(tree: &DocumentTree, table_id: NodeId, row: usize, col: usize) -> NodeId {
    grid(tree, table_id).cell_at(row, col).unwrap().key
}

fn write(tree: &mut DocumentTree, key: NodeId, text: &str) {
    let para = tree.cell_blocks(key).unwrap()[0];
    tree.insert_run(Run::new(text), para, None).unwrap();
}

fn spans(grid: &TableGrid) -> Vec<(usize, usize, usize, usize)> {
    grid.real_cells()
        .map(|cell| (cell.anchor_row, cell.anchor_col, cell.row_span, cell.col_span))
        .collect()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn insert_row_below_plain_table() {
    let (mut tree, table_id) = table(3, 3);
    let anchor = key_at(&tree, table_id, 0, 0);

    let outcome = insert_row_below(&mut tree, table_id, anchor).unwrap();
    assert_eq!(outcome, TableEditOutcome::Applied);

    let grid = grid(&tree, table_id);
    assert_eq!((grid.row_count(), grid.column_count()), (4, 3));
    let new_row = (0..3).map(|col| grid.cell_at(1, col).unwrap()).collect::<Vec<_>>();
    assert!(new_row.iter().all(|cell| cell.is_real && !cell.is_spanning()));
}

#[test]
fn merge_square_keeps_grid_shape() {
    let (mut tree, table_id) = table(3, 3);

    let outcome = merge_cells(&mut tree, table_id, GridRect::new(0, 0, 1, 1)).unwrap();
    assert!(outcome.is_applied());

    let grid = grid(&tree, table_id);
    assert_eq!((grid.row_count(), grid.column_count()), (3, 3));
    let top_left = grid.cell_at(0, 0).unwrap();
    assert_eq!((top_left.row_span, top_left.col_span), (2, 2));
    assert_eq!(grid.positions().filter(|cell| !cell.is_real).count(), 3);
}

#[test]
fn split_merged_cell_restores_units() {
    let (mut tree, table_id) = table(3, 3);
    let survivor = key_at(&tree, table_id, 0, 0);
    write(&mut tree, survivor, "kept");
    merge_cells(&mut tree, table_id, GridRect::new(0, 0, 1, 1)).unwrap();

    let outcome = split_cells(&mut tree, table_id, GridRect::single(1, 1)).unwrap();
    assert!(outcome.is_applied());

    let grid = grid(&tree, table_id);
    assert_eq!(grid.real_cells().count(), 9);
    let with_text: Vec<NodeId> = grid
        .real_cells()
        .filter(|cell| !tree.is_text_empty(cell.key))
        .map(|cell| cell.key)
        .collect();
    assert_eq!(with_text, vec![survivor]);
}

#[test]
fn remove_column_through_wide_cell() {
    let (mut tree, table_id) = table(2, 3);
    merge_cells(&mut tree, table_id, GridRect::new(0, 0, 0, 1)).unwrap();
    assert_eq!(grid(&tree, table_id).cell_at(0, 0).unwrap().col_span, 2);

    let outcome = remove_columns(&mut tree, table_id, GridRect::single(0, 1)).unwrap();
    assert!(outcome.is_applied());

    let grid = grid(&tree, table_id);
    assert_eq!((grid.row_count(), grid.column_count()), (2, 2));
    assert!(grid.real_cells().all(|cell| cell.col_span == 1 && cell.row_span == 1));
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn insert_above_then_remove_restores_shape() {
    let (mut tree, table_id) = table(3, 3);
    merge_cells(&mut tree, table_id, GridRect::new(1, 0, 2, 0)).unwrap();
    let before = spans(&grid(&tree, table_id));

    let anchor = key_at(&tree, table_id, 0, 1);
    insert_row_above(&mut tree, table_id, anchor).unwrap();
    assert_eq!(grid(&tree, table_id).row_count(), 4);

    remove_rows(&mut tree, table_id, GridRect::single(0, 0)).unwrap();
    assert_eq!(spans(&grid(&tree, table_id)), before);
}

#[test]
fn removing_every_row_deletes_table() {
    let (mut tree, table_id) = table(2, 2);
    remove_rows(&mut tree, table_id, GridRect::single(1, 0)).unwrap();
    assert!(tree.get_table(table_id).is_some());

    remove_rows(&mut tree, table_id, GridRect::single(0, 1)).unwrap();
    assert!(tree.get_table(table_id).is_none());
    assert!(tree.nodes.table_cells.is_empty());
    assert!(!tree.document.children().is_empty());
}

#[test]
fn column_insert_next_to_tall_cell() {
    let mut tree = DocumentTree::with_empty_paragraph();
    let table_id = tree.create_table(None, 1, 2).unwrap();
    let row_id = tree.get_table(table_id).unwrap().rows()[0];
    let first = tree.get_table_row(row_id).unwrap().cells()[0];
    tree.get_table_cell_mut(first).unwrap().row_span = 2;
    tree.create_table_row(table_id, None, &[CellSpec::unit()]).unwrap();
    assert_eq!(grid(&tree, table_id).row_count(), 2);

    insert_column_right(&mut tree, table_id, first).unwrap();
    let grid = grid(&tree, table_id);
    assert_eq!(grid.column_count(), 3);
    let added = grid.cell_at(0, 1).unwrap();
    assert!(added.is_real);
    assert_eq!(added.row_span, 2);
}

// =============================================================================
// Engine
// =============================================================================

#[test]
fn engine_undo_redo_structural_edits() {
    init_tracing();
    let mut engine = EditingEngine::new();
    engine.insert_table().unwrap();
    let table_id = engine.tree().tables().next().unwrap().id();
    let anchor = key_at(engine.tree(), table_id, 2, 2);

    assert!(engine.execute(Box::new(InsertTableRow::below(table_id, anchor))).unwrap());
    assert!(engine
        .execute(Box::new(MergeTableCells::new(table_id, GridRect::new(0, 0, 2, 1))))
        .unwrap());
    assert!(engine
        .execute(Box::new(SplitTableCells::new(table_id, GridRect::new(0, 0, 3, 2))))
        .unwrap());
    assert_eq!(grid(engine.tree(), table_id).real_cells().count(), 12);

    engine.undo().unwrap();
    engine.undo().unwrap();
    assert_eq!(grid(engine.tree(), table_id).real_cells().count(), 12);
    engine.undo().unwrap();
    assert_eq!(grid(engine.tree(), table_id).row_count(), 3);

    engine.redo().unwrap();
    engine.redo().unwrap();
    let merged = grid(engine.tree(), table_id);
    assert_eq!(merged.cell_at(0, 0).unwrap().row_span, 3);
    assert_eq!(merged.real_cells().count(), 7);
}

// =============================================================================
// Properties
// =============================================================================

#[derive(Debug, Clone)]
enum Edit {
    RowAbove(usize, usize),
    RowBelow(usize, usize),
    ColumnLeft(usize, usize),
    ColumnRight(usize, usize),
    RemoveRows(usize, usize, usize, usize),
    RemoveColumns(usize, usize, usize, usize),
    Merge(usize, usize, usize, usize),
    Split(usize, usize, usize, usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    let pos = || 0usize..8;
    prop_oneof![
        (pos(), pos()).prop_map(|(r, c)| Edit::RowAbove(r, c)),
        (pos(), pos()).prop_map(|(r, c)| Edit::RowBelow(r, c)),
        (pos(), pos()).prop_map(|(r, c)| Edit::ColumnLeft(r, c)),
        (pos(), pos()).prop_map(|(r, c)| Edit::ColumnRight(r, c)),
        (pos(), pos(), pos(), pos()).prop_map(|(a, b, c, d)| Edit::RemoveRows(a, b, c, d)),
        (pos(), pos(), pos(), pos()).prop_map(|(a, b, c, d)| Edit::RemoveColumns(a, b, c, d)),
        (pos(), pos(), pos(), pos()).prop_map(|(a, b, c, d)| Edit::Merge(a, b, c, d)),
        (pos(), pos(), pos(), pos()).prop_map(|(a, b, c, d)| Edit::Split(a, b, c, d)),
    ]
}

/// Apply one edit with coordinates wrapped into the current grid
fn apply(tree: &mut DocumentTree, table_id: NodeId, edit: &Edit) -> TableEditOutcome {
    let grid = grid(tree, table_id);
    let (rows, cols) = (grid.row_count(), grid.column_count());
    let rect = |a: usize, b: usize, c: usize, d: usize| GridRect::new(a % rows, b % cols, c % rows, d % cols);
    let key = |r: usize, c: usize| grid.cell_at(r % rows, c % cols).map(|cell| cell.key).unwrap();

    let outcome = match *edit {
        Edit::RowAbove(r, c) => insert_row_above(tree, table_id, key(r, c)),
        Edit::RowBelow(r, c) => insert_row_below(tree, table_id, key(r, c)),
        Edit::ColumnLeft(r, c) => edit_engine::table_ops::insert_column_left(tree, table_id, key(r, c)),
        Edit::ColumnRight(r, c) => insert_column_right(tree, table_id, key(r, c)),
        Edit::RemoveRows(a, b, c, d) => remove_rows(tree, table_id, rect(a, b, c, d)),
        Edit::RemoveColumns(a, b, c, d) => remove_columns(tree, table_id, rect(a, b, c, d)),
        Edit::Merge(a, b, c, d) => merge_cells(tree, table_id, rect(a, b, c, d)),
        Edit::Split(a, b, c, d) => split_cells(tree, table_id, rect(a, b, c, d)),
    };
    outcome.unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn edits_keep_grid_rectangular(edits in proptest::collection::vec(edit_strategy(), 1..24)) {
        let (mut tree, table_id) = table(3, 4);
        for edit in &edits {
            apply(&mut tree, table_id, edit);
            if tree.get_table(table_id).is_none() {
                break;
            }
            let grid = TableGrid::build(&tree, table_id).unwrap();
            prop_assert!(grid.is_rectangular(), "after {:?}: {:?}", edit, grid.rows());
            prop_assert!(grid.has_full_coverage(), "after {:?}: {:?}", edit, grid.rows());
        }
    }

    #[test]
    fn split_everything_leaves_unit_cells(edits in proptest::collection::vec(edit_strategy(), 1..12)) {
        let (mut tree, table_id) = table(3, 3);
        for edit in &edits {
            apply(&mut tree, table_id, edit);
            if tree.get_table(table_id).is_none() {
                return Ok(());
            }
        }

        let before = grid(&tree, table_id);
        let whole = GridRect::new(0, 0, before.row_count() - 1, before.column_count() - 1);
        split_cells(&mut tree, table_id, whole).unwrap();

        let after = grid(&tree, table_id);
        prop_assert_eq!(after.real_cells().count(), before.row_count() * before.column_count());
        prop_assert!(after.real_cells().all(|cell| !cell.is_spanning()));
    }
}
