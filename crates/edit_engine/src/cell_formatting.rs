//! Content edits routed to selected cells

use crate::Result;
use doc_model::{DocumentTree, Mark, Node, NodeId, Selection};
use tracing::debug;

/// Set or clear `mark` on every run of the given cells
///
/// Cells without text are left alone so that an empty cell does not pick up
/// formatting nobody can see. Returns the number of runs touched.
pub fn apply_mark_to_cells(tree: &mut DocumentTree, keys: &[NodeId], mark: &Mark, enabled: bool) -> Result<usize> {
    let mut runs = Vec::new();
    for &key in keys {
        if tree.get_table_cell(key).is_none() || tree.is_text_empty(key) {
            continue;
        }
        for block in tree.cell_blocks(key)? {
            if let Some(para) = tree.get_paragraph(block) {
                runs.extend_from_slice(para.children());
            }
        }
    }

    for &run_id in &runs {
        if let Some(run) = tree.get_run_mut(run_id) {
            run.marks.set(mark, enabled);
        }
    }

    debug!(cells = keys.len(), runs = runs.len(), ?mark, enabled, "mark applied to cells");
    Ok(runs.len())
}

/// Replace the content of every given cell with one empty paragraph
///
/// Returns the number of cells cleared.
pub fn clear_cell_contents(tree: &mut DocumentTree, keys: &[NodeId]) -> Result<usize> {
    let mut cleared = 0;
    for &key in keys {
        if tree.get_table_cell(key).is_none() {
            continue;
        }
        tree.reset_cell_content(key)?;
        cleared += 1;
    }
    debug!(cleared, "cell contents cleared");
    Ok(cleared)
}

/// Whether backspace must do nothing for this selection
///
/// True for a caret at offset 0 inside an empty cell: deleting backward there
/// would merge the cell into whatever precedes it.
pub fn blocks_delete_backward(tree: &DocumentTree, selection: &Selection) -> bool {
    if !selection.is_collapsed() || selection.focus.offset != 0 {
        return false;
    }
    tree.find_cell_for_node(selection.focus.node_id)
        .map(|cell| tree.is_text_empty(cell))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableGrid;
    use doc_model::{Position, Run};

    fn table_with_text() -> (DocumentTree, NodeId, Vec<NodeId>) {
        let mut tree = DocumentTree::with_empty_paragraph();
        let table_id = tree.create_table(None, 1, 2).unwrap();
        let grid = TableGrid::build(&tree, table_id).unwrap();
        let keys: Vec<NodeId> = grid.real_cells().map(|c| c.key).collect();
        let para = tree.cell_blocks(keys[0]).unwrap()[0];
        tree.insert_run(Run::new("hello"), para, None).unwrap();
        tree.insert_run(Run::new(" world"), para, None).unwrap();
        (tree, table_id, keys)
    }

    #[test]
    fn test_mark_skips_empty_cells() {
        let (mut tree, _, keys) = table_with_text();
        let touched = apply_mark_to_cells(&mut tree, &keys, &Mark::Bold, true).unwrap();
        assert_eq!(touched, 2);
        assert!(tree.nodes.runs.values().all(|run| run.marks.bold));

        apply_mark_to_cells(&mut tree, &keys, &Mark::Bold, false).unwrap();
        assert!(tree.nodes.runs.values().all(|run| !run.marks.bold));
    }

    #[test]
    fn test_clear_cell_contents() {
        let (mut tree, _, keys) = table_with_text();
        let cleared = clear_cell_contents(&mut tree, &[keys[0], NodeId::new()]).unwrap();
        assert_eq!(cleared, 1);
        assert!(tree.is_text_empty(keys[0]));
        assert_eq!(tree.cell_blocks(keys[0]).unwrap().len(), 1);
        assert!(tree.nodes.runs.is_empty());
    }

    #[test]
    fn test_backspace_guard() {
        let (tree, _, keys) = table_with_text();
        let full = tree.cell_blocks(keys[0]).unwrap()[0];
        let empty = tree.cell_blocks(keys[1]).unwrap()[0];

        assert!(blocks_delete_backward(&tree, &Selection::at_start_of(empty)));
        assert!(!blocks_delete_backward(&tree, &Selection::at_start_of(full)));
        assert!(!blocks_delete_backward(
            &tree,
            &Selection::collapsed(Position::new(empty, 1))
        ));

        let body_para = tree.document.children()[0];
        assert!(!blocks_delete_backward(&tree, &Selection::at_start_of(body_para)));
    }
}
