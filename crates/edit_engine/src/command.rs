//! Command system for document editing

use doc_model::{DocumentTree, NodeType, Path, Selection};
use std::any::Any;

/// Result of applying a command
#[derive(Debug)]
pub struct CommandResult {
    /// The new document tree after the command
    pub tree: DocumentTree,
    /// The new selection after the command
    pub selection: Selection,
    /// The inverse command (for undo)
    pub inverse: Box<dyn Command>,
    /// False when the command turned out to be a no-op; nothing is recorded
    /// for undo then
    pub changed: bool,
}

/// Trait for all editing commands
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Apply this command to a document
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> crate::Result<CommandResult>;

    /// Get the inverse of this command
    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command>;

    /// Transform a selection through this command
    fn transform_selection(&self, selection: &Selection) -> Selection;

    /// Try to merge this command with another (for batching)
    fn merge_with(&self, _other: &dyn Command) -> Option<Box<dyn Command>> {
        None
    }

    /// Get a display name for this command
    fn display_name(&self) -> &str;

    /// Clone this command into a box
    fn clone_box(&self) -> Box<dyn Command>;

    /// Concrete type access, used by `merge_with` to recognize its own kind
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// RestoreDocument Command
// ============================================================================

/// Put back a whole-document snapshot
///
/// Structural table edits touch many nodes at once; their inverse is the
/// document as it was before, so one undo step always restores a consistent
/// table.
#[derive(Debug, Clone)]
pub struct RestoreDocument {
    snapshot: DocumentTree,
    selection: Selection,
}

impl RestoreDocument {
    pub fn new(snapshot: DocumentTree, selection: Selection) -> Self {
        Self { snapshot, selection }
    }

    pub fn snapshot(&self) -> &DocumentTree {
        &self.snapshot
    }
}

impl Command for RestoreDocument {
    fn apply(&self, tree: &DocumentTree, selection: &Selection) -> crate::Result<CommandResult> {
        Ok(CommandResult {
            tree: self.snapshot.clone(),
            selection: self.selection,
            inverse: Box::new(RestoreDocument::new(tree.clone(), *selection)),
            changed: true,
        })
    }

    fn invert(&self, tree: &DocumentTree) -> Box<dyn Command> {
        Box::new(RestoreDocument::new(tree.clone(), first_caret(tree).unwrap_or(self.selection)))
    }

    fn transform_selection(&self, _selection: &Selection) -> Selection {
        self.selection
    }

    fn display_name(&self) -> &str {
        "Restore Document"
    }

    fn clone_box(&self) -> Box<dyn Command> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Selection helpers
// ============================================================================

/// A caret at the start of the first paragraph in document order
pub fn first_caret(tree: &DocumentTree) -> Option<Selection> {
    tree.query_nodes(&Path::root(), |_, node_type| node_type == NodeType::Paragraph)
        .first()
        .map(|(id, _)| Selection::at_start_of(*id))
}

/// Keep `selection` when both ends still exist, otherwise fall back to the
/// first caret of the document
pub fn surviving_selection(tree: &DocumentTree, selection: &Selection) -> Selection {
    let alive = tree.node_type(selection.anchor.node_id).is_some()
        && tree.node_type(selection.focus.node_id).is_some();
    if alive {
        *selection
    } else {
        first_caret(tree).unwrap_or(*selection)
    }
}
