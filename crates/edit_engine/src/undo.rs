//! Undo/redo manager with command batching

use crate::{Command, EditError, Result};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// An entry in the undo stack
struct UndoEntry {
    /// The original command
    command: Box<dyn Command>,
    /// The inverse command (for undo)
    inverse: Box<dyn Command>,
    /// When this entry was created
    timestamp: Instant,
}

/// Manages undo and redo stacks
pub struct UndoManager {
    /// Commands that can be undone, oldest first
    undo_stack: VecDeque<UndoEntry>,
    /// Commands that can be redone
    redo_stack: Vec<Box<dyn Command>>,
    /// Maximum number of undo entries
    max_entries: usize,
    /// Time threshold for batching (commands within this time are merged)
    batch_threshold: Duration,
}

impl UndoManager {
    /// Create a new undo manager
    pub fn new() -> Self {
        Self::with_limits(100, Duration::from_millis(500))
    }

    /// Create with custom limits
    pub fn with_limits(max_entries: usize, batch_threshold: Duration) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
            batch_threshold,
        }
    }

    /// Push a command onto the undo stack
    pub fn push(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        // Clear redo stack on new command
        self.redo_stack.clear();
        self.record(command, inverse);
    }

    /// Record a redone command without touching the redo stack
    pub fn push_redone(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        self.undo_stack.push_back(UndoEntry {
            command,
            inverse,
            timestamp: Instant::now(),
        });
        self.enforce_limit();
    }

    fn record(&mut self, command: Box<dyn Command>, inverse: Box<dyn Command>) {
        let now = Instant::now();

        // Try to merge with previous command if within batch threshold
        if let Some(last) = self.undo_stack.back_mut() {
            if now.duration_since(last.timestamp) < self.batch_threshold {
                if let Some(merged) = last.command.merge_with(command.as_ref()) {
                    // The earlier inverse already undoes both
                    last.command = merged;
                    last.timestamp = now;
                    return;
                }
            }
        }

        self.undo_stack.push_back(UndoEntry {
            command,
            inverse,
            timestamp: now,
        });
        self.enforce_limit();
    }

    fn enforce_limit(&mut self) {
        while self.undo_stack.len() > self.max_entries {
            self.undo_stack.pop_front();
        }
    }

    /// Pop the last command for undo
    pub fn pop_undo(&mut self) -> Result<Box<dyn Command>> {
        let entry = self.undo_stack.pop_back()
            .ok_or(EditError::UndoStackEmpty)?;

        // Push to redo stack
        self.redo_stack.push(entry.command);

        Ok(entry.inverse)
    }

    /// Pop a command for redo
    pub fn pop_redo(&mut self) -> Result<Box<dyn Command>> {
        self.redo_stack.pop()
            .ok_or(EditError::RedoStackEmpty)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of entries that can be undone
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Display name of the command the next undo reverts
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|entry| entry.command.display_name())
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RestoreDocument;
    use doc_model::{DocumentTree, Selection};

    fn entry() -> (Box<dyn Command>, Box<dyn Command>) {
        let restore = RestoreDocument::new(DocumentTree::new(), Selection::default());
        (restore.clone_box(), restore.clone_box())
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut undo = UndoManager::with_limits(2, Duration::ZERO);
        for _ in 0..3 {
            let (command, inverse) = entry();
            undo.push(command, inverse);
        }
        assert_eq!(undo.undo_len(), 2);
    }

    #[test]
    fn test_undo_then_redo_stacks() {
        let mut undo = UndoManager::new();
        assert!(matches!(undo.pop_undo(), Err(EditError::UndoStackEmpty)));

        let (command, inverse) = entry();
        undo.push(command, inverse);
        assert_eq!(undo.undo_label(), Some("Restore Document"));

        undo.pop_undo().unwrap();
        assert!(undo.can_redo());
        let redone = undo.pop_redo().unwrap();
        let (_, inverse) = entry();
        undo.push_redone(redone, inverse);
        assert!(undo.can_undo());
        assert!(matches!(undo.pop_redo(), Err(EditError::RedoStackEmpty)));
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut undo = UndoManager::new();
        let (command, inverse) = entry();
        undo.push(command, inverse);
        undo.pop_undo().unwrap();

        let (command, inverse) = entry();
        undo.push(command, inverse);
        assert!(!undo.can_redo());
    }
}
