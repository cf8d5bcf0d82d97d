//! Text run node - a contiguous span of text with consistent formatting

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A single formatting mark that can be toggled on a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    /// Text color (as CSS color string)
    Color(String),
}

/// Marks applied to a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl Marks {
    /// Set or clear a mark
    ///
    /// Clearing a color mark removes the color whatever its value.
    pub fn set(&mut self, mark: &Mark, enabled: bool) {
        match mark {
            Mark::Bold => self.bold = enabled,
            Mark::Italic => self.italic = enabled,
            Mark::Underline => self.underline = enabled,
            Mark::Strikethrough => self.strikethrough = enabled,
            Mark::Code => self.code = enabled,
            Mark::Color(color) => {
                self.color = if enabled { Some(color.clone()) } else { None };
            }
        }
    }

    /// Check whether a mark is active
    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Strikethrough => self.strikethrough,
            Mark::Code => self.code,
            Mark::Color(color) => self.color.as_deref() == Some(color.as_str()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Marks::default()
    }
}

/// A text run - contiguous text with consistent formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    parent: Option<NodeId>,
    /// The text content of this run
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

impl Run {
    /// Create a new run with text content
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            text: text.into(),
            marks: Marks::default(),
        }
    }

    /// Create a new run with text and marks
    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            text: text.into(),
            marks,
        }
    }

    /// Get the length of the text in this run (in UTF-8 bytes)
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if this run is empty
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl Node for Run {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Run
    }

    fn children(&self) -> &[NodeId] {
        // Runs have no children
        &[]
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn text_content(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_clear_marks() {
        let mut marks = Marks::default();
        marks.set(&Mark::Bold, true);
        marks.set(&Mark::Color("#ff0000".into()), true);
        assert!(marks.has(&Mark::Bold));
        assert!(marks.has(&Mark::Color("#ff0000".into())));
        assert!(!marks.has(&Mark::Color("#00ff00".into())));

        marks.set(&Mark::Bold, false);
        marks.set(&Mark::Color(String::new()), false);
        assert!(marks.is_empty());
    }
}
