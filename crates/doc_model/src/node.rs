//! Core node trait and types

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Enumeration of all node types in the document tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Paragraph,
    Run,
    Table,
    TableRow,
    TableCell,
    /// The single wrapper between a cell and its blocks
    TableContent,
}

impl NodeType {
    /// Whether nodes of this type sit directly in the body or a cell content
    pub fn is_block(self) -> bool {
        matches!(self, NodeType::Paragraph | NodeType::Table)
    }

    /// Whether this type belongs to the table structure
    pub fn is_table_element(self) -> bool {
        matches!(
            self,
            NodeType::Table | NodeType::TableRow | NodeType::TableCell | NodeType::TableContent
        )
    }
}

/// Common interface for all document nodes
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the type of this node
    fn node_type(&self) -> NodeType;

    /// Get the IDs of child nodes
    fn children(&self) -> &[NodeId];

    /// Get the ID of the parent node (None for root)
    fn parent(&self) -> Option<NodeId>;

    /// Set the parent node ID
    fn set_parent(&mut self, parent: Option<NodeId>);

    /// Get the text content of this node (if any)
    fn text_content(&self) -> Option<&str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_classes() {
        assert!(NodeType::Paragraph.is_block());
        assert!(NodeType::Table.is_block());
        assert!(!NodeType::TableCell.is_block());
        assert!(NodeType::TableContent.is_table_element());
        assert!(!NodeType::Run.is_table_element());
    }
}
