//! Document Model - Core document tree structure and types
//!
//! This crate provides the document tree the table editor works on: an arena
//! of nodes with stable IDs, addressed either by [`NodeId`] or by a [`Path`]
//! of child indexes from the root. Tables are stored as rows of cells, each
//! cell wrapping its paragraphs in a single [`TableContent`].

mod node;
mod document;
mod paragraph;
mod run;
mod selection;
mod node_id;
mod path;
mod tree;
mod error;
pub mod table;

pub use node::*;
pub use document::*;
pub use paragraph::*;
pub use run::*;
pub use selection::*;
pub use node_id::*;
pub use path::*;
pub use tree::*;
pub use error::*;
pub use table::*;
