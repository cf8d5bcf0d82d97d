//! Edit Engine - Table grid editing, commands, and undo/redo
//!
//! Tables in the document tree are lists of rows of cells with row and
//! column spans. This crate turns them into a logical grid (`TableGrid`),
//! resolves tree addresses to grid rectangles, and implements the structural
//! edits on top: row/column insertion and removal, merge, split. Every edit
//! is available as a `Command` so `EditingEngine` can record it for undo.

mod command;
mod executor;
mod undo;
mod error;
mod config;
mod table_grid;
mod table_range;
mod cell_selection;
pub mod table_ops;
mod table_commands;
mod cell_formatting;

pub use command::*;
pub use executor::*;
pub use undo::*;
pub use error::*;
pub use config::*;
pub use table_grid::*;
pub use table_range::*;
pub use cell_selection::*;
pub use table_ops::{
    check_merge, compact_table, repair_table, table_of_cell, ColumnSide, RowSide, SkipReason,
    TableEditOutcome,
};
pub use table_commands::*;
pub use cell_formatting::*;
