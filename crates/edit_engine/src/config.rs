//! Editor configuration
//!
//! Settings are plain serde structs with defaults, so a partial JSON file
//! only overrides the keys it names.

use crate::{EditError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level editor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Undo history settings
    #[serde(default)]
    pub undo: UndoSettings,
    /// Table insertion settings
    #[serde(default)]
    pub table: TableSettings,
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UndoSettings {
    /// Maximum number of undo entries kept
    pub max_entries: usize,
    /// Commands closer together than this are merged when they allow it
    pub batch_threshold_ms: u64,
}

impl Default for UndoSettings {
    fn default() -> Self {
        Self {
            max_entries: 100,
            batch_threshold_ms: 500,
        }
    }
}

impl UndoSettings {
    pub fn batch_threshold(&self) -> Duration {
        Duration::from_millis(self.batch_threshold_ms)
    }
}

/// Table insertion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableSettings {
    /// Rows of a newly inserted table
    pub default_rows: usize,
    /// Columns of a newly inserted table
    pub default_columns: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            default_rows: 3,
            default_columns: 3,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no editor config, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the editor cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.undo.max_entries == 0 {
            return Err(EditError::Config("undo.max_entries must be at least 1".into()));
        }
        if self.table.default_rows == 0 {
            return Err(EditError::Config("table.default_rows must be at least 1".into()));
        }
        if self.table.default_columns == 0 {
            return Err(EditError::Config("table.default_columns must be at least 1".into()));
        }
        Ok(())
    }
}
