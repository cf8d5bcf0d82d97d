//! Tree addresses
//!
//! A [`Path`] is the list of child indexes leading from the document root to
//! a node: `[2]` is the third body block, `[2, 0, 1]` the second cell of the
//! first row of the table at body index 2. Paths are derived from the tree on
//! demand and go stale after any structural mutation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a node as a sequence of child indexes from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path (the document itself)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the node within its parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the parent node, `None` for the root
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Path of the child at `index`
    pub fn child(&self, index: usize) -> Path {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    /// Path of the next sibling
    pub fn next(&self) -> Option<Path> {
        let last = self.last()?;
        let mut indexes = self.0.clone();
        *indexes.last_mut()? = last + 1;
        Some(Self(indexes))
    }

    /// Path of the previous sibling, `None` for a first child
    pub fn previous(&self) -> Option<Path> {
        let last = self.last()?;
        if last == 0 {
            return None;
        }
        let mut indexes = self.0.clone();
        *indexes.last_mut()? = last - 1;
        Some(Self(indexes))
    }

    /// The first `len` indexes of this path
    pub fn truncated(&self, len: usize) -> Path {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Whether `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    /// Whether `self` equals `other` or lies below it
    pub fn is_within(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl From<Vec<usize>> for Path {
    fn from(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }
}

impl From<&[usize]> for Path {
    fn from(indexes: &[usize]) -> Self {
        Self(indexes.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
