//! Undo boundaries.
//!
//! The canvas never computes diffs. At the start of anything that may change
//! the document it hands the host a full [`Snapshot`] taken beforehand, and
//! the host decides how to store it. [`UndoHistory`] is a plain bounded stack
//! of those snapshots.

#[cfg(test)]
#[path = "undo_test.rs"]
mod undo_test;

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::model::Snapshot;

/// Receiver of undo boundaries.
pub trait UndoSink {
    /// Open an undoable unit named `label`; `before` is the document as it
    /// was before the unit started.
    fn new_action(&mut self, label: &str, before: Snapshot);
}

/// One recorded undo unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub label: String,
    pub before: Snapshot,
}

/// Default number of entries kept.
pub const DEFAULT_UNDO_LIMIT: usize = 100;

/// Bounded stack of undo entries, oldest dropped first.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: Vec<UndoEntry>,
    limit: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_UNDO_LIMIT)
    }
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A history keeping at most `limit` entries (at least one).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { entries: Vec::new(), limit: limit.max(1) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels, oldest first.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    #[must_use]
    pub fn last_label(&self) -> Option<&str> {
        self.entries.last().map(|e| e.label.as_str())
    }

    /// Remove and return the newest entry.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop()
    }
}

impl UndoSink for UndoHistory {
    fn new_action(&mut self, label: &str, before: Snapshot) {
        debug!(label, elements = before.elements.len(), "undo action opened");
        self.entries.push(UndoEntry { label: label.to_string(), before });
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
    }
}

impl UndoSink for Rc<RefCell<UndoHistory>> {
    fn new_action(&mut self, label: &str, before: Snapshot) {
        self.borrow_mut().new_action(label, before);
    }
}
