//! Bounded undo/redo history.
//!
//! Each entry stores the command that reverses an edit. Undoing applies
//! the entry's command and files *its* inverse on the redo side, and redo
//! does the mirror image, so both stacks hold ready-to-apply commands.

use std::collections::VecDeque;

use crate::command::EditCommand;

/// A named inverse command.
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// User-visible action name ("Delete", "Paste", "Cut").
    pub action_name: String,
    /// Command that reverses the action.
    pub command: EditCommand,
}

impl UndoEntry {
    pub fn new(action_name: impl Into<String>, command: EditCommand) -> Self {
        Self {
            action_name: action_name.into(),
            command,
        }
    }
}

/// Undo/redo history stack.
#[derive(Debug)]
pub struct UndoStack {
    /// Entries that undo executed edits (most recent last).
    undo: VecDeque<UndoEntry>,
    /// Entries that redo undone edits (most recent last).
    redo: VecDeque<UndoEntry>,
    /// Maximum history depth per side.
    max_depth: usize,
}

impl UndoStack {
    /// Create a new undo stack with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the inverse of a new user edit.
    /// Clears the redo stack (new action invalidates redo history).
    pub fn record(&mut self, entry: UndoEntry) {
        self.redo.clear();
        self.push_undo(entry);
    }

    /// Push onto the undo side without touching redo, evicting the oldest entry.
    pub fn push_undo(&mut self, entry: UndoEntry) {
        push_bounded(&mut self.undo, entry, self.max_depth);
    }

    /// Push onto the redo side, evicting the oldest entry.
    pub fn push_redo(&mut self, entry: UndoEntry) {
        push_bounded(&mut self.redo, entry, self.max_depth);
    }

    /// Take the most recent undo entry.
    pub fn pop_undo(&mut self) -> Option<UndoEntry> {
        self.undo.pop_back()
    }

    /// Take the most recent redo entry.
    pub fn pop_redo(&mut self) -> Option<UndoEntry> {
        self.redo.pop_back()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Name of the action the next undo reverses.
    pub fn undo_name(&self) -> Option<&str> {
        self.undo.back().map(|e| e.action_name.as_str())
    }

    /// Name of the action the next redo re-applies.
    pub fn redo_name(&self) -> Option<&str> {
        self.redo.back().map(|e| e.action_name.as_str())
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(10)
    }
}

fn push_bounded(stack: &mut VecDeque<UndoEntry>, entry: UndoEntry, max_depth: usize) {
    stack.push_back(entry);
    while stack.len() > max_depth {
        stack.pop_front();
    }
}
