//! The editing surface: where text and selection live.
//!
//! The formatting and find/replace engines never reach for ambient
//! selection state; they are handed an `EditSurface` and work through it.
//! `TextSurface` is the in-process implementation with native undo.

use crate::buffer::TextBuffer;
use crate::history::{EditOperation, History};
use crate::selection::Selection;

/// Text-input capability consumed by the editing engines.
///
/// Offsets are character indices into `text()`.
pub trait EditSurface {
    /// Returns the full document text.
    fn text(&self) -> String;

    /// Returns the current selection.
    fn selection(&self) -> Selection;

    /// Moves the selection. Out-of-range offsets are clamped.
    fn set_selection(&mut self, selection: Selection);

    /// Returns the currently selected text (empty for a caret).
    fn selected_text(&self) -> String;

    /// Replaces the current selection with `text` as a single undoable edit
    /// and leaves a caret after the inserted text.
    fn insert_text(&mut self, text: &str);

    /// Replaces the whole document as a single undoable edit.
    fn set_text(&mut self, text: &str);

    /// Asks the host to bring the current selection into view.
    fn scroll_into_view(&mut self);
}

/// Rope-backed editing surface with undo/redo.
#[derive(Debug, Default)]
pub struct TextSurface {
    buffer: TextBuffer,
    selection: Selection,
    history: History,
    /// Line most recently requested to be centred in view.
    scroll_request: Option<usize>,
}

impl TextSurface {
    /// Creates a new empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface holding `text`, caret at the start.
    pub fn from_str(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from_str(text),
            ..Self::default()
        }
    }

    /// Returns the line last passed to `scroll_into_view`, if any.
    pub fn scroll_request(&self) -> Option<usize> {
        self.scroll_request
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Reverts the last edit group. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some((ops, selection)) => {
                self.apply_ops(&ops);
                self.selection = selection.clamp(self.buffer.len_chars());
                true
            }
            None => false,
        }
    }

    /// Re-applies the last undone edit group.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some((ops, selection)) => {
                self.apply_ops(&ops);
                self.selection = selection.clamp(self.buffer.len_chars());
                true
            }
            None => false,
        }
    }

    fn apply_ops(&mut self, ops: &[EditOperation]) {
        for op in ops {
            match op {
                EditOperation::Insert { position, text } => self.buffer.insert(*position, text),
                EditOperation::Delete { position, text } => {
                    self.buffer.remove(*position, position + text.chars().count())
                }
            }
        }
    }

    /// Removes the selected text, recording it in the open edit group.
    fn delete_selection_internal(&mut self) -> usize {
        let (start, end) = self.selection.range();
        if start < end {
            let deleted = self.buffer.slice(start, end);
            self.buffer.remove(start, end);
            self.history.record(EditOperation::Delete {
                position: start,
                text: deleted,
            });
        }
        start
    }
}

impl EditSurface for TextSurface {
    fn text(&self) -> String {
        self.buffer.to_string()
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.buffer.len_chars());
    }

    fn selected_text(&self) -> String {
        let (start, end) = self.selection.range();
        self.buffer.slice(start, end)
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() && !self.selection.has_selection() {
            return;
        }

        self.history.begin_edit(self.selection);
        let pos = self.delete_selection_internal();
        if !text.is_empty() {
            self.buffer.insert(pos, text);
            self.history.record(EditOperation::Insert {
                position: pos,
                text: text.to_string(),
            });
        }
        self.selection = Selection::caret(pos + text.chars().count());
        self.history.set_selection_after(self.selection);
        self.history.commit_edit();
    }

    fn set_text(&mut self, text: &str) {
        let old = self.buffer.to_string();
        if old == text {
            return;
        }

        self.history.begin_edit(self.selection);
        if !old.is_empty() {
            self.history.record(EditOperation::Delete {
                position: 0,
                text: old,
            });
        }
        if !text.is_empty() {
            self.history.record(EditOperation::Insert {
                position: 0,
                text: text.to_string(),
            });
        }
        self.buffer.set_text(text);
        self.selection = self.selection.clamp(self.buffer.len_chars());
        self.history.set_selection_after(self.selection);
        self.history.commit_edit();
    }

    fn scroll_into_view(&mut self) {
        self.scroll_request = Some(self.buffer.char_to_line(self.selection.cursor));
    }
}
