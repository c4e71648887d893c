//! Undo/redo history of the editing surface.
//!
//! Each user command (a typed insertion, a formatting command, a replace)
//! is recorded as one `EditGroup`, so one undo reverts one command.

use crate::selection::Selection;

/// Default maximum number of undo levels.
const DEFAULT_MAX_DEPTH: usize = 500;

/// Represents a single edit operation that can be undone/redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOperation {
    /// Insert text at a character position.
    Insert { position: usize, text: String },
    /// Delete text starting at a character position.
    Delete { position: usize, text: String },
}

impl EditOperation {
    /// Returns the inverse operation (for undo).
    pub fn inverse(&self) -> EditOperation {
        match self {
            EditOperation::Insert { position, text } => EditOperation::Delete {
                position: *position,
                text: text.clone(),
            },
            EditOperation::Delete { position, text } => EditOperation::Insert {
                position: *position,
                text: text.clone(),
            },
        }
    }
}

/// A group of edit operations that are undone/redone together.
#[derive(Debug, Clone)]
pub struct EditGroup {
    /// The operations in this group (in order of execution).
    pub operations: Vec<EditOperation>,
    /// Selection before the edit.
    pub selection_before: Selection,
    /// Selection after the edit.
    pub selection_after: Selection,
}

impl EditGroup {
    pub fn new(selection_before: Selection) -> Self {
        Self {
            operations: Vec::new(),
            selection_before,
            selection_after: selection_before,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Manages undo/redo history.
#[derive(Debug)]
pub struct History {
    undo_stack: Vec<EditGroup>,
    redo_stack: Vec<EditGroup>,
    max_depth: usize,
    /// Group being built by the current command.
    current_group: Option<EditGroup>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl History {
    /// Creates a new history keeping at most `max_depth` undo levels.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            current_group: None,
        }
    }

    /// Starts a new edit group, committing any pending one.
    pub fn begin_edit(&mut self, selection: Selection) {
        if self.current_group.is_some() {
            self.commit_edit();
        }
        self.current_group = Some(EditGroup::new(selection));
    }

    /// Records an operation in the current group.
    /// Operations recorded outside `begin_edit`/`commit_edit` form their own group.
    pub fn record(&mut self, op: EditOperation) {
        match &mut self.current_group {
            Some(group) => group.operations.push(op),
            None => {
                let mut group = EditGroup::new(Selection::default());
                group.operations.push(op);
                self.push_undo(group);
            }
        }
    }

    /// Sets the selection restored by redo.
    pub fn set_selection_after(&mut self, selection: Selection) {
        if let Some(group) = &mut self.current_group {
            group.selection_after = selection;
        }
    }

    /// Commits the current edit group. Empty groups are dropped.
    pub fn commit_edit(&mut self) {
        if let Some(group) = self.current_group.take() {
            if !group.is_empty() {
                self.push_undo(group);
            }
        }
    }

    fn push_undo(&mut self, group: EditGroup) {
        self.undo_stack.push(group);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_depth {
            let overflow = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(..overflow);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of committed undo groups.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Pops the last edit group for undo.
    /// Returns the inverse operations (in application order) and the selection to restore.
    pub fn undo(&mut self) -> Option<(Vec<EditOperation>, Selection)> {
        self.commit_edit();

        self.undo_stack.pop().map(|group| {
            let selection = group.selection_before;
            let ops = group
                .operations
                .iter()
                .rev()
                .map(EditOperation::inverse)
                .collect();
            self.redo_stack.push(group);
            (ops, selection)
        })
    }

    /// Pops the last undone edit group for redo.
    pub fn redo(&mut self) -> Option<(Vec<EditOperation>, Selection)> {
        self.redo_stack.pop().map(|group| {
            let selection = group.selection_after;
            let ops = group.operations.clone();
            self.undo_stack.push(group);
            (ops, selection)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(position: usize, text: &str) -> EditOperation {
        EditOperation::Insert {
            position,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new(100);

        history.begin_edit(Selection::caret(0));
        history.record(insert(0, "hello"));
        history.set_selection_after(Selection::caret(5));
        history.commit_edit();

        assert!(history.can_undo());
        assert!(!history.can_redo());

        let (ops, sel) = history.undo().unwrap();
        assert_eq!(
            ops,
            vec![EditOperation::Delete {
                position: 0,
                text: "hello".to_string()
            }]
        );
        assert_eq!(sel, Selection::caret(0));
        assert!(history.can_redo());

        let (ops, sel) = history.redo().unwrap();
        assert_eq!(ops, vec![insert(0, "hello")]);
        assert_eq!(sel, Selection::caret(5));
    }

    #[test]
    fn test_group_undoes_in_reverse_order() {
        let mut history = History::new(100);

        history.begin_edit(Selection::with_range(0, 2));
        history.record(EditOperation::Delete {
            position: 0,
            text: "hi".to_string(),
        });
        history.record(insert(0, "**hi**"));
        history.commit_edit();

        let (ops, _) = history.undo().unwrap();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], EditOperation::Delete { text, .. } if text == "**hi**"));
        assert!(matches!(&ops[1], EditOperation::Insert { text, .. } if text == "hi"));
    }

    #[test]
    fn test_redo_cleared_on_new_edit() {
        let mut history = History::new(100);

        history.begin_edit(Selection::caret(0));
        history.record(insert(0, "a"));
        history.commit_edit();

        history.undo();
        assert!(history.can_redo());

        history.begin_edit(Selection::caret(0));
        history.record(insert(0, "b"));
        history.commit_edit();

        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let mut history = History::new(100);
        history.begin_edit(Selection::caret(0));
        history.commit_edit();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_depth_limit() {
        let mut history = History::new(2);
        for i in 0..5 {
            history.begin_edit(Selection::caret(i));
            history.record(insert(i, "x"));
            history.commit_edit();
        }
        assert_eq!(history.undo_depth(), 2);
    }
}
