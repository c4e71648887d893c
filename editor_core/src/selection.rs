//! Selection and match ranges.

/// A text selection with an anchor and a cursor position, in characters.
/// When anchor == cursor, the selection is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// The anchor point (where selection started).
    pub anchor: usize,
    /// The cursor position (where selection ends / caret is).
    pub cursor: usize,
}

impl Selection {
    /// Creates a caret at the given position.
    pub fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            cursor: pos,
        }
    }

    /// Creates a selection from anchor to cursor.
    pub fn with_range(anchor: usize, cursor: usize) -> Self {
        Self { anchor, cursor }
    }

    /// Returns true if there's an active selection (anchor != cursor).
    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    /// Returns the start and end of the selection (ordered).
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    /// Collapses the selection to the cursor position.
    pub fn collapse(&mut self) {
        self.anchor = self.cursor;
    }

    /// Moves both ends so neither exceeds `len`.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            cursor: self.cursor.min(len),
        }
    }
}

/// A search match in the document, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Start character position (inclusive).
    pub start: usize,
    /// End character position (exclusive).
    pub end: usize,
}

impl SearchMatch {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The selection covering this match, cursor at the end.
    pub fn to_selection(self) -> Selection {
        Selection::with_range(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_ordered() {
        let sel = Selection::with_range(7, 3);
        assert_eq!(sel.range(), (3, 7));
        assert!(sel.has_selection());
    }

    #[test]
    fn test_collapse() {
        let mut sel = Selection::with_range(2, 5);
        sel.collapse();
        assert_eq!(sel, Selection::caret(5));
        assert!(!sel.has_selection());
    }

    #[test]
    fn test_clamp() {
        let sel = Selection::with_range(2, 50).clamp(10);
        assert_eq!(sel.range(), (2, 10));
    }

    #[test]
    fn test_match_to_selection() {
        let m = SearchMatch::new(1, 4);
        assert_eq!(m.len(), 3);
        assert_eq!(m.to_selection().range(), (1, 4));
    }
}
