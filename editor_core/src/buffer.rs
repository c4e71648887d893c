//! Text buffer implementation using ropey.

use ropey::Rope;

/// Document text backed by a rope.
/// All positions are character indices; out-of-range positions are clamped.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Creates a text buffer from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Inserts a string at the given character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let idx = char_idx.min(self.len_chars());
        self.rope.insert(idx, text);
    }

    /// Removes text in the given character range.
    pub fn remove(&mut self, start: usize, end: usize) {
        let start = start.min(self.len_chars());
        let end = end.min(self.len_chars());
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Replaces the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Returns the text between two character indices.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len_chars());
        let start = start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Returns the line containing the given character index.
    pub fn char_to_line(&self, char_idx: usize) -> usize {
        self.rope.char_to_line(char_idx.min(self.len_chars()))
    }

    /// Returns the entire buffer as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = TextBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len_chars(), 0);
    }

    #[test]
    fn test_insert_and_remove() {
        let mut buf = TextBuffer::new();
        buf.insert(0, "hello");
        buf.insert(5, " world");
        assert_eq!(buf.to_string(), "hello world");

        buf.remove(5, 11);
        assert_eq!(buf.to_string(), "hello");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let mut buf = TextBuffer::from_str("abc");
        buf.insert(99, "d");
        assert_eq!(buf.to_string(), "abcd");
        buf.remove(2, 99);
        assert_eq!(buf.to_string(), "ab");
        assert_eq!(buf.slice(1, 99), "b");
    }

    #[test]
    fn test_slice_multibyte() {
        let buf = TextBuffer::from_str("héllo");
        assert_eq!(buf.len_chars(), 5);
        assert_eq!(buf.slice(1, 3), "él");
    }

    #[test]
    fn test_char_to_line() {
        let buf = TextBuffer::from_str("abc\ndefgh\nij");
        assert_eq!(buf.char_to_line(0), 0);
        assert_eq!(buf.char_to_line(4), 1);
        assert_eq!(buf.char_to_line(11), 2);
    }
}
