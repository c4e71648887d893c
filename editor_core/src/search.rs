//! Find and replace over an editing surface.
//!
//! Queries are literal substrings unless `use_regex` is switched on.
//! `find_next` always searches from the start of the document, so repeated
//! calls keep selecting the first occurrence.

use crate::selection::SearchMatch;
use crate::surface::EditSurface;
use regex::Regex;

/// Find panel state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindReplace {
    pub find_text: String,
    pub replace_text: String,
    pub is_find_open: bool,
    pub is_replace_open: bool,
    /// Interpret `find_text` as a regular expression.
    pub use_regex: bool,
}

/// Compiled form of the current query.
enum Matcher<'a> {
    Literal(&'a str),
    Pattern {
        any: Regex,
        /// The same pattern anchored at both ends.
        whole: Regex,
    },
}

impl Matcher<'_> {
    /// Byte range of the first match in `text`.
    fn find(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Matcher::Literal(needle) => text.find(needle).map(|i| (i, i + needle.len())),
            Matcher::Pattern { any, .. } => any.find(text).map(|m| (m.start(), m.end())),
        }
    }

    fn count(&self, text: &str) -> usize {
        match self {
            Matcher::Literal(needle) => text.matches(needle).count(),
            Matcher::Pattern { any, .. } => any.find_iter(text).count(),
        }
    }

    /// Returns true if `text` is exactly one whole match.
    fn matches_whole(&self, text: &str) -> bool {
        match self {
            Matcher::Literal(needle) => text == *needle,
            Matcher::Pattern { whole, .. } => whole.is_match(text),
        }
    }

    fn replace_all(&self, text: &str, replacement: &str) -> String {
        match self {
            Matcher::Literal(needle) => text.replace(needle, replacement),
            Matcher::Pattern { any, .. } => any.replace_all(text, replacement).into_owned(),
        }
    }

    /// Replacement for a single whole match; expands capture groups in regex mode.
    fn replace_one(&self, matched: &str, replacement: &str) -> String {
        match self {
            Matcher::Literal(_) => replacement.to_string(),
            Matcher::Pattern { whole, .. } => whole.replace(matched, replacement).into_owned(),
        }
    }
}

/// Converts a byte offset in `text` to a character offset.
fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

impl FindReplace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if both query fields are non-empty.
    fn can_replace(&self) -> bool {
        !self.find_text.is_empty() && !self.replace_text.is_empty()
    }

    fn matcher(&self) -> Option<Matcher<'_>> {
        if self.find_text.is_empty() {
            return None;
        }
        if !self.use_regex {
            return Some(Matcher::Literal(&self.find_text));
        }
        let anchored = format!(r"\A(?:{})\z", self.find_text);
        match (Regex::new(&self.find_text), Regex::new(&anchored)) {
            (Ok(any), Ok(whole)) => Some(Matcher::Pattern { any, whole }),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Invalid search pattern {:?}: {}", self.find_text, e);
                None
            }
        }
    }

    /// Selects the first occurrence of the query and scrolls it into view.
    ///
    /// The selection is left alone when nothing matches.
    pub fn find_next<S: EditSurface + ?Sized>(&self, surface: &mut S) -> Option<SearchMatch> {
        let matcher = self.matcher()?;
        let text = surface.text();
        let (start, end) = matcher.find(&text)?;

        let found = SearchMatch::new(char_offset(&text, start), char_offset(&text, end));
        surface.set_selection(found.to_selection());
        surface.scroll_into_view();
        Some(found)
    }

    /// Replaces the selection if it is a match, then moves to the first
    /// remaining occurrence. Returns true if a replacement happened.
    pub fn replace_next<S: EditSurface + ?Sized>(&self, surface: &mut S) -> bool {
        if !self.can_replace() {
            return false;
        }
        let matcher = match self.matcher() {
            Some(matcher) => matcher,
            None => return false,
        };

        let selected = surface.selected_text();
        let replaced = surface.selection().has_selection() && matcher.matches_whole(&selected);
        if replaced {
            let replacement = matcher.replace_one(&selected, &self.replace_text);
            surface.insert_text(&replacement);
        }

        self.find_next(surface);
        replaced
    }

    /// Replaces every occurrence in a single document update.
    /// Returns the number of occurrences replaced.
    pub fn replace_all<S: EditSurface + ?Sized>(&self, surface: &mut S) -> usize {
        if !self.can_replace() {
            return 0;
        }
        let matcher = match self.matcher() {
            Some(matcher) => matcher,
            None => return 0,
        };

        let text = surface.text();
        let count = matcher.count(&text);
        if count > 0 {
            surface.set_text(&matcher.replace_all(&text, &self.replace_text));
            log::debug!("Replaced {} occurrence(s) of {:?}", count, self.find_text);
        }
        count
    }

    /// Number of occurrences of the query in the document.
    pub fn match_count<S: EditSurface + ?Sized>(&self, surface: &S) -> usize {
        self.matcher()
            .map(|matcher| matcher.count(&surface.text()))
            .unwrap_or(0)
    }
}
