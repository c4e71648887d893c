//! Syntax highlighting for code blocks.
//!
//! Provides tree-sitter based highlighting to HTML and preview themes.

mod highlighter;
mod language;
mod theme;

pub use highlighter::{escape_html, HighlightSpan, SyntaxHighlighter};
pub use language::Language;
pub use theme::{Theme, ThemeKind, TokenStyle};
