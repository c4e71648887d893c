//! mdpad core - Markdown editing logic.
//!
//! This crate holds the editor state, rendering, formatting, find/replace
//! and autosave behaviour without any dependency on a windowing system.
//! Hosts plug in through the `EditSurface`, `PreviewSurface` and `Prompt`
//! traits.

pub mod autosave;
pub mod buffer;
pub mod format;
pub mod history;
pub mod render;
pub mod search;
pub mod selection;
pub mod settings;
pub mod state;
pub mod surface;
pub mod syntax;

pub use autosave::AutoSave;
pub use buffer::TextBuffer;
pub use format::{
    apply_format, format_selection, FormatRequest, ListKind, Prompt, PromptKind, PromptRequest,
};
pub use history::{EditOperation, History};
pub use render::{
    Highlighter, HtmlSanitizer, LivePreview, PreviewSurface, RenderPipeline, Sanitizer,
    SharedPreview,
};
pub use search::FindReplace;
pub use selection::{SearchMatch, Selection};
pub use settings::EditorSettings;
pub use state::{ContentObserver, EditorState};
pub use surface::{EditSurface, TextSurface};
pub use syntax::{Language, SyntaxHighlighter, Theme, ThemeKind};
