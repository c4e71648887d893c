//! Markdown formatting commands.
//!
//! `format_selection` computes the replacement for the selected text;
//! `apply_format` commits it to an editing surface as one undoable
//! insertion and restores a sensible selection afterwards.

use crate::selection::Selection;
use crate::surface::EditSurface;

/// Placeholder used for a link with nothing selected.
pub const LINK_PLACEHOLDER: &str = "link text";
/// Placeholder used for an image with nothing selected.
pub const IMAGE_PLACEHOLDER: &str = "image description";

/// Kind of list produced by `FormatRequest::List`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Every line is prefixed with `1. `; Markdown renderers number the items.
    Ordered,
    Unordered,
}

/// A one-shot formatting command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRequest {
    Bold,
    Italic,
    Strikethrough,
    Code,
    Link,
    Image,
    /// Heading level; values outside 1..=6 are clamped.
    Heading(u8),
    Quote,
    List(ListKind),
    CodeBlock,
}

/// What the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    LinkUrl,
    ImageUrl,
    CodeLanguage,
}

/// A request for auxiliary user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub kind: PromptKind,
    pub message: &'static str,
    /// Value pre-filled in the input.
    pub default: &'static str,
}

impl PromptRequest {
    fn for_kind(kind: PromptKind) -> Self {
        match kind {
            PromptKind::LinkUrl => Self {
                kind,
                message: "Enter the link URL:",
                default: "https://",
            },
            PromptKind::ImageUrl => Self {
                kind,
                message: "Enter the image URL:",
                default: "https://",
            },
            PromptKind::CodeLanguage => Self {
                kind,
                message: "Enter the code language:",
                default: "",
            },
        }
    }
}

/// Blocking text input. `None` means the user cancelled.
pub trait Prompt {
    fn ask(&mut self, request: &PromptRequest) -> Option<String>;
}

impl<F> Prompt for F
where
    F: FnMut(&PromptRequest) -> Option<String>,
{
    fn ask(&mut self, request: &PromptRequest) -> Option<String> {
        self(request)
    }
}

/// The text replacing a selection, plus the selection to restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub text: String,
    /// Character range within `text` to select after insertion.
    /// `None` leaves a caret after the inserted text.
    pub select: Option<(usize, usize)>,
    /// False when the command was cancelled and `text` is the original selection.
    pub changed: bool,
}

impl Replacement {
    fn new(text: String) -> Self {
        Self {
            text,
            select: None,
            changed: true,
        }
    }

    fn selecting(text: String, start: usize, end: usize) -> Self {
        Self {
            text,
            select: Some((start, end)),
            changed: true,
        }
    }

    fn unchanged(selected: &str) -> Self {
        Self {
            text: selected.to_string(),
            select: None,
            changed: false,
        }
    }
}

/// Computes the replacement for `selected` under `request`.
///
/// Prompt-based commands (`Link`, `Image`, `CodeBlock`) ask `prompt`
/// first; a cancelled prompt, or an empty URL, yields an unchanged
/// replacement.
pub fn format_selection(
    request: FormatRequest,
    selected: &str,
    prompt: &mut dyn Prompt,
) -> Replacement {
    match request {
        FormatRequest::Bold => wrap(selected, "**"),
        FormatRequest::Italic => wrap(selected, "_"),
        FormatRequest::Strikethrough => wrap(selected, "~~"),
        FormatRequest::Code => wrap(selected, "`"),
        FormatRequest::Link | FormatRequest::Image => {
            let (kind, bang, placeholder) = if request == FormatRequest::Link {
                (PromptKind::LinkUrl, "", LINK_PLACEHOLDER)
            } else {
                (PromptKind::ImageUrl, "!", IMAGE_PLACEHOLDER)
            };

            let url = match prompt.ask(&PromptRequest::for_kind(kind)) {
                Some(url) if !url.trim().is_empty() => url,
                _ => return Replacement::unchanged(selected),
            };

            if selected.is_empty() {
                let start = bang.len() + 1;
                let text = format!("{bang}[{placeholder}]({url})");
                Replacement::selecting(text, start, start + placeholder.chars().count())
            } else {
                Replacement::new(format!("{bang}[{selected}]({url})"))
            }
        }
        FormatRequest::Heading(level) => {
            let clamped = level.clamp(1, 6);
            if clamped != level {
                log::warn!("Heading level {} out of range, using {}", level, clamped);
            }
            let prefix = "#".repeat(usize::from(clamped));
            Replacement::new(format!("{prefix} {selected}"))
        }
        FormatRequest::Quote => Replacement::new(prefix_lines(selected, "> ")),
        FormatRequest::List(kind) => {
            let prefix = match kind {
                ListKind::Ordered => "1. ",
                ListKind::Unordered => "- ",
            };
            Replacement::new(prefix_lines(selected, prefix))
        }
        FormatRequest::CodeBlock => {
            match prompt.ask(&PromptRequest::for_kind(PromptKind::CodeLanguage)) {
                Some(language) => {
                    Replacement::new(format!("```{}\n{}\n```", language.trim(), selected))
                }
                None => Replacement::unchanged(selected),
            }
        }
    }
}

/// Surrounds `selected` with `delimiter` and keeps the inner text selected.
fn wrap(selected: &str, delimiter: &str) -> Replacement {
    let start = delimiter.chars().count();
    let text = format!("{delimiter}{selected}{delimiter}");
    Replacement::selecting(text, start, start + selected.chars().count())
}

/// Prefixes every line of `text` (including empty ones) with `prefix`.
fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies `request` to the surface's current selection.
///
/// Returns true if the surface was modified.
pub fn apply_format<S: EditSurface + ?Sized>(
    surface: &mut S,
    request: FormatRequest,
    prompt: &mut dyn Prompt,
) -> bool {
    let selected = surface.selected_text();
    let replacement = format_selection(request, &selected, prompt);
    if !replacement.changed {
        log::debug!("{:?} cancelled", request);
        return false;
    }

    let (start, _) = surface.selection().range();
    surface.insert_text(&replacement.text);
    if let Some((from, to)) = replacement.select {
        surface.set_selection(Selection::with_range(start + from, start + to));
    }
    true
}
