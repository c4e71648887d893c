//! Markdown to sanitized HTML.
//!
//! `pulldown-cmark` converts Markdown (GFM extensions, hard line breaks),
//! code blocks go through the syntax highlighter, and the result passes an
//! HTML sanitizer. Rendering never fails: a failing code block degrades to
//! escaped text, a failing document degrades to an escaped `<pre>`.

use crate::settings::EditorSettings;
use crate::state::ContentObserver;
use crate::syntax::{escape_html, SyntaxHighlighter, Theme};
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Strips script-execution vectors from HTML.
pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

/// Turns a code block into highlighted, escaped HTML.
pub trait Highlighter {
    fn highlight(&mut self, code: &str, lang: Option<&str>) -> String;

    /// Drops internal state after a failed call.
    fn reset(&mut self) {}
}

impl Highlighter for SyntaxHighlighter {
    fn highlight(&mut self, code: &str, lang: Option<&str>) -> String {
        SyntaxHighlighter::highlight(self, code, lang)
    }

    fn reset(&mut self) {
        *self = SyntaxHighlighter::new();
    }
}

/// `ammonia`-backed sanitizer.
///
/// Keeps `class` attributes (highlight and language markers) and
/// disabled task-list checkboxes on top of ammonia's defaults.
pub struct HtmlSanitizer {
    builder: ammonia::Builder<'static>,
}

impl HtmlSanitizer {
    pub fn new() -> Self {
        let mut builder = ammonia::Builder::default();
        builder
            .add_generic_attributes(&["class"])
            .add_tags(&["input"])
            .add_tag_attributes("input", &["type", "checked", "disabled"]);
        Self { builder }
    }
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

/// A render target for the preview.
pub trait PreviewSurface {
    /// Replaces the preview markup.
    fn set_html(&mut self, html: &str);
}

/// Preview target shared between the editor and whoever displays it.
#[derive(Debug, Clone, Default)]
pub struct SharedPreview {
    html: Rc<RefCell<String>>,
}

impl SharedPreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest markup.
    pub fn html(&self) -> String {
        self.html.borrow().clone()
    }
}

impl PreviewSurface for SharedPreview {
    fn set_html(&mut self, html: &str) {
        let mut current = self.html.borrow_mut();
        current.clear();
        current.push_str(html);
    }
}

/// Markdown options: GitHub-flavoured extensions.
fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// A code block being collected from the event stream.
struct PendingCode {
    lang: Option<String>,
    source: String,
}

/// Markdown render pipeline.
pub struct RenderPipeline {
    highlighter: Box<dyn Highlighter>,
    sanitizer: Box<dyn Sanitizer>,
}

impl RenderPipeline {
    /// Creates a pipeline with the tree-sitter highlighter and the default sanitizer.
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(SyntaxHighlighter::new()),
            Box::new(HtmlSanitizer::new()),
        )
    }

    pub fn with_sanitizer(sanitizer: Box<dyn Sanitizer>) -> Self {
        Self::with_parts(Box::new(SyntaxHighlighter::new()), sanitizer)
    }

    pub fn with_highlighter(highlighter: Box<dyn Highlighter>) -> Self {
        Self::with_parts(highlighter, Box::new(HtmlSanitizer::new()))
    }

    pub fn with_parts(highlighter: Box<dyn Highlighter>, sanitizer: Box<dyn Sanitizer>) -> Self {
        Self {
            highlighter,
            sanitizer,
        }
    }

    /// Renders Markdown to sanitized HTML.
    pub fn render(&mut self, content: &str) -> String {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let html = self.markdown_to_html(content);
            self.sanitizer.sanitize(&html)
        }));

        match result {
            Ok(html) => html,
            Err(_) => {
                log::error!("Markdown render failed, falling back to plain text");
                self.highlighter.reset();
                format!("<pre>{}</pre>", escape_html(content))
            }
        }
    }

    /// Renders a standalone HTML page with the theme stylesheet and font settings.
    pub fn render_document(&mut self, content: &str, settings: &EditorSettings) -> String {
        let body = self.render(content);
        let theme = Theme::from_kind(settings.theme);
        let font_family: String = settings
            .font_family
            .chars()
            .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
            .collect();

        format!(
            concat!(
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n",
                "body {{ font-family: {}; font-size: {}px; margin: 2em auto; max-width: 50em; }}\n",
                "{}</style>\n</head>\n<body>\n<article class=\"markdown-body\">\n{}</article>\n",
                "</body>\n</html>\n",
            ),
            font_family,
            settings.font_size,
            theme.stylesheet(),
            body
        )
    }

    /// Converts Markdown to (unsanitized) HTML, highlighting code blocks.
    fn markdown_to_html(&mut self, content: &str) -> String {
        let mut events = Vec::new();
        let mut pending: Option<PendingCode> = None;

        for event in Parser::new_ext(content, markdown_options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    pending = Some(PendingCode {
                        lang,
                        source: String::new(),
                    });
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(code) = pending.take() {
                        events.push(Event::Html(self.code_block_html(&code).into()));
                    }
                }
                Event::Text(text) if pending.is_some() => {
                    if let Some(code) = pending.as_mut() {
                        code.source.push_str(&text);
                    }
                }
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(content.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn code_block_html(&mut self, code: &PendingCode) -> String {
        let lang = code.lang.as_deref();
        let highlighted = panic::catch_unwind(AssertUnwindSafe(|| {
            self.highlighter.highlight(&code.source, lang)
        }))
        .unwrap_or_else(|_| {
            log::error!("Highlighting failed for {:?} block", lang);
            self.highlighter.reset();
            escape_html(&code.source)
        });

        match lang {
            Some(lang) => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(lang),
                highlighted
            ),
            None => format!("<pre><code>{}</code></pre>\n", highlighted),
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-renders a preview whenever editor content changes.
pub struct LivePreview {
    pipeline: RenderPipeline,
    target: Box<dyn PreviewSurface>,
}

impl LivePreview {
    pub fn new(pipeline: RenderPipeline, target: Box<dyn PreviewSurface>) -> Self {
        Self { pipeline, target }
    }
}

impl ContentObserver for LivePreview {
    fn content_changed(&mut self, content: &str, settings: &EditorSettings) {
        if !settings.is_live_preview {
            return;
        }
        let html = self.pipeline.render(content);
        self.target.set_html(&html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PanickingSanitizer;

    impl Sanitizer for PanickingSanitizer {
        fn sanitize(&self, _html: &str) -> String {
            panic!("sanitizer exploded");
        }
    }

    /// Fails on any block containing `boom`.
    struct FragileHighlighter;

    impl Highlighter for FragileHighlighter {
        fn highlight(&mut self, code: &str, _lang: Option<&str>) -> String {
            if code.contains("boom") {
                panic!("highlighter exploded");
            }
            format!("<span class=\"hl-string\">{}</span>", escape_html(code))
        }
    }

    #[test]
    fn test_basic_markdown() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("# Title\n\n**bold** and _it_ and ~~gone~~");

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>it</em>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_soft_breaks_become_line_breaks() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("line one\nline two");
        assert!(html.contains("<br"));
    }

    #[test]
    fn test_gfm_tables_and_tasks() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n- [ ] todo\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("```rust\nfn main() {}\n```\n");
        assert!(html.contains("class=\"language-rust\""));
        assert!(html.contains("<span class=\"hl-keyword\">fn</span>"));
    }

    #[test]
    fn test_code_block_markup_is_escaped() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("```text\n<b>not bold</b>\n```\n");
        assert!(html.contains("&lt;b&gt;not bold&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_script_is_stripped() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("<script>alert(1)</script>");
        assert!(!html.contains("<script"));

        let html = pipeline.render("hello <script>alert(1)</script> world");
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_unsafe_attributes_and_urls_are_stripped() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline
            .render("<img src=\"x.png\" onerror=\"alert(1)\">\n\n[click](javascript:alert(1))");
        assert!(!html.contains("onerror"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_safe_links_survive() {
        let mut pipeline = RenderPipeline::new();
        let html = pipeline.render("[site](https://example.com)");
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut pipeline = RenderPipeline::new();
        let content = "# Doc\n\n```\nlet x = 1;\n```\n\n<script>x()</script>";
        let first = pipeline.render(content);
        let second = pipeline.render(content);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_content() {
        let mut pipeline = RenderPipeline::new();
        assert!(pipeline.render("").trim().is_empty());
    }

    #[test]
    fn test_sanitizer_failure_degrades_to_plain_text() {
        let mut pipeline = RenderPipeline::with_sanitizer(Box::new(PanickingSanitizer));
        let html = pipeline.render("# <b>hi</b>");
        assert_eq!(html, "<pre># &lt;b&gt;hi&lt;/b&gt;</pre>");
    }

    #[test]
    fn test_highlighter_failure_only_degrades_that_block() {
        let mut pipeline = RenderPipeline::with_highlighter(Box::new(FragileHighlighter));
        let html = pipeline.render(
            "# Title\n\n```rust\nboom <b>x</b>\n```\n\n```rust\nfine\n```\n\nafter *text*",
        );

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<code class=\"language-rust\">boom &lt;b&gt;x&lt;/b&gt;\n</code>"));
        assert!(html.contains("<span class=\"hl-string\">fine\n</span>"));
        assert!(html.contains("<em>text</em>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_render_document() {
        let mut pipeline = RenderPipeline::new();
        let settings = EditorSettings {
            font_family: "Inter; } body { color: red".to_string(),
            ..EditorSettings::default()
        };
        let page = pipeline.render_document("# Hi", &settings);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<h1>Hi</h1>"));
        assert!(page.contains(".hl-keyword"));
        assert!(page.contains("font-size: 16px"));
        assert!(!page.contains("Inter;"));
    }

    #[test]
    fn test_live_preview_respects_toggle() {
        let preview = SharedPreview::new();
        let mut live = LivePreview::new(RenderPipeline::new(), Box::new(preview.clone()));

        let mut settings = EditorSettings::default();
        live.content_changed("*one*", &settings);
        assert!(preview.html().contains("<em>one</em>"));

        settings.is_live_preview = false;
        live.content_changed("*two*", &settings);
        assert!(preview.html().contains("<em>one</em>"));
    }
}
