//! Code block highlighter using tree-sitter.
//!
//! Turns a code fragment into escaped HTML with `<span class="hl-...">`
//! wrappers. Falls back to automatic language detection when no usable
//! hint is given, and to plain escaped text when nothing fits.

use super::language::Language;
use super::theme::TokenStyle;
use tree_sitter::{Node, Parser, TreeCursor};

/// A highlighted span of source bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    /// Start byte offset in the source.
    pub start_byte: usize,
    /// End byte offset in the source.
    pub end_byte: usize,
    pub style: TokenStyle,
}

impl HighlightSpan {
    pub fn new(start_byte: usize, end_byte: usize, style: TokenStyle) -> Self {
        Self {
            start_byte,
            end_byte,
            style,
        }
    }
}

/// Escapes text for inclusion in HTML element content or attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text);
    out
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// Syntax highlighter producing HTML.
///
/// Holds one parser that is re-targeted per call; output depends only on
/// the input fragment and hint.
pub struct SyntaxHighlighter {
    parser: Parser,
}

impl SyntaxHighlighter {
    /// Creates a new syntax highlighter.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    /// Highlights `code`, using `lang` as a hint.
    ///
    /// A recognised hint selects that grammar; an absent or unknown hint
    /// triggers auto-detection. Plain-text hints and failed detection
    /// return the code escaped but unhighlighted. Never fails.
    pub fn highlight(&mut self, code: &str, lang: Option<&str>) -> String {
        let hinted = lang
            .filter(|token| !token.trim().is_empty())
            .and_then(Language::from_token);

        let language = match hinted {
            Some(Language::PlainText) => None,
            Some(language) => Some(language),
            None => {
                if let Some(token) = lang {
                    log::debug!("Unknown code language '{}', detecting", token);
                }
                self.detect(code)
            }
        };

        language
            .and_then(|language| self.highlight_as(code, language))
            .unwrap_or_else(|| escape_html(code))
    }

    /// Guesses the language of a fragment.
    ///
    /// Every grammar parses the code; grammars reporting syntax errors are
    /// discarded and the one yielding the most highlighted tokens wins.
    /// Returns `None` if no grammar parses cleanly with at least one token.
    pub fn detect(&mut self, code: &str) -> Option<Language> {
        let mut best: Option<(Language, usize)> = None;

        for &language in Language::all() {
            let Some(spans) = self.collect_spans(code, language) else {
                continue;
            };
            let score = spans.len();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((language, score));
            }
        }

        if let Some((language, score)) = best {
            log::debug!("Detected {} ({} tokens)", language.name(), score);
        }
        best.map(|(language, _)| language)
    }

    /// Highlights with a specific grammar. Returns `None` if the grammar
    /// cannot be loaded or the parse fails.
    pub fn highlight_as(&mut self, code: &str, language: Language) -> Option<String> {
        let ts_language = language.tree_sitter_language()?;
        if let Err(e) = self.parser.set_language(&ts_language) {
            log::warn!("Failed to load {} grammar: {}", language.name(), e);
            return None;
        }
        let tree = self.parser.parse(code, None)?;

        let mut spans = Vec::new();
        let mut cursor = tree.walk();
        Self::collect_highlights(&mut cursor, language, &mut spans);
        Some(Self::render_spans(code, spans))
    }

    /// Parses `code` and returns its spans, or `None` if the grammar is
    /// unavailable or the parse contains errors.
    fn collect_spans(&mut self, code: &str, language: Language) -> Option<Vec<HighlightSpan>> {
        let ts_language = language.tree_sitter_language()?;
        self.parser.set_language(&ts_language).ok()?;
        let tree = self.parser.parse(code, None)?;
        if tree.root_node().has_error() {
            return None;
        }

        let mut spans = Vec::new();
        let mut cursor = tree.walk();
        Self::collect_highlights(&mut cursor, language, &mut spans);
        Some(spans)
    }

    /// Recursively collects highlights from the tree (pre-order).
    fn collect_highlights(
        cursor: &mut TreeCursor,
        language: Language,
        spans: &mut Vec<HighlightSpan>,
    ) {
        loop {
            let node = cursor.node();

            if let Some(style) = Self::node_style(&node, language) {
                if node.start_byte() < node.end_byte() {
                    spans.push(HighlightSpan::new(node.start_byte(), node.end_byte(), style));
                }
            }

            if cursor.goto_first_child() {
                Self::collect_highlights(cursor, language, spans);
                cursor.goto_parent();
            }

            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    /// Writes escaped source with non-overlapping spans; outer nodes win.
    fn render_spans(source: &str, mut spans: Vec<HighlightSpan>) -> String {
        spans.sort_by(|a, b| {
            a.start_byte
                .cmp(&b.start_byte)
                .then(b.end_byte.cmp(&a.end_byte))
        });

        let mut out = String::with_capacity(source.len() + spans.len() * 32);
        let mut pos = 0;
        for span in spans {
            if span.start_byte < pos {
                continue;
            }
            let (Some(before), Some(token)) = (
                source.get(pos..span.start_byte),
                source.get(span.start_byte..span.end_byte),
            ) else {
                continue;
            };
            push_escaped(&mut out, before);
            out.push_str("<span class=\"");
            out.push_str(span.style.class_name());
            out.push_str("\">");
            push_escaped(&mut out, token);
            out.push_str("</span>");
            pos = span.end_byte;
        }
        push_escaped(&mut out, source.get(pos..).unwrap_or_default());
        out
    }

    /// Determines the token style for a tree-sitter node.
    fn node_style(node: &Node, language: Language) -> Option<TokenStyle> {
        let kind = node.kind();

        match language {
            Language::Rust => Self::rust_node_style(node, kind),
            Language::Python => Self::python_node_style(node, kind),
            Language::JavaScript | Language::TypeScript => Self::js_ts_node_style(node, kind),
            Language::C | Language::Cpp => Self::c_cpp_node_style(node, kind),
            Language::Json => Self::json_node_style(node, kind),
            Language::PlainText => None,
        }
    }

    fn rust_node_style(node: &Node, kind: &str) -> Option<TokenStyle> {
        match kind {
            "fn" | "let" | "mut" | "const" | "static" | "pub" | "mod" | "use" | "crate"
            | "self" | "super" | "impl" | "trait" | "struct" | "enum" | "type" | "where"
            | "async" | "await" | "dyn" | "extern" | "ref" | "unsafe" | "as" | "in" => {
                Some(TokenStyle::Keyword)
            }

            "if" | "else" | "match" | "for" | "while" | "loop" | "break" | "continue"
            | "return" | "yield" => Some(TokenStyle::ControlFlow),

            "string_literal" | "raw_string_literal" => Some(TokenStyle::String),
            "char_literal" => Some(TokenStyle::Char),
            "integer_literal" | "float_literal" => Some(TokenStyle::Number),
            "true" | "false" => Some(TokenStyle::Boolean),

            "line_comment" | "block_comment" => Some(TokenStyle::Comment),

            "type_identifier" | "primitive_type" => Some(TokenStyle::Type),

            "identifier" => {
                let parent = node.parent()?;
                match parent.kind() {
                    "function_item" | "function_signature_item"
                        if parent.child_by_field_name("name") == Some(*node) =>
                    {
                        Some(TokenStyle::Function)
                    }
                    "call_expression" if parent.child_by_field_name("function") == Some(*node) => {
                        Some(TokenStyle::Function)
                    }
                    "macro_invocation" => Some(TokenStyle::Macro),
                    _ => None,
                }
            }

            "!" if node.parent().map(|p| p.kind()) == Some("macro_invocation") => {
                Some(TokenStyle::Macro)
            }

            "attribute_item" | "inner_attribute_item" => Some(TokenStyle::Attribute),

            "lifetime" => Some(TokenStyle::Lifetime),

            _ => None,
        }
    }

    fn json_node_style(node: &Node, kind: &str) -> Option<TokenStyle> {
        match kind {
            "string" => {
                // Object keys are the first child of a pair.
                if let Some(parent) = node.parent() {
                    if parent.kind() == "pair"
                        && parent.child(0).map(|first| first.id()) == Some(node.id())
                    {
                        return Some(TokenStyle::Variable);
                    }
                }
                Some(TokenStyle::String)
            }
            "number" => Some(TokenStyle::Number),
            "true" | "false" => Some(TokenStyle::Boolean),
            "null" => Some(TokenStyle::Constant),
            _ => None,
        }
    }

    fn python_node_style(node: &Node, kind: &str) -> Option<TokenStyle> {
        match kind {
            "def" | "class" | "import" | "from" | "as" | "global" | "nonlocal" | "lambda"
            | "with" | "assert" | "yield" | "del" | "pass" | "raise" | "except" | "finally"
            | "try" | "async" | "await" => Some(TokenStyle::Keyword),

            "if" | "elif" | "else" | "for" | "while" | "break" | "continue" | "return" | "in"
            | "not" | "and" | "or" | "is" => Some(TokenStyle::ControlFlow),

            "string" => Some(TokenStyle::String),
            "integer" | "float" => Some(TokenStyle::Number),
            "true" | "false" => Some(TokenStyle::Boolean),
            "none" => Some(TokenStyle::Constant),

            "comment" => Some(TokenStyle::Comment),

            "decorator" => Some(TokenStyle::Attribute),

            "identifier" => {
                let parent = node.parent()?;
                match parent.kind() {
                    "function_definition" | "class_definition"
                        if parent.child_by_field_name("name") == Some(*node) =>
                    {
                        Some(TokenStyle::Function)
                    }
                    "call" if parent.child_by_field_name("function") == Some(*node) => {
                        Some(TokenStyle::Function)
                    }
                    _ => None,
                }
            }

            _ => None,
        }
    }

    fn js_ts_node_style(node: &Node, kind: &str) -> Option<TokenStyle> {
        match kind {
            "function" | "const" | "let" | "var" | "class" | "extends" | "import" | "export"
            | "default" | "from" | "as" | "new" | "this" | "super" | "static" | "get" | "set"
            | "async" | "await" | "typeof" | "instanceof" | "void" | "delete" | "in" | "of" => {
                Some(TokenStyle::Keyword)
            }

            "type" | "interface" | "enum" | "namespace" | "module" | "declare" | "readonly"
            | "abstract" | "implements" | "private" | "protected" | "public" => {
                Some(TokenStyle::Keyword)
            }

            "if" | "else" | "for" | "while" | "do" | "switch" | "case" | "break" | "continue"
            | "return" | "throw" | "try" | "catch" | "finally" | "yield" => {
                Some(TokenStyle::ControlFlow)
            }

            "string" | "template_string" => Some(TokenStyle::String),
            "number" => Some(TokenStyle::Number),
            "true" | "false" => Some(TokenStyle::Boolean),
            "null" | "undefined" => Some(TokenStyle::Constant),

            "comment" => Some(TokenStyle::Comment),

            "type_identifier" | "predefined_type" => Some(TokenStyle::Type),

            "identifier" | "property_identifier" => {
                let parent = node.parent()?;
                match parent.kind() {
                    "function_declaration" | "method_definition" | "class_declaration"
                        if parent.child_by_field_name("name") == Some(*node) =>
                    {
                        Some(TokenStyle::Function)
                    }
                    "call_expression" if parent.child_by_field_name("function") == Some(*node) => {
                        Some(TokenStyle::Function)
                    }
                    // `obj.method()`: the property of a called member expression.
                    "member_expression"
                        if parent.child_by_field_name("property") == Some(*node)
                            && parent
                                .parent()
                                .filter(|call| call.kind() == "call_expression")
                                .and_then(|call| call.child_by_field_name("function"))
                                == Some(parent) =>
                    {
                        Some(TokenStyle::Function)
                    }
                    _ => None,
                }
            }

            _ => None,
        }
    }

    fn c_cpp_node_style(node: &Node, kind: &str) -> Option<TokenStyle> {
        match kind {
            "auto" | "const" | "enum" | "extern" | "inline" | "register" | "restrict"
            | "signed" | "sizeof" | "static" | "struct" | "typedef" | "union" | "unsigned"
            | "void" | "volatile" => Some(TokenStyle::Keyword),

            "class" | "namespace" | "template" | "typename" | "virtual" | "override" | "final"
            | "public" | "private" | "protected" | "friend" | "new" | "delete" | "this"
            | "using" | "constexpr" | "noexcept" | "decltype" | "explicit" | "mutable"
            | "operator" => Some(TokenStyle::Keyword),

            "if" | "else" | "for" | "while" | "do" | "switch" | "case" | "default" | "break"
            | "continue" | "return" | "goto" | "throw" | "try" | "catch" => {
                Some(TokenStyle::ControlFlow)
            }

            "string_literal" | "char_literal" | "raw_string_literal" | "system_lib_string" => {
                Some(TokenStyle::String)
            }
            "number_literal" => Some(TokenStyle::Number),
            "true" | "false" => Some(TokenStyle::Boolean),
            "null" | "nullptr" => Some(TokenStyle::Constant),

            "comment" => Some(TokenStyle::Comment),

            "type_identifier" | "primitive_type" | "sized_type_specifier" => Some(TokenStyle::Type),

            "#include" | "#define" | "#ifdef" | "#ifndef" | "#if" | "#else" | "#elif"
            | "#endif" | "preproc_directive" => Some(TokenStyle::Attribute),

            "identifier" => {
                let parent = node.parent()?;
                match parent.kind() {
                    "function_declarator"
                        if parent.child_by_field_name("declarator") == Some(*node) =>
                    {
                        Some(TokenStyle::Function)
                    }
                    "call_expression" if parent.child_by_field_name("function") == Some(*node) => {
                        Some(TokenStyle::Function)
                    }
                    _ => None,
                }
            }

            _ => None,
        }
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
