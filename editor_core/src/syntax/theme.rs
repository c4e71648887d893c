//! Theme system for syntax highlighting.
//!
//! Highlighted code is emitted with one CSS class per token style; a theme
//! maps those classes to colors and renders them as a stylesheet.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Token style categories for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenStyle {
    /// Keywords (fn, let, class, etc.)
    Keyword,
    /// Control flow keywords (if, else, for, while, match, etc.)
    ControlFlow,
    String,
    Char,
    Number,
    Comment,
    Function,
    Type,
    Variable,
    /// Constants and null-like values
    Constant,
    /// Attributes, decorators and preprocessor directives
    Attribute,
    Macro,
    Lifetime,
    Boolean,
}

impl TokenStyle {
    /// Every style, in stylesheet order.
    pub const ALL: [TokenStyle; 14] = [
        TokenStyle::Keyword,
        TokenStyle::ControlFlow,
        TokenStyle::String,
        TokenStyle::Char,
        TokenStyle::Number,
        TokenStyle::Comment,
        TokenStyle::Function,
        TokenStyle::Type,
        TokenStyle::Variable,
        TokenStyle::Constant,
        TokenStyle::Attribute,
        TokenStyle::Macro,
        TokenStyle::Lifetime,
        TokenStyle::Boolean,
    ];

    /// CSS class used in highlighted markup.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Keyword => "hl-keyword",
            Self::ControlFlow => "hl-control",
            Self::String => "hl-string",
            Self::Char => "hl-char",
            Self::Number => "hl-number",
            Self::Comment => "hl-comment",
            Self::Function => "hl-function",
            Self::Type => "hl-type",
            Self::Variable => "hl-variable",
            Self::Constant => "hl-constant",
            Self::Attribute => "hl-attribute",
            Self::Macro => "hl-macro",
            Self::Lifetime => "hl-lifetime",
            Self::Boolean => "hl-boolean",
        }
    }
}

/// Built-in preview themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeKind {
    #[default]
    Github,
    GithubDark,
}

impl ThemeKind {
    /// Parses a theme name as written in settings (`github`, `github-dark`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "github" | "github-light" => Some(Self::Github),
            "github-dark" => Some(Self::GithubDark),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::GithubDark => "github-dark",
        }
    }
}

/// A syntax highlighting theme. Colors are CSS color strings.
#[derive(Debug, Clone)]
pub struct Theme {
    pub kind: ThemeKind,
    pub background: &'static str,
    pub foreground: &'static str,
    colors: HashMap<TokenStyle, &'static str>,
}

impl Theme {
    fn new(kind: ThemeKind, background: &'static str, foreground: &'static str) -> Self {
        Self {
            kind,
            background,
            foreground,
            colors: HashMap::new(),
        }
    }

    /// Returns the theme for a kind.
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Github => Self::github(),
            ThemeKind::GithubDark => Self::github_dark(),
        }
    }

    /// Sets the color for a token style.
    pub fn set_color(&mut self, style: TokenStyle, color: &'static str) {
        self.colors.insert(style, color);
    }

    /// Gets the color for a token style, falling back to foreground.
    pub fn color(&self, style: TokenStyle) -> &'static str {
        self.colors.get(&style).copied().unwrap_or(self.foreground)
    }

    /// GitHub light palette.
    pub fn github() -> Self {
        let mut theme = Self::new(ThemeKind::Github, "#f6f8fa", "#24292e");

        theme.set_color(TokenStyle::Keyword, "#d73a49");
        theme.set_color(TokenStyle::ControlFlow, "#d73a49");
        theme.set_color(TokenStyle::String, "#032f62");
        theme.set_color(TokenStyle::Char, "#032f62");
        theme.set_color(TokenStyle::Number, "#005cc5");
        theme.set_color(TokenStyle::Boolean, "#005cc5");
        theme.set_color(TokenStyle::Constant, "#005cc5");
        theme.set_color(TokenStyle::Comment, "#6a737d");
        theme.set_color(TokenStyle::Function, "#6f42c1");
        theme.set_color(TokenStyle::Macro, "#6f42c1");
        theme.set_color(TokenStyle::Type, "#e36209");
        theme.set_color(TokenStyle::Variable, "#e36209");
        theme.set_color(TokenStyle::Attribute, "#005cc5");
        theme.set_color(TokenStyle::Lifetime, "#e36209");

        theme
    }

    /// GitHub dark palette.
    pub fn github_dark() -> Self {
        let mut theme = Self::new(ThemeKind::GithubDark, "#0d1117", "#c9d1d9");

        theme.set_color(TokenStyle::Keyword, "#ff7b72");
        theme.set_color(TokenStyle::ControlFlow, "#ff7b72");
        theme.set_color(TokenStyle::String, "#a5d6ff");
        theme.set_color(TokenStyle::Char, "#a5d6ff");
        theme.set_color(TokenStyle::Number, "#79c0ff");
        theme.set_color(TokenStyle::Boolean, "#79c0ff");
        theme.set_color(TokenStyle::Constant, "#79c0ff");
        theme.set_color(TokenStyle::Comment, "#8b949e");
        theme.set_color(TokenStyle::Function, "#d2a8ff");
        theme.set_color(TokenStyle::Macro, "#d2a8ff");
        theme.set_color(TokenStyle::Type, "#ffa657");
        theme.set_color(TokenStyle::Variable, "#ffa657");
        theme.set_color(TokenStyle::Attribute, "#79c0ff");
        theme.set_color(TokenStyle::Lifetime, "#ffa657");

        theme
    }

    /// Renders the theme as CSS for code blocks and `hl-` token classes.
    pub fn stylesheet(&self) -> String {
        let mut css = String::new();
        let _ = writeln!(
            css,
            concat!(
                "pre code {{ display: block; padding: 1em; overflow-x: auto; ",
                "background: {}; color: {}; }}",
            ),
            self.background, self.foreground
        );
        for style in TokenStyle::ALL {
            let _ = writeln!(css, ".{} {{ color: {}; }}", style.class_name(), self.color(style));
        }
        let _ = writeln!(css, ".{} {{ font-style: italic; }}", TokenStyle::Comment.class_name());
        css
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::github()
    }
}
