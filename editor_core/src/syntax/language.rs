//! Language lookup for fenced code blocks.
//!
//! Resolves fence info strings to languages and provides the
//! tree-sitter grammar for each.

/// Languages the highlighter knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    Json,
    #[default]
    PlainText,
}

impl Language {
    /// Returns all languages, in auto-detection priority order.
    ///
    /// Detection ties go to the earlier entry. JSON is a near subset of the
    /// other grammars' expression syntax, so it comes first.
    pub fn all() -> &'static [Language] {
        &[
            Language::Json,
            Language::JavaScript,
            Language::TypeScript,
            Language::Rust,
            Language::Python,
            Language::C,
            Language::Cpp,
            Language::PlainText,
        ]
    }

    /// Resolves a fence info token (`rust`, `py`, `c++`, ...).
    /// Returns `None` for tokens the highlighter does not recognise.
    pub fn from_token(token: &str) -> Option<Self> {
        let lang = match token.trim().to_lowercase().as_str() {
            "rust" | "rs" => Self::Rust,
            "python" | "py" | "python3" | "pyw" | "pyi" => Self::Python,
            "javascript" | "js" | "jsx" | "mjs" | "cjs" | "node" => Self::JavaScript,
            "typescript" | "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "c" | "h" => Self::C,
            "cpp" | "c++" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "json" | "jsonc" | "json5" => Self::Json,
            "text" | "txt" | "plain" | "plaintext" => Self::PlainText,
            _ => return None,
        };
        Some(lang)
    }

    /// Returns the display name of the language.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::Json => "JSON",
            Self::PlainText => "Plain Text",
        }
    }

    /// Returns the tree-sitter language for this language, if available.
    pub fn tree_sitter_language(&self) -> Option<tree_sitter::Language> {
        match self {
            Self::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Self::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Self::C => Some(tree_sitter_c::LANGUAGE.into()),
            Self::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
            Self::Json => Some(tree_sitter_json::LANGUAGE.into()),
            Self::PlainText => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert_eq!(Language::from_token("rust"), Some(Language::Rust));
        assert_eq!(Language::from_token("RS"), Some(Language::Rust));
        assert_eq!(Language::from_token("py"), Some(Language::Python));
        assert_eq!(Language::from_token("js"), Some(Language::JavaScript));
        assert_eq!(Language::from_token("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_token("c"), Some(Language::C));
        assert_eq!(Language::from_token("c++"), Some(Language::Cpp));
        assert_eq!(Language::from_token("json"), Some(Language::Json));
        assert_eq!(Language::from_token("plaintext"), Some(Language::PlainText));
        assert_eq!(Language::from_token("brainfuck"), None);
        assert_eq!(Language::from_token(""), None);
    }

    #[test]
    fn test_tree_sitter_language() {
        for lang in Language::all() {
            let has_grammar = lang.tree_sitter_language().is_some();
            assert_eq!(has_grammar, *lang != Language::PlainText);
        }
    }
}
