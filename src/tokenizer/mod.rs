//! Source-code tokenizer for the syntax-highlighting display layer.
//!
//! A closed language enum selects one finite-automaton scanner; the
//! scanner emits flat `(kind, text)` tokens. Unknown languages and
//! extensions are sentinels, never errors.

mod langs;
mod scanner;

use langs::LanguageSpec;
use scanner::Scanner;
use serde::{Deserialize, Serialize};

/// Languages this frontend can highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    C,
    Asm,
    D,
    Go,
    Rust,
    Ada,
    /// The frontend's own help/rc dialect.
    Help,
    Unknown,
}

/// Extension table; matched case-insensitively with or without the dot.
static EXTENSIONS: &[(&str, Language)] = &[
    ("c", Language::C),
    ("h", Language::C),
    ("cc", Language::C),
    ("cpp", Language::C),
    ("cxx", Language::C),
    ("c++", Language::C),
    ("hpp", Language::C),
    ("hh", Language::C),
    ("hxx", Language::C),
    ("s", Language::Asm),
    ("asm", Language::Asm),
    ("d", Language::D),
    ("di", Language::D),
    ("go", Language::Go),
    ("rs", Language::Rust),
    ("ada", Language::Ada),
    ("adb", Language::Ada),
    ("ads", Language::Ada),
];

impl Language {
    /// Map a file extension (".rs" or "rs") to a language tag.
    pub fn from_extension(extension: &str) -> Language {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        for (candidate, language) in EXTENSIONS {
            if candidate.eq_ignore_ascii_case(ext) {
                return *language;
            }
        }
        Language::Unknown
    }

    /// Map a language name to a tag.
    pub fn from_name(name: &str) -> Language {
        match name.to_ascii_lowercase().as_str() {
            "c" | "c++" | "cpp" => Language::C,
            "asm" | "assembly" => Language::Asm,
            "d" => Language::D,
            "go" => Language::Go,
            "rust" => Language::Rust,
            "ada" => Language::Ada,
            "help" => Language::Help,
            _ => Language::Unknown,
        }
    }

    fn spec(self) -> Option<&'static LanguageSpec> {
        match self {
            Language::C => Some(&langs::C_SPEC),
            Language::Asm => Some(&langs::ASM_SPEC),
            Language::D => Some(&langs::D_SPEC),
            Language::Go => Some(&langs::GO_SPEC),
            Language::Rust => Some(&langs::RUST_SPEC),
            Language::Ada => Some(&langs::ADA_SPEC),
            Language::Help => Some(&langs::HELP_SPEC),
            Language::Unknown => None,
        }
    }
}

/// Token classification.
///
/// `Search` and `StatusBar` are never produced by scanning; they exist
/// so the display layer can use one highlight-group enum throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Keyword,
    Type,
    Literal,
    Number,
    Comment,
    Directive,
    Text,
    Newline,
    Error,
    Search,
    StatusBar,
}

impl TokenKind {
    /// Stable display name of the kind.
    pub fn printable(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Type => "type",
            TokenKind::Literal => "literal",
            TokenKind::Number => "number",
            TokenKind::Comment => "comment",
            TokenKind::Directive => "directive",
            TokenKind::Text => "text",
            TokenKind::Newline => "newline",
            TokenKind::Error => "error",
            TokenKind::Search => "search",
            TokenKind::StatusBar => "status-bar",
        }
    }
}

/// One scanned token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceToken {
    pub kind: TokenKind,
    pub text: String,
}

/// Scanner dispatch: bind a buffer for a language, then pull tokens.
#[derive(Debug, Default)]
pub struct Tokenizer {
    scanner: Option<Scanner>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self { scanner: None }
    }

    /// Bind `content` for scanning as `language`.
    ///
    /// Returns `false` without touching the current binding when the
    /// language is `Unknown`. Rebinding releases the previous buffer.
    pub fn set_buffer(&mut self, content: &str, language: Language) -> bool {
        match language.spec() {
            Some(spec) => {
                self.scanner = Some(Scanner::new(content.to_string(), spec));
                true
            }
            None => false,
        }
    }

    /// Next token of the bound buffer; `None` when no buffer is bound
    /// or input is exhausted.
    pub fn next_token(&mut self) -> Option<SourceToken> {
        self.scanner.as_mut()?.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(Language::from_extension(".rs"), Language::Rust);
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension(".CPP"), Language::C);
        assert_eq!(Language::from_extension(".adb"), Language::Ada);
        assert_eq!(Language::from_extension(".xyz"), Language::Unknown);
    }

    #[test]
    fn name_mapping_selects_rust_for_rust() {
        assert_eq!(Language::from_name("rust"), Language::Rust);
        assert_eq!(Language::from_name("go"), Language::Go);
        assert_eq!(Language::from_name("Ada"), Language::Ada);
        assert_eq!(Language::from_name("cobol"), Language::Unknown);
    }

    #[test]
    fn unknown_language_declines_to_bind() {
        let mut tokenizer = Tokenizer::new();
        assert!(!tokenizer.set_buffer("text", Language::Unknown));
        assert_eq!(tokenizer.next_token(), None);
    }

    #[test]
    fn rebinding_replaces_the_buffer() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.set_buffer("fn main() {}\n", Language::Rust));
        assert_eq!(
            tokenizer.next_token(),
            Some(SourceToken {
                kind: TokenKind::Keyword,
                text: "fn".to_string()
            })
        );

        assert!(tokenizer.set_buffer("package main\n", Language::Go));
        assert_eq!(
            tokenizer.next_token(),
            Some(SourceToken {
                kind: TokenKind::Keyword,
                text: "package".to_string()
            })
        );
    }

    #[test]
    fn scanning_ends_with_none() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_buffer("x\n", Language::C);
        assert!(tokenizer.next_token().is_some());
        assert!(tokenizer.next_token().is_some());
        assert_eq!(tokenizer.next_token(), None);
        assert_eq!(tokenizer.next_token(), None);
    }

    #[test]
    fn help_dialect_highlights_rc_commands() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.set_buffer("# comment\nset winsplit\n", Language::Help);
        assert_eq!(
            tokenizer.next_token().unwrap(),
            SourceToken {
                kind: TokenKind::Comment,
                text: "# comment".to_string()
            }
        );
        tokenizer.next_token(); // newline
        assert_eq!(
            tokenizer.next_token().unwrap(),
            SourceToken {
                kind: TokenKind::Keyword,
                text: "set".to_string()
            }
        );
    }

    #[test]
    fn printable_names_are_stable() {
        assert_eq!(TokenKind::Keyword.printable(), "keyword");
        assert_eq!(TokenKind::StatusBar.printable(), "status-bar");
    }
}
