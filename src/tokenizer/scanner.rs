//! Generic finite-automaton scanner driven by a language table.

use crate::tokenizer::langs::{BlockComment, LanguageSpec};
use crate::tokenizer::{SourceToken, TokenKind};

#[derive(Debug)]
pub(crate) struct Scanner {
    src: String,
    pos: usize,
    spec: &'static LanguageSpec,
}

impl Scanner {
    pub(crate) fn new(src: String, spec: &'static LanguageSpec) -> Self {
        Self { src, pos: 0, spec }
    }

    /// Produce the next token, or `None` at end of input.
    ///
    /// Malformed constructs (unterminated strings or comments) come
    /// back as `TokenKind::Error` tokens; scanning continues after
    /// them.
    pub(crate) fn next_token(&mut self) -> Option<SourceToken> {
        let rest = &self.src[self.pos..];
        let first = rest.chars().next()?;

        if first == '\n' {
            return Some(self.take(1, TokenKind::Newline));
        }

        for marker in self.spec.line_comments.iter().copied() {
            if rest.starts_with(marker) {
                let len = rest.find('\n').unwrap_or(rest.len());
                return Some(self.take(len, TokenKind::Comment));
            }
        }

        for block in self.spec.block_comments {
            if rest.starts_with(block.open) {
                return Some(self.scan_block_comment(block));
            }
        }

        if let Some(directive) = self.spec.directive {
            if first == directive.prefix {
                let word_len: usize = rest
                    .chars()
                    .skip(1)
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .map(char::len_utf8)
                    .sum();
                if word_len > 0 {
                    return Some(self.take(first.len_utf8() + word_len, TokenKind::Directive));
                }
            }
        }

        if self.spec.raw_string_quote == Some(first) {
            return Some(self.scan_raw_string(first));
        }

        if self.spec.string_quotes.contains(&first) {
            return Some(self.scan_string(first));
        }

        if self.spec.char_quote == Some(first) {
            if let Some(len) = char_literal_len(rest, first) {
                return Some(self.take(len, TokenKind::Literal));
            }
            // Not a character literal (e.g. an Ada attribute tick).
            return Some(self.take(first.len_utf8(), TokenKind::Text));
        }

        if first.is_ascii_digit() {
            let len: usize = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_')
                .map(char::len_utf8)
                .sum();
            return Some(self.take(len, TokenKind::Number));
        }

        if first.is_alphabetic() || first == '_' {
            let len: usize = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .map(char::len_utf8)
                .sum();
            let kind = self.classify_word(&rest[..len]);
            return Some(self.take(len, kind));
        }

        if matches!(first, ' ' | '\t' | '\r') {
            let len: usize = rest
                .chars()
                .take_while(|c| matches!(c, ' ' | '\t' | '\r'))
                .map(char::len_utf8)
                .sum();
            return Some(self.take(len, TokenKind::Text));
        }

        Some(self.take(first.len_utf8(), TokenKind::Text))
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        let lookup = if self.spec.case_insensitive {
            word.to_ascii_lowercase()
        } else {
            word.to_string()
        };
        if self.spec.keywords.contains(&lookup.as_str()) {
            TokenKind::Keyword
        } else if self.spec.types.contains(&lookup.as_str()) {
            TokenKind::Type
        } else {
            TokenKind::Text
        }
    }

    fn scan_string(&mut self, quote: char) -> SourceToken {
        let rest = &self.src[self.pos..];
        let mut escaped = false;
        for (i, c) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                // Strings do not span lines; leave the newline for the
                // next token.
                '\n' => return self.take(i, TokenKind::Error),
                c if c == quote => return self.take(i + c.len_utf8(), TokenKind::Literal),
                _ => {}
            }
        }
        self.take(rest.len(), TokenKind::Error)
    }

    fn scan_raw_string(&mut self, quote: char) -> SourceToken {
        let rest = &self.src[self.pos..];
        match rest[quote.len_utf8()..].find(quote) {
            Some(idx) => self.take(quote.len_utf8() + idx + quote.len_utf8(), TokenKind::Literal),
            None => self.take(rest.len(), TokenKind::Error),
        }
    }

    fn scan_block_comment(&mut self, block: &BlockComment) -> SourceToken {
        let rest = &self.src[self.pos..];
        let mut depth = 1usize;
        let mut i = block.open.len();
        while i < rest.len() {
            if rest[i..].starts_with(block.close) {
                i += block.close.len();
                depth -= 1;
                if depth == 0 {
                    return self.take(i, TokenKind::Comment);
                }
            } else if block.nestable && rest[i..].starts_with(block.open) {
                i += block.open.len();
                depth += 1;
            } else {
                i += rest[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            }
        }
        self.take(rest.len(), TokenKind::Error)
    }

    fn take(&mut self, len: usize, kind: TokenKind) -> SourceToken {
        let text = self.src[self.pos..self.pos + len].to_string();
        self.pos += len;
        SourceToken { kind, text }
    }
}

/// Byte length of a character literal at the start of `rest`, if one is
/// actually there.
fn char_literal_len(rest: &str, quote: char) -> Option<usize> {
    let mut chars = rest.char_indices();
    chars.next(); // opening quote
    let (_, body) = chars.next()?;
    if body == quote || body == '\n' {
        return None;
    }
    if body == '\\' {
        let (_, escaped) = chars.next()?;
        if escaped == '\n' {
            return None;
        }
    }
    let (idx, closing) = chars.next()?;
    (closing == quote).then(|| idx + closing.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::langs::{ADA_SPEC, C_SPEC, D_SPEC, GO_SPEC, RUST_SPEC};

    fn scan_all(src: &str, spec: &'static LanguageSpec) -> Vec<SourceToken> {
        let mut scanner = Scanner::new(src.to_string(), spec);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn kinds_of(src: &str, spec: &'static LanguageSpec) -> Vec<(TokenKind, String)> {
        scan_all(src, spec)
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn c_directive_comment_and_string() {
        let tokens = kinds_of("#include <stdio.h>\n// note\nint x = \"hi\";\n", &C_SPEC);
        assert_eq!(tokens[0], (TokenKind::Directive, "#include".to_string()));
        assert!(tokens.contains(&(TokenKind::Comment, "// note".to_string())));
        assert!(tokens.contains(&(TokenKind::Type, "int".to_string())));
        assert!(tokens.contains(&(TokenKind::Literal, "\"hi\"".to_string())));
        assert_eq!(tokens.iter().filter(|t| t.0 == TokenKind::Newline).count(), 3);
    }

    #[test]
    fn c_block_comment_spans_lines() {
        let tokens = kinds_of("/* a\n b */x", &C_SPEC);
        assert_eq!(tokens[0], (TokenKind::Comment, "/* a\n b */".to_string()));
        assert_eq!(tokens[1], (TokenKind::Text, "x".to_string()));
    }

    #[test]
    fn rust_nested_block_comment() {
        let tokens = kinds_of("/* outer /* inner */ still */fn", &RUST_SPEC);
        assert_eq!(
            tokens[0],
            (TokenKind::Comment, "/* outer /* inner */ still */".to_string())
        );
        assert_eq!(tokens[1], (TokenKind::Keyword, "fn".to_string()));
    }

    #[test]
    fn d_nestable_plus_comment() {
        let tokens = kinds_of("/+ a /+ b +/ c +/int", &D_SPEC);
        assert_eq!(tokens[0].0, TokenKind::Comment);
        assert_eq!(tokens[1], (TokenKind::Type, "int".to_string()));
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let tokens = kinds_of("\"open\nnext", &C_SPEC);
        assert_eq!(tokens[0], (TokenKind::Error, "\"open".to_string()));
        assert_eq!(tokens[1].0, TokenKind::Newline);
        assert_eq!(tokens[2], (TokenKind::Text, "next".to_string()));
    }

    #[test]
    fn go_raw_string_spans_lines() {
        let tokens = kinds_of("`raw\nstring`", &GO_SPEC);
        assert_eq!(tokens[0], (TokenKind::Literal, "`raw\nstring`".to_string()));
    }

    #[test]
    fn ada_keywords_are_case_insensitive() {
        let tokens = kinds_of("BEGIN Integer; -- note", &ADA_SPEC);
        assert_eq!(tokens[0], (TokenKind::Keyword, "BEGIN".to_string()));
        assert!(tokens.contains(&(TokenKind::Type, "Integer".to_string())));
        assert!(tokens.contains(&(TokenKind::Comment, "-- note".to_string())));
    }

    #[test]
    fn ada_attribute_tick_is_not_a_char_literal() {
        let tokens = kinds_of("X'First 'a'", &ADA_SPEC);
        assert!(tokens.contains(&(TokenKind::Text, "'".to_string())));
        assert!(tokens.contains(&(TokenKind::Literal, "'a'".to_string())));
    }

    #[test]
    fn numbers_with_radix_prefixes() {
        let tokens = kinds_of("0xFF 42 3.14", &C_SPEC);
        let numbers: Vec<_> = tokens
            .into_iter()
            .filter(|t| t.0 == TokenKind::Number)
            .map(|t| t.1)
            .collect();
        assert_eq!(numbers, vec!["0xFF", "42", "3.14"]);
    }

    #[test]
    fn escaped_quote_stays_inside_string() {
        let tokens = kinds_of(r#""a\"b" x"#, &C_SPEC);
        assert_eq!(tokens[0], (TokenKind::Literal, r#""a\"b""#.to_string()));
    }
}
