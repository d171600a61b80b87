//! Incremental tokenizer for GDB/MI output text.
//!
//! The lexer is push-driven: `push` consumes any amount of text,
//! including fragments that end in the middle of a word or c-string,
//! and holds the partial token in its own state until the rest
//! arrives. Consumed text is never re-lexed.

use std::collections::VecDeque;
use tracing::trace;

/// A single MI token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MiToken {
    /// A run of ASCII digits (request-token candidate).
    Digits(String),
    /// Identifier text: class names, variable names.
    Identifier(String),
    /// A decoded c-string payload.
    CString(String),
    /// `^`
    Caret,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `=`, notify sigil and result separator.
    Equal,
    /// `~`
    Tilde,
    /// `@`
    At,
    /// `&`
    Ampersand,
    Comma,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    OpenParen,
    CloseParen,
    Newline,
    /// A byte the MI grammar has no use for; the parser reports it.
    Illegal(char),
}

/// Pending escape inside a c-string.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Escape {
    None,
    /// Saw `\`, waiting for the selector character.
    Backslash,
    /// Collecting up to three octal digits.
    Octal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LexState {
    Ground,
    /// Accumulating an identifier or digit run.
    Word,
    /// Inside a `"` quoted string.
    CString(Escape),
}

#[derive(Debug)]
pub(crate) struct MiLexer {
    state: LexState,
    buf: String,
    tokens: VecDeque<MiToken>,
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

impl MiLexer {
    pub(crate) fn new() -> Self {
        Self {
            state: LexState::Ground,
            buf: String::new(),
            tokens: VecDeque::new(),
        }
    }

    /// Feed text, queueing every token it completes.
    pub(crate) fn push(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_char(ch);
        }
        trace!(queued = self.tokens.len(), "lexer fed {} bytes", text.len());
    }

    /// Whether a full line (terminated by `Newline`) is queued.
    pub(crate) fn has_complete_line(&self) -> bool {
        self.tokens.contains(&MiToken::Newline)
    }

    /// Drain and return one line of tokens, excluding its `Newline`.
    ///
    /// Callers must check `has_complete_line` first.
    pub(crate) fn take_line(&mut self) -> Vec<MiToken> {
        let mut line = Vec::new();
        while let Some(token) = self.tokens.pop_front() {
            if token == MiToken::Newline {
                break;
            }
            line.push(token);
        }
        line
    }

    /// True when no partial token is buffered and no tokens are queued.
    pub(crate) fn is_clean(&self) -> bool {
        self.state == LexState::Ground && self.tokens.is_empty()
    }

    fn push_char(&mut self, ch: char) {
        match std::mem::replace(&mut self.state, LexState::Ground) {
            LexState::Ground => self.lex_ground(ch),
            LexState::Word => {
                if is_word_char(ch) {
                    self.buf.push(ch);
                    self.state = LexState::Word;
                } else {
                    self.flush_word();
                    self.lex_ground(ch);
                }
            }
            LexState::CString(escape) => self.lex_cstring(ch, escape),
        }
    }

    fn lex_ground(&mut self, ch: char) {
        match ch {
            c if is_word_char(c) => {
                self.buf.push(c);
                self.state = LexState::Word;
            }
            '"' => self.state = LexState::CString(Escape::None),
            '^' => self.tokens.push_back(MiToken::Caret),
            '*' => self.tokens.push_back(MiToken::Star),
            '+' => self.tokens.push_back(MiToken::Plus),
            '=' => self.tokens.push_back(MiToken::Equal),
            '~' => self.tokens.push_back(MiToken::Tilde),
            '@' => self.tokens.push_back(MiToken::At),
            '&' => self.tokens.push_back(MiToken::Ampersand),
            ',' => self.tokens.push_back(MiToken::Comma),
            '{' => self.tokens.push_back(MiToken::OpenBrace),
            '}' => self.tokens.push_back(MiToken::CloseBrace),
            '[' => self.tokens.push_back(MiToken::OpenBracket),
            ']' => self.tokens.push_back(MiToken::CloseBracket),
            '(' => self.tokens.push_back(MiToken::OpenParen),
            ')' => self.tokens.push_back(MiToken::CloseParen),
            '\n' => self.tokens.push_back(MiToken::Newline),
            // GDB on some hosts terminates lines with \r\n; blanks only
            // occur around the (gdb) prompt.
            '\r' | ' ' | '\t' => {}
            other => self.tokens.push_back(MiToken::Illegal(other)),
        }
    }

    fn lex_cstring(&mut self, ch: char, escape: Escape) {
        match escape {
            Escape::None => match ch {
                '\\' => self.state = LexState::CString(Escape::Backslash),
                '"' => {
                    let content = std::mem::take(&mut self.buf);
                    self.tokens.push_back(MiToken::CString(content));
                    self.state = LexState::Ground;
                }
                c => {
                    self.buf.push(c);
                    self.state = LexState::CString(Escape::None);
                }
            },
            Escape::Backslash => {
                match ch {
                    'n' => self.buf.push('\n'),
                    't' => self.buf.push('\t'),
                    'r' => self.buf.push('\r'),
                    'f' => self.buf.push('\x0c'),
                    'v' => self.buf.push('\x0b'),
                    'b' => self.buf.push('\x08'),
                    'a' => self.buf.push('\x07'),
                    'e' => self.buf.push('\x1b'),
                    '"' => self.buf.push('"'),
                    '\'' => self.buf.push('\''),
                    '\\' => self.buf.push('\\'),
                    '0'..='7' => {
                        self.state = LexState::CString(Escape::Octal(ch.to_string()));
                        return;
                    }
                    // Unknown escapes pass through verbatim.
                    other => {
                        self.buf.push('\\');
                        self.buf.push(other);
                    }
                }
                self.state = LexState::CString(Escape::None);
            }
            Escape::Octal(mut digits) => {
                if ch.is_digit(8) && digits.len() < 3 {
                    digits.push(ch);
                    if digits.len() == 3 {
                        self.finish_octal(&digits);
                        self.state = LexState::CString(Escape::None);
                    } else {
                        self.state = LexState::CString(Escape::Octal(digits));
                    }
                } else {
                    self.finish_octal(&digits);
                    self.lex_cstring(ch, Escape::None);
                }
            }
        }
    }

    fn finish_octal(&mut self, digits: &str) {
        // Octal escapes carry raw bytes; values wrap at 8 bits like the
        // byte stream they describe.
        let value = u32::from_str_radix(digits, 8).unwrap_or(0) & 0xff;
        self.buf.push(char::from(value as u8));
        self.state = LexState::CString(Escape::None);
    }

    fn flush_word(&mut self) {
        let word = std::mem::take(&mut self.buf);
        if !word.is_empty() {
            if word.bytes().all(|b| b.is_ascii_digit()) {
                self.tokens.push_back(MiToken::Digits(word));
            } else {
                self.tokens.push_back(MiToken::Identifier(word));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_line(text: &str) -> Vec<MiToken> {
        let mut lexer = MiLexer::new();
        lexer.push(text);
        assert!(lexer.has_complete_line());
        lexer.take_line()
    }

    #[test]
    fn lex_done_record() {
        assert_eq!(
            lex_line("^done\n"),
            vec![MiToken::Caret, MiToken::Identifier("done".into())]
        );
    }

    #[test]
    fn lex_token_and_class() {
        assert_eq!(
            lex_line("42^error,msg=\"oops\"\n"),
            vec![
                MiToken::Digits("42".into()),
                MiToken::Caret,
                MiToken::Identifier("error".into()),
                MiToken::Comma,
                MiToken::Identifier("msg".into()),
                MiToken::Equal,
                MiToken::CString("oops".into()),
            ]
        );
    }

    #[test]
    fn lex_escapes() {
        assert_eq!(
            lex_line("~\"a\\n\\t\\\\\\\"b\"\n"),
            vec![MiToken::Tilde, MiToken::CString("a\n\t\\\"b".into())]
        );
    }

    #[test]
    fn lex_octal_escape() {
        assert_eq!(
            lex_line("~\"\\033[m\"\n"),
            vec![MiToken::Tilde, MiToken::CString("\x1b[m".into())]
        );
    }

    #[test]
    fn cstring_survives_split_feeds() {
        let mut lexer = MiLexer::new();
        lexer.push("~\"Break");
        assert!(!lexer.has_complete_line());
        lexer.push("point 1 hit\\");
        lexer.push("n\"\n");
        assert_eq!(
            lexer.take_line(),
            vec![
                MiToken::Tilde,
                MiToken::CString("Breakpoint 1 hit\n".into())
            ]
        );
    }

    #[test]
    fn word_survives_split_feeds() {
        let mut lexer = MiLexer::new();
        lexer.push("^do");
        lexer.push("ne\n");
        assert_eq!(
            lexer.take_line(),
            vec![MiToken::Caret, MiToken::Identifier("done".into())]
        );
    }

    #[test]
    fn octal_escape_at_string_end_releases_the_lexer() {
        let mut lexer = MiLexer::new();
        lexer.push("~\"\\033\"\n^done\n");
        assert_eq!(
            lexer.take_line(),
            vec![MiToken::Tilde, MiToken::CString("\x1b".into())]
        );
        assert_eq!(
            lexer.take_line(),
            vec![MiToken::Caret, MiToken::Identifier("done".into())]
        );
    }

    #[test]
    fn lex_prompt_line() {
        assert_eq!(
            lex_line("(gdb) \r\n"),
            vec![
                MiToken::OpenParen,
                MiToken::Identifier("gdb".into()),
                MiToken::CloseParen,
            ]
        );
    }

    #[test]
    fn lex_illegal_character() {
        assert_eq!(lex_line("!\n"), vec![MiToken::Illegal('!')]);
    }

    #[test]
    fn hyphenated_identifier_is_one_word() {
        assert_eq!(
            lex_line("=breakpoint-created\n"),
            vec![
                MiToken::Equal,
                MiToken::Identifier("breakpoint-created".into())
            ]
        );
    }
}
