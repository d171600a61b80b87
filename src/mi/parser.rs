//! Incremental GDB/MI output parser.
//!
//! MI output arrives from the debugger pipe in arbitrary fragments, so
//! the parser is push-driven: `parse_string` accepts any slice of the
//! stream, and either hands back a completed [`MiOutput`] unit, asks
//! for more input, or reports a syntax error scoped to the offending
//! unit. Tokens produced by the incremental lexer are buffered until a
//! newline completes a record line, then the line is reduced by a
//! recursive descent over the grammar:
//!
//! ```text
//! output        := (oob-record)* result-record?
//! result-record := token? '^' result-class (',' result)*
//! async-record  := token? ('*'|'+'|'=') async-class (',' result)*
//! stream-record := ('~'|'@'|'&') c-string
//! result        := variable '=' value
//! value         := c-string | tuple | list
//! tuple         := '{' (result (',' result)*)? '}'
//! list          := '[' (value (',' value)* | result (',' result)*)? ']'
//! ```
//!
//! A unit seals when its result record completes, when a `(gdb)` prompt
//! line arrives, or when a `parse_string` call ends at a clean line
//! boundary with records pending, so a lone async or stream line is
//! delivered without waiting for the rest of a response.

use crate::mi::lexer::{MiLexer, MiToken};
use crate::mi::types::*;
use std::collections::VecDeque;
use std::iter::Peekable;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// MI parse failures. One failed unit never corrupts the next attempt.
#[derive(Debug, Error)]
pub enum MiParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    #[error("record ended before the grammar production completed")]
    UnexpectedEol,
    #[error("character {0:?} has no meaning in MI output")]
    IllegalCharacter(char),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of a `parse_string` call.
#[derive(Debug, Clone, PartialEq)]
pub enum MiParse {
    /// A completed output unit; ownership passes to the caller.
    Output(MiOutput),
    /// The grammar is mid-production; feed more text.
    Pending,
}

/// What one parsed line contributed.
enum LineRecord {
    Oob(MiOobRecord),
    Result(MiResultRecord),
    Prompt,
    Empty,
}

type Cursor = Peekable<std::vec::IntoIter<MiToken>>;

/// Push parser for MI output.
///
/// Each parser is a fully encapsulated context; multiple instances may
/// coexist (one per debugger connection) with no shared state.
#[derive(Debug)]
pub struct MiParser {
    lexer: MiLexer,
    pending: MiOutput,
    completed: VecDeque<MiOutput>,
    last_error: Option<String>,
}

impl MiParser {
    pub fn new() -> Self {
        Self {
            lexer: MiLexer::new(),
            pending: MiOutput::new(),
            completed: VecDeque::new(),
            last_error: None,
        }
    }

    /// Feed a complete or partial chunk of MI text.
    ///
    /// Returns one completed output unit per call; if a single chunk
    /// completes several units the rest are queued, and calling with an
    /// empty string drains them. On error the current unit and the
    /// offending line are discarded; the parser stays usable.
    pub fn parse_string(&mut self, text: &str) -> Result<MiParse, MiParseError> {
        self.lexer.push(text);

        while self.lexer.has_complete_line() {
            let line = self.lexer.take_line();
            match self.parse_line(line) {
                Ok(LineRecord::Oob(record)) => self.pending.oob_records.push(record),
                Ok(LineRecord::Result(record)) => {
                    self.pending.result_record = Some(record);
                    self.seal_pending();
                }
                Ok(LineRecord::Prompt) => {
                    if !self.pending.is_empty() {
                        self.seal_pending();
                    }
                }
                Ok(LineRecord::Empty) => {}
                Err(err) => {
                    warn!("discarding output unit after parse failure: {err}");
                    self.pending = MiOutput::new();
                    self.last_error = Some(err.to_string());
                    return Err(err);
                }
            }
        }

        if let Some(output) = self.completed.pop_front() {
            return Ok(MiParse::Output(output));
        }

        // End of the fed text at a clean line boundary: deliver what has
        // accumulated rather than sitting on an async/stream record.
        if !self.pending.is_empty() && self.lexer.is_clean() {
            let output = std::mem::take(&mut self.pending);
            debug!(oob = output.oob_records.len(), "sealed output at feed boundary");
            return Ok(MiParse::Output(output));
        }

        Ok(MiParse::Pending)
    }

    /// Parse a whole file of MI text, mainly for offline tooling.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<MiOutput>, MiParseError> {
        let content = std::fs::read_to_string(path)?;
        let mut outputs = Vec::new();
        let mut chunk = content.as_str();
        loop {
            match self.parse_string(chunk)? {
                MiParse::Output(output) => outputs.push(output),
                MiParse::Pending => break,
            }
            chunk = "";
        }
        Ok(outputs)
    }

    /// Diagnostic text of the most recent parse failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn seal_pending(&mut self) {
        let output = std::mem::take(&mut self.pending);
        debug!(
            oob = output.oob_records.len(),
            result = output.result_record.is_some(),
            "sealed output unit"
        );
        self.completed.push_back(output);
    }

    fn parse_line(&mut self, tokens: Vec<MiToken>) -> Result<LineRecord, MiParseError> {
        if tokens.is_empty() {
            return Ok(LineRecord::Empty);
        }
        let mut cursor: Cursor = tokens.into_iter().peekable();

        let token = parse_request_token(&mut cursor)?;

        let record = match next_or_eol(&mut cursor)? {
            MiToken::Caret => LineRecord::Result(parse_result_record(token, &mut cursor)?),
            MiToken::Star => LineRecord::Oob(MiOobRecord::Async(parse_async_record(
                token,
                AsyncKind::Exec,
                &mut cursor,
            )?)),
            MiToken::Plus => LineRecord::Oob(MiOobRecord::Async(parse_async_record(
                token,
                AsyncKind::Status,
                &mut cursor,
            )?)),
            MiToken::Equal => LineRecord::Oob(MiOobRecord::Async(parse_async_record(
                token,
                AsyncKind::Notify,
                &mut cursor,
            )?)),
            MiToken::Tilde => LineRecord::Oob(parse_stream_record(
                token,
                StreamKind::Console,
                &mut cursor,
            )?),
            MiToken::At => {
                LineRecord::Oob(parse_stream_record(token, StreamKind::Target, &mut cursor)?)
            }
            MiToken::Ampersand => {
                LineRecord::Oob(parse_stream_record(token, StreamKind::Log, &mut cursor)?)
            }
            MiToken::OpenParen => {
                parse_prompt(&mut cursor)?;
                LineRecord::Prompt
            }
            other => {
                return Err(unexpected("record sigil", &other));
            }
        };

        expect_eol(&mut cursor)?;
        Ok(record)
    }
}

impl Default for MiParser {
    fn default() -> Self {
        Self::new()
    }
}

fn describe(token: &MiToken) -> String {
    match token {
        MiToken::Digits(d) => format!("digits \"{d}\""),
        MiToken::Identifier(s) => format!("identifier \"{s}\""),
        MiToken::CString(_) => "c-string".to_string(),
        MiToken::Caret => "'^'".to_string(),
        MiToken::Star => "'*'".to_string(),
        MiToken::Plus => "'+'".to_string(),
        MiToken::Equal => "'='".to_string(),
        MiToken::Tilde => "'~'".to_string(),
        MiToken::At => "'@'".to_string(),
        MiToken::Ampersand => "'&'".to_string(),
        MiToken::Comma => "','".to_string(),
        MiToken::OpenBrace => "'{'".to_string(),
        MiToken::CloseBrace => "'}'".to_string(),
        MiToken::OpenBracket => "'['".to_string(),
        MiToken::CloseBracket => "']'".to_string(),
        MiToken::OpenParen => "'('".to_string(),
        MiToken::CloseParen => "')'".to_string(),
        MiToken::Newline => "end of line".to_string(),
        MiToken::Illegal(c) => format!("character {c:?}"),
    }
}

fn unexpected(expected: &'static str, found: &MiToken) -> MiParseError {
    if let MiToken::Illegal(c) = found {
        return MiParseError::IllegalCharacter(*c);
    }
    MiParseError::UnexpectedToken {
        expected,
        found: describe(found),
    }
}

fn next_or_eol(cursor: &mut Cursor) -> Result<MiToken, MiParseError> {
    cursor.next().ok_or(MiParseError::UnexpectedEol)
}

fn expect_eol(cursor: &mut Cursor) -> Result<(), MiParseError> {
    match cursor.next() {
        None => Ok(()),
        Some(token) => Err(unexpected("end of line", &token)),
    }
}

/// Leading digits form the request token; absence is `None`, never 0.
fn parse_request_token(cursor: &mut Cursor) -> Result<Option<u64>, MiParseError> {
    if matches!(cursor.peek(), Some(MiToken::Digits(_))) {
        let Some(MiToken::Digits(digits)) = cursor.next() else {
            unreachable!();
        };
        let value = digits
            .parse::<u64>()
            .map_err(|_| MiParseError::Syntax(format!("request token \"{digits}\" out of range")))?;
        return Ok(Some(value));
    }
    Ok(None)
}

fn parse_class_name(cursor: &mut Cursor) -> Result<String, MiParseError> {
    match next_or_eol(cursor)? {
        MiToken::Identifier(name) => Ok(name),
        other => Err(unexpected("class name", &other)),
    }
}

fn parse_result_record(
    token: Option<u64>,
    cursor: &mut Cursor,
) -> Result<MiResultRecord, MiParseError> {
    let name = parse_class_name(cursor)?;
    let class = ResultClass::from_name(&name)
        .ok_or_else(|| MiParseError::Syntax(format!("unknown result class \"{name}\"")))?;
    let results = parse_result_tail(cursor)?;
    Ok(MiResultRecord {
        token,
        class,
        results,
    })
}

fn parse_async_record(
    token: Option<u64>,
    kind: AsyncKind,
    cursor: &mut Cursor,
) -> Result<MiAsyncRecord, MiParseError> {
    let name = parse_class_name(cursor)?;
    let class = AsyncClass::from_name(&name);
    let results = parse_result_tail(cursor)?;
    Ok(MiAsyncRecord {
        token,
        kind,
        class,
        results,
    })
}

fn parse_stream_record(
    token: Option<u64>,
    kind: StreamKind,
    cursor: &mut Cursor,
) -> Result<MiOobRecord, MiParseError> {
    if token.is_some() {
        return Err(MiParseError::Syntax(
            "stream records carry no request token".to_string(),
        ));
    }
    match next_or_eol(cursor)? {
        MiToken::CString(content) => Ok(MiOobRecord::Stream(MiStreamRecord { kind, content })),
        other => Err(unexpected("c-string", &other)),
    }
}

fn parse_prompt(cursor: &mut Cursor) -> Result<(), MiParseError> {
    match next_or_eol(cursor)? {
        MiToken::Identifier(name) if name == "gdb" => {}
        other => return Err(unexpected("\"gdb\"", &other)),
    }
    match next_or_eol(cursor)? {
        MiToken::CloseParen => Ok(()),
        other => Err(unexpected("')'", &other)),
    }
}

/// `(',' result)*` up to end of line.
fn parse_result_tail(cursor: &mut Cursor) -> Result<Vec<MiResult>, MiParseError> {
    let mut results = Vec::new();
    while cursor.peek().is_some() {
        match next_or_eol(cursor)? {
            MiToken::Comma => {}
            other => return Err(unexpected("','", &other)),
        }
        results.push(parse_result(cursor)?);
    }
    Ok(results)
}

fn parse_result(cursor: &mut Cursor) -> Result<MiResult, MiParseError> {
    let variable = match next_or_eol(cursor)? {
        MiToken::Identifier(name) => name,
        other => return Err(unexpected("variable name", &other)),
    };
    match next_or_eol(cursor)? {
        MiToken::Equal => {}
        other => return Err(unexpected("'='", &other)),
    }
    let value = parse_value(cursor)?;
    Ok(MiResult { variable, value })
}

fn parse_value(cursor: &mut Cursor) -> Result<MiValue, MiParseError> {
    match next_or_eol(cursor)? {
        MiToken::CString(content) => Ok(MiValue::Const(content)),
        MiToken::OpenBrace => parse_tuple(cursor),
        MiToken::OpenBracket => parse_list(cursor),
        other => Err(unexpected("value", &other)),
    }
}

/// Body of a tuple; the `{` is already consumed.
fn parse_tuple(cursor: &mut Cursor) -> Result<MiValue, MiParseError> {
    let mut results = Vec::new();
    if matches!(cursor.peek(), Some(MiToken::CloseBrace)) {
        cursor.next();
        return Ok(MiValue::Tuple(results));
    }
    loop {
        results.push(parse_result(cursor)?);
        match next_or_eol(cursor)? {
            MiToken::Comma => {}
            MiToken::CloseBrace => return Ok(MiValue::Tuple(results)),
            other => return Err(unexpected("',' or '}'", &other)),
        }
    }
}

/// Body of a list; the `[` is already consumed.
///
/// The first element fixes the list's kind: an identifier opens a
/// result list, anything value-shaped opens a value list. Mixing the
/// two is a syntax error.
fn parse_list(cursor: &mut Cursor) -> Result<MiValue, MiParseError> {
    match cursor.peek() {
        Some(MiToken::CloseBracket) => {
            cursor.next();
            Ok(MiValue::List(MiList::Empty))
        }
        Some(MiToken::Identifier(_)) => {
            let mut results = Vec::new();
            loop {
                if !matches!(cursor.peek(), Some(MiToken::Identifier(_))) {
                    let found = next_or_eol(cursor)?;
                    return Err(MiParseError::Syntax(format!(
                        "result list element must be a result, found {}",
                        describe(&found)
                    )));
                }
                results.push(parse_result(cursor)?);
                match next_or_eol(cursor)? {
                    MiToken::Comma => {}
                    MiToken::CloseBracket => return Ok(MiValue::List(MiList::Results(results))),
                    other => return Err(unexpected("',' or ']'", &other)),
                }
            }
        }
        _ => {
            let mut values = Vec::new();
            loop {
                if matches!(cursor.peek(), Some(MiToken::Identifier(_))) {
                    let found = next_or_eol(cursor)?;
                    return Err(MiParseError::Syntax(format!(
                        "value list element must be a value, found {}",
                        describe(&found)
                    )));
                }
                values.push(parse_value(cursor)?);
                match next_or_eol(cursor)? {
                    MiToken::Comma => {}
                    MiToken::CloseBracket => return Ok(MiValue::List(MiList::Values(values))),
                    other => return Err(unexpected("',' or ']'", &other)),
                }
            }
        }
    }
}
