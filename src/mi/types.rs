//! GDB Machine Interface (MI) parse tree model.
//!
//! One `MiOutput` is one logical GDB response: zero or more out-of-band
//! records followed by at most one result record. Every node owns its
//! children outright; the tree returned by the parser belongs to the
//! caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One MI output unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiOutput {
    pub oob_records: Vec<MiOobRecord>,
    pub result_record: Option<MiResultRecord>,
}

impl MiOutput {
    pub fn new() -> Self {
        Self {
            oob_records: Vec::new(),
            result_record: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.oob_records.is_empty() && self.result_record.is_none()
    }
}

impl Default for MiOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Out-of-band record: async state change or stream text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MiOobRecord {
    Async(MiAsyncRecord),
    Stream(MiStreamRecord),
}

/// Async record subkind, determined by the record sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsyncKind {
    /// `*`: execution state changes (running, stopped).
    Exec,
    /// `+`: ongoing status (e.g. download progress).
    Status,
    /// `=`: notifications (breakpoints, threads, libraries).
    Notify,
}

impl AsyncKind {
    pub fn sigil(self) -> char {
        match self {
            AsyncKind::Exec => '*',
            AsyncKind::Status => '+',
            AsyncKind::Notify => '=',
        }
    }
}

/// Async class names GDB is known to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AsyncClass {
    Stopped,
    Running,
    Download,
    BreakpointCreated,
    BreakpointModified,
    BreakpointDeleted,
    ThreadGroupAdded,
    ThreadGroupStarted,
    ThreadGroupExited,
    ThreadCreated,
    ThreadSelected,
    ThreadExited,
    LibraryLoaded,
    LibraryUnloaded,
    CmdParamChanged,
    ParamChanged,
    MemoryChanged,
    /// Classes this frontend does not know by name are carried verbatim.
    Other(String),
}

impl AsyncClass {
    pub fn from_name(name: &str) -> Self {
        match name {
            "stopped" => AsyncClass::Stopped,
            "running" => AsyncClass::Running,
            "download" => AsyncClass::Download,
            "breakpoint-created" => AsyncClass::BreakpointCreated,
            "breakpoint-modified" => AsyncClass::BreakpointModified,
            "breakpoint-deleted" => AsyncClass::BreakpointDeleted,
            "thread-group-added" => AsyncClass::ThreadGroupAdded,
            "thread-group-started" => AsyncClass::ThreadGroupStarted,
            "thread-group-exited" => AsyncClass::ThreadGroupExited,
            "thread-created" => AsyncClass::ThreadCreated,
            "thread-selected" => AsyncClass::ThreadSelected,
            "thread-exited" => AsyncClass::ThreadExited,
            "library-loaded" => AsyncClass::LibraryLoaded,
            "library-unloaded" => AsyncClass::LibraryUnloaded,
            "cmd-param-changed" => AsyncClass::CmdParamChanged,
            "param-changed" => AsyncClass::ParamChanged,
            "memory-changed" => AsyncClass::MemoryChanged,
            other => AsyncClass::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AsyncClass::Stopped => "stopped",
            AsyncClass::Running => "running",
            AsyncClass::Download => "download",
            AsyncClass::BreakpointCreated => "breakpoint-created",
            AsyncClass::BreakpointModified => "breakpoint-modified",
            AsyncClass::BreakpointDeleted => "breakpoint-deleted",
            AsyncClass::ThreadGroupAdded => "thread-group-added",
            AsyncClass::ThreadGroupStarted => "thread-group-started",
            AsyncClass::ThreadGroupExited => "thread-group-exited",
            AsyncClass::ThreadCreated => "thread-created",
            AsyncClass::ThreadSelected => "thread-selected",
            AsyncClass::ThreadExited => "thread-exited",
            AsyncClass::LibraryLoaded => "library-loaded",
            AsyncClass::LibraryUnloaded => "library-unloaded",
            AsyncClass::CmdParamChanged => "cmd-param-changed",
            AsyncClass::ParamChanged => "param-changed",
            AsyncClass::MemoryChanged => "memory-changed",
            AsyncClass::Other(name) => name,
        }
    }
}

/// Async record: `token? ('*'|'+'|'=') class (',' result)*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiAsyncRecord {
    /// Request correlation id; `None` when the record carries no token.
    pub token: Option<u64>,
    pub kind: AsyncKind,
    pub class: AsyncClass,
    pub results: Vec<MiResult>,
}

/// Stream record subkind, determined by the record sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamKind {
    /// `~`: console output from GDB itself.
    Console,
    /// `@`: output from the target program.
    Target,
    /// `&`: GDB's internal log echo.
    Log,
}

impl StreamKind {
    pub fn sigil(self) -> char {
        match self {
            StreamKind::Console => '~',
            StreamKind::Target => '@',
            StreamKind::Log => '&',
        }
    }
}

/// Stream record: `('~'|'@'|'&') c-string`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiStreamRecord {
    pub kind: StreamKind,
    /// Decoded payload (escapes already resolved).
    pub content: String,
}

/// Result classes of a `^` record. This set is closed by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
}

impl ResultClass {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "done" => Some(ResultClass::Done),
            "running" => Some(ResultClass::Running),
            "connected" => Some(ResultClass::Connected),
            "error" => Some(ResultClass::Error),
            "exit" => Some(ResultClass::Exit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResultClass::Done => "done",
            ResultClass::Running => "running",
            ResultClass::Connected => "connected",
            ResultClass::Error => "error",
            ResultClass::Exit => "exit",
        }
    }
}

/// Result record: `token? '^' result-class (',' result)*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiResultRecord {
    pub token: Option<u64>,
    pub class: ResultClass,
    pub results: Vec<MiResult>,
}

/// A named value: `variable '=' value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiResult {
    pub variable: String,
    pub value: MiValue,
}

impl MiResult {
    pub fn new(variable: impl Into<String>, value: MiValue) -> Self {
        Self {
            variable: variable.into(),
            value,
        }
    }
}

/// MI value: c-string constant, tuple, or list.
///
/// Tuples keep source order and repeated field names; GDB assigns
/// meaning to field position (e.g. breakpoint table columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MiValue {
    Const(String),
    Tuple(Vec<MiResult>),
    List(MiList),
}

impl MiValue {
    pub fn as_const(&self) -> Option<&str> {
        match self {
            MiValue::Const(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[MiResult]> {
        match self {
            MiValue::Tuple(results) => Some(results),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&MiList> {
        match self {
            MiValue::List(list) => Some(list),
            _ => None,
        }
    }
}

/// List body. The element kind is fixed by the first element; `[]`
/// carries no kind at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MiList {
    Empty,
    Values(Vec<MiValue>),
    Results(Vec<MiResult>),
}

impl MiList {
    pub fn len(&self) -> usize {
        match self {
            MiList::Empty => 0,
            MiList::Values(values) => values.len(),
            MiList::Results(results) => results.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Escape `content` back into MI c-string notation (without quotes).
pub(crate) fn escape_mi_string(content: &str, out: &mut String) {
    for ch in content.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\x0b' => out.push_str("\\v"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
}

fn fmt_results(results: &[MiResult], lead_comma: bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, result) in results.iter().enumerate() {
        if lead_comma || i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", result)?;
    }
    Ok(())
}

// Display renders canonical MI wire text, one line per record. Feeding
// the rendered text back through the parser reproduces the tree, which
// is what the diagnostic dump is for.

impl fmt::Display for MiOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for oob in &self.oob_records {
            write!(f, "{}", oob)?;
        }
        if let Some(record) = &self.result_record {
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

impl fmt::Display for MiOobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiOobRecord::Async(record) => write!(f, "{}", record),
            MiOobRecord::Stream(record) => write!(f, "{}", record),
        }
    }
}

impl fmt::Display for MiAsyncRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{}", token)?;
        }
        write!(f, "{}{}", self.kind.sigil(), self.class.name())?;
        fmt_results(&self.results, true, f)?;
        writeln!(f)
    }
}

impl fmt::Display for MiStreamRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut escaped = String::new();
        escape_mi_string(&self.content, &mut escaped);
        writeln!(f, "{}\"{}\"", self.kind.sigil(), escaped)
    }
}

impl fmt::Display for MiResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{}", token)?;
        }
        write!(f, "^{}", self.class.name())?;
        fmt_results(&self.results, true, f)?;
        writeln!(f)
    }
}

impl fmt::Display for MiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.variable, self.value)
    }
}

impl fmt::Display for MiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiValue::Const(content) => {
                let mut escaped = String::new();
                escape_mi_string(content, &mut escaped);
                write!(f, "\"{}\"", escaped)
            }
            MiValue::Tuple(results) => {
                write!(f, "{{")?;
                fmt_results(results, false, f)?;
                write!(f, "}}")
            }
            MiValue::List(list) => write!(f, "{}", list),
        }
    }
}

impl fmt::Display for MiList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        match self {
            MiList::Empty => {}
            MiList::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
            }
            MiList::Results(results) => fmt_results(results, false, f)?,
        }
        write!(f, "]")
    }
}
