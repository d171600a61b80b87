//! Debugger session context.
//!
//! Owns the per-connection protocol state the front end needs between
//! I/O callbacks: the incremental MI parser, the outstanding
//! request-token set, and the flags that describe what the debugger is
//! doing. The surrounding event loop hands raw bytes to `feed` and
//! drains `poll_event`; nothing here blocks or spawns.

use crate::mi::records::{
    parse_breakpoint, parse_frame, Breakpoint, Frame, StopReason,
};
use crate::mi::{
    records, AsyncClass, MiOobRecord, MiOutput, MiParse, MiParser, MiResult, MiResultRecord,
    ResultClass, StreamKind,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// Which stream a piece of textual output belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChannel {
    Console,
    Target,
    Log,
}

impl From<StreamKind> for OutputChannel {
    fn from(kind: StreamKind) -> Self {
        match kind {
            StreamKind::Console => OutputChannel::Console,
            StreamKind::Target => OutputChannel::Target,
            StreamKind::Log => OutputChannel::Log,
        }
    }
}

/// Session-level events distilled from parsed MI output.
#[derive(Debug, Clone)]
pub enum GdbEvent {
    Stopped {
        reason: StopReason,
        frame: Option<Frame>,
        thread_id: Option<String>,
    },
    Running {
        thread_id: Option<String>,
    },
    BreakpointCreated {
        breakpoint: Breakpoint,
    },
    BreakpointModified {
        breakpoint: Breakpoint,
    },
    BreakpointDeleted {
        number: String,
    },
    ThreadCreated {
        id: String,
        group_id: String,
    },
    ThreadExited {
        id: String,
        group_id: String,
    },
    ThreadSelected {
        id: String,
    },
    /// A `^` record answering one of this session's commands.
    CommandResult {
        token: Option<u64>,
        class: ResultClass,
        results: Vec<MiResult>,
    },
    Output {
        channel: OutputChannel,
        content: String,
    },
}

/// Protocol-level flags, one set per session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub running: bool,
    pub current_thread: Option<String>,
}

/// One debugger connection's parse-and-dispatch context.
///
/// Multiple sessions coexist with no shared state; tests and
/// multi-target front ends create one per connection.
#[derive(Debug)]
pub struct DebugSession {
    parser: MiParser,
    events: VecDeque<GdbEvent>,
    state: SessionState,
    token_counter: u64,
    pending_tokens: HashSet<u64>,
}

impl DebugSession {
    pub fn new() -> Self {
        Self {
            parser: MiParser::new(),
            events: VecDeque::new(),
            state: SessionState::default(),
            token_counter: 0,
            pending_tokens: HashSet::new(),
        }
    }

    /// Feed raw bytes read from the debugger pipe.
    ///
    /// Completed output units are translated into events immediately;
    /// partial input is held by the parser until more bytes arrive.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(bytes);
        let mut chunk: &str = &text;
        loop {
            let parsed = self
                .parser
                .parse_string(chunk)
                .context("malformed MI output from debugger")?;
            match parsed {
                MiParse::Output(output) => self.handle_output(output),
                MiParse::Pending => break,
            }
            chunk = "";
        }
        Ok(())
    }

    /// Next queued event, if any. Never blocks.
    pub fn poll_event(&mut self) -> Option<GdbEvent> {
        self.events.pop_front()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether a command sent through `format_command` is still
    /// unanswered.
    pub fn command_in_flight(&self) -> bool {
        !self.pending_tokens.is_empty()
    }

    /// Allocate the next request correlation token.
    pub fn next_token(&mut self) -> u64 {
        self.token_counter += 1;
        self.token_counter
    }

    /// Format an MI command with a fresh token, registering it so the
    /// eventual `^` record can be matched.
    pub fn format_command(&mut self, command: &str) -> String {
        let token = self.next_token();
        self.pending_tokens.insert(token);
        debug!(token, command, "command formatted");
        format!("{}-{}\n", token, command)
    }

    fn handle_output(&mut self, output: MiOutput) {
        for oob in output.oob_records {
            match oob {
                MiOobRecord::Async(record) => self.handle_async(record.class, &record.results),
                MiOobRecord::Stream(record) => self.events.push_back(GdbEvent::Output {
                    channel: record.kind.into(),
                    content: record.content,
                }),
            }
        }
        if let Some(record) = output.result_record {
            self.handle_result_record(record);
        }
    }

    fn handle_result_record(&mut self, record: MiResultRecord) {
        if let Some(token) = record.token {
            if !self.pending_tokens.remove(&token) {
                warn!(token, "result record for a token this session never sent");
            }
        }
        match record.class {
            ResultClass::Running => self.state.running = true,
            ResultClass::Exit => self.state.running = false,
            _ => {}
        }
        self.events.push_back(GdbEvent::CommandResult {
            token: record.token,
            class: record.class,
            results: record.results,
        });
    }

    fn handle_async(&mut self, class: AsyncClass, results: &[MiResult]) {
        match class {
            AsyncClass::Stopped => {
                let reason = records::find_const(results, "reason")
                    .map(StopReason::from)
                    .unwrap_or(StopReason::Unknown("unknown".to_string()));
                let thread_id = records::find_const(results, "thread-id").map(str::to_string);
                self.state.running = false;
                if thread_id.is_some() {
                    self.state.current_thread = thread_id.clone();
                }
                self.events.push_back(GdbEvent::Stopped {
                    reason,
                    frame: parse_frame(results),
                    thread_id,
                });
            }
            AsyncClass::Running => {
                let thread_id = records::find_const(results, "thread-id").map(str::to_string);
                self.state.running = true;
                self.events.push_back(GdbEvent::Running { thread_id });
            }
            AsyncClass::BreakpointCreated => {
                if let Some(breakpoint) = parse_breakpoint(results) {
                    self.events
                        .push_back(GdbEvent::BreakpointCreated { breakpoint });
                }
            }
            AsyncClass::BreakpointModified => {
                if let Some(breakpoint) = parse_breakpoint(results) {
                    self.events
                        .push_back(GdbEvent::BreakpointModified { breakpoint });
                }
            }
            AsyncClass::BreakpointDeleted => {
                let number = records::find_const(results, "id")
                    .or_else(|| records::find_const(results, "number"));
                if let Some(number) = number {
                    self.events.push_back(GdbEvent::BreakpointDeleted {
                        number: number.to_string(),
                    });
                }
            }
            AsyncClass::ThreadCreated => {
                if let (Some(id), Some(group_id)) = (
                    records::find_const(results, "id"),
                    records::find_const(results, "group-id"),
                ) {
                    self.events.push_back(GdbEvent::ThreadCreated {
                        id: id.to_string(),
                        group_id: group_id.to_string(),
                    });
                }
            }
            AsyncClass::ThreadExited => {
                if let (Some(id), Some(group_id)) = (
                    records::find_const(results, "id"),
                    records::find_const(results, "group-id"),
                ) {
                    self.events.push_back(GdbEvent::ThreadExited {
                        id: id.to_string(),
                        group_id: group_id.to_string(),
                    });
                }
            }
            AsyncClass::ThreadSelected => {
                if let Some(id) = records::find_const(results, "id") {
                    self.state.current_thread = Some(id.to_string());
                    self.events.push_back(GdbEvent::ThreadSelected {
                        id: id.to_string(),
                    });
                }
            }
            other => {
                debug!(class = other.name(), "async record without a handler");
            }
        }
    }
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new()
    }
}
