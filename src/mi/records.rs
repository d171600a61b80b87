//! Typed views over parsed MI results.
//!
//! The parse tree is deliberately generic; this module extracts the
//! record shapes a front end actually displays (breakpoints, frames,
//! threads) from `variable=value` result lists.

use crate::mi::types::{MiList, MiResult, MiValue};
use serde::{Deserialize, Serialize};

/// Why the target stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    BreakpointHit,
    WatchpointTrigger,
    ReadWatchpointTrigger,
    AccessWatchpointTrigger,
    FunctionFinished,
    LocationReached,
    WatchpointScope,
    EndSteppingRange,
    ExitedSignalled,
    Exited,
    ExitedNormally,
    SignalReceived,
    SolibEvent,
    Fork,
    Vfork,
    SyscallEntry,
    SyscallReturn,
    Unknown(String),
}

impl From<&str> for StopReason {
    fn from(s: &str) -> Self {
        match s {
            "breakpoint-hit" => StopReason::BreakpointHit,
            "watchpoint-trigger" => StopReason::WatchpointTrigger,
            "read-watchpoint-trigger" => StopReason::ReadWatchpointTrigger,
            "access-watchpoint-trigger" => StopReason::AccessWatchpointTrigger,
            "function-finished" => StopReason::FunctionFinished,
            "location-reached" => StopReason::LocationReached,
            "watchpoint-scope" => StopReason::WatchpointScope,
            "end-stepping-range" => StopReason::EndSteppingRange,
            "exited-signalled" => StopReason::ExitedSignalled,
            "exited" => StopReason::Exited,
            "exited-normally" => StopReason::ExitedNormally,
            "signal-received" => StopReason::SignalReceived,
            "solib-event" => StopReason::SolibEvent,
            "fork" => StopReason::Fork,
            "vfork" => StopReason::Vfork,
            "syscall-entry" => StopReason::SyscallEntry,
            "syscall-return" => StopReason::SyscallReturn,
            other => StopReason::Unknown(other.to_string()),
        }
    }
}

/// Breakpoint information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub number: String,
    #[serde(rename = "type")]
    pub breakpoint_type: String,
    pub disposition: String,
    pub enabled: bool,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub func: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub thread_groups: Option<Vec<String>>,
    #[serde(default)]
    pub times: u64,
    #[serde(default)]
    pub original_location: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub ignore_count: Option<u64>,
}

/// Stack frame information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub level: u64,
    pub addr: String,
    #[serde(default)]
    pub func: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub arch: Option<String>,
}

/// Thread information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Find the value bound to `name` in a result list.
pub fn find_value<'a>(results: &'a [MiResult], name: &str) -> Option<&'a MiValue> {
    results
        .iter()
        .find(|result| result.variable == name)
        .map(|result| &result.value)
}

/// Find a c-string constant bound to `name`.
pub fn find_const<'a>(results: &'a [MiResult], name: &str) -> Option<&'a str> {
    find_value(results, name).and_then(MiValue::as_const)
}

fn find_u64(results: &[MiResult], name: &str) -> Option<u64> {
    find_const(results, name).and_then(|s| s.parse().ok())
}

/// Build a breakpoint from the fields of a `bkpt={...}` tuple.
pub fn breakpoint_from_fields(fields: &[MiResult]) -> Option<Breakpoint> {
    Some(Breakpoint {
        number: find_const(fields, "number")?.to_string(),
        breakpoint_type: find_const(fields, "type").unwrap_or_default().to_string(),
        disposition: find_const(fields, "disp").unwrap_or_default().to_string(),
        enabled: find_const(fields, "enabled").map(|s| s == "y").unwrap_or(true),
        addr: find_const(fields, "addr").map(str::to_string),
        func: find_const(fields, "func").map(str::to_string),
        file: find_const(fields, "file").map(str::to_string),
        fullname: find_const(fields, "fullname").map(str::to_string),
        line: find_u64(fields, "line"),
        thread_groups: find_value(fields, "thread-groups")
            .and_then(MiValue::as_list)
            .map(|list| match list {
                MiList::Values(values) => values
                    .iter()
                    .filter_map(|v| v.as_const().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            }),
        times: find_u64(fields, "times").unwrap_or(0),
        original_location: find_const(fields, "original-location").map(str::to_string),
        condition: find_const(fields, "cond").map(str::to_string),
        ignore_count: find_u64(fields, "ignore"),
    })
}

/// Extract the breakpoint of a `^done,bkpt={...}` response or a
/// `=breakpoint-created` notification.
pub fn parse_breakpoint(results: &[MiResult]) -> Option<Breakpoint> {
    find_value(results, "bkpt")
        .and_then(MiValue::as_tuple)
        .and_then(breakpoint_from_fields)
}

/// Extract every breakpoint of a `^done,BreakpointTable={...}` response.
///
/// The table body is a result list, `body=[bkpt={...},bkpt={...}]`.
pub fn parse_breakpoint_table(results: &[MiResult]) -> Vec<Breakpoint> {
    let Some(table) = find_value(results, "BreakpointTable").and_then(MiValue::as_tuple) else {
        return Vec::new();
    };
    let Some(body) = find_value(table, "body").and_then(MiValue::as_list) else {
        return Vec::new();
    };

    match body {
        MiList::Results(rows) => rows
            .iter()
            .filter(|row| row.variable == "bkpt")
            .filter_map(|row| row.value.as_tuple())
            .filter_map(breakpoint_from_fields)
            .collect(),
        // Some GDB versions emit bare tuples in the body.
        MiList::Values(values) => values
            .iter()
            .filter_map(MiValue::as_tuple)
            .filter_map(breakpoint_from_fields)
            .collect(),
        MiList::Empty => Vec::new(),
    }
}

fn frame_from_fields(fields: &[MiResult]) -> Option<Frame> {
    Some(Frame {
        level: find_u64(fields, "level").unwrap_or(0),
        addr: find_const(fields, "addr").unwrap_or_default().to_string(),
        func: find_const(fields, "func").map(str::to_string),
        file: find_const(fields, "file").map(str::to_string),
        fullname: find_const(fields, "fullname").map(str::to_string),
        line: find_u64(fields, "line"),
        arch: find_const(fields, "arch").map(str::to_string),
    })
}

/// Extract the frame of a `frame={...}` result (stopped events,
/// `stack-info-frame` responses).
pub fn parse_frame(results: &[MiResult]) -> Option<Frame> {
    find_value(results, "frame")
        .and_then(MiValue::as_tuple)
        .and_then(frame_from_fields)
}

/// Extract every frame of a `^done,stack=[frame={...},...]` response.
pub fn parse_stack_frames(results: &[MiResult]) -> Vec<Frame> {
    let Some(stack) = find_value(results, "stack").and_then(MiValue::as_list) else {
        return Vec::new();
    };
    match stack {
        MiList::Results(rows) => rows
            .iter()
            .filter(|row| row.variable == "frame")
            .filter_map(|row| row.value.as_tuple())
            .filter_map(frame_from_fields)
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract the threads of a `^done,threads=[{...},...]` response.
pub fn parse_thread_list(results: &[MiResult]) -> Vec<Thread> {
    let Some(threads) = find_value(results, "threads").and_then(MiValue::as_list) else {
        return Vec::new();
    };
    match threads {
        MiList::Values(values) => values
            .iter()
            .filter_map(MiValue::as_tuple)
            .filter_map(|fields| {
                Some(Thread {
                    id: find_const(fields, "id")?.to_string(),
                    target_id: find_const(fields, "target-id").map(str::to_string),
                    name: find_const(fields, "name").map(str::to_string),
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract thread ids from a `^done,thread-ids={thread-id="1",...}`
/// response. Repeated `thread-id` fields survive because tuples keep
/// source order and duplicates.
pub fn parse_thread_ids(results: &[MiResult]) -> Vec<String> {
    let Some(ids) = find_value(results, "thread-ids").and_then(MiValue::as_tuple) else {
        return Vec::new();
    };
    ids.iter()
        .filter(|result| result.variable == "thread-id")
        .filter_map(|result| result.value.as_const().map(str::to_string))
        .collect()
}
