//! Core engine of a terminal debugger front end.
//!
//! This crate turns the two asynchronous byte streams such a front end
//! lives on into structured data, without ever blocking:
//!
//! - Debugger output: an incremental GDB Machine Interface parser
//!   ([`mi::MiParser`]) builds typed [`mi::MiOutput`] trees from
//!   arbitrarily fragmented pipe reads, and [`session::DebugSession`]
//!   distills them into front-end events.
//! - Terminal input: a key-sequence trie ([`keymap::KeyTrie`]) resolves
//!   multi-byte escape macros one key at a time, including the
//!   Escape-alone-versus-arrow-key ambiguity.
//!
//! A per-language source tokenizer ([`tokenizer::Tokenizer`]) feeds the
//! syntax-highlighting display layer. Process spawning, pty plumbing,
//! and rendering live in the surrounding application.

pub mod keymap;
pub mod mi;
pub mod session;
mod sorted;
pub mod tokenizer;

pub use keymap::{KeyMap, KeyTrie, KeymapError, LogicalKey, ScanState};
pub use mi::{MiOutput, MiParse, MiParseError, MiParser};
pub use session::{DebugSession, GdbEvent, SessionState};
pub use tokenizer::{Language, SourceToken, TokenKind, Tokenizer};
