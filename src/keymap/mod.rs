//! Terminal key-sequence recognition.

pub mod keys;
pub mod trie;

pub use keys::{default_bindings, KeyMap, LogicalKey};
pub use trie::{KeyTrie, KeymapError, ScanState};
