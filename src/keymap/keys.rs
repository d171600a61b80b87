//! Logical keys and the default terminal escape-sequence bindings.
//!
//! Hosts feed raw terminal bytes one at a time; the map reports which
//! logical key the sequence resolved to. The tables cover the common
//! xterm/VT encodings; a configuration loader can bind more at startup.

use crate::keymap::trie::{KeyTrie, KeymapError, ScanState};
use serde::{Deserialize, Serialize};

/// Platform-agnostic keys a terminal reports as multi-byte sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogicalKey {
    Escape,
    Up,
    Down,
    Right,
    Left,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Function(u8),
}

const ESC: u32 = 0x1b;

/// The default binding table: (sequence, key) pairs.
pub fn default_bindings() -> Vec<(Vec<u32>, LogicalKey)> {
    let mut bindings: Vec<(Vec<u32>, LogicalKey)> = vec![
        (vec![ESC], LogicalKey::Escape),
        // CSI cursor keys.
        (vec![ESC, b'[' as u32, b'A' as u32], LogicalKey::Up),
        (vec![ESC, b'[' as u32, b'B' as u32], LogicalKey::Down),
        (vec![ESC, b'[' as u32, b'C' as u32], LogicalKey::Right),
        (vec![ESC, b'[' as u32, b'D' as u32], LogicalKey::Left),
        (vec![ESC, b'[' as u32, b'H' as u32], LogicalKey::Home),
        (vec![ESC, b'[' as u32, b'F' as u32], LogicalKey::End),
        // SS3 application-mode cursor keys.
        (vec![ESC, b'O' as u32, b'A' as u32], LogicalKey::Up),
        (vec![ESC, b'O' as u32, b'B' as u32], LogicalKey::Down),
        (vec![ESC, b'O' as u32, b'C' as u32], LogicalKey::Right),
        (vec![ESC, b'O' as u32, b'D' as u32], LogicalKey::Left),
        (vec![ESC, b'O' as u32, b'H' as u32], LogicalKey::Home),
        (vec![ESC, b'O' as u32, b'F' as u32], LogicalKey::End),
        // SS3 F1-F4.
        (vec![ESC, b'O' as u32, b'P' as u32], LogicalKey::Function(1)),
        (vec![ESC, b'O' as u32, b'Q' as u32], LogicalKey::Function(2)),
        (vec![ESC, b'O' as u32, b'R' as u32], LogicalKey::Function(3)),
        (vec![ESC, b'O' as u32, b'S' as u32], LogicalKey::Function(4)),
    ];

    // VT-style `ESC [ n ~` editing keys.
    let tilde = |digits: &[u8], key: LogicalKey| {
        let mut seq = vec![ESC, b'[' as u32];
        seq.extend(digits.iter().map(|&d| d as u32));
        seq.push(b'~' as u32);
        (seq, key)
    };
    bindings.push(tilde(b"1", LogicalKey::Home));
    bindings.push(tilde(b"2", LogicalKey::Insert));
    bindings.push(tilde(b"3", LogicalKey::Delete));
    bindings.push(tilde(b"4", LogicalKey::End));
    bindings.push(tilde(b"5", LogicalKey::PageUp));
    bindings.push(tilde(b"6", LogicalKey::PageDown));
    for (digits, n) in [
        (b"11" as &[u8], 1u8),
        (b"12", 2),
        (b"13", 3),
        (b"14", 4),
        (b"15", 5),
        (b"17", 6),
        (b"18", 7),
        (b"19", 8),
        (b"20", 9),
        (b"21", 10),
        (b"23", 11),
        (b"24", 12),
    ] {
        bindings.push(tilde(digits, LogicalKey::Function(n)));
    }
    bindings
}

/// A key-sequence table the input-dispatch layer feeds byte by byte.
#[derive(Debug)]
pub struct KeyMap {
    trie: KeyTrie<LogicalKey>,
}

impl KeyMap {
    /// An empty map with no bindings.
    pub fn empty() -> Self {
        Self {
            trie: KeyTrie::new(),
        }
    }

    /// A map preloaded with `default_bindings`.
    pub fn new() -> Self {
        let mut map = Self::empty();
        for (sequence, key) in default_bindings() {
            // Default sequences are never empty.
            let _ = map.trie.insert(&sequence, key);
        }
        map
    }

    pub fn bind(&mut self, sequence: &[u32], key: LogicalKey) -> Result<(), KeymapError> {
        self.trie.insert(sequence, key)
    }

    pub fn unbind(&mut self, sequence: &[u32]) -> Result<LogicalKey, KeymapError> {
        self.trie.remove(sequence)
    }

    /// Begin matching a fresh byte sequence.
    pub fn reset(&mut self) {
        self.trie.reset_scan();
    }

    /// Feed one raw terminal byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.trie.push_key(byte as u32);
    }

    /// Settle the scan after an inter-key timeout.
    pub fn finalize(&mut self) {
        self.trie.finalize_scan();
    }

    pub fn state(&self) -> ScanState {
        self.trie.scan_state()
    }

    /// The key the current scan resolved to, if any macro fired.
    pub fn resolved(&self) -> Option<LogicalKey> {
        self.trie.found_data().copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_resolve() {
        let mut map = KeyMap::new();

        map.reset();
        for byte in [0x1b, b'[', b'A'] {
            map.push_byte(byte);
        }
        assert_eq!(map.state(), ScanState::Found);
        assert_eq!(map.resolved(), Some(LogicalKey::Up));

        map.reset();
        for byte in [0x1b, b'[', b'B'] {
            map.push_byte(byte);
        }
        assert_eq!(map.resolved(), Some(LogicalKey::Down));
    }

    #[test]
    fn lone_escape_needs_finalize() {
        let mut map = KeyMap::new();
        map.reset();
        map.push_byte(0x1b);
        // Escape is bound, but arrows are still possible.
        assert_eq!(map.state(), ScanState::Matching);

        map.finalize();
        assert_eq!(map.state(), ScanState::Found);
        assert_eq!(map.resolved(), Some(LogicalKey::Escape));
    }

    #[test]
    fn vt_editing_keys_resolve() {
        let mut map = KeyMap::new();
        map.reset();
        for byte in [0x1b, b'[', b'5', b'~'] {
            map.push_byte(byte);
        }
        assert_eq!(map.resolved(), Some(LogicalKey::PageUp));

        map.reset();
        for byte in [0x1b, b'[', b'2', b'4', b'~'] {
            map.push_byte(byte);
        }
        assert_eq!(map.resolved(), Some(LogicalKey::Function(12)));
    }

    #[test]
    fn plain_text_byte_is_not_a_macro() {
        let mut map = KeyMap::new();
        map.reset();
        map.push_byte(b'q');
        assert_eq!(map.state(), ScanState::NotFound);
        assert_eq!(map.resolved(), None);
    }

    #[test]
    fn custom_binding_round_trip() {
        let mut map = KeyMap::empty();
        map.bind(&[1, 2, 3], LogicalKey::Function(9)).unwrap();

        map.reset();
        for key in [1, 2, 3] {
            map.push_byte(key);
        }
        assert_eq!(map.resolved(), Some(LogicalKey::Function(9)));

        assert_eq!(map.unbind(&[1, 2, 3]), Ok(LogicalKey::Function(9)));
        map.reset();
        map.push_byte(1);
        assert_eq!(map.state(), ScanState::NotFound);
    }
}
