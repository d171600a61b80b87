//! Prefix trie over terminal key-code sequences.
//!
//! Terminal escape sequences are prefix-ambiguous by construction: a
//! lone Escape byte is also the first byte of every arrow key. The trie
//! therefore scans incrementally, remembers the deepest binding that
//! fired, and leaves the final shorter-vs-longer decision to a
//! caller-driven finalize step after an inter-key timeout: the trie
//! itself has no notion of wall-clock time.

use crate::sorted::SortedMap;
use thiserror::Error;
use tracing::trace;

/// Key-table failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    #[error("key sequence was never inserted")]
    UnknownSequence,
    #[error("key sequence must not be empty")]
    EmptySequence,
}

/// State of an in-progress scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// The keys so far are a live prefix of at least one macro.
    #[default]
    Matching,
    /// A macro resolved; no longer a usable prefix of anything longer.
    Found,
    /// No macro matches; the caller replays the buffered keys as
    /// literal input.
    NotFound,
}

#[derive(Debug)]
struct TrieNode<T> {
    binding: Option<T>,
    children: SortedMap<u32, usize>,
}

impl<T> TrieNode<T> {
    fn new() -> Self {
        Self {
            binding: None,
            children: SortedMap::new(),
        }
    }
}

/// A key-sequence trie with incremental, stateful matching.
///
/// Nodes live in an arena indexed by slot; slot 0 is the root sentinel.
/// Each trie is a fully encapsulated context; multiple instances
/// coexist without shared state.
#[derive(Debug)]
pub struct KeyTrie<T> {
    nodes: Vec<TrieNode<T>>,
    free: Vec<usize>,
    cursor: Option<usize>,
    found: Option<usize>,
    map_found: bool,
    state: ScanState,
}

const ROOT: usize = 0;

impl<T> KeyTrie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::new()],
            free: Vec::new(),
            cursor: Some(ROOT),
            found: None,
            map_found: false,
            state: ScanState::Matching,
        }
    }

    /// Bind `payload` to `sequence`, overwriting any previous binding.
    ///
    /// Mutating the table invalidates any scan in progress, so the scan
    /// state is reset.
    pub fn insert(&mut self, sequence: &[u32], payload: T) -> Result<(), KeymapError> {
        if sequence.is_empty() {
            return Err(KeymapError::EmptySequence);
        }
        let mut current = ROOT;
        for &key in sequence {
            current = match self.nodes[current].children.get(&key) {
                Some(&child) => child,
                None => {
                    let child = self.alloc_node();
                    self.nodes[current].children.insert(key, child);
                    child
                }
            };
        }
        self.nodes[current].binding = Some(payload);
        self.reset_scan();
        Ok(())
    }

    /// Remove the binding for `sequence`, pruning nodes that no longer
    /// serve as a prefix of any other macro.
    pub fn remove(&mut self, sequence: &[u32]) -> Result<T, KeymapError> {
        if sequence.is_empty() {
            return Err(KeymapError::EmptySequence);
        }
        // Walk down, remembering (parent, key) for the pruning pass.
        let mut path = Vec::with_capacity(sequence.len());
        let mut current = ROOT;
        for &key in sequence {
            let &child = self
                .nodes[current]
                .children
                .get(&key)
                .ok_or(KeymapError::UnknownSequence)?;
            path.push((current, key, child));
            current = child;
        }
        let payload = self.nodes[current]
            .binding
            .take()
            .ok_or(KeymapError::UnknownSequence)?;

        // Prune upward to a fixed point: a node goes away once it has
        // neither a binding nor children.
        for &(parent, key, node) in path.iter().rev() {
            if self.nodes[node].binding.is_some() || !self.nodes[node].children.is_empty() {
                break;
            }
            self.nodes[parent].children.remove(&key);
            self.free.push(node);
        }

        self.reset_scan();
        Ok(payload)
    }

    /// Direct lookup of a complete sequence, without touching scan state.
    pub fn get(&self, sequence: &[u32]) -> Option<&T> {
        let mut current = ROOT;
        for key in sequence {
            current = *self.nodes[current].children.get(key)?;
        }
        self.nodes[current].binding.as_ref()
    }

    /// Begin a new scan. Must be called before the first key of a fresh
    /// input event.
    pub fn reset_scan(&mut self) {
        self.cursor = Some(ROOT);
        self.found = None;
        self.map_found = false;
        self.state = ScanState::Matching;
    }

    /// Advance the scan by one key.
    pub fn push_key(&mut self, key: u32) {
        if self.state != ScanState::Matching {
            trace!(key, state = ?self.state, "push ignored after scan settled");
            return;
        }
        let Some(cursor) = self.cursor else {
            self.state = ScanState::NotFound;
            return;
        };

        match self.nodes[cursor].children.get(&key) {
            Some(&child) => {
                self.cursor = Some(child);
                if self.nodes[child].binding.is_some() {
                    // A macro fired here, but a longer macro may still
                    // be in flight; keep matching.
                    self.found = Some(child);
                    self.map_found = true;
                }
                if self.nodes[child].children.is_empty() {
                    self.state = ScanState::Found;
                }
                trace!(key, state = ?self.state, fired = self.map_found, "key matched");
            }
            None => {
                self.cursor = None;
                self.state = ScanState::NotFound;
                trace!(key, "key diverged from every macro");
            }
        }
    }

    /// Settle a scan when input has ended (e.g. on an inter-key
    /// timeout): a macro that fired as a prefix of a longer, unfinished
    /// one still resolves.
    pub fn finalize_scan(&mut self) {
        if self.map_found {
            self.state = ScanState::Found;
        } else if self.state == ScanState::Matching {
            self.state = ScanState::NotFound;
        }
    }

    pub fn scan_state(&self) -> ScanState {
        self.state
    }

    /// Whether any macro fired during the current scan. Can be set
    /// while the state is still `Matching`.
    pub fn map_found(&self) -> bool {
        self.map_found
    }

    /// Payload of the deepest macro that fired this scan.
    pub fn found_data(&self) -> Option<&T> {
        self.found.and_then(|idx| self.nodes[idx].binding.as_ref())
    }

    fn alloc_node(&mut self) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = TrieNode::new();
                idx
            }
            None => {
                self.nodes.push(TrieNode::new());
                self.nodes.len() - 1
            }
        }
    }
}

impl<T> Default for KeyTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrow_trie() -> KeyTrie<&'static str> {
        let mut trie = KeyTrie::new();
        trie.insert(&[27, 91, 65], "UP").unwrap();
        trie.insert(&[27, 91, 66], "DOWN").unwrap();
        trie
    }

    #[test]
    fn exact_sequence_resolves_at_final_key() {
        let mut trie = arrow_trie();

        trie.reset_scan();
        trie.push_key(27);
        assert_eq!(trie.scan_state(), ScanState::Matching);
        assert!(!trie.map_found());
        trie.push_key(91);
        assert_eq!(trie.scan_state(), ScanState::Matching);
        assert!(!trie.map_found());
        trie.push_key(65);
        assert!(trie.map_found());
        assert_eq!(trie.scan_state(), ScanState::Found);
        assert_eq!(trie.found_data(), Some(&"UP"));
    }

    #[test]
    fn divergent_key_is_not_found() {
        let mut trie = arrow_trie();
        trie.reset_scan();
        trie.push_key(27);
        trie.push_key(79);
        assert_eq!(trie.scan_state(), ScanState::NotFound);
        assert_eq!(trie.found_data(), None);
    }

    #[test]
    fn prefix_macro_waits_for_finalize() {
        let mut trie = arrow_trie();
        trie.insert(&[27], "ESC").unwrap();

        trie.reset_scan();
        trie.push_key(27);
        // Fired, but still a usable prefix of the arrow macros.
        assert!(trie.map_found());
        assert_eq!(trie.scan_state(), ScanState::Matching);

        trie.finalize_scan();
        assert_eq!(trie.scan_state(), ScanState::Found);
        assert_eq!(trie.found_data(), Some(&"ESC"));
    }

    #[test]
    fn longer_macro_wins_when_it_completes() {
        let mut trie = arrow_trie();
        trie.insert(&[27], "ESC").unwrap();

        trie.reset_scan();
        trie.push_key(27);
        trie.push_key(91);
        trie.push_key(65);
        assert_eq!(trie.scan_state(), ScanState::Found);
        assert_eq!(trie.found_data(), Some(&"UP"));
    }

    #[test]
    fn finalize_without_match_settles_not_found() {
        let mut trie = arrow_trie();
        trie.reset_scan();
        trie.push_key(27);
        trie.finalize_scan();
        assert_eq!(trie.scan_state(), ScanState::NotFound);
    }

    #[test]
    fn reinsert_overwrites_payload() {
        let mut trie = KeyTrie::new();
        trie.insert(&[1, 2], "old").unwrap();
        trie.insert(&[1, 2], "new").unwrap();
        assert_eq!(trie.get(&[1, 2]), Some(&"new"));
    }

    #[test]
    fn remove_prunes_only_the_dead_branch() {
        let mut trie = arrow_trie();
        assert_eq!(trie.remove(&[27, 91, 65]), Ok("UP"));

        // The deleted branch diverges at its last key...
        trie.reset_scan();
        trie.push_key(27);
        trie.push_key(91);
        assert_eq!(trie.scan_state(), ScanState::Matching);
        trie.push_key(65);
        assert_eq!(trie.scan_state(), ScanState::NotFound);

        // ...while the sibling macro still resolves.
        trie.reset_scan();
        trie.push_key(27);
        trie.push_key(91);
        trie.push_key(66);
        assert_eq!(trie.found_data(), Some(&"DOWN"));
    }

    #[test]
    fn remove_prunes_empty_ancestors_to_fixed_point() {
        let mut trie = KeyTrie::new();
        trie.insert(&[1, 2, 3], "deep").unwrap();
        assert_eq!(trie.remove(&[1, 2, 3]), Ok("deep"));

        trie.reset_scan();
        trie.push_key(1);
        assert_eq!(trie.scan_state(), ScanState::NotFound);

        // Freed slots are reused.
        trie.insert(&[4, 5], "next").unwrap();
        assert_eq!(trie.get(&[4, 5]), Some(&"next"));
    }

    #[test]
    fn remove_keeps_prefix_bindings() {
        let mut trie = KeyTrie::new();
        trie.insert(&[27], "ESC").unwrap();
        trie.insert(&[27, 91, 65], "UP").unwrap();
        trie.remove(&[27, 91, 65]).unwrap();

        trie.reset_scan();
        trie.push_key(27);
        assert!(trie.map_found());
        trie.finalize_scan();
        assert_eq!(trie.found_data(), Some(&"ESC"));
    }

    #[test]
    fn remove_unknown_sequence_fails() {
        let mut trie = arrow_trie();
        assert_eq!(trie.remove(&[1, 2]), Err(KeymapError::UnknownSequence));
        // A bound path's strict prefix is not itself a binding.
        assert_eq!(trie.remove(&[27, 91]), Err(KeymapError::UnknownSequence));
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let mut trie: KeyTrie<&str> = KeyTrie::new();
        assert_eq!(trie.insert(&[], "x"), Err(KeymapError::EmptySequence));
        assert_eq!(trie.remove(&[]), Err(KeymapError::EmptySequence));
    }

    #[test]
    fn pushes_after_settled_state_are_ignored() {
        let mut trie = arrow_trie();
        trie.reset_scan();
        trie.push_key(99);
        assert_eq!(trie.scan_state(), ScanState::NotFound);
        trie.push_key(27);
        assert_eq!(trie.scan_state(), ScanState::NotFound);
    }
}
