//! Prefix-tree tokenizer with greedy longest-match scanning.
//!
//! The tree is an arena of nodes addressed by index.  It is filled once with
//! [`TransTable::add`] and only read afterwards, so a built table can be
//! shared freely between threads.
//!
//! Scanning is greedy and never looks further back than one character: when
//! a match cannot be extended, whatever the cursor holds is emitted and the
//! scan restarts from the root on the rejected character.  The single
//! exception is a value that reports [`Rewind::rewinds`]; after emitting it
//! the scanner steps back one more character so that the second half of a
//! doubled letter can open the next match (`kka` → `kk` + `ka`).

use std::collections::HashMap;

/// Index of the root node in the arena.
const ROOT: usize = 0;

/// Values stored in a [`TransTable`] decide whether the scanner backs up one
/// character after emitting them.
pub trait Rewind {
    fn rewinds(&self) -> bool {
        false
    }
}

struct Node<V> {
    children: HashMap<char, usize>,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self { children: HashMap::new(), value: None }
    }
}

/// Character trie mapping registered strings to values.
pub struct TransTable<V> {
    nodes: Vec<Node<V>>,
    len: usize,
}

impl<V> Default for TransTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TransTable<V> {
    pub fn new() -> Self {
        Self { nodes: vec![Node::new()], len: 0 }
    }

    /// Register `value` under `key`.
    ///
    /// # Panics
    /// If `key` is empty or already registered.  Tables are built from static
    /// data, so either case is a programming error.
    pub fn add(&mut self, key: &str, value: V) {
        assert!(!key.is_empty(), "empty key in trie");
        let mut cur = ROOT;
        for c in key.chars() {
            cur = match self.nodes[cur].children.get(&c) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::new());
                    self.nodes[cur].children.insert(c, next);
                    next
                }
            };
        }
        assert!(self.nodes[cur].value.is_none(), "duplicate trie key {:?}", key);
        self.nodes[cur].value = Some(value);
        self.len += 1;
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Exact lookup of a whole key.
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut cur = ROOT;
        for c in key.chars() {
            cur = *self.nodes[cur].children.get(&c)?;
        }
        self.nodes[cur].value.as_ref()
    }

    fn child(&self, node: usize, c: char) -> Option<usize> {
        self.nodes[node].children.get(&c).copied()
    }
}

impl<V: Rewind> TransTable<V> {
    /// Tokenize `text` into the sequence of registered values.
    ///
    /// Characters that cannot start a match are skipped without trace.
    pub fn parse<'a>(&'a self, text: &str) -> Parse<'a, V> {
        Parse { table: self, chars: text.chars().collect(), pos: 0, cursor: ROOT, done: false }
    }
}

/// Lazy iterator returned by [`TransTable::parse`].
pub struct Parse<'a, V> {
    table: &'a TransTable<V>,
    chars: Vec<char>,
    pos: usize,
    cursor: usize,
    done: bool,
}

impl<'a, V: Rewind> Iterator for Parse<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.done {
            return None;
        }
        let table = self.table;
        while self.pos < self.chars.len() {
            let c = self.chars[self.pos];
            if let Some(next) = table.child(self.cursor, c) {
                self.cursor = next;
                self.pos += 1;
            } else if self.cursor == ROOT {
                self.pos += 1;
            } else {
                let held = table.nodes[self.cursor].value.as_ref();
                self.cursor = ROOT;
                if let Some(v) = held {
                    if v.rewinds() {
                        self.pos -= 1;
                    }
                    return Some(v);
                }
            }
        }
        self.done = true;
        let held = table.nodes[self.cursor].value.as_ref();
        self.cursor = ROOT;
        held
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, PartialEq)]
    struct Tok(&'static str);

    impl Rewind for Tok {
        fn rewinds(&self) -> bool {
            self.0 == "QQ"
        }
    }

    fn table() -> TransTable<Tok> {
        let mut t = TransTable::new();
        t.add("a", Tok("A"));
        t.add("ka", Tok("KA"));
        t.add("kya", Tok("KYA"));
        t.add("kk", Tok("QQ"));
        t.add("n", Tok("N"));
        t
    }

    fn names(t: &TransTable<Tok>, s: &str) -> Vec<&'static str> {
        t.parse(s).map(|v| v.0).collect()
    }

    #[test]
    fn test_longest_match() {
        let t = table();
        assert_eq!(names(&t, "kyaka"), vec!["KYA", "KA"]);
        assert_eq!(names(&t, "kaa"), vec!["KA", "A"]);
    }

    #[test]
    fn test_unknown_at_root_is_dropped() {
        let t = table();
        assert_eq!(names(&t, "x!ka?"), vec!["KA"]);
        assert!(names(&t, "").is_empty());
    }

    #[test]
    fn test_dead_prefix_restarts_on_same_char() {
        // "ky" has no value; the scan restarts at "a".
        let t = table();
        assert_eq!(names(&t, "kyx"), Vec::<&str>::new());
        assert_eq!(names(&t, "kya"), vec!["KYA"]);
        assert_eq!(names(&t, "kyka"), vec!["KA"]);
    }

    #[test]
    fn test_rewind_on_double_consonant() {
        let t = table();
        assert_eq!(names(&t, "kka"), vec!["QQ", "KA"]);
        assert_eq!(names(&t, "akkya"), vec!["A", "QQ", "KYA"]);
        // at end of input nothing is re-read
        assert_eq!(names(&t, "kk"), vec!["QQ"]);
    }

    #[test]
    fn test_get_and_len() {
        let t = table();
        assert_eq!(t.len(), 5);
        assert_eq!(t.get("kya"), Some(&Tok("KYA")));
        assert_eq!(t.get("ky"), None);
        assert_eq!(t.get("z"), None);
    }

    #[test]
    #[should_panic(expected = "duplicate trie key")]
    fn test_duplicate_key_panics() {
        let mut t = table();
        t.add("ka", Tok("KA2"));
    }

    proptest! {
        #[test]
        fn prop_parse_terminates_and_is_bounded(s in "[aknyx]{0,40}") {
            let t = table();
            let out = names(&t, &s);
            prop_assert!(out.len() <= s.chars().count());
        }
    }
}
