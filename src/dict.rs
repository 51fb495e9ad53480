//! Pronunciation dictionary as an incremental automaton.
//!
//! A dictionary is walked one character at a time: each query passes the
//! encoded character and the state returned by the previous query, and gets
//! back the reading stored at the new position (if any) plus the next state.
//! A miss means the current path cannot be extended; callers reset to
//! [`DictState::ROOT`] and decide for themselves what to do with the text
//! consumed so far.  Both the segmenter and the reading deriver drive the
//! dictionary through a [`Cursor`].
//!
//! Readings are stored in a compact one-byte-per-character form: every
//! reading character is a code point in U+3000..U+30FF and is stored as
//! `code - 0x3000`.  [`decode_reading`] reverses it.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::codec::TextCodec;

/// Base code point of the one-byte reading encoding.
const READING_BASE: u32 = 0x3000;

#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: expected `surface<TAB>reading`")]
    MalformedLine { line: usize },

    #[error("line {line}: reading character {ch:?} is outside U+3000..U+30FF")]
    ReadingOutOfRange { line: usize, ch: char },

    #[error("line {line}: surface {surface:?} cannot be encoded as {encoding}")]
    Unencodable { line: usize, surface: String, encoding: &'static str },

    #[error("reading {reading:?}: character {ch:?} is outside U+3000..U+30FF")]
    InvalidReading { reading: String, ch: char },
}

/// Opaque position inside a dictionary automaton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DictState(pub u32);

impl DictState {
    pub const ROOT: DictState = DictState(0);
}

/// Result of a successful dictionary step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup<'a> {
    /// Encoded reading of the text walked so far, if it is a complete entry.
    pub value: Option<&'a [u8]>,
    pub next: DictState,
}

/// An incremental dictionary automaton.
pub trait Dictionary {
    /// Step from `state` over one encoded character.
    ///
    /// `None` means the path does not exist.
    fn lookup(&self, key: &[u8], state: DictState) -> Option<Lookup<'_>>;
}

impl<D: Dictionary + ?Sized> Dictionary for &D {
    fn lookup(&self, key: &[u8], state: DictState) -> Option<Lookup<'_>> {
        (**self).lookup(key, state)
    }
}

/// Decode a stored reading: every byte `b` stands for `U+3000 + b`.
pub fn decode_reading(raw: &[u8]) -> String {
    raw.iter()
        .filter_map(|&b| char::from_u32(READING_BASE + u32::from(b)))
        .collect()
}

/// Encode a kana reading into the one-byte form.  Returns the first
/// character that does not fit on failure.
pub fn encode_reading(reading: &str) -> Result<Vec<u8>, char> {
    reading
        .chars()
        .map(|c| {
            (c as u32)
                .checked_sub(READING_BASE)
                .filter(|&v| v <= 0xFF)
                .map(|v| v as u8)
                .ok_or(c)
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Cursor — the per-character query loop shared by segmenter and deriver
// ─────────────────────────────────────────────────────────────────────────────

/// Outcome of advancing a [`Cursor`] by one character.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<'a> {
    /// The path continues; `Some` if the walked text is a complete entry.
    Matched(Option<&'a [u8]>),
    /// The path ended; the cursor has been reset to the root.
    Rejected,
}

/// Threads the automaton state through successive per-character queries.
pub struct Cursor<'d, D: ?Sized> {
    dict: &'d D,
    codec: TextCodec,
    state: DictState,
}

impl<'d, D: Dictionary + ?Sized> Cursor<'d, D> {
    pub fn new(dict: &'d D, codec: TextCodec) -> Self {
        Self { dict, codec, state: DictState::ROOT }
    }

    /// Feed one character.  Characters the codec cannot represent are
    /// rejected like any other miss.
    pub fn advance(&mut self, c: char) -> Step<'d> {
        let (dict, state) = (self.dict, self.state);
        let found = self.codec.encode_char(c).and_then(|key| dict.lookup(&key, state));
        match found {
            Some(Lookup { value, next }) => {
                self.state = next;
                Step::Matched(value.filter(|v| !v.is_empty()))
            }
            None => {
                self.reset();
                Step::Rejected
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = DictState::ROOT;
    }

    pub fn state(&self) -> DictState {
        self.state
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TrieDictionary — in-memory implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct DictNode {
    children: HashMap<Vec<u8>, u32>,
    value: Option<Vec<u8>>,
}

/// In-memory dictionary: a trie over encoded characters.
///
/// States are node indices; the root is node 0.
#[derive(Debug)]
pub struct TrieDictionary {
    codec: TextCodec,
    nodes: Vec<DictNode>,
    entries: usize,
}

impl TrieDictionary {
    pub fn new(codec: TextCodec) -> Self {
        Self { codec, nodes: vec![DictNode::default()], entries: 0 }
    }

    pub fn codec(&self) -> TextCodec {
        self.codec
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Insert `surface` with an already encoded reading.  The first entry
    /// for a surface wins; returns `false` for a duplicate or an
    /// unencodable surface.
    pub fn insert_raw(&mut self, surface: &str, reading: Vec<u8>) -> bool {
        let mut cur = 0usize;
        for c in surface.chars() {
            let Some(key) = self.codec.encode_char(c) else {
                return false;
            };
            cur = match self.nodes[cur].children.get(&key) {
                Some(&next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(DictNode::default());
                    self.nodes[cur].children.insert(key, next as u32);
                    next
                }
            };
        }
        if cur == 0 || self.nodes[cur].value.is_some() {
            return false;
        }
        self.nodes[cur].value = Some(reading);
        self.entries += 1;
        true
    }

    /// Insert `surface` read as `reading` (kana).
    pub fn insert(&mut self, surface: &str, reading: &str) -> Result<bool, DictError> {
        let raw = encode_reading(reading)
            .map_err(|ch| DictError::InvalidReading { reading: reading.to_string(), ch })?;
        Ok(self.insert_raw(surface, raw))
    }

    /// Build from `(surface, reading)` pairs.
    pub fn from_entries<'a>(
        codec: TextCodec,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, DictError> {
        let mut dict = Self::new(codec);
        for (surface, reading) in entries {
            dict.insert(surface, reading)?;
        }
        Ok(dict)
    }

    /// Parse tab-separated `surface<TAB>reading` lines.
    ///
    /// Blank lines and lines starting with `#` are ignored.  Duplicate
    /// surfaces keep their first reading.
    pub fn from_tsv<R: BufRead>(codec: TextCodec, reader: R) -> Result<Self, DictError> {
        let mut dict = Self::new(codec);
        let mut duplicates = 0usize;
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let lineno = idx + 1;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let (surface, reading) = line
                .split_once('\t')
                .ok_or(DictError::MalformedLine { line: lineno })?;
            let (surface, reading) = (surface.trim(), reading.trim());
            if surface.is_empty() || reading.is_empty() {
                return Err(DictError::MalformedLine { line: lineno });
            }
            if codec.encode_str(surface).is_none() {
                return Err(DictError::Unencodable {
                    line: lineno,
                    surface: surface.to_string(),
                    encoding: codec.name(),
                });
            }
            let raw = encode_reading(reading)
                .map_err(|ch| DictError::ReadingOutOfRange { line: lineno, ch })?;
            if !dict.insert_raw(surface, raw) {
                duplicates += 1;
                tracing::warn!(line = lineno, surface, "duplicate dictionary entry ignored");
            }
        }
        tracing::info!(
            entries = dict.entries,
            duplicates,
            encoding = codec.name(),
            "dictionary loaded"
        );
        Ok(dict)
    }

    /// Load a TSV dictionary file.
    pub fn open(path: &Path, codec: TextCodec) -> Result<Self, DictError> {
        let file = File::open(path)?;
        Self::from_tsv(codec, BufReader::new(file))
    }
}

impl Dictionary for TrieDictionary {
    fn lookup(&self, key: &[u8], state: DictState) -> Option<Lookup<'_>> {
        let node = self.nodes.get(state.0 as usize)?;
        let &next = node.children.get(key)?;
        let value = self.nodes[next as usize].value.as_deref();
        Some(Lookup { value, next: DictState(next) })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
