//! Reading derivation — chunk → `(surface, reading)` units.
//!
//! Pipeline for one chunk:
//! 1. **Tokenize** — digits one at a time, counter units after digits,
//!    everything else by greedy longest match against the dictionary.
//! 2. **Spell out** — characters without a dictionary reading are replaced
//!    by a speakable name when they have one (`%` → パーセント, `k` → ケイ).
//! 3. **Normalize** — final particle correction (は → わ, へ → え),
//!    hiragana → katakana, and `オウ` → `オー` long-vowel contraction.

use std::mem;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::{
    codec::TextCodec,
    dict::{decode_reading, Cursor, Dictionary, Step},
    unicode::{fold_fullwidth_alnum, hiragana_to_katakana, is_digit},
};

// ─────────────────────────────────────────────────────────────────────────────
// Static tables
// ─────────────────────────────────────────────────────────────────────────────

/// Counter suffixes read specially right after a number.
const UNITS: &[(char, &str)] = &[
    ('年', "ネン"),
    ('月', "ガツ"),
    ('日', "ニチ"),
    ('時', "ジ"),
    ('人', "ニン"),
    ('歳', "サイ"),
];

/// Speakable names for symbols, digits and Latin letters (lower case).
const SPELLOUT: &[(char, &str)] = &[
    (' ', "スペース"),
    ('.', "ピリオド"),
    (',', "カンマ"),
    ('!', "ビックリ"),
    ('?', "ハテナ"),
    ('+', "プラス"),
    ('-', "マイナス"),
    ('*', "カケル"),
    ('/', "ワル"),
    ('(', "カッコ"),
    (')', "コッカ"),
    ('@', "アットマーク"),
    ('~', "チルダ"),
    ('#', "シャープ"),
    ('$', "ドル"),
    ('%', "パーセント"),
    ('\'', "アポストロフィ"),
    ('&', "アンド"),
    ('_', "アンダースコア"),
    ('=', "イコール"),
    ('<', "ショーナリ"),
    ('>', "ダイナリ"),
    (':', "コロン"),
    (';', "セミコロン"),
    ('[', "ヒラキカギ"),
    (']', "トジカギ"),
    ('0', "ゼロ"),
    ('1', "イチ"),
    ('2', "ニ"),
    ('3', "サン"),
    ('4', "ヨン"),
    ('5', "ゴ"),
    ('6', "ロク"),
    ('7', "ナナ"),
    ('8', "ハチ"),
    ('9', "キュー"),
    ('a', "エー"),
    ('b', "ビー"),
    ('c', "シー"),
    ('d', "デー"),
    ('e', "イー"),
    ('f', "エフ"),
    ('g', "ジー"),
    ('h', "エイチ"),
    ('i', "アイ"),
    ('j', "ジエ"),
    ('k', "ケイ"),
    ('l', "エル"),
    ('m', "エム"),
    ('n', "エヌ"),
    ('o', "オー"),
    ('p', "ピー"),
    ('q', "キュー"),
    ('r', "アール"),
    ('s', "エス"),
    ('t', "テー"),
    ('u', "ユー"),
    ('v', "ブイ"),
    ('w', "ダブル"),
    ('x', "エックス"),
    ('y', "ワイ"),
    ('z', "ゼット"),
];

fn unit_reading(c: char) -> Option<&'static str> {
    UNITS.iter().find(|(u, _)| *u == c).map(|(_, r)| *r)
}

/// Speakable name for `c`, case-insensitive; full-width letters and digits
/// are folded first.
pub fn spellout(c: char) -> Option<&'static str> {
    let c = fold_fullwidth_alnum(c).to_ascii_lowercase();
    SPELLOUT.iter().find(|(s, _)| *s == c).map(|(_, r)| *r)
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalisation
// ─────────────────────────────────────────────────────────────────────────────

/// Final は/へ not followed by more hiragana.
static RE_FINAL_PARTICLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([はへ])([^ぁ-ん]*)$").unwrap());

/// Katakana o-row (and ョ/ォ) followed by ウ.
static RE_LONG_O: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([オコゴソゾトドノホボポモヨロョォ])ウ").unwrap());

/// Normalize a reading for the mora table.
pub fn normalize_reading(reading: &str) -> String {
    let corrected = RE_FINAL_PARTICLE.replace(reading, |caps: &Captures| {
        let particle = if &caps[1] == "は" { "わ" } else { "え" };
        format!("{}{}", particle, &caps[2])
    });
    let katakana = hiragana_to_katakana(&corrected);
    RE_LONG_O.replace_all(&katakana, "${1}ー").into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Deriver
// ─────────────────────────────────────────────────────────────────────────────

/// One unit of speech: the text it stands for and its katakana reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    /// Dictionary surface, or the spelled-out literal text.
    pub surface: String,
    /// Normalized katakana reading.
    pub reading: String,
}

/// Raw token before spellout and normalisation.
#[derive(Debug)]
struct Token {
    surface: String,
    reading: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Main,
    Digit,
    Unit,
    Other,
}

/// Derives readings for chunks produced by the segmenter.
pub struct ReadingDeriver<'d, D: ?Sized> {
    dict: &'d D,
    codec: TextCodec,
}

impl<'d, D: Dictionary + ?Sized> ReadingDeriver<'d, D> {
    pub fn new(dict: &'d D, codec: TextCodec) -> Self {
        Self { dict, codec }
    }

    /// Readings for `chunk`, in order.
    pub fn get_yomi(&self, chunk: &str) -> Vec<Reading> {
        let chars: Vec<char> = chunk.chars().collect();
        let mut run = Run {
            cursor: Cursor::new(self.dict, self.codec),
            state: State::Main,
            part: Vec::new(),
            best: None,
            tokens: Vec::new(),
        };
        run.feed(&chars);
        let readings = assemble(run.tokens);
        debug!(chunk, ?readings, "yomi");
        readings
    }
}

/// Per-call tokenizer state.
struct Run<'d, D: ?Sized> {
    cursor: Cursor<'d, D>,
    state: State,
    /// Characters walked through the dictionary since the last commit.
    part: Vec<char>,
    /// Longest dictionary entry seen in `part`: (chars, encoded reading).
    best: Option<(usize, &'d [u8])>,
    tokens: Vec<Token>,
}

impl<'d, D: Dictionary + ?Sized> Run<'d, D> {
    fn feed(&mut self, chars: &[char]) {
        let mut i = 0;
        loop {
            if i < chars.len() {
                i = self.step(chars[i], i);
            } else if self.part.is_empty() {
                break;
            } else {
                i = self.commit(i);
            }
        }
    }

    fn literal(&mut self, c: char) {
        self.tokens.push(Token { surface: c.to_string(), reading: None });
    }

    /// Commit the pending part, which ends just before `end`.  Returns the
    /// index to resume from; anything after the committed prefix is read
    /// again from a fresh dictionary state.
    fn commit(&mut self, end: usize) -> usize {
        let start = end - self.part.len();
        let consumed = match self.best.take() {
            Some((n, raw)) => {
                self.tokens.push(Token {
                    surface: self.part[..n].iter().collect(),
                    reading: Some(decode_reading(raw)),
                });
                n
            }
            None => {
                self.literal(self.part[0]);
                1
            }
        };
        self.part.clear();
        self.cursor.reset();
        self.state = State::Main;
        start + consumed
    }

    fn step(&mut self, c: char, i: usize) -> usize {
        match self.state {
            State::Main => {
                self.state = if is_digit(c) { State::Digit } else { State::Other };
                i
            }
            State::Digit => {
                if is_digit(c) {
                    self.literal(c);
                    i + 1
                } else {
                    self.state = State::Unit;
                    i
                }
            }
            State::Unit => {
                self.state = State::Main;
                match unit_reading(c) {
                    Some(r) => {
                        self.tokens
                            .push(Token { surface: c.to_string(), reading: Some(r.to_string()) });
                        i + 1
                    }
                    None => i,
                }
            }
            State::Other => {
                if is_digit(c) {
                    if self.part.is_empty() {
                        self.state = State::Main;
                        return i;
                    }
                    return self.commit(i);
                }
                self.part.push(c);
                match self.cursor.advance(c) {
                    Step::Matched(value) => {
                        if let Some(raw) = value {
                            self.best = Some((self.part.len(), raw));
                        }
                        i + 1
                    }
                    Step::Rejected => self.commit(i + 1),
                }
            }
        }
    }
}

/// Merge literal runs, spell them out, and normalize every reading.
fn assemble(tokens: Vec<Token>) -> Vec<Reading> {
    let mut out = Vec::new();
    let mut literal = String::new();
    for token in tokens {
        match token.reading {
            None => {
                for c in token.surface.chars() {
                    match spellout(c) {
                        Some(name) => literal.push_str(name),
                        None => literal.push(c),
                    }
                }
            }
            Some(reading) => {
                if !literal.is_empty() {
                    let text = mem::take(&mut literal);
                    out.push(Reading { reading: normalize_reading(&text), surface: text });
                }
                out.push(Reading { surface: token.surface, reading: normalize_reading(&reading) });
            }
        }
    }
    if !literal.is_empty() {
        out.push(Reading { reading: normalize_reading(&literal), surface: literal });
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
