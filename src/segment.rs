//! Word-like chunking of raw Japanese text.
//!
//! Every character is classified ([`CharClass`]) and fed through a small
//! automaton.  Runs of one script become one chunk; hiragana following a
//! word is kept with it as its inflection or particle tail.  Kanji runs are
//! checked against the dictionary as they grow: once the dictionary stops
//! recognising the run and it is already [`MAX_CONT_KANJI`] ideographs long,
//! a boundary is forced.

use std::mem;

use tracing::debug;

use crate::{
    codec::TextCodec,
    dict::{Cursor, Dictionary, Step},
    unicode::{classify, CharClass},
};

/// Longest kanji run kept together without dictionary support.
pub const MAX_CONT_KANJI: usize = 2;

/// Hiragana prefixes that belong to the following kanji word (お願い).
const DEFERRED_PREFIXES: &[char] = &['お'];

/// Particles after which a chunk may close, with the hiragana that may
/// still follow them inside the same chunk.
const PARTICLE_CONTINUATIONS: &[(char, &str)] = &[
    ('を', ""),
    ('が', "っんらりるれろ"),
    ('は', ""),
    ('で', "あきさしすはもの"),
    ('に', "はも"),
    ('の', "をがはでにだも"),
];

fn particle_continuation(particle: char) -> Option<&'static str> {
    PARTICLE_CONTINUATIONS
        .iter()
        .find(|(p, _)| *p == particle)
        .map(|(_, cont)| *cont)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Main,
    Latin,
    Katakana,
    /// Kanji run: ideographs accumulated so far in this run.
    Kanji { run: usize },
    Digit,
    Bracket,
    /// Trailing hiragana.
    Tail,
    /// Just after a particle; decides whether the chunk continues.
    Tail2,
    /// Holding back a prefix until the next character is seen.
    TailPre(char),
    Other,
}

/// What the automaton did with the current character.
enum Next {
    /// Consumed; move to the next character.
    Advance,
    /// Not consumed; feed the same character again in the new state.
    Retry,
}

/// Splits text into chunks using a character-class automaton.
pub struct Segmenter<'d, D: ?Sized> {
    dict: &'d D,
    codec: TextCodec,
}

impl<'d, D: Dictionary + ?Sized> Segmenter<'d, D> {
    pub fn new(dict: &'d D, codec: TextCodec) -> Self {
        Self { dict, codec }
    }

    /// Split `text` into chunks, in input order.
    pub fn get_chunks(&self, text: &str) -> Vec<String> {
        let mut run = Run {
            cursor: Cursor::new(self.dict, self.codec),
            state: State::Main,
            chunk: String::new(),
            chunks: Vec::new(),
        };
        for c in text.chars() {
            let class = classify(c);
            while let Next::Retry = run.step(c, class) {}
        }
        run.finish()
    }
}

/// Per-call automaton state.
struct Run<'d, D: ?Sized> {
    cursor: Cursor<'d, D>,
    state: State,
    chunk: String,
    chunks: Vec<String>,
}

impl<'d, D: Dictionary + ?Sized> Run<'d, D> {
    fn flush(&mut self) {
        if !self.chunk.is_empty() {
            debug!(chunk = %self.chunk, "segment");
            self.chunks.push(mem::take(&mut self.chunk));
        }
    }

    fn enter_kanji(&mut self) {
        self.cursor.reset();
        self.state = State::Kanji { run: 0 };
    }

    fn step(&mut self, c: char, class: CharClass) -> Next {
        use CharClass as K;
        match self.state {
            State::Main => {
                match class {
                    K::Latin => self.state = State::Latin,
                    K::Hiragana => self.state = State::Tail,
                    K::Katakana => self.state = State::Katakana,
                    K::Kanji => self.enter_kanji(),
                    K::Digit => self.state = State::Digit,
                    K::OpenBracket => self.state = State::Bracket,
                    K::Other => self.state = State::Other,
                }
                Next::Retry
            }
            State::Other => {
                if class == K::Other {
                    self.chunk.push(c);
                    return Next::Advance;
                }
                self.flush();
                self.state = State::Main;
                Next::Retry
            }
            State::Tail => {
                if class != K::Hiragana {
                    self.state = State::Other;
                    return Next::Retry;
                }
                if DEFERRED_PREFIXES.contains(&c) {
                    self.state = State::TailPre(c);
                    return Next::Advance;
                }
                self.chunk.push(c);
                if particle_continuation(c).is_some() {
                    self.state = State::Tail2;
                }
                Next::Advance
            }
            State::Tail2 => {
                if class == K::Hiragana {
                    let continues = self
                        .chunk
                        .chars()
                        .last()
                        .and_then(particle_continuation)
                        .is_some_and(|cont| cont.contains(c));
                    if continues {
                        self.state = State::Tail;
                        return Next::Retry;
                    }
                }
                self.state = State::Other;
                Next::Retry
            }
            State::TailPre(prefix) => {
                if class == K::Kanji {
                    self.flush();
                    self.chunk.push(prefix);
                    self.enter_kanji();
                } else {
                    self.chunk.push(prefix);
                    self.state = State::Tail;
                }
                Next::Retry
            }
            State::Latin => {
                if matches!(class, K::Latin | K::Digit) {
                    self.chunk.push(c);
                    return Next::Advance;
                }
                self.state = State::Tail;
                Next::Retry
            }
            State::Katakana => {
                if class == K::Katakana {
                    self.chunk.push(c);
                    return Next::Advance;
                }
                self.state = State::Tail;
                Next::Retry
            }
            State::Kanji { run } => {
                if class != K::Kanji {
                    self.state = State::Tail;
                    return Next::Retry;
                }
                if self.cursor.advance(c) == Step::Rejected && run >= MAX_CONT_KANJI {
                    self.state = State::Other;
                    return Next::Retry;
                }
                self.chunk.push(c);
                self.state = State::Kanji { run: run + 1 };
                Next::Advance
            }
            State::Digit => {
                if class == K::Digit {
                    self.chunk.push(c);
                    return Next::Advance;
                }
                self.state = State::Main;
                Next::Retry
            }
            State::Bracket => {
                if class == K::OpenBracket {
                    self.chunk.push(c);
                    return Next::Advance;
                }
                self.state = State::Main;
                Next::Retry
            }
        }
    }

    fn finish(mut self) -> Vec<String> {
        if let State::TailPre(prefix) = self.state {
            self.chunk.push(prefix);
        }
        self.flush();
        self.chunks
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::TrieDictionary;
    use proptest::prelude::*;

    fn dict() -> TrieDictionary {
        TrieDictionary::from_entries(
            TextCodec::euc_jp(),
            [
                ("東京都", "とうきょうと"),
                ("願", "ねが"),
                ("図書館", "としょかん"),
            ],
        )
        .unwrap()
    }

    fn chunks(text: &str) -> Vec<String> {
        let d = dict();
        Segmenter::new(&d, TextCodec::euc_jp()).get_chunks(text)
    }

    #[test]
    fn test_script_runs() {
        assert_eq!(chunks("カタカナとabc123"), vec!["カタカナと", "abc123"]);
        assert_eq!(chunks("「テスト"), vec!["「テスト"]);
    }

    #[test]
    fn test_unknown_kanji_pair_forces_boundary() {
        // neither pair is in the dictionary: cut after two ideographs
        assert_eq!(chunks("山川海は"), vec!["山川", "海は"]);
    }

    #[test]
    fn test_dictionary_word_keeps_running() {
        assert_eq!(chunks("図書館で"), vec!["図書館で"]);
        assert_eq!(chunks("東京都の"), vec!["東京都の"]);
    }

    #[test]
    fn test_particle_closes_chunk() {
        // は accepts no continuation, so the next hiragana starts a new chunk
        // via the unclassified path
        assert_eq!(chunks("山はあお"), vec!["山は", "あお"]);
        // で may be followed by も
        assert_eq!(chunks("山でも"), vec!["山でも"]);
    }

    #[test]
    fn test_deferred_prefix_before_kanji() {
        assert_eq!(chunks("これはお願い"), vec!["これは", "お願い"]);
        assert_eq!(chunks("ねおい"), vec!["ねおい"]);
    }

    #[test]
    fn test_deferred_prefix_at_end_is_kept() {
        assert_eq!(chunks("これお"), vec!["これお"]);
    }

    #[test]
    fn test_counter_unit_stays_with_its_number() {
        assert_eq!(chunks("3月に"), vec!["3月に"]);
        assert_eq!(chunks("12年"), vec!["12年"]);
        assert_eq!(chunks("3.5"), vec!["3.5"]);
    }

    #[test]
    fn test_digit_and_bracket_runs() {
        assert_eq!(chunks("3月に山川は「3.5」"), vec!["3月に", "山川は", "「3.5」"]);
        // a bracket falls back to Main without closing the chunk
        assert_eq!(chunks("（カナ"), vec!["（カナ"]);
    }

    #[test]
    fn test_unclassified_text_is_preserved() {
        assert_eq!(chunks("山。川"), vec!["山。", "川"]);
        assert_eq!(chunks("。、 "), vec!["。、 "]);
    }

    #[test]
    fn test_calls_are_independent() {
        let d = dict();
        let seg = Segmenter::new(&d, TextCodec::euc_jp());
        let first = seg.get_chunks("山川海は");
        seg.get_chunks("お");
        assert_eq!(seg.get_chunks("山川海は"), first);
    }

    proptest! {
        #[test]
        fn prop_chunks_concatenate_to_input(
            s in "[a-zA-Z0-9.あいうおはがでにのをアイウー山川東京都図書館「（。、 !?]{0,40}"
        ) {
            let out = chunks(&s);
            prop_assert_eq!(out.concat(), s);
            prop_assert!(out.iter().all(|c| !c.is_empty()));
        }
    }
}
