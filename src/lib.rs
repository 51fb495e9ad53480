//! # kanasynth
//!
//! Rule-based Japanese text-to-speech: dictionary-assisted segmentation and
//! reading, mora tokenization, and concatenation of recorded diphones with
//! raised-cosine crossfades.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use kanasynth::{DiphoneArchive, SampleSink, SynthConfig, Synthesizer, TextCodec, TrieDictionary, WavSink};
//!
//! let dict = TrieDictionary::open(Path::new("yomi.tsv"), TextCodec::euc_jp()).unwrap();
//! let phones = DiphoneArchive::open(Path::new("diphone.zip")).unwrap();
//! let synth = Synthesizer::new(&dict, &phones, SynthConfig::default()).unwrap();
//!
//! let mut wav = WavSink::create(Path::new("out.wav"), synth.config().framerate).unwrap();
//! synth.synth(&mut wav, "今日は良い天気です。").unwrap();
//! wav.finish().unwrap();
//! ```
//!
//! Only the key stream, without audio:
//!
//! ```
//! use kanasynth::{SynthConfig, Synthesizer, TextCodec, TrieDictionary};
//! use std::collections::HashMap;
//!
//! let dict = TrieDictionary::from_entries(TextCodec::euc_jp(), [("今日", "きょう")]).unwrap();
//! let phones: HashMap<String, Vec<u8>> = HashMap::new();
//! let synth = Synthesizer::new(&dict, &phones, SynthConfig::default()).unwrap();
//! assert_eq!(synth.phone_keys("今日は"), ["_kyo", "o", "o_", "_wa", "a_"]);
//! ```
//!
//! ## Data files
//! | File            | Format                                                     |
//! |-----------------|------------------------------------------------------------|
//! | dictionary      | UTF-8 TSV, `surface<TAB>reading` (hiragana/katakana)       |
//! | diphone archive | ZIP; member `key[.pcm]` = i16 LE PCM, `k0+k1` = i32 LE fade |
//! | config          | JSON, see [`SynthConfig`]                                  |
//!
//! ## Pipeline
//! 1. **Segmentation** — character classes and dictionary prefixes → chunks.
//! 2. **Reading** — longest dictionary match, digits and counters, spellout
//!    of symbols → katakana readings (particle は/へ corrected).
//! 3. **Mora tokenization** — readings → mora labels via a static trie.
//! 4. **Phone keys** — adjacent morae → diphone keys, pauses for `。`/`、`.
//! 5. **Splicing** — recorded phones joined with crossfades → sink.

pub mod codec;
pub mod config;
pub mod dict;
pub mod mora;
pub mod phone;
pub mod segment;
pub mod store;
pub mod synth;
pub mod trie;
pub mod unicode;
pub mod wave;
pub mod yomi;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use codec::{CodecError, TextCodec};
pub use config::SynthConfig;
pub use dict::{DictError, Dictionary, TrieDictionary};
pub use store::{DiphoneArchive, PhoneStore};
pub use synth::Synthesizer;
pub use wave::{MemorySink, RawSink, SampleSink, WavSink, SAMPLE_RATE};
