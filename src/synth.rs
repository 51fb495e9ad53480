//! Text → audio driver.
//!
//! [`Synthesizer`] ties the pipeline together: chunking, reading derivation,
//! mora tokenization, phone-key derivation and crossfaded splicing of the
//! recorded phones.

use anyhow::Result;
use tracing::{debug, debug_span};

use crate::{
    codec::{CodecError, TextCodec},
    config::SynthConfig,
    dict::Dictionary,
    phone::{self, pause_of, Pause},
    segment::Segmenter,
    store::PhoneStore,
    wave::{MemorySink, SampleSink, Splicer},
    yomi::{Reading, ReadingDeriver},
};

/// Concatenative synthesizer over a dictionary and a diphone store.
///
/// Holds only shared references and settings; each call keeps its own
/// state, so one instance can serve many utterances.
pub struct Synthesizer<'a, D: ?Sized, S: ?Sized> {
    segmenter: Segmenter<'a, D>,
    deriver: ReadingDeriver<'a, D>,
    store: &'a S,
    config: SynthConfig,
}

impl<'a, D: Dictionary + ?Sized, S: PhoneStore + ?Sized> Synthesizer<'a, D, S> {
    /// Build a synthesizer, taking the dictionary codec from `config`.
    pub fn new(dict: &'a D, store: &'a S, config: SynthConfig) -> Result<Self, CodecError> {
        let codec = config.dict_codec()?;
        Ok(Self::with_codec(dict, codec, store, config))
    }

    pub fn with_codec(dict: &'a D, codec: TextCodec, store: &'a S, config: SynthConfig) -> Self {
        Self {
            segmenter: Segmenter::new(dict, codec),
            deriver: ReadingDeriver::new(dict, codec),
            store,
            config,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn chunks(&self, text: &str) -> Vec<String> {
        self.segmenter.get_chunks(text)
    }

    /// Reading units for `text`, chunk after chunk.
    pub fn readings(&self, text: &str) -> Vec<Reading> {
        self.chunks(text)
            .iter()
            .flat_map(|chunk| self.deriver.get_yomi(chunk))
            .collect()
    }

    /// Diphone keys for `text`, including pause keys.
    pub fn phone_keys(&self, text: &str) -> Vec<String> {
        let keys = phone::keys_for(&self.readings(text));
        debug!(?keys, "phones");
        keys
    }

    /// Samples for one key; pauses are silence of the configured length.
    fn waveform(&self, key: &str) -> Option<Vec<f32>> {
        match pause_of(key) {
            Some(Pause::Long) => Some(vec![0.0; self.config.pause_frames(self.config.long_pause)]),
            Some(Pause::Short) => Some(vec![0.0; self.config.pause_frames(self.config.short_pause)]),
            None => self.store.samples(key, self.config.sample_scale),
        }
    }

    /// Synthesize `text` into `sink`.
    ///
    /// Keys with no recorded waveform are skipped.  The sink is not
    /// finished, so several calls can write into one stream.
    pub fn synth(&self, sink: &mut dyn SampleSink, text: &str) -> Result<()> {
        let _span = debug_span!("synth", text).entered();

        let mut splicer = Splicer::new();
        let mut prev: Option<String> = None;
        for key in self.phone_keys(text) {
            let Some(wave) = self.waveform(&key) else {
                debug!(%key, "no waveform, skipped");
                continue;
            };
            let overlap = prev.as_deref().map_or(0, |k0| self.store.crossfade(k0, &key));
            splicer.push(sink, wave, overlap)?;
            prev = Some(key);
        }
        splicer.flush(sink)
    }

    /// Synthesize `text` into memory.
    pub fn render(&self, text: &str) -> Result<Vec<f32>> {
        let mut sink = MemorySink::default();
        self.synth(&mut sink, text)?;
        Ok(sink.samples)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dict::TrieDictionary, store::encode_pcm16, wave::WavSink};
    use std::collections::HashMap;

    fn dict() -> TrieDictionary {
        TrieDictionary::from_entries(
            TextCodec::euc_jp(),
            [("山", "やま"), ("川", "かわ"), ("海", "うみ"), ("今日", "きょう")],
        )
        .unwrap()
    }

    fn config() -> SynthConfig {
        SynthConfig { framerate: 1000, sample_scale: 1.0, ..Default::default() }
    }

    fn store(records: &[(&str, Vec<i16>)], fades: &[(&str, i32)]) -> HashMap<String, Vec<u8>> {
        let mut s: HashMap<String, Vec<u8>> =
            records.iter().map(|(k, v)| (k.to_string(), encode_pcm16(v))).collect();
        for (k, w) in fades {
            s.insert(k.to_string(), w.to_le_bytes().to_vec());
        }
        s
    }

    #[test]
    fn test_two_kanji_then_particle() {
        let d = dict();
        let s = store(&[], &[]);
        let synth = Synthesizer::new(&d, &s, config()).unwrap();

        // 山川 is not an entry and 谷 is unknown: the run is cut after two
        assert_eq!(synth.chunks("山川谷は"), vec!["山川", "谷は"]);
        let readings: Vec<_> =
            synth.readings("山川谷は").into_iter().map(|r| r.reading).collect();
        assert_eq!(readings, vec!["ヤマ", "カワ", "谷ワ"]);
        // 谷 has no mora and drops out of the key stream
        assert_eq!(
            synth.phone_keys("山川谷は"),
            vec!["_ya", "ama", "a_", "_ka", "awa", "a_", "_wa", "a_"]
        );
    }

    #[test]
    fn test_trailing_period_adds_long_pause() {
        let d = dict();
        let s = store(&[("_a", vec![100; 10]), ("a_", vec![50; 10])], &[]);
        let synth = Synthesizer::new(&d, &s, config()).unwrap();

        let keys = synth.phone_keys("ア．");
        assert_eq!(keys, vec!["_a", "a_", ".", "__"]);

        let out = synth.render("ア．").unwrap();
        // "__" has no recording and is skipped
        assert_eq!(out.len(), 10 + 10 + 400);
        assert!(out[20..].iter().all(|&x| x == 0.0), "tail must be silence");
        assert_eq!(out[0], 100.0);
        assert_eq!(out[19], 50.0);
    }

    #[test]
    fn test_registered_crossfade_shortens_output() {
        let d = dict();
        let s = store(
            &[("_wa", vec![1000; 300]), ("a_", vec![-1000; 200])],
            &[("_wa+a_", 100)],
        );
        let synth = Synthesizer::new(&d, &s, config()).unwrap();
        let out = synth.render("わ").unwrap();
        assert_eq!(out.len(), 300 + 200 - 100);
        assert_eq!(out[199], 1000.0);
        assert_eq!(out[200], 1000.0); // first sample of the window is all prev
        assert_eq!(out[399], -1000.0);
    }

    #[test]
    fn test_frame_count_identity() {
        let d = dict();
        let s = store(
            &[
                ("_kyo", vec![1; 120]),
                ("o", vec![2; 80]),
                ("o_", vec![3; 60]),
                ("_wa", vec![4; 90]),
                ("a_", vec![5; 70]),
            ],
            &[("_kyo+o", 30), ("o+o_", 20), ("_wa+a_", 10)],
        );
        let synth = Synthesizer::new(&d, &s, config()).unwrap();
        let out = synth.render("今日は").unwrap();
        let total = 120 + 80 + 60 + 90 + 70;
        assert_eq!(out.len(), total - 30 - 20 - 10);
    }

    #[test]
    fn test_missing_phones_are_skipped() {
        let d = dict();
        let s = store(&[], &[]);
        let synth = Synthesizer::new(&d, &s, config()).unwrap();
        assert!(synth.render("今日は").unwrap().is_empty());
    }

    #[test]
    fn test_wav_output() {
        let d = dict();
        let s = store(&[("_wa", vec![16384; 8]), ("a_", vec![0; 8])], &[]);
        let synth = Synthesizer::new(
            &d,
            &s,
            SynthConfig { framerate: 8000, ..Default::default() },
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let mut sink = WavSink::create(&path, synth.config().framerate).unwrap();
        synth.synth(&mut sink, "わ").unwrap();
        synth.synth(&mut sink, "わ").unwrap();
        sink.finish().unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.duration(), 32);
    }

    #[test]
    fn test_unknown_dict_encoding() {
        let d = dict();
        let s = store(&[], &[]);
        let bad = SynthConfig { dict_encoding: "nope".into(), ..config() };
        assert!(Synthesizer::new(&d, &s, bad).is_err());
    }

    #[test]
    fn test_number_and_counter_reading() {
        let d = dict();
        let s = store(&[], &[]);
        let synth = Synthesizer::new(&d, &s, config()).unwrap();
        let pairs = |text: &str| -> Vec<(String, String)> {
            synth.readings(text).into_iter().map(|r| (r.surface, r.reading)).collect()
        };

        assert_eq!(
            pairs("3月"),
            vec![("サン".to_string(), "サン".to_string()), ("月".to_string(), "ガツ".to_string())]
        );
        let units: Vec<String> =
            synth.readings("3月に山川は").into_iter().map(|r| r.reading).collect();
        assert_eq!(units, vec!["サン", "ガツ", "ニ", "ヤマ", "カワ", "ワ"]);
    }
}
