//! Sample output: sinks and the crossfading splicer.
//!
//! Audio travels as normalized `f32` samples in [-1, 1].  A [`SampleSink`]
//! receives them in blocks; the [`Splicer`] joins consecutive phone
//! waveforms, overlapping each pair by its recorded crossfade length.

use std::{
    f64::consts::PI,
    fs::File,
    io::{BufWriter, Seek, Write},
    path::Path,
};

use anyhow::{Context, Result};
use tracing::warn;

/// Default output frame rate.
pub const SAMPLE_RATE: u32 = 44_100;

// ─────────────────────────────────────────────────────────────────────────────
// Sinks
// ─────────────────────────────────────────────────────────────────────────────

/// Destination for synthesized audio.
pub trait SampleSink {
    /// Append a block of normalized samples.
    fn write(&mut self, frames: &[f32]) -> Result<()>;

    /// Total frames written so far.
    fn frames_written(&self) -> u64;

    /// Flush and finalize (for WAV: rewrite the header with the true length).
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Convert f32 [-1.0, 1.0] → i16 [-32768, 32767].
fn to_i16(s: f32) -> i16 {
    (s * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Collects samples in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<f32>,
}

impl SampleSink for MemorySink {
    fn write(&mut self, frames: &[f32]) -> Result<()> {
        self.samples.extend_from_slice(frames);
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.samples.len() as u64
    }
}

/// 16-bit mono PCM WAV writer.
///
/// The RIFF header is written up front with a placeholder length and
/// rewritten with the real frame count by [`SampleSink::finish`].
pub struct WavSink<W: Write + Seek> {
    writer: Option<hound::WavWriter<W>>,
    frames: u64,
}

impl WavSink<BufWriter<File>> {
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let writer = hound::WavWriter::create(path, wav_spec(sample_rate))
            .with_context(|| format!("Cannot create WAV: {}", path.display()))?;
        Ok(Self { writer: Some(writer), frames: 0 })
    }
}

impl<W: Write + Seek> WavSink<W> {
    pub fn new(inner: W, sample_rate: u32) -> Result<Self> {
        let writer =
            hound::WavWriter::new(inner, wav_spec(sample_rate)).context("Cannot start WAV stream")?;
        Ok(Self { writer: Some(writer), frames: 0 })
    }
}

fn wav_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

impl<W: Write + Seek> SampleSink for WavSink<W> {
    fn write(&mut self, frames: &[f32]) -> Result<()> {
        let writer = self.writer.as_mut().context("WAV sink already finished")?;
        for &s in frames {
            writer.write_sample(to_i16(s)).context("WAV write error")?;
        }
        self.frames += frames.len() as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("WAV finalise error")?;
        }
        Ok(())
    }
}

/// Headerless signed 16-bit little-endian stream, e.g. for `aplay -t raw`.
pub struct RawSink<W: Write> {
    inner: W,
    frames: u64,
}

impl<W: Write> RawSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, frames: 0 }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> SampleSink for RawSink<W> {
    fn write(&mut self, frames: &[f32]) -> Result<()> {
        let bytes: Vec<u8> = frames.iter().flat_map(|&s| to_i16(s).to_le_bytes()).collect();
        self.inner.write_all(&bytes).context("raw PCM write error")?;
        self.frames += frames.len() as u64;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.flush().context("raw PCM flush error")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Crossfade
// ─────────────────────────────────────────────────────────────────────────────

/// Raised-cosine weight of the incoming signal at `i` in a window of `len`.
pub fn fade_weight(i: usize, len: usize) -> f64 {
    (1.0 - (PI * i as f64 / len as f64).cos()) * 0.5
}

/// Blend the tail of one buffer into the head of the next.
///
/// Both windows must have the same length.
pub fn mix(tail: &[f32], head: &[f32]) -> Vec<f32> {
    assert_eq!(tail.len(), head.len(), "crossfade windows differ in length");
    let len = tail.len();
    tail.iter()
        .zip(head)
        .enumerate()
        .map(|(i, (&a, &b))| {
            let p = fade_weight(i, len);
            ((1.0 - p) * f64::from(a) + p * f64::from(b)) as f32
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Splicer
// ─────────────────────────────────────────────────────────────────────────────

/// Joins phone waveforms one at a time, holding back the previous buffer
/// until the overlap with the next one is known.
#[derive(Default)]
pub struct Splicer {
    prev: Option<Vec<f32>>,
    /// Samples at the head of `prev` already written as part of a crossfade.
    unread: usize,
}

impl Splicer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `next`, writing out the previous buffer overlapped by `overlap`
    /// samples.  Returns the overlap actually applied.
    pub fn push(&mut self, sink: &mut dyn SampleSink, next: Vec<f32>, overlap: i32) -> Result<usize> {
        let Some(prev) = self.prev.take() else {
            self.prev = Some(next);
            self.unread = 0;
            return Ok(0);
        };
        let room = prev.len() - self.unread;
        let mut w = usize::try_from(overlap).unwrap_or(0);
        if w > room || w > next.len() {
            let clamped = w.min(room).min(next.len());
            warn!(overlap, clamped, "crossfade longer than the buffers it joins");
            w = clamped;
        } else if overlap < 0 {
            warn!(overlap, "negative crossfade ignored");
        }
        let split = prev.len() - w;
        sink.write(&prev[self.unread..split])?;
        if w > 0 {
            sink.write(&mix(&prev[split..], &next[..w]))?;
        }
        self.prev = Some(next);
        self.unread = w;
        Ok(w)
    }

    /// Write whatever is left of the last buffer.
    pub fn flush(&mut self, sink: &mut dyn SampleSink) -> Result<()> {
        if let Some(prev) = self.prev.take() {
            sink.write(&prev[self.unread..])?;
        }
        self.unread = 0;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
