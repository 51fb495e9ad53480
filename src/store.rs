//! Diphone waveform store.
//!
//! The store is a read-only key → bytes map holding two kinds of record:
//!
//! | key           | value                                        |
//! |---------------|----------------------------------------------|
//! | `ka`, `a_`, … | little-endian i16 PCM for that phone key     |
//! | `k0+k1`       | little-endian i32 crossfade length (samples) |
//!
//! A missing waveform means "skip this phone"; a missing crossfade means
//! "concatenate without overlap".
//!
//! [`DiphoneArchive`] reads the records from a ZIP archive whose member
//! names are the keys (an optional `.pcm` suffix is stripped).

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    io::{Read, Seek},
    path::Path,
};
use tracing::info;
use zip::ZipArchive;

/// Separator between the two phone keys of a crossfade record.
pub const PAIR_SEPARATOR: char = '+';

/// Read-only access to waveform and crossfade records.
pub trait PhoneStore {
    fn get(&self, key: &str) -> Option<&[u8]>;

    /// PCM samples for `key`, scaled by `scale` (1/32768 for full range).
    fn samples(&self, key: &str, scale: f32) -> Option<Vec<f32>> {
        self.get(key).map(|raw| decode_pcm16(raw, scale))
    }

    /// Crossfade length between `k0` and `k1`, or 0 if none is recorded.
    fn crossfade(&self, k0: &str, k1: &str) -> i32 {
        let key = format!("{k0}{PAIR_SEPARATOR}{k1}");
        self.get(&key)
            .and_then(|raw| raw.get(..4))
            .map_or(0, |b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

impl PhoneStore for HashMap<String, Vec<u8>> {
    fn get(&self, key: &str) -> Option<&[u8]> {
        HashMap::get(self, key).map(Vec::as_slice)
    }
}

/// Decode little-endian i16 PCM; a trailing odd byte is ignored.
pub fn decode_pcm16(raw: &[u8], scale: f32) -> Vec<f32> {
    raw.chunks_exact(2)
        .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) * scale)
        .collect()
}

/// Encode samples already in i16 range as little-endian PCM.
pub fn encode_pcm16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// ZIP-backed archive
// ─────────────────────────────────────────────────────────────────────────────

/// All records of a diphone archive, held in memory.
#[derive(Default)]
pub struct DiphoneArchive {
    records: HashMap<String, Vec<u8>>,
}

impl DiphoneArchive {
    /// Open a ZIP diphone archive from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Cannot open diphone archive: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Cannot read diphone archive: {}", path.display()))
    }

    /// Read every member of a ZIP archive.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).context("Cannot open ZIP archive")?;
        let mut records = HashMap::with_capacity(archive.len());
        let mut crossfades = 0usize;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).context("Failed to read ZIP entry")?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name();
            let key = name.strip_suffix(".pcm").unwrap_or(name).to_string();

            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .with_context(|| format!("Failed to read record '{}'", key))?;

            if key.contains(PAIR_SEPARATOR) {
                crossfades += 1;
            }
            records.insert(key, buf);
        }

        info!(
            phones = records.len() - crossfades,
            crossfades, "diphone archive loaded"
        );
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, data: Vec<u8>) {
        self.records.insert(key.into(), data);
    }
}

impl PhoneStore for DiphoneArchive {
    fn get(&self, key: &str) -> Option<&[u8]> {
        self.records.get(key).map(Vec::as_slice)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
