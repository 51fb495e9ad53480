//! Synthesis settings, optionally read from a JSON file.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! { "framerate": 22050, "long_pause": 0.6 }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    codec::{CodecError, TextCodec},
    wave::SAMPLE_RATE,
};

// ─────────────────────────────────────────────────────────────────────────────
// config.json schema
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthConfig {
    /// Output frame rate in Hz.
    pub framerate: u32,

    /// Seconds of silence for a comma.
    pub short_pause: f32,

    /// Seconds of silence for a period.
    pub long_pause: f32,

    /// Encoding label of the dictionary keys (e.g. `"euc-jp"`).
    pub dict_encoding: String,

    /// Encoding label of text read by the command-line tool.
    pub text_encoding: String,

    /// Multiplier from stored i16 PCM to float samples.
    pub sample_scale: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            framerate: SAMPLE_RATE,
            short_pause: 0.15,
            long_pause: 0.40,
            dict_encoding: "euc-jp".into(),
            text_encoding: "utf-8".into(),
            sample_scale: 1.0 / 32768.0,
        }
    }
}

impl SynthConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn dict_codec(&self) -> Result<TextCodec, CodecError> {
        TextCodec::for_label(&self.dict_encoding)
    }

    pub fn text_codec(&self) -> Result<TextCodec, CodecError> {
        TextCodec::for_label(&self.text_encoding)
    }

    /// Silence length in frames for a pause of `seconds`.
    pub fn pause_frames(&self, seconds: f32) -> usize {
        (seconds.max(0.0) * self.framerate as f32).round() as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = SynthConfig::default();
        assert_eq!(c.framerate, 44_100);
        assert_eq!(c.pause_frames(c.long_pause), 17_640);
        assert_eq!(c.pause_frames(c.short_pause), 6_615);
        assert_eq!(c.dict_codec().unwrap(), TextCodec::euc_jp());
        assert_eq!(c.text_codec().unwrap(), TextCodec::utf8());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "framerate": 8000, "long_pause": 1.0 }}"#).unwrap();
        let c = SynthConfig::from_json_file(f.path()).unwrap();
        assert_eq!(c.framerate, 8000);
        assert_eq!(c.pause_frames(c.long_pause), 8000);
        assert_eq!(c.short_pause, 0.15);
        assert_eq!(c.dict_encoding, "euc-jp");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "voice": "Jasper" }}"#).unwrap();
        assert!(SynthConfig::from_json_file(f.path()).is_err());
    }

    #[test]
    fn test_bad_encoding_label() {
        let c = SynthConfig { dict_encoding: "klingon".into(), ..Default::default() };
        assert!(matches!(c.dict_codec(), Err(CodecError::UnknownEncoding(l)) if l == "klingon"));
    }
}
