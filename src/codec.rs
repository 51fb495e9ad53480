//! Text codec used for dictionary keys and raw input.
//!
//! Dictionaries are keyed by characters in the legacy encoding they were
//! built with (EUC-JP for the stock dictionary), so every dictionary query
//! encodes one character at a time.  Input decoding is tolerant: malformed
//! byte sequences are dropped and decoding continues after them.

use encoding_rs::{DecoderResult, Encoding};

/// Failure to select a codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),
}

/// A WHATWG encoding selected by label (`"euc-jp"`, `"shift_jis"`, `"utf-8"`…).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextCodec {
    encoding: &'static Encoding,
}

impl Default for TextCodec {
    fn default() -> Self {
        Self { encoding: encoding_rs::EUC_JP }
    }
}

impl TextCodec {
    pub fn utf8() -> Self {
        Self { encoding: encoding_rs::UTF_8 }
    }

    pub fn euc_jp() -> Self {
        Self { encoding: encoding_rs::EUC_JP }
    }

    /// Look up an encoding by its WHATWG label.
    pub fn for_label(label: &str) -> Result<Self, CodecError> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| CodecError::UnknownEncoding(label.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encode a single character, or `None` if the encoding cannot represent it.
    pub fn encode_char(&self, c: char) -> Option<Vec<u8>> {
        let mut buf = [0u8; 4];
        self.encode_str(c.encode_utf8(&mut buf))
    }

    /// Encode a whole string, or `None` if any character is unrepresentable.
    pub fn encode_str(&self, s: &str) -> Option<Vec<u8>> {
        let (bytes, _, had_errors) = self.encoding.encode(s);
        (!had_errors).then(|| bytes.into_owned())
    }

    /// Decode `bytes`, dropping malformed sequences.
    ///
    /// Returns the decoded text and the number of malformed sequences dropped.
    pub fn decode_lossy(&self, bytes: &[u8]) -> (String, usize) {
        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let mut out = String::new();
        let mut src = bytes;
        let mut dropped = 0;
        loop {
            let need = decoder
                .max_utf8_buffer_length_without_replacement(src.len())
                .unwrap_or(src.len() * 3 + 16);
            out.reserve(need);
            let (result, read) = decoder.decode_to_string_without_replacement(src, &mut out, true);
            src = &src[read..];
            match result {
                DecoderResult::InputEmpty => break,
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => dropped += 1,
            }
        }
        (out, dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_label() {
        assert_eq!(TextCodec::for_label("EUC-JP").unwrap(), TextCodec::euc_jp());
        assert_eq!(TextCodec::for_label(" utf8 ").unwrap(), TextCodec::utf8());
        let err = TextCodec::for_label("klingon").unwrap_err();
        assert!(matches!(&err, CodecError::UnknownEncoding(l) if l == "klingon"), "got {err}");
        assert_eq!(err.to_string(), "unknown text encoding: klingon");
    }

    #[test]
    fn test_encode_char_euc_jp() {
        let codec = TextCodec::euc_jp();
        assert_eq!(codec.encode_char('あ').unwrap(), vec![0xA4, 0xA2]);
        assert_eq!(codec.encode_char('a').unwrap(), b"a".to_vec());
        // not representable in EUC-JP
        assert!(codec.encode_char('😀').is_none());
    }

    #[test]
    fn test_decode_lossy_drops_malformed() {
        let codec = TextCodec::utf8();
        let mut bytes = "あい".as_bytes().to_vec();
        bytes.insert(3, 0xFF);
        let (text, dropped) = codec.decode_lossy(&bytes);
        assert_eq!(text, "あい");
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_decode_euc_jp() {
        let (text, dropped) = TextCodec::euc_jp().decode_lossy(&[0xA4, 0xA2, b'x']);
        assert_eq!(text, "あx");
        assert_eq!(dropped, 0);
    }
}
