//! Encoding utilities for strict decoding.
//!
//! Uses encoding_rs so any WHATWG label can be checked, not only UTF-8.

use encoding_rs::{DecoderResult, Encoding, REPLACEMENT, UTF_8};
use std::io::Read;
use std::path::Path;

use crate::error::{CheckError, Result};

/// Scratch output size for the non-UTF-8 decode loop.
const SCRATCH_LEN: usize = 4096;

/// WHATWG folds these labels into windows-1252, which accepts every byte.
const ASCII_LABELS: &[&str] = &["ascii", "us-ascii", "ansi_x3.4-1968"];

/// The character set a buffer is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// 7-bit ASCII; any byte >= 0x80 is invalid.
    Ascii,
    Whatwg(&'static Encoding),
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Ascii => "US-ASCII",
            Charset::Whatwg(encoding) => encoding.name(),
        }
    }

    pub fn first_invalid_offset(&self, data: &[u8]) -> Option<usize> {
        match *self {
            Charset::Ascii => {
                let valid = Encoding::ascii_valid_up_to(data);
                (valid < data.len()).then_some(valid)
            }
            Charset::Whatwg(encoding) => first_invalid_offset(encoding, data),
        }
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Whatwg(UTF_8)
    }
}

/// Resolve an encoding label such as "utf-8", "sjis" or "latin1".
///
/// Unknown labels are rejected rather than falling back to UTF-8, and so are
/// labels WHATWG maps to the `replacement` encoding, since that one fails on
/// any input.
pub fn resolve_label(label: &str) -> Result<Charset> {
    let normalized = label.trim().to_ascii_lowercase();
    if ASCII_LABELS.contains(&normalized.as_str()) {
        return Ok(Charset::Ascii);
    }
    match Encoding::for_label(normalized.as_bytes()) {
        Some(encoding) if encoding != REPLACEMENT => Ok(Charset::Whatwg(encoding)),
        _ => Err(CheckError::UnknownEncoding(label.to_string())),
    }
}

/// Byte index of the first sequence that cannot be decoded, or `None` if the
/// whole buffer decodes. No BOM sniffing, no replacement.
pub fn first_invalid_offset(encoding: &'static Encoding, data: &[u8]) -> Option<usize> {
    if encoding == UTF_8 {
        let valid = Encoding::utf8_valid_up_to(data);
        return (valid < data.len()).then_some(valid);
    }

    let mut decoder = encoding.new_decoder_without_bom_handling();
    let mut scratch = [0u8; SCRATCH_LEN];
    let mut consumed = 0;
    loop {
        let (result, read, _) =
            decoder.decode_to_utf8_without_replacement(&data[consumed..], &mut scratch, true);
        consumed += read;
        match result {
            DecoderResult::InputEmpty => return None,
            DecoderResult::OutputFull => continue,
            // `bad` bytes form the malformed sequence, `extra` were read past it.
            DecoderResult::Malformed(bad, extra) => {
                return Some(consumed.saturating_sub(bad as usize + extra as usize));
            }
        }
    }
}

/// Read a whole file as raw bytes. The handle is closed when this returns,
/// whether or not the read succeeded.
pub fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = std::fs::File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}
