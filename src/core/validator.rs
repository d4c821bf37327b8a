//! Strict encoding validation for a single file.
//!
//! Reads the file once, decodes it under one encoding without replacement, and
//! describes the first failure with its offset and a window of the raw bytes
//! around it. Nothing is printed here; see [`super::report`] for rendering.

use serde::{Serialize, Serializer};
use std::path::Path;

use crate::error::Result;
use crate::utils::encoding::{self, Charset};

/// Bytes kept on each side of the failure offset.
pub const CONTEXT_RADIUS: usize = 20;

/// First decoding failure in a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeFailure {
    pub offset: usize,
    pub context_start: usize,
    #[serde(rename = "context_hex", serialize_with = "serialize_hex")]
    pub context: Vec<u8>,
}

impl DecodeFailure {
    /// Capture the window `[offset - 20, offset + 20)` of `buffer`, clipped to
    /// its bounds.
    pub fn new(buffer: &[u8], offset: usize) -> Self {
        let offset = offset.min(buffer.len());
        let start = offset.saturating_sub(CONTEXT_RADIUS);
        let end = offset.saturating_add(CONTEXT_RADIUS).min(buffer.len());
        Self {
            offset,
            context_start: start,
            context: buffer[start..end].to_vec(),
        }
    }

    pub fn context_end(&self) -> usize {
        self.context_start + self.context.len()
    }

    /// Lowercase hex of the context window, two digits per byte.
    pub fn context_hex(&self) -> String {
        hex::encode(&self.context)
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Outcome of validating one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validation {
    Valid,
    Invalid(DecodeFailure),
    IoFailure { message: String },
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn failure(&self) -> Option<&DecodeFailure> {
        match self {
            Validation::Invalid(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Validates files against one fixed encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingValidator {
    charset: Charset,
}

impl EncodingValidator {
    pub fn new(charset: Charset) -> Self {
        Self { charset }
    }

    /// Build a validator from a label like "utf-8" or "shift_jis".
    pub fn for_label(label: &str) -> Result<Self> {
        encoding::resolve_label(label).map(Self::new)
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Check an in-memory buffer.
    pub fn check_bytes(&self, buffer: &[u8]) -> Validation {
        match self.charset.first_invalid_offset(buffer) {
            None => Validation::Valid,
            Some(offset) => {
                tracing::debug!(offset, encoding = self.charset.name(), "decode failed");
                Validation::Invalid(DecodeFailure::new(buffer, offset))
            }
        }
    }

    /// Read `path` and check its contents. Open and read errors become
    /// [`Validation::IoFailure`].
    pub fn validate(&self, path: impl AsRef<Path>) -> Validation {
        let path = path.as_ref();
        let buffer = match encoding::read_file_bytes(path) {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read file");
                return Validation::IoFailure { message: e.to_string() };
            }
        };
        tracing::debug!(
            path = %path.display(),
            bytes = buffer.len(),
            encoding = self.charset.name(),
            "read file"
        );
        self.check_bytes(&buffer)
    }
}

/// Validate `path` under the encoding named by `label`.
///
/// Only an unknown label is an error; every other outcome is a [`Validation`].
pub fn validate(path: impl AsRef<Path>, label: &str) -> Result<Validation> {
    Ok(EncodingValidator::for_label(label)?.validate(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;
    use proptest::prelude::*;
    use std::io::Write;

    fn temp_file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_hello_is_valid() {
        let file = temp_file_with(b"hello");
        assert_eq!(validate(file.path(), "utf-8").unwrap(), Validation::Valid);
    }

    #[test]
    fn test_fffe_is_invalid_at_zero() {
        let file = temp_file_with(b"\xff\xfe");
        let result = EncodingValidator::default().validate(file.path());
        let failure = result.failure().unwrap();
        assert_eq!(failure.offset, 0);
        assert_eq!(failure.context_start, 0);
        assert_eq!(failure.context_hex(), "fffe");
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        match EncodingValidator::default().validate("/nonexistent/file.txt") {
            Validation::IoFailure { message } => assert!(message.contains("No such file")),
            other => panic!("expected IoFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = EncodingValidator::default().validate(dir.path());
        assert!(matches!(result, Validation::IoFailure { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_io_failure() {
        use std::os::unix::fs::PermissionsExt;

        let file = temp_file_with(b"hello");
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores mode bits
        if std::fs::File::open(file.path()).is_ok() {
            return;
        }
        match EncodingValidator::default().validate(file.path()) {
            Validation::IoFailure { message } => assert!(message.contains("Permission denied")),
            other => panic!("expected IoFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_label_is_error() {
        let file = temp_file_with(b"hello");
        assert!(validate(file.path(), "no-such-encoding").is_err());
    }

    #[test]
    fn test_ascii_label_rejects_high_bytes() {
        let validator = EncodingValidator::for_label("ascii").unwrap();
        assert_eq!(validator.charset(), Charset::Ascii);
        let failure = validator.check_bytes(b"caf\xe9").failure().cloned().unwrap();
        assert_eq!(failure.offset, 3);
        assert_eq!(failure.context_hex(), "636166e9");
        assert!(validator.check_bytes(b"cafe").is_valid());
    }

    #[test]
    fn test_replacement_label_is_error() {
        assert!(EncodingValidator::for_label("iso-2022-kr").is_err());
        let file = temp_file_with(b"hello");
        assert!(validate(file.path(), "hz-gb-2312").is_err());
    }

    #[test]
    fn test_context_window_in_middle() {
        let mut data = vec![b'a'; 100];
        data[50] = 0xFF;
        let failure = EncodingValidator::default().check_bytes(&data).failure().cloned().unwrap();
        assert_eq!(failure.offset, 50);
        assert_eq!(failure.context_start, 30);
        assert_eq!(failure.context_end(), 70);
        assert_eq!(failure.context.len(), 40);
        assert_eq!(failure.context[20], 0xFF);
    }

    #[test]
    fn test_context_window_clipped_at_start() {
        let mut data = vec![b'a'; 30];
        data[2] = 0xFF;
        let failure = EncodingValidator::default().check_bytes(&data).failure().cloned().unwrap();
        assert_eq!(failure.offset, 2);
        assert_eq!(failure.context_start, 0);
        assert_eq!(failure.context_end(), 22);
    }

    #[test]
    fn test_context_window_clipped_at_end() {
        let mut data = vec![b'a'; 30];
        data[27] = 0xFF;
        let failure = EncodingValidator::default().check_bytes(&data).failure().cloned().unwrap();
        assert_eq!(failure.context_start, 7);
        assert_eq!(failure.context_end(), 30);
    }

    #[test]
    fn test_shift_jis_file() {
        let (bytes, _, unmappable) = SHIFT_JIS.encode("ログ出力テスト");
        assert!(!unmappable);
        let file = temp_file_with(&bytes);
        assert!(validate(file.path(), "shift_jis").unwrap().is_valid());
        // the same bytes are not UTF-8
        assert!(!validate(file.path(), "utf-8").unwrap().is_valid());
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(Validation::Invalid(DecodeFailure::new(b"\xff\xfe", 0))).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["offset"], 0);
        assert_eq!(json["context_hex"], "fffe");

        let json = serde_json::to_value(Validation::Valid).unwrap();
        assert_eq!(json["status"], "valid");
    }

    proptest! {
        #[test]
        fn prop_context_window_invariant(
            data in proptest::collection::vec(any::<u8>(), 1..200),
            pick in any::<prop::sample::Index>(),
        ) {
            let offset = pick.index(data.len());
            let failure = DecodeFailure::new(&data, offset);
            prop_assert!(failure.context_start <= failure.offset);
            prop_assert!(failure.offset <= failure.context_end());
            prop_assert!(failure.context_end() <= data.len());
            prop_assert!(failure.context.len() <= 2 * CONTEXT_RADIUS);
            prop_assert_eq!(failure.context_start, offset.saturating_sub(CONTEXT_RADIUS));
            prop_assert_eq!(&failure.context[..], &data[failure.context_start..failure.context_end()]);
        }

        #[test]
        fn prop_valid_text_is_valid(text in "\\PC{0,200}") {
            prop_assert!(EncodingValidator::default().check_bytes(text.as_bytes()).is_valid());
        }
    }
}
