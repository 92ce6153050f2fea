//! Source Encoding Detection and Conversion
//!
//! Markup arriving as raw bytes may be UTF-8 (with or without BOM) or
//! UTF-16. Everything downstream works on `&str`, so sources are converted
//! here once, borrowing whenever the input is already plain UTF-8.

use crate::error::TruncateError;
use std::borrow::Cow;

/// Detected encoding of a source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl SourceEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return SourceEncoding::Utf8;
        }

        match (input[0], input[1]) {
            // UTF-16 LE BOM: 0xFF 0xFE
            (0xFF, 0xFE) => SourceEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            (0xFE, 0xFF) => SourceEncoding::Utf16Be,
            // No BOM - '<' paired with a null byte is UTF-16 markup
            (0x00, b'<') => SourceEncoding::Utf16Be,
            (b'<', 0x00) => SourceEncoding::Utf16Le,
            _ => SourceEncoding::Utf8,
        }
    }
}

/// Convert source bytes to text
///
/// Strips a UTF-8 BOM, transcodes UTF-16 LE/BE, and rejects invalid input.
pub fn decode_source(input: &[u8]) -> Result<Cow<'_, str>, TruncateError> {
    match SourceEncoding::detect(input) {
        SourceEncoding::Utf8 => {
            let bytes = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            std::str::from_utf8(bytes)
                .map(Cow::Borrowed)
                .map_err(|e| TruncateError::InvalidEncoding(format!("invalid UTF-8: {}", e)))
        }
        SourceEncoding::Utf16Le => {
            utf16_to_string(input, &[0xFF, 0xFE], u16::from_le_bytes, "LE").map(Cow::Owned)
        }
        SourceEncoding::Utf16Be => {
            utf16_to_string(input, &[0xFE, 0xFF], u16::from_be_bytes, "BE").map(Cow::Owned)
        }
    }
}

fn utf16_to_string(
    input: &[u8],
    bom: &[u8],
    unit: fn([u8; 2]) -> u16,
    order: &str,
) -> Result<String, TruncateError> {
    let bytes = input.strip_prefix(bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(TruncateError::InvalidEncoding(format!(
            "invalid UTF-16 {}: odd number of bytes",
            order
        )));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map_err(|e| TruncateError::InvalidEncoding(format!("invalid UTF-16 {}: {}", order, e)))
}
