//! Attribute Parsing
//!
//! Parses the raw attribute list of a start tag into an ordered list of
//! name/value pairs. Duplicate names are kept, in source order.

use super::entities::decode_text;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, ASCII-lowercased
    pub name: Cow<'a, str>,
    /// Attribute value (entities decoded); empty for bare attributes
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute from a raw name and an already decoded value
    pub fn new(name: &'a str, value: Cow<'a, str>) -> Self {
        Attribute {
            name: lowercase(name),
            value,
        }
    }

    /// Convert into an attribute that owns its data
    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

/// ASCII-lowercase a name, borrowing when it is already lowercase
pub fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'.
/// Parsing is lenient: stray characters are skipped, unquoted and bare
/// (valueless) attributes are accepted.
pub fn parse_attributes(input: &str) -> Vec<Attribute<'_>> {
    let bytes = input.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        // Skip whitespace and stray slashes
        while pos < bytes.len() && (is_whitespace(bytes[pos]) || bytes[pos] == b'/') {
            pos += 1;
        }

        if pos >= bytes.len() {
            break;
        }

        // Parse attribute name
        let name_start = pos;
        while pos < bytes.len() && is_attribute_name_char(bytes[pos]) {
            pos += 1;
        }

        if pos == name_start {
            // No valid name character found
            pos += 1;
            continue;
        }

        let name = &input[name_start..pos];

        // Skip whitespace around '='
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() || bytes[pos] != b'=' {
            // Attribute without value (like HTML boolean attributes)
            attrs.push(Attribute::new(name, Cow::Borrowed("")));
            continue;
        }

        pos += 1; // Skip '='

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() {
            attrs.push(Attribute::new(name, Cow::Borrowed("")));
            break;
        }

        let quote = bytes[pos];
        let value = if quote == b'"' || quote == b'\'' {
            pos += 1; // Skip opening quote
            let value_start = pos;
            while pos < bytes.len() && bytes[pos] != quote {
                pos += 1;
            }
            let value = &input[value_start..pos];
            if pos < bytes.len() {
                pos += 1; // Skip closing quote
            }
            value
        } else {
            // Unquoted value
            let value_start = pos;
            while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                pos += 1;
            }
            &input[value_start..pos]
        };

        attrs.push(Attribute::new(name, decode_text(value)));
    }

    attrs
}

/// Check if byte is whitespace
#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

/// Anything but whitespace, quotes, '=', '/', '<' and '>' may appear in an HTML attribute name
#[inline]
fn is_attribute_name_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'"' | b'\'' | b'=' | b'/' | b'<' | b'>')
}
