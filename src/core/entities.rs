//! HTML Entity Codec
//!
//! Handles both directions of entity processing:
//! - Decoding: built-in XML entities, numeric character references
//!   (`&#123;` `&#x7B;`) and a table of common HTML named entities
//! - Encoding: named-entity escaping of text and attribute values
//!
//! Uses Cow for zero-copy when nothing needs to change.

use memchr::memchr;
use std::borrow::Cow;

/// Longest entity body we look at before giving up on a '&'
const MAX_ENTITY_LEN: usize = 32;

/// Named entities known to the codec, in both directions.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("iexcl", '\u{00A1}'),
    ("cent", '\u{00A2}'),
    ("pound", '\u{00A3}'),
    ("yen", '\u{00A5}'),
    ("sect", '\u{00A7}'),
    ("copy", '\u{00A9}'),
    ("laquo", '\u{00AB}'),
    ("reg", '\u{00AE}'),
    ("deg", '\u{00B0}'),
    ("plusmn", '\u{00B1}'),
    ("sup2", '\u{00B2}'),
    ("sup3", '\u{00B3}'),
    ("micro", '\u{00B5}'),
    ("para", '\u{00B6}'),
    ("middot", '\u{00B7}'),
    ("sup1", '\u{00B9}'),
    ("raquo", '\u{00BB}'),
    ("frac14", '\u{00BC}'),
    ("frac12", '\u{00BD}'),
    ("frac34", '\u{00BE}'),
    ("iquest", '\u{00BF}'),
    ("Agrave", '\u{00C0}'),
    ("Aacute", '\u{00C1}'),
    ("Acirc", '\u{00C2}'),
    ("Atilde", '\u{00C3}'),
    ("Auml", '\u{00C4}'),
    ("Aring", '\u{00C5}'),
    ("AElig", '\u{00C6}'),
    ("Ccedil", '\u{00C7}'),
    ("Egrave", '\u{00C8}'),
    ("Eacute", '\u{00C9}'),
    ("Ecirc", '\u{00CA}'),
    ("Euml", '\u{00CB}'),
    ("Iacute", '\u{00CD}'),
    ("Ntilde", '\u{00D1}'),
    ("Oacute", '\u{00D3}'),
    ("Ouml", '\u{00D6}'),
    ("times", '\u{00D7}'),
    ("Oslash", '\u{00D8}'),
    ("Uacute", '\u{00DA}'),
    ("Uuml", '\u{00DC}'),
    ("szlig", '\u{00DF}'),
    ("agrave", '\u{00E0}'),
    ("aacute", '\u{00E1}'),
    ("acirc", '\u{00E2}'),
    ("atilde", '\u{00E3}'),
    ("auml", '\u{00E4}'),
    ("aring", '\u{00E5}'),
    ("aelig", '\u{00E6}'),
    ("ccedil", '\u{00E7}'),
    ("egrave", '\u{00E8}'),
    ("eacute", '\u{00E9}'),
    ("ecirc", '\u{00EA}'),
    ("euml", '\u{00EB}'),
    ("igrave", '\u{00EC}'),
    ("iacute", '\u{00ED}'),
    ("icirc", '\u{00EE}'),
    ("iuml", '\u{00EF}'),
    ("ntilde", '\u{00F1}'),
    ("ograve", '\u{00F2}'),
    ("oacute", '\u{00F3}'),
    ("ocirc", '\u{00F4}'),
    ("otilde", '\u{00F5}'),
    ("ouml", '\u{00F6}'),
    ("divide", '\u{00F7}'),
    ("oslash", '\u{00F8}'),
    ("ugrave", '\u{00F9}'),
    ("uacute", '\u{00FA}'),
    ("ucirc", '\u{00FB}'),
    ("uuml", '\u{00FC}'),
    ("yuml", '\u{00FF}'),
    ("alpha", '\u{03B1}'),
    ("beta", '\u{03B2}'),
    ("gamma", '\u{03B3}'),
    ("delta", '\u{03B4}'),
    ("pi", '\u{03C0}'),
    ("sigma", '\u{03C3}'),
    ("omega", '\u{03C9}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201C}'),
    ("rdquo", '\u{201D}'),
    ("bull", '\u{2022}'),
    ("hellip", '\u{2026}'),
    ("euro", '\u{20AC}'),
    ("trade", '\u{2122}'),
];

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
/// Unknown or malformed references are kept verbatim.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Decode all entity references in the input
fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_offset;
        result.push_str(&input[pos..amp]);

        match parse_reference(&input[amp..]) {
            Some((decoded, consumed)) => {
                result.push(decoded);
                pos = amp + consumed;
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }

    result.push_str(&input[pos..]);
    result
}

/// Parse a reference at the start of `input` (which begins with '&').
/// Returns the decoded character and the number of bytes consumed.
fn parse_reference(input: &str) -> Option<(char, usize)> {
    let window = &input.as_bytes()[1..input.len().min(MAX_ENTITY_LEN + 2)];
    let semi = memchr(b';', window)?;
    let body = &input[1..1 + semi];

    let decoded = match body.strip_prefix('#') {
        Some(numeric) => decode_numeric_entity(numeric)?,
        None => lookup_name(body)?,
    };
    Some((decoded, semi + 2))
}

/// Decode a numeric character reference body (after `&#`)
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };

    if codepoint == 0 {
        return None;
    }
    char::from_u32(codepoint)
}

fn lookup_name(name: &str) -> Option<char> {
    NAMED_ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|&(_, c)| c)
}

/// Entity name used to encode a character, if it has one
#[inline]
pub fn entity_name(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("amp"),
        '<' => Some("lt"),
        '>' => Some("gt"),
        '"' => Some("quot"),
        '\'' => Some("apos"),
        c if c.is_ascii() => None,
        c => NAMED_ENTITIES
            .iter()
            .find(|&&(_, named)| named == c)
            .map(|&(name, _)| name),
    }
}

/// Encode text for output, escaping to named entities
pub fn encode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    if !input.chars().any(|c| entity_name(c).is_some()) {
        return Cow::Borrowed(input);
    }

    // Slow path: escape
    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        push_encoded_char(c, &mut result);
    }
    Cow::Owned(result)
}

/// Append the encoded form of one character to `buf`
#[inline]
pub fn push_encoded_char(c: char, buf: &mut String) {
    match entity_name(c) {
        Some(name) => {
            buf.push('&');
            buf.push_str(name);
            buf.push(';');
        }
        None => buf.push(c),
    }
}

/// Encode text for use in attribute values
pub fn encode_attribute(input: &str) -> Cow<'_, str> {
    encode_text(input)
}

/// Whether `text` is exactly one named reference such as `&hellip;`
pub fn is_single_named_reference(text: &str) -> bool {
    text.len() > 2
        && text.starts_with('&')
        && text.ends_with(';')
        && text[1..text.len() - 1]
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_entities() {
        let result = decode_text("Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "Hello, World!");
    }

    #[test]
    fn test_basic_entities() {
        let result = decode_text("&lt;hello&gt; &amp; &quot;world&quot;");
        assert_eq!(result, "<hello> & \"world\"");
    }

    #[test]
    fn test_numeric_decimal() {
        assert_eq!(decode_text("&#65;&#66;&#67;"), "ABC");
    }

    #[test]
    fn test_numeric_hex() {
        assert_eq!(decode_text("&#x41;&#X42;&#x43;"), "ABC");
    }

    #[test]
    fn test_unicode_entity() {
        assert_eq!(decode_text("&#x1F600;"), "😀");
    }

    #[test]
    fn test_html_named_entities() {
        assert_eq!(decode_text("caf&eacute; &hellip;"), "café …");
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(decode_text("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_partial_entity_kept_verbatim() {
        assert_eq!(decode_text("fish &amp chips &#xZZ; &"), "fish &amp chips &#xZZ; &");
    }

    #[test]
    fn test_encode_text() {
        let result = encode_text("<hello> & \"world\" 'x'");
        assert_eq!(result, "&lt;hello&gt; &amp; &quot;world&quot; &apos;x&apos;");
    }

    #[test]
    fn test_encode_named_non_ascii() {
        assert_eq!(encode_text("café…"), "caf&eacute;&hellip;");
        assert_eq!(encode_text("日本"), "日本");
    }

    #[test]
    fn test_encode_is_zero_copy_when_clean() {
        assert!(matches!(encode_text("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_inverts_encode() {
        let text = "a < b && c > \"d\" … é";
        assert_eq!(decode_text(&encode_text(text)), text);
    }

    #[test]
    fn test_single_named_reference() {
        assert!(is_single_named_reference("&hellip;"));
        assert!(!is_single_named_reference("..."));
        assert!(!is_single_named_reference("&#8230;"));
        assert!(!is_single_named_reference("&hellip; more"));
        assert!(!is_single_named_reference("&;"));
    }
}
