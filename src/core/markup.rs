//! Markup rendering and tag classification
//!
//! Shared by the truncation state machine (which must measure tags before
//! writing them) and the row completer (which serializes a repaired tree in
//! exactly the same form).

use super::attributes::Attribute;
use super::entities::encode_attribute;

/// Name of the synthetic root that wraps fragments
pub const ARTIFICIAL_ROOT: &str = "__truncato_root__";

/// Structural wrappers that never appear in the output
pub const IGNORABLE_TAGS: &[&str] = &["html", "head", "body", ARTIFICIAL_ROOT];

/// Elements without content or closing tag
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

#[inline]
pub fn is_void_tag(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

#[inline]
pub fn is_ignorable_tag(name: &str) -> bool {
    IGNORABLE_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Render an opening tag, skipping attributes named in `filtered`
///
/// Void elements are rendered self-closed (`<br/>`); attribute values are
/// entity-escaped and single-quoted.
pub fn opening_tag(name: &str, attributes: &[Attribute<'_>], filtered: &[String]) -> String {
    let mut tag = String::with_capacity(name.len() + 2 + attributes.len() * 16);
    tag.push('<');
    tag.push_str(name);

    for attr in attributes
        .iter()
        .filter(|attr| !filtered.iter().any(|f| f.as_str() == attr.name))
    {
        tag.push(' ');
        tag.push_str(&attr.name);
        tag.push_str("='");
        tag.push_str(&encode_attribute(&attr.value));
        tag.push('\'');
    }

    if is_void_tag(name) {
        tag.push_str("/>");
    } else {
        tag.push('>');
    }
    tag
}

pub fn closing_tag(name: &str) -> String {
    format!("</{}>", name)
}

pub fn comment_tag(body: &str) -> String {
    format!("<!--{}-->", body)
}

pub fn cdata_tag(body: &str) -> String {
    format!("<![CDATA[{}]]>", body)
}
