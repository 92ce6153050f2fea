//! SAX Event Types
//!
//! Defines the events emitted by the event source and consumed by the
//! truncation state machine.

use crate::core::attributes::Attribute;
use std::borrow::Cow;

/// A SAX parsing event
///
/// Names are lowercased. Events borrow from the source text wherever the
/// source can be used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent<'a> {
    /// Start of an element
    StartElement {
        name: Cow<'a, str>,
        /// Attributes in source order, duplicates kept
        attributes: Vec<Attribute<'a>>,
    },

    /// Text content
    Text {
        /// Entity-decoded content
        content: Cow<'a, str>,
        /// The text exactly as it appeared in the source
        raw: &'a str,
        /// Script or style body: entities are not decoded and must not be
        /// encoded on output
        verbatim: bool,
    },

    /// Comment body (excluding markers)
    Comment(&'a str),

    /// CDATA section content (excluding markers)
    CData(&'a str),

    /// End of an element
    EndElement { name: Cow<'a, str> },

    /// End of the event stream. Always last, always exactly once.
    EndDocument,
}

impl SaxEvent<'_> {
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Get the element name if this is a start or end element
    pub fn element_name(&self) -> Option<&str> {
        match self {
            SaxEvent::StartElement { name, .. } | SaxEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}
