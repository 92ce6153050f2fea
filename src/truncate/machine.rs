//! Truncation State Machine
//!
//! Consumes SAX events one at a time and builds a length-bounded output that
//! is well-formed whenever it stops growing.
//!
//! ## Budget
//!
//! ```text
//! remaining = max_length - (estimated_length + tail_length if truncated)
//! ```
//!
//! Truncation is flagged before the clip size is computed, so a counted
//! tail is already reserved by the check that first clips text.
//! Dropping an element that does not fit also flags truncation, so with a
//! counted tail its length stays reserved even if no later text is clipped
//! and the tail is never written.
//!
//! The closing tag of every emitted element is paid for when the element
//! is opened, so end tags (and the closing pass at end of document) never
//! need room of their own. Elements whose tags do not fit start an ignore
//! region that swallows their whole subtree.

use super::budget::{clip_encoded, clip_verbatim, LengthBudget};
use super::options::TruncateOptions;
use crate::core::attributes::Attribute;
use crate::core::entities::encode_text;
use crate::core::markup::{
    cdata_tag, closing_tag, comment_tag, is_ignorable_tag, is_void_tag, opening_tag,
};
use crate::sax::SaxEvent;
use std::borrow::Cow;
use tracing::debug;

/// Flags describing how a run ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TruncationState {
    /// Set once the budget is used up; never cleared
    pub max_length_reached: bool,
    /// Set the first time text is clipped or content is dropped for lack of room
    pub something_has_been_truncated: bool,
    /// Truncation happened while a `table` element was open
    pub truncated_at_table: bool,
}

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedOutput {
    pub text: String,
    pub truncated: bool,
    pub truncated_at_table: bool,
}

/// Per-run truncation state
pub struct TruncatedDocument<'o> {
    options: &'o TruncateOptions,
    budget: LengthBudget,
    output: String,
    /// Length charged so far, in the budget's unit
    estimated_length: usize,
    /// Names of emitted, still-open elements (never void)
    open_tags: Vec<String>,
    /// Depth of nested elements being suppressed
    ignored_levels: usize,
    state: TruncationState,
}

impl<'o> TruncatedDocument<'o> {
    pub fn new(options: &'o TruncateOptions) -> Self {
        TruncatedDocument {
            options,
            budget: LengthBudget::new(options),
            output: String::with_capacity(options.max_length.min(4096) + options.tail.len()),
            estimated_length: 0,
            open_tags: Vec::with_capacity(16),
            ignored_levels: 0,
            state: TruncationState::default(),
        }
    }

    /// Current flags
    pub fn state(&self) -> TruncationState {
        self.state
    }

    /// Output produced so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Feed one event
    pub fn process(&mut self, event: SaxEvent<'_>) {
        match event {
            SaxEvent::StartElement { name, attributes } => self.start_element(&name, &attributes),
            SaxEvent::Text {
                content, verbatim, ..
            } => self.characters(&content, verbatim),
            SaxEvent::Comment(body) => self.append_atomic(&comment_tag(body)),
            SaxEvent::CData(body) => self.append_atomic(&cdata_tag(body)),
            SaxEvent::EndElement { name } => self.end_element(&name),
            SaxEvent::EndDocument => self.end_document(),
        }
    }

    /// Consume the machine. Callers are expected to have fed `EndDocument`.
    pub fn finish(self) -> TruncatedOutput {
        TruncatedOutput {
            text: self.output,
            truncated: self.state.something_has_been_truncated,
            truncated_at_table: self.state.truncated_at_table,
        }
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) {
        if self.ignore_mode() {
            self.enter_ignored_level();
            return;
        }

        if self.options.is_filtered_tag(name) {
            self.enter_ignored_level();
            return;
        }

        if self.state.max_length_reached || is_ignorable_tag(name) {
            return;
        }

        let tag = opening_tag(name, attributes, &self.options.filtered_attributes);
        let void = is_void_tag(name);
        let length_of_tags = self.tag_length(name, &tag, void);

        let remaining = self.remaining_length();
        if length_of_tags as i64 > remaining {
            debug!(
                tag = name,
                length_of_tags, remaining, "Element does not fit, ignoring subtree"
            );
            self.state.something_has_been_truncated = true;
            self.enter_ignored_level();
            return;
        }

        if !void {
            self.open_tags.push(name.to_string());
        }
        self.append(&tag, length_of_tags);
    }

    fn characters(&mut self, decoded: &str, verbatim: bool) {
        if self.state.max_length_reached || self.ignore_mode() {
            if self.state.max_length_reached {
                self.state.something_has_been_truncated = true;
            }
            return;
        }

        // Measure the encoded form so `&gt;` costs 4, not 1
        let encoded = if verbatim {
            Cow::Borrowed(decoded)
        } else {
            encode_text(decoded)
        };
        let length = self.budget.measure(&encoded);
        if length as i64 <= self.remaining_length() {
            self.append(&encoded, length);
            return;
        }

        let first_clip = !self.state.something_has_been_truncated;
        self.state.something_has_been_truncated = true;

        // The tail now counts against what is left
        let remaining = self.remaining_length();
        if remaining < 0 {
            self.state.max_length_reached = true;
            return;
        }

        let clipped = if verbatim {
            clip_verbatim(decoded, remaining as usize, self.budget.unit)
        } else {
            clip_encoded(decoded, remaining as usize, self.budget.unit)
        };
        if first_clip {
            debug!(
                remaining,
                kept = clipped.len(),
                dropped = encoded.len() - clipped.len(),
                "Clipping text"
            );
        }

        let length = self.budget.measure(&clipped);
        self.output.push_str(&clipped);
        self.output.push_str(&self.options.tail);
        self.increase_estimated_length(length);
        self.state.max_length_reached = true;
    }

    /// Comments and CDATA are written whole or not at all
    fn append_atomic(&mut self, rendered: &str) {
        if self.state.max_length_reached || self.ignore_mode() {
            return;
        }

        let length = self.budget.measure(rendered);
        if length as i64 <= self.remaining_length() {
            self.append(rendered, length);
        }
    }

    fn end_element(&mut self, name: &str) {
        if self.ignore_mode() {
            self.exit_ignored_level();
            return;
        }

        if self.state.max_length_reached || is_ignorable_tag(name) || is_void_tag(name) {
            return;
        }

        // Already paid for when the element was opened
        if let Some(open) = self.open_tags.pop() {
            self.output.push_str(&closing_tag(&open));
        }
    }

    fn end_document(&mut self) {
        self.state.truncated_at_table = self.state.something_has_been_truncated
            && self.open_tags.iter().any(|name| name == "table");

        while let Some(name) = self.open_tags.pop() {
            self.output.push_str(&closing_tag(&name));
        }
    }

    /// Cost of an opening tag plus its eventual closing tag
    fn tag_length(&self, name: &str, rendered: &str, void: bool) -> usize {
        if !self.budget.count_tags {
            return 0;
        }

        let mut length = self.budget.measure(rendered);
        if !void {
            length += self.budget.measure(&closing_tag(name));
        }
        length
    }

    #[inline]
    fn remaining_length(&self) -> i64 {
        self.budget
            .remaining(self.estimated_length, self.state.something_has_been_truncated)
    }

    fn append(&mut self, text: &str, length: usize) {
        self.output.push_str(text);
        self.increase_estimated_length(length);
    }

    fn increase_estimated_length(&mut self, amount: usize) {
        self.estimated_length += amount;
        let used = self
            .budget
            .used_with_tail(self.estimated_length, self.state.something_has_been_truncated);
        if used >= self.budget.max_length {
            self.state.max_length_reached = true;
        }
    }

    #[inline]
    fn ignore_mode(&self) -> bool {
        self.ignored_levels > 0
    }

    fn enter_ignored_level(&mut self) {
        self.ignored_levels += 1;
    }

    fn exit_ignored_level(&mut self) {
        self.ignored_levels = self.ignored_levels.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::EventSource;

    fn run(source: &str, options: &TruncateOptions) -> TruncatedOutput {
        let mut document = TruncatedDocument::new(options);
        for event in EventSource::new(source, options.fragment) {
            document.process(event);
        }
        document.finish()
    }

    fn with_max(max_length: usize) -> TruncateOptions {
        TruncateOptions::default().with_max_length(max_length)
    }

    #[test]
    fn test_fits_entirely() {
        let result = run("<p>Hello</p>", &with_max(30));
        assert_eq!(result.text, "<p>Hello</p>");
        assert!(!result.truncated);
        assert!(!result.truncated_at_table);
    }

    #[test]
    fn test_clips_text_and_appends_tail() {
        let result = run("<p>Hello world</p>", &with_max(8));
        assert_eq!(result.text, "<p>H...</p>");
        assert!(result.truncated);
    }

    #[test]
    fn test_counted_tail_reserves_room() {
        let options = TruncateOptions {
            count_tail: true,
            ..with_max(12)
        };
        // Tags cost 7, tail 3, leaving 2 characters of text
        let result = run("<p>Hello world</p>", &options);
        assert_eq!(result.text, "<p>He...</p>");
    }

    #[test]
    fn test_tail_that_cannot_fit_adds_nothing() {
        let options = TruncateOptions {
            count_tail: true,
            ..with_max(8)
        };
        let result = run("<p>Hello world</p>", &options);
        assert_eq!(result.text, "<p></p>");
        assert!(result.truncated);
    }

    #[test]
    fn test_tags_not_counted() {
        let options = TruncateOptions {
            count_tags: false,
            ..with_max(5)
        };
        let result = run("<div><p>Hello world</p></div>", &options);
        assert_eq!(result.text, "<div><p>Hello...</p></div>");
    }

    #[test]
    fn test_entities_are_atomic() {
        // "<p></p>" costs 7, "a" 1, "&amp;" 5
        let result = run("<p>a&amp;b</p>", &with_max(12));
        assert_eq!(result.text, "<p>a...</p>");
        let result = run("<p>a&amp;b</p>", &with_max(13));
        assert_eq!(result.text, "<p>a&amp;...</p>");
    }

    #[test]
    fn test_element_too_large_is_ignored_with_subtree() {
        let result = run("<p>Hi</p><div class='long'><b>x</b></div><i>y</i>", &with_max(15));
        // The div subtree is ignored; the remaining room is too small for <i>
        assert_eq!(result.text, "<p>Hi</p>");
        assert!(result.truncated);
    }

    #[test]
    fn test_void_element_too_large() {
        let result = run("<img src='x'/>", &with_max(3));
        assert_eq!(result.text, "");
        assert!(result.truncated);
    }

    #[test]
    fn test_void_elements_are_never_closed() {
        let result = run("<p>a<br>b</p>", &with_max(30));
        assert_eq!(result.text, "<p>a<br/>b</p>");
        assert!(!result.text.contains("</br>"));
    }

    #[test]
    fn test_wrappers_are_invisible() {
        let result = run(
            "<html><head></head><body><p>x</p></body></html>",
            &TruncateOptions {
                fragment: false,
                ..with_max(30)
            },
        );
        assert_eq!(result.text, "<p>x</p>");
    }

    #[test]
    fn test_filtered_attributes() {
        let options = TruncateOptions {
            filtered_attributes: vec!["style".to_string()],
            ..with_max(100)
        };
        let result = run("<p style='color: red' id='a'>x</p>", &options);
        assert_eq!(result.text, "<p id='a'>x</p>");
    }

    #[test]
    fn test_filtered_tags_drop_subtree() {
        let options = TruncateOptions {
            filtered_tags: vec!["script".to_string()],
            ..with_max(100)
        };
        let result = run("<p>a<script>alert(1)</script>b</p>", &options);
        assert_eq!(result.text, "<p>ab</p>");
        assert!(!result.truncated);
    }

    #[test]
    fn test_comments_are_atomic() {
        let result = run("<!--abc-->x", &with_max(20));
        assert_eq!(result.text, "<!--abc-->x");
        let result = run("<!--abcdefghijklmnop-->x", &with_max(10));
        assert_eq!(result.text, "x");
    }

    #[test]
    fn test_cdata_is_wrapped() {
        let result = run("<![CDATA[a<b]]>", &with_max(30));
        assert_eq!(result.text, "<![CDATA[a<b]]>");
    }

    #[test]
    fn test_closing_pass_closes_everything() {
        let result = run("<div><ul><li>one two three four five</li></ul></div>", &with_max(30));
        assert!(result.text.ends_with("...</li></ul></div>"));
        assert!(result.truncated);
    }

    #[test]
    fn test_truncated_at_table() {
        let source = "<table><tr><td>aaaa</td><td>bbbb</td></tr><tr><td>cccc</td></tr></table>";
        let result = run(source, &with_max(50));
        assert!(result.truncated);
        assert!(result.truncated_at_table);

        let result = run(source, &with_max(500));
        assert!(!result.truncated_at_table);
    }

    #[test]
    fn test_script_body_is_written_as_is() {
        let source = "<script>if (a < b && c) x();</script>";
        let result = run(source, &with_max(100));
        assert_eq!(result.text, source);
        assert!(!result.truncated);

        let again = run(&result.text, &with_max(100));
        assert_eq!(again.text, source);
    }

    #[test]
    fn test_script_body_clipped_without_encoding() {
        // 17 units of tags leave 3 for the body
        let result = run("<script>a < b</script>", &with_max(20));
        assert_eq!(result.text, "<script>a <...</script>");
        assert!(result.truncated);
    }

    #[test]
    fn test_dropped_element_reserves_unwritten_tail() {
        let options = TruncateOptions {
            count_tail: true,
            ..with_max(20)
        };
        let result = run("<b>ab</b><div class='xxxxxxx'>c</div>d", &options);
        assert_eq!(result.text, "<b>ab</b>d");
        assert!(result.truncated);
    }

    #[test]
    fn test_byte_mode() {
        let options = TruncateOptions {
            count_tail: false,
            ..TruncateOptions::bytesize().with_max_length(9)
        };
        // "<p></p>" is 7 bytes; "日" is 3 bytes, so no text fits
        let result = run("<p>日本</p>", &options);
        assert_eq!(result.text, "<p>...</p>");

        let options = TruncateOptions {
            count_tail: false,
            ..TruncateOptions::bytesize().with_max_length(10)
        };
        let result = run("<p>日本</p>", &options);
        assert_eq!(result.text, "<p>日...</p>");
    }

    #[test]
    fn test_single_entity_tail_counts_as_one() {
        let options = TruncateOptions {
            count_tail: true,
            ..with_max(9).with_tail("&hellip;")
        };
        let result = run("<p>Hello</p>", &options);
        assert_eq!(result.text, "<p>H&hellip;</p>");
    }

    #[test]
    fn test_nothing_written_after_max_length() {
        let options = TruncateOptions {
            fragment: false,
            ..with_max(4)
        };
        let mut document = TruncatedDocument::new(&options);
        document.process(SaxEvent::Text {
            content: Cow::Borrowed("abcd"),
            raw: "abcd",
            verbatim: false,
        });
        assert!(document.state().max_length_reached);
        assert!(!document.state().something_has_been_truncated);

        document.process(SaxEvent::Comment("x"));
        document.process(SaxEvent::StartElement {
            name: Cow::Borrowed("b"),
            attributes: Vec::new(),
        });
        assert_eq!(document.output(), "abcd");

        document.process(SaxEvent::Text {
            content: Cow::Borrowed("more"),
            raw: "more",
            verbatim: false,
        });
        assert!(document.state().something_has_been_truncated);
        document.process(SaxEvent::EndElement {
            name: Cow::Borrowed("b"),
        });
        document.process(SaxEvent::EndDocument);
        assert_eq!(document.finish().text, "abcd");
    }
}
