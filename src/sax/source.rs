//! Event Source
//!
//! Drives the tokenizer and repairs its output into a balanced event stream
//! the way an HTML parser would: void elements close themselves, implied end
//! tags are generated, stray end tags are dropped, and everything still open
//! at end of input is closed before `EndDocument`.

use super::events::SaxEvent;
use crate::core::attributes::{lowercase, parse_attributes};
use crate::core::entities::decode_text;
use crate::core::markup::{is_void_tag, ARTIFICIAL_ROOT};
use crate::core::tokenizer::{TokenKind, Tokenizer};
use std::borrow::Cow;
use std::collections::VecDeque;
use tracing::trace;

/// Start tags that close an open `p`
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Elements an implied `p` close never reaches past
const PARAGRAPH_SCOPE: &[&str] = &[
    "button", "caption", "dd", "div", "dt", "li", "table", "td", "th", "blockquote", "section",
    "article",
];

/// Balancing event producer over a markup string
pub struct EventSource<'a> {
    tokenizer: Tokenizer<'a>,
    /// Elements opened by this source and not yet closed
    open: Vec<Cow<'a, str>>,
    /// Events produced but not yet handed out
    pending: VecDeque<SaxEvent<'a>>,
    /// Wrap the stream in the synthetic root element
    wrap_root: bool,
    started: bool,
    finished: bool,
}

impl<'a> EventSource<'a> {
    /// Create an event source. A `fragment` source is wrapped in a synthetic
    /// root element so that text outside any element still has a parent.
    pub fn new(input: &'a str, fragment: bool) -> Self {
        EventSource {
            tokenizer: Tokenizer::new(input),
            open: Vec::with_capacity(32),
            pending: VecDeque::with_capacity(4),
            wrap_root: fragment,
            started: false,
            finished: false,
        }
    }

    /// Stack index below which end tags may not close anything
    #[inline]
    fn floor(&self) -> usize {
        usize::from(self.wrap_root)
    }

    /// Pull the next token and translate it into zero or more pending events
    fn fill(&mut self) {
        let Some(token) = self.tokenizer.next_token() else {
            self.finished = true;
            return;
        };

        match token.kind {
            TokenKind::StartTag | TokenKind::EmptyTag => {
                let Some(raw_name) = token.name else { return };
                let name = lowercase(raw_name);
                self.close_implied_by(&name);

                let attributes = parse_attributes(token.content.unwrap_or(""));
                self.pending.push_back(SaxEvent::StartElement {
                    name: name.clone(),
                    attributes,
                });

                if token.kind == TokenKind::EmptyTag || is_void_tag(&name) {
                    self.pending.push_back(SaxEvent::EndElement { name });
                } else {
                    self.open.push(name);
                }
            }
            TokenKind::EndTag => {
                let Some(raw_name) = token.name else { return };
                let name = lowercase(raw_name);

                // Void elements were closed when they were opened
                if is_void_tag(&name) {
                    return;
                }

                let floor = self.floor();
                match self.open[floor..].iter().rposition(|open| *open == name) {
                    Some(index) => self.close_to(floor + index),
                    None => trace!("Unmatched end tag: {}", name),
                }
            }
            TokenKind::Text => {
                if let Some(raw) = token.content.filter(|raw| !raw.is_empty()) {
                    self.pending.push_back(SaxEvent::Text {
                        content: decode_text(raw),
                        raw,
                        verbatim: false,
                    });
                }
            }
            TokenKind::RawText => {
                if let Some(raw) = token.content.filter(|raw| !raw.is_empty()) {
                    self.pending.push_back(SaxEvent::Text {
                        content: Cow::Borrowed(raw),
                        raw,
                        verbatim: true,
                    });
                }
            }
            TokenKind::Comment => {
                self.pending
                    .push_back(SaxEvent::Comment(token.content.unwrap_or("")));
            }
            TokenKind::CData => {
                self.pending
                    .push_back(SaxEvent::CData(token.content.unwrap_or("")));
            }
            TokenKind::Declaration => {}
            TokenKind::Eof => {
                self.close_to(0);
                self.pending.push_back(SaxEvent::EndDocument);
            }
        }
    }

    /// Generate the end tags implied by opening `name`
    fn close_implied_by(&mut self, name: &str) {
        match name {
            "li" => self.close_implied(&["li"], &["ul", "ol", "menu", "table"]),
            "dt" | "dd" => self.close_implied(&["dt", "dd"], &["dl", "table"]),
            "td" | "th" => self.close_implied(&["td", "th"], &["tr", "table"]),
            "tr" => self.close_implied(&["tr"], &["table", "thead", "tbody", "tfoot"]),
            "thead" | "tbody" | "tfoot" => {
                self.close_implied(&["thead", "tbody", "tfoot"], &["table"])
            }
            "option" => self.close_implied(&["option"], &["select", "datalist", "optgroup"]),
            _ => {}
        }

        if CLOSES_PARAGRAPH.contains(&name) {
            self.close_implied(&["p"], PARAGRAPH_SCOPE);
        }
    }

    /// Close the innermost open element named in `targets`, unless an
    /// element named in `scope` is found first
    fn close_implied(&mut self, targets: &[&str], scope: &[&str]) {
        let floor = self.floor();
        for index in (floor..self.open.len()).rev() {
            let open = &*self.open[index];
            if targets.contains(&open) {
                self.close_to(index);
                return;
            }
            if scope.contains(&open) {
                return;
            }
        }
    }

    /// Close every open element at or above `index`, innermost first
    fn close_to(&mut self, index: usize) {
        while self.open.len() > index {
            if let Some(name) = self.open.pop() {
                self.pending.push_back(SaxEvent::EndElement { name });
            }
        }
    }
}

impl<'a> Iterator for EventSource<'a> {
    type Item = SaxEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if self.wrap_root {
                self.open.push(Cow::Borrowed(ARTIFICIAL_ROOT));
                return Some(SaxEvent::StartElement {
                    name: Cow::Borrowed(ARTIFICIAL_ROOT),
                    attributes: Vec::new(),
                });
            }
        }

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            self.fill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Compact rendering of the event stream for assertions
    fn trace_events(input: &str, fragment: bool) -> Vec<String> {
        EventSource::new(input, fragment)
            .map(|event| match event {
                SaxEvent::StartElement { name, attributes } => {
                    if attributes.is_empty() {
                        format!("+{}", name)
                    } else {
                        let attrs: Vec<String> = attributes
                            .iter()
                            .map(|a| format!("{}={}", a.name, a.value))
                            .collect();
                        format!("+{}[{}]", name, attrs.join(","))
                    }
                }
                SaxEvent::EndElement { name } => format!("-{}", name),
                SaxEvent::Text { content, .. } => format!("'{}'", content),
                SaxEvent::Comment(body) => format!("#{}", body),
                SaxEvent::CData(body) => format!("!{}", body),
                SaxEvent::EndDocument => "$".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_simple_document() {
        assert_eq!(
            trace_events("<p>Hi</p>", false),
            vec!["+p", "'Hi'", "-p", "$"]
        );
    }

    #[test]
    fn test_fragment_is_wrapped() {
        assert_eq!(
            trace_events("a<b>c</b>", true),
            vec![
                "+__truncato_root__",
                "'a'",
                "+b",
                "'c'",
                "-b",
                "-__truncato_root__",
                "$"
            ]
        );
    }

    #[test]
    fn test_names_are_lowercased_and_text_decoded() {
        let events: Vec<_> = EventSource::new("<P CLASS='x'>a &amp; b</P>", false).collect();
        assert_eq!(events[0].element_name(), Some("p"));
        match &events[1] {
            SaxEvent::Text { content, raw, .. } => {
                assert_eq!(content, "a & b");
                assert_eq!(*raw, "a &amp; b");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(events[2].element_name(), Some("p"));
    }

    #[test]
    fn test_void_and_self_closing_tags() {
        assert_eq!(
            trace_events("<br><img src='a.png'/><span/></br>", false),
            vec!["+br", "-br", "+img[src=a.png]", "-img", "+span", "-span", "$"]
        );
    }

    #[test]
    fn test_stray_end_tag_is_dropped() {
        assert_eq!(
            trace_events("<p>a</b></p>", false),
            vec!["+p", "'a'", "-p", "$"]
        );
    }

    #[test]
    fn test_end_tag_closes_intervening_elements() {
        assert_eq!(
            trace_events("<div><b><i>x</div>", false),
            vec!["+div", "+b", "+i", "'x'", "-i", "-b", "-div", "$"]
        );
    }

    #[test]
    fn test_end_tags_never_close_the_root() {
        assert_eq!(
            trace_events("x</__truncato_root__>y", true),
            vec![
                "+__truncato_root__",
                "'x'",
                "'y'",
                "-__truncato_root__",
                "$"
            ]
        );
    }

    #[test]
    fn test_unclosed_elements_close_at_end() {
        assert_eq!(
            trace_events("<ul><li>a", false),
            vec!["+ul", "+li", "'a'", "-li", "-ul", "$"]
        );
    }

    #[test]
    fn test_implied_list_item_end() {
        assert_eq!(
            trace_events("<ul><li>a<li>b</ul>", false),
            vec!["+ul", "+li", "'a'", "-li", "+li", "'b'", "-li", "-ul", "$"]
        );
    }

    #[test]
    fn test_implied_table_ends() {
        assert_eq!(
            trace_events("<table><tr><td>1<td>2<tr><td>3</table>", false),
            vec![
                "+table", "+tr", "+td", "'1'", "-td", "+td", "'2'", "-td", "-tr", "+tr", "+td",
                "'3'", "-td", "-tr", "-table", "$"
            ]
        );
    }

    #[test]
    fn test_nested_list_item_is_not_closed() {
        assert_eq!(
            trace_events("<li>a<ul><li>b</ul></li>", false),
            vec!["+li", "'a'", "+ul", "+li", "'b'", "-li", "-ul", "-li", "$"]
        );
    }

    #[test]
    fn test_block_closes_paragraph() {
        assert_eq!(
            trace_events("<p>a<div>b</div>", false),
            vec!["+p", "'a'", "-p", "+div", "'b'", "-div", "$"]
        );
    }

    #[test]
    fn test_comments_cdata_and_declarations() {
        assert_eq!(
            trace_events("<!DOCTYPE html><!--c--><![CDATA[d]]>", false),
            vec!["#c", "!d", "$"]
        );
    }

    #[test]
    fn test_script_text_is_not_decoded() {
        let events: Vec<_> = EventSource::new("<script>a &amp;&amp; b</script>", false).collect();
        match &events[1] {
            SaxEvent::Text { content, .. } => assert_eq!(content, "a &amp;&amp; b"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(trace_events("", false), vec!["$"]);
        assert_eq!(
            trace_events("", true),
            vec!["+__truncato_root__", "-__truncato_root__", "$"]
        );
    }

    #[test]
    fn test_balanced_for_garbage() {
        for input in ["</a></b><c", "<a><b></a></b>", "<<<>>>", "<p><p><p>"] {
            let mut depth = 0i32;
            for event in EventSource::new(input, true) {
                match event {
                    SaxEvent::StartElement { .. } => depth += 1,
                    SaxEvent::EndElement { .. } => depth -= 1,
                    _ => {}
                }
                assert!(depth >= 0, "negative depth for {:?}", input);
            }
            assert_eq!(depth, 0, "unbalanced stream for {:?}", input);
        }
    }
}
