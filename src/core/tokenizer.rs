//! Markup Tokenizer - State machine for HTML/XML token extraction
//!
//! Implements a lenient pull-parser style tokenizer that extracts:
//! - Element start/end tags
//! - Text content
//! - CDATA sections
//! - Comments
//! - Declarations (DOCTYPE, XML declaration, processing instructions)
//!
//! The tokenizer never fails. Anything that cannot be read as markup is
//! handed out as text, and unterminated constructs run to end of input.

use super::scanner::{is_name_start_char, Scanner};

/// Elements whose content is raw text up to the matching end tag
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between tags
    InsideText,
    /// Inside the body of a raw text element (script, style)
    InsideRawText,
    /// End of input reached
    Done,
}

/// Type of markup token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Self-closing tag: <element/>
    EmptyTag,
    /// Text content (entities still encoded)
    Text,
    /// Raw text content of script/style (never entity-decoded)
    RawText,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// DOCTYPE, XML declaration, processing instruction or bogus markup
    Declaration,
    /// End of file
    Eof,
}

/// A markup token borrowing from the input
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags: the element name as written
    pub name: Option<&'a str>,
    /// For text/cdata/comments: the content; for start tags: the raw attribute list
    pub content: Option<&'a str>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: &'a str) -> Self {
        self.content = Some(content);
        self
    }
}

/// Lenient markup tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    state: ParseState,
    /// Name of the raw text element we are inside, if any
    raw_text_end: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            state: ParseState::InsideText,
            raw_text_end: None,
        }
    }

    /// Get the current parse state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Get the current position in the input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Get the next token. Yields `Eof` once, then None.
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.state == ParseState::Done {
            return None;
        }

        if self.scanner.is_eof() {
            self.state = ParseState::Done;
            let end = self.scanner.len();
            return Some(Token::new(TokenKind::Eof, (end, end)));
        }

        if self.state == ParseState::InsideRawText {
            return Some(self.parse_raw_text());
        }

        if self.scanner.peek() == Some(b'<') {
            if let Some(token) = self.parse_markup() {
                return Some(token);
            }
        }
        Some(self.parse_text())
    }

    /// Parse markup starting with '<'. Returns None (without consuming) when
    /// the '<' cannot start markup and must be read as text.
    fn parse_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();

        let token = match self.scanner.peek_at(1)? {
            b'/' => self.parse_end_tag(start),
            b'!' => Some(self.parse_bang_markup(start)),
            b'?' => Some(self.parse_declaration(start, 2)),
            b if is_name_start_char(b) => self.parse_start_tag(start),
            _ => None,
        };

        if token.is_none() {
            self.scanner.set_position(start);
        }
        token
    }

    /// Parse a start tag or self-closing tag
    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '<'
        let name = self.scanner.read_name()?;
        let attrs_start = self.scanner.position();

        // An unterminated tag is read as text
        let end = self.scanner.find_tag_end_quoted()?;

        let is_empty = end > attrs_start && self.scanner.byte_at(end - 1) == Some(b'/');
        let attrs_end = if is_empty { end - 1 } else { end };
        let attributes = self.scanner.slice(attrs_start, attrs_end);

        self.scanner.set_position(end + 1);

        let kind = if is_empty {
            TokenKind::EmptyTag
        } else {
            if let Some(raw) = RAW_TEXT_ELEMENTS
                .iter()
                .copied()
                .find(|raw| raw.eq_ignore_ascii_case(name))
            {
                self.raw_text_end = Some(raw);
                self.state = ParseState::InsideRawText;
            }
            TokenKind::StartTag
        };

        Some(
            Token::new(kind, (start, end + 1))
                .with_name(name)
                .with_content(attributes),
        )
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(2); // Skip '</'

        let name = match self.scanner.read_name() {
            Some(name) => name,
            // `</ ...>` and friends are bogus comments in HTML
            None => return Some(self.parse_declaration(start, 2)),
        };

        let end = self.scanner.find_byte(b'>')?;
        self.scanner.set_position(end + 1);

        Some(Token::new(TokenKind::EndTag, (start, end + 1)).with_name(name))
    }

    /// Parse markup starting with '<!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Token<'a> {
        self.scanner.advance(2); // Skip '<!'

        if self.scanner.starts_with(b"--") {
            self.scanner.advance(2);
            self.parse_delimited(start, TokenKind::Comment, b"-->")
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.scanner.advance(7);
            self.parse_delimited(start, TokenKind::CData, b"]]>")
        } else {
            self.parse_declaration(start, 2)
        }
    }

    /// Parse content up to a terminator; unterminated content runs to end of input
    fn parse_delimited(&mut self, start: usize, kind: TokenKind, terminator: &[u8]) -> Token<'a> {
        let content_start = self.scanner.position();
        let (content_end, end) = match self.scanner.find_sequence(terminator) {
            Some(pos) => (pos, pos + terminator.len()),
            None => (self.scanner.len(), self.scanner.len()),
        };

        self.scanner.set_position(end);
        Token::new(kind, (start, end)).with_content(self.scanner.slice(content_start, content_end))
    }

    /// Parse a declaration up to the next '>' (DOCTYPE, <?xml ...?>, PIs)
    fn parse_declaration(&mut self, start: usize, skip: usize) -> Token<'a> {
        self.scanner.set_position(start + skip);
        let end = self
            .scanner
            .find_byte(b'>')
            .map(|pos| pos + 1)
            .unwrap_or_else(|| self.scanner.len());

        self.scanner.set_position(end);
        Token::new(TokenKind::Declaration, (start, end))
    }

    /// Parse text content up to the next '<' that starts markup
    fn parse_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        let mut from = start + 1;

        let end = loop {
            match self.scanner.find_tag_start_from(from) {
                Some(lt) if self.starts_markup(lt) => break lt,
                Some(lt) => from = lt + 1,
                None => break self.scanner.len(),
            }
        };

        self.scanner.set_position(end);
        Token::new(TokenKind::Text, (start, end)).with_content(self.scanner.slice(start, end))
    }

    /// Parse the body of a raw text element up to its end tag
    fn parse_raw_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        let end = self
            .raw_text_end
            .and_then(|name| self.scanner.find_end_tag_ignore_case(name))
            .unwrap_or_else(|| self.scanner.len());

        self.raw_text_end = None;
        self.state = ParseState::InsideText;
        self.scanner.set_position(end);
        Token::new(TokenKind::RawText, (start, end)).with_content(self.scanner.slice(start, end))
    }

    /// Whether the '<' at `pos` opens markup rather than being literal text
    fn starts_markup(&self, pos: usize) -> bool {
        let next = self.scanner.slice(pos, self.scanner.len()).as_bytes().get(1).copied();
        matches!(next, Some(b'/' | b'!' | b'?')) || next.is_some_and(is_name_start_char)
    }
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
