//! SAX (Simple API for XML) Module
//!
//! Turns markup text into a balanced stream of structural events.
//!
//! ## Architecture
//!
//! ```text
//! Tokenizer ---> EventSource ---> SaxEvent ---> TruncatedDocument
//!                    |
//!                    v
//!          open-element stack (balancing)
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - Element opening tag with name and attributes
//! - `EndElement` - Element closing tag
//! - `Text` - Character data (decoded, plus the raw source slice)
//! - `CData` - CDATA section content
//! - `Comment` - Comment content
//! - `EndDocument` - Terminal event
//!
//! The source guarantees that every `StartElement` is matched by exactly
//! one `EndElement`, whatever the input looked like. Consumers rely on this
//! to keep their own stacks in sync.

pub mod events;
pub mod source;

pub use events::SaxEvent;
pub use source::EventSource;
