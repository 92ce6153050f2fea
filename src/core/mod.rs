//! Core markup primitives
//!
//! This module contains the fundamental building blocks for reading and
//! writing markup:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Lenient state machine for HTML/XML token extraction
//! - Entities: Entity encode/decode with Cow (zero-copy when possible)
//! - Attributes: Attribute list parsing
//! - Encoding: BOM / UTF-16 detection and conversion to UTF-8
//! - Markup: Tag rendering and void / ignorable tag tables

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod markup;
pub mod scanner;
pub mod tokenizer;
