//! Length accounting
//!
//! Everything the state machine needs to measure text in the active unit
//! and decide how much room is left.

use super::options::TruncateOptions;
use crate::core::entities::{is_single_named_reference, push_encoded_char};

/// Unit in which lengths are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountUnit {
    /// Unicode scalar values
    #[default]
    Chars,
    /// UTF-8 bytes
    Bytes,
}

impl CountUnit {
    #[inline]
    pub fn measure(self, text: &str) -> usize {
        match self {
            CountUnit::Chars => text.chars().count(),
            CountUnit::Bytes => text.len(),
        }
    }
}

/// Immutable budget for one truncation run
#[derive(Debug, Clone)]
pub struct LengthBudget {
    pub max_length: usize,
    pub unit: CountUnit,
    pub count_tags: bool,
    pub count_tail: bool,
    tail_length: usize,
}

impl LengthBudget {
    pub fn new(options: &TruncateOptions) -> Self {
        let unit = if options.count_bytes {
            CountUnit::Bytes
        } else {
            CountUnit::Chars
        };

        LengthBudget {
            max_length: options.max_length,
            unit,
            count_tags: options.count_tags,
            count_tail: options.count_tail,
            tail_length: tail_length(&options.tail, unit),
        }
    }

    #[inline]
    pub fn measure(&self, text: &str) -> usize {
        self.unit.measure(text)
    }

    pub fn tail_length(&self) -> usize {
        self.tail_length
    }

    /// Length used so far, including the tail once truncation has begun
    #[inline]
    pub fn used_with_tail(&self, estimated: usize, truncated: bool) -> usize {
        if truncated && self.count_tail {
            estimated + self.tail_length
        } else {
            estimated
        }
    }

    /// Room left in the budget; negative when the tail alone overshoots it
    #[inline]
    pub fn remaining(&self, estimated: usize, truncated: bool) -> i64 {
        self.max_length as i64 - self.used_with_tail(estimated, truncated) as i64
    }
}

/// Length charged for the tail marker. A lone named reference such as
/// `&hellip;` renders as one glyph and counts as 1.
pub fn tail_length(tail: &str, unit: CountUnit) -> usize {
    if is_single_named_reference(tail) {
        1
    } else {
        unit.measure(tail)
    }
}

/// Encode the longest prefix of `raw` whose encoded form fits in `remaining`
///
/// Works one character at a time, so neither a multi-byte character nor an
/// entity reference is ever split.
pub fn clip_encoded(raw: &str, remaining: usize, unit: CountUnit) -> String {
    clip_with(raw, remaining, unit, push_encoded_char)
}

/// Longest prefix of `text`, written as is, that fits in `remaining` units
pub fn clip_verbatim(text: &str, remaining: usize, unit: CountUnit) -> String {
    clip_with(text, remaining, unit, |c, out| out.push(c))
}

fn clip_with(
    raw: &str,
    remaining: usize,
    unit: CountUnit,
    write: impl Fn(char, &mut String),
) -> String {
    let mut clipped = String::with_capacity(remaining.min(raw.len()));
    let mut used = 0;
    let mut piece = String::with_capacity(8);

    for c in raw.chars() {
        piece.clear();
        write(c, &mut piece);

        let cost = unit.measure(&piece);
        if used + cost > remaining {
            break;
        }
        used += cost;
        clipped.push_str(&piece);
    }

    clipped
}
