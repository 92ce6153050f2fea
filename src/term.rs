//! Elixir Term Conversion Utilities
//!
//! Decodes truncation options and sources from Elixir terms and encodes
//! results back.

use crate::core::encoding::decode_source;
use crate::error::{TruncateError, TruncateResult};
use crate::truncate::{OptionOverrides, Truncation};
use rustler::types::map::MapIterator;
use rustler::{Binary, Decoder, Encoder, Env, Term};
use std::borrow::Cow;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
}

/// Decode an options keyword list or map
///
/// Keys may be atoms or strings. An empty list stands for all defaults.
pub fn decode_options(term: Term<'_>) -> TruncateResult<OptionOverrides> {
    let mut overrides = OptionOverrides::default();

    for (key, value) in option_pairs(term)? {
        let key = decode_name(key).ok_or_else(|| TruncateError::InvalidOption {
            key: "options".to_string(),
            expected: "atom or string keys",
        })?;

        match key.as_str() {
            "max_length" => {
                overrides.max_length = Some(decode_value(&key, value, "a positive integer")?)
            }
            "tail" => overrides.tail = Some(decode_value(&key, value, "a string")?),
            "count_tags" => overrides.count_tags = Some(decode_value(&key, value, "a boolean")?),
            "count_bytes" => overrides.count_bytes = Some(decode_value(&key, value, "a boolean")?),
            "count_tail" => overrides.count_tail = Some(decode_value(&key, value, "a boolean")?),
            "filtered_attributes" => {
                overrides.filtered_attributes = Some(decode_names(&key, value)?)
            }
            "filtered_tags" => overrides.filtered_tags = Some(decode_names(&key, value)?),
            "truncate_incomplete_row" => {
                overrides.truncate_incomplete_row = Some(decode_value(&key, value, "a boolean")?)
            }
            "fragment" => overrides.fragment = Some(decode_value(&key, value, "a boolean")?),
            _ => return Err(TruncateError::UnknownOption(key.clone())),
        }
    }

    Ok(overrides)
}

fn option_pairs<'a>(term: Term<'a>) -> TruncateResult<Vec<(Term<'a>, Term<'a>)>> {
    let invalid = || TruncateError::InvalidOption {
        key: "options".to_string(),
        expected: "a keyword list or map",
    };

    if term.is_map() {
        MapIterator::new(term)
            .map(|pairs| pairs.collect())
            .ok_or_else(invalid)
    } else {
        term.decode().map_err(|_| invalid())
    }
}

fn decode_value<'a, T: Decoder<'a>>(
    key: &str,
    value: Term<'a>,
    expected: &'static str,
) -> TruncateResult<T> {
    value.decode().map_err(|_| TruncateError::InvalidOption {
        key: key.to_string(),
        expected,
    })
}

/// Decode a list of names given as atoms or strings
fn decode_names(key: &str, value: Term<'_>) -> TruncateResult<Vec<String>> {
    let invalid = || TruncateError::InvalidOption {
        key: key.to_string(),
        expected: "a list of atoms or strings",
    };

    let items: Vec<Term> = value.decode().map_err(|_| invalid())?;
    items
        .into_iter()
        .map(|item| decode_name(item).ok_or_else(invalid))
        .collect()
}

fn decode_name(term: Term<'_>) -> Option<String> {
    if term.is_atom() {
        term.atom_to_string().ok()
    } else {
        term.decode::<String>().ok()
    }
}

/// Decode a source binary (or nil) to text
pub fn decode_source_term<'a>(term: Term<'a>) -> TruncateResult<Option<Cow<'a, str>>> {
    let binary: Option<Binary<'a>> = term.decode().map_err(|_| TruncateError::InvalidOption {
        key: "source".to_string(),
        expected: "a binary or nil",
    })?;

    binary
        .map(|binary| decode_source(binary.as_slice()))
        .transpose()
}

/// `{text | nil, truncated?}`
pub fn truncation_to_term<'a>(env: Env<'a>, truncation: Truncation) -> Term<'a> {
    (truncation.text, truncation.truncated).encode(env)
}

/// `{:ok, value}`
pub fn ok_tuple<'a>(env: Env<'a>, value: Term<'a>) -> Term<'a> {
    (ok(), value).encode(env)
}

/// `{:error, message}`
pub fn error_tuple<'a>(env: Env<'a>, err: &TruncateError) -> Term<'a> {
    (error(), err.to_string()).encode(env)
}
