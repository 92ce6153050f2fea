//! Error type for option resolution and NIF input decoding.
//!
//! Truncation itself never fails: a missing source and an exhausted budget
//! are ordinary outcomes, not errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TruncateError {
    #[error("max_length must be greater than zero")]
    ZeroMaxLength,

    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("option `{key}` expects {expected}")]
    InvalidOption { key: String, expected: &'static str },

    #[error("source is not valid text: {0}")]
    InvalidEncoding(String),
}

pub type TruncateResult<T> = Result<T, TruncateError>;
