//! Truncation options
//!
//! `TruncateOptions` is the fully resolved, validated form used by a run.
//! `OptionOverrides` is what callers supply: any subset of the options,
//! resolved against the character or byte defaults.

use crate::error::{TruncateError, TruncateResult};
use serde::{Deserialize, Serialize};

/// Option names accepted from hosts
pub const OPTION_NAMES: &[&str] = &[
    "max_length",
    "tail",
    "count_tags",
    "count_bytes",
    "count_tail",
    "filtered_attributes",
    "filtered_tags",
    "truncate_incomplete_row",
    "fragment",
];

/// Resolved options for one truncation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncateOptions {
    /// Maximum length of the output, in the active unit
    pub max_length: usize,
    /// Marker appended where content was removed
    pub tail: String,
    /// Charge tag markup against the budget
    pub count_tags: bool,
    /// Count UTF-8 bytes instead of characters
    pub count_bytes: bool,
    /// Charge the tail against the budget once truncation begins
    pub count_tail: bool,
    /// Attributes omitted from the output
    pub filtered_attributes: Vec<String>,
    /// Elements dropped from the output together with their content
    pub filtered_tags: Vec<String>,
    /// Drop a trailing incomplete table row when truncation stops in a table
    pub truncate_incomplete_row: bool,
    /// Treat the source as a fragment rather than a full document
    pub fragment: bool,
}

impl Default for TruncateOptions {
    /// Character-counting defaults
    fn default() -> Self {
        TruncateOptions {
            max_length: 30,
            tail: "...".to_string(),
            count_tags: true,
            count_bytes: false,
            count_tail: false,
            filtered_attributes: Vec::new(),
            filtered_tags: Vec::new(),
            truncate_incomplete_row: false,
            fragment: true,
        }
    }
}

impl TruncateOptions {
    /// Byte-counting defaults
    pub fn bytesize() -> Self {
        TruncateOptions {
            count_bytes: true,
            count_tail: true,
            ..Self::default()
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    pub fn validate(&self) -> TruncateResult<()> {
        if self.max_length == 0 {
            return Err(TruncateError::ZeroMaxLength);
        }
        Ok(())
    }

    /// Whether `name` is a filtered tag
    pub fn is_filtered_tag(&self, name: &str) -> bool {
        self.filtered_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(name))
    }
}

/// Caller-supplied options; unset fields take their defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptionOverrides {
    pub max_length: Option<usize>,
    pub tail: Option<String>,
    pub count_tags: Option<bool>,
    pub count_bytes: Option<bool>,
    pub count_tail: Option<bool>,
    pub filtered_attributes: Option<Vec<String>>,
    pub filtered_tags: Option<Vec<String>>,
    pub truncate_incomplete_row: Option<bool>,
    pub fragment: Option<bool>,
}

impl OptionOverrides {
    /// Apply the overrides to the matching defaults and validate the result
    ///
    /// Byte counting selects the byte defaults, so `count_tail` is on unless
    /// the caller turned it off.
    pub fn resolve(self) -> TruncateResult<TruncateOptions> {
        let base = if self.count_bytes == Some(true) {
            TruncateOptions::bytesize()
        } else {
            TruncateOptions::default()
        };

        let options = TruncateOptions {
            max_length: self.max_length.unwrap_or(base.max_length),
            tail: self.tail.unwrap_or(base.tail),
            count_tags: self.count_tags.unwrap_or(base.count_tags),
            count_bytes: self.count_bytes.unwrap_or(base.count_bytes),
            count_tail: self.count_tail.unwrap_or(base.count_tail),
            filtered_attributes: self
                .filtered_attributes
                .map(lowercase_all)
                .unwrap_or(base.filtered_attributes),
            filtered_tags: self
                .filtered_tags
                .map(lowercase_all)
                .unwrap_or(base.filtered_tags),
            truncate_incomplete_row: self
                .truncate_incomplete_row
                .unwrap_or(base.truncate_incomplete_row),
            fragment: self.fragment.unwrap_or(base.fragment),
        };

        options.validate()?;
        Ok(options)
    }
}

/// Attribute and tag names from the event source are lowercase
fn lowercase_all(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .map(|name| name.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_defaults() {
        let options = OptionOverrides::default().resolve().unwrap();
        assert_eq!(options, TruncateOptions::default());
        assert_eq!(options.max_length, 30);
        assert_eq!(options.tail, "...");
        assert!(options.count_tags);
        assert!(!options.count_bytes);
        assert!(!options.count_tail);
        assert!(options.fragment);
    }

    #[test]
    fn test_byte_mode_counts_tail_by_default() {
        let options = OptionOverrides {
            count_bytes: Some(true),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(options, TruncateOptions::bytesize());
        assert!(options.count_tail);

        let options = OptionOverrides {
            count_bytes: Some(true),
            count_tail: Some(false),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert!(!options.count_tail);
    }

    #[test]
    fn test_zero_max_length_is_rejected() {
        let result = OptionOverrides {
            max_length: Some(0),
            ..Default::default()
        }
        .resolve();
        assert_eq!(result, Err(TruncateError::ZeroMaxLength));
    }

    #[test]
    fn test_filter_names_are_lowercased() {
        let options = OptionOverrides {
            filtered_attributes: Some(vec!["STYLE".to_string()]),
            filtered_tags: Some(vec!["Script".to_string()]),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(options.filtered_attributes, vec!["style"]);
        assert!(options.is_filtered_tag("script"));
        assert!(options.is_filtered_tag("SCRIPT"));
    }

    #[test]
    fn test_deserialize_overrides() {
        let overrides: OptionOverrides =
            serde_json::from_str(r#"{"max_length": 12, "tail": "&hellip;", "count_bytes": true}"#)
                .unwrap();
        let options = overrides.resolve().unwrap();
        assert_eq!(options.max_length, 12);
        assert_eq!(options.tail, "&hellip;");
        assert!(options.count_tail);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result: Result<OptionOverrides, _> = serde_json::from_str(r#"{"max_lenght": 12}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_option_names_cover_every_field() {
        let options = serde_json::to_value(TruncateOptions::default()).unwrap();
        let fields = options.as_object().unwrap();
        assert_eq!(fields.len(), OPTION_NAMES.len());
        for name in OPTION_NAMES {
            assert!(fields.contains_key(*name), "missing {}", name);
        }
    }
}
