//! Markup truncation
//!
//! ```text
//! source ---> EventSource ---> TruncatedDocument ---> (text, truncated, at_table)
//!                                                          |
//!                                     truncate_incomplete_row?
//!                                                          v
//!                                                   complete_rows ---> Truncation
//! ```

pub mod budget;
pub mod machine;
pub mod options;

pub use machine::{TruncatedDocument, TruncatedOutput, TruncationState};
pub use options::{OptionOverrides, TruncateOptions};

use crate::repair::complete_rows;
use crate::sax::{EventSource, SaxEvent};

/// Outcome of truncating one source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Truncation {
    /// The truncated markup; `None` for a missing source or an empty result
    pub text: Option<String>,
    /// Whether any content was removed
    pub truncated: bool,
}

/// Truncate `source` to the options' budget, keeping the markup well-formed
pub fn truncate(source: Option<&str>, options: &TruncateOptions) -> Truncation {
    let Some(source) = source else {
        return Truncation::default();
    };

    let output = truncate_events(EventSource::new(source, options.fragment), options);

    let (text, truncated) = if options.truncate_incomplete_row {
        complete_rows(output.text, output.truncated, output.truncated_at_table)
    } else {
        (output.text, output.truncated)
    };

    Truncation {
        text: (!text.is_empty()).then_some(text),
        truncated,
    }
}

/// Run the state machine over any event stream
///
/// `EndDocument` is supplied if the stream ends without one.
pub fn truncate_events<'a, I>(events: I, options: &TruncateOptions) -> TruncatedOutput
where
    I: IntoIterator<Item = SaxEvent<'a>>,
{
    let mut document = TruncatedDocument::new(options);
    let mut ended = false;

    for event in events {
        ended = matches!(event, SaxEvent::EndDocument);
        document.process(event);
        if ended {
            break;
        }
    }

    if !ended {
        document.process(SaxEvent::EndDocument);
    }
    document.finish()
}
