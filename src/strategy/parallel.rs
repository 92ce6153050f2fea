//! Parallel Batch Truncation
//!
//! Uses Rayon to truncate many independent sources with one set of options.
//! Every source gets its own state machine; nothing is shared but the options.

use crate::truncate::{truncate, TruncateOptions, Truncation};
use rayon::prelude::*;

/// Truncate every source in parallel; results keep the input order
pub fn truncate_parallel<S>(sources: &[Option<S>], options: &TruncateOptions) -> Vec<Truncation>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|source| truncate(source.as_ref().map(AsRef::<str>::as_ref), options))
        .collect()
}
