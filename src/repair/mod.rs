//! Post-truncation repair
//!
//! Re-parses truncated output into a small tree and fixes what the
//! streaming pass cannot see, namely a half-written trailing table row.

pub mod fragment;
pub mod rows;

pub use fragment::Fragment;
pub use rows::complete_rows;
