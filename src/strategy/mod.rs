//! Execution Strategy Module
//!
//! - Single source: `truncate::truncate`, one pass on the calling thread
//! - Batch: `parallel::truncate_parallel`, Rayon across sources

pub mod parallel;

pub use parallel::truncate_parallel;
