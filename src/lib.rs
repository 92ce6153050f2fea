//! RustyTruncato - Length-bounded truncation of HTML/XML that stays well-formed
//!
//! Pipeline:
//! A: Event source (lenient tokenizer + balancing, `sax`)
//! B: Truncation state machine (`truncate`)
//! C: Row completer for tables cut mid-row (`repair`)
//! D: Parallel batch truncation (`strategy`)

use rustler::{Env, NifResult, Term};

pub mod core;
pub mod error;
pub mod repair;
pub mod sax;
pub mod strategy;
pub mod term;
pub mod truncate;

pub use error::{TruncateError, TruncateResult};
pub use truncate::{truncate, OptionOverrides, TruncateOptions, Truncation};

use std::borrow::Cow;
use term::{decode_options, decode_source_term, error_tuple, ok_tuple, truncation_to_term};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated by Rust (0 without `memory_tracking`)
#[rustler::nif]
fn get_rust_memory() -> usize {
    #[cfg(feature = "memory_tracking")]
    {
        tracking::ALLOCATED.load(std::sync::atomic::Ordering::SeqCst)
    }
    #[cfg(not(feature = "memory_tracking"))]
    {
        0
    }
}

// ============================================================================
// Truncation NIFs
// ============================================================================

/// Truncate one source: `{:ok, {text | nil, truncated?}}` or `{:error, message}`
#[rustler::nif(name = "truncate")]
fn truncate_one<'a>(env: Env<'a>, source: Term<'a>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let result = decode_options(opts)
        .and_then(OptionOverrides::resolve)
        .and_then(|options| {
            let source = decode_source_term(source)?;
            Ok(truncate::truncate(source.as_deref(), &options))
        });

    Ok(match result {
        Ok(truncation) => ok_tuple(env, truncation_to_term(env, truncation)),
        Err(e) => error_tuple(env, &e),
    })
}

/// Truncate many sources with the same options, in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn truncate_many<'a>(env: Env<'a>, sources: Vec<Term<'a>>, opts: Term<'a>) -> NifResult<Term<'a>> {
    let result = decode_options(opts)
        .and_then(OptionOverrides::resolve)
        .and_then(|options| {
            let sources = sources
                .into_iter()
                .map(decode_source_term)
                .collect::<TruncateResult<Vec<Option<Cow<'a, str>>>>>()?;
            Ok(strategy::truncate_parallel(&sources, &options))
        });

    Ok(match result {
        Ok(truncations) => {
            let mut list = Term::list_new_empty(env);
            for truncation in truncations.into_iter().rev() {
                list = list.list_prepend(truncation_to_term(env, truncation));
            }
            ok_tuple(env, list)
        }
        Err(e) => error_tuple(env, &e),
    })
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustyTruncato.Native");
