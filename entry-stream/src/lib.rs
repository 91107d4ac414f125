//! Batching and bounded concurrency for entry streams
//!
//! Combinators over any [`futures::Stream`], independent of what the entries
//! are. Typical use is bulk ingestion: a decoder yields payment entries one
//! at a time and these utilities group them or fan them out to workers.
//!
//! - [`EntryStreamExt::batch`]: fixed-size groups, order preserved
//! - [`EntryStreamExt::buffer`]: read a window ahead, then drain it
//! - [`EntryStreamExt::take_entries`] / [`EntryStreamExt::skip_entries`]
//! - [`parallel_for_each`]: at most N workers in flight, first failure wins

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod error;
pub mod ext;
pub mod parallel;

pub use error::{Error, Result, WorkerError};
pub use ext::{Buffer, EntryStreamExt};
pub use parallel::parallel_for_each;

/// Batch size used when the caller has no preference
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Worker limit used when the caller has no preference
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Look-ahead window used when the caller has no preference
pub const DEFAULT_BUFFER_SIZE: usize = 32;
