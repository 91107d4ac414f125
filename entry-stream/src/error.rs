//! Error types for stream utilities

use thiserror::Error;

/// Result type for stream utilities
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error returned by a worker
pub type WorkerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stream utility errors
#[derive(Error, Debug)]
pub enum Error {
    /// Size or concurrency argument out of range
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Parameter name
        name: &'static str,
        /// What was wrong with it
        reason: &'static str,
    },

    /// A worker returned an error; remaining work was cancelled
    #[error("Worker failed: {0}")]
    Worker(#[source] WorkerError),

    /// A worker task panicked or was aborted
    #[error("Worker task did not complete: {0}")]
    Join(String),
}

pub(crate) fn require_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::InvalidArgument {
            name,
            reason: "must be greater than zero",
        });
    }
    Ok(())
}
