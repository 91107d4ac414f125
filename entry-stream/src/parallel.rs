//! Bounded parallel processing of an entry stream

use crate::error::{require_positive, Error, Result, WorkerError};
use futures::{pin_mut, Stream, StreamExt};
use std::future::Future;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Run `worker` on every entry with at most `max_concurrency` invocations
/// in flight.
///
/// Completion order is unspecified. The first failing worker stops the run:
/// in-flight workers are aborted, no further entries are pulled and that
/// failure is returned. On success the number of processed entries is
/// returned.
pub async fn parallel_for_each<S, F, Fut, E>(
    stream: S,
    mut worker: F,
    max_concurrency: usize,
) -> Result<usize>
where
    S: Stream,
    S::Item: Send + 'static,
    F: FnMut(S::Item) -> Fut,
    Fut: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: Into<WorkerError> + Send + 'static,
{
    require_positive("max_concurrency", max_concurrency)?;

    pin_mut!(stream);
    let mut tasks = JoinSet::new();
    let mut source_done = false;
    let mut processed = 0usize;

    loop {
        while !source_done && tasks.len() < max_concurrency {
            match stream.next().await {
                Some(entry) => {
                    tasks.spawn(worker(entry));
                }
                None => source_done = true,
            }
        }

        let Some(joined) = tasks.join_next().await else {
            break;
        };

        match joined {
            Ok(Ok(())) => processed += 1,
            Ok(Err(error)) => {
                let error: WorkerError = error.into();
                warn!(error = %error, in_flight = tasks.len(), "worker failed, cancelling remaining work");
                tasks.abort_all();
                return Err(Error::Worker(error));
            }
            Err(join_error) => {
                warn!(error = %join_error, "worker task did not complete");
                tasks.abort_all();
                return Err(Error::Join(join_error.to_string()));
            }
        }
    }

    debug!(processed, "parallel run finished");
    Ok(processed)
}
