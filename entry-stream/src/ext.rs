//! Stream combinators for entry sequences

use crate::error::{require_positive, Result};
use futures::ready;
use futures::stream::{Chunks, Skip, Stream, StreamExt, Take};
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Batching and windowing over any stream of entries
pub trait EntryStreamExt: Stream + Sized {
    /// Group consecutive entries into vectors of `size`; the last may be shorter
    fn batch(self, size: usize) -> Result<Chunks<Self>> {
        require_positive("size", size)?;
        Ok(self.chunks(size))
    }

    /// Pull up to `capacity` entries ahead, then hand them out before
    /// pulling the next window
    fn buffer(self, capacity: usize) -> Result<Buffer<Self>>
    where
        Self: Unpin,
    {
        require_positive("capacity", capacity)?;
        Ok(Buffer {
            stream: self,
            window: VecDeque::with_capacity(capacity),
            capacity,
            draining: false,
            exhausted: false,
        })
    }

    /// First `count` entries; the source is not polled past the last one
    fn take_entries(self, count: usize) -> Take<Self> {
        self.take(count)
    }

    /// Everything after the first `count` entries
    fn skip_entries(self, count: usize) -> Skip<Self> {
        self.skip(count)
    }
}

impl<S: Stream> EntryStreamExt for S {}

/// Stream returned by [`EntryStreamExt::buffer`]
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct Buffer<S: Stream> {
    stream: S,
    window: VecDeque<S::Item>,
    capacity: usize,
    draining: bool,
    exhausted: bool,
}

// The window is never pinned; only `S: Unpin` matters
impl<S: Stream + Unpin> Unpin for Buffer<S> {}

impl<S: Stream + Unpin> Buffer<S> {
    /// Entries currently held in the window
    pub fn buffered(&self) -> usize {
        self.window.len()
    }
}

impl<S: Stream + Unpin> Stream for Buffer<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if this.draining {
                if let Some(item) = this.window.pop_front() {
                    return Poll::Ready(Some(item));
                }
                this.draining = false;
                if this.exhausted {
                    return Poll::Ready(None);
                }
            }

            while this.window.len() < this.capacity && !this.exhausted {
                match ready!(this.stream.poll_next_unpin(cx)) {
                    Some(item) => this.window.push_back(item),
                    None => this.exhausted = true,
                }
            }
            this.draining = true;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = if self.exhausted {
            (0, Some(0))
        } else {
            self.stream.size_hint()
        };
        let held = self.window.len();
        (lower.saturating_add(held), upper.and_then(|u| u.checked_add(held)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_batch_sizes() {
        let batches: Vec<Vec<u32>> = stream::iter(1..=7).batch(3).unwrap().collect().await;
        assert_eq!(batches, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
    }

    #[tokio::test]
    async fn test_batch_rejects_zero() {
        let result = stream::iter(1..=3).batch(0);
        assert!(matches!(result, Err(Error::InvalidArgument { name: "size", .. })));
    }

    #[tokio::test]
    async fn test_buffer_preserves_items() {
        let items: Vec<u32> = stream::iter(0..10).buffer(4).unwrap().collect().await;
        assert_eq!(items, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_buffer_pulls_a_window_ahead() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let source = stream::iter(0..10).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut buffered = source.buffer(4).unwrap();

        assert_eq!(buffered.next().await, Some(0));
        assert_eq!(pulled.load(Ordering::SeqCst), 4);
        assert_eq!(Buffer::buffered(&buffered), 3);

        for expected in 1..4 {
            assert_eq!(buffered.next().await, Some(expected));
        }
        assert_eq!(pulled.load(Ordering::SeqCst), 4);

        assert_eq!(buffered.next().await, Some(4));
        assert_eq!(pulled.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_buffer_rejects_zero() {
        assert!(stream::iter(0..1).buffer(0).is_err());
    }

    #[tokio::test]
    async fn test_take_does_not_over_consume() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let source = stream::iter(0..100).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let taken: Vec<u32> = source.take_entries(5).collect().await;
        assert_eq!(taken, vec![0, 1, 2, 3, 4]);
        assert_eq!(pulled.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_skip_then_take() {
        let window: Vec<u32> = stream::iter(0..20).skip_entries(5).take_entries(3).collect().await;
        assert_eq!(window, vec![5, 6, 7]);
    }
}
