//! Property-based tests for stream combinator laws
//!
//! - Batching: ceil(L / n) groups, all full except possibly the last, order kept
//! - Buffering never changes which items are yielded
//! - take(n) yields min(n, L) items; skip(n).take(m) matches slicing [n, n+m)

use entry_stream::EntryStreamExt;
use futures::executor::block_on;
use futures::stream::{self, StreamExt};
use proptest::prelude::*;

/// Strategy for generating entry sequences
fn entries_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..200)
}

proptest! {
    #[test]
    fn prop_batch_shape(entries in entries_strategy(), size in 1usize..50) {
        let batches: Vec<Vec<u32>> =
            block_on(stream::iter(entries.clone()).batch(size).unwrap().collect());

        prop_assert_eq!(batches.len(), (entries.len() + size - 1) / size);
        if let Some((last, full)) = batches.split_last() {
            prop_assert!(full.iter().all(|batch| batch.len() == size));
            prop_assert!(!last.is_empty() && last.len() <= size);
        }
        let flattened: Vec<u32> = batches.into_iter().flatten().collect();
        prop_assert_eq!(flattened, entries);
    }

    #[test]
    fn prop_buffer_is_transparent(entries in entries_strategy(), capacity in 1usize..64) {
        let buffered: Vec<u32> =
            block_on(stream::iter(entries.clone()).buffer(capacity).unwrap().collect());
        prop_assert_eq!(buffered, entries);
    }

    #[test]
    fn prop_take_count(entries in entries_strategy(), count in 0usize..300) {
        let taken = block_on(stream::iter(entries.clone()).take_entries(count).count());
        prop_assert_eq!(taken, count.min(entries.len()));
    }

    #[test]
    fn prop_skip_take_matches_slice(
        entries in entries_strategy(),
        skip in 0usize..250,
        take in 0usize..250,
    ) {
        let window: Vec<u32> = block_on(
            stream::iter(entries.clone())
                .skip_entries(skip)
                .take_entries(take)
                .collect(),
        );

        let start = skip.min(entries.len());
        let end = (skip + take).min(entries.len());
        prop_assert_eq!(window, entries[start..end].to_vec());
    }
}
