//! Bounded, order-preserving parallel fetch of dataset elements.
//!
//! The fetcher maps an index window `[pos, end)` to the elements
//! `dataset[permutation[i]]` for `i` in the window. The window is split
//! into contiguous chunks, one fetch task per chunk; chunks run
//! concurrently on a pool of host threads and the results are reassembled
//! by chunk position, so the output order never depends on scheduling.
//!
//! One fetcher is created per pass. Each `fetch` call dispatches every
//! chunk of its window and then gathers exactly that many results before
//! returning, so the channels are drained between calls and consecutive
//! batches cannot interleave.

use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::dataset::InMemoryDataset;

pub(crate) mod pool;
use pool::FetchPool;

/// How often idle workers check the shutdown flag. A polling interval,
/// not an error timeout.
const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One fetch task: resolve permutation positions `range` to elements.
struct ChunkTask {
    chunk_id: usize,
    range: Range<usize>,
}

/// Chunk result, tagged with its position for ordered reassembly.
type ChunkOutput<T> = (usize, Result<Vec<T>>);

/// Order-preserving concurrent fetcher over one dataset snapshot and one
/// index permutation. Both are shared read-only with the worker threads;
/// nothing is locked during a fetch.
pub(crate) struct ConcurrentFetcher<T> {
    pool: FetchPool<ChunkTask, ChunkOutput<T>>,
}

impl<T> ConcurrentFetcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Spawns `num_workers` fetch threads for one pass.
    ///
    /// `buffer_size` must be at least the number of chunks any single
    /// `fetch` call can produce; the batch iterator passes its batch size,
    /// which bounds the chunk count since chunks hold at least one index.
    pub(crate) fn new(
        dataset: InMemoryDataset<T>,
        permutation: Arc<Vec<usize>>,
        num_workers: usize,
        buffer_size: usize,
    ) -> Result<Self> {
        let worker_fn = move |task_rx: Receiver<ChunkTask>,
                              output_tx: Sender<ChunkOutput<T>>,
                              shutdown: Arc<AtomicBool>| {
            while !shutdown.load(Ordering::Relaxed) {
                match task_rx.recv_timeout(WORKER_POLL_INTERVAL) {
                    Ok(task) => {
                        let result = resolve_chunk(&dataset, &permutation, task.range);
                        if output_tx.send((task.chunk_id, result)).is_err() {
                            break;
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        };

        let pool = FetchPool::new(num_workers, buffer_size, worker_fn)?;
        Ok(Self { pool })
    }

    /// Fetches the elements for `window`, in window order.
    ///
    /// The window is partitioned into contiguous chunks of
    /// `max(min_chunk_size, 1)` indices (the final chunk may be smaller).
    /// Blocks until every chunk has completed. If any chunk fails, the
    /// first failure in chunk order is returned and sibling results are
    /// discarded.
    pub(crate) fn fetch(&self, window: Range<usize>, min_chunk_size: usize) -> Result<Vec<T>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = min_chunk_size.max(1);

        // Dispatch one task per chunk. The pool's channel capacity covers
        // a full window of single-index chunks, so this never blocks.
        let mut num_chunks = 0;
        let mut start = window.start;
        while start < window.end {
            let end = (start + chunk_size).min(window.end);
            self.pool.send(ChunkTask {
                chunk_id: num_chunks,
                range: start..end,
            })?;
            num_chunks += 1;
            start = end;
        }

        // Gather every chunk before reporting anything: a failed pull must
        // leave no stale results behind for the next one.
        let mut slots: Vec<Option<Result<Vec<T>>>> = (0..num_chunks).map(|_| None).collect();
        for _ in 0..num_chunks {
            let (chunk_id, result) = self.pool.recv()?;
            let slot = slots
                .get_mut(chunk_id)
                .ok_or_else(|| anyhow!("Received unknown chunk id {}", chunk_id))?;
            *slot = Some(result);
        }

        // Reassemble in chunk order, independent of completion order.
        let mut elements = Vec::with_capacity(window.len());
        for (chunk_id, slot) in slots.into_iter().enumerate() {
            let chunk =
                slot.ok_or_else(|| anyhow!("No result received for chunk {}", chunk_id))??;
            elements.extend(chunk);
        }
        Ok(elements)
    }
}

/// Resolves one chunk of permutation positions to cloned elements.
fn resolve_chunk<T: Clone>(
    dataset: &InMemoryDataset<T>,
    permutation: &[usize],
    range: Range<usize>,
) -> Result<Vec<T>> {
    range
        .map(|position| {
            let index = *permutation
                .get(position)
                .ok_or_else(|| anyhow!("Permutation position {} out of range", position))?;
            dataset.get(index).cloned().ok_or_else(|| {
                anyhow!(
                    "Sampled index {} out of bounds for dataset of size {}",
                    index,
                    dataset.len()
                )
            })
        })
        .collect()
}
