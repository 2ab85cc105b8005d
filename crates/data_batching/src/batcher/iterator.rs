//! Single-pass batch iterator.
//!
//! Created by [`Batcher::iter`]. Each `next()` services one index window
//! `[pos, pos + batch_size)` of the pass: the window is fetched through the
//! concurrent fetcher, padded, collated, and returned as one aggregated
//! element. The caller drives the iterator synchronously; the only blocking
//! point is the per-window fetch barrier.
//!
//! The iterator is not restartable. A new pass requires a new call to
//! `iter()`, which re-samples the index order.

use anyhow::Result;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::Batcher;
use crate::collator::{Collator, Padder};
use crate::fetcher::ConcurrentFetcher;

impl<T, C, P> Batcher<T, C, P>
where
    T: Clone + Send + Sync + 'static,
    C: Collator<T>,
    P: Padder<T>,
{
    /// Starts a fresh pass and returns its batch iterator.
    ///
    /// Sampling happens here, once, before any fetch worker is spawned, so
    /// even a stateful sampler never races the parallel fetch. When
    /// `shuffle` is enabled each pass advances the epoch counter and gets a
    /// new permutation; otherwise every pass sees the same order.
    pub fn iter(&self) -> Result<BatchIter<'_, T, C, P>> {
        let epoch = self.current_epoch.fetch_add(1, Ordering::SeqCst);
        let sampler_epoch = if self.config.shuffle { epoch } else { 0 };

        let permutation = Arc::new(self.sampler.sample(sampler_epoch));

        let num_workers = self.config.threads_limit.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        });

        // Channel capacity covers the worst case of one chunk per index.
        let fetcher = ConcurrentFetcher::new(
            self.dataset.clone(),
            Arc::clone(&permutation),
            num_workers,
            self.config.batch_size,
        )?;

        Ok(BatchIter {
            fetcher,
            pass_len: permutation.len(),
            batch_size: self.config.batch_size,
            drop_last: self.config.drop_last,
            threads_limit: self.config.threads_limit,
            pos: 0,
            failed: false,
            padder: &self.padder,
            collator: &self.collator,
        })
    }
}

/// Iterator over the aggregated batches of one pass.
///
/// Yields `Result<T>`: a fetch or hook failure is yielded once and the
/// iterator is exhausted afterwards; no partial batch is ever returned.
pub struct BatchIter<'a, T, C, P> {
    fetcher: ConcurrentFetcher<T>,
    pass_len: usize,
    batch_size: usize,
    drop_last: bool,
    threads_limit: Option<usize>,
    pos: usize,
    failed: bool,
    padder: &'a P,
    collator: &'a C,
}

impl<T, C, P> Iterator for BatchIter<'_, T, C, P>
where
    T: Clone + Send + Sync + 'static,
    C: Collator<T>,
    P: Padder<T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.pass_len {
            return None;
        }

        let end = (self.pos + self.batch_size).min(self.pass_len);

        // Drop-last short-circuit: a partial tail is discarded wholesale,
        // never fetched and never truncated into a smaller batch.
        if end - self.pos < self.batch_size && self.drop_last {
            self.pos = self.pass_len;
            return None;
        }

        // With a threads limit of k, the window splits into roughly k
        // chunks; the clamp keeps chunks non-empty when k exceeds the
        // window size. Without a limit, single-index chunks expose the
        // finest grain to however many workers the host provides.
        let min_chunk_size = match self.threads_limit {
            Some(limit) => ((end - self.pos) / limit).max(1),
            None => 1,
        };

        let batch = self
            .fetcher
            .fetch(self.pos..end, min_chunk_size)
            .and_then(|raw| self.padder.pad(raw))
            .and_then(|padded| self.collator.collate(padded));

        self.pos = end;
        if batch.is_err() {
            self.failed = true;
        }
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = self.pass_len - self.pos;
        let batches = remaining / self.batch_size
            + if remaining % self.batch_size > 0 && !self.drop_last {
                1
            } else {
                0
            };
        (batches, Some(batches))
    }
}
