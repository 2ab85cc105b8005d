//! Worker pool for parallel element fetching.
//!
//! A small thread pool with a shared bounded task channel and a bounded
//! output channel. Chunk ordering is restored by the caller from chunk ids,
//! so workers may finish in any order and no per-worker routing is needed.
//!
//! # Key properties
//! - Bounded channels prevent memory bloat
//! - Graceful shutdown on drop
//! - Generic over task and output types

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Thread pool backing the concurrent fetcher.
///
/// Channels:
/// - Task channel: main thread -> workers (chunk distribution)
/// - Output channel: workers -> main thread (chunk results)
/// - Shutdown flag: enables termination of idle workers
pub(crate) struct FetchPool<Task, Output> {
    workers: Vec<thread::JoinHandle<()>>,
    task_tx: Option<Sender<Task>>,
    output_rx: Receiver<Output>,
    shutdown: Arc<AtomicBool>,
}

impl<Task, Output> FetchPool<Task, Output>
where
    Task: Send + 'static,
    Output: Send + 'static,
{
    /// Creates a pool of `num_workers` threads running `worker_fn`.
    ///
    /// `buffer_size` bounds both channels. The caller must size it to hold
    /// every task of one dispatch round, so that sending a full round never
    /// blocks against its own gather.
    pub(crate) fn new<F>(num_workers: usize, buffer_size: usize, worker_fn: F) -> Result<Self>
    where
        F: Fn(Receiver<Task>, Sender<Output>, Arc<AtomicBool>) + Send + Sync + 'static,
    {
        if num_workers == 0 {
            return Err(anyhow!("Cannot create FetchPool with 0 workers"));
        }

        if buffer_size == 0 {
            return Err(anyhow!(
                "Cannot create FetchPool with buffer_size 0. \
                Buffer size must be > 0 to prevent deadlocks."
            ));
        }

        let (task_tx, task_rx) = bounded(buffer_size);
        let (output_tx, output_rx) = bounded(buffer_size);

        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_fn = Arc::new(worker_fn);
        let mut workers = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let task_rx = task_rx.clone();
            let output_tx = output_tx.clone();
            let shutdown_clone = shutdown.clone();
            let worker_fn_clone = worker_fn.clone();

            let handle = thread::Builder::new()
                .name(format!("fetch-worker-{}", worker_id))
                .spawn(move || {
                    worker_fn_clone(task_rx, output_tx, shutdown_clone);
                })
                .with_context(|| format!("Failed to spawn fetch worker thread {}", worker_id))?;

            workers.push(handle);
        }

        // The workers hold the only senders now; if they all exit, recv()
        // on the output channel reports disconnection instead of hanging.
        drop(output_tx);

        Ok(Self {
            workers,
            task_tx: Some(task_tx),
            output_rx,
            shutdown,
        })
    }

    /// Dispatches one task to the pool.
    pub(crate) fn send(&self, task: Task) -> Result<()> {
        self.task_tx
            .as_ref()
            .ok_or_else(|| anyhow!("FetchPool task channel already closed"))?
            .send(task)
            .map_err(|_| anyhow!("All fetch workers have exited"))
    }

    /// Receives one task result, blocking until a worker produces it.
    pub(crate) fn recv(&self) -> Result<Output> {
        self.output_rx
            .recv()
            .context("Fetch workers disconnected before returning their results")
    }
}

impl<Task, Output> Drop for FetchPool<Task, Output> {
    fn drop(&mut self) {
        // Signal shutdown to all workers
        self.shutdown.store(true, Ordering::Relaxed);

        // Drop the task sender to close the channel
        self.task_tx.take();

        // Wait for workers to finish
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
