//! The batcher: immutable configuration plus iterator factory.
//!
//! A `Batcher` owns a dataset snapshot, a sampling strategy, and the
//! pad/collate hooks, and hands out single-pass batch iterators. Each
//! iterator samples a fresh index order, spawns its own fetch pool, and
//! yields aggregated batches until the pass is exhausted.
//!
//! # Constructor Overview
//!
//! ## Automatic sampling
//! The batcher picks the sampler from `config.shuffle`:
//! - `shuffle = false`: [`SequentialSampler`]
//! - `shuffle = true`: [`RandomSampler`] seeded from `config.seed`
//!
//! **Methods:**
//! - `new()` - auto-sampling + capability-derived StackCollator
//! - `new_with_collator()` - auto-sampling + custom collator
//! - `new_with_hooks()` - auto-sampling + custom padder and collator
//!
//! ## Custom sampling
//! Users provide the sampler; the batcher just coordinates. `shuffle`
//! must stay false, and the sampler's seed (if any) must agree with
//! `config.seed`.
//!
//! **Methods:**
//! - `new_with_sampler()` - user sampler + StackCollator
//! - `new_with_sampler_and_collator()` - user sampler + custom collator

use anyhow::{anyhow, ensure, Result};
use rand::Rng;
use std::sync::atomic::AtomicUsize;

use crate::collator::{Collate, Collator, IdentityPadder, Padder, StackCollator};
use crate::dataset::InMemoryDataset;
use crate::sampler::{RandomSampler, Sampler, SequentialSampler};

pub mod config;
pub mod iterator;

pub use config::{BatcherConfig, BatcherConfigBuilder};
pub use iterator::BatchIter;

/// Coordinates sampling, parallel fetching, padding, and collation for one
/// dataset.
///
/// # Thread safety
/// - `Batcher` itself is `Send + Sync` and can be shared across threads.
/// - Iterators are driven from a single thread; multiple independent
///   iterators can be created from the same batcher.
///
/// # Type parameters
/// - `T`: Element type of the dataset and of each aggregated batch
/// - `C`: Collator (defaults to [`StackCollator`])
/// - `P`: Padder (defaults to [`IdentityPadder`])
pub struct Batcher<T, C = StackCollator, P = IdentityPadder> {
    pub(crate) dataset: InMemoryDataset<T>,
    pub(crate) config: BatcherConfig,
    pub(crate) sampler: Box<dyn Sampler>,
    pub(crate) padder: P,
    pub(crate) collator: C,
    pub(crate) current_epoch: AtomicUsize,
}

impl<T> Batcher<T>
where
    T: Collate + Clone + Send + Sync + 'static,
{
    /// Creates a batcher with automatic sampling and the capability-derived
    /// default collation. Available only when `T` can collate itself; other
    /// element types must supply a collator through
    /// [`new_with_collator`](Self::new_with_collator).
    pub fn new(dataset: InMemoryDataset<T>, config: BatcherConfig) -> Result<Self> {
        Self::new_with_hooks(dataset, config, IdentityPadder, StackCollator)
    }

    /// Creates a batcher with a user-provided sampler and the default
    /// collation.
    pub fn new_with_sampler(
        dataset: InMemoryDataset<T>,
        sampler: impl Sampler + 'static,
        config: BatcherConfig,
    ) -> Result<Self> {
        Self::new_with_sampler_and_collator(dataset, sampler, config, StackCollator)
    }
}

impl<T, C> Batcher<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: Collator<T>,
{
    /// Creates a batcher with automatic sampling and a custom collator.
    pub fn new_with_collator(
        dataset: InMemoryDataset<T>,
        config: BatcherConfig,
        collator: C,
    ) -> Result<Self> {
        Self::new_with_hooks(dataset, config, IdentityPadder, collator)
    }

    /// Creates a batcher with a user-provided sampler and a custom
    /// collator.
    ///
    /// # Errors
    /// - `config.shuffle = true` (the sampler owns the ordering)
    /// - `config.seed` disagreeing with the sampler's seed
    /// - invalid `batch_size` or `threads_limit`
    pub fn new_with_sampler_and_collator(
        dataset: InMemoryDataset<T>,
        sampler: impl Sampler + 'static,
        config: BatcherConfig,
        collator: C,
    ) -> Result<Self> {
        if config.shuffle {
            return Err(anyhow!(
                "Cannot specify shuffle = true when providing a custom sampler.\n\
                Either:\n\
                1. Use Batcher::new() with shuffle = true to let the batcher manage sampling\n\
                2. Use Batcher::new_with_sampler() with shuffle = false and your own sampler"
            ));
        }

        if let (Some(sampler_seed), Some(config_seed)) = (sampler.seed(), config.seed) {
            ensure!(
                sampler_seed == config_seed,
                "Seed mismatch: sampler uses seed {} but config.seed is {}. \
                Use the same seed value for both, or set only one of them.",
                sampler_seed,
                config_seed,
            );
        }

        validate_config(&config)?;

        Ok(Self {
            dataset,
            config,
            sampler: Box::new(sampler),
            padder: IdentityPadder,
            collator,
            current_epoch: AtomicUsize::new(0),
        })
    }
}

impl<T, C, P> Batcher<T, C, P>
where
    T: Clone + Send + Sync + 'static,
    C: Collator<T>,
    P: Padder<T>,
{
    /// Creates a batcher with automatic sampling and both hooks supplied.
    ///
    /// # Errors
    /// - `batch_size = 0`
    /// - `threads_limit = Some(0)`
    pub fn new_with_hooks(
        dataset: InMemoryDataset<T>,
        config: BatcherConfig,
        padder: P,
        collator: C,
    ) -> Result<Self> {
        validate_config(&config)?;

        let effective_seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let sampler: Box<dyn Sampler> = if config.shuffle {
            Box::new(RandomSampler::new(dataset.len(), effective_seed))
        } else {
            Box::new(SequentialSampler::new(dataset.len()))
        };

        Ok(Self {
            dataset,
            config,
            sampler,
            padder,
            collator,
            current_epoch: AtomicUsize::new(0),
        })
    }

    /// Predicts exactly how many aggregated batches one full pass yields,
    /// accounting for whether a final partial batch is dropped.
    ///
    /// Assumes a full-pass sampler; a custom sampler yielding fewer indices
    /// produces correspondingly fewer batches.
    pub fn count(&self) -> usize {
        let n = self.dataset.len();
        let batch_size = self.config.batch_size;
        n / batch_size
            + if n % batch_size == 0 || self.config.drop_last {
                0
            } else {
                1
            }
    }

    /// Returns the number of elements in the underlying dataset.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Checks if the underlying dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Returns the configuration this batcher was built with.
    pub fn config(&self) -> &BatcherConfig {
        &self.config
    }
}

fn validate_config(config: &BatcherConfig) -> Result<()> {
    ensure!(config.batch_size > 0, "Batch size must be greater than 0");
    if let Some(limit) = config.threads_limit {
        ensure!(limit > 0, "threads_limit must be greater than 0 when set");
    }
    Ok(())
}
