//! Configuration for Batcher behaviour.
//!
//! The `BatcherConfig` struct stores the policy knobs that control how a
//! dataset is cut into batches.
//!
//! Example:
//! ```ignore
//! let config = BatcherConfig::builder()
//!     .batch_size(32)
//!     .threads_limit(4)
//!     .shuffle(true)
//!     .drop_last(true)
//!     .seed(42)
//!     .build();
//! ```

/// Configuration for a [`Batcher`](super::Batcher).
///
/// Immutable once the batcher is constructed; one config can serve many
/// independent passes.
#[derive(Debug, Clone)]
pub struct BatcherConfig {
    /// Number of elements per aggregated batch. Must be > 0.
    pub batch_size: usize,
    /// Caps the number of concurrently scheduled fetch chunks.
    /// `None` means finest-grained chunking across all available cores.
    pub threads_limit: Option<usize>,
    /// Whether to re-permute indices on every pass.
    pub shuffle: bool,
    /// Whether to discard a final under-sized batch instead of yielding it.
    pub drop_last: bool,
    /// Base RNG seed for reproducible shuffling. A random seed is drawn at
    /// batcher construction when unset.
    pub seed: Option<u64>,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            threads_limit: None,
            shuffle: false,
            drop_last: false,
            seed: None,
        }
    }
}

impl BatcherConfig {
    pub fn builder() -> BatcherConfigBuilder {
        BatcherConfigBuilder::default()
    }
}

/// Builder for [`BatcherConfig`] with method chaining.
#[derive(Default)]
pub struct BatcherConfigBuilder {
    config: BatcherConfig,
}

impl BatcherConfigBuilder {
    /// Set the batch size (must be > 0).
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Cap the number of concurrent fetch chunks.
    pub fn threads_limit(mut self, limit: usize) -> Self {
        self.config.threads_limit = Some(limit);
        self
    }

    /// Set whether to shuffle the index order every pass.
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    /// Set whether to drop a final under-sized batch.
    pub fn drop_last(mut self, drop: bool) -> Self {
        self.config.drop_last = drop;
        self
    }

    /// Set the base seed for reproducible shuffling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> BatcherConfig {
        self.config
    }
}
