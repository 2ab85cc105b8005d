use anyhow::{ensure, Result};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;

/// A `Sampler` decides the index order for one full pass over a dataset.
///
/// # Method
/// - `sample(epoch)`: materializes the complete index sequence for that
///   pass. It is called exactly once, at iterator construction, strictly
///   before any fetch worker touches the dataset — so a stateful sampler
///   may inspect the dataset in a pre-pass step without racing the fetch.
///
/// # Seeding
/// Shuffling samplers derive their RNG as `base_seed + epoch`, so the same
/// `(seed, epoch)` pair always reproduces the same order while successive
/// passes still see fresh permutations.
///
/// Implementations must be `Send + Sync` so a batcher can be shared across
/// threads.
pub trait Sampler: Send + Sync {
    /// Returns the index order for the given pass.
    fn sample(&self, epoch: usize) -> Vec<usize>;

    /// Base RNG seed, if this sampler shuffles. Used by the batcher to
    /// reject conflicting seed configuration.
    fn seed(&self) -> Option<u64> {
        None
    }
}

/// ============================================================================
/// Yields indices in ascending order `0, 1, ..., dataset_size - 1`.
///
/// This is the default order when shuffling is disabled; two passes over
/// the same dataset are identical.
#[derive(Debug, Clone)]
pub struct SequentialSampler {
    dataset_size: usize,
}

impl SequentialSampler {
    pub fn new(dataset_size: usize) -> Self {
        Self { dataset_size }
    }
}

impl Sampler for SequentialSampler {
    fn sample(&self, _epoch: usize) -> Vec<usize> {
        (0..self.dataset_size).collect()
    }
}

/// ============================================================================
/// Yields a uniformly random permutation of `0..dataset_size` per pass.
///
/// # Arguments:
/// - `dataset_size`: Total number of elements in the dataset.
/// - `base_seed`: Base RNG seed. The pass RNG is seeded with
///   `base_seed + epoch`, so epoch 0 reproduces with the same seed while
///   every later pass gets a different order.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    dataset_size: usize,
    base_seed: u64,
}

impl RandomSampler {
    pub fn new(dataset_size: usize, base_seed: u64) -> Self {
        Self {
            dataset_size,
            base_seed,
        }
    }

    #[inline]
    fn derive_rng_for_epoch(&self, epoch: usize) -> StdRng {
        StdRng::seed_from_u64(self.base_seed.wrapping_add(epoch as u64))
    }
}

impl Sampler for RandomSampler {
    fn sample(&self, epoch: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset_size).collect();
        indices.shuffle(&mut self.derive_rng_for_epoch(epoch));
        indices
    }

    fn seed(&self) -> Option<u64> {
        Some(self.base_seed)
    }
}

/// ============================================================================
/// Shuffles a predefined subset of indices, without replacement.
///
/// Useful for validation splits or curriculum schedules where only part of
/// the dataset participates in a pass. Indices are validated up front:
/// duplicates and out-of-bounds entries are construction errors, not
/// surprises during a fetch.
///
/// # Arguments:
/// - `dataset_size`: Total number of elements in the dataset.
/// - `indices`: The subset to shuffle. No duplicates; each `< dataset_size`.
/// - `base_seed`: Base RNG seed (see [`RandomSampler`]).
#[derive(Debug, Clone)]
pub struct SubsetRandomSampler {
    indices: Vec<usize>,
    base_seed: u64,
}

impl SubsetRandomSampler {
    pub fn new(dataset_size: usize, indices: Vec<usize>, base_seed: u64) -> Result<Self> {
        ensure!(!indices.is_empty(), "Indices must not be empty");

        let mut seen_indices = HashSet::with_capacity(indices.len());
        for &index in &indices {
            ensure!(
                index < dataset_size,
                "Index {} out of bounds for dataset of size {}",
                index,
                dataset_size,
            );
            ensure!(
                seen_indices.insert(index),
                "Duplicate index {} found in SubsetRandomSampler",
                index
            );
        }
        Ok(Self { indices, base_seed })
    }
}

impl Sampler for SubsetRandomSampler {
    fn sample(&self, epoch: usize) -> Vec<usize> {
        let mut shuffled = self.indices.clone();
        let mut rng = StdRng::seed_from_u64(self.base_seed.wrapping_add(epoch as u64));
        shuffled.shuffle(&mut rng);
        shuffled
    }

    fn seed(&self) -> Option<u64> {
        Some(self.base_seed)
    }
}
