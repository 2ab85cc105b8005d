pub mod batcher;
pub mod collator;
pub mod dataset;
pub mod sampler;

pub(crate) mod fetcher;

pub use batcher::{BatchIter, Batcher, BatcherConfig};
pub use collator::{Collate, Collator, IdentityPadder, LongestPadder, Padder, StackCollator};
pub use dataset::InMemoryDataset;
pub use sampler::{RandomSampler, Sampler, SequentialSampler, SubsetRandomSampler};
