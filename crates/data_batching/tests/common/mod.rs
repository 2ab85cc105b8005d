use data_batching::{dataset::InMemoryDataset, sampler::Sampler};

/// Builds a dataset of `n` single-element sequences `[0], [1], ..`, so a
/// collated batch concatenates to the visited indices in visit order.
pub fn index_dataset(n: usize) -> InMemoryDataset<Vec<i64>> {
    InMemoryDataset::new((0..n as i64).map(|i| vec![i]).collect())
}

/// A deliberately broken sampler that emits an index past the end of the
/// dataset, to exercise fetch-time index errors.
pub struct OutOfRangeSampler {
    pub dataset_size: usize,
}

impl Sampler for OutOfRangeSampler {
    fn sample(&self, _epoch: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset_size).collect();
        indices.push(self.dataset_size + 5);
        indices
    }
}
