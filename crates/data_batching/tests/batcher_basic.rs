//! Basic batching tests: batch sizing, drop-last, determinism, thread
//! limits, and error propagation from bad samplers.

mod common;
use common::{index_dataset, OutOfRangeSampler};

use anyhow::Result;
use data_batching::{Batcher, BatcherConfig, SubsetRandomSampler};
use std::collections::HashSet;

#[test]
fn test_batch_sizes_with_partial_tail() -> Result<()> {
    let config = BatcherConfig::builder().batch_size(3).build();
    let batcher = Batcher::new(index_dataset(10), config)?;
    assert_eq!(batcher.count(), 4);

    let batches: Vec<_> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);

    // Sequential order: elements appear exactly as indexed
    assert_eq!(batches[0], vec![0, 1, 2]);
    assert_eq!(batches[3], vec![9]);
    Ok(())
}

#[test]
fn test_drop_last_discards_partial_tail() -> Result<()> {
    let config = BatcherConfig::builder().batch_size(3).drop_last(true).build();
    let batcher = Batcher::new(index_dataset(10), config)?;
    assert_eq!(batcher.count(), 3);

    let batches: Vec<_> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() == 3));

    // The trailing element never reaches the caller
    let seen: Vec<i64> = batches.into_iter().flatten().collect();
    assert_eq!(seen, (0..9).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_unshuffled_passes_are_identical() -> Result<()> {
    let config = BatcherConfig::builder().batch_size(4).build();
    let batcher = Batcher::new(index_dataset(11), config)?;

    let first: Vec<_> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    let second: Vec<_> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_count_matches_observed_batches() -> Result<()> {
    for (n, batch_size, drop_last) in [
        (10, 3, false),
        (10, 3, true),
        (12, 4, false),
        (12, 4, true),
        (1, 5, false),
        (1, 5, true),
        (0, 2, false),
    ] {
        let config = BatcherConfig::builder()
            .batch_size(batch_size)
            .drop_last(drop_last)
            .build();
        let batcher = Batcher::new(index_dataset(n), config)?;

        let iter = batcher.iter()?;
        assert_eq!(iter.size_hint(), (batcher.count(), Some(batcher.count())));

        let observed = iter.collect::<Result<Vec<_>>>()?.len();
        assert_eq!(
            observed,
            batcher.count(),
            "n={}, batch_size={}, drop_last={}",
            n,
            batch_size,
            drop_last
        );
    }
    Ok(())
}

#[test]
fn test_threads_limit_does_not_change_output() -> Result<()> {
    let baseline_config = BatcherConfig::builder().batch_size(8).build();
    let baseline: Vec<_> = Batcher::new(index_dataset(50), baseline_config)?
        .iter()?
        .collect::<Result<Vec<_>>>()?;

    for limit in [1, 3, 8, 100] {
        let config = BatcherConfig::builder()
            .batch_size(8)
            .threads_limit(limit)
            .build();
        let batches: Vec<_> = Batcher::new(index_dataset(50), config)?
            .iter()?
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(batches, baseline, "threads_limit={}", limit);
    }
    Ok(())
}

#[test]
fn test_subset_sampler_yields_partial_pass() -> Result<()> {
    let dataset = index_dataset(20);
    let sampler = SubsetRandomSampler::new(dataset.len(), vec![2, 5, 7, 11], 42)?;
    let config = BatcherConfig::builder().batch_size(2).build();
    let batcher = Batcher::new_with_sampler(dataset, sampler, config)?;

    let batches: Vec<_> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(batches.len(), 2);

    let seen: HashSet<i64> = batches.into_iter().flatten().collect();
    assert_eq!(seen, HashSet::from([2, 5, 7, 11]));
    Ok(())
}

#[test]
fn test_out_of_range_index_surfaces_as_error() -> Result<()> {
    let dataset = index_dataset(6);
    let sampler = OutOfRangeSampler { dataset_size: 6 };
    let config = BatcherConfig::builder().batch_size(7).build();
    let batcher = Batcher::new_with_sampler(dataset, sampler, config)?;

    let mut iter = batcher.iter()?;
    let err = iter.next().expect("one item expected").unwrap_err();
    assert!(err.to_string().contains("out of bounds"));

    // The iterator is poisoned after the failure
    assert!(iter.next().is_none());
    Ok(())
}

#[test]
fn test_empty_dataset_yields_no_batches() -> Result<()> {
    let config = BatcherConfig::builder().batch_size(4).build();
    let batcher = Batcher::new(index_dataset(0), config)?;
    assert_eq!(batcher.iter()?.count(), 0);
    Ok(())
}

#[test]
fn test_string_elements_use_capability_default() -> Result<()> {
    let dataset = data_batching::InMemoryDataset::new(vec![
        "a".to_string(),
        "b".to_string(),
        "c".to_string(),
        "d".to_string(),
        "e".to_string(),
    ]);
    let config = BatcherConfig::builder().batch_size(2).build();
    let batcher = Batcher::new(dataset, config)?;

    let batches: Vec<String> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(batches, vec!["ab", "cd", "e"]);
    Ok(())
}
