//! Hook plumbing tests: custom collators, padders, and error propagation
//! from failing hooks.

mod common;
use common::index_dataset;

use anyhow::{bail, Result};
use data_batching::{Batcher, BatcherConfig, InMemoryDataset, LongestPadder, StackCollator};

#[test]
fn test_closure_collator_for_non_collatable_elements() -> Result<()> {
    // i64 carries no collate capability, so the hook must be supplied
    // explicitly; Batcher::new would not compile here.
    let dataset = InMemoryDataset::new((1..=10_i64).collect::<Vec<_>>());
    let sum_collator = |samples: Vec<i64>| -> Result<i64> { Ok(samples.into_iter().sum()) };

    let config = BatcherConfig::builder().batch_size(5).build();
    let batcher = Batcher::new_with_collator(dataset, config, sum_collator)?;

    let sums: Vec<i64> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(sums, vec![15, 40]); // 1+..+5, 6+..+10
    Ok(())
}

#[test]
fn test_longest_padder_with_stack_collator() -> Result<()> {
    let dataset = InMemoryDataset::new(vec![
        vec![1_i64, 2, 3],
        vec![4],
        vec![5, 6],
        vec![7, 8, 9],
    ]);
    let config = BatcherConfig::builder().batch_size(2).build();
    let batcher =
        Batcher::new_with_hooks(dataset, config, LongestPadder::new(0_i64), StackCollator)?;

    let batches: Vec<Vec<i64>> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    // Each batch pads to its own maximum, then concatenates
    assert_eq!(batches[0], vec![1, 2, 3, 4, 0, 0]);
    assert_eq!(batches[1], vec![5, 6, 0, 7, 8, 9]);
    Ok(())
}

#[test]
fn test_closure_padder_runs_before_collation() -> Result<()> {
    let dataset = index_dataset(4);
    let doubling_padder = |samples: Vec<Vec<i64>>| -> Result<Vec<Vec<i64>>> {
        Ok(samples
            .into_iter()
            .map(|s| s.into_iter().map(|v| v * 2).collect())
            .collect())
    };

    let config = BatcherConfig::builder().batch_size(2).build();
    let batcher = Batcher::new_with_hooks(dataset, config, doubling_padder, StackCollator)?;

    let batches: Vec<Vec<i64>> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(batches, vec![vec![0, 2], vec![4, 6]]);
    Ok(())
}

#[test]
fn test_failing_collator_poisons_the_iterator() -> Result<()> {
    let dataset = index_dataset(9);
    let picky_collator = |samples: Vec<Vec<i64>>| -> Result<Vec<i64>> {
        let merged: Vec<i64> = samples.into_iter().flatten().collect();
        if merged.contains(&4) {
            bail!("Collation rejected batch containing 4");
        }
        Ok(merged)
    };

    let config = BatcherConfig::builder().batch_size(3).build();
    let batcher = Batcher::new_with_collator(dataset, config, picky_collator)?;

    let mut iter = batcher.iter()?;
    assert_eq!(iter.next().unwrap()?, vec![0, 1, 2]);
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none()); // exhausted after the failure
    Ok(())
}

#[test]
fn test_degenerate_batch_of_one_round_trips() -> Result<()> {
    let dataset = InMemoryDataset::new(vec![vec![7_i64, 8, 9]]);
    let config = BatcherConfig::builder().batch_size(4).build();
    let batcher = Batcher::new(dataset, config)?;

    let batches: Vec<Vec<i64>> = batcher.iter()?.collect::<Result<Vec<_>>>()?;
    assert_eq!(batches, vec![vec![7, 8, 9]]);
    Ok(())
}
