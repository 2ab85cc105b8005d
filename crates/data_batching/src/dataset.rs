use std::sync::Arc;

/// An in-memory dataset: an ordered, finite, randomly-indexable snapshot
/// of elements.
///
/// Elements are stored in a contiguous `Arc<[T]>`, which gives:
/// - Zero-copy clone: cloning only bumps the `Arc` counter, so the same
///   snapshot can be handed to every fetch worker without duplicating data.
/// - Thread-safe sharing: concurrent indexed reads need no locking because
///   the contents are never mutated after construction (`Send + Sync` when
///   `T` is).
///
/// The batching engine only ever reads by index; the snapshot is logically
/// immutable for the lifetime of a pass.
#[derive(Debug)]
pub struct InMemoryDataset<T> {
    items: Arc<[T]>,
}

impl<T> Clone for InMemoryDataset<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> InMemoryDataset<T> {
    /// Creates a new dataset snapshot from a vector of elements.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Random-access lookup by index. Returns `None` when out of bounds.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns the total number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for InMemoryDataset<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}
