use anyhow::{bail, ensure, Result};

/// The collatable capability: a type that can construct one aggregate value
/// from an ordered sequence of same-typed values.
///
/// For a sequence-like element this is concatenation; for a tensor-like
/// element it would be stacking into a new leading dimension. Element types
/// implementing `Collate` get the default collation hook ([`StackCollator`])
/// for free; everything else must supply an explicit [`Collator`] when the
/// batcher is built.
pub trait Collate: Sized {
    /// Merges an ordered sequence into one aggregate value.
    ///
    /// The input is never empty when driven by the batch iterator;
    /// implementations should still reject an empty sequence.
    fn collate(samples: Vec<Self>) -> Result<Self>;
}

/// Concatenates the inner sequences in order.
///
/// A batch of `k` elements of lengths `l_1..l_k` collates to one element of
/// length `l_1 + ... + l_k`; a single-element batch collates to itself.
impl<T> Collate for Vec<T> {
    fn collate(samples: Vec<Self>) -> Result<Self> {
        ensure!(!samples.is_empty(), "Cannot collate empty sample list");
        Ok(samples.into_iter().flatten().collect())
    }
}

impl Collate for String {
    fn collate(samples: Vec<Self>) -> Result<Self> {
        ensure!(!samples.is_empty(), "Cannot collate empty sample list");
        Ok(samples.concat())
    }
}

/// A `Collator` reduces an ordered batch of raw elements into one
/// aggregated element.
///
/// Closures of type `Fn(Vec<T>) -> Result<T>` implement this trait, so a
/// one-off collation hook needs no dedicated type.
pub trait Collator<T>: Send + Sync {
    fn collate(&self, samples: Vec<T>) -> Result<T>;
}

impl<T, F> Collator<T> for F
where
    F: Fn(Vec<T>) -> Result<T> + Send + Sync,
{
    fn collate(&self, samples: Vec<T>) -> Result<T> {
        self(samples)
    }
}

/// The capability-derived default collator: delegates to the element
/// type's own [`Collate`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackCollator;

impl<T: Collate> Collator<T> for StackCollator {
    fn collate(&self, samples: Vec<T>) -> Result<T> {
        T::collate(samples)
    }
}

/// A `Padder` transforms a raw ordered batch before collation, typically to
/// bring variable-shaped elements to a common shape.
///
/// Closures of type `Fn(Vec<T>) -> Result<Vec<T>>` implement this trait.
pub trait Padder<T>: Send + Sync {
    fn pad(&self, samples: Vec<T>) -> Result<Vec<T>>;
}

impl<T, F> Padder<T> for F
where
    F: Fn(Vec<T>) -> Result<Vec<T>> + Send + Sync,
{
    fn pad(&self, samples: Vec<T>) -> Result<Vec<T>> {
        self(samples)
    }
}

/// The default padder: the identity transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPadder;

impl<T> Padder<T> for IdentityPadder {
    fn pad(&self, samples: Vec<T>) -> Result<Vec<T>> {
        Ok(samples)
    }
}

/// Pads every sequence-valued element in the batch to the longest length
/// present, filling with `pad_value`.
///
/// Already-uniform batches pass through unchanged. Pair with
/// [`StackCollator`] to collate variable-length sequences that would
/// otherwise produce ragged aggregates.
///
/// # Example
/// ```ignore
/// // [[1, 2], [3]] pads to [[1, 2], [3, 0]] with pad_value = 0
/// let padder = LongestPadder::new(0);
/// ```
#[derive(Debug, Clone)]
pub struct LongestPadder<T> {
    pad_value: T,
}

impl<T: Clone + Send + Sync> LongestPadder<T> {
    pub fn new(pad_value: T) -> Self {
        Self { pad_value }
    }
}

impl<T: Clone + Send + Sync> Padder<Vec<T>> for LongestPadder<T> {
    fn pad(&self, mut samples: Vec<Vec<T>>) -> Result<Vec<Vec<T>>> {
        if samples.is_empty() {
            bail!("Cannot pad empty sample list");
        }

        let target_len = samples.iter().map(Vec::len).max().unwrap_or(0);
        for sample in &mut samples {
            sample.resize(target_len, self.pad_value.clone());
        }
        Ok(samples)
    }
}
