//! Deterministic splitting of an index space into contiguous chunks.

use std::ops::Range;

/// Contiguous, disjoint ranges covering `[0, n)`.
///
/// At most `max_chunks` ranges are produced and their lengths differ by at
/// most one: the first `n % n_chunks` ranges hold one extra index. The same
/// `(n, max_chunks)` always yields the same ranges, which is what keeps
/// chunked reductions reproducible.
///
/// ```
/// use turbo_ml::parallel::WorkPartition;
///
/// let p = WorkPartition::new(10, 3);
/// let ranges: Vec<_> = p.iter().collect();
/// assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPartition {
    n: usize,
    n_chunks: usize,
    base: usize,
    remainder: usize,
}

impl WorkPartition {
    /// Partition `[0, n)` into at most `max_chunks` chunks.
    ///
    /// `max_chunks == 0` is treated as 1. An empty index space has no chunks.
    pub fn new(n: usize, max_chunks: usize) -> Self {
        let n_chunks = if n == 0 { 0 } else { max_chunks.max(1).min(n) };
        let (base, remainder) = if n_chunks == 0 {
            (0, 0)
        } else {
            (n / n_chunks, n % n_chunks)
        };
        Self {
            n,
            n_chunks,
            base,
            remainder,
        }
    }

    /// A single chunk spanning everything.
    pub fn single(n: usize) -> Self {
        Self::new(n, 1)
    }

    /// Size of the partitioned index space.
    #[inline]
    pub fn total(&self) -> usize {
        self.n
    }

    /// Number of chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.n_chunks
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_chunks == 0
    }

    /// Range of chunk `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`.
    #[inline]
    pub fn chunk(&self, i: usize) -> Range<usize> {
        assert!(i < self.n_chunks, "chunk {} out of {}", i, self.n_chunks);
        let start = i * self.base + i.min(self.remainder);
        let len = self.base + usize::from(i < self.remainder);
        start..start + len
    }

    /// Iterate over chunk ranges in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Range<usize>> + '_ {
        (0..self.n_chunks).map(move |i| self.chunk(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_space_has_no_chunks() {
        let p = WorkPartition::new(0, 8);
        assert!(p.is_empty());
        assert_eq!(p.iter().count(), 0);
    }

    #[test]
    fn fewer_items_than_chunks() {
        let p = WorkPartition::new(3, 8);
        assert_eq!(p.len(), 3);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn zero_max_chunks_is_one_chunk() {
        let p = WorkPartition::new(5, 0);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![0..5]);
    }

    #[test]
    fn uneven_split_front_loads_remainder() {
        let p = WorkPartition::new(11, 4);
        assert_eq!(p.iter().collect::<Vec<_>>(), vec![0..3, 3..6, 6..9, 9..11]);
    }

    #[test]
    fn single_covers_everything() {
        let p = WorkPartition::single(42);
        assert_eq!(p.len(), 1);
        assert_eq!(p.chunk(0), 0..42);
    }

    #[test]
    #[should_panic]
    fn chunk_out_of_range_panics() {
        WorkPartition::new(4, 2).chunk(2);
    }
}
