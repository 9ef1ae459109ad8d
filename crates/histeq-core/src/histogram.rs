//! Histogram containers produced by the pipeline stages
//!
//! - [`BinCount`] - raw per-bin pixel counts
//! - [`CumulativeHistogram`] - inclusive running totals of a [`BinCount`]
//! - [`BlockPartialSums`] - one pre-scan total per scan block
//! - [`HistogramExtrema`] - minimum non-zero and maximum cumulative value
//! - [`NormalizedHistogram`] - cumulative values rescaled to output intensities
//!
//! Counts are kept in `u64` so that the totals of very large images can
//! never overflow the accumulator.

use crate::error::{Error, Result};

/// Raw per-bin sample counts.
///
/// Invariant for a histogram produced by binning: the sum of all bins
/// equals the number of samples that were binned.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinCount {
    counts: Vec<u64>,
}

impl BinCount {
    /// Create a histogram of `bins` empty bins.
    pub fn zeros(bins: usize) -> Self {
        Self {
            counts: vec![0; bins],
        }
    }

    /// Wrap existing counts.
    pub fn from_vec(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if there are no bins.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count in `bin`, or `None` when out of range.
    pub fn get(&self, bin: usize) -> Option<u64> {
        self.counts.get(bin).copied()
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Counts as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }

    /// Counts as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [u64] {
        &mut self.counts
    }

    /// Iterate over the counts in bin order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.iter().copied()
    }

    /// Consume and return the underlying vector.
    pub fn into_vec(self) -> Vec<u64> {
        self.counts
    }
}

impl std::ops::Index<usize> for BinCount {
    type Output = u64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.counts[index]
    }
}

/// Inclusive prefix sum of a [`BinCount`].
///
/// Invariant: non-decreasing, and the last entry equals the total
/// number of binned samples.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CumulativeHistogram {
    values: Vec<u64>,
}

impl CumulativeHistogram {
    /// Wrap already-scanned values without checking monotonicity.
    pub fn from_vec(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Wrap scanned values, rejecting a sequence that decreases anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first decreasing index.
    pub fn try_from_vec(values: Vec<u64>) -> Result<Self> {
        if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::InvalidParameter(format!(
                "cumulative histogram decreases at index {}",
                i + 1
            )));
        }
        Ok(Self { values })
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no bins.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `bin`, or `None` when out of range.
    pub fn get(&self, bin: usize) -> Option<u64> {
        self.values.get(bin).copied()
    }

    /// Last entry: the total number of samples, or `None` when empty.
    pub fn last(&self) -> Option<u64> {
        self.values.last().copied()
    }

    /// True if no entry is smaller than its predecessor.
    pub fn is_non_decreasing(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    /// True if `bin` received no samples, i.e. its value equals that of
    /// the previous bin (or is zero for the first bin).
    pub fn is_empty_bin(&self, bin: usize) -> bool {
        let current = self.values[bin];
        if bin == 0 {
            current == 0
        } else {
            current == self.values[bin - 1]
        }
    }

    /// Recover the per-bin counts by differencing adjacent entries.
    pub fn to_bin_count(&self) -> BinCount {
        let mut prev = 0u64;
        let counts = self
            .values
            .iter()
            .map(|&v| {
                let c = v.saturating_sub(prev);
                prev = v;
                c
            })
            .collect();
        BinCount::from_vec(counts)
    }

    /// Values as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.values
    }

    /// Iterate over the values in bin order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.values.iter().copied()
    }

    /// Consume and return the underlying vector.
    pub fn into_vec(self) -> Vec<u64> {
        self.values
    }
}

impl std::ops::Index<usize> for CumulativeHistogram {
    type Output = u64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

/// Pre-scan totals of each scan block, in block order.
///
/// Only produced when the histogram spans more than one block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockPartialSums {
    sums: Vec<u64>,
}

impl BlockPartialSums {
    /// Wrap per-block totals.
    pub fn from_vec(sums: Vec<u64>) -> Self {
        Self { sums }
    }

    /// Number of blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// True if there are no blocks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Totals as a slice.
    pub fn as_slice(&self) -> &[u64] {
        &self.sums
    }

    /// Exclusive prefix sum of the block totals: the offset that must be
    /// added to every element of each block's local scan.
    ///
    /// The number of blocks is small, so this runs serially.
    pub fn exclusive_offsets(&self) -> Vec<u64> {
        let mut running = 0u64;
        self.sums
            .iter()
            .map(|&s| {
                let offset = running;
                running += s;
                offset
            })
            .collect()
    }
}

/// Minimum non-zero and maximum value of a cumulative histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramExtrema {
    /// Smallest non-zero cumulative value
    pub min_non_zero: u64,
    /// Largest cumulative value (the last entry)
    pub max: u64,
}

impl HistogramExtrema {
    /// Both extrema divided by the same pre-scaling divisor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `divisor` is zero.
    pub fn scaled(&self, divisor: u64) -> Result<Self> {
        if divisor == 0 {
            return Err(Error::InvalidParameter("divisor must be >= 1".into()));
        }
        Ok(Self {
            min_non_zero: self.min_non_zero / divisor,
            max: self.max / divisor,
        })
    }

    /// True if the normalization range collapses to a single value.
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min_non_zero
    }
}

/// Cumulative histogram rescaled into the output intensity range.
///
/// Every value lies in `[0, levels - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedHistogram {
    values: Vec<u32>,
}

impl NormalizedHistogram {
    /// Wrap normalized values.
    pub fn from_vec(values: Vec<u32>) -> Self {
        Self { values }
    }

    /// Number of bins.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no bins.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `bin`, or `None` when out of range.
    pub fn get(&self, bin: usize) -> Option<u32> {
        self.values.get(bin).copied()
    }

    /// Values as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    /// Iterate over the values in bin order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.iter().copied()
    }

    /// Consume and return the underlying vector.
    pub fn into_vec(self) -> Vec<u32> {
        self.values
    }
}

impl std::ops::Index<usize> for NormalizedHistogram {
    type Output = u32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}
