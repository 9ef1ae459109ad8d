//! Block planning
//!
//! Splits a data length into whole blocks no wider than what the compute
//! backend can synchronize in one group. The block size is the greatest
//! common divisor of the length and the backend's maximum width, so the
//! last block is never ragged and no kernel needs boundary padding.

use crate::error::{Error, Result};
use std::ops::Range;

/// Partition of `len` elements into `num_blocks` blocks of `block_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPlan {
    len: usize,
    block_size: usize,
    num_blocks: usize,
}

impl BlockPlan {
    /// A single block covering `len` elements.
    pub fn single(len: usize) -> Self {
        Self {
            len,
            block_size: len.max(1),
            num_blocks: usize::from(len > 0),
        }
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the plan covers no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Elements per block.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// True if the data fits in one block and needs no combination pass.
    #[inline]
    pub fn is_single_block(&self) -> bool {
        self.num_blocks <= 1
    }

    /// Element range of block `index`.
    pub fn block_range(&self, index: usize) -> Range<usize> {
        let start = index * self.block_size;
        start..start + self.block_size
    }

    /// Iterate over the element ranges of every block in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        (0..self.num_blocks).map(|i| self.block_range(i))
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Plan blocks for `len` elements on a backend that can synchronize at
/// most `max_block_width` elements per block.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if `max_block_width` is zero.
///
/// # Example
///
/// ```
/// use histeq_core::plan_blocks;
///
/// let plan = plan_blocks(256, 64).unwrap();
/// assert_eq!(plan.block_size(), 64);
/// assert_eq!(plan.num_blocks(), 4);
///
/// // 96 = 32 * 3: the largest common factor with 64 is 32
/// let plan = plan_blocks(96, 64).unwrap();
/// assert_eq!(plan.block_size(), 32);
/// ```
pub fn plan_blocks(len: usize, max_block_width: usize) -> Result<BlockPlan> {
    if max_block_width == 0 {
        return Err(Error::InvalidParameter(
            "max block width must be >= 1".into(),
        ));
    }
    if len == 0 {
        return Ok(BlockPlan {
            len: 0,
            block_size: max_block_width,
            num_blocks: 0,
        });
    }

    let block_size = gcd(len, max_block_width);
    Ok(BlockPlan {
        len,
        block_size,
        num_blocks: len / block_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(256, 1024), 256);
        assert_eq!(gcd(96, 64), 32);
        assert_eq!(gcd(7, 64), 1);
        assert_eq!(gcd(0, 5), 5);
    }

    #[test]
    fn test_fits_in_one_block() {
        let plan = plan_blocks(128, 256).unwrap();
        assert!(plan.is_single_block());
        assert_eq!(plan.block_size(), 128);
        assert_eq!(plan.block_range(0), 0..128);
    }

    #[test]
    fn test_blocks_tile_exactly() {
        for len in [1usize, 2, 3, 32, 96, 100, 255, 256, 1000] {
            for width in [1usize, 4, 16, 64, 256] {
                let plan = plan_blocks(len, width).unwrap();
                assert_eq!(plan.block_size() * plan.num_blocks(), len);
                assert!(plan.block_size() <= width);
                assert_eq!(len % plan.block_size(), 0);
                assert_eq!(width % plan.block_size(), 0);
            }
        }
    }

    #[test]
    fn test_ranges_cover_data() {
        let plan = plan_blocks(12, 4).unwrap();
        let ranges: Vec<_> = plan.ranges().collect();
        assert_eq!(ranges, vec![0..4, 4..8, 8..12]);
    }

    #[test]
    fn test_empty_and_zero_width() {
        let plan = plan_blocks(0, 64).unwrap();
        assert_eq!(plan.num_blocks(), 0);
        assert!(plan.is_empty());
        assert!(plan_blocks(10, 0).is_err());
    }

    #[test]
    fn test_single() {
        let plan = BlockPlan::single(10);
        assert_eq!(plan.num_blocks(), 1);
        assert_eq!(plan.block_size(), 10);
        assert_eq!(BlockPlan::single(0).num_blocks(), 0);
    }
}
