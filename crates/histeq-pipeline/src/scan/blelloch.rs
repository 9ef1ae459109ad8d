//! Blelloch work-efficient scan
//!
//! Every block is laid out in a working tree buffer, zero-padded to the
//! next power of two. The up-sweep builds a reduction tree in place; each
//! block's root is its total. The roots are then cleared and the down-sweep
//! turns every tree into an exclusive scan. Adding the input back gives the
//! inclusive scan.
//!
//! O(n) additions, 2 log n levels. Each tree level is one dispatch over
//! nodes `2 * stride` wide. Such a node never straddles two blocks because
//! the padded block width is a multiple of it.

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, AtomicCounters, ComputeBackend};
use histeq_core::{BlockPartialSums, BlockPlan, plan_blocks};

const KERNEL: &str = "scan_blelloch";

/// Scan every block of `plan` independently, in place.
///
/// Returns each block's total.
pub fn scan_blocks<B: ComputeBackend>(
    backend: &B,
    plan: &BlockPlan,
    values: &mut [u64],
) -> PipelineResult<BlockPartialSums> {
    let width = plan.block_size();
    let padded = width.next_power_of_two();

    let mut leaves = vec![0u64; plan.num_blocks() * padded];
    for (index, range) in plan.ranges().enumerate() {
        leaves[index * padded..index * padded + width].copy_from_slice(&values[range]);
    }
    let mut tree = backend.upload_new(&leaves, AccessMode::ReadWrite)?;
    let trees = plan_blocks(leaves.len(), padded)?;

    // up-sweep
    let mut stride = 1;
    while stride < padded {
        let level = plan_blocks(leaves.len(), 2 * stride)?;
        backend.dispatch_mut(KERNEL, &level, tree.as_mut_slice()?, move |_, node| {
            node[2 * stride - 1] += node[stride - 1];
        })?;
        stride <<= 1;
    }

    let totals = AtomicCounters::new(plan.num_blocks());
    backend.dispatch_mut(KERNEL, &trees, tree.as_mut_slice()?, |block, node| {
        totals.fetch_add(block.index, node[padded - 1]);
        node[padded - 1] = 0;
    })?;

    // down-sweep
    let mut stride = padded / 2;
    while stride > 0 {
        let level = plan_blocks(leaves.len(), 2 * stride)?;
        backend.dispatch_mut(KERNEL, &level, tree.as_mut_slice()?, move |_, node| {
            let left = node[stride - 1];
            node[stride - 1] = node[2 * stride - 1];
            node[2 * stride - 1] += left;
        })?;
        stride >>= 1;
    }

    let exclusive = tree.as_slice();
    backend.dispatch_mut(KERNEL, plan, values, |block, chunk| {
        let start = block.index * padded;
        for (value, prefix) in chunk.iter_mut().zip(&exclusive[start..start + padded]) {
            *value += prefix;
        }
    })?;

    Ok(BlockPartialSums::from_vec(totals.into_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use histeq_compute::CpuBackend;

    fn scan_one(input: &[u64]) -> (Vec<u64>, Vec<u64>) {
        let backend = CpuBackend::with_max_block_width(input.len()).unwrap();
        let plan = backend.plan(input.len()).unwrap();
        let mut values = input.to_vec();
        let sums = scan_blocks(&backend, &plan, &mut values).unwrap();
        (values, sums.as_slice().to_vec())
    }

    #[test]
    fn test_power_of_two_block() {
        let (values, sums) = scan_one(&[3, 1, 7, 0, 4, 1, 6, 3]);
        assert_eq!(values, vec![3, 4, 11, 11, 15, 16, 22, 25]);
        assert_eq!(sums, vec![25]);
    }

    #[test]
    fn test_padded_block() {
        let (values, sums) = scan_one(&[1, 2, 3, 4, 5]);
        assert_eq!(values, vec![1, 3, 6, 10, 15]);
        assert_eq!(sums, vec![15]);

        let (values, sums) = scan_one(&[7]);
        assert_eq!(values, vec![7]);
        assert_eq!(sums, vec![7]);
    }

    #[test]
    fn test_block_totals() {
        let backend = CpuBackend::with_max_block_width(6).unwrap();
        let input: Vec<u64> = (1..=12).collect();
        let plan = backend.plan(input.len()).unwrap();
        assert_eq!(plan.block_size(), 6);
        let mut values = input.clone();
        let sums = scan_blocks(&backend, &plan, &mut values).unwrap();
        assert_eq!(sums.as_slice(), &[21, 57]);
        assert_eq!(&values[..6], &[1, 3, 6, 10, 15, 21]);
        assert_eq!(&values[6..], &[7, 15, 24, 34, 45, 57]);
    }
}
