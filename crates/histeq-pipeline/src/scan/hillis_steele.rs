//! Hillis-Steele step-doubling scan
//!
//! For `offset = 1, 2, 4, ...` below the block size, every element whose
//! index within its block is at least `offset` adds the element `offset`
//! places to its left. Each step reads the previous snapshot of a
//! [`DoubleBuffer`] and writes the next one, and each step is its own
//! dispatch, so no element is read after it was overwritten in the same
//! step.
//!
//! O(n log n) additions, O(log n) steps.

use crate::error::PipelineResult;
use histeq_compute::{ComputeBackend, DoubleBuffer};
use histeq_core::{BlockPartialSums, BlockPlan};

/// Scan every block of `plan` independently, in place.
///
/// Returns each block's total.
pub fn scan_blocks<B: ComputeBackend>(
    backend: &B,
    plan: &BlockPlan,
    values: &mut [u64],
) -> PipelineResult<BlockPartialSums> {
    let mut state = DoubleBuffer::new(values.to_vec());
    let width = plan.block_size();

    let mut offset = 1;
    while offset < width {
        let (prev, next) = state.split();
        backend.dispatch_mut("scan_hillis_steele", plan, next, move |block, out| {
            for (local, slot) in out.iter_mut().enumerate() {
                let i = block.offset + local;
                *slot = if local >= offset {
                    prev[i] + prev[i - offset]
                } else {
                    prev[i]
                };
            }
        })?;
        state.swap();
        offset <<= 1;
    }

    tracing::trace!(steps = state.generation(), width, "hillis-steele steps done");

    values.copy_from_slice(state.front());
    let sums = plan.ranges().map(|r| values[r.end - 1]).collect();
    Ok(BlockPartialSums::from_vec(sums))
}
