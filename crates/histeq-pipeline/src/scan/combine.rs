//! Block combination pass
//!
//! Turns block-local scans into a global scan. The exclusive prefix of the
//! block totals is computed serially (there are few blocks); adding each
//! block's offset to its elements is one dispatch.

use crate::error::PipelineResult;
use histeq_compute::ComputeBackend;
use histeq_core::{BlockPartialSums, BlockPlan, Error};

/// Add the offset of every preceding block to each block of `values`.
///
/// # Errors
///
/// Returns [`Error::LengthMismatch`] if `sums` does not hold one total per
/// block, and propagates backend failures.
pub fn add_block_offsets<B: ComputeBackend>(
    backend: &B,
    plan: &BlockPlan,
    values: &mut [u64],
    sums: &BlockPartialSums,
) -> PipelineResult<()> {
    if sums.len() != plan.num_blocks() {
        return Err(Error::LengthMismatch {
            expected: plan.num_blocks(),
            actual: sums.len(),
        }
        .into());
    }

    let offsets = sums.exclusive_offsets();
    backend.dispatch_mut("scan_combine", plan, values, |block, chunk| {
        let offset = offsets[block.index];
        if offset != 0 {
            chunk.iter_mut().for_each(|v| *v += offset);
        }
    })?;
    Ok(())
}
