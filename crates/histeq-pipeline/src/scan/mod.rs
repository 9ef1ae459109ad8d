//! Inclusive prefix sum of a histogram
//!
//! Three interchangeable algorithms produce the same [`CumulativeHistogram`]:
//!
//! - [`ScanAlgorithm::Serial`] - one running accumulator over the whole input
//! - [`ScanAlgorithm::HillisSteele`] - step-doubling, one dispatch per step
//! - [`ScanAlgorithm::Blelloch`] - up-sweep / down-sweep, one dispatch per
//!   tree level
//!
//! The two parallel algorithms scan each block of the backend's
//! [`BlockPlan`] independently, in place in a backend buffer that is
//! downloaded once the scan is complete. When more than one block is used, their
//! totals become [`BlockPartialSums`] and [`combine`] adds each block's
//! offset to finish the global scan.

pub mod blelloch;
pub mod combine;
pub mod hillis_steele;
pub mod serial;

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, ComputeBackend};
use histeq_core::{BinCount, BlockPartialSums, BlockPlan, CumulativeHistogram, ScanAlgorithm};

/// Result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutput {
    /// Inclusive prefix sum
    pub cumulative: CumulativeHistogram,
    /// Per-block totals, present only for a multi-block scan
    pub block_sums: Option<BlockPartialSums>,
    /// Block decomposition used
    pub plan: BlockPlan,
}

/// Compute the cumulative histogram of `histogram`.
///
/// The input is copied; the raw histogram stays intact. Empty and
/// single-bin inputs are returned unchanged.
///
/// # Errors
///
/// Propagates backend failures.
pub fn scan<B: ComputeBackend>(
    backend: &B,
    histogram: &BinCount,
    algorithm: ScanAlgorithm,
) -> PipelineResult<ScanOutput> {
    let input = histogram.as_slice();
    if input.len() <= 1 || algorithm == ScanAlgorithm::Serial {
        return Ok(ScanOutput {
            cumulative: CumulativeHistogram::from_vec(serial::inclusive_scan(input)),
            block_sums: None,
            plan: BlockPlan::single(input.len()),
        });
    }

    let plan = backend.plan(input.len())?;
    let mut buffer = backend.upload_new(input, AccessMode::ReadWrite)?;
    let sums = match algorithm {
        ScanAlgorithm::HillisSteele => {
            hillis_steele::scan_blocks(backend, &plan, buffer.as_mut_slice()?)?
        }
        _ => blelloch::scan_blocks(backend, &plan, buffer.as_mut_slice()?)?,
    };

    let block_sums = if plan.is_single_block() {
        None
    } else {
        combine::add_block_offsets(backend, &plan, buffer.as_mut_slice()?, &sums)?;
        Some(sums)
    };
    let values = backend.download(&buffer)?;

    tracing::debug!(
        %algorithm,
        bins = input.len(),
        blocks = plan.num_blocks(),
        block_size = plan.block_size(),
        "histogram scanned"
    );

    Ok(ScanOutput {
        cumulative: CumulativeHistogram::from_vec(values),
        block_sums,
        plan,
    })
}
