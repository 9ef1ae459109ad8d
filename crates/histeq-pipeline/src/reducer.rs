//! Minimum-finding reduction
//!
//! Finds the extrema used to normalize a cumulative histogram: the smallest
//! non-zero entry and the last entry. Zero entries are ignored so that
//! leading empty bins do not pin the minimum at 0.

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, ComputeBackend};
use histeq_core::{CumulativeHistogram, Error, ExecutionMode, HistogramExtrema, plan_blocks};

/// First non-zero entry, scanning left to right.
///
/// A cumulative histogram is non-decreasing, so this is also its smallest
/// non-zero entry.
///
/// # Errors
///
/// Returns [`Error::AllZeroHistogram`] if every entry is zero or the
/// histogram is empty.
pub fn min_non_zero_serial(cumulative: &CumulativeHistogram) -> histeq_core::Result<u64> {
    cumulative
        .iter()
        .find(|&v| v != 0)
        .ok_or(Error::AllZeroHistogram)
}

/// Tree-style minimum over the non-zero entries.
///
/// Zero entries count as `u64::MAX`. The working buffer is padded to a
/// power of two, and level `k` folds each pair of nodes `2^k` apart in one
/// dispatch, so there is one barrier per tree level.
///
/// # Errors
///
/// Returns [`Error::AllZeroHistogram`] if every entry is zero or the
/// histogram is empty, and propagates backend failures.
pub fn min_non_zero_parallel<B: ComputeBackend>(
    backend: &B,
    cumulative: &CumulativeHistogram,
) -> PipelineResult<u64> {
    if cumulative.is_empty() {
        return Err(Error::AllZeroHistogram.into());
    }

    let padded = cumulative.len().next_power_of_two();
    let leaves: Vec<u64> = cumulative
        .iter()
        .map(|v| if v == 0 { u64::MAX } else { v })
        .chain(std::iter::repeat(u64::MAX))
        .take(padded)
        .collect();
    let mut tree = backend.upload_new(&leaves, AccessMode::ReadWrite)?;

    let mut stride = 1;
    while stride < padded {
        let plan = plan_blocks(padded, 2 * stride)?;
        backend.dispatch_mut("reduce_min", &plan, tree.as_mut_slice()?, move |_, node| {
            if node[stride] < node[0] {
                node[0] = node[stride];
            }
        })?;
        stride <<= 1;
    }

    match backend.download(&tree)?.first().copied() {
        Some(u64::MAX) | None => Err(Error::AllZeroHistogram.into()),
        Some(min) => Ok(min),
    }
}

/// Extrema of `cumulative` with the selected execution mode.
///
/// # Errors
///
/// Returns [`Error::AllZeroHistogram`] for an empty or all-zero histogram.
pub fn extrema<B: ComputeBackend>(
    backend: &B,
    cumulative: &CumulativeHistogram,
    mode: ExecutionMode,
) -> PipelineResult<HistogramExtrema> {
    let min_non_zero = match mode {
        ExecutionMode::Serial => min_non_zero_serial(cumulative)?,
        ExecutionMode::Parallel => min_non_zero_parallel(backend, cumulative)?,
    };
    let max = cumulative.last().ok_or(Error::AllZeroHistogram)?;
    Ok(HistogramExtrema { min_non_zero, max })
}
