//! Histogram binning
//!
//! Counts how many samples fall into each bin of a [`BinLayout`].
//!
//! The parallel variant follows the workgroup pattern: every block builds a
//! private histogram and folds it into the shared [`AtomicCounters`] once.
//! Blocks shorter than the histogram increment the shared counters
//! directly, since a private copy would cost more than it saves.

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, AtomicCounters, ComputeBackend};
use histeq_core::{BinCount, BinLayout, ExecutionMode, Sample};

/// Count samples per bin on the calling thread.
///
/// # Example
///
/// ```
/// use histeq_core::BinLayout;
/// use histeq_pipeline::binner::bin_serial;
///
/// let layout = BinLayout::new(4, 256).unwrap();
/// let hist = bin_serial(&[10, 10, 100, 200, 200, 200, 255, 5], &layout);
/// assert_eq!(hist.as_slice(), &[3, 1, 0, 4]);
/// ```
pub fn bin_serial(samples: &[Sample], layout: &BinLayout) -> BinCount {
    let mut hist = BinCount::zeros(layout.len());
    let counts = hist.as_mut_slice();
    for &sample in samples {
        counts[layout.bin_of(sample)] += 1;
    }
    hist
}

/// Count samples per bin with one dispatch over sample blocks.
///
/// The samples are uploaded to a read-only backend buffer first.
///
/// # Errors
///
/// Propagates backend failures.
pub fn bin_parallel<B: ComputeBackend>(
    backend: &B,
    samples: &[Sample],
    layout: &BinLayout,
) -> PipelineResult<BinCount> {
    let bins = layout.len();
    let input = backend.upload_new(samples, AccessMode::ReadOnly)?;
    let input = input.as_slice();
    let counters = AtomicCounters::new(bins);
    let plan = backend.plan(input.len())?;

    let done = backend.dispatch("histogram", &plan, |block| {
        let slice = &input[block.range()];
        if slice.len() < bins {
            for &sample in slice {
                counters.fetch_add(layout.bin_of(sample), 1);
            }
        } else {
            let mut local = vec![0u64; bins];
            for &sample in slice {
                local[layout.bin_of(sample)] += 1;
            }
            counters.merge(&local);
        }
    })?;

    tracing::debug!(
        samples = samples.len(),
        bins,
        blocks = done.blocks,
        block_size = plan.block_size(),
        "histogram binned"
    );
    Ok(BinCount::from_vec(counters.into_vec()))
}

/// Count samples per bin with the selected execution mode.
///
/// Both modes produce identical counts.
pub fn bin<B: ComputeBackend>(
    backend: &B,
    samples: &[Sample],
    layout: &BinLayout,
    mode: ExecutionMode,
) -> PipelineResult<BinCount> {
    match mode {
        ExecutionMode::Serial => Ok(bin_serial(samples, layout)),
        ExecutionMode::Parallel => bin_parallel(backend, samples, layout),
    }
}
