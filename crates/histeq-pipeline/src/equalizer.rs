//! Back-projection of the normalized histogram onto the samples
//!
//! Every output sample is `normalized[bin(sample)]`. The map is
//! element-wise, so the parallel variant is a single dispatch over sample
//! blocks.

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, ComputeBackend};
use histeq_core::{
    BinLayout, Error, ExecutionMode, NormalizedHistogram, OutputSampleSequence, Result, Sample,
};

fn check_len(normalized: &NormalizedHistogram, layout: &BinLayout) -> Result<()> {
    if normalized.len() != layout.len() {
        return Err(Error::LengthMismatch {
            expected: layout.len(),
            actual: normalized.len(),
        });
    }
    Ok(())
}

/// Map every sample through `normalized` on the calling thread.
///
/// # Errors
///
/// Returns [`Error::LengthMismatch`] if `normalized` does not match the
/// layout.
pub fn equalize_serial(
    samples: &[Sample],
    normalized: &NormalizedHistogram,
    layout: &BinLayout,
) -> Result<OutputSampleSequence> {
    check_len(normalized, layout)?;
    let lut = normalized.as_slice();
    let out = samples
        .iter()
        .map(|&s| lut[layout.bin_of(s)] as Sample)
        .collect();
    Ok(OutputSampleSequence::from_vec(out))
}

/// Map every sample through `normalized` with one dispatch.
///
/// Samples and table go up as read-only buffers; the output buffer is
/// write-only and downloaded after the dispatch joins.
///
/// # Errors
///
/// As for [`equalize_serial`], plus backend failures.
pub fn equalize_parallel<B: ComputeBackend>(
    backend: &B,
    samples: &[Sample],
    normalized: &NormalizedHistogram,
    layout: &BinLayout,
) -> PipelineResult<OutputSampleSequence> {
    check_len(normalized, layout)?;
    let input = backend.upload_new(samples, AccessMode::ReadOnly)?;
    let table = backend.upload_new(normalized.as_slice(), AccessMode::ReadOnly)?;
    let mut output = backend.allocate::<Sample>(samples.len(), AccessMode::WriteOnly)?;

    let (input, lut) = (input.as_slice(), table.as_slice());
    let plan = backend.plan(input.len())?;
    backend.dispatch_mut("equalize", &plan, output.as_mut_slice()?, |block, chunk| {
        for (o, &s) in chunk.iter_mut().zip(&input[block.range()]) {
            *o = lut[layout.bin_of(s)] as Sample;
        }
    })?;
    Ok(OutputSampleSequence::from_vec(backend.download(&output)?))
}

/// Map every sample with the selected execution mode.
pub fn equalize<B: ComputeBackend>(
    backend: &B,
    samples: &[Sample],
    normalized: &NormalizedHistogram,
    layout: &BinLayout,
    mode: ExecutionMode,
) -> PipelineResult<OutputSampleSequence> {
    match mode {
        ExecutionMode::Serial => Ok(equalize_serial(samples, normalized, layout)?),
        ExecutionMode::Parallel => equalize_parallel(backend, samples, normalized, layout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histeq_compute::CpuBackend;
    use histeq_test::synthetic::random_samples;

    #[test]
    fn test_example_mapping() {
        let layout = BinLayout::new(4, 256).unwrap();
        let lut = NormalizedHistogram::from_vec(vec![0, 51, 0, 255]);
        let out = equalize_serial(&[10, 100, 200, 255, 5], &lut, &layout).unwrap();
        assert_eq!(out.as_slice(), &[0, 51, 255, 255, 0]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let layout = BinLayout::new(32, 256).unwrap();
        let lut = NormalizedHistogram::from_vec((0..32).map(|i| 255 - i * 8).collect());
        let samples = random_samples(4099, 256, 5);
        let serial = equalize_serial(&samples, &lut, &layout).unwrap();
        for width in [1, 16, 256] {
            let backend = CpuBackend::with_max_block_width(width).unwrap();
            let parallel = equalize_parallel(&backend, &samples, &lut, &layout).unwrap();
            assert_eq!(parallel, serial);
        }
    }

    #[test]
    fn test_length_mismatch() {
        let layout = BinLayout::new(4, 256).unwrap();
        let lut = NormalizedHistogram::from_vec(vec![0, 1]);
        assert!(equalize_serial(&[1], &lut, &layout).is_err());
    }
}
