//! Cumulative histogram normalization
//!
//! Rescales a cumulative histogram into `[0, levels - 1]`:
//!
//! ```text
//! t   = (C[i]/d - min/d) / (max/d - min/d)
//! out = round(t * (levels - 1))
//! ```
//!
//! where `d` is the pre-scaling divisor, applied to all three terms alike.
//! Bin 0 and every empty bin (`C[i] == C[i - 1]`) map to 0.
//!
//! A collapsed range (`max/d == min/d`, or no extrema at all) is never
//! divided by; the [`DegeneratePolicy`] decides the mapping instead.

use crate::error::PipelineResult;
use histeq_compute::{AccessMode, ComputeBackend};
use histeq_core::{
    BinLayout, CumulativeHistogram, DegeneratePolicy, EqualizeOptions, Error, ExecutionMode,
    HistogramExtrema, NormalizedHistogram, Result,
};

/// Normalization parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    layout: BinLayout,
    divisor: u64,
    policy: DegeneratePolicy,
}

/// Effective normalization range after pre-scaling.
#[derive(Debug, Clone, Copy)]
enum Range {
    Stretch { min: u64, span: u64 },
    Degenerate,
}

impl Normalizer {
    /// Create a normalizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `divisor` is zero.
    pub fn new(layout: BinLayout, divisor: u64, policy: DegeneratePolicy) -> Result<Self> {
        if divisor == 0 {
            return Err(Error::InvalidParameter("count divisor must be >= 1".into()));
        }
        Ok(Self {
            layout,
            divisor,
            policy,
        })
    }

    /// Create a normalizer from pipeline options.
    pub fn from_options(options: &EqualizeOptions, layout: BinLayout) -> Result<Self> {
        Self::new(layout, options.count_divisor, options.degenerate)
    }

    /// Bin layout being normalized.
    pub fn layout(&self) -> &BinLayout {
        &self.layout
    }

    fn range(&self, extrema: Option<HistogramExtrema>) -> Result<Range> {
        let Some(extrema) = extrema else {
            return Ok(Range::Degenerate);
        };
        let scaled = extrema.scaled(self.divisor)?;
        if scaled.is_degenerate() {
            Ok(Range::Degenerate)
        } else {
            Ok(Range::Stretch {
                min: scaled.min_non_zero,
                span: scaled.max - scaled.min_non_zero,
            })
        }
    }

    #[inline]
    fn value(&self, bin: usize, cumulative: &[u64], range: Range) -> u32 {
        match range {
            Range::Degenerate => match self.policy {
                DegeneratePolicy::PassThrough => self.layout.bin_floor(bin),
                DegeneratePolicy::Flat => 0,
            },
            Range::Stretch { min, span } => {
                if bin == 0 || cumulative[bin] == cumulative[bin - 1] {
                    return 0;
                }
                let scaled = (cumulative[bin] / self.divisor).saturating_sub(min);
                let top = self.layout.max_intensity();
                let t = scaled as f64 / span as f64;
                ((t * top as f64).round() as u32).min(top)
            }
        }
    }

    fn check_len(&self, cumulative: &CumulativeHistogram) -> Result<()> {
        if cumulative.len() != self.layout.len() {
            return Err(Error::LengthMismatch {
                expected: self.layout.len(),
                actual: cumulative.len(),
            });
        }
        Ok(())
    }

    fn note_degenerate(&self, range: Range, extrema: Option<HistogramExtrema>) {
        if let Range::Degenerate = range {
            tracing::warn!(
                ?extrema,
                divisor = self.divisor,
                policy = ?self.policy,
                "normalization range collapsed"
            );
        }
    }

    /// Normalize on the calling thread.
    ///
    /// `extrema` is `None` when the histogram was all zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `cumulative` does not match the
    /// layout.
    pub fn serial(
        &self,
        cumulative: &CumulativeHistogram,
        extrema: Option<HistogramExtrema>,
    ) -> Result<NormalizedHistogram> {
        self.check_len(cumulative)?;
        let range = self.range(extrema)?;
        self.note_degenerate(range, extrema);

        let values = cumulative.as_slice();
        let out = (0..values.len())
            .map(|bin| self.value(bin, values, range))
            .collect();
        Ok(NormalizedHistogram::from_vec(out))
    }

    /// Normalize with one dispatch over the bins.
    ///
    /// # Errors
    ///
    /// As for [`Normalizer::serial`], plus backend failures.
    pub fn parallel<B: ComputeBackend>(
        &self,
        backend: &B,
        cumulative: &CumulativeHistogram,
        extrema: Option<HistogramExtrema>,
    ) -> PipelineResult<NormalizedHistogram> {
        self.check_len(cumulative)?;
        let range = self.range(extrema)?;
        self.note_degenerate(range, extrema);

        let input = backend.upload_new(cumulative.as_slice(), AccessMode::ReadOnly)?;
        let mut output = backend.allocate::<u32>(input.len(), AccessMode::WriteOnly)?;
        let values = input.as_slice();
        let plan = backend.plan(values.len())?;
        backend.dispatch_mut("normalize", &plan, output.as_mut_slice()?, |block, chunk| {
            for (slot, bin) in chunk.iter_mut().zip(block.range()) {
                *slot = self.value(bin, values, range);
            }
        })?;
        Ok(NormalizedHistogram::from_vec(backend.download(&output)?))
    }

    /// Normalize with the selected execution mode.
    pub fn normalize<B: ComputeBackend>(
        &self,
        backend: &B,
        cumulative: &CumulativeHistogram,
        extrema: Option<HistogramExtrema>,
        mode: ExecutionMode,
    ) -> PipelineResult<NormalizedHistogram> {
        match mode {
            ExecutionMode::Serial => Ok(self.serial(cumulative, extrema)?),
            ExecutionMode::Parallel => self.parallel(backend, cumulative, extrema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use histeq_compute::CpuBackend;

    fn example() -> (Normalizer, CumulativeHistogram, HistogramExtrema) {
        let layout = BinLayout::new(4, 256).unwrap();
        let normalizer = Normalizer::new(layout, 1, DegeneratePolicy::PassThrough).unwrap();
        let cumulative = CumulativeHistogram::from_vec(vec![3, 4, 4, 8]);
        let extrema = HistogramExtrema {
            min_non_zero: 3,
            max: 8,
        };
        (normalizer, cumulative, extrema)
    }

    #[test]
    fn test_example_values() {
        let (normalizer, cumulative, extrema) = example();
        let out = normalizer.serial(&cumulative, Some(extrema)).unwrap();
        assert_eq!(out.as_slice(), &[0, 51, 0, 255]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (normalizer, cumulative, extrema) = example();
        let backend = CpuBackend::with_max_block_width(2).unwrap();
        let parallel = normalizer
            .parallel(&backend, &cumulative, Some(extrema))
            .unwrap();
        assert_eq!(parallel, normalizer.serial(&cumulative, Some(extrema)).unwrap());
    }

    #[test]
    fn test_degenerate_pass_through() {
        let layout = BinLayout::new(4, 256).unwrap();
        let normalizer = Normalizer::new(layout, 1, DegeneratePolicy::PassThrough).unwrap();
        let cumulative = CumulativeHistogram::from_vec(vec![0, 0, 5, 5]);
        let extrema = HistogramExtrema {
            min_non_zero: 5,
            max: 5,
        };
        let out = normalizer.serial(&cumulative, Some(extrema)).unwrap();
        assert_eq!(out.as_slice(), &[0, 64, 128, 192]);
    }

    #[test]
    fn test_degenerate_flat_and_all_zero() {
        let layout = BinLayout::new(4, 256).unwrap();
        let normalizer = Normalizer::new(layout, 1, DegeneratePolicy::Flat).unwrap();
        let cumulative = CumulativeHistogram::from_vec(vec![0; 4]);
        let out = normalizer.serial(&cumulative, None).unwrap();
        assert_eq!(out.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_divisor_is_symmetric() {
        let layout = BinLayout::new(4, 256).unwrap();
        let normalizer = Normalizer::new(layout, 10, DegeneratePolicy::PassThrough).unwrap();
        let cumulative = CumulativeHistogram::from_vec(vec![30, 40, 40, 80]);
        let extrema = HistogramExtrema {
            min_non_zero: 30,
            max: 80,
        };
        let out = normalizer.serial(&cumulative, Some(extrema)).unwrap();
        assert_eq!(out.as_slice(), &[0, 51, 0, 255]);
    }

    #[test]
    fn test_divisor_collapsing_range_is_degenerate() {
        let layout = BinLayout::new(4, 256).unwrap();
        let normalizer = Normalizer::new(layout, 100, DegeneratePolicy::Flat).unwrap();
        let cumulative = CumulativeHistogram::from_vec(vec![3, 4, 4, 8]);
        let extrema = HistogramExtrema {
            min_non_zero: 3,
            max: 8,
        };
        let out = normalizer.serial(&cumulative, Some(extrema)).unwrap();
        assert!(out.iter().all(|v| v == 0));
    }

    #[test]
    fn test_rejects_bad_input() {
        let layout = BinLayout::new(4, 256).unwrap();
        assert!(Normalizer::new(layout, 0, DegeneratePolicy::Flat).is_err());
        let normalizer = Normalizer::new(layout, 1, DegeneratePolicy::Flat).unwrap();
        let short = CumulativeHistogram::from_vec(vec![1, 2]);
        assert!(matches!(
            normalizer.serial(&short, None),
            Err(Error::LengthMismatch { expected: 4, actual: 2 })
        ));
    }
}
