//! Histogram equalization pipeline
//!
//! Runs the stages strictly in order, each one a full barrier:
//!
//! ```text
//! samples -> bin -> scan -> reduce -> normalize -> equalize -> output
//! ```
//!
//! Configuration is validated before any stage runs. An all-zero
//! histogram is not an error for the pipeline: normalization falls back to
//! the configured [`DegeneratePolicy`](histeq_core::DegeneratePolicy).

use crate::binner;
use crate::equalizer;
use crate::error::PipelineResult;
use crate::normalizer::Normalizer;
use crate::reducer;
use crate::scan::{self, ScanOutput};
use histeq_compute::ComputeBackend;
use histeq_core::{
    BinCount, BinLayout, BlockPartialSums, CumulativeHistogram, EqualizeOptions, HistogramExtrema,
    NormalizedHistogram, OutputSampleSequence, PlanarImage, SampleSequence, SampleSource,
};
use std::fmt;
use std::time::{Duration, Instant};

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Histogram binning
    Histogram,
    /// Prefix sum
    Scan,
    /// Minimum-finding reduction
    Reduce,
    /// Normalization
    Normalize,
    /// Back-projection
    Equalize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Histogram => "histogram",
            Self::Scan => "scan",
            Self::Reduce => "reduce",
            Self::Normalize => "normalize",
            Self::Equalize => "equalize",
        };
        f.write_str(name)
    }
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    pub stage: Stage,
    pub elapsed: Duration,
}

/// Per-stage profile of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    stages: Vec<StageTiming>,
}

impl PipelineReport {
    fn record(&mut self, stage: Stage, start: Instant) {
        let elapsed = start.elapsed();
        tracing::debug!(%stage, ?elapsed, "stage complete");
        self.stages.push(StageTiming { stage, elapsed });
    }

    /// Timings in execution order.
    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    /// Time spent in `stage`, if it ran.
    pub fn elapsed(&self, stage: Stage) -> Option<Duration> {
        self.stages
            .iter()
            .find(|t| t.stage == stage)
            .map(|t| t.elapsed)
    }

    /// Sum of all stage timings.
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|t| t.elapsed).sum()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in &self.stages {
            writeln!(f, "{:<10} {:>12}", t.stage.to_string(), format!("{:.3?}", t.elapsed))?;
        }
        write!(f, "{:<10} {:>12}", "total", format!("{:.3?}", self.total()))
    }
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualizeOutput {
    /// Bin layout derived from the options and the source
    pub layout: BinLayout,
    /// Raw per-bin counts
    pub histogram: BinCount,
    /// Inclusive prefix sum of `histogram`
    pub cumulative: CumulativeHistogram,
    /// Per-block totals of a multi-block scan
    pub block_sums: Option<BlockPartialSums>,
    /// Normalization extrema; `None` for an all-zero histogram
    pub extrema: Option<HistogramExtrema>,
    /// Intensity lookup table
    pub normalized: NormalizedHistogram,
    /// Equalized samples, in input order
    pub output: OutputSampleSequence,
    /// Stage timings
    pub report: PipelineReport,
}

/// Equalization pipeline bound to a compute backend.
#[derive(Debug)]
pub struct HistogramPipeline<B> {
    backend: B,
    options: EqualizeOptions,
}

impl<B: ComputeBackend> HistogramPipeline<B> {
    /// Create a pipeline.
    pub fn new(backend: B, options: EqualizeOptions) -> Self {
        Self { backend, options }
    }

    /// Backend used for parallel stages.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Options of this pipeline.
    pub fn options(&self) -> &EqualizeOptions {
        &self.options
    }

    /// Equalize the intensity samples of `source`.
    ///
    /// # Errors
    ///
    /// Returns configuration errors (bin count, divisor, levels) and
    /// out-of-range samples before any stage runs, and backend failures
    /// from whichever stage hit them.
    pub fn run<S: SampleSource + ?Sized>(&self, source: &S) -> PipelineResult<EqualizeOutput> {
        let options = &self.options;
        let layout = options.layout(source.levels())?;
        let samples = SampleSequence::from_source(source)?;
        let normalizer = Normalizer::from_options(options, layout)?;
        let backend = &self.backend;
        let mut report = PipelineReport::default();

        tracing::debug!(
            backend = backend.name(),
            samples = samples.len(),
            levels = layout.levels(),
            bins = layout.bins(),
            divider = layout.divider(),
            "equalization started"
        );

        let start = Instant::now();
        let histogram = binner::bin(backend, samples.as_slice(), &layout, options.histogram)?;
        report.record(Stage::Histogram, start);

        let start = Instant::now();
        let ScanOutput {
            cumulative,
            block_sums,
            ..
        } = scan::scan(backend, &histogram, options.scan)?;
        report.record(Stage::Scan, start);

        let start = Instant::now();
        let extrema = match reducer::extrema(backend, &cumulative, options.reduce) {
            Ok(extrema) => Some(extrema),
            Err(e) if e.is_all_zero_histogram() => {
                tracing::warn!(
                    policy = ?options.degenerate,
                    "histogram is empty, using degenerate mapping"
                );
                None
            }
            Err(e) => return Err(e),
        };
        report.record(Stage::Reduce, start);

        let start = Instant::now();
        let normalized = normalizer.normalize(backend, &cumulative, extrema, options.normalize)?;
        report.record(Stage::Normalize, start);

        let start = Instant::now();
        let output = equalizer::equalize(
            backend,
            samples.as_slice(),
            &normalized,
            &layout,
            options.equalize,
        )?;
        report.record(Stage::Equalize, start);

        tracing::info!(
            samples = samples.len(),
            bins = layout.bins(),
            scan = %options.scan,
            elapsed = ?report.total(),
            "equalization finished"
        );

        Ok(EqualizeOutput {
            layout,
            histogram,
            cumulative,
            block_sums,
            extrema,
            normalized,
            output,
            report,
        })
    }

    /// Equalize the intensity plane of `image`, keeping its auxiliary
    /// planes.
    ///
    /// # Errors
    ///
    /// As for [`HistogramPipeline::run`].
    pub fn equalize_image(&self, image: &PlanarImage) -> PipelineResult<(PlanarImage, EqualizeOutput)> {
        let mut result = self.run(image)?;
        let output = std::mem::take(&mut result.output);
        let equalized = image.with_intensity(output)?;
        Ok((equalized, result))
    }
}
