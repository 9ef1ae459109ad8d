//! histeq Core - Data model for histogram equalization
//!
//! This crate provides the data structures shared by every stage of the
//! equalization pipeline:
//!
//! - [`SampleSequence`] / [`OutputSampleSequence`] - intensity samples in and out
//! - [`SampleSource`] / [`PlanarImage`] - ingestion interface and planar image
//! - [`BinLayout`] - levels, bins and the bin divider
//! - [`BinCount`] / [`CumulativeHistogram`] / [`NormalizedHistogram`] - stage outputs
//! - [`BlockPlan`] / [`plan_blocks`] - block decomposition for dispatch
//! - [`EqualizeOptions`] - configuration of a pipeline run

pub mod error;
pub mod histogram;
pub mod layout;
pub mod options;
pub mod planner;
pub mod samples;

pub use error::{Error, Result};
pub use histogram::{
    BinCount, BlockPartialSums, CumulativeHistogram, HistogramExtrema, NormalizedHistogram,
};
pub use layout::{BinLayout, LEVELS_8BIT, MAX_LEVELS};
pub use options::{
    DEFAULT_BINS, DegeneratePolicy, EqualizeOptions, ExecutionMode, MIN_BINS, ScanAlgorithm,
    parse_bin_count,
};
pub use planner::{BlockPlan, gcd, plan_blocks};
pub use samples::{OutputSampleSequence, PlanarImage, SampleSequence, SampleSource};

/// One intensity sample. Wide enough for 16-bit data.
pub type Sample = u16;
