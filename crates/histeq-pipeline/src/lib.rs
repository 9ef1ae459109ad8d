//! histeq-pipeline - Histogram equalization stages
//!
//! This crate provides the stages of the equalization pipeline and the
//! pipeline that chains them:
//!
//! - [`binner`] - per-bin sample counts (serial or atomic-parallel)
//! - [`scan`] - cumulative histogram (serial, Hillis-Steele, Blelloch)
//! - [`reducer`] - minimum non-zero and maximum cumulative value
//! - [`normalizer`] - rescaling into the output intensity range
//! - [`equalizer`] - back-projection onto every sample
//! - [`HistogramPipeline`] - runs all of the above on a [`ComputeBackend`]
//!
//! # Example
//!
//! ```
//! use histeq_compute::CpuBackend;
//! use histeq_core::{EqualizeOptions, PlanarImage};
//! use histeq_pipeline::HistogramPipeline;
//!
//! let image = PlanarImage::gray(4, 1, 256, vec![100, 101, 102, 103]).unwrap();
//! let pipeline = HistogramPipeline::new(CpuBackend::new(), EqualizeOptions::default());
//! let (equalized, _) = pipeline.equalize_image(&image).unwrap();
//! assert_eq!(equalized.intensity(), &[0, 85, 170, 255]);
//! ```
//!
//! [`ComputeBackend`]: histeq_compute::ComputeBackend

pub mod binner;
pub mod equalizer;
mod error;
pub mod normalizer;
pub mod pipeline;
pub mod reducer;
pub mod scan;

pub use error::{PipelineError, PipelineResult};
pub use normalizer::Normalizer;
pub use pipeline::{EqualizeOutput, HistogramPipeline, PipelineReport, Stage, StageTiming};
pub use scan::{ScanOutput, scan};
