//! histeq - Data-parallel histogram equalization
//!
//! Stretches the contrast of an image by building an intensity histogram,
//! turning it into a cumulative distribution, normalizing that distribution
//! and remapping every sample through the result.
//!
//! # Overview
//!
//! - Histogram binning with atomic accumulation
//! - Prefix sums: serial, Hillis-Steele and Blelloch, with block combination
//! - Tree-style minimum reduction
//! - Block planning for backends with a limited block width
//! - Histogram CSV artifacts, PGM and grayscale PNG I/O
//!
//! # Example
//!
//! ```
//! use histeq::compute::CpuBackend;
//! use histeq::pipeline::HistogramPipeline;
//! use histeq::{EqualizeOptions, PlanarImage, ScanAlgorithm};
//!
//! let image = PlanarImage::gray(4, 2, 256, vec![10, 10, 100, 200, 200, 200, 255, 5]).unwrap();
//! let options = EqualizeOptions::with_bins(32).scan(ScanAlgorithm::HillisSteele);
//! let out = HistogramPipeline::new(CpuBackend::new(), options).run(&image).unwrap();
//! assert_eq!(out.histogram.total(), 8);
//! assert_eq!(out.cumulative.last(), Some(8));
//! assert_eq!(out.output.len(), 8);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use histeq_core::*;

// Re-export the other crates as modules to avoid name conflicts
pub use histeq_compute as compute;
pub use histeq_io as io;
pub use histeq_pipeline as pipeline;
