//! Error types for histeq-pipeline

use histeq_compute::ComputeError;
use thiserror::Error;

/// Errors that can occur while running the equalization pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Core library error (configuration, data model, degenerate input)
    #[error("core error: {0}")]
    Core(#[from] histeq_core::Error),

    /// Compute backend error; aborts the run
    #[error("compute error: {0}")]
    Compute(#[from] ComputeError),
}

impl PipelineError {
    /// True if this is the all-zero histogram condition reported by the
    /// reducer, which the pipeline recovers from.
    pub fn is_all_zero_histogram(&self) -> bool {
        matches!(self, Self::Core(histeq_core::Error::AllZeroHistogram))
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
