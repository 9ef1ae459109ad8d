//! Error types for histeq-compute
//!
//! Backend failures are fatal for the current run: they are propagated to
//! the caller and never retried.

use thiserror::Error;

/// Errors raised by a compute backend
#[derive(Debug, Error)]
pub enum ComputeError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] histeq_core::Error),

    /// A dispatched kernel did not complete
    #[error("dispatch of kernel '{kernel}' failed: {message}")]
    DispatchFailed {
        /// Kernel name
        kernel: &'static str,
        /// Panic payload or backend message
        message: String,
    },

    /// Host/device transfer with mismatched sizes
    #[error("buffer transfer failed: buffer holds {expected} elements, host data has {actual}")]
    Transfer {
        /// Buffer length
        expected: usize,
        /// Host data length
        actual: usize,
    },

    /// Kernel-side write to a read-only buffer
    #[error("buffer is read-only for kernels")]
    ReadOnlyBuffer,

    /// Data length does not match the dispatch plan
    #[error("kernel '{kernel}' dispatched over {expected} elements but given {actual}")]
    GridMismatch {
        /// Kernel name
        kernel: &'static str,
        /// Elements covered by the plan
        expected: usize,
        /// Elements supplied
        actual: usize,
    },

    /// Worker pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

/// Result type for compute operations
pub type ComputeResult<T> = Result<T, ComputeError>;
