//! Error types for histeq-core
//!
//! Provides a unified error type for the data model, bin layout,
//! block planning and configuration parsing. Each variant captures
//! enough context for diagnostics without exposing internal details.

use thiserror::Error;

/// histeq core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bin count outside the accepted range or not an even divisor of the level count
    #[error("invalid bin count {bins} for {levels} intensity levels: {reason}")]
    InvalidBinCount {
        bins: u32,
        levels: u32,
        reason: &'static str,
    },

    /// Level count outside the supported range
    #[error("invalid level count: {0} (supported range is 2..=65536)")]
    InvalidLevels(u32),

    /// A sample lies outside `[0, levels - 1]`
    #[error("sample {value} at index {index} exceeds maximum intensity {max}")]
    SampleOutOfRange { index: usize, value: u32, max: u32 },

    /// Two sequences that must agree in length do not
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Every cumulative entry is zero, so no non-zero minimum exists
    #[error("histogram has no non-zero entries")]
    AllZeroHistogram,

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for histeq core operations
pub type Result<T> = std::result::Result<T, Error>;
