//! Pipeline configuration
//!
//! [`EqualizeOptions`] selects the bin count and the algorithm used by each
//! stage. Every choice has a [`FromStr`] parser that accepts the full name
//! as well as the one-letter menu code, so a front end can validate user
//! input in one call instead of looping on a prompt.

use crate::error::{Error, Result};
use crate::layout::BinLayout;
use std::fmt;
use std::str::FromStr;

/// Smallest accepted bin count for a pipeline run.
pub const MIN_BINS: u32 = 32;

/// Default bin count (one bin per 8-bit intensity level).
pub const DEFAULT_BINS: u32 = 256;

/// Default pre-scaling divisor (no pre-scaling).
pub const DEFAULT_COUNT_DIVISOR: u64 = 1;

/// Serial or data-parallel execution of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Single-threaded reference implementation
    Serial,
    /// Dispatched over blocks on the compute backend
    Parallel,
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "serial" => Ok(Self::Serial),
            "p" | "parallel" => Ok(Self::Parallel),
            other => Err(Error::InvalidParameter(format!(
                "unknown execution mode '{other}' (expected serial or parallel)"
            ))),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => f.write_str("serial"),
            Self::Parallel => f.write_str("parallel"),
        }
    }
}

/// Prefix-sum algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanAlgorithm {
    /// Single running accumulator, O(n)
    Serial,
    /// Step-doubling inclusive scan, O(n log n) work, O(log n) depth
    HillisSteele,
    /// Up-sweep / down-sweep work-efficient scan, O(n) work, O(log n) depth
    Blelloch,
}

impl FromStr for ScanAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "serial" => Ok(Self::Serial),
            "h" | "hillis-steele" | "hillis_steele" | "step-doubling" => Ok(Self::HillisSteele),
            "b" | "blelloch" | "work-efficient" => Ok(Self::Blelloch),
            other => Err(Error::InvalidParameter(format!(
                "unknown scan algorithm '{other}' (expected serial, hillis-steele or blelloch)"
            ))),
        }
    }
}

impl fmt::Display for ScanAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial => f.write_str("serial"),
            Self::HillisSteele => f.write_str("hillis-steele"),
            Self::Blelloch => f.write_str("blelloch"),
        }
    }
}

/// Mapping used when the normalization range collapses
/// (`max == min_non_zero`, or an all-zero histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DegeneratePolicy {
    /// Map each bin to its own lowest intensity, leaving the image as-is
    /// up to bin quantization
    #[default]
    PassThrough,
    /// Map every bin to 0
    Flat,
}

impl FromStr for DegeneratePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass-through" | "passthrough" | "identity" => Ok(Self::PassThrough),
            "flat" | "zero" => Ok(Self::Flat),
            other => Err(Error::InvalidParameter(format!(
                "unknown degenerate policy '{other}' (expected pass-through or flat)"
            ))),
        }
    }
}

/// Options for one equalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualizeOptions {
    /// Number of histogram bins; must lie in `32..=levels` and divide `levels`
    pub bins: u32,
    /// Histogram binning mode
    pub histogram: ExecutionMode,
    /// Prefix-sum algorithm
    pub scan: ScanAlgorithm,
    /// Minimum-finding mode
    pub reduce: ExecutionMode,
    /// Normalization mode
    pub normalize: ExecutionMode,
    /// Back-projection mode
    pub equalize: ExecutionMode,
    /// Divisor applied to cumulative values and both extrema before
    /// normalizing (1 = exact)
    pub count_divisor: u64,
    /// Fallback for a collapsed normalization range
    pub degenerate: DegeneratePolicy,
}

impl Default for EqualizeOptions {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            histogram: ExecutionMode::Parallel,
            scan: ScanAlgorithm::Blelloch,
            reduce: ExecutionMode::Serial,
            normalize: ExecutionMode::Parallel,
            equalize: ExecutionMode::Parallel,
            count_divisor: DEFAULT_COUNT_DIVISOR,
            degenerate: DegeneratePolicy::PassThrough,
        }
    }
}

impl EqualizeOptions {
    /// Default options with the given bin count.
    pub fn with_bins(bins: u32) -> Self {
        Self {
            bins,
            ..Self::default()
        }
    }

    /// Set the histogram binning mode.
    pub fn histogram(mut self, mode: ExecutionMode) -> Self {
        self.histogram = mode;
        self
    }

    /// Set the scan algorithm.
    pub fn scan(mut self, algorithm: ScanAlgorithm) -> Self {
        self.scan = algorithm;
        self
    }

    /// Set the reduction mode.
    pub fn reduce(mut self, mode: ExecutionMode) -> Self {
        self.reduce = mode;
        self
    }

    /// Set the normalization mode.
    pub fn normalize(mut self, mode: ExecutionMode) -> Self {
        self.normalize = mode;
        self
    }

    /// Set the back-projection mode.
    pub fn equalize(mut self, mode: ExecutionMode) -> Self {
        self.equalize = mode;
        self
    }

    /// Set every serial/parallel stage to `mode` at once.
    pub fn all_stages(self, mode: ExecutionMode) -> Self {
        self.histogram(mode)
            .reduce(mode)
            .normalize(mode)
            .equalize(mode)
    }

    /// Set the pre-scaling divisor.
    pub fn count_divisor(mut self, divisor: u64) -> Self {
        self.count_divisor = divisor;
        self
    }

    /// Set the degenerate-range policy.
    pub fn degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Validate the options against a source with `levels` intensity levels
    /// and return the resulting bin layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBinCount`] for a bin count below
    /// [`MIN_BINS`], above `levels`, or not dividing `levels`; and
    /// [`Error::InvalidParameter`] for a zero divisor.
    pub fn layout(&self, levels: u32) -> Result<BinLayout> {
        if self.count_divisor == 0 {
            return Err(Error::InvalidParameter(
                "count divisor must be >= 1".into(),
            ));
        }
        if self.bins < MIN_BINS {
            return Err(Error::InvalidBinCount {
                bins: self.bins,
                levels,
                reason: "below the minimum of 32",
            });
        }
        BinLayout::new(self.bins, levels)
    }
}

/// Parse and validate a bin count typed by a user.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for text that is not an unsigned
/// integer, and the errors of [`EqualizeOptions::layout`] otherwise.
///
/// # Example
///
/// ```
/// use histeq_core::parse_bin_count;
///
/// assert_eq!(parse_bin_count(" 64 ", 256).unwrap(), 64);
/// assert!(parse_bin_count("16", 256).is_err());
/// assert!(parse_bin_count("100", 256).is_err());
/// assert!(parse_bin_count("many", 256).is_err());
/// ```
pub fn parse_bin_count(input: &str, levels: u32) -> Result<u32> {
    let bins: u32 = input
        .trim()
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("'{}' is not a bin count", input.trim())))?;
    EqualizeOptions::with_bins(bins).layout(levels)?;
    Ok(bins)
}
