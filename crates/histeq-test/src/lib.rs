//! histeq-test - Regression test framework for histeq
//!
//! This crate provides a regression test harness supporting three modes:
//!
//! - **Generate**: write golden files under `tests/golden/<test>/`
//! - **Compare**: compare output with the golden files
//! - **Display**: write output under `tests/regout/<test>/` only
//!
//! # Usage
//!
//! ```ignore
//! use histeq_test::{RegParams, RegTestMode};
//!
//! let mut rp = RegParams::new("scan");
//! rp.compare_counts(&[3, 4, 4, 8], cumulative.as_slice());
//! rp.check_golden("cumulative_histogram.csv", &records)?;
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"
//! - `RUST_LOG`: filter for [`init_test_logging`]

mod error;
mod params;
pub mod synthetic;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // histeq-test is at crates/histeq-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the golden files directory
pub fn golden_dir() -> String {
    format!("{}/tests/golden", workspace_root())
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// Honors `RUST_LOG` and defaults to `warn`.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
