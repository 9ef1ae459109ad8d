//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::{golden_dir, regout_dir};
use histeq_core::Sample;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Write golden files from the current output
    Generate,
    /// Compare output with golden files (default)
    #[default]
    Compare,
    /// Write output only, without comparison
    Display,
}

impl RegTestMode {
    /// Read the mode from `REGTEST_MODE`.
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// Tracks the test name, the running check index, the mode, and every
/// failure recorded so far. Checks never panic; call [`RegParams::cleanup`]
/// at the end and assert on its result.
pub struct RegParams {
    /// Name of the test (e.g., "scan")
    pub test_name: String,
    /// Number of checks made so far
    index: usize,
    /// Golden file handling
    pub mode: RegTestMode,
    success: bool,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a regression test. The mode comes from `REGTEST_MODE`.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Number of checks made so far.
    pub fn index(&self) -> usize {
        self.index
    }

    fn record(&mut self, err: TestError) {
        let msg = format!("Failure in {}_reg: {}", self.test_name, err);
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
    }

    /// Check that `actual` is within `delta` of `expected`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        if (expected - actual).abs() > delta {
            self.record(TestError::ValueMismatch {
                index: self.index,
                expected,
                actual,
                delta,
            });
            return false;
        }
        true
    }

    /// Check two sample sequences for exact equality.
    pub fn compare_samples(&mut self, expected: &[Sample], actual: &[Sample]) -> bool {
        self.compare_slices(expected, actual)
    }

    /// Check two count sequences for exact equality.
    pub fn compare_counts(&mut self, expected: &[u64], actual: &[u64]) -> bool {
        self.compare_slices(expected, actual)
    }

    fn compare_slices<T: PartialEq>(&mut self, expected: &[T], actual: &[T]) -> bool {
        self.index += 1;

        let position = expected
            .iter()
            .zip(actual)
            .position(|(a, b)| a != b)
            .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())));

        match position {
            Some(position) => {
                self.record(TestError::SampleMismatch {
                    index: self.index,
                    position,
                });
                false
            }
            None => true,
        }
    }

    /// Check two byte strings for exact equality.
    pub fn compare_strings(&mut self, expected: &[u8], actual: &[u8]) -> bool {
        self.index += 1;
        if expected != actual {
            self.record(TestError::StringMismatch {
                index: self.index,
                expected: expected.len(),
                actual: actual.len(),
            });
            return false;
        }
        true
    }

    /// Write `data` to `tests/regout/<test>/<file>` and check it against
    /// `tests/golden/<test>/<file>`. `file` may contain subdirectories.
    ///
    /// Generate mode overwrites the golden file, compare mode records a
    /// missing or differing golden file as a failure, and display mode
    /// only writes the output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output or golden directory cannot be
    /// written, or the golden file exists but cannot be read.
    pub fn check_golden(&mut self, file: &str, data: &[u8]) -> TestResult<bool> {
        self.index += 1;

        let local = PathBuf::from(regout_dir()).join(&self.test_name).join(file);
        create_parent(&local)?;
        fs::write(&local, data)?;

        let golden = PathBuf::from(golden_dir()).join(&self.test_name).join(file);
        match self.mode {
            RegTestMode::Generate => {
                create_parent(&golden)?;
                fs::write(&golden, data)?;
                eprintln!("Generated: {}", golden.display());
                Ok(true)
            }
            RegTestMode::Compare => match fs::read(&golden) {
                Ok(expected) if expected == data => Ok(true),
                Ok(_) => {
                    self.record(TestError::FileMismatch {
                        index: self.index,
                        path: golden.display().to_string(),
                    });
                    Ok(false)
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    self.record(TestError::GoldenNotFound {
                        path: golden.display().to_string(),
                    });
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            },
            RegTestMode::Display => Ok(true),
        }
    }

    /// Print the summary and return whether every check passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// True if every check so far passed.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Failure messages recorded so far.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

fn create_parent(file: &Path) -> TestResult<()> {
    let Some(dir) = file.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).map_err(|e| TestError::DirectoryCreate {
        path: dir.display().to_string(),
        message: e.to_string(),
    })
}
