//! Histogram text records
//!
//! One `bin_index,value` record per line, 0-based, ascending:
//!
//! ```text
//! 0,3
//! 1,1
//! 2,0
//! 3,4
//! ```

use crate::{IoError, IoResult};
use histeq_core::{BinCount, CumulativeHistogram, NormalizedHistogram};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the raw histogram stream.
pub const BASE_HISTOGRAM_FILE: &str = "base_histogram.csv";

/// File name of the cumulative histogram stream.
pub const CUMULATIVE_HISTOGRAM_FILE: &str = "cumulative_histogram.csv";

/// File name of the normalized histogram stream.
pub const NORMALIZED_HISTOGRAM_FILE: &str = "normalized_histogram.csv";

/// Write `values` as `index,value` records.
pub fn write_histogram_records<W, I>(mut writer: W, values: I) -> IoResult<()>
where
    W: Write,
    I: IntoIterator,
    I::Item: Display,
{
    for (i, v) in values.into_iter().enumerate() {
        writeln!(writer, "{},{}", i, v)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read `index,value` records back into a value list.
///
/// Blank lines are skipped. Indices must start at 0 and increase by one.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] naming the offending line for a
/// malformed record or an out-of-sequence index.
pub fn read_histogram_records<R: BufRead>(reader: R) -> IoResult<Vec<u64>> {
    let mut values = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let bad = || IoError::InvalidData(format!("line {}: malformed record '{}'", line_no + 1, line));
        let (index, value) = line.split_once(',').ok_or_else(bad)?;
        let index: usize = index.trim().parse().map_err(|_| bad())?;
        let value: u64 = value.trim().parse().map_err(|_| bad())?;
        if index != values.len() {
            return Err(IoError::InvalidData(format!(
                "line {}: expected bin index {}, found {}",
                line_no + 1,
                values.len(),
                index
            )));
        }
        values.push(value);
    }
    Ok(values)
}

/// The three histogram streams of one run.
#[derive(Debug, Clone, Copy)]
pub struct HistogramArtifacts<'a> {
    pub base: &'a BinCount,
    pub cumulative: &'a CumulativeHistogram,
    pub normalized: &'a NormalizedHistogram,
}

impl<'a> HistogramArtifacts<'a> {
    /// Bundle the streams for export.
    pub fn new(
        base: &'a BinCount,
        cumulative: &'a CumulativeHistogram,
        normalized: &'a NormalizedHistogram,
    ) -> Self {
        Self {
            base,
            cumulative,
            normalized,
        }
    }

    /// Write every stream into `dir`, creating it if needed.
    ///
    /// Returns the paths written, in base, cumulative, normalized order.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> IoResult<[PathBuf; 3]> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let base = dir.join(BASE_HISTOGRAM_FILE);
        write_histogram_records(BufWriter::new(File::create(&base)?), self.base.iter())?;

        let cumulative = dir.join(CUMULATIVE_HISTOGRAM_FILE);
        write_histogram_records(
            BufWriter::new(File::create(&cumulative)?),
            self.cumulative.iter(),
        )?;

        let normalized = dir.join(NORMALIZED_HISTOGRAM_FILE);
        write_histogram_records(
            BufWriter::new(File::create(&normalized)?),
            self.normalized.iter(),
        )?;

        Ok([base, cumulative, normalized])
    }
}
