//! histeq-io - Histogram artifacts and grayscale image I/O
//!
//! This crate provides:
//!
//! - [`records`] - `bin_index,value` text records for the base, cumulative
//!   and normalized histograms
//! - [`pnm`] - binary PGM (P5), 8- and 16-bit (feature `pnm`)
//! - [`png`] - 8- and 16-bit grayscale PNG (feature `png-format`)
//!
//! Images are read into a [`PlanarImage`], which is the pipeline's
//! [`SampleSource`](histeq_core::SampleSource).

mod error;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;
pub mod records;

pub use error::{IoError, IoResult};
pub use records::{
    BASE_HISTOGRAM_FILE, CUMULATIVE_HISTOGRAM_FILE, HistogramArtifacts,
    NORMALIZED_HISTOGRAM_FILE, read_histogram_records, write_histogram_records,
};

use histeq_core::PlanarImage;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

/// Supported image file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Binary PGM (P5)
    Pgm,
    /// PNG
    Png,
}

impl ImageFormat {
    /// Guess the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pgm" | "pnm" => Some(Self::Pgm),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// Magic numbers for format detection
mod magic {
    /// PNG: 89 50 4E 47 0D 0A 1A 0A
    pub const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    /// Binary PGM
    pub const PGM_BINARY: &[u8] = b"P5";
}

/// Detect the image format from the first bytes of a file.
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 2 {
        return Err(IoError::InvalidData(
            "not enough data to detect format".to_string(),
        ));
    }
    if data.starts_with(magic::PNG) {
        return Ok(ImageFormat::Png);
    }
    if data.starts_with(magic::PGM_BINARY) {
        return Ok(ImageFormat::Pgm);
    }
    Err(IoError::UnsupportedFormat(
        "unknown image signature".to_string(),
    ))
}

/// Read an image file, detecting the format from its contents.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PlanarImage> {
    let path = path.as_ref();
    let mut header = [0u8; 8];
    let read = File::open(path)?.read(&mut header)?;
    let format = detect_format_from_bytes(&header[..read])?;
    let reader = BufReader::new(File::open(path)?);

    match format {
        #[cfg(feature = "pnm")]
        ImageFormat::Pgm => pnm::read_pgm(reader),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        #[allow(unreachable_patterns)]
        other => {
            Err(IoError::UnsupportedFormat(format!(
                "{:?} support is not enabled",
                other
            )))
        }
    }
}

/// Write an image file in `format`.
pub fn write_image<P: AsRef<Path>>(
    image: &PlanarImage,
    path: P,
    format: ImageFormat,
) -> IoResult<()> {
    let writer = BufWriter::new(File::create(path)?);
    match format {
        #[cfg(feature = "pnm")]
        ImageFormat::Pgm => pnm::write_pgm(image, writer),
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(image, writer),
        #[allow(unreachable_patterns)]
        other => {
            Err(IoError::UnsupportedFormat(format!(
                "{:?} support is not enabled",
                other
            )))
        }
    }
}
