//! PGM (binary, P5) format support
//!
//! Reads and writes single-plane grayscale images. A maxval below 256 is
//! stored as one byte per sample, otherwise as two big-endian bytes. The
//! level count of the resulting image is `maxval + 1`.

use crate::{IoError, IoResult};
use histeq_core::{PlanarImage, Sample, SampleSource};
use std::io::{BufRead, Read, Write};

/// Read the next whitespace-delimited header token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut byte = [0u8; 1];
    loop {
        if reader.read(&mut byte)? == 0 {
            break;
        }
        let c = byte[0];
        if c == b'#' && token.is_empty() {
            let mut comment = Vec::new();
            reader.read_until(b'\n', &mut comment)?;
            continue;
        }
        if c.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(c as char);
    }
    if token.is_empty() {
        return Err(IoError::InvalidData("truncated PGM header".to_string()));
    }
    Ok(token)
}

fn read_header_value<R: BufRead>(reader: &mut R, name: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("invalid PGM {}: '{}'", name, token)))
}

/// Read a binary PGM image.
///
/// # Arguments
/// * `reader` - A buffered reader positioned at the `P5` magic
///
/// # Returns
/// A single-plane [`PlanarImage`] with `maxval + 1` levels.
pub fn read_pgm<R: BufRead>(mut reader: R) -> IoResult<PlanarImage> {
    let magic = read_token(&mut reader)?;
    if magic != "P5" {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM variant '{}' (only binary PGM is supported)",
            magic
        )));
    }
    let width = read_header_value(&mut reader, "width")?;
    let height = read_header_value(&mut reader, "height")?;
    let maxval = read_header_value(&mut reader, "maxval")?;
    if !(1..=65535).contains(&maxval) {
        return Err(IoError::InvalidData(format!("PGM maxval {} out of range", maxval)));
    }

    let bytes_per_sample = if maxval < 256 { 1 } else { 2 };
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|count| count.checked_mul(bytes_per_sample))
        .ok_or_else(|| {
            IoError::InvalidData(format!("PGM dimensions {}x{} too large", width, height))
        })?;

    // The header is untrusted: grow the buffer only as data arrives
    let mut raw = Vec::new();
    reader.take(expected as u64).read_to_end(&mut raw)?;
    if raw.len() != expected {
        return Err(IoError::DecodeError(format!(
            "PGM raster truncated: expected {} bytes, got {}",
            expected,
            raw.len()
        )));
    }

    let data: Vec<Sample> = if bytes_per_sample == 1 {
        raw.iter().map(|&b| b as Sample).collect()
    } else {
        raw.chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect()
    };

    Ok(PlanarImage::gray(width, height, maxval + 1, data)?)
}

/// Write the intensity plane of `image` as binary PGM.
///
/// # Errors
///
/// Returns [`IoError::UnsupportedFormat`] for an image with auxiliary
/// planes, which PGM cannot hold.
pub fn write_pgm<W: Write>(image: &PlanarImage, mut writer: W) -> IoResult<()> {
    if image.planes() != 1 {
        return Err(IoError::UnsupportedFormat(format!(
            "PGM holds one plane, image has {}",
            image.planes()
        )));
    }
    let maxval = image.levels() - 1;
    write!(writer, "P5\n{} {}\n{}\n", image.width(), image.height(), maxval)?;

    let samples = image.intensity();
    if maxval < 256 {
        let raw: Vec<u8> = samples.iter().map(|&s| s as u8).collect();
        writer.write_all(&raw)?;
    } else {
        let raw: Vec<u8> = samples.iter().flat_map(|&s| s.to_be_bytes()).collect();
        writer.write_all(&raw)?;
    }
    writer.flush()?;
    Ok(())
}
