//! PNG grayscale image support
//!
//! 8- and 16-bit grayscale PNGs map to a single-plane image with 256 or
//! 65536 levels. Gray+alpha PNGs keep their alpha channel as an auxiliary
//! plane, so it passes through equalization untouched.

use crate::{IoError, IoResult};
use histeq_core::{PlanarImage, Sample, SampleSource};
use png::{BitDepth, ColorType, Decoder, Encoder};
use std::io::{BufRead, Seek, Write};

/// Read a grayscale PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<PlanarImage> {
    let decoder = Decoder::new(reader);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let (channels, levels) = match (color_type, bit_depth) {
        (ColorType::Grayscale, BitDepth::Eight) => (1, 256),
        (ColorType::Grayscale, BitDepth::Sixteen) => (1, 65_536),
        (ColorType::GrayscaleAlpha, BitDepth::Eight) => (2, 256),
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => (2, 65_536),
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {:?} {:?} (8/16-bit grayscale only)",
                color_type, bit_depth
            )));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let bytes_per_sample = if bit_depth == BitDepth::Sixteen { 2 } else { 1 };
    let plane = width as usize * height as usize;

    let mut intensity: Vec<Sample> = Vec::with_capacity(plane);
    let mut alpha: Vec<Sample> = Vec::with_capacity(if channels == 2 { plane } else { 0 });

    for y in 0..height as usize {
        let row = &data[y * bytes_per_row..];
        for x in 0..width as usize {
            for c in 0..channels {
                let idx = (x * channels + c) * bytes_per_sample;
                let val = if bytes_per_sample == 2 {
                    u16::from_be_bytes([row[idx], row[idx + 1]])
                } else {
                    row[idx] as Sample
                };
                if c == 0 {
                    intensity.push(val);
                } else {
                    alpha.push(val);
                }
            }
        }
    }

    Ok(PlanarImage::with_planes(width, height, levels, intensity, alpha)?)
}

/// Write a grayscale PNG image
///
/// Images with 256 levels are written at 8 bits, 65536 levels at 16 bits.
/// One auxiliary plane is written as alpha.
pub fn write_png<W: Write>(image: &PlanarImage, writer: W) -> IoResult<()> {
    let width = image.width();
    let height = image.height();

    let bit_depth = match image.levels() {
        256 => BitDepth::Eight,
        65_536 => BitDepth::Sixteen,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNG cannot store {} intensity levels",
                other
            )));
        }
    };
    let color_type = match image.planes() {
        1 => ColorType::Grayscale,
        2 => ColorType::GrayscaleAlpha,
        n => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNG grayscale holds at most 2 planes, image has {}",
                n
            )));
        }
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(bit_depth);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let intensity = image.intensity();
    let alpha = image.auxiliary();
    let mut data = Vec::with_capacity((intensity.len() + alpha.len()) * 2);
    for i in 0..intensity.len() {
        let mut push = |v: Sample| {
            if bit_depth == BitDepth::Sixteen {
                data.extend_from_slice(&v.to_be_bytes());
            } else {
                data.push(v as u8);
            }
        };
        push(intensity[i]);
        if color_type == ColorType::GrayscaleAlpha {
            push(alpha[i]);
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}
