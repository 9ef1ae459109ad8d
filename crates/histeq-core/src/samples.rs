//! Sample sequences and the ingestion interface
//!
//! - [`SampleSequence`] - validated intensity samples fed into the pipeline
//! - [`OutputSampleSequence`] - equalized samples, same order and length
//! - [`SampleSource`] - what an image loader must provide
//! - [`PlanarImage`] - an intensity plane plus untouched auxiliary planes

use crate::Sample;
use crate::error::{Error, Result};
use crate::layout::MAX_LEVELS;

/// Ordered intensity samples, each in `[0, levels - 1]`.
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSequence {
    samples: Vec<Sample>,
    levels: u32,
}

impl SampleSequence {
    /// Validate and wrap samples drawn from `levels` intensity levels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] for a level count outside
    /// `2..=65536`, or [`Error::SampleOutOfRange`] for the first sample
    /// that is not below `levels`.
    pub fn new(samples: Vec<Sample>, levels: u32) -> Result<Self> {
        if !(2..=MAX_LEVELS).contains(&levels) {
            return Err(Error::InvalidLevels(levels));
        }
        if let Some((index, &value)) = samples
            .iter()
            .enumerate()
            .find(|&(_, &s)| s as u32 >= levels)
        {
            return Err(Error::SampleOutOfRange {
                index,
                value: value as u32,
                max: levels - 1,
            });
        }
        Ok(Self { samples, levels })
    }

    /// Copy the intensity samples out of a [`SampleSource`].
    pub fn from_source<S: SampleSource + ?Sized>(source: &S) -> Result<Self> {
        Self::new(source.samples().to_vec(), source.levels())
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of representable intensity levels.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Samples as a slice.
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume and return the underlying vector.
    pub fn into_vec(self) -> Vec<Sample> {
        self.samples
    }
}

/// Equalized samples, one per input sample, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputSampleSequence {
    samples: Vec<Sample>,
}

impl OutputSampleSequence {
    /// Wrap equalized samples.
    pub fn from_vec(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if there are no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples as a slice.
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume and return the underlying vector.
    pub fn into_vec(self) -> Vec<Sample> {
        self.samples
    }
}

/// Supplier of intensity samples for one pipeline run.
///
/// Implemented by image loaders. Auxiliary data (chroma planes, alpha,
/// etc.) is exposed only so that it can be carried through unchanged.
pub trait SampleSource {
    /// Intensity samples in pixel order.
    fn samples(&self) -> &[Sample];

    /// Auxiliary channel data excluded from equalization, flattened.
    fn auxiliary(&self) -> &[Sample];

    /// Number of representable intensity levels.
    fn levels(&self) -> u32;

    /// Number of intensity samples.
    fn sample_count(&self) -> usize {
        self.samples().len()
    }
}

/// Planar image: one intensity plane followed by zero or more auxiliary
/// planes of the same size.
///
/// Only the intensity plane is equalized; auxiliary planes are reattached
/// unchanged by [`PlanarImage::with_intensity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarImage {
    width: u32,
    height: u32,
    levels: u32,
    intensity: Vec<Sample>,
    auxiliary: Vec<Sample>,
    aux_planes: u32,
}

impl PlanarImage {
    /// Create a single-plane grayscale image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `data` does not hold
    /// `width * height` samples, or a range error as for
    /// [`SampleSequence::new`].
    pub fn gray(width: u32, height: u32, levels: u32, data: Vec<Sample>) -> Result<Self> {
        Self::with_planes(width, height, levels, data, Vec::new())
    }

    /// Create an image from an intensity plane and flattened auxiliary
    /// planes. `auxiliary` must hold a whole number of planes.
    pub fn with_planes(
        width: u32,
        height: u32,
        levels: u32,
        intensity: Vec<Sample>,
        auxiliary: Vec<Sample>,
    ) -> Result<Self> {
        let plane = width as usize * height as usize;
        if intensity.len() != plane {
            return Err(Error::LengthMismatch {
                expected: plane,
                actual: intensity.len(),
            });
        }
        let aux_planes = if plane == 0 {
            0
        } else {
            if auxiliary.len() % plane != 0 {
                return Err(Error::LengthMismatch {
                    expected: (auxiliary.len() / plane + 1) * plane,
                    actual: auxiliary.len(),
                });
            }
            (auxiliary.len() / plane) as u32
        };
        // Range-check the intensity plane once, up front.
        let intensity = SampleSequence::new(intensity, levels)?.into_vec();

        Ok(Self {
            width,
            height,
            levels,
            intensity,
            auxiliary,
            aux_planes,
        })
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of planes, intensity included.
    pub fn planes(&self) -> u32 {
        1 + self.aux_planes
    }

    /// Intensity plane.
    pub fn intensity(&self) -> &[Sample] {
        &self.intensity
    }

    /// Replace the intensity plane with equalized output, keeping every
    /// auxiliary plane as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `output` does not cover the
    /// whole intensity plane.
    pub fn with_intensity(&self, output: OutputSampleSequence) -> Result<Self> {
        if output.len() != self.intensity.len() {
            return Err(Error::LengthMismatch {
                expected: self.intensity.len(),
                actual: output.len(),
            });
        }
        Ok(Self {
            intensity: output.into_vec(),
            ..self.clone()
        })
    }

    /// All planes concatenated: intensity first, then auxiliary data.
    pub fn to_planar_vec(&self) -> Vec<Sample> {
        let mut data = Vec::with_capacity(self.intensity.len() + self.auxiliary.len());
        data.extend_from_slice(&self.intensity);
        data.extend_from_slice(&self.auxiliary);
        data
    }
}

impl SampleSource for PlanarImage {
    fn samples(&self) -> &[Sample] {
        &self.intensity
    }

    fn auxiliary(&self) -> &[Sample] {
        &self.auxiliary
    }

    fn levels(&self) -> u32 {
        self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rejects_out_of_range() {
        let err = SampleSequence::new(vec![0, 255, 256], 256).unwrap_err();
        assert_eq!(
            err,
            Error::SampleOutOfRange {
                index: 2,
                value: 256,
                max: 255
            }
        );
    }

    #[test]
    fn test_sequence_accepts_full_range() {
        let seq = SampleSequence::new((0..256).collect(), 256).unwrap();
        assert_eq!(seq.len(), 256);
        assert_eq!(seq.levels(), 256);
    }

    #[test]
    fn test_planar_image_rejects_wrong_plane_size() {
        assert!(PlanarImage::gray(4, 4, 256, vec![0; 15]).is_err());
        assert!(PlanarImage::with_planes(2, 2, 256, vec![0; 4], vec![1; 5]).is_err());
    }

    #[test]
    fn test_auxiliary_planes_survive_reattach() {
        let img = PlanarImage::with_planes(2, 1, 256, vec![10, 20], vec![7, 8, 9, 10]).unwrap();
        assert_eq!(img.planes(), 3);
        assert_eq!(img.sample_count(), 2);

        let out = img
            .with_intensity(OutputSampleSequence::from_vec(vec![0, 255]))
            .unwrap();
        assert_eq!(out.intensity(), &[0, 255]);
        assert_eq!(out.auxiliary(), &[7, 8, 9, 10]);
        assert_eq!(out.to_planar_vec(), vec![0, 255, 7, 8, 9, 10]);
    }

    #[test]
    fn test_reattach_rejects_short_output() {
        let img = PlanarImage::gray(2, 2, 256, vec![1, 2, 3, 4]).unwrap();
        assert!(
            img.with_intensity(OutputSampleSequence::from_vec(vec![1]))
                .is_err()
        );
    }
}
