//! Bin layout: how intensity levels are grouped into histogram bins
//!
//! A [`BinLayout`] ties together the number of representable intensity
//! levels (256 for 8-bit data), the number of bins, and the integer
//! divider that maps a sample onto its bin.

use crate::Sample;
use crate::error::{Error, Result};

/// Largest supported level count (16-bit samples).
pub const MAX_LEVELS: u32 = 1 << 16;

/// Level count of 8-bit grayscale data.
pub const LEVELS_8BIT: u32 = 256;

/// Mapping between intensity levels and histogram bins.
///
/// Invariants: `1 <= bins <= levels`, `levels % bins == 0`, and
/// `divider == levels / bins`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinLayout {
    bins: u32,
    levels: u32,
    divider: u32,
}

impl BinLayout {
    /// Create a layout of `bins` bins over `levels` intensity levels.
    ///
    /// This constructor only checks the structural invariants; the
    /// configured bin range for a pipeline run is enforced by
    /// [`EqualizeOptions::layout`](crate::EqualizeOptions::layout).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLevels`] when `levels` is outside `2..=65536`
    /// and [`Error::InvalidBinCount`] when `bins` is zero, larger than
    /// `levels`, or does not divide `levels` evenly.
    ///
    /// # Example
    ///
    /// ```
    /// use histeq_core::BinLayout;
    ///
    /// let layout = BinLayout::new(4, 256).unwrap();
    /// assert_eq!(layout.divider(), 64);
    /// assert_eq!(layout.bin_of(200), 3);
    /// ```
    pub fn new(bins: u32, levels: u32) -> Result<Self> {
        if !(2..=MAX_LEVELS).contains(&levels) {
            return Err(Error::InvalidLevels(levels));
        }
        if bins == 0 {
            return Err(Error::InvalidBinCount {
                bins,
                levels,
                reason: "must be at least 1",
            });
        }
        if bins > levels {
            return Err(Error::InvalidBinCount {
                bins,
                levels,
                reason: "exceeds the number of intensity levels",
            });
        }
        if levels % bins != 0 {
            return Err(Error::InvalidBinCount {
                bins,
                levels,
                reason: "does not divide the number of intensity levels",
            });
        }

        Ok(Self {
            bins,
            levels,
            divider: levels / bins,
        })
    }

    /// Number of bins.
    #[inline]
    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Number of bins as a length.
    #[inline]
    pub fn len(&self) -> usize {
        self.bins as usize
    }

    /// A layout always has at least one bin.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of representable intensity levels.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Intensity range spanned by one bin.
    #[inline]
    pub fn divider(&self) -> u32 {
        self.divider
    }

    /// Largest representable intensity (`levels - 1`).
    #[inline]
    pub fn max_intensity(&self) -> u32 {
        self.levels - 1
    }

    /// Bin index of a sample.
    ///
    /// Values past the last bin are clamped to `bins - 1` so that a sample
    /// at the top of the range can never index past the histogram.
    #[inline]
    pub fn bin_of(&self, sample: Sample) -> usize {
        let bin = sample as u32 / self.divider;
        bin.min(self.bins - 1) as usize
    }

    /// Lowest intensity that falls into `bin`.
    #[inline]
    pub fn bin_floor(&self, bin: usize) -> u32 {
        bin as u32 * self.divider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_resolution_divider_is_one() {
        let layout = BinLayout::new(256, 256).unwrap();
        assert_eq!(layout.divider(), 1);
        assert_eq!(layout.bin_of(255), 255);
    }

    #[test]
    fn test_divider_for_quarter_bins() {
        let layout = BinLayout::new(4, 256).unwrap();
        assert_eq!(layout.divider(), 64);
        assert_eq!(layout.bin_of(0), 0);
        assert_eq!(layout.bin_of(63), 0);
        assert_eq!(layout.bin_of(64), 1);
        assert_eq!(layout.bin_of(255), 3);
    }

    #[test]
    fn test_out_of_range_sample_is_clamped() {
        let layout = BinLayout::new(32, 256).unwrap();
        assert_eq!(layout.bin_of(u16::MAX), 31);
    }

    #[test]
    fn test_rejects_non_divisor() {
        let err = BinLayout::new(100, 256).unwrap_err();
        assert!(matches!(err, Error::InvalidBinCount { bins: 100, .. }));
    }

    #[test]
    fn test_rejects_too_many_bins() {
        assert!(BinLayout::new(512, 256).is_err());
        assert!(BinLayout::new(0, 256).is_err());
    }

    #[test]
    fn test_rejects_bad_levels() {
        assert_eq!(BinLayout::new(1, 1), Err(Error::InvalidLevels(1)));
        assert!(BinLayout::new(2, MAX_LEVELS + 2).is_err());
    }

    #[test]
    fn test_sixteen_bit_layout() {
        let layout = BinLayout::new(256, MAX_LEVELS).unwrap();
        assert_eq!(layout.divider(), 256);
        assert_eq!(layout.bin_of(65535), 255);
        assert_eq!(layout.bin_floor(3), 768);
        assert_eq!(layout.max_intensity(), 65535);
    }
}
