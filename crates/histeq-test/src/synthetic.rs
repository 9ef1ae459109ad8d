//! Deterministic synthetic sample data

use histeq_core::Sample;

/// Small linear congruential generator.
///
/// Reproducible across platforms, which is all the regression tests need.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // Knuth's MMIX multiplier and increment
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform value in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: u64) -> u64 {
        // high bits of an LCG are the well-mixed ones
        (self.next_u64() >> 16) % bound
    }
}

/// `len` uniformly distributed samples in `[0, levels - 1]`.
pub fn random_samples(len: usize, levels: u32, seed: u64) -> Vec<Sample> {
    let mut rng = SimpleRng::new(seed);
    (0..len)
        .map(|_| rng.below(levels as u64) as Sample)
        .collect()
}

/// Samples `0, 1, ..., levels - 1` repeated until `len` samples exist.
pub fn ramp(len: usize, levels: u32) -> Vec<Sample> {
    (0..len).map(|i| (i as u32 % levels) as Sample).collect()
}

/// `len` copies of `value`.
pub fn uniform(len: usize, value: Sample) -> Vec<Sample> {
    vec![value; len]
}

/// Random samples squeezed into `[low, low + width)`, the typical input
/// that equalization stretches.
pub fn low_contrast(len: usize, low: Sample, width: u32, seed: u64) -> Vec<Sample> {
    let mut rng = SimpleRng::new(seed);
    (0..len)
        .map(|_| low + rng.below(width.max(1) as u64) as Sample)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        assert_eq!(random_samples(64, 256, 7), random_samples(64, 256, 7));
        assert_ne!(random_samples(64, 256, 7), random_samples(64, 256, 8));
    }

    #[test]
    fn test_random_samples_in_range() {
        assert!(random_samples(1000, 64, 1).iter().all(|&s| s < 64));
    }

    #[test]
    fn test_low_contrast_range() {
        let data = low_contrast(500, 100, 20, 3);
        assert!(data.iter().all(|&s| (100..120).contains(&s)));
    }

    #[test]
    fn test_ramp_wraps() {
        assert_eq!(ramp(6, 4), vec![0, 1, 2, 3, 0, 1]);
        assert_eq!(uniform(3, 9), vec![9, 9, 9]);
    }
}
