//! Atomic accumulation shared by concurrent workers
//!
//! The histogram is the one place where workers update the same memory.
//! Every update goes through [`AtomicCounters::fetch_add`]; addition is
//! commutative and associative, so the final values do not depend on how
//! the updates interleave.

use std::sync::atomic::{AtomicU64, Ordering};

/// Fixed-length array of atomic `u64` counters.
#[derive(Debug, Default)]
pub struct AtomicCounters {
    counters: Vec<AtomicU64>,
}

impl AtomicCounters {
    /// Create `len` counters at zero.
    pub fn new(len: usize) -> Self {
        Self {
            counters: (0..len).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Number of counters.
    #[inline]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// True if there are no counters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Atomically add `delta` to counter `index`, returning the old value.
    ///
    /// Relaxed ordering is enough: results are only read after the
    /// dispatch that performed the updates has joined.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn fetch_add(&self, index: usize, delta: u64) -> u64 {
        self.counters[index].fetch_add(delta, Ordering::Relaxed)
    }

    /// Fold a worker-local histogram into the shared counters.
    ///
    /// Zero entries are skipped to avoid needless contention.
    pub fn merge(&self, local: &[u64]) {
        for (index, &delta) in local.iter().enumerate().take(self.counters.len()) {
            if delta != 0 {
                self.fetch_add(index, delta);
            }
        }
    }

    /// Current value of counter `index`, or `None` when out of range.
    pub fn load(&self, index: usize) -> Option<u64> {
        self.counters.get(index).map(|c| c.load(Ordering::Relaxed))
    }

    /// Consume and return the final values.
    pub fn into_vec(self) -> Vec<u64> {
        self.counters.into_iter().map(AtomicU64::into_inner).collect()
    }
}
