//! Device buffers and double-buffered scan state

use crate::error::{ComputeError, ComputeResult};

/// Element types that can live in a device buffer.
pub trait Element: Copy + Default + Send + Sync + 'static {}

impl Element for u16 {}
impl Element for u32 {}
impl Element for u64 {}

/// How kernels may access a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Kernels only read; the host uploads
    ReadOnly,
    /// Kernels only write; the host downloads
    WriteOnly,
    /// Kernels read and write
    ReadWrite,
}

impl AccessMode {
    /// True if kernels may write to the buffer.
    pub fn kernel_writable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

/// A fixed-length buffer owned by a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceBuffer<T> {
    data: Vec<T>,
    access: AccessMode,
}

impl<T: Element> DeviceBuffer<T> {
    /// Allocate `len` zeroed elements.
    pub fn zeroed(len: usize, access: AccessMode) -> Self {
        Self {
            data: vec![T::default(); len],
            access,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Kernel access mode.
    #[inline]
    pub fn access(&self) -> AccessMode {
        self.access
    }

    /// Kernel-side read view.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Kernel-side write view.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ReadOnlyBuffer`] for a read-only buffer.
    pub fn as_mut_slice(&mut self) -> ComputeResult<&mut [T]> {
        if !self.access.kernel_writable() {
            return Err(ComputeError::ReadOnlyBuffer);
        }
        Ok(&mut self.data)
    }

    /// Host-side copy into the buffer. Allowed for every access mode.
    pub(crate) fn write_from_host(&mut self, host: &[T]) -> ComputeResult<()> {
        if host.len() != self.data.len() {
            return Err(ComputeError::Transfer {
                expected: self.data.len(),
                actual: host.len(),
            });
        }
        self.data.copy_from_slice(host);
        Ok(())
    }
}

/// Two equally sized arrays used by step-synchronous algorithms.
///
/// Each step reads the previous snapshot (`front`) and writes the next one
/// (`back`); [`DoubleBuffer::swap`] publishes the step and bumps the
/// generation. Read and write views of one step never alias.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    front: Vec<T>,
    back: Vec<T>,
    generation: u64,
}

impl<T: Element> DoubleBuffer<T> {
    /// Start from `initial` at generation 0.
    pub fn new(initial: Vec<T>) -> Self {
        let back = initial.clone();
        Self {
            front: initial,
            back,
            generation: 0,
        }
    }

    /// Number of completed steps.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current snapshot.
    pub fn front(&self) -> &[T] {
        &self.front
    }

    /// Previous snapshot for reading and next snapshot for writing.
    pub fn split(&mut self) -> (&[T], &mut [T]) {
        (&self.front, &mut self.back)
    }

    /// Publish the written snapshot as the current one.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
        self.generation += 1;
    }

    /// Consume and return the current snapshot.
    pub fn into_front(self) -> Vec<T> {
        self.front
    }
}
