//! Compute backend interface
//!
//! A backend runs a kernel once per block of a [`BlockPlan`] and returns
//! only when every block has finished, so each dispatch is a full barrier.
//! Every parallel stage allocates its buffers, uploads its inputs and
//! downloads its results through the backend; the default implementations
//! keep buffers in host memory.

use crate::buffer::{AccessMode, DeviceBuffer, Element};
use crate::error::ComputeResult;
use histeq_core::{BlockPlan, plan_blocks};
use std::ops::Range;
use std::time::Duration;

/// Position of one block within a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockId {
    /// Block index
    pub index: usize,
    /// Global index of the block's first element
    pub offset: usize,
    /// Number of elements in the block
    pub len: usize,
}

impl BlockId {
    /// Identify block `index` of `plan`.
    pub fn new(index: usize, plan: &BlockPlan) -> Self {
        Self {
            index,
            offset: index * plan.block_size(),
            len: plan.block_size(),
        }
    }

    /// Global element range covered by the block.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Record of a finished dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Kernel name
    pub kernel: &'static str,
    /// Blocks executed
    pub blocks: usize,
    /// Wall-clock time from dispatch to join
    pub elapsed: Duration,
}

impl Completion {
    /// Create a completion record.
    pub fn new(kernel: &'static str, blocks: usize, elapsed: Duration) -> Self {
        Self {
            kernel,
            blocks,
            elapsed,
        }
    }
}

/// A data-parallel executor.
///
/// Implementors provide the block width limit and the two dispatch shapes;
/// block planning and buffer transfers have default implementations.
pub trait ComputeBackend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Widest block the backend can synchronize as one group.
    fn max_block_width(&self) -> usize;

    /// Run `body` once per block of `plan`, in parallel.
    ///
    /// Kernels dispatched this way communicate only through shared
    /// atomics or captured read-only data.
    fn dispatch<F>(&self, kernel: &'static str, plan: &BlockPlan, body: F) -> ComputeResult<Completion>
    where
        F: Fn(BlockId) + Send + Sync;

    /// Run `body` once per block of `plan`, handing each block its own
    /// disjoint mutable slice of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::GridMismatch`](crate::ComputeError::GridMismatch)
    /// if `data.len()` differs from `plan.len()`.
    fn dispatch_mut<T, F>(
        &self,
        kernel: &'static str,
        plan: &BlockPlan,
        data: &mut [T],
        body: F,
    ) -> ComputeResult<Completion>
    where
        T: Send,
        F: Fn(BlockId, &mut [T]) + Send + Sync;

    /// Plan blocks for `len` elements on this backend.
    fn plan(&self, len: usize) -> ComputeResult<BlockPlan> {
        Ok(plan_blocks(len, self.max_block_width())?)
    }

    /// Allocate a zeroed buffer of `len` elements.
    fn allocate<T: Element>(&self, len: usize, access: AccessMode) -> ComputeResult<DeviceBuffer<T>> {
        Ok(DeviceBuffer::zeroed(len, access))
    }

    /// Copy host data into a buffer of the same length.
    fn upload<T: Element>(&self, buffer: &mut DeviceBuffer<T>, host: &[T]) -> ComputeResult<()> {
        buffer.write_from_host(host)
    }

    /// Allocate a buffer sized to `host` and upload it.
    fn upload_new<T: Element>(&self, host: &[T], access: AccessMode) -> ComputeResult<DeviceBuffer<T>> {
        let mut buffer = self.allocate(host.len(), access)?;
        self.upload(&mut buffer, host)?;
        Ok(buffer)
    }

    /// Copy a buffer back to host memory.
    fn download<T: Element>(&self, buffer: &DeviceBuffer<T>) -> ComputeResult<Vec<T>> {
        Ok(buffer.as_slice().to_vec())
    }
}
