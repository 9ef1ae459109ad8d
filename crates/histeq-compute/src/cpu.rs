//! Multi-threaded CPU backend built on rayon
//!
//! Blocks are distributed over rayon workers. A panic inside a kernel is
//! caught at the join and reported as [`ComputeError::DispatchFailed`],
//! so a broken kernel aborts the run instead of the process.

use crate::backend::{BlockId, Completion, ComputeBackend};
use crate::error::{ComputeError, ComputeResult};
use histeq_core::BlockPlan;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

/// Default maximum block width, a common GPU workgroup limit.
pub const DEFAULT_MAX_BLOCK_WIDTH: usize = 256;

/// rayon-backed compute backend.
pub struct CpuBackend {
    max_block_width: usize,
    pool: Option<ThreadPool>,
}

impl CpuBackend {
    /// Backend on the global rayon pool with the default block width.
    pub fn new() -> Self {
        Self {
            max_block_width: DEFAULT_MAX_BLOCK_WIDTH,
            pool: None,
        }
    }

    /// Backend on the global rayon pool reporting `width` as its maximum
    /// block width. Small widths force multi-block scans.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::Core`] for a zero width.
    pub fn with_max_block_width(width: usize) -> ComputeResult<Self> {
        if width == 0 {
            return Err(histeq_core::Error::InvalidParameter(
                "max block width must be >= 1".into(),
            )
            .into());
        }
        Ok(Self {
            max_block_width: width,
            pool: None,
        })
    }

    /// Run dispatches on a dedicated pool of `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`ComputeError::ThreadPool`] if the pool cannot be built.
    pub fn with_threads(mut self, threads: usize) -> ComputeResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("histeq-worker-{i}"))
            .build()
            .map_err(|e| ComputeError::ThreadPool(e.to_string()))?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Number of worker threads used by dispatches.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `f` on this backend's pool and turn a panic into an error.
    fn run<R, F>(&self, kernel: &'static str, f: F) -> ComputeResult<R>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        let outcome = match &self.pool {
            Some(pool) => catch_unwind(AssertUnwindSafe(|| pool.install(f))),
            None => catch_unwind(AssertUnwindSafe(f)),
        };
        outcome.map_err(|payload| {
            let message = panic_message(payload.as_ref());
            tracing::error!(kernel, %message, "kernel dispatch failed");
            ComputeError::DispatchFailed { kernel, message }
        })
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuBackend")
            .field("max_block_width", &self.max_block_width)
            .field("threads", &self.threads())
            .finish()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu-rayon"
    }

    fn max_block_width(&self) -> usize {
        self.max_block_width
    }

    fn dispatch<F>(&self, kernel: &'static str, plan: &BlockPlan, body: F) -> ComputeResult<Completion>
    where
        F: Fn(BlockId) + Send + Sync,
    {
        let start = Instant::now();
        self.run(kernel, || {
            (0..plan.num_blocks())
                .into_par_iter()
                .for_each(|i| body(BlockId::new(i, plan)));
        })?;
        let completion = Completion::new(kernel, plan.num_blocks(), start.elapsed());
        tracing::trace!(kernel, blocks = completion.blocks, elapsed = ?completion.elapsed, "dispatch joined");
        Ok(completion)
    }

    fn dispatch_mut<T, F>(
        &self,
        kernel: &'static str,
        plan: &BlockPlan,
        data: &mut [T],
        body: F,
    ) -> ComputeResult<Completion>
    where
        T: Send,
        F: Fn(BlockId, &mut [T]) + Send + Sync,
    {
        if data.len() != plan.len() {
            return Err(ComputeError::GridMismatch {
                kernel,
                expected: plan.len(),
                actual: data.len(),
            });
        }

        let start = Instant::now();
        self.run(kernel, || {
            data.par_chunks_mut(plan.block_size())
                .enumerate()
                .for_each(|(i, chunk)| body(BlockId::new(i, plan), chunk));
        })?;
        let completion = Completion::new(kernel, plan.num_blocks(), start.elapsed());
        tracing::trace!(kernel, blocks = completion.blocks, elapsed = ?completion.elapsed, "dispatch joined");
        Ok(completion)
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "kernel panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AtomicCounters;
    use crate::buffer::AccessMode;

    #[test]
    fn test_dispatch_visits_every_block() {
        let backend = CpuBackend::with_max_block_width(4).unwrap();
        let plan = backend.plan(16).unwrap();
        let seen = AtomicCounters::new(plan.num_blocks());
        let done = backend
            .dispatch("visit", &plan, |block| {
                seen.fetch_add(block.index, block.len as u64);
            })
            .unwrap();
        assert_eq!(done.blocks, 4);
        assert_eq!(seen.into_vec(), vec![4, 4, 4, 4]);
    }

    #[test]
    fn test_dispatch_mut_hands_out_disjoint_blocks() {
        let backend = CpuBackend::with_max_block_width(3).unwrap();
        let mut data = vec![0usize; 9];
        let plan = backend.plan(data.len()).unwrap();
        backend
            .dispatch_mut("fill", &plan, &mut data, |block, chunk| {
                for (i, v) in chunk.iter_mut().enumerate() {
                    *v = block.offset + i;
                }
            })
            .unwrap();
        assert_eq!(data, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_grid_mismatch() {
        let backend = CpuBackend::new();
        let plan = backend.plan(8).unwrap();
        let mut data = vec![0u32; 7];
        let err = backend
            .dispatch_mut("bad", &plan, &mut data, |_, _| {})
            .unwrap_err();
        assert!(matches!(err, ComputeError::GridMismatch { expected: 8, actual: 7, .. }));
    }

    #[test]
    fn test_kernel_panic_becomes_error() {
        let backend = CpuBackend::with_max_block_width(2).unwrap();
        let plan = backend.plan(4).unwrap();
        let err = backend
            .dispatch("explode", &plan, |block| {
                if block.index == 1 {
                    panic!("block 1 failed");
                }
            })
            .unwrap_err();
        match err {
            ComputeError::DispatchFailed { kernel, message } => {
                assert_eq!(kernel, "explode");
                assert!(message.contains("block 1 failed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dedicated_pool() {
        let backend = CpuBackend::with_max_block_width(8)
            .unwrap()
            .with_threads(2)
            .unwrap();
        assert_eq!(backend.threads(), 2);
        let mut data = vec![1u64; 32];
        let plan = backend.plan(data.len()).unwrap();
        backend
            .dispatch_mut("double", &plan, &mut data, |_, chunk| {
                chunk.iter_mut().for_each(|v| *v *= 2);
            })
            .unwrap();
        assert!(data.iter().all(|&v| v == 2));
    }

    #[test]
    fn test_buffer_roundtrip_through_backend() {
        let backend = CpuBackend::new();
        let mut buf = backend.allocate::<u32>(3, AccessMode::ReadOnly).unwrap();
        backend.upload(&mut buf, &[7, 8, 9]).unwrap();
        assert_eq!(backend.download(&buf).unwrap(), vec![7, 8, 9]);
        assert!(backend.upload(&mut buf, &[1]).is_err());
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(CpuBackend::with_max_block_width(0).is_err());
    }
}
