//! histeq-compute - Data-parallel execution for the equalization pipeline
//!
//! This crate provides:
//!
//! - [`ComputeBackend`] - dispatch over blocks, buffer allocation and transfer
//! - [`CpuBackend`] - rayon implementation with a configurable block width
//! - [`AtomicCounters`] - interleaving-independent shared accumulation
//! - [`DoubleBuffer`] - generation-counted state for step-synchronous kernels

pub mod atomic;
pub mod backend;
pub mod buffer;
pub mod cpu;
mod error;

pub use atomic::AtomicCounters;
pub use backend::{BlockId, Completion, ComputeBackend};
pub use buffer::{AccessMode, DeviceBuffer, DoubleBuffer, Element};
pub use cpu::{CpuBackend, DEFAULT_MAX_BLOCK_WIDTH};
pub use error::{ComputeError, ComputeResult};
