//! Buffer transfer regression test
//!
//! Tests that the parallel stages move their data through the backend:
//!   (1) samples go up read-only, results come back through downloads
//!   (2) kernels cannot write a read-only buffer
//!   (3) an all-serial run issues no transfers at all

use histeq_compute::{
    AccessMode, BlockId, Completion, ComputeBackend, ComputeResult, CpuBackend, DeviceBuffer,
    Element,
};
use histeq_core::{BlockPlan, EqualizeOptions, ExecutionMode, PlanarImage, ScanAlgorithm};
use histeq_pipeline::HistogramPipeline;
use histeq_test::synthetic::random_samples;
use histeq_test::{RegParams, init_test_logging};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    Allocate(usize, AccessMode),
    Upload(usize),
    Download(usize),
}

/// CPU backend that logs every buffer operation.
struct RecordingBackend {
    inner: CpuBackend,
    log: Mutex<Vec<Transfer>>,
}

impl RecordingBackend {
    fn new(width: usize) -> Self {
        Self {
            inner: CpuBackend::with_max_block_width(width).expect("backend"),
            log: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, transfer: Transfer) {
        self.log.lock().expect("log").push(transfer);
    }

    fn transfers(&self) -> Vec<Transfer> {
        self.log.lock().expect("log").clone()
    }
}

impl ComputeBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn max_block_width(&self) -> usize {
        self.inner.max_block_width()
    }

    fn dispatch<F>(&self, kernel: &'static str, plan: &BlockPlan, body: F) -> ComputeResult<Completion>
    where
        F: Fn(BlockId) + Send + Sync,
    {
        self.inner.dispatch(kernel, plan, body)
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
        self.inner.dispatch_mut(kernel, plan, data, body)
    }

    fn allocate<T: Element>(&self, len: usize, access: AccessMode) -> ComputeResult<DeviceBuffer<T>> {
        self.push(Transfer::Allocate(len, access));
        self.inner.allocate(len, access)
    }

    fn upload<T: Element>(&self, buffer: &mut DeviceBuffer<T>, host: &[T]) -> ComputeResult<()> {
        self.push(Transfer::Upload(host.len()));
        self.inner.upload(buffer, host)
    }

    fn download<T: Element>(&self, buffer: &DeviceBuffer<T>) -> ComputeResult<Vec<T>> {
        self.push(Transfer::Download(buffer.len()));
        self.inner.download(buffer)
    }
}

/// Test 1: a parallel run uploads its inputs and downloads its results.
#[test]
fn transfer_reg_parallel_stages() {
    init_test_logging();
    let mut rp = RegParams::new("transfer_parallel");

    let samples = 64 * 48;
    let image = PlanarImage::gray(64, 48, 256, random_samples(samples, 256, 23)).expect("image");
    for algorithm in [ScanAlgorithm::HillisSteele, ScanAlgorithm::Blelloch] {
        let backend = RecordingBackend::new(16);
        let options = EqualizeOptions::with_bins(64)
            .scan(algorithm)
            .reduce(ExecutionMode::Parallel);
        let reference = HistogramPipeline::new(CpuBackend::new(), options.clone())
            .run(&image)
            .expect("reference");
        let pipeline = HistogramPipeline::new(backend, options);
        let out = pipeline.run(&image).expect("run");
        rp.compare_samples(reference.output.as_slice(), out.output.as_slice());

        let log = pipeline.backend().transfers();
        let count = |t: Transfer| log.iter().filter(|&&x| x == t).count() as f64;

        // Binner and Equalizer each upload the samples read-only
        rp.compare_values(2.0, count(Transfer::Allocate(samples, AccessMode::ReadOnly)), 0.0);
        rp.compare_values(2.0, count(Transfer::Upload(samples)), 0.0);
        // Equalized output comes back through a write-only buffer
        rp.compare_values(1.0, count(Transfer::Allocate(samples, AccessMode::WriteOnly)), 0.0);
        rp.compare_values(1.0, count(Transfer::Download(samples)), 0.0);
        // Normalized table is written on the backend
        rp.compare_values(1.0, count(Transfer::Allocate(64, AccessMode::WriteOnly)), 0.0);
        // Scan buffer and reduction tree, plus the Blelloch tree buffer
        let read_write = if algorithm == ScanAlgorithm::Blelloch { 3.0 } else { 2.0 };
        rp.compare_values(read_write, count(Transfer::Allocate(64, AccessMode::ReadWrite)), 0.0);
        // Scan, reduce, normalize and equalize each download once
        let downloads = log
            .iter()
            .filter(|t| matches!(t, Transfer::Download(_)))
            .count();
        rp.compare_values(4.0, downloads as f64, 0.0);
    }

    assert!(rp.cleanup(), "transfer_parallel regression test failed");
}

/// Test 2: writes to a read-only buffer are refused.
#[test]
fn transfer_reg_read_only_buffer() {
    let mut rp = RegParams::new("transfer_read_only");

    let backend = CpuBackend::new();
    let mut samples = backend
        .upload_new(&[1u16, 2, 3, 4], AccessMode::ReadOnly)
        .expect("upload");
    let refused = samples.as_mut_slice().is_err();
    rp.compare_values(1.0, if refused { 1.0 } else { 0.0 }, 0.0);
    rp.compare_samples(&[1, 2, 3, 4], &backend.download(&samples).expect("download"));

    assert!(rp.cleanup(), "transfer_read_only regression test failed");
}

/// Test 3: serial stages never touch backend buffers.
#[test]
fn transfer_reg_serial_run() {
    init_test_logging();
    let mut rp = RegParams::new("transfer_serial");

    let image = PlanarImage::gray(32, 32, 256, random_samples(1024, 256, 8)).expect("image");
    let options = EqualizeOptions::with_bins(32)
        .all_stages(ExecutionMode::Serial)
        .scan(ScanAlgorithm::Serial);
    let pipeline = HistogramPipeline::new(RecordingBackend::new(32), options);
    pipeline.run(&image).expect("run");
    rp.compare_values(0.0, pipeline.backend().transfers().len() as f64, 0.0);

    assert!(rp.cleanup(), "transfer_serial regression test failed");
}
