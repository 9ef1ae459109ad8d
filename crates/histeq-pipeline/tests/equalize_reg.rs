//! Equalization regression test
//!
//! Tests the stages end to end:
//!   (1) the 8-sample / 4-bin worked example, stage by stage, in every mode
//!   (2) full pipeline on synthetic low-contrast data, every scan algorithm
//!   (3) histogram sum, cumulative monotonicity and output range invariants
//!   (4) 16-bit input

use histeq_compute::CpuBackend;
use histeq_core::{
    BinLayout, DegeneratePolicy, EqualizeOptions, ExecutionMode, PlanarImage, ScanAlgorithm,
    SampleSource,
};
use histeq_pipeline::normalizer::Normalizer;
use histeq_pipeline::{HistogramPipeline, binner, equalizer, reducer, scan};
use histeq_test::synthetic::{low_contrast, random_samples};
use histeq_test::{RegParams, init_test_logging};

const MODES: [ExecutionMode; 2] = [ExecutionMode::Serial, ExecutionMode::Parallel];
const ALGORITHMS: [ScanAlgorithm; 3] = [
    ScanAlgorithm::Serial,
    ScanAlgorithm::HillisSteele,
    ScanAlgorithm::Blelloch,
];

/// Test 1: levels=256, bins=4, samples [10,10,100,200,200,200,255,5].
#[test]
fn equalize_reg_worked_example() {
    init_test_logging();
    let mut rp = RegParams::new("equalize_example");

    let samples = [10, 10, 100, 200, 200, 200, 255, 5];
    let layout = BinLayout::new(4, 256).expect("layout");
    rp.compare_values(64.0, layout.divider() as f64, 0.0);

    for width in [1, 2, 3, 4, 256] {
        let backend = CpuBackend::with_max_block_width(width).expect("backend");
        for mode in MODES {
            let hist = binner::bin(&backend, &samples, &layout, mode).expect("bin");
            rp.compare_counts(&[3, 1, 0, 4], hist.as_slice());

            for algorithm in ALGORITHMS {
                let out = scan(&backend, &hist, algorithm).expect("scan");
                rp.compare_counts(&[3, 4, 4, 8], out.cumulative.as_slice());
            }

            let cumulative = scan(&backend, &hist, ScanAlgorithm::Blelloch)
                .expect("scan")
                .cumulative;
            let extrema = reducer::extrema(&backend, &cumulative, mode).expect("extrema");
            rp.compare_values(3.0, extrema.min_non_zero as f64, 0.0);
            rp.compare_values(8.0, extrema.max as f64, 0.0);

            let normalizer =
                Normalizer::new(layout, 1, DegeneratePolicy::PassThrough).expect("normalizer");
            let normalized = normalizer
                .normalize(&backend, &cumulative, Some(extrema), mode)
                .expect("normalize");
            let expected = [0u32, 51, 0, 255];
            for (bin, &v) in expected.iter().enumerate() {
                rp.compare_values(v as f64, normalized[bin] as f64, 0.0);
            }

            let output = equalizer::equalize(&backend, &samples, &normalized, &layout, mode)
                .expect("equalize");
            rp.compare_samples(&[0, 0, 51, 255, 255, 255, 255, 0], output.as_slice());
        }
    }

    assert!(rp.cleanup(), "equalize_example regression test failed");
}

/// Test 2: every option combination gives the same output.
#[test]
fn equalize_reg_option_equivalence() {
    init_test_logging();
    let mut rp = RegParams::new("equalize_options");

    let data = low_contrast(320 * 240, 90, 40, 2024);
    let image = PlanarImage::gray(320, 240, 256, data).expect("image");

    let reference = HistogramPipeline::new(
        CpuBackend::new(),
        EqualizeOptions::with_bins(256)
            .all_stages(ExecutionMode::Serial)
            .scan(ScanAlgorithm::Serial),
    )
    .run(&image)
    .expect("reference run");

    for width in [32, 64, 256] {
        for algorithm in ALGORITHMS {
            for mode in MODES {
                let options = EqualizeOptions::with_bins(256)
                    .all_stages(mode)
                    .scan(algorithm);
                let backend = CpuBackend::with_max_block_width(width).expect("backend");
                let out = HistogramPipeline::new(backend, options)
                    .run(&image)
                    .expect("run");
                rp.compare_counts(reference.histogram.as_slice(), out.histogram.as_slice());
                rp.compare_counts(reference.cumulative.as_slice(), out.cumulative.as_slice());
                rp.compare_samples(reference.output.as_slice(), out.output.as_slice());
            }
        }
    }

    // The stretched output spans the full range
    let min = reference.output.as_slice().iter().min().copied().unwrap_or(0);
    let max = reference.output.as_slice().iter().max().copied().unwrap_or(0);
    rp.compare_values(0.0, min as f64, 0.0);
    rp.compare_values(255.0, max as f64, 0.0);

    assert!(rp.cleanup(), "equalize_options regression test failed");
}

/// Test 3: structural invariants over several bin counts.
#[test]
fn equalize_reg_invariants() {
    init_test_logging();
    let mut rp = RegParams::new("equalize_invariants");

    let data = random_samples(10_007, 256, 99);
    let image = PlanarImage::gray(10_007, 1, 256, data).expect("image");

    for bins in [32, 64, 128, 256] {
        let pipeline = HistogramPipeline::new(CpuBackend::new(), EqualizeOptions::with_bins(bins));
        let out = pipeline.run(&image).expect("run");

        rp.compare_values(image.sample_count() as f64, out.histogram.total() as f64, 0.0);
        rp.compare_values(
            image.sample_count() as f64,
            out.cumulative.last().unwrap_or(0) as f64,
            0.0,
        );
        rp.compare_values(1.0, out.cumulative.is_non_decreasing() as u8 as f64, 0.0);
        rp.compare_values(0.0, out.normalized[0] as f64, 0.0);
        let in_range = out.normalized.iter().all(|v| v <= 255);
        rp.compare_values(1.0, in_range as u8 as f64, 0.0);
        rp.compare_values(image.sample_count() as f64, out.output.len() as f64, 0.0);

        // Every output sample is the lookup of its own bin
        let layout = out.layout;
        let consistent = image
            .intensity()
            .iter()
            .zip(out.output.as_slice())
            .all(|(&s, &o)| out.normalized[layout.bin_of(s)] as u16 == o);
        rp.compare_values(1.0, consistent as u8 as f64, 0.0);
    }

    assert!(rp.cleanup(), "equalize_invariants regression test failed");
}

/// Test 4: 16-bit samples with 256 bins (divider 256).
#[test]
fn equalize_reg_16bit() {
    init_test_logging();
    let mut rp = RegParams::new("equalize_16bit");

    let data = low_contrast(4096, 20_000, 5_000, 7);
    let image = PlanarImage::gray(64, 64, 65_536, data).expect("image");
    let out = HistogramPipeline::new(CpuBackend::new(), EqualizeOptions::with_bins(256))
        .run(&image)
        .expect("run");

    rp.compare_values(256.0, out.layout.divider() as f64, 0.0);
    rp.compare_values(65_535.0, out.normalized.iter().max().unwrap_or(0) as f64, 0.0);
    let max_out = out.output.as_slice().iter().max().copied().unwrap_or(0);
    rp.compare_values(65_535.0, max_out as f64, 0.0);

    assert!(rp.cleanup(), "equalize_16bit regression test failed");
}
