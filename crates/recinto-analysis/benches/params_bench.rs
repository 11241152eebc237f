//! Criterion benchmarks for recinto-analysis
//!
//! Run with: cargo bench -p recinto-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use recinto_analysis::synth::synthetic_capture;
use recinto_analysis::{
    DrIntegrationLimit, analyze_a_format, direct_sound_arrival, find_peaks,
};

const SAMPLE_RATE: u32 = 48000;

fn bench_a_to_b(c: &mut Criterion) {
    let mut group = c.benchmark_group("a_to_b");
    for seconds in [1.0, 4.0] {
        let capture = synthetic_capture(SAMPLE_RATE, seconds, 4800, 0.01).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &capture, |b, capture| {
            b.iter(|| black_box(capture.to_b_format()))
        });
    }
    group.finish();
}

fn bench_peaks(c: &mut Criterion) {
    let capture = synthetic_capture(SAMPLE_RATE, 2.0, 4800, 0.01).unwrap();
    let b_format = capture.to_b_format();
    c.bench_function("find_peaks_2s", |b| b.iter(|| black_box(find_peaks(black_box(b_format.w())))));
    c.bench_function("direct_sound_arrival_2s", |b| {
        b.iter(|| black_box(direct_sound_arrival(black_box(b_format.w()), SAMPLE_RATE)))
    });
}

fn bench_full_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_a_format");
    for seconds in [1.0, 4.0] {
        let capture = synthetic_capture(SAMPLE_RATE, seconds, 4800, 0.01).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(seconds), &capture, |b, capture| {
            b.iter(|| black_box(analyze_a_format(capture, DrIntegrationLimit::default())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_a_to_b, bench_peaks, bench_full_extraction);
criterion_main!(benches);
