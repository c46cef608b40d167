//! Benchmarks for the drive stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvoice::dsp::distortion;

use crate::BLOCK_SIZES;

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sine-like values)
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("soft_clip", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = distortion::soft_clip(*sample, black_box(4.0));
                }
                black_box(&mut buffer);
            })
        });

        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("drive", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = distortion::apply_drive(*sample, black_box(0.6));
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
