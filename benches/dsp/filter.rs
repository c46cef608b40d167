//! Benchmarks for state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvoice::dsp::{FilterRouting, FilterType, SVFilter};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, filter_type) in [
            ("lowpass", FilterType::LowPass),
            ("highpass", FilterType::HighPass),
            ("bandpass", FilterType::BandPass),
            ("notch", FilterType::Notch),
        ] {
            let mut filter = SVFilter::new(48_000.0);
            filter.set_params(filter_type, 1000.0, 0.5, 0.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // Envelope-swept cutoff forces a coefficient update every sample
        let mut filter = SVFilter::new(48_000.0);
        filter.set_params(FilterType::LowPass, 400.0, 0.8, 0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_swept", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for (i, sample) in buffer.iter_mut().enumerate() {
                    filter.set_envelope_modulation(i as f32 / size as f32);
                    *sample = filter.process(*sample);
                }
                black_box(&mut buffer);
            })
        });

        // Two filters in parallel
        let mut first = SVFilter::lowpass(48_000.0, 800.0);
        let mut second = SVFilter::highpass(48_000.0, 2000.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("parallel_pair", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                for sample in buffer.iter_mut() {
                    *sample = FilterRouting::Parallel.process(&mut first, &mut second, *sample);
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
