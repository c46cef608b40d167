//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyvoice::dsp::{Oscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),         // sin() per sample
        ("saw", Waveform::Saw),           // ramp + one PolyBLEP
        ("square", Waveform::Square),     // two PolyBLEPs
        ("triangle", Waveform::Triangle), // branch per sample
        ("noise", Waveform::Noise),       // xorshift PRNG
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(48_000.0);
            osc.set_params(waveform, 0, 0, 1.0);
            osc.set_frequency(440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = osc.next_sample();
                    }
                    black_box(&mut buffer);
                })
            });
        }

        // Per-sample pitch modulation, as used for vibrato and pitch bend
        let mut osc = Oscillator::new(48_000.0);
        osc.set_params(Waveform::Saw, 0, 0, 1.0);
        osc.set_frequency(440.0);
        group.bench_with_input(BenchmarkId::new("saw_modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    osc.modulate_pitch(black_box(1.0 + i as f32 * 1e-5));
                    *sample = osc.next_sample();
                }
                black_box(&mut buffer);
            })
        });
    }

    group.finish();
}
