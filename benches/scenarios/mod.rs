//! Benchmarks for complete voices and the poly synth.

mod voices;

pub use voices::bench_voices;
