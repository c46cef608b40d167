//! Low-level DSP primitives owned by each voice.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the per-sample
//! signal-processing math; routing and parameter plumbing live in `synth`.

/// Soft-clip drive stage.
pub mod distortion;
/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Low frequency oscillators for pitch, amplitude and cutoff modulation.
pub mod lfo;
/// Band-limited oscillator waveforms and noise sources.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeStage};
pub use filter::{FilterRouting, FilterType, SVFilter};
pub use lfo::{Lfo, LfoDestination};
pub use oscillator::{NoiseSource, Oscillator, Waveform};
