//! Polyphonic voice-rendering core for a three-oscillator subtractive synth.
//!
//! A [`synth::Voice`] owns three oscillators, three ADSR envelopes, two
//! filters and three LFOs, and mixes one note into a caller-supplied
//! [`io::AudioBuffer`]. Timbre comes from a shared [`params::ParameterSet`]
//! that a control thread may write while the audio thread renders.

pub mod dsp;
pub mod error;
pub mod io;
pub mod params;
pub mod synth; // Voice management and polyphony

pub use error::{ParamError, VoiceError};
pub use io::AudioBuffer;
pub use params::{ParamId, ParameterSet};
pub use synth::{SoundDescriptor, SynthSound, SynthVoice, Voice, VoiceConfig};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const MAX_POLYPHONY: usize = 8;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
