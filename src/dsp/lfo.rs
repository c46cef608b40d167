//! Low Frequency Oscillator (LFO) modulation sources.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::oscillator::{Oscillator, Waveform};

/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running at sub-audio frequencies (0.01 - 20 Hz). The
waveform math is identical to the audio oscillator; only the frequency range
and the use differ. Its output is a control signal, never audio.

Each voice carries three:

  lfo 1, lfo 2   Configured from the parameter set (destination, waveform,
                 frequency, depth).
  mod wheel      Fixed 5.5 Hz sine vibrato, depth follows CC1.


Destinations
------------

  Pitch       Vibrato. The bipolar value becomes a frequency ratio:

                  ratio = 2^(value × VIBRATO_RANGE_SEMITONES / 12)

              At full depth the pitch swings one semitone either side.

  Amplitude   Tremolo. The value becomes a gain factor that never exceeds
              unity:

                  factor = 1 - (depth - value) / 2

              value = +depth → 1.0, value = -depth → 1 - depth.

  Filter      Cutoff sweep, scaled per filter by its LFO sensitivity slot.


Free-running
------------

LFO phase is not touched by note-on. Consecutive notes catch the modulation
wherever it happens to be, which keeps held chords from pulsing in lockstep.
`resync` exists for callers that want every note to start at phase zero.
*/

pub const MIN_LFO_HZ: f32 = 0.01;
pub const MAX_LFO_HZ: f32 = 20.0;
pub const VIBRATO_RANGE_SEMITONES: f32 = 1.0;

/// What an LFO modulates. Index order matches the `dest` parameter slots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoDestination {
    #[default]
    Pitch,
    Amplitude,
    Filter,
}

impl LfoDestination {
    /// Unknown values route to pitch.
    pub fn from_param(value: f32) -> Self {
        if !value.is_finite() {
            return LfoDestination::Pitch;
        }
        match value.round() as i32 {
            1 => LfoDestination::Amplitude,
            2 => LfoDestination::Filter,
            _ => LfoDestination::Pitch,
        }
    }
}

pub struct Lfo {
    osc: Oscillator,
    depth: f32,
    frequency: f32,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        let mut lfo = Self {
            osc: Oscillator::with_seed(sample_rate, 0x2545_F491),
            depth: 0.0,
            frequency: 5.0,
        };
        lfo.set_params(Waveform::Sine, 5.0, 0.0);
        lfo
    }

    pub fn set_params(&mut self, waveform: Waveform, freq_hz: f32, depth: f32) {
        self.frequency = if freq_hz.is_finite() {
            freq_hz.clamp(MIN_LFO_HZ, MAX_LFO_HZ)
        } else {
            MIN_LFO_HZ
        };
        self.depth = if depth.is_finite() {
            depth.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.osc.set_params(waveform, 0, 0, 1.0);
        self.osc.set_frequency(self.frequency);
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = if depth.is_finite() {
            depth.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Next modulation value in [-depth, depth].
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        self.osc.next_sample() * self.depth
    }

    pub fn resync(&mut self) {
        self.osc.reset(0.0);
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

/// Convert a bipolar modulation value into a frequency ratio (vibrato).
#[inline]
pub fn pitch_ratio(value: f32) -> f32 {
    2.0_f32.powf(value * VIBRATO_RANGE_SEMITONES / 12.0)
}

/// Convert a modulation value into a tremolo gain in [1 - depth, 1].
#[inline]
pub fn tremolo_gain(value: f32, depth: f32) -> f32 {
    1.0 - (depth - value) * 0.5
}
