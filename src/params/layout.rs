//! The frozen parameter index.
//!
//! Slot numbers are part of the host contract: editors and preset loaders
//! write by index, so variants are never reordered or renumbered. New slots go
//! at the end.

use crate::error::ParamError;

pub const NUM_PARAMS: usize = 66;

/// Symbolic index into the shared parameter array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum ParamId {
    // oscillators
    Osc1Wave = 0,
    Osc1Octave,
    Osc1Level,
    Osc1Lfo,
    Osc1Env,
    Osc1On,
    Osc2Wave,
    Osc2Octave,
    Osc2Level,
    Osc2Lfo,
    Osc2Env,
    Osc2On,
    Osc3Wave,
    Osc3Octave,
    Osc3Level,
    Osc3Lfo,
    Osc3Env,
    Osc3On,

    // envelopes
    Adsr1Attack,
    Adsr1Decay,
    Adsr1Sustain,
    Adsr1Release,
    Adsr2Attack,
    Adsr2Decay,
    Adsr2Sustain,
    Adsr2Release,
    Adsr3Attack,
    Adsr3Decay,
    Adsr3Sustain,
    Adsr3Release,

    // LFOs
    Lfo1Dest,
    Lfo1Wave,
    Lfo1Freq,
    Lfo1Depth,
    Lfo2Dest,
    Lfo2Wave,
    Lfo2Freq,
    Lfo2Depth,

    // filters
    Filter1Type,
    Filter1Cutoff,
    Filter1Resonance,
    Filter1EnvModDepth,
    Filter1Env,
    Filter2Type,
    Filter2Cutoff,
    Filter2Resonance,
    Filter2EnvModDepth,
    Filter2Env,

    // delay send (global effect, not read by the voice)
    DelayTime,
    DelayFeedback,
    DelayGain,
    DelayOn,

    // output
    Noise,
    Drive,
    OutputGain,

    SynthVoices,

    FilterSequence,
    Filter1Lfo,
    Filter2Lfo,

    // reverb send (global effect, not read by the voice)
    ReverbDryWet,
    ReverbSize,
    ReverbDamp,
    ReverbOn,

    Osc1SemiTone,
    Osc2SemiTone,
    Osc3SemiTone,
}

/// Name, range and default of one slot, in natural units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

const fn spec(name: &'static str, min: f32, max: f32, default: f32) -> ParamSpec {
    ParamSpec {
        name,
        min,
        max,
        default,
    }
}

impl ParamSpec {
    /// Clamp into range; NaN and infinities read as the default.
    #[inline]
    pub fn sanitize(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

use ParamId::*;

impl ParamId {
    #[rustfmt::skip]
    pub const ALL: [ParamId; NUM_PARAMS] = [
        Osc1Wave, Osc1Octave, Osc1Level, Osc1Lfo, Osc1Env, Osc1On,
        Osc2Wave, Osc2Octave, Osc2Level, Osc2Lfo, Osc2Env, Osc2On,
        Osc3Wave, Osc3Octave, Osc3Level, Osc3Lfo, Osc3Env, Osc3On,
        Adsr1Attack, Adsr1Decay, Adsr1Sustain, Adsr1Release,
        Adsr2Attack, Adsr2Decay, Adsr2Sustain, Adsr2Release,
        Adsr3Attack, Adsr3Decay, Adsr3Sustain, Adsr3Release,
        Lfo1Dest, Lfo1Wave, Lfo1Freq, Lfo1Depth,
        Lfo2Dest, Lfo2Wave, Lfo2Freq, Lfo2Depth,
        Filter1Type, Filter1Cutoff, Filter1Resonance, Filter1EnvModDepth, Filter1Env,
        Filter2Type, Filter2Cutoff, Filter2Resonance, Filter2EnvModDepth, Filter2Env,
        DelayTime, DelayFeedback, DelayGain, DelayOn,
        Noise, Drive, OutputGain,
        SynthVoices,
        FilterSequence, Filter1Lfo, Filter2Lfo,
        ReverbDryWet, ReverbSize, ReverbDamp, ReverbOn,
        Osc1SemiTone, Osc2SemiTone, Osc3SemiTone,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn spec(self) -> &'static ParamSpec {
        &PARAM_SPECS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// First slot of oscillator `n` (0-based), plus `offset` within its group of six.
    pub(crate) fn oscillator_slot(n: usize, offset: usize) -> Self {
        Self::ALL[n.min(2) * 6 + offset]
    }

    pub(crate) fn osc_semitone(n: usize) -> Self {
        [Osc1SemiTone, Osc2SemiTone, Osc3SemiTone][n.min(2)]
    }

    pub(crate) fn envelope_slot(n: usize, offset: usize) -> Self {
        Self::ALL[Adsr1Attack as usize + n.min(2) * 4 + offset]
    }

    pub(crate) fn lfo_slot(n: usize, offset: usize) -> Self {
        Self::ALL[Lfo1Dest as usize + n.min(1) * 4 + offset]
    }

    pub(crate) fn filter_slot(n: usize, offset: usize) -> Self {
        Self::ALL[Filter1Type as usize + n.min(1) * 5 + offset]
    }

    pub(crate) fn filter_lfo(n: usize) -> Self {
        [Filter1Lfo, Filter2Lfo][n.min(1)]
    }
}

impl TryFrom<usize> for ParamId {
    type Error = ParamError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(ParamError::UnknownIndex(index))
    }
}

pub static PARAM_SPECS: [ParamSpec; NUM_PARAMS] = [
    spec("osc1Wave", 0.0, 4.0, 0.0),
    spec("osc1Octave", -3.0, 3.0, 0.0),
    spec("osc1Level", 0.0, 1.0, 1.0),
    spec("osc1Lfo", 0.0, 1.0, 1.0),
    spec("osc1Env", 0.0, 2.0, 0.0),
    spec("osc1On", 0.0, 1.0, 1.0),
    spec("osc2Wave", 0.0, 4.0, 0.0),
    spec("osc2Octave", -3.0, 3.0, 0.0),
    spec("osc2Level", 0.0, 1.0, 0.5),
    spec("osc2Lfo", 0.0, 1.0, 1.0),
    spec("osc2Env", 0.0, 2.0, 1.0),
    spec("osc2On", 0.0, 1.0, 0.0),
    spec("osc3Wave", 0.0, 4.0, 0.0),
    spec("osc3Octave", -3.0, 3.0, 0.0),
    spec("osc3Level", 0.0, 1.0, 0.5),
    spec("osc3Lfo", 0.0, 1.0, 1.0),
    spec("osc3Env", 0.0, 2.0, 2.0),
    spec("osc3On", 0.0, 1.0, 0.0),
    spec("adsr1Attack", 0.0, 10.0, 0.01),
    spec("adsr1Decay", 0.0, 10.0, 0.1),
    spec("adsr1Sustain", 0.0, 1.0, 0.7),
    spec("adsr1Release", 0.0, 10.0, 0.3),
    spec("adsr2Attack", 0.0, 10.0, 0.01),
    spec("adsr2Decay", 0.0, 10.0, 0.1),
    spec("adsr2Sustain", 0.0, 1.0, 0.7),
    spec("adsr2Release", 0.0, 10.0, 0.3),
    spec("adsr3Attack", 0.0, 10.0, 0.01),
    spec("adsr3Decay", 0.0, 10.0, 0.1),
    spec("adsr3Sustain", 0.0, 1.0, 0.7),
    spec("adsr3Release", 0.0, 10.0, 0.3),
    spec("lfo1Dest", 0.0, 2.0, 0.0),
    spec("lfo1Wave", 0.0, 4.0, 0.0),
    spec("lfo1Freq", 0.01, 20.0, 5.0),
    spec("lfo1Depth", 0.0, 1.0, 0.0),
    spec("lfo2Dest", 0.0, 2.0, 1.0),
    spec("lfo2Wave", 0.0, 4.0, 0.0),
    spec("lfo2Freq", 0.01, 20.0, 5.0),
    spec("lfo2Depth", 0.0, 1.0, 0.0),
    spec("filter1Type", 0.0, 4.0, 0.0),
    spec("filter1Cutoff", 20.0, 20_000.0, 1_000.0),
    spec("filter1Resonance", 0.0, 1.0, 0.0),
    spec("filter1EnvModDepth", 0.0, 1.0, 0.0),
    spec("filter1Env", 0.0, 2.0, 0.0),
    spec("filter2Type", 0.0, 4.0, 0.0),
    spec("filter2Cutoff", 20.0, 20_000.0, 1_000.0),
    spec("filter2Resonance", 0.0, 1.0, 0.0),
    spec("filter2EnvModDepth", 0.0, 1.0, 0.0),
    spec("filter2Env", 0.0, 2.0, 0.0),
    spec("delayTime", 0.0, 2.0, 0.25),
    spec("delayFeedback", 0.0, 0.95, 0.3),
    spec("delayGain", 0.0, 1.0, 0.0),
    spec("delayOn", 0.0, 1.0, 0.0),
    spec("noise", 0.0, 1.0, 0.0),
    spec("drive", 0.0, 1.0, 0.0),
    spec("outputGain", 0.0, 2.0, 1.0),
    spec("synthVoices", 1.0, 8.0, 8.0),
    spec("filterSequence", 0.0, 2.0, 0.0),
    spec("filter1Lfo", 0.0, 1.0, 0.0),
    spec("filter2Lfo", 0.0, 1.0, 0.0),
    spec("reverbDryWet", 0.0, 1.0, 0.0),
    spec("reverbSize", 0.0, 1.0, 0.5),
    spec("reverbDamp", 0.0, 1.0, 0.5),
    spec("reverbOn", 0.0, 1.0, 0.0),
    spec("osc1SemiTone", -12.0, 12.0, 0.0),
    spec("osc2SemiTone", -12.0, 12.0, 0.0),
    spec("osc3SemiTone", -12.0, 12.0, 0.0),
];
