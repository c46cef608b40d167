//! Shared timbre parameters.
//!
//! A `ParameterSet` is a fixed array of float slots indexed by [`ParamId`].
//! One control thread (editor, preset loader, automation) writes; the audio
//! thread reads. Each slot is an `AtomicU32` holding the float's bits, so a
//! read never tears within a slot. Reads across slots are independent, so a
//! block may see one knob's new value next to another's old one. That
//! relaxation is accepted: the next block catches up.
//!
//! The voice never reads slots one by one in its sample loop. It pulls the
//! grouped snapshots below once per block or per note event.

mod layout;

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dsp::{FilterRouting, FilterType, LfoDestination, Waveform};
use crate::error::ParamError;

pub use layout::{ParamId, ParamSpec, NUM_PARAMS, PARAM_SPECS};

pub struct ParameterSet {
    slots: [AtomicU32; NUM_PARAMS],
}

impl ParameterSet {
    /// Every slot at its default.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|i| AtomicU32::new(PARAM_SPECS[i].default.to_bits())),
        }
    }

    /// Clamped value of a slot. Non-finite contents read as the default.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        id.spec().sanitize(self.load(id))
    }

    /// Unclamped value of a selector slot, so out-of-range selections can
    /// fall back to the selector's own default rather than its range edge.
    #[inline]
    pub fn get_raw(&self, id: ParamId) -> f32 {
        let value = self.load(id);
        if value.is_finite() {
            value
        } else {
            id.spec().default
        }
    }

    #[inline]
    fn load(&self, id: ParamId) -> f32 {
        f32::from_bits(self.slots[id.index()].load(Ordering::Relaxed))
    }

    /// Write a slot. Values are stored clamped to the slot's range, except
    /// selectors which keep their raw value; NaN and infinities are rejected.
    pub fn set(&self, id: ParamId, value: f32) -> Result<(), ParamError> {
        if !value.is_finite() {
            warn!(param = id.name(), value, "rejected non-finite parameter write");
            return Err(ParamError::NonFinite {
                name: id.name(),
                value,
            });
        }
        let stored = if is_selector(id) {
            value
        } else {
            id.spec().sanitize(value)
        };
        self.slots[id.index()].store(stored.to_bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Write by raw index, as a host or editor binding would.
    pub fn set_index(&self, index: usize, value: f32) -> Result<(), ParamError> {
        let id = ParamId::try_from(index).inspect_err(|_| {
            warn!(index, "rejected write to unknown parameter index");
        })?;
        self.set(id, value)
    }

    pub fn reset_to_defaults(&self) {
        for id in ParamId::ALL {
            self.slots[id.index()].store(id.spec().default.to_bits(), Ordering::Relaxed);
        }
    }

    /// Copy of every slot, clamped, in index order.
    pub fn snapshot(&self) -> [f32; NUM_PARAMS] {
        std::array::from_fn(|i| self.get(ParamId::ALL[i]))
    }

    /// Oscillator `n` (0-based, clamped to 0..3).
    pub fn oscillator(&self, n: usize) -> OscillatorParams {
        let slot = |offset| ParamId::oscillator_slot(n, offset);
        OscillatorParams {
            waveform: Waveform::from_param(self.get_raw(slot(0))),
            octave: self.get(slot(1)).round() as i32,
            level: self.get(slot(2)),
            lfo_sensitivity: self.get(slot(3)),
            envelope: self.selector_index(slot(4), 3),
            enabled: self.get(slot(5)) >= 0.5,
            semitone: self.get(ParamId::osc_semitone(n)).round() as i32,
        }
    }

    /// Envelope `n` (0-based, clamped to 0..3).
    pub fn envelope(&self, n: usize) -> EnvelopeParams {
        let slot = |offset| ParamId::envelope_slot(n, offset);
        EnvelopeParams {
            attack: self.get(slot(0)),
            decay: self.get(slot(1)),
            sustain: self.get(slot(2)),
            release: self.get(slot(3)),
        }
    }

    /// LFO `n` (0-based, clamped to 0..2).
    pub fn lfo(&self, n: usize) -> LfoParams {
        let slot = |offset| ParamId::lfo_slot(n, offset);
        LfoParams {
            destination: LfoDestination::from_param(self.get_raw(slot(0))),
            waveform: Waveform::from_param(self.get_raw(slot(1))),
            frequency: self.get(slot(2)),
            depth: self.get(slot(3)),
        }
    }

    /// Filter `n` (0-based, clamped to 0..2).
    pub fn filter(&self, n: usize) -> FilterParams {
        let slot = |offset| ParamId::filter_slot(n, offset);
        FilterParams {
            filter_type: FilterType::from_param(self.get_raw(slot(0))),
            cutoff: self.get(slot(1)),
            resonance: self.get(slot(2)),
            env_depth: self.get(slot(3)),
            envelope: self.selector_index(slot(4), 3),
            lfo_sensitivity: self.get(ParamId::filter_lfo(n)),
        }
    }

    pub fn output(&self) -> OutputParams {
        OutputParams {
            noise: self.get(ParamId::Noise),
            drive: self.get(ParamId::Drive),
            gain: self.get(ParamId::OutputGain),
        }
    }

    pub fn filter_routing(&self) -> FilterRouting {
        FilterRouting::from_param(self.get_raw(ParamId::FilterSequence))
    }

    /// Number of voices the allocator should keep sounding.
    pub fn polyphony(&self) -> usize {
        self.get(ParamId::SynthVoices).round() as usize
    }

    /// Round a selector to an index below `count`; out-of-range picks the default.
    fn selector_index(&self, id: ParamId, count: usize) -> usize {
        let value = self.get_raw(id).round();
        if value >= 0.0 && (value as usize) < count {
            value as usize
        } else {
            id.spec().default as usize
        }
    }
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(ParamId::ALL.iter().map(|&id| (id.name(), self.get(id))))
            .finish()
    }
}

fn is_selector(id: ParamId) -> bool {
    use ParamId::*;
    matches!(
        id,
        Osc1Wave
            | Osc2Wave
            | Osc3Wave
            | Osc1Env
            | Osc2Env
            | Osc3Env
            | Lfo1Dest
            | Lfo1Wave
            | Lfo2Dest
            | Lfo2Wave
            | Filter1Type
            | Filter2Type
            | Filter1Env
            | Filter2Env
            | FilterSequence
    )
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    pub waveform: Waveform,
    pub octave: i32,
    pub level: f32,
    /// Scales pitch and amplitude LFO depth for this oscillator.
    pub lfo_sensitivity: f32,
    /// Which envelope (0..3) shapes this oscillator.
    pub envelope: usize,
    pub enabled: bool,
    pub semitone: i32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub destination: LfoDestination,
    pub waveform: Waveform,
    pub frequency: f32,
    pub depth: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub filter_type: FilterType,
    pub cutoff: f32,
    pub resonance: f32,
    pub env_depth: f32,
    /// Which envelope (0..3) drives the cutoff.
    pub envelope: usize,
    /// Scales LFOs routed to the filter destination.
    pub lfo_sensitivity: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputParams {
    pub noise: f32,
    pub drive: f32,
    pub gain: f32,
}
