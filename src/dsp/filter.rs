use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | outside      |
| notch / band-stop | outside         | around       |

Topology-preserving-transform state-variable filter (two trapezoidal
integrators). One evaluation yields all four responses; the type just picks
which one is returned.

Stability
---------

The recursion stays inside the unit circle as long as g = tan(π fc / fs) is
finite and positive and the damping k = 2 - 2·resonance stays positive. Both
are guaranteed by clamping before the coefficients are computed:

    fc         ∈ [MIN_CUTOFF_HZ, NYQUIST_RATIO × fs]
    resonance  ∈ [0, MAX_RESONANCE]      →  k ≥ 0.04

Envelope modulation
-------------------

    cutoff = (base + env_depth × env_level × ENV_MOD_RANGE_HZ) × cutoff_scale

`cutoff_scale` carries LFO sweeps and the brightness controller as a ratio.
Coefficients are only recomputed when the effective cutoff moves.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const NYQUIST_RATIO: f32 = 0.45;
pub const MAX_RESONANCE: f32 = 0.98;
pub const ENV_MOD_RANGE_HZ: f32 = 10_000.0;

/// Filter response. Index order matches the filter `type` parameter slots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// Bypass.
    #[default]
    Off,
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

impl FilterType {
    pub fn from_param(value: f32) -> Self {
        if !value.is_finite() {
            return FilterType::Off;
        }
        match value.round() as i32 {
            1 => FilterType::LowPass,
            2 => FilterType::HighPass,
            3 => FilterType::BandPass,
            4 => FilterType::Notch,
            _ => FilterType::Off,
        }
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    filter_type: FilterType,
    cutoff_hz: f32,
    resonance: f32,
    env_depth: f32,
    env_level: f32,
    cutoff_scale: f32,

    sample_rate: f32,
    // Cached coefficients for `coeff_cutoff`
    coeff_cutoff: f32,
    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            filter_type: FilterType::Off,
            cutoff_hz: 1000.0,
            resonance: 0.0,
            env_depth: 0.0,
            env_level: 0.0,
            cutoff_scale: 1.0,
            sample_rate,
            coeff_cutoff: -1.0,
            g: 0.0,
            k: 2.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn lowpass(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_params(FilterType::LowPass, cutoff_hz, 0.0, 0.0);
        filter
    }

    pub fn highpass(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.set_params(FilterType::HighPass, cutoff_hz, 0.0, 0.0);
        filter
    }

    /// Set response, base cutoff (Hz), resonance (0..1) and envelope depth (0..1).
    pub fn set_params(&mut self, filter_type: FilterType, cutoff: f32, resonance: f32, env_depth: f32) {
        self.filter_type = filter_type;
        self.cutoff_hz = finite_or(cutoff, 1000.0).clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        self.env_depth = finite_or(env_depth, 0.0).clamp(0.0, 1.0);

        let resonance = finite_or(resonance, 0.0).clamp(0.0, MAX_RESONANCE);
        if resonance != self.resonance {
            self.resonance = resonance;
            self.k = 2.0 - 2.0 * resonance;
        }
        self.update_coefficients();
    }

    /// Current level of the envelope driving the cutoff.
    #[inline]
    pub fn set_envelope_modulation(&mut self, envelope_level: f32) {
        self.env_level = finite_or(envelope_level, 0.0).clamp(0.0, 1.0);
    }

    /// Multiplicative cutoff offset from LFOs and controllers.
    #[inline]
    pub fn set_cutoff_scale(&mut self, ratio: f32) {
        self.cutoff_scale = finite_or(ratio, 1.0).max(0.0);
    }

    pub fn effective_cutoff(&self) -> f32 {
        let modulated = self.cutoff_hz + self.env_depth * self.env_level * ENV_MOD_RANGE_HZ;
        (modulated * self.cutoff_scale).clamp(MIN_CUTOFF_HZ, self.sample_rate * NYQUIST_RATIO)
    }

    #[inline]
    fn update_coefficients(&mut self) {
        let cutoff = self.effective_cutoff();
        if cutoff != self.coeff_cutoff {
            self.coeff_cutoff = cutoff;
            self.g = (PI * cutoff / self.sample_rate).tan();
        }
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    /// Filter one sample with the configured response.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        if self.filter_type == FilterType::Off {
            return sample;
        }

        self.update_coefficients();
        let outputs = self.next_sample(sample, self.k, self.g);

        match self.filter_type {
            FilterType::LowPass => outputs.lowpass,
            FilterType::HighPass => outputs.highpass,
            FilterType::BandPass => outputs.bandpass,
            FilterType::Notch => outputs.notch,
            FilterType::Off => sample,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the integrator memory.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }
}

/// How the two voice filters are wired. Index order matches the filter
/// sequence parameter slot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterRouting {
    #[default]
    Serial12,
    Serial21,
    /// Both filters see the dry signal; outputs are averaged.
    Parallel,
}

impl FilterRouting {
    /// Unknown values fall back to serial filter 1 → filter 2.
    pub fn from_param(value: f32) -> Self {
        if !value.is_finite() {
            return FilterRouting::Serial12;
        }
        match value.round() as i32 {
            1 => FilterRouting::Serial21,
            2 => FilterRouting::Parallel,
            _ => FilterRouting::Serial12,
        }
    }

    #[inline]
    pub fn process(self, first: &mut SVFilter, second: &mut SVFilter, sample: f32) -> f32 {
        match self {
            FilterRouting::Serial12 => second.process(first.process(sample)),
            FilterRouting::Serial21 => first.process(second.process(sample)),
            FilterRouting::Parallel => 0.5 * (first.process(sample) + second.process(sample)),
        }
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
