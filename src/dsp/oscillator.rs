use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Audio Oscillator
================

An oscillator turns a frequency into a repeating waveform. Each voice owns
three of them; their outputs are summed before filtering.

Phase
-----

Phase is a position inside one cycle, kept in [0, 1). Every sample:

    phase += frequency / sample_rate
    if phase >= 1.0 { phase -= 1.0 }

The increment is added to a running f64 accumulator and wrapped, so long notes
don't drift out of tune. The waveform is a pure function of phase.

Pitch
-----

The effective frequency is the note frequency shifted by octave and semitone:

    effective = base × 2^octave × 2^(semitone / 12)

The shift ratio is cached whenever the parameters change so the per-sample
path only multiplies.

Band-limiting
-------------

A naive saw or square jumps instantaneously, which aliases badly at high
pitches. PolyBLEP (polynomial band-limited step) replaces the sample on
either side of each jump with a two-sample polynomial ramp:

    t < dt          →  2t' - t'² - 1       (t' = t / dt)
    t > 1 - dt      →  t'² + 2t' + 1       (t' = (t - 1) / dt)

Saw subtracts the correction at its wrap; square adds it on the rising edge
and subtracts it on the falling edge at phase 0.5. Triangle and sine have no
jumps and are left alone.

Noise
-----

White noise from a xorshift generator. It ignores phase entirely, so it has no
period; it's there for breath and percussive texture.
*/

/// Waveform selector. Index order matches the `wave` parameter slots.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

impl Waveform {
    /// Map a parameter value to a waveform. Out-of-range values fall back to sine.
    pub fn from_param(value: f32) -> Self {
        if !value.is_finite() {
            return Waveform::Sine;
        }
        match value.round() as i32 {
            1 => Waveform::Saw,
            2 => Waveform::Square,
            3 => Waveform::Triangle,
            4 => Waveform::Noise,
            _ => Waveform::Sine,
        }
    }
}

/// Xorshift white noise in [-1, 1].
#[derive(Debug, Clone)]
pub struct NoiseSource {
    state: u32,
}

impl NoiseSource {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0x9E37_79B9)
    }
}

pub struct Oscillator {
    waveform: Waveform,
    gain: f32,
    /// 2^octave × 2^(semitone/12), cached by `set_params`.
    pitch_ratio: f32,
    base_frequency: f32,
    phase: f64,
    phase_inc: f64,
    sample_rate: f32,
    noise: NoiseSource,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            waveform: Waveform::Sine,
            gain: 1.0,
            pitch_ratio: 1.0,
            base_frequency: 440.0,
            phase: 0.0,
            phase_inc: 440.0 / sample_rate as f64,
            sample_rate,
            noise: NoiseSource::default(),
        }
    }

    pub fn with_seed(sample_rate: f32, seed: u32) -> Self {
        Self {
            noise: NoiseSource::new(seed),
            ..Self::new(sample_rate)
        }
    }

    /// Set waveform, octave shift, semitone shift and linear gain.
    pub fn set_params(&mut self, waveform: Waveform, octave: i32, semitone: i32, gain: f32) {
        self.waveform = waveform;
        self.pitch_ratio = 2.0_f32.powf(octave as f32 + semitone as f32 / 12.0);
        self.gain = if gain.is_finite() { gain } else { 0.0 };
        self.update_increment(1.0);
    }

    /// Set the un-shifted note frequency in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.base_frequency = if freq_hz.is_finite() { freq_hz.max(0.0) } else { 0.0 };
        self.update_increment(1.0);
    }

    /// Scale the effective frequency for this sample only (vibrato, pitch bend).
    #[inline]
    pub fn modulate_pitch(&mut self, ratio: f32) {
        self.update_increment(ratio);
    }

    /// Jump to a phase position (wrapped into one cycle).
    pub fn reset(&mut self, phase: f32) {
        self.phase = (phase as f64).rem_euclid(1.0);
    }

    pub fn effective_frequency(&self) -> f32 {
        self.base_frequency * self.pitch_ratio
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current phase in [0, 1).
    pub fn phase(&self) -> f32 {
        // f64 phases just below 1.0 round up to 1.0 in f32
        let phase = self.phase as f32;
        if phase >= 1.0 {
            0.0
        } else {
            phase
        }
    }

    #[inline]
    fn update_increment(&mut self, ratio: f32) {
        let freq = (self.effective_frequency() * ratio) as f64;
        // Nyquist caps the increment at half a cycle per sample
        self.phase_inc = (freq / self.sample_rate as f64).clamp(0.0, 0.5);
    }

    /// Produce one sample with gain applied and advance the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let raw = self.raw_sample();

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        raw * self.gain
    }

    #[inline]
    fn raw_sample(&mut self) -> f32 {
        let t = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (t * TAU).sin(),
            Waveform::Saw => 2.0 * t - 1.0 - self.poly_blep(t),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + self.poly_blep(t) - self.poly_blep((t + 0.5).rem_euclid(1.0))
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            Waveform::Noise => return self.noise.next_sample(),
        };
        sample as f32
    }

    #[inline]
    fn poly_blep(&self, t: f64) -> f64 {
        let dt = self.phase_inc;
        if dt <= 0.0 {
            return 0.0;
        }
        if t < dt {
            let t = t / dt;
            2.0 * t - t * t - 1.0
        } else if t > 1.0 - dt {
            let t = (t - 1.0) / dt;
            t * t + 2.0 * t + 1.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn osc(waveform: Waveform, freq: f32) -> Oscillator {
        let mut osc = Oscillator::new(SAMPLE_RATE);
        osc.set_params(waveform, 0, 0, 1.0);
        osc.set_frequency(freq);
        osc
    }

    #[test]
    fn periodic_waveforms_repeat_at_sample_rate_over_frequency() {
        // 441 Hz at 44.1 kHz = exactly 100 samples per cycle
        for waveform in [
            Waveform::Sine,
            Waveform::Saw,
            Waveform::Square,
            Waveform::Triangle,
        ] {
            let mut osc = osc(waveform, 441.0);
            let samples: Vec<f32> = (0..1000).map(|_| osc.next_sample()).collect();

            for i in 0..800 {
                let diff = (samples[i] - samples[i + 100]).abs();
                assert!(
                    diff < 1e-3,
                    "{waveform:?} not periodic at {i}: {} vs {}",
                    samples[i],
                    samples[i + 100]
                );
            }
        }
    }

    #[test]
    fn sine_starts_at_zero_and_peaks_a_quarter_cycle_later() {
        let mut osc = osc(Waveform::Sine, 441.0);
        let samples: Vec<f32> = (0..100).map(|_| osc.next_sample()).collect();

        assert!(samples[0].abs() < 1e-6);
        assert!((samples[25] - 1.0).abs() < 1e-4);
        assert!((samples[75] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn octave_and_semitone_shift_effective_frequency() {
        let mut osc = Oscillator::new(SAMPLE_RATE);
        osc.set_frequency(220.0);
        osc.set_params(Waveform::Sine, 1, 0, 1.0);
        assert!((osc.effective_frequency() - 440.0).abs() < 1e-3);

        osc.set_params(Waveform::Sine, 0, 12, 1.0);
        assert!((osc.effective_frequency() - 440.0).abs() < 1e-3);

        osc.set_params(Waveform::Sine, -1, 7, 1.0);
        let expected = 110.0 * 2.0_f32.powf(7.0 / 12.0);
        assert!((osc.effective_frequency() - expected).abs() < 1e-3);
    }

    #[test]
    fn gain_scales_output_linearly() {
        let mut full = osc(Waveform::Saw, 300.0);
        let mut half = osc(Waveform::Saw, 300.0);
        half.set_params(Waveform::Saw, 0, 0, 0.5);

        for _ in 0..500 {
            let a = full.next_sample();
            let b = half.next_sample();
            assert!((a * 0.5 - b).abs() < 1e-6);
        }
    }

    #[test]
    fn phase_stays_wrapped_over_long_runs() {
        let mut osc = osc(Waveform::Triangle, 12_345.0);
        for _ in 0..200_000 {
            osc.next_sample();
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn phase_just_below_one_reports_wrapped() {
        let mut osc = osc(Waveform::Sine, 100.0);
        osc.phase = 0.999_999_999;
        assert_eq!(osc.phase(), 0.0);
        osc.phase = 0.5;
        assert_eq!(osc.phase(), 0.5);
    }

    #[test]
    fn reset_wraps_phase_into_one_cycle() {
        let mut osc = osc(Waveform::Sine, 100.0);
        osc.reset(1.25);
        assert!((osc.phase() - 0.25).abs() < 1e-6);
        osc.reset(-0.25);
        assert!((osc.phase() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn malformed_waveform_index_falls_back_to_sine() {
        assert_eq!(Waveform::from_param(17.0), Waveform::Sine);
        assert_eq!(Waveform::from_param(-3.0), Waveform::Sine);
        assert_eq!(Waveform::from_param(f32::NAN), Waveform::Sine);
        assert_eq!(Waveform::from_param(2.2), Waveform::Square);
    }

    #[test]
    fn noise_is_bounded_and_centered() {
        let mut osc = osc(Waveform::Noise, 440.0);
        let mut sum = 0.0;
        for _ in 0..10_000 {
            let s = osc.next_sample();
            assert!((-1.0..=1.0).contains(&s));
            sum += s;
        }
        assert!((sum / 10_000.0).abs() < 0.05);
    }

    #[test]
    fn band_limited_saw_stays_in_range() {
        let mut osc = osc(Waveform::Saw, 5_000.0);
        for _ in 0..5_000 {
            let s = osc.next_sample();
            assert!(s.abs() <= 1.0 + 1e-4, "saw sample {s} out of range");
        }
    }
}
