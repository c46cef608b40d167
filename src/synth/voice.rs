use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    dsp::{
        distortion::apply_drive,
        lfo::{pitch_ratio, tremolo_gain},
        Envelope, FilterRouting, Lfo, LfoDestination, NoiseSource, Oscillator, SVFilter, Waveform,
    },
    error::VoiceError,
    io::AudioBuffer,
    midi_note_to_freq,
    params::{FilterParams, OscillatorParams, OutputParams, ParameterSet},
    synth::sound::{SoundDescriptor, SynthSound},
};

/*
Voice Signal Chain
==================

One voice renders one note. Per sample:

    lfo 1, lfo 2, mod-wheel lfo ──┬── pitch ratio ──┐
                                  ├── tremolo ──────┤
                                  └── cutoff ratio ─┼──────────────┐
                                                    ▼              │
    osc 1 × env[a] ─┐                                              │
    osc 2 × env[b] ─┼─ sum + noise × env 1 ── filter 1/2 routing ◄─┘
    osc 3 × env[c] ─┘                               │
                                                    ▼
                          drive → output gain × key level × volume
                                                    │
                                                    ▼
                                  add into every channel of the block

Each oscillator is paired with the envelope its `env` slot selects (by
default its own). Disabled oscillators are not advanced.

Lifecycle
---------

    Free ──start_note──→ Active ──stop_note(true)──→ Releasing
      ↑                    │                           │
      │          stop_note(false)             all envelopes idle
      └────────────────────┴───────────────────────────┘

The voice also drops back to Free when every envelope finishes on its own.
Filter memory and LFO phase survive note changes; only `reset` clears them.

Parameters are pulled from the shared set once at note-on and once at the
top of every block, never inside the sample loop.
*/

/// Pitch wheel range in semitones either side of centre.
pub const PITCH_BEND_SEMITONES: f32 = 2.0;
pub const PITCH_WHEEL_CENTRE: u16 = 8192;
pub const PITCH_WHEEL_MAX: u16 = 16_383;
/// Mod-wheel vibrato rate and maximum depth (in units of the LFO vibrato range).
pub const MOD_WHEEL_RATE_HZ: f32 = 5.5;
pub const MOD_WHEEL_DEPTH: f32 = 0.5;
/// Octaves of cutoff sweep for a full-depth filter LFO.
pub const FILTER_LFO_OCTAVES: f32 = 2.0;
/// Octaves of cutoff shift at either extreme of the brightness controller.
pub const BRIGHTNESS_OCTAVES: f32 = 2.0;

pub const CC_MOD_WHEEL: u8 = 1;
pub const CC_VOLUME: u8 = 7;
pub const CC_BRIGHTNESS: u8 = 74;
pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

static NEXT_NOISE_SEED: AtomicU32 = AtomicU32::new(0x1234_5678);

/// Host-supplied rendering configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub sample_rate: f32,
    pub num_channels: usize,
}

impl VoiceConfig {
    pub fn new(sample_rate: f32, num_channels: usize) -> Result<Self, VoiceError> {
        let config = Self {
            sample_rate,
            num_channels,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VoiceError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(VoiceError::InvalidSampleRate(self.sample_rate));
        }
        if self.num_channels == 0 {
            return Err(VoiceError::InvalidChannelCount);
        }
        Ok(())
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            num_channels: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelopes in attack/decay/sustain
    Releasing, // Key released, envelopes in release
}

/// The capability set a host or allocator drives a voice through.
pub trait SynthVoice {
    /// Whether this voice knows how to render `sound`.
    fn can_play_sound(&self, sound: &dyn SynthSound) -> bool;

    /// The wheel position is informational; bend follows `pitch_wheel_moved`,
    /// which persists across notes.
    fn start_note(&mut self, note: u8, velocity: f32, sound: &dyn SynthSound, pitch_wheel_pos: u16);

    /// `allow_tail_off = false` silences the voice before the next sample.
    fn stop_note(&mut self, allow_tail_off: bool);

    fn pitch_wheel_moved(&mut self, value: u16);

    fn controller_moved(&mut self, controller: u8, value: u8);

    /// Mix samples `start_sample..start_sample + num_samples` into `buffer`.
    fn render_next_block(
        &mut self,
        buffer: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    );

    /// True while any envelope is still sounding.
    fn is_active(&self) -> bool;

    fn current_note(&self) -> Option<u8>;
}

pub struct Voice {
    params: Arc<ParameterSet>,
    config: VoiceConfig,

    oscillators: [Oscillator; 3],
    envelopes: [Envelope; 3],
    filters: [SVFilter; 2],
    lfos: [Lfo; 2],
    mod_wheel_lfo: Lfo,
    noise: NoiseSource,

    // Per-block parameter snapshot
    osc_params: [OscillatorParams; 3],
    filter_params: [FilterParams; 2],
    lfo_destinations: [LfoDestination; 2],
    output: OutputParams,
    routing: FilterRouting,

    state: VoiceState,
    note: Option<u8>,
    base_frequency: f32,
    key_level: f32,
    pitch_bend: f32,
    volume: f32,
    brightness: f32,
    fault: bool,
}

impl Voice {
    pub fn new(config: VoiceConfig, params: Arc<ParameterSet>) -> Result<Self, VoiceError> {
        config.validate()?;
        let sr = config.sample_rate;
        let seed = NEXT_NOISE_SEED.fetch_add(0x9E37_79B9, Ordering::Relaxed);

        let mut mod_wheel_lfo = Lfo::new(sr);
        mod_wheel_lfo.set_params(Waveform::Sine, MOD_WHEEL_RATE_HZ, 0.0);

        let mut voice = Self {
            oscillators: [
                Oscillator::with_seed(sr, seed),
                Oscillator::with_seed(sr, seed.rotate_left(7)),
                Oscillator::with_seed(sr, seed.rotate_left(13)),
            ],
            envelopes: [Envelope::new(sr), Envelope::new(sr), Envelope::new(sr)],
            filters: [SVFilter::new(sr), SVFilter::new(sr)],
            lfos: [Lfo::new(sr), Lfo::new(sr)],
            mod_wheel_lfo,
            noise: NoiseSource::new(seed ^ 0xA5A5_A5A5),

            osc_params: [params.oscillator(0), params.oscillator(1), params.oscillator(2)],
            filter_params: [params.filter(0), params.filter(1)],
            lfo_destinations: [LfoDestination::Pitch; 2],
            output: params.output(),
            routing: params.filter_routing(),

            params,
            config,
            state: VoiceState::Free,
            note: None,
            base_frequency: 0.0,
            key_level: 0.0,
            pitch_bend: 1.0,
            volume: 1.0,
            brightness: 1.0,
            fault: false,
        };
        voice.refresh_params();

        debug!(sample_rate = sr, channels = config.num_channels, "voice created");
        Ok(voice)
    }

    /// Pull the current parameter values into the signal chain.
    fn refresh_params(&mut self) {
        let params = &*self.params;

        for (i, osc) in self.oscillators.iter_mut().enumerate() {
            let p = params.oscillator(i);
            osc.set_params(p.waveform, p.octave, p.semitone, p.level);
            self.osc_params[i] = p;
        }

        for (i, env) in self.envelopes.iter_mut().enumerate() {
            let p = params.envelope(i);
            env.set_params(p.attack, p.decay, p.sustain, p.release);
        }

        for (i, lfo) in self.lfos.iter_mut().enumerate() {
            let p = params.lfo(i);
            lfo.set_params(p.waveform, p.frequency, p.depth);
            self.lfo_destinations[i] = p.destination;
        }

        for (i, filter) in self.filters.iter_mut().enumerate() {
            let p = params.filter(i);
            filter.set_params(p.filter_type, p.cutoff, p.resonance, p.env_depth);
            self.filter_params[i] = p;
        }

        self.output = params.output();
        self.routing = params.filter_routing();
    }

    /// Full reallocation reset: silence, clear filter memory, rewind phases.
    pub fn reset(&mut self) {
        for env in &mut self.envelopes {
            env.reset();
        }
        for filter in &mut self.filters {
            filter.reset();
        }
        for osc in &mut self.oscillators {
            osc.reset(0.0);
        }
        self.resync_lfos();
        self.free();
    }

    /// Restart every LFO at phase zero.
    pub fn resync_lfos(&mut self) {
        for lfo in &mut self.lfos {
            lfo.resync();
        }
        self.mod_wheel_lfo.resync();
    }

    fn free(&mut self) {
        self.state = VoiceState::Free;
        self.note = None;
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == VoiceState::Free
    }

    /// True once every envelope has reached Idle.
    pub fn is_finished(&self) -> bool {
        self.envelopes.iter().all(Envelope::is_finished)
    }

    pub fn key_level(&self) -> f32 {
        self.key_level
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn envelope(&self, index: usize) -> &Envelope {
        &self.envelopes[index.min(2)]
    }

    pub fn oscillator(&self, index: usize) -> &Oscillator {
        &self.oscillators[index.min(2)]
    }

    pub fn config(&self) -> VoiceConfig {
        self.config
    }

    /// Sum of LFO values routed to `destination`, and their combined depth.
    #[inline]
    fn lfo_sum(&self, values: &[f32; 2], destination: LfoDestination) -> (f32, f32) {
        let mut value = 0.0;
        let mut depth = 0.0;
        for (i, lfo) in self.lfos.iter().enumerate() {
            if self.lfo_destinations[i] == destination {
                value += values[i];
                depth += lfo.depth();
            }
        }
        (value, depth)
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        // 1. modulation sources
        let lfo_values = [self.lfos[0].next_value(), self.lfos[1].next_value()];
        let wheel = self.mod_wheel_lfo.next_value();
        let (pitch_value, _) = self.lfo_sum(&lfo_values, LfoDestination::Pitch);
        let (amp_value, amp_depth) = self.lfo_sum(&lfo_values, LfoDestination::Amplitude);
        let (filter_value, _) = self.lfo_sum(&lfo_values, LfoDestination::Filter);

        let env_levels = [
            self.envelopes[0].tick(),
            self.envelopes[1].tick(),
            self.envelopes[2].tick(),
        ];

        // 2. oscillator / envelope pairs
        let mut sum = 0.0;
        for (osc, p) in self.oscillators.iter_mut().zip(&self.osc_params) {
            if !p.enabled {
                continue;
            }
            let sensitivity = p.lfo_sensitivity;
            osc.modulate_pitch(self.pitch_bend * pitch_ratio(pitch_value * sensitivity + wheel));
            let tremolo = tremolo_gain(amp_value * sensitivity, amp_depth * sensitivity).max(0.0);
            sum += osc.next_sample() * env_levels[p.envelope] * tremolo;
        }

        // 3. noise
        if self.output.noise > 0.0 {
            sum += self.noise.next_sample() * self.output.noise * env_levels[0];
        }

        // 4. filters
        for (filter, p) in self.filters.iter_mut().zip(&self.filter_params) {
            filter.set_envelope_modulation(env_levels[p.envelope]);
            let sweep = filter_value * p.lfo_sensitivity;
            let scale = if sweep != 0.0 {
                self.brightness * 2.0_f32.powf(sweep * FILTER_LFO_OCTAVES)
            } else {
                self.brightness
            };
            filter.set_cutoff_scale(scale);
        }
        let [first, second] = &mut self.filters;
        let filtered = self.routing.process(first, second, sum);

        // 5. drive and gain
        let out = apply_drive(filtered, self.output.drive)
            * self.output.gain
            * self.key_level
            * self.volume;

        if out.is_finite() {
            out
        } else {
            self.fault = true;
            0.0
        }
    }
}

impl SynthVoice for Voice {
    fn can_play_sound(&self, sound: &dyn SynthSound) -> bool {
        sound.as_any().is::<SoundDescriptor>()
    }

    fn start_note(&mut self, note: u8, velocity: f32, sound: &dyn SynthSound, pitch_wheel_pos: u16) {
        if !self.can_play_sound(sound) {
            trace!(note, "voice cannot play this sound");
            return;
        }

        let note = note.min(127);
        self.note = Some(note);
        self.base_frequency = midi_note_to_freq(note);
        self.key_level = if velocity.is_finite() {
            velocity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.refresh_params();

        for osc in &mut self.oscillators {
            osc.set_frequency(self.base_frequency);
            osc.reset(0.0);
        }
        for env in &mut self.envelopes {
            env.note_on();
        }

        self.state = VoiceState::Active;
        trace!(note, velocity = self.key_level, pitch_wheel_pos, "voice started");
    }

    fn stop_note(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            if self.state != VoiceState::Active {
                return;
            }
            for env in &mut self.envelopes {
                env.note_off();
            }
            self.state = VoiceState::Releasing;
            trace!(note = ?self.note, "voice releasing");
        } else {
            for env in &mut self.envelopes {
                env.reset();
            }
            trace!(note = ?self.note, "voice hard-stopped");
            self.free();
        }
    }

    fn pitch_wheel_moved(&mut self, value: u16) {
        let value = value.min(PITCH_WHEEL_MAX) as f32;
        let centre = PITCH_WHEEL_CENTRE as f32;
        let semitones = (value - centre) / centre * PITCH_BEND_SEMITONES;
        self.pitch_bend = 2.0_f32.powf(semitones / 12.0);
    }

    fn controller_moved(&mut self, controller: u8, value: u8) {
        let amount = value.min(127) as f32 / 127.0;
        match controller {
            CC_MOD_WHEEL => self.mod_wheel_lfo.set_depth(amount * MOD_WHEEL_DEPTH),
            CC_VOLUME => self.volume = amount,
            CC_BRIGHTNESS => {
                let octaves = (value.min(127) as f32 - 64.0) / 64.0 * BRIGHTNESS_OCTAVES;
                self.brightness = 2.0_f32.powf(octaves);
            }
            CC_ALL_SOUND_OFF => self.stop_note(false),
            CC_ALL_NOTES_OFF => self.stop_note(true),
            _ => {}
        }
    }

    fn render_next_block(
        &mut self,
        buffer: &mut AudioBuffer,
        start_sample: usize,
        num_samples: usize,
    ) {
        if self.state == VoiceState::Free {
            return;
        }

        let end = start_sample.saturating_add(num_samples).min(buffer.num_samples());
        if start_sample >= end {
            return;
        }

        self.refresh_params();

        for index in start_sample..end {
            let sample = self.next_sample();
            buffer.add_frame(index, sample);
        }

        if self.fault {
            self.fault = false;
            for filter in &mut self.filters {
                filter.reset();
            }
            warn!(note = ?self.note, "voice produced non-finite output, filters reset");
        }

        if self.is_finished() {
            trace!(note = ?self.note, "voice finished");
            self.free();
        }
    }

    fn is_active(&self) -> bool {
        self.state != VoiceState::Free
    }

    fn current_note(&self) -> Option<u8> {
        self.note
    }
}
