#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

A linear attack/decay/sustain/release generator. Each voice owns three, one
per oscillator, and the voice is finished once all three are idle.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the oscillator to control its amplitude over time.

  stage       Idle, Attack, Decay, Sustain, or Release.

  gate        Note-on forces Attack from any stage (retrigger). Note-off forces
              Release from Attack, Decay or Sustain.

  increment   How much `level` changes per sample, computed once when the
              stage starts.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


Ramps start from the CURRENT level
----------------------------------

Retriggering a note that is still sounding ramps from wherever the level is
back up to 1.0, and releasing mid-attack ramps from the current level down
to 0.0. Neither jumps, so neither clicks. Each stage keeps its configured
duration regardless of the starting level:

    increment = (target - start) / (time_seconds × sample_rate)


Zero-length stages
------------------

A stage configured with 0 seconds would divide by zero. Instead it completes
on the tick it begins: zero attack reaches 1.0 on the first tick after
note-on, zero release reaches Idle on the first tick after note-off.
Consecutive zero-length stages cascade within the same tick.
*/

/// Ramps within this distance of their target snap to it.
const LEVEL_EPSILON: f32 = 1e-6;

/// The current stage of the envelope state machine.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeStage,
    level: f32,
    /// Signed per-sample step for the current ramp.
    increment: f32,
    sample_rate: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::adsr(sample_rate, 0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            attack_time: 0.0,
            decay_time: 0.0,
            sustain_level: 0.0,
            release_time: 0.0,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            increment: 0.0,
            sample_rate,
        };
        env.set_params(attack, decay, sustain, release);
        env
    }

    /// Update stage times (seconds) and sustain level. Takes effect at the next
    /// stage boundary; a ramp already in progress keeps its slope.
    pub fn set_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = sanitize_time(attack);
        self.decay_time = sanitize_time(decay);
        self.sustain_level = if sustain.is_finite() {
            sustain.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.release_time = sanitize_time(release);
    }

    /// Gate high: ramp from the current level to 1.0 over the attack time.
    pub fn note_on(&mut self) {
        self.stage = EnvelopeStage::Attack;
        self.increment = self.ramp(1.0, self.attack_time);
    }

    /// Gate low: ramp from the current level to 0.0 over the release time.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.stage = EnvelopeStage::Release;
        self.increment = self.ramp(0.0, self.release_time);
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn tick(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += self.increment;
                if self.increment == 0.0 || self.level >= 1.0 - LEVEL_EPSILON {
                    self.level = 1.0;
                    self.enter_decay();
                }
            }

            EnvelopeStage::Decay => {
                self.level += self.increment;
                if self.increment == 0.0 || self.level <= self.sustain_level + LEVEL_EPSILON {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                self.level += self.increment;
                if self.increment == 0.0 || self.level <= LEVEL_EPSILON {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    fn enter_decay(&mut self) {
        self.stage = EnvelopeStage::Decay;
        self.increment = self.ramp(self.sustain_level, self.decay_time);
        if self.increment == 0.0 {
            self.level = self.sustain_level;
            self.stage = EnvelopeStage::Sustain;
        }
    }

    /// Per-sample step from the current level to `target`, or 0.0 when the
    /// stage has no duration (or nowhere to go).
    fn ramp(&self, target: f32, time: f32) -> f32 {
        let samples = time * self.sample_rate;
        if samples < 1.0 {
            return 0.0;
        }
        (target - self.level) / samples
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick();
        }
    }

    /// True once the envelope has come to rest in Idle.
    pub fn is_finished(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !self.is_finished()
    }

    /// Hard stop: jump straight to Idle with zero output.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.increment = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }
}

#[inline]
fn sanitize_time(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}
