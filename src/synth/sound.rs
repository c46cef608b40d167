//! Which notes and channels a voice may be asked to render.

use std::any::Any;
use std::ops::RangeInclusive;

/// Passive description of a playable sound. The allocator asks it whether a
/// note/channel should trigger a voice; voices ask it what kind of sound it is.
pub trait SynthSound: Any + Send + Sync {
    fn applies_to_note(&self, note: u8) -> bool;

    fn applies_to_channel(&self, channel: u8) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// The three-oscillator subtractive sound. Defaults to every note on every
/// channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundDescriptor {
    notes: RangeInclusive<u8>,
    /// Bit `n` set = MIDI channel `n` (0-based) triggers this sound.
    channel_mask: u16,
}

impl SoundDescriptor {
    pub fn new() -> Self {
        Self {
            notes: 0..=127,
            channel_mask: u16::MAX,
        }
    }

    /// Restrict to a key range (e.g. for splits).
    pub fn with_notes(mut self, notes: RangeInclusive<u8>) -> Self {
        self.notes = notes;
        self
    }

    /// Restrict to a single 0-based MIDI channel.
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel_mask = 1u16.checked_shl(channel as u32).unwrap_or(0);
        self
    }
}

impl Default for SoundDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthSound for SoundDescriptor {
    fn applies_to_note(&self, note: u8) -> bool {
        self.notes.contains(&note)
    }

    fn applies_to_channel(&self, channel: u8) -> bool {
        channel < 16 && self.channel_mask & (1 << channel) != 0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
