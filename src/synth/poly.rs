use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    error::VoiceError,
    io::AudioBuffer,
    params::ParameterSet,
    synth::{
        message::{MessageReceiver, SynthMessage},
        sound::SynthSound,
        voice::{
            SynthVoice, Voice, VoiceConfig, VoiceState, CC_BRIGHTNESS, CC_MOD_WHEEL, CC_VOLUME,
            PITCH_WHEEL_CENTRE,
        },
    },
    MAX_POLYPHONY,
};

/// Last controller values seen on one MIDI channel, replayed into a voice
/// when it starts a note there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelState {
    pitch_wheel: u16,
    mod_wheel: u8,
    volume: u8,
    brightness: u8,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            pitch_wheel: PITCH_WHEEL_CENTRE,
            mod_wheel: 0,
            volume: 127,
            brightness: 64,
        }
    }
}

struct VoiceSlot {
    voice: Voice,
    channel: u8,
    age: u64,
}

/// Reference host: drains control messages and mixes up to eight voices.
///
/// Allocation prefers a free voice, then steals the oldest releasing voice,
/// then the oldest active one. A note that is already sounding on the same
/// channel retriggers its own voice.
pub struct PolySynth<R: MessageReceiver> {
    slots: Vec<VoiceSlot>,
    sounds: Vec<Arc<dyn SynthSound>>,
    params: Arc<ParameterSet>,
    rx: R,
    channels: [ChannelState; 16],
    note_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(
        config: VoiceConfig,
        params: Arc<ParameterSet>,
        sounds: Vec<Arc<dyn SynthSound>>,
        rx: R,
    ) -> Result<Self, VoiceError> {
        let slots = (0..MAX_POLYPHONY)
            .map(|_| {
                Voice::new(config, Arc::clone(&params)).map(|voice| VoiceSlot {
                    voice,
                    channel: 0,
                    age: 0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(voices = slots.len(), sounds = sounds.len(), "poly synth ready");

        Ok(Self {
            slots,
            sounds,
            params,
            rx,
            channels: [ChannelState::default(); 16],
            note_counter: 0,
        })
    }

    pub fn params(&self) -> &Arc<ParameterSet> {
        &self.params
    }

    pub fn active_voices(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_active()).count()
    }

    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.slots.get(index).map(|s| &s.voice)
    }

    /// Drain pending messages, then render every sounding voice into `buffer`.
    pub fn render_block(&mut self, buffer: &mut AudioBuffer) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        buffer.clear();
        let len = buffer.num_samples();
        for slot in &mut self.slots {
            if slot.voice.is_active() {
                slot.voice.render_next_block(buffer, 0, len);
            }
        }
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn {
                channel,
                note,
                velocity: 0,
            } => self.note_off(channel, note),
            SynthMessage::NoteOn {
                channel,
                note,
                velocity,
            } => self.note_on(channel, note, velocity),
            SynthMessage::NoteOff { channel, note, .. } => self.note_off(channel, note),
            SynthMessage::PitchBend { channel, value } => {
                let channel = channel & 0x0f;
                self.channels[channel as usize].pitch_wheel = value;
                for slot in self.playing_on(channel) {
                    slot.voice.pitch_wheel_moved(value);
                }
            }
            SynthMessage::ControlChange {
                channel,
                controller,
                value,
            } => {
                let channel = channel & 0x0f;
                let state = &mut self.channels[channel as usize];
                match controller {
                    CC_MOD_WHEEL => state.mod_wheel = value,
                    CC_VOLUME => state.volume = value,
                    CC_BRIGHTNESS => state.brightness = value,
                    _ => {}
                }
                for slot in self.playing_on(channel) {
                    slot.voice.controller_moved(controller, value);
                }
            }
            SynthMessage::AllNotesOff => {
                for slot in &mut self.slots {
                    slot.voice.stop_note(true);
                }
            }
        }
    }

    fn playing_on(&mut self, channel: u8) -> impl Iterator<Item = &mut VoiceSlot> {
        self.slots
            .iter_mut()
            .filter(move |s| s.channel == channel && s.voice.is_active())
    }

    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let channel = channel & 0x0f;
        let Some(sound) = self
            .sounds
            .iter()
            .find(|s| s.applies_to_note(note) && s.applies_to_channel(channel))
            .cloned()
        else {
            trace!(channel, note, "no sound for note");
            return;
        };

        let Some(index) = self.allocate(channel, note, sound.as_ref()) else {
            trace!(channel, note, "no voice available");
            return;
        };

        self.note_counter += 1;
        let state = self.channels[channel as usize];
        let slot = &mut self.slots[index];
        slot.channel = channel;
        slot.age = self.note_counter;
        slot.voice.pitch_wheel_moved(state.pitch_wheel);
        slot.voice.controller_moved(CC_MOD_WHEEL, state.mod_wheel);
        slot.voice.controller_moved(CC_VOLUME, state.volume);
        slot.voice.controller_moved(CC_BRIGHTNESS, state.brightness);
        slot.voice
            .start_note(note, velocity as f32 / 127.0, sound.as_ref(), state.pitch_wheel);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        let channel = channel & 0x0f;
        for slot in &mut self.slots {
            if slot.channel == channel
                && slot.voice.current_note() == Some(note)
                && slot.voice.state() == VoiceState::Active
            {
                slot.voice.stop_note(true);
            }
        }
    }

    fn allocate(&mut self, channel: u8, note: u8, sound: &dyn SynthSound) -> Option<usize> {
        let limit = self.params.polyphony().clamp(1, self.slots.len());
        let slots = &self.slots[..limit];
        let candidates = move || {
            slots
                .iter()
                .enumerate()
                .filter(move |(_, s)| s.voice.can_play_sound(sound))
        };

        // Same note on the same channel: retrigger
        if let Some((idx, _)) = candidates().find(|(_, s)| {
            s.voice.is_active() && s.channel == channel && s.voice.current_note() == Some(note)
        }) {
            return Some(idx);
        }

        if let Some((idx, _)) = candidates().find(|(_, s)| s.voice.is_free()) {
            return Some(idx);
        }

        let oldest = |state: VoiceState| {
            candidates()
                .filter(|(_, s)| s.voice.state() == state)
                .min_by_key(|(_, s)| s.age)
                .map(|(idx, _)| idx)
        };

        let stolen = oldest(VoiceState::Releasing).or_else(|| oldest(VoiceState::Active))?;
        debug!(voice = stolen, note, "stealing voice");
        self.slots[stolen].voice.stop_note(false);
        Some(stolen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{params::ParamId, synth::sound::SoundDescriptor};
    use std::collections::VecDeque;

    impl MessageReceiver for VecDeque<SynthMessage> {
        fn pop(&mut self) -> Option<SynthMessage> {
            self.pop_front()
        }
    }

    fn synth(params: Arc<ParameterSet>) -> PolySynth<VecDeque<SynthMessage>> {
        let sounds: Vec<Arc<dyn SynthSound>> = vec![Arc::new(SoundDescriptor::default())];
        PolySynth::new(VoiceConfig::default(), params, sounds, VecDeque::new()).unwrap()
    }

    fn note_on(note: u8) -> SynthMessage {
        SynthMessage::NoteOn {
            channel: 0,
            note,
            velocity: 100,
        }
    }

    #[test]
    fn allocates_a_free_voice_per_note() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(note_on(60));
        poly.handle_message(note_on(64));
        assert_eq!(poly.active_voices(), 2);
    }

    #[test]
    fn repeated_note_retriggers_its_own_voice() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(note_on(60));
        poly.handle_message(note_on(60));
        assert_eq!(poly.active_voices(), 1);
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(note_on(60));
        poly.handle_message(SynthMessage::NoteOn {
            channel: 0,
            note: 60,
            velocity: 0,
        });
        assert_eq!(poly.voice(0).map(Voice::state), Some(VoiceState::Releasing));
    }

    #[test]
    fn steals_oldest_when_polyphony_is_exhausted() {
        let params = Arc::new(ParameterSet::new());
        params.set(ParamId::SynthVoices, 2.0).unwrap();
        let mut poly = synth(params);

        poly.handle_message(note_on(60));
        poly.handle_message(note_on(62));
        poly.handle_message(note_on(64));

        assert_eq!(poly.active_voices(), 2);
        assert_eq!(poly.voice(0).and_then(|v| v.current_note()), Some(64));
        assert_eq!(poly.voice(1).and_then(|v| v.current_note()), Some(62));
    }

    #[test]
    fn releasing_voice_is_stolen_before_active_one() {
        let params = Arc::new(ParameterSet::new());
        params.set(ParamId::SynthVoices, 2.0).unwrap();
        let mut poly = synth(params);

        poly.handle_message(note_on(60));
        poly.handle_message(note_on(62));
        poly.handle_message(SynthMessage::NoteOff {
            channel: 0,
            note: 62,
            velocity: 0,
        });
        poly.handle_message(note_on(67));

        assert_eq!(poly.voice(0).and_then(|v| v.current_note()), Some(60));
        assert_eq!(poly.voice(1).and_then(|v| v.current_note()), Some(67));
    }

    #[test]
    fn render_block_drains_queue_and_produces_audio() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.rx.push_back(note_on(69));

        let mut buffer = AudioBuffer::new(2, 256).unwrap();
        poly.render_block(&mut buffer);

        assert!(poly.rx.is_empty());
        assert!(buffer.channel(0).iter().any(|&s| s != 0.0));
    }

    fn control_change(channel: u8, controller: u8, value: u8) -> SynthMessage {
        SynthMessage::ControlChange {
            channel,
            controller,
            value,
        }
    }

    fn render_peak(poly: &mut PolySynth<VecDeque<SynthMessage>>) -> f32 {
        let mut buffer = AudioBuffer::new(1, 512).unwrap();
        poly.render_block(&mut buffer);
        buffer.channel(0).iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    #[test]
    fn channel_volume_does_not_leak_into_other_channels() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(SynthMessage::NoteOn {
            channel: 0,
            note: 69,
            velocity: 127,
        });
        poly.handle_message(control_change(0, CC_VOLUME, 0));
        assert_eq!(render_peak(&mut poly), 0.0);

        // Hard-stop the muted voice so the next note reuses it
        poly.handle_message(control_change(0, 120, 0));
        poly.handle_message(SynthMessage::NoteOn {
            channel: 1,
            note: 69,
            velocity: 127,
        });
        assert!(render_peak(&mut poly) > 0.5);
    }

    #[test]
    fn controllers_sent_before_a_note_apply_to_it() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(control_change(3, CC_VOLUME, 0));
        poly.handle_message(SynthMessage::NoteOn {
            channel: 3,
            note: 69,
            velocity: 127,
        });
        assert_eq!(poly.active_voices(), 1);
        assert_eq!(render_peak(&mut poly), 0.0);

        poly.handle_message(control_change(3, CC_VOLUME, 127));
        assert!(render_peak(&mut poly) > 0.5);
    }

    #[test]
    fn pitch_bend_is_kept_per_channel() {
        let mut poly = synth(Arc::new(ParameterSet::new()));
        poly.handle_message(SynthMessage::PitchBend {
            channel: 2,
            value: 16_383,
        });
        poly.handle_message(SynthMessage::NoteOn {
            channel: 2,
            note: 60,
            velocity: 100,
        });
        poly.handle_message(note_on(64));

        let bent = poly.channels[2].pitch_wheel;
        assert_eq!(bent, 16_383);
        assert_eq!(poly.channels[0].pitch_wheel, PITCH_WHEEL_CENTRE);
    }

    #[test]
    fn sounds_gate_notes() {
        let sounds: Vec<Arc<dyn SynthSound>> =
            vec![Arc::new(SoundDescriptor::new().with_notes(48..=59))];
        let mut poly = PolySynth::new(
            VoiceConfig::default(),
            Arc::new(ParameterSet::new()),
            sounds,
            VecDeque::new(),
        )
        .unwrap();

        poly.handle_message(note_on(72));
        assert_eq!(poly.active_voices(), 0);
        poly.handle_message(note_on(50));
        assert_eq!(poly.active_voices(), 1);
    }
}
