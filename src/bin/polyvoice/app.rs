//! Audio device setup and the control-side message producer

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{info, warn};

use polyvoice::{
    synth::{PolySynth, SynthMessage, SynthSound},
    AudioBuffer, ParameterSet, SoundDescriptor, VoiceConfig, MAX_BLOCK_SIZE,
};

const MESSAGE_CAPACITY: usize = 256;

pub struct Player {
    tx: Producer<SynthMessage>,
    params: Arc<ParameterSet>,
    _stream: cpal::Stream,
}

impl Player {
    /// Open the default output device and start rendering.
    pub fn start() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        info!(sample_rate, channels, "opened output device");

        let params = Arc::new(ParameterSet::new());
        let (tx, rx) = RingBuffer::<SynthMessage>::new(MESSAGE_CAPACITY);
        let sounds: Vec<Arc<dyn SynthSound>> = vec![Arc::new(SoundDescriptor::new())];
        let mut synth = PolySynth::new(
            VoiceConfig::new(sample_rate, channels)?,
            Arc::clone(&params),
            sounds,
            rx,
        )?;
        let mut block = AudioBuffer::new(channels, MAX_BLOCK_SIZE)?;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = chunk.len() / channels;
                    if block.resize(frames).is_err() {
                        chunk.fill(0.0);
                        continue;
                    }
                    synth.render_block(&mut block);
                    block.write_interleaved(chunk, channels);
                }
            },
            |err| warn!(%err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        Ok(Self {
            tx,
            params,
            _stream: stream,
        })
    }

    pub fn params(&self) -> Arc<ParameterSet> {
        Arc::clone(&self.params)
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> EyreResult<()> {
        self.send(SynthMessage::NoteOn {
            channel: 0,
            note,
            velocity,
        })
    }

    pub fn note_off(&mut self, note: u8) -> EyreResult<()> {
        self.send(SynthMessage::NoteOff {
            channel: 0,
            note,
            velocity: 0,
        })
    }

    pub fn control_change(&mut self, controller: u8, value: u8) -> EyreResult<()> {
        self.send(SynthMessage::ControlChange {
            channel: 0,
            controller,
            value,
        })
    }

    pub fn all_notes_off(&mut self) -> EyreResult<()> {
        self.send(SynthMessage::AllNotesOff)
    }

    fn send(&mut self, msg: SynthMessage) -> EyreResult<()> {
        self.tx
            .push(msg)
            .map_err(|_| eyre!("message queue full, dropped {msg:?}"))
    }
}
