//! Benchmarks for complete voices.
//!
//! From the default single-sine patch up to every oscillator, both filters
//! and all modulation enabled, plus a fully loaded eight-voice synth.

use std::collections::VecDeque;
use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion};
use polyvoice::{
    synth::{MessageReceiver, PolySynth, SynthMessage},
    AudioBuffer, ParamId, ParameterSet, SoundDescriptor, SynthSound, SynthVoice, Voice,
    VoiceConfig,
};

use crate::BLOCK_SIZES;

struct Queue(VecDeque<SynthMessage>);

impl MessageReceiver for Queue {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.0.pop_front()
    }
}

fn full_patch() -> Arc<ParameterSet> {
    let params = Arc::new(ParameterSet::new());
    for (id, value) in [
        (ParamId::Osc1Wave, 1.0),
        (ParamId::Osc2On, 1.0),
        (ParamId::Osc2Wave, 2.0),
        (ParamId::Osc3On, 1.0),
        (ParamId::Osc3Wave, 3.0),
        (ParamId::Filter1Type, 1.0),
        (ParamId::Filter1Resonance, 0.7),
        (ParamId::Filter1EnvModDepth, 0.5),
        (ParamId::Filter2Type, 3.0),
        (ParamId::FilterSequence, 2.0),
        (ParamId::Lfo1Depth, 0.3),
        (ParamId::Lfo2Dest, 2.0),
        (ParamId::Lfo2Depth, 0.5),
        (ParamId::Filter1Lfo, 1.0),
        (ParamId::Noise, 0.1),
        (ParamId::Drive, 0.5),
    ] {
        params.set(id, value).unwrap();
    }
    params
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let config = VoiceConfig::new(48_000.0, 2).unwrap();
    let sound = SoundDescriptor::new();

    for &size in BLOCK_SIZES {
        let mut buffer = AudioBuffer::new(2, size).unwrap();

        // === DEFAULT PATCH ===
        // one sine oscillator, filters bypassed
        let mut voice = Voice::new(config, Arc::new(ParameterSet::new())).unwrap();
        voice.start_note(45, 0.8, &sound, 8192);
        group.bench_with_input(BenchmarkId::new("default", size), &size, |b, _| {
            b.iter(|| {
                voice.render_next_block(black_box(&mut buffer), 0, size);
            })
        });

        // === FULL PATCH ===
        // three oscillators, parallel filters, LFOs on pitch and cutoff, drive
        let mut voice = Voice::new(config, full_patch()).unwrap();
        voice.start_note(45, 0.8, &sound, 8192);
        voice.controller_moved(1, 64);
        group.bench_with_input(BenchmarkId::new("full", size), &size, |b, _| {
            b.iter(|| {
                voice.render_next_block(black_box(&mut buffer), 0, size);
            })
        });

        // === EIGHT VOICES ===
        let sounds: Vec<Arc<dyn SynthSound>> = vec![Arc::new(SoundDescriptor::new())];
        let notes = (0..8u8).map(|i| SynthMessage::NoteOn {
            channel: 0,
            note: 48 + i * 3,
            velocity: 100,
        });
        let mut synth =
            PolySynth::new(config, full_patch(), sounds, Queue(notes.collect())).unwrap();
        group.bench_with_input(BenchmarkId::new("poly_8", size), &size, |b, _| {
            b.iter(|| {
                synth.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
