//! polyvoice - plays a short arpeggio through the default output device
//!
//! Run with: cargo run
//! Logging is controlled by RUST_LOG (e.g. RUST_LOG=polyvoice=trace).

mod app;

use std::time::Duration;

use app::Player;
use polyvoice::ParamId;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut player = Player::start()?;

    // Saw + detuned square through a resonant low-pass swept by envelope 2
    let params = player.params();
    for (id, value) in [
        (ParamId::Osc1Wave, 1.0),
        (ParamId::Osc2Wave, 2.0),
        (ParamId::Osc2On, 1.0),
        (ParamId::Osc2SemiTone, 7.0),
        (ParamId::Osc2Level, 0.3),
        (ParamId::Filter1Type, 1.0),
        (ParamId::Filter1Cutoff, 600.0),
        (ParamId::Filter1Resonance, 0.6),
        (ParamId::Filter1EnvModDepth, 0.4),
        (ParamId::Filter1Env, 1.0),
        (ParamId::Adsr2Decay, 0.4),
        (ParamId::Adsr2Sustain, 0.2),
        (ParamId::Lfo1Depth, 0.1),
        (ParamId::OutputGain, 0.25),
    ] {
        params.set(id, value)?;
    }

    let step = Duration::from_millis(180);
    for round in 0..4u8 {
        for note in [48, 55, 60, 63, 67, 63, 60, 55] {
            player.note_on(note + round % 2 * 5, 100)?;
            std::thread::sleep(step);
            player.note_off(note + round % 2 * 5)?;
        }
        player.control_change(1, round * 40)?;
    }

    player.all_notes_off()?;
    std::thread::sleep(Duration::from_millis(600));
    Ok(())
}
