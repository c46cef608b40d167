// Purpose: note-level rendering and the reference voice allocator
// A Voice renders one note; PolySynth drains messages and mixes voices

pub mod message;
pub mod poly;
pub mod sound;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use poly::PolySynth;
pub use sound::{SoundDescriptor, SynthSound};
pub use voice::{SynthVoice, Voice, VoiceConfig, VoiceState};
