//! Control-side error types.
//!
//! Nothing on the audio path returns these: rendering clamps bad input and
//! degrades to silence instead.

use crate::params::NUM_PARAMS;

/// Rejected parameter writes from the control thread.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("parameter index {0} is outside the frozen layout (0..{NUM_PARAMS})")]
    UnknownIndex(usize),
    #[error("parameter {name} rejected non-finite value {value}")]
    NonFinite { name: &'static str, value: f32 },
}

/// Invalid host configuration handed to a voice or synth at construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoiceError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),
    #[error("channel count must be at least 1")]
    InvalidChannelCount,
    #[error("block size {requested} exceeds the maximum of {max}")]
    BlockTooLarge { requested: usize, max: usize },
}
