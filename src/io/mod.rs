// Purpose - buffers exchanged with the host

use crate::{error::VoiceError, MAX_BLOCK_SIZE};

/// Non-interleaved multi-channel sample buffer, sized once up front.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AudioBuffer {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioBuffer {
    pub fn new(num_channels: usize, num_samples: usize) -> Result<Self, VoiceError> {
        if num_channels == 0 {
            return Err(VoiceError::InvalidChannelCount);
        }
        if num_samples > MAX_BLOCK_SIZE {
            return Err(VoiceError::BlockTooLarge {
                requested: num_samples,
                max: MAX_BLOCK_SIZE,
            });
        }
        Ok(Self {
            buffers: vec![vec![0.0; num_samples]; num_channels],
        })
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    /// Length of the shortest channel.
    pub fn num_samples(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.buffers[index]
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.buffers[index]
    }

    /// Change the block length. Buffers created by [`AudioBuffer::new`] only
    /// reallocate when growing past their original size.
    pub fn resize(&mut self, num_samples: usize) -> Result<(), VoiceError> {
        if num_samples > MAX_BLOCK_SIZE {
            return Err(VoiceError::BlockTooLarge {
                requested: num_samples,
                max: MAX_BLOCK_SIZE,
            });
        }
        for channel in &mut self.buffers {
            channel.resize(num_samples, 0.0);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        for channel in &mut self.buffers {
            channel.fill(0.0);
        }
    }

    /// Add `sample` to frame `index` of every channel.
    #[inline]
    pub fn add_frame(&mut self, index: usize, sample: f32) {
        for channel in &mut self.buffers {
            if let Some(slot) = channel.get_mut(index) {
                *slot += sample;
            }
        }
    }

    /// Write frames into an interleaved host buffer (e.g. a cpal callback slice).
    pub fn write_interleaved(&self, out: &mut [f32], host_channels: usize) {
        if host_channels == 0 || self.buffers.is_empty() {
            out.fill(0.0);
            return;
        }
        for (frame_index, frame) in out.chunks_mut(host_channels).enumerate() {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let source = &self.buffers[ch.min(self.buffers.len() - 1)];
                *sample = source.get(frame_index).copied().unwrap_or(0.0);
            }
        }
    }
}
