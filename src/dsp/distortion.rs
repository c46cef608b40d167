//! Drive / Waveshaping
//!
//! The voice's drive stage pushes the filtered signal into a soft clipper to
//! add harmonics. The drive parameter is a 0..1 amount mapped onto a gain
//! into the waveshaper:
//!
//!   gain = 1 + amount × (MAX_DRIVE_GAIN - 1)
//!
//! An amount of exactly 0.0 bypasses the stage so a clean patch stays
//! bit-for-bit linear.
//!
//! # Soft Clip
//!
//!   f(x) = x / (1 + |x|)
//!   - Smooth, warm saturation
//!   - Output is always inside (-1, 1)
//!
//! The clipped signal is rescaled by (1 + 1/gain) so low-level material keeps
//! roughly the same loudness as drive increases; peaks still flatten.

pub const MAX_DRIVE_GAIN: f32 = 10.0;

/// Soft clipping using x / (1 + |x|) transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    let x = sample * drive;
    x / (1.0 + x.abs())
}

/// Apply the voice drive stage. `amount` outside 0..1 is clamped.
#[inline]
pub fn apply_drive(sample: f32, amount: f32) -> f32 {
    if amount.is_nan() || amount <= 0.0 {
        return sample;
    }
    let gain = 1.0 + amount.min(1.0) * (MAX_DRIVE_GAIN - 1.0);
    soft_clip(sample, gain) * (1.0 + 1.0 / gain)
}
