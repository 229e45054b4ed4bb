//! Safety clipping for feedback paths.
//!
//! A single NaN or infinity that enters a feedback loop never leaves it: it
//! is written into the delay lines and read back forever. `safety_clip`
//! sits at the boundaries of the loop and replaces non-finite samples with
//! silence, then hard clamps what is left.
//!
//! # Transfer function
//!
//! ```text
//!   NaN / ±inf  →  0
//!   x           →  clamp(x, -1024, 1024)
//! ```
//!
//! The bound is far above normal signal level, so this never shapes the
//! sound. It only keeps a runaway loop from overflowing.

/// Largest magnitude `safety_clip` lets through.
pub const SAFETY_LIMIT: f32 = 1024.0;

#[inline]
pub fn safety_clip(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-SAFETY_LIMIT, SAFETY_LIMIT)
    } else {
        0.0
    }
}

/// Apply [`safety_clip`] to an entire buffer in place.
pub fn safety_clip_buffer(buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = safety_clip(*sample);
    }
}
