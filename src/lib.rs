pub mod dsp; // Per-sample synthesis primitives
pub mod synth; // Single cymbal voice built from the primitives

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Longest delay any allpass stage may reach, in seconds.
pub const MAX_DELAY_SECONDS: f32 = 0.1;
/// Machine epsilon used to derive geometric decay coefficients.
pub(crate) const EPSILON: f32 = f32::EPSILON;
