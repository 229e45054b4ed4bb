//! Low-level DSP primitives used by the cymbal voice.
//!
//! These components are allocation-free and realtime-safe once `setup` has
//! run, making them safe to embed directly inside voice structs. They stay
//! focused on the signal-processing math so the voice layer can handle
//! parameter mapping and note events.

/// Allpass feedback loops chained in series, with adaptive notches.
pub mod allpass;
/// Non-finite guard and hard clamp for feedback paths.
pub mod clip;
/// Circular delay line read with 3rd order Lagrange interpolation.
pub mod delay;
/// Exponential envelope generators.
pub mod envelope;
/// Shelving and state-variable filters.
pub mod filter;
/// Impulse-train excitation noise and the per-voice random source.
pub mod noise;
/// Gradient-adaptive notch filter.
pub mod notch;

pub use allpass::{AllpassParams, SerialAllpass};
pub use envelope::{DsrState, Normalization};
