//! Benchmarks for low-level DSP primitives.

mod allpass;
mod delay;
mod envelope;
mod filter;
mod noise;
mod notch;

pub use allpass::bench_allpass;
pub use delay::bench_delay;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use noise::bench_noise;
pub use notch::bench_notch;
