//! Real-world scenario benchmarks.
//!
//! A complete voice as the demo player runs it.

mod voice;

pub use voice::bench_voice;
