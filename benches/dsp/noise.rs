//! Benchmarks for the excitation noise.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::noise::{HalfClosedNoise, VoiceRng};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut noise = HalfClosedNoise::new();
        noise.set_decay(96.0);
        let mut rng = VoiceRng::new(1);

        group.bench_with_input(BenchmarkId::new("half_closed", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for _ in 0..size {
                    sum += noise.process(black_box(0.16), black_box(0.5), 0.017, &mut rng);
                }
                sum
            })
        });
    }

    group.finish();
}
