//! Benchmarks for the adaptive notch.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::notch::AdaptiveNotch;

use crate::BLOCK_SIZES;

pub fn bench_notch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/notch");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.3).sin()).collect();

        let mut notch = AdaptiveNotch::new();
        group.bench_with_input(BenchmarkId::new("single", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += notch.process(black_box(x), black_box(0.99));
                }
                sum
            })
        });

        // Four in series, as after the allpass chain
        let mut chain = [AdaptiveNotch::new(); 4];
        group.bench_with_input(BenchmarkId::new("chain_4", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    let mut y = black_box(x);
                    for notch in chain.iter_mut() {
                        y += 0.5 * (notch.process(y, 0.99) - y);
                    }
                    sum += y;
                }
                sum
            })
        });
    }

    group.finish();
}
