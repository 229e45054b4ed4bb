//! Benchmarks for the shelving and state-variable filters.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::filter::{ema_coefficient, EmaShelf, Svf};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let kp = ema_coefficient(0.1);

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.37).sin()).collect();

        let mut high = EmaShelf::high();
        let mut low = EmaShelf::low();
        group.bench_with_input(BenchmarkId::new("shelf_pair", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    let y = high.process(black_box(x), kp, 0.7);
                    sum += low.process(y, kp, 0.5);
                }
                sum
            })
        });

        let mut svf = Svf::highpass();
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("svf_highpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                svf.render(black_box(&mut buffer), black_box(0.02));
            })
        });
    }

    group.finish();
}
