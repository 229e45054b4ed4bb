//! Benchmarks for the serial allpass network.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::{filter::ema_coefficient, AllpassParams, SerialAllpass};

use crate::BLOCK_SIZES;

fn network<const N: usize>() -> SerialAllpass<N, 4> {
    let mut net = SerialAllpass::<N, 4>::new();
    net.setup(4800.0);
    for (i, time) in net.time_in_samples.iter_mut().enumerate() {
        *time = 12.0 + 3.7 * i as f32;
    }
    net
}

pub fn bench_allpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/allpass");

    let params = AllpassParams {
        high_shelf_cut: ema_coefficient(0.19),
        high_shelf_gain: 0.8,
        low_shelf_cut: ema_coefficient(0.006),
        low_shelf_gain: 0.6,
        feedback_gain: 0.95,
        pitch_ratio: 1.0,
        time_mod_amount: 4.0,
        notch_count: 4,
        notch_mix: 0.5,
        notch_narrowness: 0.995,
    };
    let unmodulated = AllpassParams {
        time_mod_amount: 0.0,
        notch_count: 0,
        ..params
    };

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size)
            .map(|i| if i % 97 == 0 { 1.0 } else { 0.0 })
            .collect();

        let mut plain = network::<8>();
        group.bench_with_input(BenchmarkId::new("stages_8", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += plain.process(black_box(x), black_box(&unmodulated));
                }
                sum
            })
        });

        let mut full = network::<8>();
        group.bench_with_input(
            BenchmarkId::new("stages_8_modulated_notched", size),
            &size,
            |b, _| {
                b.iter(|| {
                    let mut sum = 0.0f32;
                    for &x in &input {
                        sum += full.process(black_box(x), black_box(&params));
                    }
                    sum
                })
            },
        );

        let mut wide = network::<16>();
        group.bench_with_input(BenchmarkId::new("stages_16", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for &x in &input {
                    sum += wide.process(black_box(x), black_box(&params));
                }
                sum
            })
        });
    }

    group.finish();
}
