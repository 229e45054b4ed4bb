//! Benchmarks for the fractional delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::delay::FractionalDelay;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times: &[f32] = &[
        40.0,   // one allpass stage at 1.2kHz
        480.5,  // 10ms at 48kHz
        4800.5, // 100ms at 48kHz
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &time in delay_times {
            let mut delay = FractionalDelay::new();
            delay.setup(4800.0);
            let mut buffer = input.clone();
            group.bench_with_input(
                BenchmarkId::new(format!("render_{}", time as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        buffer.copy_from_slice(&input);
                        delay.render(black_box(&mut buffer), black_box(time));
                    })
                },
            );
        }

        // Delay time moving every sample, as inside the allpass loops
        let mut delay = FractionalDelay::new();
        delay.setup(4800.0);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for (i, &x) in input.iter().enumerate() {
                    let time = 40.0 - 4.0 * (i as f32 * 0.05).sin().abs();
                    sum += delay.process(black_box(x), black_box(time));
                }
                sum
            })
        });
    }

    group.finish();
}
