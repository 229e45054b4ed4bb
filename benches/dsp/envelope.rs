//! Benchmarks for the exponential envelopes.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::dsp::envelope::{ExpAdEnvelope, ExpDsrEnvelope};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut ad = ExpAdEnvelope::new();
        ad.trigger(48_000.0, 0.002, 0.5, 1.0, 1.0);
        group.bench_with_input(BenchmarkId::new("ad_render", size), &size, |b, _| {
            b.iter(|| ad.render(black_box(&mut buffer)))
        });

        let mut dsr = ExpDsrEnvelope::new();
        dsr.set_time(48_000.0, 4_800.0);
        dsr.trigger(0.3);
        group.bench_with_input(BenchmarkId::new("dsr_process", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = dsr.process();
                }
                black_box(&buffer);
            })
        });
    }

    // Lambert W solve, paid once per strike
    let mut ad = ExpAdEnvelope::new();
    group.bench_function("ad_trigger", |b| {
        b.iter(|| {
            ad.trigger(
                black_box(48_000.0),
                black_box(0.002),
                black_box(0.5),
                1.0,
                1.0,
            )
        })
    });

    group.finish();
}
