//! Benchmarks for the complete cymbal voice.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cymbal_dsp::synth::{CymbalParams, CymbalVoice};

use crate::BLOCK_SIZES;

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    let sustained = CymbalParams {
        sustain_level: 0.5,
        ..CymbalParams::default()
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Held ringing, the steady-state cost
        let mut voice = CymbalVoice::new(1);
        voice
            .setup(48_000.0, &sustained)
            .expect("default params are valid");
        voice.note_on(1.0);
        group.bench_with_input(BenchmarkId::new("ringing", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut buffer)))
        });

        // Strike then one block, includes the per-strike setup
        let mut voice = CymbalVoice::new(2);
        voice
            .setup(48_000.0, &CymbalParams::default())
            .expect("default params are valid");
        group.bench_with_input(BenchmarkId::new("strike", size), &size, |b, _| {
            b.iter(|| {
                voice.note_on(black_box(0.9));
                voice.render(black_box(&mut buffer));
            })
        });

        // Idle voices should cost next to nothing
        let mut idle = CymbalVoice::new(3);
        idle.setup(48_000.0, &CymbalParams::default())
            .expect("default params are valid");
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
