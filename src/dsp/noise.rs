//! Impulse-train excitation noise.
//!
//! A cymbal is excited by a stick, not by steady hiss. `HalfClosedNoise`
//! models that as a stream of clicks at a random rate, each click a burst of
//! cubed white noise that decays until the next one arrives.
//!
//! ```text
//!  phase  += density * U[0, 1)            (wrap ⇒ new click)
//!  gain    = 1 + random_gain * (N(0, 1/3) - 1)   on wrap
//!          = gain * decay                        otherwise
//!  out     = highpass(U[-1, 1)^3 * gain)
//! ```
//!
//! Cubing the noise pushes most samples toward 0 and leaves a few large
//! ones, which reads as grit rather than hiss.
//!
//! The random source is passed in on every call. Each voice owns its own
//! [`VoiceRng`], so two voices never share a stream and a render is
//! reproducible from the seed alone.

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64;

use super::filter::Svf;
use crate::EPSILON;

/// Random source consumed by the excitation generator.
pub trait ExcitationRng {
    /// Uniform sample in `[0, 1)`.
    fn uniform(&mut self) -> f32;

    /// Standard normal sample, mean 0 and deviation 1.
    fn normal(&mut self) -> f32;
}

/// Seeded PCG-64 stream owned by a single voice.
#[derive(Debug, Clone)]
pub struct VoiceRng {
    rng: Pcg64,
}

impl VoiceRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg64::seed_from_u64(seed);
    }
}

impl ExcitationRng for VoiceRng {
    #[inline]
    fn uniform(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    #[inline]
    fn normal(&mut self) -> f32 {
        StandardNormal.sample(&mut self.rng)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HalfClosedNoise {
    phase: f32,
    gain: f32,
    decay: f32,
    highpass: Svf,
}

impl HalfClosedNoise {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            gain: 1.0,
            decay: 0.0,
            highpass: Svf::highpass(),
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.gain = 1.0;
        self.highpass.reset();
    }

    /// Click decay time. Below one sample each click lasts a single sample.
    pub fn set_decay(&mut self, time_in_samples: f32) {
        self.decay = if time_in_samples < 1.0 {
            0.0
        } else {
            EPSILON.powf(1.0 / time_in_samples)
        };
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// `density` is the inverse of the average number of samples between
    /// clicks. `random_gain` in `[0, 1]` blends click level from fixed to
    /// random.
    #[inline]
    pub fn process<R: ExcitationRng + ?Sized>(
        &mut self,
        density: f32,
        random_gain: f32,
        highpass_normalized: f32,
        rng: &mut R,
    ) -> f32 {
        self.phase += rng.uniform() * density;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
            let jitter = rng.normal() / 3.0;
            self.gain = 1.0 + random_gain * (jitter - 1.0);
        } else {
            self.gain *= self.decay;
        }

        let noise = 2.0 * rng.uniform() - 1.0;
        self.highpass
            .process(noise * noise * noise * self.gain, highpass_normalized)
    }
}

impl Default for HalfClosedNoise {
    fn default() -> Self {
        Self::new()
    }
}
