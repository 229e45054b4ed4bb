use lambert_w::lambert_wm1;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::EPSILON;

/*
Exponential Envelopes
=====================

Struck metal does not ramp linearly. Its energy leaks away by a fixed
fraction every sample, so every envelope in this module is a geometric
sequence:

    value[n + 1] = value[n] * alpha

Vocabulary
----------

  alpha       Per-sample multiplier in (0, 1]. 1 means "hold".

  epsilon     f32::EPSILON (~1.19e-7, about -138 dB). "Decay time" here means
              the time it takes the envelope to fall by that much, which is
              as close to silent as an f32 signal gets.

  trigger     Restart the envelope from a new starting value.

  release     Switch a sustaining envelope to its final decay.


The Math: Time to Coefficient
-----------------------------

To fall from 1 to epsilon in T samples:

    alpha^T = epsilon
    alpha   = epsilon^(1 / T)

Example: 0.5 s at 48 kHz, T = 24000
    alpha = 1.19e-7 ^ (1 / 24000) ≈ 0.999336


The Family
----------

  ExpDecay                    value *= alpha, optionally held at 1 (sustain).

  ExpDsrEnvelope              decays from 1 toward a sustain level. Release
                              drops the sustain part and lets only the
                              leftover transient decay to 0.

          1.0 ┐╲
              │ ╲__________ sustain
              │            │ release
          0.0 └────────────┴────→

  TransitionReleaseSmoother   carries the tail of a voice that got
                              retriggered, so the restart does not click.

  ExpAdEnvelope               attack-decay shape from two poles:

              env(t) = (1 - e^(a t)) e^(d t)      a, d < 0

              The rates are solved so the peak lands exactly at
              `peak_seconds` (see below).


Solving the Attack-Decay Shape
------------------------------

Total length is fixed by the release plus a tail long enough for the attack:

    decay_s = release_s - ln(eps) * peak_s
    d       = ln(eps) / decay_s

Setting d/dt env(t) = 0 at t = peak_s and substituting x = d * peak_s,
y = (a + d) * peak_s gives

    x e^x = y e^y

x is one solution, and the other is on the lower branch of Lambert W:

    y = W_-1(x e^x)
    a = y / peak_s - d

The per-sample multipliers are then e^(a / fs) and e^(d / fs).

Gain normalization picks one of:

  Energy   area under env(t) is -a / (d (d + a)); the target gain is
           0.1 * peak_gain / area so long and short hits carry similar
           energy.

  Peak     divide by env(peak_s) so the maximum equals peak_gain.
*/

#[inline]
fn decay_coefficient(time_in_samples: f32) -> f32 {
    EPSILON.powf(1.0 / time_in_samples)
}

/// Plain exponential decay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpDecay {
    value: f32,
    alpha: f32,
}

impl ExpDecay {
    pub fn new() -> Self {
        Self::default()
    }

    /// `sustain` pins alpha to 1 so the triggered value is held.
    pub fn set_time(&mut self, decay_time_in_samples: f32, sustain: bool) {
        self.alpha = if sustain {
            1.0
        } else {
            decay_coefficient(decay_time_in_samples)
        };
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn trigger(&mut self, gain: f32) {
        self.value = gain;
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        self.value *= self.alpha;
        self.value
    }

}

/// The current stage of an [`ExpDsrEnvelope`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DsrState {
    Decay,
    #[default]
    Release,
}

/// Decay toward a sustain level, then release toward 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpDsrEnvelope {
    value: f32,
    alpha_d: f32,
    alpha_r: f32,
    offset: f32,
    state: DsrState,
}

impl ExpDsrEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&mut self, decay_time_in_samples: f32, release_time_in_samples: f32) {
        self.alpha_d = decay_coefficient(decay_time_in_samples);
        self.alpha_r = decay_coefficient(release_time_in_samples);
    }

    /// Clears the level and returns to `Release`. The decay and release
    /// coefficients from `set_time` survive, so no new `set_time` is needed.
    pub fn reset(&mut self) {
        self.value = 0.0;
        self.offset = 0.0;
        self.state = DsrState::Release;
    }

    pub fn trigger(&mut self, sustain_level: f32) {
        self.state = DsrState::Decay;
        self.value = 1.0 - sustain_level;
        self.offset = sustain_level;
    }

    /// Drop the sustain offset and decay what is left of the initial
    /// transient. Stays in release until the next `trigger`.
    pub fn release(&mut self) {
        self.state = DsrState::Release;
        self.offset = 0.0;
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        match self.state {
            DsrState::Decay => {
                self.value *= self.alpha_d;
                self.offset + self.value
            }
            DsrState::Release => {
                self.value *= self.alpha_r;
                self.value
            }
        }
    }

    pub fn state(&self) -> DsrState {
        self.state
    }
}

/// Fades out whatever a voice was playing when it got retriggered.
///
/// Every `prepare` adds into the same accumulator and replaces the decay
/// rate, so all pending energy follows the most recent rate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionReleaseSmoother {
    v0: f32,
    decay: f32,
}

impl TransitionReleaseSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// `decay_samples = sample_rate * seconds`.
    pub fn setup(&mut self, decay_samples: f32) {
        self.decay = decay_coefficient(decay_samples);
    }

    pub fn reset(&mut self) {
        self.v0 = 0.0;
    }

    pub fn prepare(&mut self, value: f32, decay_samples: f32) {
        self.v0 += value;
        self.decay = decay_coefficient(decay_samples);
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        self.v0 *= self.decay;
        self.v0
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    Peak,
    #[default]
    Energy,
}

/// Two-pole attack-decay envelope with an exact peak time.
#[derive(Debug, Clone, Copy)]
pub struct ExpAdEnvelope {
    target_gain: f32,
    velocity: f32,
    gain: f32,
    smoo: f32,
    value_a: f32,
    alpha_a: f32,
    value_d: f32,
    alpha_d: f32,
    normalization: Normalization,
}

impl ExpAdEnvelope {
    /// Level of the decay pole below which the envelope counts as finished.
    pub const TERMINATION_LEVEL: f32 = 1e-3;

    pub fn new() -> Self {
        Self {
            target_gain: 0.0,
            velocity: 0.0,
            gain: 1.0,
            smoo: 1.0,
            value_a: 0.0,
            alpha_a: 0.0,
            value_d: 0.0,
            alpha_d: 0.0,
            normalization: Normalization::Energy,
        }
    }

    /// `smoothing_kp` is the one-pole coefficient used to glide the gain
    /// toward a new target. 1 jumps immediately.
    pub fn setup(&mut self, smoothing_kp: f32) {
        self.smoo = smoothing_kp;
    }

    pub fn set_normalization(&mut self, normalization: Normalization) {
        self.normalization = normalization;
    }

    pub fn is_terminated(&self) -> bool {
        self.value_d <= Self::TERMINATION_LEVEL
    }

    pub fn reset(&mut self) {
        self.target_gain = 0.0;
        self.gain = 1.0;
        self.value_a = 0.0;
        self.alpha_a = 0.0;
        self.value_d = 0.0;
        self.alpha_d = 0.0;
    }

    /// Recompute the pole rates and target gain without restarting.
    pub fn update(
        &mut self,
        sample_rate: f32,
        peak_seconds: f32,
        release_seconds: f32,
        peak_gain: f32,
        normalization: Normalization,
    ) {
        let sample_rate = sample_rate as f64;
        let peak = peak_seconds as f64;
        let log_eps = (EPSILON as f64).ln();

        let decay_seconds = release_seconds as f64 - log_eps * peak;
        let d = log_eps / decay_seconds;
        let x = d * peak;
        let a = lambert_wm1(x * x.exp()) / peak - d;

        self.alpha_a = (a / sample_rate).exp() as f32;
        self.alpha_d = (d / sample_rate).exp() as f32;

        self.target_gain = match normalization {
            Normalization::Energy => {
                let area = -a / (d * (d + a));
                (0.1 * peak_gain as f64 / area) as f32
            }
            Normalization::Peak => {
                (peak_gain as f64 / (-(a * peak).exp_m1() * (d * peak).exp())) as f32
            }
        };
    }

    pub fn trigger(
        &mut self,
        sample_rate: f32,
        peak_seconds: f32,
        release_seconds: f32,
        peak_gain: f32,
        velocity: f32,
    ) {
        self.velocity = velocity;
        self.value_a = 1.0;
        self.value_d = 1.0;
        self.update(
            sample_rate,
            peak_seconds,
            release_seconds,
            peak_gain,
            self.normalization,
        );
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        self.gain += self.smoo * (self.target_gain - self.gain);
        self.value_a *= self.alpha_a;
        self.value_d *= self.alpha_d;
        self.velocity * self.gain * (1.0 - self.value_a) * self.value_d
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }
}

impl Default for ExpAdEnvelope {
    fn default() -> Self {
        Self::new()
    }
}
