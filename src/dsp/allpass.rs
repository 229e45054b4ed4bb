//! Serial Allpass Network - the cymbal body
//!
//! A chain of allpass feedback loops. Each loop holds a shelving pair, a
//! fractional delay, and a single sample of state. Feeding a click through
//! the chain smears it into a dense, inharmonic ring.
//!
//! # One Stage
//!
//! ```text
//!            ┌──────────────── × g ───────────────┐
//!            │                                    ▼
//! in ──→ [HS]→[LS]──→ (−) ──x──→ [delay] ──→ buf ──┬──→ (+) ──→ next stage
//!                     ▲                           │
//!                     └────────── × g ────────────┘
//! ```
//!
//! ```text
//! x    = low_shelf(high_shelf(in)) - g * buf
//! next = buf + g * x
//! buf  = delay(x, time / pitch_ratio - time_mod * |x|)
//! ```
//!
//! With flat shelves each stage is an allpass: it keeps the energy of the
//! signal and only reshuffles its phase.
//!
//! # Where the Chaos Comes From
//!
//! The delay time is shortened by the rectified loop signal itself. Loud
//! moments retune the loop while it rings, which bends every partial away
//! from a harmonic series. The order of operations above is part of the
//! sound: shelving comes before the feedback subtraction, and the
//! modulation reads `x` after the subtraction. Reordering changes the
//! stability margins.
//!
//! # Stability
//!
//! `feedback_gain` must stay inside (-1, 1). Nothing inside the loop clamps
//! it. The adaptive notches after the chain carry the only safety clip.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::delay::FractionalDelay;
use super::filter::EmaShelf;
use super::notch::AdaptiveNotch;

/// Block-rate controls for [`SerialAllpass::process`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllpassParams {
    /// EMA coefficient of the high shelf.
    pub high_shelf_cut: f32,
    /// Gain applied above the high shelf cut.
    pub high_shelf_gain: f32,
    /// EMA coefficient of the low shelf.
    pub low_shelf_cut: f32,
    /// Gain applied below the low shelf cut.
    pub low_shelf_gain: f32,
    /// Allpass coefficient, caller keeps it inside (-1, 1).
    pub feedback_gain: f32,
    /// Divides every base delay time.
    pub pitch_ratio: f32,
    /// Samples of delay removed per unit of |x|.
    pub time_mod_amount: f32,
    /// How many of the adaptive notches to run.
    pub notch_count: usize,
    /// 0 bypasses the notches, 1 is fully notched.
    pub notch_mix: f32,
    /// Notch pole radius in [0, 1].
    pub notch_narrowness: f32,
}

impl Default for AllpassParams {
    fn default() -> Self {
        Self {
            high_shelf_cut: 1.0,
            high_shelf_gain: 1.0,
            low_shelf_cut: 0.0,
            low_shelf_gain: 1.0,
            feedback_gain: 0.0,
            pitch_ratio: 1.0,
            time_mod_amount: 0.0,
            notch_count: 0,
            notch_mix: 0.0,
            notch_narrowness: 0.99,
        }
    }
}

/// `N` allpass stages in series followed by up to `M` adaptive notches.
#[derive(Debug, Clone)]
pub struct SerialAllpass<const N: usize, const M: usize> {
    buffer: [f32; N],
    delay: [FractionalDelay; N],
    high_shelf: [EmaShelf; N],
    low_shelf: [EmaShelf; N],
    notch: [AdaptiveNotch; M],

    /// Base delay time of each stage, in samples.
    pub time_in_samples: [f32; N],
}

impl<const N: usize, const M: usize> SerialAllpass<N, M> {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; N],
            delay: std::array::from_fn(|_| FractionalDelay::new()),
            high_shelf: [EmaShelf::high(); N],
            low_shelf: [EmaShelf::low(); N],
            notch: [AdaptiveNotch::new(); M],
            time_in_samples: [0.0; N],
        }
    }

    /// Allocate every stage for `max_time_samples`. Not realtime-safe.
    pub fn setup(&mut self, max_time_samples: f32) {
        for delay in self.delay.iter_mut() {
            delay.setup(max_time_samples);
        }
        tracing::debug!(
            stages = N,
            notches = M,
            max_time_samples,
            "allpass network allocated"
        );
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        for delay in self.delay.iter_mut() {
            delay.reset();
        }
        for shelf in self.high_shelf.iter_mut().chain(self.low_shelf.iter_mut()) {
            shelf.reset();
        }
        for notch in self.notch.iter_mut() {
            notch.reset();
        }
    }

    /// Scale the energy stored in every delay line.
    pub fn apply_gain(&mut self, gain: f32) {
        for delay in self.delay.iter_mut() {
            delay.apply_gain(gain);
        }
    }

    pub fn set_time_in_samples(&mut self, times: [f32; N]) {
        self.time_in_samples = times;
    }

    pub fn notches(&self) -> &[AdaptiveNotch] {
        &self.notch
    }

    /// Body tap over the stage outputs.
    ///
    /// `alt_sign_mix` crossfades the plain sum into a sum with alternating
    /// signs, which cancels the common mode and leaves the brighter part.
    pub fn sum(&self, alt_sign_mix: f32) -> f32 {
        let mut sum_alt = 0.0;
        let mut sign = 1.0;
        for &x in self.buffer.iter() {
            sum_alt += x * sign;
            sign = -sign;
        }
        let sum_direct: f32 = self.buffer.iter().sum();
        (sum_direct + alt_sign_mix * (sum_alt - sum_direct)) / (2.0 * N as f32)
    }

    pub fn process(&mut self, mut input: f32, params: &AllpassParams) -> f32 {
        let gain = params.feedback_gain;
        for idx in 0..N {
            let mut x0 =
                self.high_shelf[idx].process(input, params.high_shelf_cut, params.high_shelf_gain);
            x0 = self.low_shelf[idx].process(x0, params.low_shelf_cut, params.low_shelf_gain);
            x0 -= gain * self.buffer[idx];
            input = self.buffer[idx] + gain * x0;
            self.buffer[idx] = self.delay[idx].process(
                x0,
                self.time_in_samples[idx] / params.pitch_ratio
                    - params.time_mod_amount * x0.abs(),
            );
        }

        let count = params.notch_count.min(M);
        for notch in self.notch[..count].iter_mut() {
            input += params.notch_mix * (notch.process(input, params.notch_narrowness) - input);
        }

        input
    }
}

impl<const N: usize, const M: usize> Default for SerialAllpass<N, M> {
    fn default() -> Self {
        Self::new()
    }
}
