//! Adaptive Notch Filter (constrained pole-zero)
//!
//! A second order notch whose zeros sit on the unit circle at
//! `1 + alpha z^-1 + z^-2`, with the poles pulled in along the same angle by
//! `narrowness`:
//!
//! ```text
//!          1 + alpha z^-1 + z^-2
//! H(z) = ---------------------------------
//!        1 + r alpha z^-1 + r^2 z^-2        r = narrowness
//! ```
//!
//! `alpha = -2 cos(w)` places the notch at `w`. Every sample `alpha` takes
//! one LMS step against the output power, so the notch slides toward
//! whatever narrowband component dominates the input. That is what lets a
//! chain of these pull the loudest ringing partials out of the allpass
//! network without knowing where they are.
//!
//! `alpha` lives in `[-2, 2]` (0 Hz to Nyquist) and is clamped after every
//! update. The input is clamped to `1 / epsilon` so a blown-up feedback
//! signal cannot push the state to infinity.

use crate::EPSILON;

/// LMS step size.
pub const MU: f32 = 2.0 / 1024.0;
const ALPHA_BOUND: f32 = 2.0;
const INPUT_CLIP: f32 = 1.0 / EPSILON;

#[derive(Debug, Clone, Copy)]
pub struct AdaptiveNotch {
    alpha: f32,
    v1: f32,
    v2: f32,
}

impl AdaptiveNotch {
    pub fn new() -> Self {
        Self {
            alpha: -ALPHA_BOUND, // 0 Hz as initial guess.
            v1: 0.0,
            v2: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.alpha = -ALPHA_BOUND;
        self.v1 = 0.0;
        self.v2 = 0.0;
    }

    /// Current notch position, `-2 cos(w)`.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Notch center as a normalized frequency in `[0, 0.5]`.
    pub fn center_normalized(&self) -> f32 {
        (-0.5 * self.alpha).clamp(-1.0, 1.0).acos() / std::f32::consts::TAU
    }

    /// `narrowness` in `[0, 1]`; closer to 1 gives a sharper notch.
    #[inline]
    pub fn process(&mut self, input: f32, narrowness: f32) -> f32 {
        let a1 = narrowness * self.alpha;
        let a2 = narrowness * narrowness;

        // Keeps the passband level similar wherever the notch sits.
        let gain = if self.alpha >= 0.0 {
            (1.0 + a1 + a2) / (2.0 + self.alpha)
        } else {
            (1.0 - a1 + a2) / (2.0 - self.alpha)
        };

        let x0 = input.clamp(-INPUT_CLIP, INPUT_CLIP);
        let v0 = x0 - a1 * self.v1 - a2 * self.v2;
        let y0 = v0 + self.alpha * self.v1 + self.v2;
        let s0 = (1.0 - narrowness) * v0 - narrowness * (1.0 - narrowness) * self.v2;
        self.alpha = (self.alpha - y0 * s0 * MU).clamp(-ALPHA_BOUND, ALPHA_BOUND);

        self.v2 = self.v1;
        self.v1 = v0;

        y0 * gain
    }
}

impl Default for AdaptiveNotch {
    fn default() -> Self {
        Self::new()
    }
}
