use std::f32::consts::{FRAC_1_SQRT_2, PI};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Filters Inside the Loop
=======================

Two small filter families live here. Both are cheap enough to run once per
allpass stage per sample.

| type          | built from                    | shapes                        |
| ------------- | ----------------------------- | ----------------------------- |
| high-shelf    | EMA lowpass, lerp toward dry  | scales everything above cut   |
| low-shelf     | EMA highpass, lerp toward dry | scales everything below cut   |
| SVF lowpass   | trapezoidal 2-pole            | passes below cutoff           |
| SVF highpass  | trapezoidal 2-pole            | passes above cutoff           |
| SVF bandpass  | trapezoidal 2-pole            | passes around cutoff          |
| SVF notch     | trapezoidal 2-pole            | rejects at cutoff             |

Shelves
-------

The shelf is a one-pole exponential moving average plus a crossfade:

    ema   += kp * (x - ema)
    high   = lerp(ema,     x, gain)     (gain applies above the cut)
    low    = lerp(x - ema, x, gain)     (gain applies below the cut)

`kp` is the EMA coefficient, not a frequency. Use `ema_coefficient` to turn a
normalized cutoff into one.

Normalized cutoff
-----------------

Every cutoff here is `hz / sample_rate`. Values are clamped into
[0.00001, 0.49998] so `tan` never sees 0 or pi/2.
*/

const MIN_CUTOFF: f32 = 0.00001;
const NYQUIST: f32 = 0.49998;

#[inline]
fn clamp_cutoff(cutoff_normalized: f32) -> f32 {
    cutoff_normalized.clamp(MIN_CUTOFF, NYQUIST)
}

/// EMA coefficient whose -3 dB point sits at `cutoff_normalized`.
pub fn ema_coefficient(cutoff_normalized: f32) -> f32 {
    let cutoff = clamp_cutoff(cutoff_normalized) as f64;
    let y = 1.0 - (std::f64::consts::TAU * cutoff).cos();
    (-y + (y * (y + 2.0)).sqrt()) as f32
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfResponse {
    High,
    Low,
}

/// One-pole shelving filter.
#[derive(Debug, Clone, Copy)]
pub struct EmaShelf {
    value: f32,
    response: ShelfResponse,
}

impl EmaShelf {
    pub fn new(response: ShelfResponse) -> Self {
        Self {
            value: 0.0,
            response,
        }
    }

    pub fn high() -> Self {
        Self::new(ShelfResponse::High)
    }

    pub fn low() -> Self {
        Self::new(ShelfResponse::Low)
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f32, kp: f32, shelving_gain: f32) -> f32 {
        self.value += kp * (input - self.value);
        let filtered = match self.response {
            ShelfResponse::High => self.value,
            ShelfResponse::Low => input - self.value,
        };
        filtered + shelving_gain * (input - filtered)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvfResponse {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

/// Trapezoidal state-variable filter.
#[derive(Debug, Clone, Copy)]
pub struct Svf {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    /// Damping, `1 / Q`.
    pub k: f32,
    response: SvfResponse,
}

impl Svf {
    pub fn new(response: SvfResponse) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            k: FRAC_1_SQRT_2,
            response,
        }
    }

    pub fn lowpass() -> Self {
        Self::new(SvfResponse::LowPass)
    }

    pub fn highpass() -> Self {
        Self::new(SvfResponse::HighPass)
    }

    pub fn bandpass() -> Self {
        Self::new(SvfResponse::BandPass)
    }

    pub fn notch() -> Self {
        Self::new(SvfResponse::Notch)
    }

    #[inline]
    fn compute_g(cutoff_normalized: f32) -> f32 {
        (PI * clamp_cutoff(cutoff_normalized)).tan()
    }

    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass: sample - k * v1 - v2,
            notch: sample - k * v1,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32, cutoff_normalized: f32) -> f32 {
        let g = Self::compute_g(cutoff_normalized);
        let outputs = self.next_sample(input, self.k, g);
        match self.response {
            SvfResponse::LowPass => outputs.lowpass,
            SvfResponse::HighPass => outputs.highpass,
            SvfResponse::BandPass => outputs.bandpass,
            SvfResponse::Notch => outputs.notch,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], cutoff_normalized: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, cutoff_normalized);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
