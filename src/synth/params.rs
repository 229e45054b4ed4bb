//! User-facing cymbal parameters.
//!
//! Everything here is in musical units (seconds, Hz, linear gain). The voice
//! converts them into per-sample coefficients in `CymbalVoice::setup` and
//! `CymbalVoice::set_params`, which is also where they get validated.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::Normalization;
use crate::MAX_DELAY_SECONDS;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("`{name}` must be finite")]
    NonFinite { name: &'static str },

    #[error("`{name}` must be greater than zero, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("`{name}` = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("feedback gain {0} must lie strictly inside (-1, 1)")]
    UnstableFeedback(f32),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CymbalParams {
    /// Linear output level.
    pub output_gain: f32,

    // Excitation
    /// Average stick clicks per second.
    pub click_rate_hz: f32,
    /// 0 gives every click the same level, 1 fully random levels.
    pub click_random_gain: f32,
    pub click_decay_seconds: f32,
    pub click_highpass_hz: f32,
    pub attack_seconds: f32,
    pub excitation_release_seconds: f32,
    pub excitation_normalization: Normalization,

    // Allpass body
    /// Lowest stage frequency. Stage delay is `1 / (base * (1 + spread * u))`.
    pub stage_base_hz: f32,
    pub stage_spread: f32,
    pub feedback_gain: f32,
    pub high_shelf_hz: f32,
    pub high_shelf_gain: f32,
    pub low_shelf_hz: f32,
    pub low_shelf_gain: f32,
    /// Samples of delay removed per unit of loop signal.
    pub time_mod_amount: f32,
    pub notch_count: usize,
    pub notch_mix: f32,
    pub notch_narrowness: f32,
    /// Crossfade from the last stage output toward the summed body tap.
    pub body_mix: f32,
    /// How much of the body tap uses alternating stage signs.
    pub body_alt_sign_mix: f32,

    // Pitch sweep
    /// Extra pitch ratio at the strike, decays back to 1.
    pub pitch_sweep: f32,
    pub pitch_sweep_seconds: f32,

    // Output envelope
    pub decay_seconds: f32,
    pub sustain_level: f32,
    pub release_seconds: f32,
    /// Fade applied to the previous note when a voice is retriggered.
    pub transition_seconds: f32,
}

impl Default for CymbalParams {
    fn default() -> Self {
        Self {
            output_gain: 2.0,

            click_rate_hz: 4000.0,
            click_random_gain: 0.5,
            click_decay_seconds: 0.002,
            click_highpass_hz: 800.0,
            attack_seconds: 0.002,
            excitation_release_seconds: 0.08,
            excitation_normalization: Normalization::Peak,

            stage_base_hz: 1200.0,
            stage_spread: 3.0,
            feedback_gain: 0.95,
            high_shelf_hz: 9000.0,
            high_shelf_gain: 0.8,
            low_shelf_hz: 300.0,
            low_shelf_gain: 0.6,
            time_mod_amount: 4.0,
            notch_count: 4,
            notch_mix: 0.5,
            notch_narrowness: 0.995,
            body_mix: 0.3,
            body_alt_sign_mix: 0.5,

            pitch_sweep: 0.3,
            pitch_sweep_seconds: 0.04,

            decay_seconds: 1.5,
            sustain_level: 0.0,
            release_seconds: 0.15,
            transition_seconds: 0.005,
        }
    }
}

impl CymbalParams {
    /// Lowest `stage_base_hz` whose delay still fits the allocated lines.
    pub const MIN_STAGE_HZ: f32 = 1.0 / MAX_DELAY_SECONDS;

    /// Filter cutoffs only need to be finite and non-negative. Anything past
    /// Nyquist is pinned just below it when the coefficients are computed.
    pub fn validate(&self, sample_rate: f32) -> Result<(), ParamError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ParamError::InvalidSampleRate(sample_rate));
        }

        for (name, value) in [
            ("click_rate_hz", self.click_rate_hz),
            ("click_decay_seconds", self.click_decay_seconds),
            ("attack_seconds", self.attack_seconds),
            ("excitation_release_seconds", self.excitation_release_seconds),
            ("stage_base_hz", self.stage_base_hz),
            ("pitch_sweep_seconds", self.pitch_sweep_seconds),
            ("decay_seconds", self.decay_seconds),
            ("release_seconds", self.release_seconds),
            ("transition_seconds", self.transition_seconds),
        ] {
            positive(name, value)?;
        }

        for (name, value, min, max) in [
            ("output_gain", self.output_gain, 0.0, 4.0),
            ("click_random_gain", self.click_random_gain, 0.0, 1.0),
            ("click_highpass_hz", self.click_highpass_hz, 0.0, f32::INFINITY),
            ("stage_spread", self.stage_spread, 0.0, 16.0),
            ("high_shelf_hz", self.high_shelf_hz, 0.0, f32::INFINITY),
            ("high_shelf_gain", self.high_shelf_gain, 0.0, 1.0),
            ("low_shelf_hz", self.low_shelf_hz, 0.0, f32::INFINITY),
            ("low_shelf_gain", self.low_shelf_gain, 0.0, 1.0),
            ("time_mod_amount", self.time_mod_amount, 0.0, 64.0),
            ("notch_mix", self.notch_mix, 0.0, 1.0),
            ("notch_narrowness", self.notch_narrowness, 0.0, 1.0),
            ("body_mix", self.body_mix, 0.0, 1.0),
            ("body_alt_sign_mix", self.body_alt_sign_mix, 0.0, 1.0),
            ("pitch_sweep", self.pitch_sweep, 0.0, 4.0),
            ("sustain_level", self.sustain_level, 0.0, 1.0),
        ] {
            in_range(name, value, min, max)?;
        }

        if self.stage_base_hz < Self::MIN_STAGE_HZ {
            return Err(ParamError::OutOfRange {
                name: "stage_base_hz",
                value: self.stage_base_hz,
                min: Self::MIN_STAGE_HZ,
                max: f32::INFINITY,
            });
        }

        if !self.feedback_gain.is_finite() {
            return Err(ParamError::NonFinite {
                name: "feedback_gain",
            });
        }
        if self.feedback_gain.abs() >= 1.0 {
            return Err(ParamError::UnstableFeedback(self.feedback_gain));
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NonFinite { name });
    }
    if value <= 0.0 {
        return Err(ParamError::NonPositive { name, value });
    }
    Ok(())
}

fn in_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NonFinite { name });
    }
    if value < min || value > max {
        return Err(ParamError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
