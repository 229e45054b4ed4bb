//! A single cymbal voice.
//!
//! ```text
//!  VoiceRng ─→ HalfClosedNoise ─→ × ExpAdEnvelope ─→ SerialAllpass ─┬─ tail ─┐
//!                                                      ▲            └─ sum ──┤ body_mix
//!                                   1 + ExpDecay ──────┘ pitch               ▼
//!                                                             × ExpDsrEnvelope
//!                                                                            │
//!                                          TransitionReleaseSmoother ──→ (+) ─→ out
//! ```
//!
//! The stage delay times are drawn from the voice's own RNG on every strike,
//! so each hit has a slightly different inharmonic spread. Everything else is
//! deterministic given the seed.

use crate::dsp::allpass::{AllpassParams, SerialAllpass};
use crate::dsp::clip::safety_clip;
use crate::dsp::envelope::{ExpAdEnvelope, ExpDecay, ExpDsrEnvelope, TransitionReleaseSmoother};
use crate::dsp::filter::ema_coefficient;
use crate::dsp::noise::{ExcitationRng, HalfClosedNoise, VoiceRng};
use crate::synth::message::{MessageReceiver, VoiceMessage};
use crate::synth::params::{CymbalParams, ParamError};
use crate::MAX_DELAY_SECONDS;

/// Allpass stages per voice.
pub const STAGES: usize = 8;
/// Adaptive notches available after the allpass chain.
pub const NOTCHES: usize = 4;

/// Output envelope level treated as silence.
const SILENCE: f32 = 1e-4;
/// Corner of the one-pole glide applied to excitation gain changes.
const GAIN_SMOOTHING_HZ: f32 = 20.0;

pub struct CymbalVoice {
    seed: u64,
    sample_rate: f32,
    params: CymbalParams,
    rng: VoiceRng,

    noise: HalfClosedNoise,
    excitation: ExpAdEnvelope,
    network: SerialAllpass<STAGES, NOTCHES>,
    allpass: AllpassParams,
    pitch: ExpDecay,
    envelope: ExpDsrEnvelope,
    transition: TransitionReleaseSmoother,

    // Per-sample values derived from `params`.
    click_density: f32,
    click_highpass: f32,
    transition_samples: f32,

    last_voice: f32,
    active: bool,
}

impl CymbalVoice {
    /// Create an idle voice. Call [`setup`](Self::setup) before processing.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sample_rate: 0.0,
            params: CymbalParams::default(),
            rng: VoiceRng::new(seed),
            noise: HalfClosedNoise::new(),
            excitation: ExpAdEnvelope::new(),
            network: SerialAllpass::new(),
            allpass: AllpassParams::default(),
            pitch: ExpDecay::new(),
            envelope: ExpDsrEnvelope::new(),
            transition: TransitionReleaseSmoother::new(),
            click_density: 0.0,
            click_highpass: 0.0,
            transition_samples: 1.0,
            last_voice: 0.0,
            active: false,
        }
    }

    /// Allocate the delay lines and apply `params`. Not realtime-safe.
    pub fn setup(&mut self, sample_rate: f32, params: &CymbalParams) -> Result<(), ParamError> {
        params.validate(sample_rate)?;

        self.sample_rate = sample_rate;
        self.network.setup(MAX_DELAY_SECONDS * sample_rate);
        self.excitation
            .setup(ema_coefficient(GAIN_SMOOTHING_HZ / sample_rate));
        self.apply(params);
        self.reset();

        tracing::debug!(
            sample_rate,
            seed = self.seed,
            stages = STAGES,
            notches = NOTCHES,
            "cymbal voice ready"
        );
        Ok(())
    }

    /// Swap parameters without reallocating. A note in flight keeps ringing
    /// with the new settings. Rejected params leave the voice untouched.
    ///
    /// Runs on the audio thread, so errors are returned, never logged.
    pub fn set_params(&mut self, params: &CymbalParams) -> Result<(), ParamError> {
        params.validate(self.sample_rate)?;
        self.apply(params);
        if self.active {
            self.excitation.update(
                self.sample_rate,
                params.attack_seconds,
                params.excitation_release_seconds,
                1.0,
                params.excitation_normalization,
            );
        }
        Ok(())
    }

    pub fn params(&self) -> &CymbalParams {
        &self.params
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn apply(&mut self, params: &CymbalParams) {
        let fs = self.sample_rate;
        self.params = *params;

        self.click_density = 2.0 * params.click_rate_hz / fs;
        self.click_highpass = params.click_highpass_hz / fs;
        self.noise.set_decay(params.click_decay_seconds * fs);
        self.excitation
            .set_normalization(params.excitation_normalization);

        self.allpass = AllpassParams {
            high_shelf_cut: ema_coefficient(params.high_shelf_hz / fs),
            high_shelf_gain: params.high_shelf_gain,
            low_shelf_cut: ema_coefficient(params.low_shelf_hz / fs),
            low_shelf_gain: params.low_shelf_gain,
            feedback_gain: params.feedback_gain,
            pitch_ratio: self.allpass.pitch_ratio,
            time_mod_amount: params.time_mod_amount,
            notch_count: params.notch_count,
            notch_mix: params.notch_mix,
            notch_narrowness: params.notch_narrowness,
        };

        self.pitch.set_time(params.pitch_sweep_seconds * fs, false);
        self.envelope
            .set_time(params.decay_seconds * fs, params.release_seconds * fs);
        self.transition_samples = params.transition_seconds * fs;
        self.transition.setup(self.transition_samples);
    }

    /// Back to the freshly set up state, including the random stream.
    pub fn reset(&mut self) {
        self.rng.reseed(self.seed);
        self.noise.reset();
        self.excitation.reset();
        self.network.reset();
        self.pitch.reset();
        self.envelope.reset();
        self.transition.reset();
        self.allpass.pitch_ratio = 1.0;
        self.last_voice = 0.0;
        self.active = false;
    }

    /// Strike with `velocity` in `[0, 1]`.
    ///
    /// A voice that is still ringing hands its last output to the transition
    /// smoother and restarts from silence, so the retrigger does not click.
    pub fn note_on(&mut self, velocity: f32) {
        if self.active {
            self.transition
                .prepare(self.last_voice, self.transition_samples);
        }
        self.network.reset();
        self.noise.reset();

        let fs = self.sample_rate;
        let base = self.params.stage_base_hz;
        let spread = self.params.stage_spread;
        for time in self.network.time_in_samples.iter_mut() {
            *time = fs / (base * (1.0 + spread * self.rng.uniform()));
        }

        self.excitation.trigger(
            fs,
            self.params.attack_seconds,
            self.params.excitation_release_seconds,
            1.0,
            velocity.clamp(0.0, 1.0),
        );
        self.pitch.trigger(self.params.pitch_sweep);
        self.envelope.trigger(self.params.sustain_level);
        self.active = true;
    }

    pub fn note_off(&mut self) {
        if self.active {
            self.envelope.release();
        }
    }

    /// True from `note_on` until the output envelope and excitation have both
    /// faded out.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Apply one control message. Only `SetParams` can fail.
    pub fn handle_message(&mut self, message: VoiceMessage) -> Result<(), ParamError> {
        match message {
            VoiceMessage::NoteOn { velocity } => self.note_on(velocity),
            VoiceMessage::NoteOff => self.note_off(),
            VoiceMessage::SetParams(params) => self.set_params(&params)?,
            VoiceMessage::Panic => self.reset(),
        }
        Ok(())
    }

    /// Drain every pending message. Returns how many were rejected.
    pub fn process_messages<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) -> usize {
        let mut rejected = 0;
        while let Some(message) = rx.pop() {
            if self.handle_message(message).is_err() {
                rejected += 1;
            }
        }
        rejected
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        let transition = self.transition.process();
        if !self.active {
            return transition;
        }

        let click = self.noise.process(
            self.click_density,
            self.params.click_random_gain,
            self.click_highpass,
            &mut self.rng,
        );
        let excitation = click * self.excitation.process();

        self.allpass.pitch_ratio = 1.0 + self.pitch.process();
        let tail = self.network.process(excitation, &self.allpass);
        let body = self.network.sum(self.params.body_alt_sign_mix);
        let shaped = tail + self.params.body_mix * (body - tail);

        let level = self.envelope.process();
        self.last_voice = safety_clip(self.params.output_gain * level * shaped);

        if level <= SILENCE && self.excitation.is_terminated() {
            self.active = false;
        }

        safety_clip(self.last_voice + transition)
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn voice(seed: u64, params: &CymbalParams) -> CymbalVoice {
        let mut voice = CymbalVoice::new(seed);
        voice.setup(SAMPLE_RATE, params).unwrap();
        voice
    }

    fn strike(voice: &mut CymbalVoice, length: usize) -> Vec<f32> {
        voice.note_on(1.0);
        let mut out = vec![0.0; length];
        voice.render(&mut out);
        out
    }

    #[test]
    fn setup_rejects_invalid_params() {
        let mut voice = CymbalVoice::new(1);
        let params = CymbalParams {
            feedback_gain: 1.0,
            ..CymbalParams::default()
        };
        assert_eq!(
            voice.setup(SAMPLE_RATE, &params),
            Err(ParamError::UnstableFeedback(1.0))
        );
        assert_eq!(
            voice.setup(-1.0, &CymbalParams::default()),
            Err(ParamError::InvalidSampleRate(-1.0))
        );
    }

    #[test]
    fn idle_voice_is_silent() {
        let mut voice = voice(1, &CymbalParams::default());
        let mut out = [1.0; 256];
        voice.render(&mut out);
        assert!(out.iter().all(|&y| y == 0.0));
        assert!(!voice.is_active());
    }

    #[test]
    fn strike_rings_and_stays_bounded() {
        let mut voice = voice(7, &CymbalParams::default());
        let out = strike(&mut voice, 8_000);
        assert!(voice.is_active());
        assert!(out.iter().all(|y| y.is_finite() && y.abs() < 4.0));

        let energy: f32 = out.iter().map(|y| y * y).sum();
        assert!(energy > 1e-3, "energy {}", energy);
    }

    #[test]
    fn same_seed_renders_identically() {
        let params = CymbalParams::default();
        let a = strike(&mut voice(99, &params), 4_000);
        let b = strike(&mut voice(99, &params), 4_000);
        assert_eq!(a, b);

        let c = strike(&mut voice(100, &params), 4_000);
        assert_ne!(a, c);
    }

    #[test]
    fn reset_replays_the_first_strike() {
        let mut voice = voice(3, &CymbalParams::default());
        let first = strike(&mut voice, 2_000);
        voice.reset();
        voice.reset();
        let again = strike(&mut voice, 2_000);
        assert_eq!(first, again);
    }

    #[test]
    fn one_shot_decays_to_inactive() {
        let params = CymbalParams {
            decay_seconds: 0.2,
            ..CymbalParams::default()
        };
        let mut voice = voice(5, &params);
        strike(&mut voice, SAMPLE_RATE as usize);
        assert!(!voice.is_active());

        let mut tail = [1.0; 64];
        voice.render(&mut tail);
        assert!(tail.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn sustain_holds_until_note_off() {
        let params = CymbalParams {
            decay_seconds: 0.1,
            sustain_level: 0.5,
            release_seconds: 0.05,
            ..CymbalParams::default()
        };
        let mut voice = voice(11, &params);
        strike(&mut voice, SAMPLE_RATE as usize);
        assert!(voice.is_active());

        voice.note_off();
        let mut out = vec![0.0; (0.1 * SAMPLE_RATE) as usize];
        voice.render(&mut out);
        assert!(!voice.is_active());
    }

    #[test]
    fn retrigger_fades_the_previous_note() {
        let mut voice = voice(13, &CymbalParams::default());
        let out = strike(&mut voice, 2_000);
        let last = out[out.len() - 1];

        assert!(last.abs() > 1e-6);

        // A silent restrike leaves only the faded tail of the previous note.
        voice.note_on(0.0);
        let first = voice.process();
        assert!(first.abs() <= last.abs());
        assert!(
            (first - last).abs() <= 0.1 * last.abs(),
            "jump from {} to {}",
            last,
            first
        );

        let mut tail = vec![0.0; (0.05 * SAMPLE_RATE) as usize];
        voice.render(&mut tail);
        assert!(tail[tail.len() - 1].abs() < 1e-3 * last.abs());
    }

    #[test]
    fn retrigger_adds_the_fading_tail_to_the_new_strike() {
        let mut voice = voice(13, &CymbalParams::default());
        let out = strike(&mut voice, 2_000);
        let last = out[out.len() - 1];

        voice.note_on(1.0);
        let mut smoother = voice.transition;
        let fading = smoother.process();
        let first = voice.process();

        assert!((fading - last).abs() <= 0.1 * last.abs());
        assert_eq!(first, voice.last_voice + fading);
    }

    #[test]
    fn defaults_work_at_low_sample_rates() {
        for sample_rate in [8_000.0, 16_000.0] {
            let mut voice = CymbalVoice::new(29);
            assert_eq!(voice.setup(sample_rate, &CymbalParams::default()), Ok(()));

            voice.note_on(1.0);
            let mut out = vec![0.0; sample_rate as usize / 4];
            voice.render(&mut out);
            assert!(out.iter().all(|y| y.is_finite()));
            assert!(out.iter().any(|&y| y != 0.0));
        }
    }

    #[test]
    fn rejected_params_leave_voice_unchanged() {
        let mut voice = voice(17, &CymbalParams::default());
        let bad = CymbalParams {
            decay_seconds: -1.0,
            ..CymbalParams::default()
        };
        assert!(voice.handle_message(VoiceMessage::SetParams(bad)).is_err());
        assert_eq!(voice.params(), &CymbalParams::default());

        let good = CymbalParams {
            feedback_gain: 0.5,
            ..CymbalParams::default()
        };
        assert!(voice.handle_message(VoiceMessage::SetParams(good)).is_ok());
        assert_eq!(voice.params().feedback_gain, 0.5);
    }

    #[test]
    fn panic_message_silences_immediately() {
        let mut voice = voice(19, &CymbalParams::default());
        strike(&mut voice, 500);
        voice.handle_message(VoiceMessage::Panic).unwrap();
        assert!(!voice.is_active());
        assert_eq!(voice.process(), 0.0);
    }

    #[cfg(feature = "rtrb")]
    #[test]
    fn drains_messages_from_ring_buffer() {
        let mut voice = voice(23, &CymbalParams::default());
        let (mut tx, mut rx) = rtrb::RingBuffer::new(8);
        tx.push(VoiceMessage::NoteOn { velocity: 0.8 }).unwrap();
        tx.push(VoiceMessage::SetParams(CymbalParams {
            stage_base_hz: 0.0,
            ..CymbalParams::default()
        }))
        .unwrap();
        tx.push(VoiceMessage::NoteOff).unwrap();

        assert_eq!(voice.process_messages(&mut rx), 1);
        assert!(voice.is_active());
    }
}
