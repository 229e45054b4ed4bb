//! Audio device setup and the realtime callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use cymbal_dsp::{
    synth::{CymbalParams, CymbalVoice, VoiceMessage},
    MAX_BLOCK_SIZE,
};

use super::ui::{UiApp, VoiceStatus};

/// Pending control messages the UI may queue before the callback drains them.
const CONTROL_CAPACITY: usize = 64;
/// Status snapshots in flight, one per callback.
const STATUS_CAPACITY: usize = 64;

pub struct CymbalApp {
    params: CymbalParams,
    seed: u64,
}

impl CymbalApp {
    pub fn new(params: CymbalParams) -> Self {
        Self { params, seed: 0 }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Open the default output device, start the stream and hand the
    /// terminal to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut voice = CymbalVoice::new(self.seed);
        voice
            .setup(sample_rate, &self.params)
            .wrap_err("invalid cymbal parameters")?;

        tracing::info!(sample_rate, channels, seed = self.seed, "audio device opened");

        let (control_tx, mut control_rx) = RingBuffer::<VoiceMessage>::new(CONTROL_CAPACITY);
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(sample_rate as usize);
        let (mut status_tx, status_rx) = RingBuffer::<VoiceStatus>::new(STATUS_CAPACITY);

        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
        let mut status = VoiceStatus::default();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                status.rejected += voice.process_messages(&mut control_rx) as u32;

                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    voice.render(block);

                    // Mono to every channel
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let frame = &mut data[out_off + i * channels..][..channels];
                        frame.fill(s);
                        // Visualizer drops samples when it falls behind.
                        let _ = audio_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }

                status.active = voice.is_active();
                status.frames += total_frames as u64;
                let _ = status_tx.push(status);
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        stream.play().wrap_err("failed to start audio stream")?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(control_tx, audio_rx, status_rx, self.params, sample_rate)
            .run(&mut terminal);
        ratatui::restore();

        tracing::info!("ui closed");
        result
    }
}
