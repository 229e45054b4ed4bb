//! TUI module for cymbal
//!
//! Shows the output waveform and spectrum, and turns key presses into
//! voice messages for the audio thread.

pub mod state;
mod spectrum;
mod transport;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

use cymbal_dsp::synth::{CymbalParams, VoiceMessage};

pub use state::{Focus, VoiceStatus};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats, TransportView};
use waveform::render_waveform;

/// Audio visualization buffer size, also the FFT size
const VIS_BUFFER_SIZE: usize = 2048;

pub struct UiApp {
    control_tx: Producer<VoiceMessage>,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<VoiceStatus>,
    status: VoiceStatus,
    params: CymbalParams,
    sample_rate: f32,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    focus: Focus,
    velocity: f32,
    notice: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<VoiceMessage>,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<VoiceStatus>,
        params: CymbalParams,
        sample_rate: f32,
    ) -> Self {
        Self {
            control_tx,
            audio_rx,
            status_rx,
            status: VoiceStatus::default(),
            params,
            sample_rate,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            focus: Focus::default(),
            velocity: 0.8,
            notice: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the newest `VIS_BUFFER_SIZE` samples.
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
        }
        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
        self.spectrum.update(&self.audio_buffer);
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            if status.rejected > self.status.rejected {
                tracing::warn!(
                    total = status.rejected,
                    "audio thread rejected cymbal params"
                );
            }
            self.status = status;
        }
    }

    fn send(&mut self, message: VoiceMessage) {
        if self.control_tx.push(message).is_err() {
            self.notice = Some("control queue full, message dropped".into());
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        self.notice = None;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.send(VoiceMessage::NoteOn {
                velocity: self.velocity,
            }),
            KeyCode::Char('x') | KeyCode::Enter => self.send(VoiceMessage::NoteOff),
            KeyCode::Char('r') => self.send(VoiceMessage::Panic),
            KeyCode::Char(c @ '1'..='9') => {
                self.velocity = (c as u8 - b'0') as f32 / 9.0;
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Up | KeyCode::Right => self.nudge(1.0),
            KeyCode::Down | KeyCode::Left => self.nudge(-1.0),
            _ => {}
        }
    }

    /// Step the focused parameter and push the whole set to the voice.
    fn nudge(&mut self, direction: f32) {
        let mut next = self.params;
        match self.focus {
            Focus::Feedback => {
                next.feedback_gain = (next.feedback_gain + 0.005 * direction).clamp(-0.999, 0.999)
            }
            Focus::TimeMod => {
                next.time_mod_amount = (next.time_mod_amount + 0.5 * direction).clamp(0.0, 64.0)
            }
            Focus::Decay => {
                next.decay_seconds = (next.decay_seconds * 1.1f32.powf(direction)).clamp(0.05, 20.0)
            }
            Focus::NotchMix => {
                next.notch_mix = (next.notch_mix + 0.05 * direction).clamp(0.0, 1.0)
            }
        }

        match next.validate(self.sample_rate) {
            Ok(()) => {
                self.params = next;
                self.send(VoiceMessage::SetParams(next));
            }
            Err(err) => self.notice = Some(err.to_string()),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Min(8),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(
            frame,
            chunks[0],
            &TransportView {
                sample_rate: self.sample_rate,
                status: &self.status,
                stats: &stats,
                params: &self.params,
                focus: self.focus,
                velocity: self.velocity,
            },
        );

        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = match &self.notice {
            Some(notice) => Paragraph::new(format!(" {}", notice))
                .style(Style::default().fg(Color::Red)),
            None => Paragraph::new(format!(
                " [Space] Strike  [X] Release  [1-9] Velocity  [Tab] {}  [↑↓] Adjust  [R] Panic  [Q] Quit",
                self.focus.label()
            ))
            .style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[3]);
    }
}
