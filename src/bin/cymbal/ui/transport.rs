//! Status bar widget - voice state, key parameters and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use cymbal_dsp::synth::CymbalParams;

use super::{Focus, VoiceStatus};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Everything the status bar shows, gathered by the UI loop.
pub struct TransportView<'a> {
    pub sample_rate: f32,
    pub status: &'a VoiceStatus,
    pub stats: &'a AudioStats,
    pub params: &'a CymbalParams,
    pub focus: Focus,
    pub velocity: f32,
}

pub fn render_transport(frame: &mut Frame, area: Rect, view: &TransportView) {
    let block = Block::default()
        .title(" cymbal ")
        .borders(Borders::ALL);

    let (symbol, state, color) = if view.status.active {
        ("●", "Ringing", Color::Green)
    } else {
        ("○", "Idle", Color::DarkGray)
    };
    let seconds = view.status.frames as f32 / view.sample_rate;

    let line = Line::from(vec![
        Span::styled(format!(" {} {:<8}", symbol, state), Style::default().fg(color)),
        Span::styled(
            format!("vel {:.1}  ", view.velocity),
            Style::default().fg(Color::Cyan),
        ),
        param_span("fb", view.params.feedback_gain, view.focus == Focus::Feedback),
        param_span("mod", view.params.time_mod_amount, view.focus == Focus::TimeMod),
        param_span("decay", view.params.decay_seconds, view.focus == Focus::Decay),
        param_span("notch", view.params.notch_mix, view.focus == Focus::NotchMix),
        Span::styled(
            format!("{:.1}kHz {:.0}s  ", view.sample_rate / 1000.0, seconds),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.3}", view.stats.peak, view.stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        if view.status.rejected > 0 {
            Span::styled(
                format!("  rejected: {}", view.status.rejected),
                Style::default().fg(Color::Red),
            )
        } else {
            Span::raw("")
        },
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn param_span(name: &str, value: f32, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Span::styled(format!("{} {:.3}  ", name, value), style)
}
