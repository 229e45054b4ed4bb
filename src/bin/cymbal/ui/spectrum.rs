//! Spectrum analyzer widget
//!
//! Cymbal energy sits almost entirely above 1 kHz, so bands are log-spaced
//! from 100 Hz up and each band shows the loudest FFT bin it covers. The
//! display falls back slowly so the decay of a strike stays readable.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{ops::Range, sync::Arc};

/// Number of bands to display
const SPECTRUM_BANDS: usize = 64;
const LOWEST_HZ: f32 = 100.0;
const FLOOR_DB: f64 = -100.0;
/// How far a band may fall per update, in dB.
const FALL_DB: f64 = 1.5;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// log10 of each band's center frequency
    band_log_hz: Vec<f64>,
    /// FFT bins covered by each band
    band_bins: Vec<Range<usize>>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 hz, dB) ready for the chart
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the buffers passed to
    /// [`update`](Self::update).
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(buffer_len);

        let window: Vec<f32> = (0..buffer_len)
            .map(|i| {
                if buffer_len > 1 {
                    let denom = (buffer_len - 1) as f32;
                    0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos())
                } else {
                    1.0
                }
            })
            .collect();

        let nyquist = (sample_rate / 2.0).max(LOWEST_HZ * 2.0);
        let ratio = (nyquist / LOWEST_HZ) as f64;
        let half = (buffer_len / 2).max(1);
        let bin_of = |hz: f64| ((hz * buffer_len as f64 / sample_rate as f64) as usize).min(half - 1);

        let mut band_log_hz = Vec::with_capacity(SPECTRUM_BANDS);
        let mut band_bins = Vec::with_capacity(SPECTRUM_BANDS);
        for i in 0..SPECTRUM_BANDS {
            let lo = LOWEST_HZ as f64 * ratio.powf(i as f64 / SPECTRUM_BANDS as f64);
            let hi = LOWEST_HZ as f64 * ratio.powf((i + 1) as f64 / SPECTRUM_BANDS as f64);
            let start = bin_of(lo);
            let end = bin_of(hi).max(start + 1);
            band_log_hz.push((lo * hi).sqrt().log10());
            band_bins.push(start..end);
        }

        let spectrum = band_log_hz.iter().map(|&f| (f, FLOOR_DB)).collect();

        Self {
            window,
            band_log_hz,
            band_bins,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (i, bins) in self.band_bins.iter().enumerate() {
            let power = self.scratch[bins.clone()]
                .iter()
                .map(|c| c.norm_sqr())
                .fold(1e-12f32, f32::max);
            let db = (10.0 * (power as f64).log10()).max(FLOOR_DB);

            let (freq, shown) = &mut self.spectrum[i];
            *freq = self.band_log_hz[i];
            *shown = db.max(*shown - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default()
        .title(" Spectrum ")
        .borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(spectrum);

    let lo = spectrum.first().map_or(2.0, |(f, _)| *f);
    let hi = spectrum.last().map_or(4.3, |(f, _)| *f).max(lo + 0.1);
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo, hi])
                .labels(vec!["100", "1k", "10k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
