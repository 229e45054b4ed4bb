//! Fractional delay line.
//!
//! The allpass loops read their delay at a time that moves every sample, so
//! a plain integer tap would zipper. Reads go through a 3rd order Lagrange
//! interpolator over four consecutive samples instead.
//!
//! ```text
//!            write ──→ [ ... | y3 | y2 | y1 | y0 | ... ] ──→ read
//!                               ←── d + 3 ... d ──
//! ```
//!
//! `process` writes first and reads second, and the read window is clamped
//! so it can never reach the slot that was just written.

/// Newton form of the 3rd order Lagrange interpolator through `y0..y3`.
///
/// `t` is the fractional position in `[0, 1)`. `t = 0` returns `y1` exactly.
#[inline]
pub fn lagrange3(y0: f32, y1: f32, y2: f32, y3: f32, t: f32) -> f32 {
    let u = 1.0 + t;
    let d0 = y0 - y1;
    let d1 = d0 - (y1 - y2);
    let d2 = d1 - ((y1 - y2) - (y2 - y3));
    y0 - u * (d0 + (1.0 - u) / 2.0 * (d1 + (2.0 - u) / 3.0 * d2))
}

/// Circular buffer with 4 guard samples past the longest supported delay.
#[derive(Debug, Clone)]
pub struct FractionalDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl FractionalDelay {
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; 4],
            write_pos: 0,
        }
    }

    /// Allocate room for `max_time_samples`. Not realtime-safe.
    pub fn setup(&mut self, max_time_samples: f32) {
        let size = (max_time_samples.max(0.0) as usize + 4).max(4);
        self.buffer.resize(size, 0.0);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
    }

    /// Scale everything still in flight. Used to dump energy out of a loop.
    pub fn apply_gain(&mut self, gain: f32) {
        for sample in self.buffer.iter_mut() {
            *sample *= gain;
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn process(&mut self, input: f32, time_in_samples: f32) -> f32 {
        let size = self.buffer.len();
        let upper = (size as f32 - 4.0).max(1.0);
        let clamped = (time_in_samples - 1.0).max(1.0).min(upper);
        let time_int = clamped as usize;
        let fraction = clamped - time_int as f32;

        self.write_pos += 1;
        if self.write_pos >= size {
            self.write_pos = 0;
        }
        self.buffer[self.write_pos] = input;

        let base = self.write_pos + size - time_int;
        let tap = |offset: usize| self.buffer[(base - offset) % size];
        lagrange3(tap(0), tap(1), tap(2), tap(3), fraction)
    }

    /// Run a whole block through the line at a fixed delay time.
    pub fn render(&mut self, buffer: &mut [f32], time_in_samples: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, time_in_samples);
        }
    }
}

impl Default for FractionalDelay {
    fn default() -> Self {
        Self::new()
    }
}
