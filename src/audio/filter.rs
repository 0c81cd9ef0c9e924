//! Biquad filter matching WebAudio's `BiquadFilterNode` low/high-pass response.
//!
//! Coefficients from the Audio EQ Cookbook, run in Direct Form II Transposed.

use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Lowpass,
    Highpass,
}

#[derive(Debug, Clone)]
pub struct Biquad {
    pub kind: FilterKind,
    pub frequency: f64,
    pub q: f64,

    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new(kind: FilterKind, frequency: f64, q: f64, sample_rate: f64) -> Self {
        let mut f = Self {
            kind,
            frequency,
            q,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
        };
        f.update_coefficients(sample_rate);
        f
    }

    /// Recompute coefficients for the current frequency/Q
    pub fn update_coefficients(&mut self, sample_rate: f64) {
        // Keep the cutoff strictly inside (0, nyquist)
        let nyquist = sample_rate / 2.0;
        let freq = self.frequency.clamp(1.0, nyquist * 0.999);
        let q = self.q.max(1e-4);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match self.kind {
            FilterKind::Lowpass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterKind::Highpass => {
                let b0 = (1.0 + cos_w0) / 2.0;
                (b0, -(1.0 + cos_w0), b0)
            }
        };
        let a0 = 1.0 + alpha;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = (-2.0 * cos_w0) / a0;
        self.a2 = (1.0 - alpha) / a0;
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 48000.0;

    /// Steady-state peak amplitude of a filtered sine
    fn response(filter: &mut Biquad, freq: f64) -> f64 {
        filter.reset();
        let n = SR as usize / 2;
        let mut peak: f64 = 0.0;
        for i in 0..n {
            let x = (2.0 * PI * freq * i as f64 / SR).sin();
            let y = filter.process(x);
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_lowpass_passes_lows_cuts_highs() {
        let mut lp = Biquad::new(FilterKind::Lowpass, 3600.0, 0.7, SR);
        assert!(response(&mut lp, 200.0) > 0.95);
        assert!(response(&mut lp, 15000.0) < 0.1);
    }

    #[test]
    fn test_highpass_passes_highs_cuts_lows() {
        let mut hp = Biquad::new(FilterKind::Highpass, 700.0, 0.8, SR);
        assert!(response(&mut hp, 8000.0) > 0.95);
        assert!(response(&mut hp, 60.0) < 0.05);
    }

    #[test]
    fn test_dc_through_lowpass() {
        let mut lp = Biquad::new(FilterKind::Lowpass, 3600.0, 0.7, SR);
        let mut y = 0.0;
        for _ in 0..2000 {
            y = lp.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-6);
    }
}
