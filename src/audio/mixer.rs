//! Native mix graph
//!
//! ```text
//! pad ─┐
//! bass ─┼─ music bus ── low-pass ──┐
//! drums ┘                          ├── master gain ── out
//! hiss ───┬─ noise bus ── high-pass┘
//! crackle ┘
//! ```
//!
//! Pull-based: the host asks for blocks of samples. Used for headless runs;
//! the browser build wires the same graph out of Web Audio nodes (`web`).

use rand::Rng;

use super::AudioOutput;
use super::filter::{Biquad, FilterKind};
use super::synth::{Bus, Layer, LayerBuffers, SynthParams};
use crate::error::AudioError;
use crate::settings::Settings;

/// One-pole approach toward a target, the discrete form of `setTargetAtTime`
#[derive(Debug, Clone)]
pub struct GainSmoother {
    value: f64,
    target: f64,
    /// Per-sample retention factor, exp(-1 / (tau * sample_rate))
    retain: f64,
}

impl GainSmoother {
    pub fn new(initial: f64, time_constant: f64, sample_rate: f64) -> Self {
        let retain = if time_constant > 0.0 {
            (-1.0 / (time_constant * sample_rate)).exp()
        } else {
            0.0
        };
        Self {
            value: initial,
            target: initial,
            retain,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    #[inline]
    pub fn next(&mut self) -> f64 {
        self.value = self.target + (self.value - self.target) * self.retain;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

/// Looping five-layer mix with proximity-driven master gain
#[derive(Debug, Clone)]
pub struct MixerGraph {
    layers: LayerBuffers,
    cursor: usize,
    music_filter: Biquad,
    noise_filter: Biquad,
    master: GainSmoother,
    running: bool,
    closed: bool,
}

impl MixerGraph {
    /// Wire a graph around already-rendered layers. Master gain starts silent.
    pub fn new(layers: LayerBuffers, settings: &Settings) -> Self {
        let sample_rate = layers.params.sample_rate as f64;
        Self {
            music_filter: Biquad::new(
                FilterKind::Lowpass,
                settings.music_lowpass_hz as f64,
                settings.music_lowpass_q as f64,
                sample_rate,
            ),
            noise_filter: Biquad::new(
                FilterKind::Highpass,
                settings.noise_highpass_hz as f64,
                settings.noise_highpass_q as f64,
                sample_rate,
            ),
            master: GainSmoother::new(0.0, settings.gain_time_constant as f64, sample_rate),
            layers,
            cursor: 0,
            running: true,
            closed: false,
        }
    }

    /// Render the soundtrack and start the graph
    pub fn start(sample_rate: u32, settings: &Settings, rng: &mut impl Rng) -> Self {
        log::info!("Starting {} mixer at {} Hz", settings.soundtrack.as_str(), sample_rate);
        let params = SynthParams {
            sample_rate,
            loop_seconds: settings.loop_seconds,
            bpm: settings.bpm,
        };
        Self::new(LayerBuffers::render(params, rng), settings)
    }

    pub fn sample_rate(&self) -> u32 {
        self.layers.params.sample_rate
    }

    pub fn layers(&self) -> &LayerBuffers {
        &self.layers
    }

    /// Current (smoothed) master gain
    pub fn gain(&self) -> f32 {
        self.master.value() as f32
    }

    /// Pause output without releasing anything; `resume` picks up where it left off
    pub fn suspend(&mut self) {
        if self.running {
            self.running = false;
            log::info!("Mixer suspended");
        }
    }

    /// Fill `out` with mono samples. Writes silence while suspended or shut down.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.running || self.layers.is_empty() {
            out.fill(0.0);
            return;
        }

        let len = self.layers.len();
        for sample in out.iter_mut() {
            let mut music = 0.0;
            let mut noise = 0.0;
            for layer in Layer::ALL {
                let s = self.layers.get(layer)[self.cursor] as f64;
                match layer.bus() {
                    Bus::Music => music += s,
                    Bus::Noise => noise += s,
                }
            }

            let mixed = self.music_filter.process(music) + self.noise_filter.process(noise);
            *sample = (mixed * self.master.next()) as f32;

            self.cursor += 1;
            if self.cursor == len {
                self.cursor = 0;
            }
        }
    }
}

impl AudioOutput for MixerGraph {
    type Resume = ();

    fn is_running(&self) -> bool {
        self.running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Rejected("mixer was shut down".into()));
        }
        if !self.running {
            self.running = true;
            log::info!("Mixer resumed");
        }
        Ok(())
    }

    fn set_target_volume(&mut self, volume: f32) {
        self.master.set_target(volume.clamp(0.0, 1.0) as f64);
    }

    fn shutdown(&mut self) {
        if !self.closed {
            self.closed = true;
            self.running = false;
            self.music_filter.reset();
            self.noise_filter.reset();
            log::info!("Mixer stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn graph() -> MixerGraph {
        let mut rng = Pcg32::seed_from_u64(4);
        MixerGraph::start(8000, &Settings::default(), &mut rng)
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_smoother_follows_time_constant() {
        let sr = 1000.0;
        let mut g = GainSmoother::new(0.0, 0.05, sr);
        g.set_target(1.0);
        // After one time constant: 1 - 1/e
        let mut v = 0.0;
        for _ in 0..50 {
            v = g.next();
        }
        assert!((v - (1.0 - (-1.0f64).exp())).abs() < 1e-9);
        assert!(v < 1.0);
    }

    #[test]
    fn test_starts_silent() {
        let mut mixer = graph();
        let mut out = vec![1.0f32; 512];
        mixer.render(&mut out);
        assert_eq!(peak(&out), 0.0);
        assert_eq!(mixer.gain(), 0.0);
    }

    #[test]
    fn test_gain_ramps_without_jump() {
        let mut mixer = graph();
        mixer.set_target_volume(1.0);
        let mut out = vec![0.0f32; 4000];
        mixer.render(&mut out);
        // 0.5 s at tau = 0.05 s: fully settled
        assert!((mixer.gain() - 1.0).abs() < 1e-3);
        assert!(peak(&out) > 0.01);

        mixer.set_target_volume(0.0);
        let mut one = [0.0f32; 1];
        mixer.render(&mut one);
        // A single sample only moves a fraction of the way
        assert!(mixer.gain() > 0.9);
    }

    #[test]
    fn test_target_is_clamped() {
        let mut mixer = graph();
        mixer.set_target_volume(3.0);
        let mut out = vec![0.0f32; 4000];
        mixer.render(&mut out);
        assert!(mixer.gain() <= 1.0);
    }

    #[test]
    fn test_loops_past_buffer_end() {
        let mut mixer = graph();
        mixer.set_target_volume(1.0);
        let len = mixer.layers().len();
        let mut out = vec![0.0f32; len + 1000];
        mixer.render(&mut out);
        assert!(peak(&out[len..]) > 0.0);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_shutdown_silences() {
        let mut mixer = graph();
        mixer.set_target_volume(1.0);
        mixer.shutdown();
        assert!(!mixer.is_running());
        let mut out = vec![1.0f32; 256];
        mixer.render(&mut out);
        assert_eq!(peak(&out), 0.0);
    }

    #[test]
    fn test_suspend_then_resume_continues() {
        let mut mixer = graph();
        mixer.set_target_volume(1.0);
        let mut out = vec![0.0f32; 512];
        mixer.render(&mut out);
        let cursor = mixer.cursor;

        mixer.suspend();
        assert!(!mixer.is_running());
        mixer.render(&mut out);
        assert_eq!(peak(&out), 0.0);
        assert_eq!(mixer.cursor, cursor);

        assert!(mixer.resume().is_ok());
        assert!(mixer.is_running());
        mixer.render(&mut out);
        assert!(mixer.cursor != cursor);
    }

    #[test]
    fn test_resume_after_shutdown_is_rejected() {
        let mut mixer = graph();
        mixer.shutdown();
        assert!(matches!(mixer.resume(), Err(AudioError::Rejected(_))));
        assert!(!mixer.is_running());
    }
}
