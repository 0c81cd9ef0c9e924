//! Session settings
//!
//! Read once at startup, never written back. On the web they come from the
//! canvas element's `data-settings` JSON attribute.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Soundtrack flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SoundtrackPreset {
    /// Pad, bass, drums, hiss and crackle over a four-chord loop
    #[default]
    Lofi,
}

impl SoundtrackPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundtrackPreset::Lofi => "Lofi",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lofi" | "lo-fi" => Some(SoundtrackPreset::Lofi),
            _ => None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Layout ===
    /// Cell edge length in CSS pixels
    pub cell_size: f32,

    // === Proximity ===
    /// Manhattan distance (cells) at which volume reaches zero
    pub volume_radius: f32,
    /// Master gain smoothing time constant (seconds)
    pub gain_time_constant: f32,

    // === Soundtrack ===
    pub soundtrack: SoundtrackPreset,
    /// Loop length of every layer buffer (seconds)
    pub loop_seconds: f64,
    pub bpm: f64,

    // === Mix ===
    pub music_lowpass_hz: f32,
    pub music_lowpass_q: f32,
    pub noise_highpass_hz: f32,
    pub noise_highpass_q: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,

            volume_radius: VOLUME_RADIUS,
            gain_time_constant: GAIN_TIME_CONSTANT,

            soundtrack: SoundtrackPreset::Lofi,
            loop_seconds: LOOP_SECONDS,
            bpm: BPM,

            music_lowpass_hz: MUSIC_LOWPASS_HZ,
            music_lowpass_q: MUSIC_LOWPASS_Q,
            noise_highpass_hz: NOISE_HIGHPASS_HZ,
            noise_highpass_q: NOISE_HIGHPASS_Q,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Replace values that would break the simulation with defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.cell_size.is_finite() && self.cell_size >= 4.0) {
            self.cell_size = defaults.cell_size;
        }
        if !(self.volume_radius.is_finite() && self.volume_radius > 0.0) {
            self.volume_radius = defaults.volume_radius;
        }
        if !(self.gain_time_constant.is_finite() && self.gain_time_constant > 0.0) {
            self.gain_time_constant = defaults.gain_time_constant;
        }
        if !(self.loop_seconds.is_finite() && self.loop_seconds > 0.0) {
            self.loop_seconds = defaults.loop_seconds;
        }
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            self.bpm = defaults.bpm;
        }
        self
    }

    /// Canvas attribute holding the settings JSON
    #[cfg(target_arch = "wasm32")]
    const ATTRIBUTE: &'static str = "data-settings";

    /// Load settings from the canvas element (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load(canvas: &web_sys::Element) -> Self {
        if let Some(json) = canvas.get_attribute(Self::ATTRIBUTE) {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", Self::ATTRIBUTE);
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed {}: {}", Self::ATTRIBUTE, e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
