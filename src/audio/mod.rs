//! Soundtrack synthesis and playback
//!
//! All sound is generated procedurally - no external files needed!
//! The five layers are rendered once at activation, then looped through a
//! two-bus filter graph whose master gain follows the player's proximity.

pub mod filter;
pub mod mixer;
pub mod synth;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use mixer::{GainSmoother, MixerGraph};
pub use synth::{Chord, ChordQuality, Layer, LayerBuffers, PROGRESSION, SynthParams};
#[cfg(target_arch = "wasm32")]
pub use web::WebAudioMixer;

use crate::error::AudioError;

/// A started audio graph as seen by the frame driver
pub trait AudioOutput {
    /// What `resume` hands back: a promise to await in the browser, nothing
    /// for backends that resume synchronously
    type Resume;

    /// Graph exists and the output device is actually playing
    fn is_running(&self) -> bool;

    /// Ask a suspended device to start playing again, keeping the graph.
    /// Safe to call repeatedly while an earlier request is still unsettled.
    fn resume(&mut self) -> Result<Self::Resume, AudioError>;

    /// Steer the master gain toward `volume` (smoothed, never a jump)
    fn set_target_volume(&mut self, volume: f32);

    /// Stop every source and release the graph. Idempotent.
    fn shutdown(&mut self);
}
