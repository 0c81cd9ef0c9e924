//! Radio Maze - find the signal
//!
//! Core modules:
//! - `sim`: Grid maze, player physics, proximity to the radio
//! - `audio`: Offline lofi synthesis and the gain/filter mix graph
//! - `session`: Frame driver owning simulation and audio for one page session
//! - `renderer`: WebGPU drawing of the per-frame state
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::AudioError;
pub use session::{
    Activation, ActivationStep, ActivationTicket, DriverPhase, RenderFrame, Session, Viewport,
};
pub use settings::{Settings, SoundtrackPreset};

/// Game configuration constants
pub mod consts {
    /// Cell edge length in CSS pixels
    pub const CELL_SIZE: f32 = 32.0;
    /// Smallest grid the viewport is allowed to produce
    pub const MIN_GRID_WIDTH: usize = 10;
    pub const MIN_GRID_HEIGHT: usize = 8;

    /// Player spawn point (cells) on the first sizing pass
    pub const SPAWN_X: f32 = 2.5;
    pub const SPAWN_Y: f32 = 2.5;

    /// Player physics, in cells and seconds
    pub const MAX_SPEED: f32 = 6.0;
    pub const ACCEL: f32 = 28.0;
    pub const DRAG: f32 = 12.0;

    /// Frame deltas above this are clamped before stepping
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Manhattan distance (cells) at which the radio goes silent
    pub const VOLUME_RADIUS: f32 = 12.0;

    /// Master gain smoothing time constant (seconds)
    pub const GAIN_TIME_CONSTANT: f32 = 0.05;

    /// Soundtrack loop length (seconds) and tempo
    pub const LOOP_SECONDS: f64 = 8.0;
    pub const BPM: f64 = 90.0;

    /// Bus filters
    pub const MUSIC_LOWPASS_HZ: f32 = 3600.0;
    pub const MUSIC_LOWPASS_Q: f32 = 0.7;
    pub const NOISE_HIGHPASS_HZ: f32 = 700.0;
    pub const NOISE_HIGHPASS_Q: f32 = 0.8;
}

/// Cubic Hermite ease between `edge0` and `edge1`
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
