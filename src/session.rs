//! Frame driver and session ownership
//!
//! A `Session` owns everything one open page needs: the simulation state, the
//! (optional) audio graph and the activation flag. The host calls `resize`
//! whenever the viewport changes and `tick` once per display refresh.
//!
//! ```text
//! Uninitialized --resize--> Sizing --tick--> Running
//!       ^                     ^                 |
//!       |                     +-----resize------+
//!       +------------------teardown-------------+
//! ```

use glam::Vec2;

use crate::audio::AudioOutput;
use crate::consts::MAX_FRAME_DT;
use crate::error::AudioError;
use crate::settings::Settings;
use crate::sim::{self, GameState, Grid, TickInput};

/// Where the frame driver is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    /// No viewport yet, or torn down
    Uninitialized,
    /// A viewport change is waiting to be applied on the next tick
    Sizing,
    Running,
}

/// Handle for one activation attempt. Only the most recent one may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivationTicket(u64);

/// What the host must do after a user interaction
#[derive(Debug)]
pub enum ActivationStep<R> {
    /// No graph yet: build one and hand it to `complete_activation`
    Build(ActivationTicket),
    /// The existing graph was asked to resume; `R` settles when it does
    Resume(R),
}

/// Audio activation flag consumed by the frame driver each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Inactive,
    Pending(ActivationTicket),
    Active,
}

/// Viewport size in CSS pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    /// Backing-store size in device pixels (at least 1x1)
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (self.height * self.pixel_ratio).round().max(1.0) as u32;
        (w, h)
    }
}

/// Read-only view of one frame, handed to the renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub grid: &'a Grid,
    /// Cell edge in CSS pixels
    pub cell_size: f32,
    pub player: Vec2,
    pub source: Vec2,
    pub volume: f32,
    pub view: Viewport,
    /// Audio is not playing; show the activation overlay
    pub awaiting_activation: bool,
}

/// One open page: simulation, audio and activation state
pub struct Session<A: AudioOutput> {
    settings: Settings,
    phase: DriverPhase,
    viewport: Option<Viewport>,
    state: Option<GameState>,
    audio: Option<A>,
    activation: Activation,
    next_ticket: u64,
}

impl<A: AudioOutput> Session<A> {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            phase: DriverPhase::Uninitialized,
            viewport: None,
            state: None,
            audio: None,
            activation: Activation::Inactive,
            next_ticket: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn audio(&self) -> Option<&A> {
        self.audio.as_ref()
    }

    pub fn audio_mut(&mut self) -> Option<&mut A> {
        self.audio.as_mut()
    }

    /// Audio graph exists and is audible
    pub fn is_audio_running(&self) -> bool {
        self.activation == Activation::Active
            && self.audio.as_ref().is_some_and(|a| a.is_running())
    }

    /// Record a viewport change. The maze is rebuilt on the next tick, so
    /// several resize events inside one frame cost a single regeneration.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.phase = DriverPhase::Sizing;
    }

    fn apply_sizing(&mut self) {
        let Some(view) = self.viewport else {
            self.phase = DriverPhase::Uninitialized;
            return;
        };

        let state = GameState::for_view(
            view.width,
            view.height,
            self.settings.cell_size,
            self.settings.volume_radius,
            self.state.as_ref(),
            &mut rand::rng(),
        );
        log::info!(
            "Sized {}x{} px -> {}x{} grid, source at ({}, {})",
            view.width,
            view.height,
            state.grid.width(),
            state.grid.height(),
            state.source.x,
            state.source.y
        );
        self.state = Some(state);
        self.phase = DriverPhase::Running;
    }

    /// Start or resume audio in response to a user interaction.
    ///
    /// With a graph already built this asks it to resume in place and hands
    /// back the backend's pending handle. Without one it issues a ticket for
    /// building a graph; a newer ticket supersedes any attempt still in
    /// flight, so a stalled attempt never blocks a retry. Returns `None`
    /// while audio is playing.
    pub fn request_activation(&mut self) -> Option<ActivationStep<A::Resume>> {
        if let Some(audio) = self.audio.as_mut() {
            if audio.is_running() {
                return None;
            }
            match audio.resume() {
                Ok(pending) => {
                    log::info!("Resuming audio");
                    return Some(ActivationStep::Resume(pending));
                }
                Err(e) => {
                    log::warn!("Audio graph cannot resume, rebuilding: {}", e);
                    audio.shutdown();
                    self.audio = None;
                    self.activation = Activation::Inactive;
                }
            }
        }

        if let Activation::Pending(stale) = self.activation {
            log::info!("Superseding audio activation ({:?})", stale);
        }
        self.next_ticket += 1;
        let ticket = ActivationTicket(self.next_ticket);
        self.activation = Activation::Pending(ticket);
        log::info!("Audio activation requested ({:?})", ticket);
        Some(ActivationStep::Build(ticket))
    }

    /// Finish an activation attempt. Returns whether the result was accepted.
    ///
    /// Results for stale tickets (superseded, or issued before a teardown)
    /// are discarded and any graph they carry is shut down.
    pub fn complete_activation(
        &mut self,
        ticket: ActivationTicket,
        result: Result<A, AudioError>,
    ) -> bool {
        if self.activation != Activation::Pending(ticket) {
            log::warn!("Ignoring late audio activation ({:?})", ticket);
            if let Ok(mut audio) = result {
                audio.shutdown();
            }
            return false;
        }

        match result {
            Ok(audio) => {
                log::info!("Audio active");
                self.audio = Some(audio);
                self.activation = Activation::Active;
                true
            }
            Err(e) => {
                log::warn!("Audio activation rejected: {}", e);
                self.activation = Activation::Inactive;
                false
            }
        }
    }

    /// Advance one frame. `elapsed` is wall time since the previous frame in
    /// seconds; it is clamped to `[0, MAX_FRAME_DT]`.
    ///
    /// Returns `None` until a viewport has been supplied.
    pub fn tick(&mut self, elapsed: f32, input: &TickInput) -> Option<RenderFrame<'_>> {
        if self.phase == DriverPhase::Sizing {
            self.apply_sizing();
        }
        if self.phase != DriverPhase::Running {
            return None;
        }

        let dt = if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };

        let awaiting_activation = !self.is_audio_running();
        let state = self.state.as_mut()?;
        let volume = sim::tick(state, input, dt);

        if !awaiting_activation && let Some(audio) = self.audio.as_mut() {
            audio.set_target_volume(volume);
        }

        Some(RenderFrame {
            grid: &state.grid,
            cell_size: state.cell_size,
            player: state.player.pos,
            source: state.source,
            volume,
            view: self.viewport?,
            awaiting_activation,
        })
    }

    /// Release audio, forget the simulation and go back to `Uninitialized`.
    /// Any activation still in flight becomes stale.
    pub fn teardown(&mut self) {
        if let Some(mut audio) = self.audio.take() {
            audio.shutdown();
        }
        if self.phase != DriverPhase::Uninitialized || self.activation != Activation::Inactive {
            log::info!("Session torn down");
        }
        self.activation = Activation::Inactive;
        self.state = None;
        self.viewport = None;
        self.phase = DriverPhase::Uninitialized;
    }
}

impl<A: AudioOutput> Drop for Session<A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
