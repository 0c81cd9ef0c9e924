//! Simulation module
//!
//! Grid maze, player physics and proximity. This module must stay free of
//! rendering, audio and platform dependencies:
//! - Pure step functions; state is passed in and handed back
//! - Randomness only through a caller-supplied `Rng`
//! - `dt` is clamped by the frame driver, never here

pub mod collision;
pub mod maze;
pub mod proximity;
pub mod state;
pub mod tick;

pub use collision::{MoveResult, move_axis_separated};
pub use maze::{Grid, generate};
pub use proximity::{manhattan, volume};
pub use state::{GameState, Player, grid_size_for_view, source_for_grid};
pub use tick::{TickInput, step, tick};
