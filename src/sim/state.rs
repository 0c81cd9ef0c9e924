//! Game state and core simulation types

use glam::Vec2;
use rand::Rng;

use super::maze::{self, Grid};
use crate::consts::*;

/// The player's dot, in cell units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Player {
    /// At rest at `pos`
    pub fn at(pos: Vec2) -> Self {
        Self { pos, vel: Vec2::ZERO }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::at(Vec2::new(SPAWN_X, SPAWN_Y))
    }
}

/// Grid dimensions for a viewport in CSS pixels
pub fn grid_size_for_view(view_width: f32, view_height: f32, cell_size: f32) -> (usize, usize) {
    let w = (view_width / cell_size).ceil().max(0.0) as usize;
    let h = (view_height / cell_size).ceil().max(0.0) as usize;
    (w.max(MIN_GRID_WIDTH), h.max(MIN_GRID_HEIGHT))
}

/// The radio sits in the middle of the center cell
pub fn source_for_grid(width: usize, height: usize) -> Vec2 {
    Vec2::new((width / 2) as f32 + 0.5, (height / 2) as f32 + 0.5)
}

/// Pull a carried-over position back into the interior cells `1..=dim-2`.
/// Positions already inside are returned unchanged.
pub fn clamp_into_interior(pos: Vec2, width: usize, height: usize) -> Vec2 {
    let max_x = (width - 1) as f32 - 0.001;
    let max_y = (height - 1) as f32 - 0.001;
    Vec2::new(pos.x.clamp(1.0, max_x), pos.y.clamp(1.0, max_y))
}

/// Everything the simulation owns for one viewport size
#[derive(Debug, Clone)]
pub struct GameState {
    /// Viewport size in CSS pixels
    pub view_width: f32,
    pub view_height: f32,
    pub cell_size: f32,
    pub grid: Grid,
    pub player: Player,
    pub source: Vec2,
    /// Volume radius in cells
    pub radius: f32,
    /// Last computed volume in [0, 1]
    pub volume: f32,
}

impl GameState {
    /// Size a state for a viewport, generating a fresh maze.
    ///
    /// `previous` carries the player and last volume across resizes.
    pub fn for_view(
        view_width: f32,
        view_height: f32,
        cell_size: f32,
        radius: f32,
        previous: Option<&GameState>,
        rng: &mut impl Rng,
    ) -> Self {
        let (grid_width, grid_height) = grid_size_for_view(view_width, view_height, cell_size);
        let source = source_for_grid(grid_width, grid_height);

        let mut player = previous.map(|s| s.player).unwrap_or_default();
        player.pos = clamp_into_interior(player.pos, grid_width, grid_height);

        let grid = maze::generate(grid_width, grid_height, player.pos, source, rng);

        Self {
            view_width,
            view_height,
            cell_size,
            grid,
            player,
            source,
            radius,
            volume: previous.map(|s| s.volume).unwrap_or(0.0),
        }
    }
}
