//! Collision against the occupancy grid
//!
//! Movement is resolved one axis at a time: X first, then Y from the
//! (possibly updated) X. A blocked axis keeps its old coordinate and loses its
//! velocity component, so diagonal pushes into a wall slide along it.

use glam::Vec2;

use super::maze::Grid;

/// Outcome of an axis-separated move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveResult {
    pub pos: Vec2,
    pub vel: Vec2,
    /// X move was rejected
    pub hit_x: bool,
    /// Y move was rejected
    pub hit_y: bool,
}

/// Advance `pos` by `vel * dt`, rejecting each axis whose destination cell is blocked
pub fn move_axis_separated(grid: &Grid, pos: Vec2, vel: Vec2, dt: f32) -> MoveResult {
    let mut pos = pos;
    let mut vel = vel;

    let next_x = pos.x + vel.x * dt;
    let hit_x = grid.is_blocked(Vec2::new(next_x, pos.y));
    if hit_x {
        vel.x = 0.0;
    } else {
        pos.x = next_x;
    }

    let next_y = pos.y + vel.y * dt;
    let hit_y = grid.is_blocked(Vec2::new(pos.x, next_y));
    if hit_y {
        vel.y = 0.0;
    } else {
        pos.y = next_y;
    }

    MoveResult { pos, vel, hit_x, hit_y }
}
