//! Per-frame simulation step
//!
//! Advances the player from held directional input, then refreshes the
//! proximity volume. `dt` is clamped by the caller (see `session`).

use glam::{IVec2, Vec2};

use super::collision::move_axis_separated;
use super::maze::Grid;
use super::proximity;
use super::state::{GameState, Player};
use crate::consts::*;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Held direction, each axis in {-1, 0, 1} (+x right, +y down)
    pub direction: IVec2,
}

impl TickInput {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            direction: IVec2::new(x.signum(), y.signum()),
        }
    }

    /// Unit-length direction, or `None` when nothing is held
    pub fn unit_direction(&self) -> Option<Vec2> {
        let raw = self.direction.as_vec2();
        let length = raw.length();
        (length > 0.0).then(|| raw / length)
    }
}

/// Advance the player by one step. Pure: no state outside the return value.
pub fn step(player: Player, input: &TickInput, grid: &Grid, dt: f32) -> Player {
    let mut vel = player.vel;

    match input.unit_direction() {
        Some(dir) => vel += dir * ACCEL * dt,
        // Drag is a proportional decay, never a hard stop
        None => vel -= vel * DRAG * dt,
    }

    let speed = vel.length();
    if speed > MAX_SPEED {
        vel *= MAX_SPEED / speed;
    }

    let moved = move_axis_separated(grid, player.pos, vel, dt);
    Player {
        pos: moved.pos,
        vel: moved.vel,
    }
}

/// Advance the game state by one frame and return the new volume
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> f32 {
    state.player = step(state.player, input, &state.grid, dt);
    state.volume = proximity::volume(state.player.pos, state.source, state.radius);
    state.volume
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_room() -> Grid {
        Grid::bordered(40, 30)
    }

    #[test]
    fn test_input_normalization() {
        assert_eq!(TickInput::default().unit_direction(), None);
        assert_eq!(TickInput::new(1, 0).unit_direction(), Some(Vec2::X));
        let diag = TickInput::new(-1, 1).unit_direction().unwrap();
        assert!((diag.length() - 1.0).abs() < 1e-6);
        // Out-of-range axes collapse to their sign
        assert_eq!(TickInput::new(5, -3).direction, IVec2::new(1, -1));
    }

    #[test]
    fn test_accelerates_along_input() {
        let grid = open_room();
        let p = step(Player::at(Vec2::new(10.5, 10.5)), &TickInput::new(1, 0), &grid, 0.05);
        assert!((p.vel.x - ACCEL * 0.05).abs() < 1e-5);
        assert_eq!(p.vel.y, 0.0);
        assert!(p.pos.x > 10.5);
    }

    #[test]
    fn test_diagonal_accel_is_normalized() {
        let grid = open_room();
        let p = step(Player::at(Vec2::new(10.5, 10.5)), &TickInput::new(1, 1), &grid, 0.05);
        assert!((p.vel.length() - ACCEL * 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_speed_is_clamped() {
        let grid = open_room();
        let mut p = Player::at(Vec2::new(5.5, 15.5));
        for _ in 0..40 {
            p = step(p, &TickInput::new(1, 0), &grid, 0.05);
        }
        assert!((p.speed() - MAX_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_drag_decays_toward_zero() {
        let grid = open_room();
        let dt = 0.001;
        let mut p = Player {
            pos: Vec2::new(5.5, 15.5),
            vel: Vec2::new(6.0, 0.0),
        };
        for _ in 0..500 {
            p = step(p, &TickInput::default(), &grid, dt);
        }
        // v(t) = 6 e^(-12 t) => ~0.0149 at t = 0.5
        let expected = 6.0 * (-6.0f32).exp();
        assert!(p.vel.x > 0.0);
        assert!((p.vel.x - expected).abs() < 0.002, "v = {}", p.vel.x);
        assert_eq!(p.vel.y, 0.0);
    }

    #[test]
    fn test_drag_single_step_is_not_a_stop() {
        let grid = open_room();
        let p = Player {
            pos: Vec2::new(5.5, 15.5),
            vel: Vec2::new(3.0, -2.0),
        };
        let next = step(p, &TickInput::default(), &grid, 0.05);
        assert!((next.vel - p.vel * (1.0 - DRAG * 0.05)).length() < 1e-5);
    }

    #[test]
    fn test_wall_zeroes_velocity_on_blocked_axis() {
        let grid = Grid::bordered(10, 8);
        let p = Player {
            pos: Vec2::new(8.95, 3.5),
            vel: Vec2::new(MAX_SPEED, 0.0),
        };
        let next = step(p, &TickInput::new(1, 1), &grid, 0.05);
        assert_eq!(next.pos.x, 8.95);
        assert_eq!(next.vel.x, 0.0);
        assert!(next.pos.y > 3.5);
    }

    #[test]
    fn test_tick_updates_volume() {
        use crate::sim::state::GameState;
        use rand::SeedableRng;
        use rand_pcg::Pcg32;

        let mut rng = Pcg32::seed_from_u64(11);
        let mut state = GameState::for_view(640.0, 512.0, 32.0, 12.0, None, &mut rng);
        state.player = Player::at(Vec2::new(9.5, 8.5));
        let v = tick(&mut state, &TickInput::default(), 0.016);
        assert!((v - (1.0 - 1.0 / 12.0)).abs() < 1e-5);
        assert_eq!(state.volume, v);
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_max(
            vx in -50.0f32..50.0, vy in -50.0f32..50.0,
            ix in -1i32..=1, iy in -1i32..=1,
            dt in 0.0f32..=0.05,
        ) {
            let grid = open_room();
            let p = Player { pos: Vec2::new(20.5, 15.5), vel: Vec2::new(vx, vy) };
            let next = step(p, &TickInput::new(ix, iy), &grid, dt);
            prop_assert!(next.speed() <= MAX_SPEED + 1e-4);
        }

        #[test]
        fn prop_blocked_x_keeps_x(
            vx in 0.5f32..6.0, vy in -6.0f32..6.0, iy in -1i32..=1,
        ) {
            // Column 5 is solid; start flush against it
            let mut grid = Grid::bordered(10, 8);
            for y in 0..8 {
                grid.set(5, y, true);
            }
            let start = Vec2::new(4.999, 3.5);
            let p = Player { pos: start, vel: Vec2::new(vx, vy) };
            let next = step(p, &TickInput::new(1, iy), &grid, 0.05);
            prop_assert_eq!(next.pos.x, start.x);
            prop_assert_eq!(next.vel.x, 0.0);
        }

        #[test]
        fn prop_player_never_enters_wall(
            seed in any::<u64>(),
            moves in proptest::collection::vec((-1i32..=1, -1i32..=1), 1..200),
        ) {
            use rand::SeedableRng;
            let mut rng = rand_pcg::Pcg32::seed_from_u64(seed);
            let spawn = Vec2::new(2.5, 2.5);
            let grid = crate::sim::maze::generate(30, 20, spawn, Vec2::new(15.5, 10.5), &mut rng);
            let mut p = Player::at(spawn);
            for (x, y) in moves {
                p = step(p, &TickInput::new(x, y), &grid, 0.05);
                prop_assert!(!grid.is_blocked(p.pos));
            }
        }
    }
}
