//! Occupancy grid and the random-rectangle maze generator
//!
//! The grid is rebuilt from scratch on every viewport resize. Layouts are not
//! reproducible; only their structure is guaranteed (solid border, clear 3x3
//! pockets around the spawn point and the radio, clipped to the interior).

use glam::Vec2;
use rand::Rng;

/// Fewest obstacle rectangles stamped into any grid
pub const MIN_OBSTACLES: usize = 6;
/// One extra obstacle per this many cells
pub const CELLS_PER_OBSTACLE: usize = 350;
/// Obstacle size limits (cells)
pub const OBSTACLE_MIN_SIDE: usize = 2;
pub const OBSTACLE_MAX_WIDTH: usize = 10;
pub const OBSTACLE_MAX_HEIGHT: usize = 8;

/// Immutable-once-built blocked/free map, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl Grid {
    /// All-free grid
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            blocked: vec![false; width * height],
        }
    }

    /// All-free grid with a solid one-cell border
    pub fn bordered(width: usize, height: usize) -> Self {
        let mut grid = Self::open(width, height);
        grid.stamp_border();
        grid
    }

    /// Block every edge cell
    pub fn stamp_border(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set(x, 0, true);
            self.set(x, h - 1, true);
        }
        for y in 0..h {
            self.set(0, y, true);
            self.set(w - 1, y, true);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, cx: i32, cy: i32) -> Option<usize> {
        if cx < 0 || cy < 0 || cx as usize >= self.width || cy as usize >= self.height {
            return None;
        }
        Some(cy as usize * self.width + cx as usize)
    }

    /// Set a cell; coordinates outside the grid are silently ignored
    pub fn set(&mut self, cx: i32, cy: i32, blocked: bool) {
        if let Some(i) = self.index(cx, cy) {
            self.blocked[i] = blocked;
        }
    }

    /// Cell query. Anything outside the grid counts as blocked.
    #[inline]
    pub fn is_blocked_cell(&self, cx: i32, cy: i32) -> bool {
        self.index(cx, cy).is_none_or(|i| self.blocked[i])
    }

    /// Query the cell containing a continuous position
    #[inline]
    pub fn is_blocked(&self, pos: Vec2) -> bool {
        self.is_blocked_cell(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    /// Coordinates of every blocked cell, row by row
    pub fn blocked_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| (i % self.width, i / self.width))
    }

    pub fn free_count(&self) -> usize {
        self.blocked.iter().filter(|b| !**b).count()
    }

    /// Free the 3x3 block centered on the cell containing `pos`
    pub fn clear_around(&mut self, pos: Vec2) {
        let cx = pos.x.floor() as i32;
        let cy = pos.y.floor() as i32;
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                self.set(x, y, false);
            }
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx as i32, yy as i32, true);
            }
        }
    }
}

/// Number of obstacle rectangles for a grid of this size
pub fn obstacle_count(width: usize, height: usize) -> usize {
    MIN_OBSTACLES.max(width * height / CELLS_PER_OBSTACLE)
}

/// Build a fresh maze.
///
/// Callers guarantee `width >= 10` and `height >= 8`. Rectangles may overlap
/// each other; only the final clearing pass removes walls.
pub fn generate(width: usize, height: usize, spawn: Vec2, source: Vec2, rng: &mut impl Rng) -> Grid {
    let mut grid = Grid::bordered(width, height);

    let max_w = OBSTACLE_MAX_WIDTH.min(width - 3);
    let max_h = OBSTACLE_MAX_HEIGHT.min(height - 3);

    for _ in 0..obstacle_count(width, height) {
        let w = rng.random_range(OBSTACLE_MIN_SIDE..=max_w);
        let h = rng.random_range(OBSTACLE_MIN_SIDE..=max_h);
        // Top-left such that the rectangle stays inside 1..=dim-2
        let x = rng.random_range(1..=width - w - 1);
        let y = rng.random_range(1..=height - h - 1);
        grid.fill_rect(x, y, w, h);
    }

    grid.clear_around(spawn);
    grid.clear_around(source);
    // A pocket next to the edge must not open the border
    grid.stamp_border();

    log::debug!(
        "Generated {}x{} maze: {} free of {} cells",
        width,
        height,
        grid.free_count(),
        width * height
    );

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn border_is_solid(grid: &Grid) -> bool {
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        (0..w).all(|x| grid.is_blocked_cell(x, 0) && grid.is_blocked_cell(x, h - 1))
            && (0..h).all(|y| grid.is_blocked_cell(0, y) && grid.is_blocked_cell(w - 1, y))
    }

    /// The 3x3 block around `pos`, clipped to the interior, is free
    fn pocket_is_clear(grid: &Grid, pos: Vec2) -> bool {
        let cx = pos.x.floor() as i32;
        let cy = pos.y.floor() as i32;
        let (w, h) = (grid.width() as i32, grid.height() as i32);
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                let interior = x >= 1 && y >= 1 && x < w - 1 && y < h - 1;
                if interior && grid.is_blocked_cell(x, y) {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_obstacle_count() {
        assert_eq!(obstacle_count(10, 8), 6);
        assert_eq!(obstacle_count(60, 35), 6);
        assert_eq!(obstacle_count(60, 40), 6);
        assert_eq!(obstacle_count(100, 70), 20);
    }

    #[test]
    fn test_out_of_bounds_is_blocked() {
        let grid = Grid::open(10, 8);
        assert!(!grid.is_blocked(Vec2::new(0.5, 0.5)));
        assert!(grid.is_blocked(Vec2::new(-0.1, 0.5)));
        assert!(grid.is_blocked(Vec2::new(10.0, 0.5)));
        assert!(grid.is_blocked(Vec2::new(0.5, 8.2)));
    }

    #[test]
    fn test_clear_around_ignores_out_of_bounds() {
        let mut grid = Grid::bordered(10, 8);
        grid.clear_around(Vec2::new(0.5, 0.5));
        assert!(!grid.is_blocked_cell(0, 0));
        assert!(!grid.is_blocked_cell(1, 1));
        assert!(grid.is_blocked_cell(2, 0));
        assert_eq!(grid.width(), 10);
    }

    #[test]
    fn test_scenario_grid_20x16() {
        let mut rng = Pcg32::seed_from_u64(7);
        let spawn = Vec2::new(2.5, 2.5);
        let source = Vec2::new(10.5, 8.5);
        let grid = generate(20, 16, spawn, source, &mut rng);
        assert!(border_is_solid(&grid));
        assert!(pocket_is_clear(&grid, spawn));
        assert!(pocket_is_clear(&grid, source));
    }

    #[test]
    fn test_spawn_next_to_edge_keeps_border() {
        let mut rng = Pcg32::seed_from_u64(11);
        let spawn = Vec2::new(1.5, 5.5);
        let grid = generate(20, 16, spawn, Vec2::new(10.5, 8.5), &mut rng);
        assert!(border_is_solid(&grid));
        assert!(!grid.is_blocked(spawn));
        assert!(pocket_is_clear(&grid, spawn));
        assert!(grid.is_blocked_cell(0, 5));
    }

    #[test]
    fn test_blocked_cells_lists_border() {
        let grid = Grid::bordered(10, 8);
        let count = grid.blocked_cells().count();
        assert_eq!(count, 2 * 10 + 2 * 6);
        assert_eq!(grid.free_count(), 8 * 6);
        assert!(grid.blocked_cells().all(|(x, y)| grid.is_blocked_cell(x as i32, y as i32)));
    }

    #[test]
    fn test_layouts_differ_between_calls() {
        let mut rng = rand::rng();
        let spawn = Vec2::new(2.5, 2.5);
        let source = Vec2::new(30.5, 20.5);
        let grids: Vec<Grid> = (0..8)
            .map(|_| generate(60, 40, spawn, source, &mut rng))
            .collect();
        assert!(grids.windows(2).any(|pair| pair[0] != pair[1]));
    }

    proptest! {
        #[test]
        fn prop_border_and_pockets(
            seed in any::<u64>(),
            width in 10usize..80,
            height in 8usize..50,
            sx in 0.0f32..1.0,
            sy in 0.0f32..1.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let spawn = Vec2::new(sx * width as f32, sy * height as f32);
            let source = Vec2::new((width / 2) as f32 + 0.5, (height / 2) as f32 + 0.5);
            let grid = generate(width, height, spawn, source, &mut rng);

            prop_assert_eq!(grid.width(), width);
            prop_assert_eq!(grid.height(), height);
            prop_assert!(pocket_is_clear(&grid, spawn));
            prop_assert!(pocket_is_clear(&grid, source));
            prop_assert!(border_is_solid(&grid));
        }
    }
}
