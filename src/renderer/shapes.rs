//! Shape generation for the maze scene
//!
//! Everything is emitted in CSS pixels; the pipeline maps to NDC.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::session::RenderFrame;

/// Disc radii as a fraction of the cell size
const SOURCE_RADIUS: f32 = 0.32;
const PLAYER_RADIUS: f32 = 0.28;
const CIRCLE_SEGMENTS: u32 = 24;

/// Two triangles covering an axis-aligned rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    rect_gradient(min, size, color, color)
}

/// Rectangle with a vertical color ramp from `top` to `bottom`
pub fn rect_gradient(min: Vec2, size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> [Vertex; 6] {
    let max = min + size;
    [
        Vertex::new(min.x, min.y, top),
        Vertex::new(max.x, min.y, top),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(max.x, min.y, top),
        Vertex::new(max.x, max.y, bottom),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    let point = |i: u32| {
        let theta = (i as f32 / segments as f32) * 2.0 * PI;
        center + Vec2::new(theta.cos(), theta.sin()) * radius
    };

    for i in 0..segments {
        let a = point(i);
        let b = point(i + 1);
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(a.x, a.y, color));
        vertices.push(Vertex::new(b.x, b.y, color));
    }

    vertices
}

/// Volume meter: a full-height track in `column`, filled from the bottom.
/// The gradient spans the filled height only, so the top edge is always the last stop.
pub fn volume_meter(column: f32, cell_size: f32, height: f32, volume: f32) -> Vec<Vertex> {
    let x = column * cell_size;
    let mut vertices = rect(
        Vec2::new(x, 0.0),
        Vec2::new(cell_size, height),
        colors::METER_TRACK,
    )
    .to_vec();

    let fill = height * volume.clamp(0.0, 1.0);
    if fill <= 0.0 {
        return vertices;
    }

    let bottom = height;
    for pair in colors::METER_STOPS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        let y0 = bottom - fill * t1;
        let y1 = bottom - fill * t0;
        vertices.extend(rect_gradient(
            Vec2::new(x, y0),
            Vec2::new(cell_size, y1 - y0),
            c1,
            c0,
        ));
    }

    vertices
}

/// Build every triangle for one frame, back to front
pub fn frame_vertices(frame: &RenderFrame<'_>) -> Vec<Vertex> {
    let cell = frame.cell_size;
    let view = Vec2::new(frame.view.width, frame.view.height);
    let cell_size = Vec2::splat(cell);

    let mut vertices = Vec::new();
    vertices.extend(rect(Vec2::ZERO, view, colors::BACKGROUND));

    for (cx, cy) in frame.grid.blocked_cells() {
        let min = Vec2::new(cx as f32, cy as f32) * cell;
        vertices.extend(rect(min, cell_size, colors::WALL));
    }

    vertices.extend(circle(
        frame.source * cell,
        cell * SOURCE_RADIUS,
        colors::SOURCE,
        CIRCLE_SEGMENTS,
    ));
    vertices.extend(circle(
        frame.player * cell,
        cell * PLAYER_RADIUS,
        colors::PLAYER,
        CIRCLE_SEGMENTS,
    ));

    let last_column = frame.grid.width().saturating_sub(1) as f32;
    vertices.extend(volume_meter(last_column, cell, view.y, frame.volume));

    if frame.awaiting_activation {
        vertices.extend(rect(Vec2::ZERO, view, colors::OVERLAY));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Viewport;
    use crate::sim::Grid;

    fn frame(grid: &Grid, volume: f32, awaiting_activation: bool) -> RenderFrame<'_> {
        RenderFrame {
            grid,
            cell_size: 32.0,
            player: Vec2::new(2.5, 2.5),
            source: Vec2::new(5.5, 4.5),
            volume,
            view: Viewport::new(320.0, 256.0, 1.0),
            awaiting_activation,
        }
    }

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        vertices.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec2::from(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn test_circle_vertex_count_and_radius() {
        let verts = circle(Vec2::new(10.0, 10.0), 5.0, colors::PLAYER, 16);
        assert_eq!(verts.len(), 48);
        for v in verts.iter().skip(1).step_by(3) {
            let d = Vec2::from(v.position).distance(Vec2::new(10.0, 10.0));
            assert!((d - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_silent_meter_is_track_only() {
        let verts = volume_meter(9.0, 32.0, 256.0, 0.0);
        assert_eq!(verts.len(), 6);
        let (lo, hi) = bounds(&verts);
        assert_eq!(lo, Vec2::new(288.0, 0.0));
        assert_eq!(hi, Vec2::new(320.0, 256.0));
    }

    #[test]
    fn test_meter_fill_height() {
        let verts = volume_meter(9.0, 32.0, 256.0, 0.5);
        // Track plus three gradient bands
        assert_eq!(verts.len(), 24);
        let (lo, hi) = bounds(&verts[6..]);
        assert!((lo.y - 128.0).abs() < 1e-4);
        assert_eq!(hi.y, 256.0);
        // Top of the fill carries the last stop
        let top = verts[6..].iter().find(|v| (v.position[1] - 128.0).abs() < 1e-4).unwrap();
        assert_eq!(top.color, colors::METER_STOPS[3].1);
    }

    #[test]
    fn test_frame_layers() {
        let grid = Grid::bordered(10, 8);
        let walls = grid.blocked_cells().count();

        let quiet = frame_vertices(&frame(&grid, 0.0, false));
        let expected = 6 + walls * 6 + 2 * (CIRCLE_SEGMENTS as usize * 3) + 6;
        assert_eq!(quiet.len(), expected);
        assert_eq!(quiet[0].color, colors::BACKGROUND);

        // Overlay is drawn last, over everything
        let waiting = frame_vertices(&frame(&grid, 0.0, true));
        assert_eq!(waiting.len(), expected + 6);
        assert_eq!(waiting.last().unwrap().color, colors::OVERLAY);
    }

    #[test]
    fn test_discs_in_pixel_space() {
        let grid = Grid::bordered(10, 8);
        let verts = frame_vertices(&frame(&grid, 0.0, false));
        let player: Vec<_> = verts.iter().filter(|v| v.color == colors::PLAYER).collect();
        let (lo, hi) = bounds(&player.iter().map(|v| **v).collect::<Vec<_>>());
        let center = (lo + hi) / 2.0;
        assert!(center.distance(Vec2::new(80.0, 80.0)) < 0.5);
        assert!(((hi.x - lo.x) / 2.0 - 32.0 * PLAYER_RADIUS).abs() < 1e-3);
    }
}
