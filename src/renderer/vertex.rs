//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in CSS pixels (origin top-left, +y down) with an RGBA color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Scene palette. Values are sRGB, written to a non-sRGB surface as-is.
pub mod colors {
    /// `0xRRGGBB` to RGBA
    pub const fn hex(rgb: u32, alpha: f32) -> [f32; 4] {
        [
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            alpha,
        ]
    }

    pub const BACKGROUND: [f32; 4] = hex(0x0b0e1a, 1.0);
    pub const WALL: [f32; 4] = hex(0x1c2233, 1.0);
    pub const SOURCE: [f32; 4] = hex(0xf7d65a, 1.0);
    pub const PLAYER: [f32; 4] = hex(0x61dafb, 1.0);
    pub const METER_TRACK: [f32; 4] = WALL;
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 0.45];

    /// Volume meter gradient, bottom (0) to top of the filled part (1)
    pub const METER_STOPS: [(f32, [f32; 4]); 4] = [
        (0.0, hex(0x2fe19a, 1.0)),
        (0.55, hex(0xf7e359, 1.0)),
        (0.8, hex(0xf7941d, 1.0)),
        (1.0, hex(0xe84855, 1.0)),
    ];
}

#[cfg(test)]
mod tests {
    use super::colors::*;

    #[test]
    fn test_hex_channels() {
        assert_eq!(hex(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(hex(0x00ff00, 0.5), [0.0, 1.0, 0.0, 0.5]);
        let c = hex(0x61dafb, 1.0);
        assert!((c[0] - 97.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 251.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<super::Vertex>(), 24);
    }
}
