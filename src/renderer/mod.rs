//! WebGPU rendering module
//!
//! Flat-shaded triangles built on the CPU each frame from a `RenderFrame`.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
