//! Platform abstraction layer
//!
//! Browser-independent pieces of input handling. Event wiring itself lives
//! in `main.rs`; this layer only turns what was held into simulation input.

pub mod input;

pub use input::HeldKeys;
