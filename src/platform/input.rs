//! Held-key tracking
//!
//! Keys are stored lower-cased, so `ArrowLeft`/`arrowleft` and `W`/`w` are the
//! same key. Arrows and WASD are equivalent; opposing keys cancel.

use std::collections::HashSet;

use crate::sim::TickInput;

const RIGHT: [&str; 2] = ["d", "arrowright"];
const LEFT: [&str; 2] = ["a", "arrowleft"];
const DOWN: [&str; 2] = ["s", "arrowdown"];
const UP: [&str; 2] = ["w", "arrowup"];

/// Whether a key participates in movement (the host may suppress its default action)
pub fn is_movement_key(key: &str) -> bool {
    let key = key.to_lowercase();
    [RIGHT, LEFT, DOWN, UP].iter().any(|keys| keys.contains(&key.as_str()))
}

/// Set of currently held keys
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    held: HashSet<String>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_lowercase());
    }

    pub fn release(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Forget everything (focus lost: key-up events will never arrive)
    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_lowercase())
    }

    fn any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.held.contains(*k))
    }

    fn axis(&self, positive: &[&str], negative: &[&str]) -> i32 {
        self.any(positive) as i32 - self.any(negative) as i32
    }

    /// Directional input for this frame
    pub fn to_input(&self) -> TickInput {
        TickInput::new(self.axis(&RIGHT, &LEFT), self.axis(&DOWN, &UP))
    }
}
