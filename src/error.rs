//! Error types
//!
//! The simulation is total; only bringing up the audio graph can fail.

use thiserror::Error;

/// Why an audio activation attempt did not produce a running graph
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The environment refused to create an audio context at all
    #[error("audio context unavailable: {0}")]
    ContextUnavailable(String),
    /// A node could not be created or connected
    #[error("audio graph construction failed: {0}")]
    Graph(String),
    /// The context exists but declined to start/resume (autoplay policy)
    #[error("audio activation rejected: {0}")]
    Rejected(String),
}

#[cfg(target_arch = "wasm32")]
impl AudioError {
    /// Render a browser exception into something loggable
    pub fn describe(value: &wasm_bindgen::JsValue) -> String {
        value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"))
    }
}
