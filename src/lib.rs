//! Greeting Card - timeline and particle core for an animated birthday card
//!
//! Core modules:
//! - `sim`: Deterministic frame-driven simulation (timeline, sparkles, fireworks, props)
//! - `config`: Scene configuration with documented defaults
//! - `settings`: User-facing quality/accessibility settings
//! - `renderer`: GPU instance packing for the host renderer
//! - `platform`: Browser bindings (wasm only)

pub mod config;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::SceneConfig;
pub use error::ConfigError;
pub use settings::{QualityPreset, Settings};

/// Scene configuration constants
pub mod consts {
    /// Largest frame step fed to any integrator (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.05;
    /// Minimum change before a progress signal is re-emitted
    pub const SIGNAL_EPSILON: f32 = 0.005;

    /// Ambient sparkle pool size
    pub const SPARKLE_COUNT: usize = 400;

    /// Firework shell pool size
    pub const MAX_SHELLS: usize = 12;
    /// Burst particles owned by each shell
    pub const PARTICLES_PER_SHELL: usize = 80;
    /// Trail particles owned by each shell
    pub const TRAIL_PER_SHELL: usize = 12;
    /// Shells launched at once when the show starts
    pub const INITIAL_VOLLEY: usize = 5;
}
