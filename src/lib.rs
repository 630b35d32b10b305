//! City Runner - a side-scrolling arcade runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, pools, spawning, collisions)
//! - `session`: Owns a running game and turns sim events into audio/UI/persistence
//! - `driver`: Frame admission and the update/present loop
//! - `platform`: Frame clock, input buffering, browser glue
//! - `persistence`: Flat key-value progress snapshots
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod driver;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod present;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::{Driver, FrameOutcome};
pub use error::{ConfigError, InitError};
pub use session::Session;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Simulation rate the frame-counted timers are tuned for
    pub const FRAMES_PER_SECOND: u32 = 60;

    /// Default viewport (logical pixels)
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;

    /// Entities are spawned this far past the trailing edge
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Entities are pruned once this far past the leading edge
    pub const DESPAWN_MARGIN: f32 = 100.0;
}
