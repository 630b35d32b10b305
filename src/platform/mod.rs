//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame admission and FPS
//! - Input events, coalesced per frame
//! - DOM presentation and focus detection (browser only)

pub mod clock;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{FpsCounter, FrameClock};
pub use input::{Action, InputBuffer, Source};
