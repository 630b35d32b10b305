//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, timers counted in frames
//! - Seeded RNG only
//! - Stable iteration order (pool slot order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod cutscene;
pub mod effects;
pub mod entities;
pub mod player;
pub mod pool;
pub mod progress;
pub mod rect;
pub mod spawner;
pub mod state;
pub mod tick;

pub use cutscene::Cutscene;
pub use effects::{Effects, Flash, Particle, ScreenShake};
pub use entities::{Enemy, EnemyKind, Heading, Owner, Pickup, PickupKind, Projectile, Prop, PropKind};
pub use player::{Motion, Player};
pub use pool::{Entity, Pool};
pub use progress::{GameOverReason, GamePhase, Progress, Tank};
pub use rect::Aabb;
pub use spawner::Spawner;
pub use state::{Character, GameEvent, GameState, Level};
pub use tick::{TickInput, tick};
