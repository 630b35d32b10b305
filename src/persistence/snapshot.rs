//! Last-known progress, stored as flat string keys
//!
//! Read once at session start, written at session start (character select)
//! and on terminal transitions. A missing or unparsable key falls back to
//! its default without affecting the others.

use std::str::FromStr;

use super::KeyValueStore;
use crate::error::StorageError;
use crate::sim::{Character, GamePhase, GameState, Level};
use crate::tuning::Tuning;

pub const KEY_CHARACTER: &str = "runner.character";
pub const KEY_LEVEL: &str = "runner.level";
pub const KEY_LIVES: &str = "runner.lives";
pub const KEY_ENERGY: &str = "runner.energy";
pub const KEY_FUEL: &str = "runner.fuel";

/// Progress carried between sessions
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub character: Character,
    /// Level to resume at
    pub level: Level,
    pub lives: u8,
    pub energy: f32,
    /// Fuel left, highway only
    pub fuel: Option<f32>,
}

impl ProgressSnapshot {
    /// Fresh-start values
    pub fn defaults(tuning: &Tuning) -> Self {
        Self {
            character: Character::default(),
            level: Level::Streets,
            lives: tuning.starting_lives,
            energy: 0.0,
            fuel: None,
        }
    }

    /// State at this instant. A completed level resumes at the next one.
    ///
    /// The highway vehicle holds no energy of its own, so the energy the
    /// level started with is written back unchanged.
    pub fn capture(state: &GameState) -> Self {
        let level = match state.progress.phase {
            GamePhase::LevelComplete => state.level.next().unwrap_or(state.level),
            _ => state.level,
        };
        let energy = match state.level {
            Level::Streets => state.player.energy,
            Level::Highway => state.carried_energy,
        };
        Self {
            character: state.character,
            level,
            lives: state.progress.lives,
            energy,
            fuel: state.progress.fuel.map(|t| t.amount),
        }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S, tuning: &Tuning) -> Self {
        let defaults = Self::defaults(tuning);
        Self {
            character: read(store, KEY_CHARACTER, Character::from_str)
                .unwrap_or(defaults.character),
            level: read(store, KEY_LEVEL, Level::from_str).unwrap_or(defaults.level),
            lives: read(store, KEY_LIVES, |s| {
                u8::from_str(s).ok().filter(|l| *l <= tuning.max_lives)
            })
            .unwrap_or(defaults.lives),
            energy: read(store, KEY_ENERGY, |s| {
                parse_finite(s).filter(|e| (0.0..=tuning.max_energy).contains(e))
            })
            .unwrap_or(defaults.energy),
            fuel: read(store, KEY_FUEL, |s| parse_finite(s).filter(|f| *f >= 0.0)),
        }
    }

    /// Write every key. Stops at the first rejected write.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(KEY_CHARACTER, self.character.as_str())?;
        store.set(KEY_LEVEL, self.level.as_str())?;
        store.set(KEY_LIVES, &self.lives.to_string())?;
        store.set(KEY_ENERGY, &self.energy.to_string())?;
        match self.fuel {
            Some(fuel) => store.set(KEY_FUEL, &fuel.to_string())?,
            None => store.remove(KEY_FUEL),
        }
        Ok(())
    }
}

fn parse_finite(s: &str) -> Option<f32> {
    f32::from_str(s.trim()).ok().filter(|v| v.is_finite())
}

fn read<S, T>(store: &S, key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T>
where
    S: KeyValueStore + ?Sized,
{
    let raw = store.get(key)?;
    let value = parse(raw.trim());
    if value.is_none() {
        log::warn!("ignoring invalid stored value for {key}: {raw:?}");
    }
    value
}
