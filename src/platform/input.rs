//! Input buffering
//!
//! Platform events arrive between frames from several sources (keyboard,
//! touch, on-screen buttons). They are buffered here and coalesced into a
//! single `TickInput` when a frame is admitted.

use crate::sim::{Level, TickInput};

/// Gameplay actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Jump,
    Shoot,
    ActivateSpecial,
    SteerLeft,
    SteerRight,
    Pause,
}

impl Action {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            Action::Jump => 0,
            Action::Shoot => 1,
            Action::ActivateSpecial => 2,
            Action::SteerLeft => 3,
            Action::SteerRight => 4,
            Action::Pause => 5,
        }
    }

    /// Keyboard binding for a level, by `KeyboardEvent.key`
    pub fn from_key(level: Level, key: &str) -> Option<Self> {
        let key = if key.len() == 1 {
            key.to_ascii_lowercase()
        } else {
            key.to_string()
        };
        match (level, key.as_str()) {
            (_, "Escape" | "p") => Some(Action::Pause),
            (_, "q") => Some(Action::ActivateSpecial),

            (Level::Streets, " " | "ArrowUp" | "w") => Some(Action::Jump),
            (Level::Streets, "ArrowRight" | "f" | "x") => Some(Action::Shoot),
            (Level::Streets, "z") => Some(Action::ActivateSpecial),

            (Level::Highway, " ") => Some(Action::ActivateSpecial),
            (Level::Highway, "ArrowLeft" | "a") => Some(Action::SteerLeft),
            (Level::Highway, "ArrowRight" | "d") => Some(Action::SteerRight),
            (Level::Highway, "ArrowUp" | "w" | "f") => Some(Action::Shoot),
            _ => None,
        }
    }

    /// On-screen button binding for a level, by element id
    pub fn from_button(level: Level, id: &str) -> Option<Self> {
        match (level, id) {
            (_, "specialBtn") => Some(Action::ActivateSpecial),
            (_, "pauseBtn") => Some(Action::Pause),
            (Level::Streets, "jumpBtn") => Some(Action::Jump),
            (Level::Streets, "attackBtn") => Some(Action::Shoot),
            // The highway reuses the two main buttons for steering
            (Level::Highway, "jumpBtn") => Some(Action::SteerLeft),
            (Level::Highway, "attackBtn") => Some(Action::SteerRight),
            _ => None,
        }
    }
}

/// Where an input came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Keyboard,
    Touch,
    Button,
}

impl Source {
    fn bit(self) -> u8 {
        match self {
            Source::Keyboard => 1,
            Source::Touch => 2,
            Source::Button => 4,
        }
    }
}

/// Pending input between two admitted frames
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    /// Per action, one bit per source currently holding it
    held: [u8; Action::COUNT],
    /// Per action, pressed at least once since the last take
    pressed: [bool; Action::COUNT],
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action, source: Source) {
        let i = action.index();
        // Key repeat arrives as extra presses while held; only the first counts
        if self.held[i] & source.bit() == 0 {
            self.pressed[i] = true;
        }
        self.held[i] |= source.bit();
    }

    pub fn release(&mut self, action: Action, source: Source) {
        self.held[action.index()] &= !source.bit();
    }

    /// Held by any source
    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.index()] != 0
    }

    /// Drop every held input (focus loss, level change)
    pub fn release_all(&mut self) {
        self.held = [0; Action::COUNT];
    }

    /// Coalesce everything since the last call into one frame's input
    pub fn take_tick_input(&mut self) -> TickInput {
        let pressed = |a: Action| self.pressed[a.index()];
        let held_axis = |a: Action| if self.is_held(a) || pressed(a) { 1.0 } else { 0.0 };

        let input = TickInput {
            jump: pressed(Action::Jump),
            shoot: pressed(Action::Shoot) || self.is_held(Action::Shoot),
            special: pressed(Action::ActivateSpecial),
            steer: held_axis(Action::SteerRight) - held_axis(Action::SteerLeft),
            pause: pressed(Action::Pause),
        };
        self.pressed = [false; Action::COUNT];
        input
    }
}
