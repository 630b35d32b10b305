//! Resource counters and the session state machine
//!
//! `Running <-> Paused`, then exactly one of `LevelComplete` / `GameOver`.
//! Terminal phases are one-way: nothing here leaves them.

use serde::{Deserialize, Serialize};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    OutOfLives,
    OutOfFuel,
}

impl GameOverReason {
    pub fn message(self) -> &'static str {
        match self {
            GameOverReason::OutOfLives => "Out of lives",
            GameOverReason::OutOfFuel => "Out of fuel",
        }
    }
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    Paused,
    LevelComplete,
    GameOver(GameOverReason),
}

impl GamePhase {
    /// `LevelComplete` or `GameOver`
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::LevelComplete | GamePhase::GameOver(_))
    }
}

/// Bounded fuel tank (driving level only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub amount: f32,
    pub capacity: f32,
}

impl Tank {
    /// A full tank
    pub fn full(capacity: f32) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            amount: capacity,
            capacity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount <= 0.0
    }

    /// Fraction remaining, 0..=1
    pub fn ratio(&self) -> f32 {
        if self.capacity > 0.0 {
            self.amount / self.capacity
        } else {
            0.0
        }
    }

    pub fn add(&mut self, amount: f32) {
        self.amount = (self.amount + amount).clamp(0.0, self.capacity);
    }

    /// Remove fuel. Returns true if the tank is now empty.
    pub fn drain(&mut self, amount: f32) -> bool {
        self.add(-amount);
        self.is_empty()
    }
}

/// Score and resources for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub phase: GamePhase,
    /// Monotonic; doubles as the score
    pub distance: f32,
    pub win_distance: f32,
    pub lives: u8,
    pub max_lives: u8,
    pub fuel: Option<Tank>,
    pub kills: u32,
    pub cars_avoided: u32,
    /// Frames spent in `Running`
    pub frames: u64,
}

impl Progress {
    pub fn new(lives: u8, max_lives: u8, win_distance: f32, fuel: Option<Tank>) -> Self {
        Self {
            phase: GamePhase::Running,
            distance: 0.0,
            win_distance,
            lives: lives.min(max_lives),
            max_lives,
            fuel,
            kills: 0,
            cars_avoided: 0,
            frames: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn add_distance(&mut self, amount: f32) {
        if amount > 0.0 {
            self.distance += amount;
        }
    }

    /// Remove one life. Returns true if none are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    /// Add one life up to the cap. Returns true if it changed anything.
    pub fn gain_life(&mut self) -> bool {
        if self.lives < self.max_lives {
            self.lives += 1;
            true
        } else {
            false
        }
    }

    pub fn reached_goal(&self) -> bool {
        self.distance >= self.win_distance
    }

    /// Toggle `Running <-> Paused`. Returns the new phase, or `None` when
    /// terminal.
    pub fn toggle_pause(&mut self) -> Option<GamePhase> {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            _ => return None,
        };
        Some(self.phase)
    }

    /// Enter `LevelComplete`. Returns false if already terminal.
    pub fn complete(&mut self) -> bool {
        self.finish(GamePhase::LevelComplete)
    }

    /// Enter `GameOver`. Returns false if already terminal.
    pub fn fail(&mut self, reason: GameOverReason) -> bool {
        self.finish(GamePhase::GameOver(reason))
    }

    fn finish(&mut self, phase: GamePhase) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = phase;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_terminal_is_one_shot() {
        let mut p = Progress::new(3, 5, 600.0, None);
        assert!(p.fail(GameOverReason::OutOfLives));
        assert!(!p.fail(GameOverReason::OutOfFuel));
        assert!(!p.complete());
        assert_eq!(p.phase, GamePhase::GameOver(GameOverReason::OutOfLives));
        assert_eq!(p.toggle_pause(), None);
    }

    #[test]
    fn test_pause_toggle() {
        let mut p = Progress::new(3, 5, 600.0, None);
        assert_eq!(p.toggle_pause(), Some(GamePhase::Paused));
        assert!(!p.is_running());
        assert_eq!(p.toggle_pause(), Some(GamePhase::Running));
        assert!(p.complete());
        assert!(p.is_terminal());
    }

    #[test]
    fn test_lives_bounded() {
        let mut p = Progress::new(9, 5, 600.0, None);
        assert_eq!(p.lives, 5);
        assert!(!p.gain_life());
        for _ in 0..4 {
            assert!(!p.lose_life());
        }
        assert!(p.lose_life());
        assert!(p.lose_life());
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn test_tank_clamps() {
        let mut t = Tank::full(120.0);
        t.add(50.0);
        assert_eq!(t.amount, 120.0);
        assert!(!t.drain(100.0));
        assert!(t.drain(100.0));
        assert_eq!(t.amount, 0.0);
        assert_eq!(t.ratio(), 0.0);
    }

    #[test]
    fn test_distance_is_monotonic() {
        let mut p = Progress::new(3, 5, 10.0, None);
        p.add_distance(6.0);
        p.add_distance(-100.0);
        assert_eq!(p.distance, 6.0);
        assert!(!p.reached_goal());
        p.add_distance(4.0);
        assert!(p.reached_goal());
    }

    proptest! {
        #[test]
        fn prop_resources_stay_bounded(ops in proptest::collection::vec((0u8..4, 0.0f32..60.0), 0..200)) {
            let mut p = Progress::new(3, 5, 600.0, Some(Tank::full(100.0)));
            for (op, amount) in ops {
                match op {
                    0 => { p.lose_life(); }
                    1 => { p.gain_life(); }
                    2 => { if let Some(t) = p.fuel.as_mut() { t.add(amount); } }
                    _ => { if let Some(t) = p.fuel.as_mut() { t.drain(amount); } }
                }
                prop_assert!(p.lives <= p.max_lives);
                let t = p.fuel.unwrap_or(Tank::full(0.0));
                prop_assert!(t.amount >= 0.0 && t.amount <= t.capacity);
            }
        }
    }
}
