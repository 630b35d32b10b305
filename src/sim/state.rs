//! Game state and core simulation types
//!
//! Everything one level of play owns lives in `GameState`. Outer layers read
//! it and drain `events`; only `tick` and `settle` mutate it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cutscene::Cutscene;
use super::effects::{BurstSpec, Effects, palette};
use super::entities::{Enemy, EnemyKind, Owner, Pickup, PickupKind, Projectile, Prop};
use super::player::Player;
use super::pool::Pool;
use super::progress::{GameOverReason, Progress, Tank};
use super::rect::Aabb;
use super::spawner::{self, Spawner};
use crate::tuning::Tuning;

/// Particle cap before settings are applied
pub const DEFAULT_MAX_PARTICLES: usize = 256;

const PLAYER_BULLET_SIZE: Vec2 = Vec2::new(12.0, 6.0);
const CAR_BULLET_SIZE: Vec2 = Vec2::new(6.0, 12.0);

/// Which stage is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// On-foot side-scroller
    Streets,
    /// Top-down driving
    Highway,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Streets => "streets",
            Level::Highway => "highway",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "streets" | "1" => Some(Level::Streets),
            "highway" | "2" => Some(Level::Highway),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Level::Streets => 1,
            Level::Highway => 2,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Level::Streets => Some(Level::Highway),
            Level::Highway => None,
        }
    }
}

/// Selectable avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Character {
    #[default]
    Juan,
    Kim,
    Julian,
    Jay,
}

impl Character {
    pub const ALL: [Character; 4] = [
        Character::Juan,
        Character::Kim,
        Character::Julian,
        Character::Jay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Character::Juan => "juan",
            Character::Kim => "kim",
            Character::Julian => "julian",
            Character::Jay => "jay",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Character::Juan => "Juan",
            Character::Kim => "Kim",
            Character::Julian => "Julian",
            Character::Jay => "Jay",
        }
    }
}

/// Something that happened during a frame, for audio/UI to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped,
    Shot,
    Damaged { lives: u8 },
    EnemyDestroyed { kind: EnemyKind },
    PickupCollected { kind: PickupKind },
    SpecialReady,
    SpecialActivated,
    SpecialEnded,
    Boosted,
    Paused,
    Resumed,
    GameOver { reason: GameOverReason },
    LevelComplete { level: Level },
    /// Cutscene finished; the next level can be loaded
    TransitionFinished,
}

/// Complete state of one level of play
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub level: Level,
    pub character: Character,
    pub tuning: Tuning,
    pub player: Player,
    pub progress: Progress,
    pub enemies: Pool<Enemy>,
    pub projectiles: Pool<Projectile>,
    pub pickups: Pool<Pickup>,
    pub props: Pool<Prop>,
    pub effects: Effects,
    pub spawner: Spawner,
    pub cutscene: Option<Cutscene>,
    /// Energy brought into the level. The highway spends it as fuel and
    /// hands it on unchanged.
    pub carried_energy: f32,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Start `level` with carried-over `lives` and `energy`.
    ///
    /// On the highway, energy is converted into starting fuel
    /// (`base_fuel + energy * energy_to_fuel`), which is also the tank size.
    pub fn new(
        seed: u64,
        tuning: Tuning,
        level: Level,
        character: Character,
        lives: u8,
        energy: f32,
    ) -> Self {
        let energy = energy.clamp(0.0, tuning.max_energy);
        let (player, win_distance, fuel) = match level {
            Level::Streets => (Player::runner(&tuning), tuning.runner.win_distance, None),
            Level::Highway => {
                let h = &tuning.highway;
                let capacity = h.base_fuel + energy * h.energy_to_fuel;
                (
                    Player::vehicle(&tuning),
                    h.win_distance,
                    Some(Tank::full(capacity)),
                )
            }
        };
        let lives = if lives == 0 { tuning.starting_lives } else { lives };

        let mut state = Self {
            seed,
            level,
            character,
            progress: Progress::new(lives, tuning.max_lives, win_distance, fuel),
            player,
            enemies: Pool::new(),
            projectiles: Pool::new(),
            pickups: Pool::new(),
            props: Pool::new(),
            effects: Effects::new(DEFAULT_MAX_PARTICLES),
            spawner: Spawner::new(),
            cutscene: None,
            carried_energy: energy,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        };

        if level == Level::Streets {
            // Streets keeps energy as energy; ready the special if it is full
            state.add_energy(energy);
            state.events.clear();
        }
        for _ in 0..state.tuning.spawn.target_props {
            state.spawn_prop(true);
        }
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Particle burst drawn from the session RNG
    pub fn burst(&mut self, origin: Vec2, spec: BurstSpec, colors: &[u32]) {
        self.effects.emit_burst(&mut self.rng, origin, spec, colors);
    }

    /// Visible world rectangle
    pub fn view(&self) -> Aabb {
        Aabb::new(0.0, 0.0, self.tuning.view_width, self.tuning.view_height)
    }

    /// Current scroll speed, including boost
    pub fn base_speed(&self) -> f32 {
        let speed = self.tuning.base_game_speed;
        if self.level == Level::Highway && self.player.special_active() {
            speed * self.tuning.highway.boost_speed_mult
        } else {
            speed
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn spawn_enemy(&mut self) {
        let id = self.next_entity_id();
        let enemy = spawner::make_enemy(
            &mut self.rng,
            &self.tuning,
            self.level,
            id,
            self.progress.distance,
        );
        log::debug!("spawned {:?} #{}", enemy.kind, id);
        self.enemies.insert(enemy);
    }

    pub fn spawn_pickup(&mut self, kind: PickupKind) {
        let id = self.next_entity_id();
        let pickup = spawner::make_pickup(&mut self.rng, &self.tuning, self.level, kind, id);
        log::debug!("spawned {:?} pickup #{}", kind, id);
        self.pickups.insert(pickup);
    }

    pub fn spawn_prop(&mut self, scatter: bool) {
        let id = self.next_entity_id();
        let prop = spawner::make_prop(&mut self.rng, &self.tuning, self.level, id, scatter);
        self.props.insert(prop);
    }

    /// Spawn a player bullet from the avatar's leading edge
    pub fn fire_player_projectile(&mut self) {
        let size = match self.level {
            Level::Streets => PLAYER_BULLET_SIZE,
            Level::Highway => CAR_BULLET_SIZE,
        };
        let (pos, dir) = self.player.muzzle(size);
        let id = self.next_entity_id();
        self.projectiles.insert(Projectile {
            id,
            owner: Owner::Player,
            body: Aabb { pos, size },
            vel: dir * self.tuning.bullet_speed,
        });
        let mut spec = BurstSpec::MUZZLE;
        spec.drift = dir * spec.drift.length();
        self.burst(pos, spec, palette::MUZZLE);
        self.events.push(GameEvent::Shot);
    }

    /// Spawn an enemy bullet travelling down the shooter's lane
    pub fn fire_enemy_projectile(&mut self, from: Aabb) {
        let id = self.next_entity_id();
        let pos = Vec2::new(from.center().x - CAR_BULLET_SIZE.x / 2.0, from.bottom());
        self.projectiles.insert(Projectile {
            id,
            owner: Owner::Enemy,
            body: Aabb {
                pos,
                size: CAR_BULLET_SIZE,
            },
            vel: Vec2::Y * self.tuning.highway.enemy_bullet_speed,
        });
    }

    /// Add energy and raise `SpecialReady` if it just became available
    pub fn add_energy(&mut self, amount: f32) {
        if self.player.add_energy(amount) {
            log::debug!("special ready");
            self.events.push(GameEvent::SpecialReady);
        }
    }

    /// Apply one hit to the player. Invulnerability and special mode are
    /// checked fresh on every call. Returns true if a life was lost.
    pub fn take_damage(&mut self) -> bool {
        if self.progress.is_terminal() {
            return false;
        }
        if !self.player.absorb_hit(self.tuning.invulnerability_frames) {
            return false;
        }
        let dead = self.progress.lose_life();
        self.events.push(GameEvent::Damaged {
            lives: self.progress.lives,
        });
        self.effects.emit_screen_shake(10.0, 20);
        self.effects.emit_flash(0xFF0000, 0.4, 15);
        if dead {
            self.game_over(GameOverReason::OutOfLives);
        }
        true
    }

    /// Enter `GameOver` (once)
    pub fn game_over(&mut self, reason: GameOverReason) {
        if !self.progress.fail(reason) {
            return;
        }
        log::info!(
            "game over ({}) at distance {:.0}",
            reason.message(),
            self.progress.distance
        );
        let origin = self.player.body.center();
        self.burst(origin, BurstSpec::CRASH, palette::CRASH);
        self.events.push(GameEvent::GameOver { reason });
    }

    /// Enter `LevelComplete` (once); the on-foot level starts its cutscene
    pub fn complete_level(&mut self) {
        if !self.progress.complete() {
            return;
        }
        log::info!(
            "level {} complete at distance {:.0}",
            self.level.number(),
            self.progress.distance
        );
        self.effects.emit_flash(0xFFFFFF, 0.6, 30);
        if self.level == Level::Streets {
            self.cutscene = Some(Cutscene::new(
                self.tuning.view_width,
                self.tuning.ground_line(),
            ));
        }
        self.events.push(GameEvent::LevelComplete { level: self.level });
    }

    /// One frame of post-simulation animation: effects decay and the
    /// cutscene, nothing else
    pub fn settle(&mut self) {
        self.effects.decay(&mut self.rng);
        if let Some(cutscene) = self.cutscene.as_mut() {
            if cutscene.advance(&mut self.player.body) {
                self.events.push(GameEvent::TransitionFinished);
            }
        }
    }

    /// Nothing left to animate
    pub fn is_settled(&self) -> bool {
        self.effects.is_idle() && self.cutscene.as_ref().is_none_or(Cutscene::is_done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streets() -> GameState {
        GameState::new(42, Tuning::default(), Level::Streets, Character::Kim, 5, 0.0)
    }

    #[test]
    fn test_new_streets_state() {
        let state = streets();
        assert_eq!(state.progress.lives, 5);
        assert!(state.progress.fuel.is_none());
        assert_eq!(state.props.len(), 12);
        assert!(state.events.is_empty());
        assert!(state.player.on_ground());
    }

    #[test]
    fn test_highway_fuel_from_energy() {
        let state = GameState::new(1, Tuning::default(), Level::Highway, Character::Jay, 3, 60.0);
        let tank = state.progress.fuel.unwrap();
        assert_eq!(tank.capacity, 130.0);
        assert_eq!(tank.amount, 130.0);
        assert_eq!(state.player.energy, 0.0);
        assert_eq!(state.progress.lives, 3);
    }

    #[test]
    fn test_zero_carried_lives_fall_back() {
        let state = GameState::new(1, Tuning::default(), Level::Streets, Character::Juan, 0, 0.0);
        assert_eq!(state.progress.lives, 5);
    }

    #[test]
    fn test_fatal_damage_raises_game_over_once() {
        let mut state = GameState::new(1, Tuning::default(), Level::Streets, Character::Juan, 1, 0.0);
        assert!(state.take_damage());
        assert_eq!(state.progress.lives, 0);
        state.player.invulnerable_timer = 0;
        assert!(!state.take_damage());
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_repeat_damage_suppressed() {
        let mut state = streets();
        assert!(state.take_damage());
        assert!(!state.take_damage());
        assert_eq!(state.progress.lives, 4);
    }

    #[test]
    fn test_complete_level_starts_cutscene() {
        let mut state = streets();
        state.complete_level();
        state.complete_level();
        assert!(state.cutscene.is_some());
        assert!(!state.is_settled());
        let completes = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelComplete { .. }))
            .count();
        assert_eq!(completes, 1);
    }

    #[test]
    fn test_settle_finishes_cutscene() {
        let mut state = streets();
        state.complete_level();
        state.drain_events();
        let lives = state.progress.lives;
        for _ in 0..400 {
            state.settle();
        }
        assert!(state.is_settled());
        assert_eq!(state.progress.lives, lives);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::TransitionFinished]
        );
    }

    #[test]
    fn test_level_and_character_names() {
        for c in Character::ALL {
            assert_eq!(Character::from_str(c.as_str()), Some(c));
        }
        assert_eq!(Character::from_str("nobody"), None);
        assert_eq!(Level::from_str("2"), Some(Level::Highway));
        assert_eq!(Level::from_str(Level::Streets.as_str()), Some(Level::Streets));
        assert_eq!(Level::Streets.next(), Some(Level::Highway));
    }
}
