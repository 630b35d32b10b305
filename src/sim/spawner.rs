//! Timer-driven spawning
//!
//! One frame-counted timer per entity class. Enemy intervals shrink as
//! difficulty rises with distance, never below `min_interval_frames`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, EnemyKind, Heading, Hop, Pickup, PickupKind, Prop, PropKind};
use super::rect::Aabb;
use super::state::Level;
use crate::tuning::{SpawnTuning, Tuning};

/// Difficulty multiplier for a distance: 1.0 at the start, non-decreasing,
/// capped at `max_difficulty`
pub fn difficulty(distance: f32, spawn: &SpawnTuning) -> f32 {
    let ramp = spawn.difficulty_ramp.max(f32::EPSILON);
    (1.0 + distance.max(0.0) / ramp).min(spawn.max_difficulty.max(1.0))
}

/// Frames between spawns for a base interval at a difficulty, floored
pub fn spawn_interval(base_frames: u32, difficulty: f32, floor: u32) -> u32 {
    let scaled = (base_frames as f32 / difficulty.max(1.0)).round() as u32;
    scaled.max(floor.max(1))
}

/// A single countdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub elapsed: u32,
}

impl SpawnTimer {
    /// Count one frame. Returns true (and resets) once `interval` is reached.
    pub fn tick(&mut self, interval: u32) -> bool {
        self.elapsed += 1;
        if self.elapsed >= interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Which classes are due this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub enemy: bool,
    pub power_up: bool,
    pub collectible: bool,
    pub fuel: bool,
    pub prop: bool,
}

/// Per-class spawn timers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    pub enemy: SpawnTimer,
    pub power_up: SpawnTimer,
    pub collectible: SpawnTimer,
    pub fuel: SpawnTimer,
    pub prop: SpawnTimer,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every timer that applies to `level`
    pub fn tick(&mut self, level: Level, distance: f32, spawn: &SpawnTuning) -> Due {
        let floor = spawn.min_interval_frames;
        let diff = difficulty(distance, spawn);
        let enemy_base = match level {
            Level::Streets => spawn.enemy_frames,
            Level::Highway => spawn.highway_enemy_frames,
        };

        Due {
            enemy: self.enemy.tick(spawn_interval(enemy_base, diff, floor)),
            power_up: level == Level::Streets
                && self.power_up.tick(spawn_interval(spawn.power_up_frames, 1.0, floor)),
            collectible: self
                .collectible
                .tick(spawn_interval(spawn.collectible_frames, 1.0, floor)),
            fuel: level == Level::Highway
                && self.fuel.tick(spawn_interval(spawn.fuel_frames, 1.0, floor)),
            prop: self.prop.tick(spawn.prop_frames.max(1)),
        }
    }
}

fn random_lane(rng: &mut impl Rng, tuning: &Tuning) -> f32 {
    let lanes = &tuning.highway.lanes;
    if lanes.is_empty() {
        return tuning.view_width / 2.0;
    }
    lanes[rng.random_range(0..lanes.len())]
}

/// Build an enemy just past the trailing edge
pub fn make_enemy(
    rng: &mut impl Rng,
    tuning: &Tuning,
    level: Level,
    id: u32,
    distance: f32,
) -> Enemy {
    let spawn = &tuning.spawn;
    let diff = difficulty(distance, spawn);
    let kind = match level {
        Level::Streets if rng.random_bool(spawn.monster_weight.clamp(0.0, 1.0)) => {
            EnemyKind::Monster
        }
        Level::Streets => EnemyKind::Jumper,
        Level::Highway if rng.random_bool(spawn.police_weight.clamp(0.0, 1.0)) => {
            EnemyKind::Police
        }
        Level::Highway => EnemyKind::Racer,
    };
    let size = kind.size();
    let jitter = if spawn.speed_jitter > 0.0 {
        rng.random_range(0.0..spawn.speed_jitter)
    } else {
        0.0
    };
    let speed_scale =
        kind.speed_mult() + jitter + (diff - 1.0) * spawn.speed_per_difficulty;

    let (pos, heading) = match level {
        Level::Streets => (
            Vec2::new(tuning.view_width, tuning.ground_line() - size.y),
            Heading::Left,
        ),
        Level::Highway => (
            Vec2::new(random_lane(rng, tuning) - size.x / 2.0, -size.y),
            Heading::Down,
        ),
    };

    let hop = (kind == EnemyKind::Jumper).then(|| Hop {
        vel_y: 0.0,
        ground_y: pos.y,
        gravity: tuning.runner.jumper_gravity,
        impulse: tuning.runner.jumper_impulse,
        timer: 0,
        every: rng.random_range(40..90),
    });

    Enemy {
        id,
        kind,
        body: Aabb { pos, size },
        heading,
        speed_scale,
        hp: kind.hp(),
        hop,
        fire_cooldown: kind.fires().then_some(tuning.highway.enemy_fire_frames / 2),
    }
}

/// Build a pickup just past the trailing edge
pub fn make_pickup(
    rng: &mut impl Rng,
    tuning: &Tuning,
    level: Level,
    kind: PickupKind,
    id: u32,
) -> Pickup {
    let size = kind.size();
    let (pos, heading) = match level {
        Level::Streets => {
            // Floating within jump reach above the ground strip
            let top = (tuning.ground_y() - 150.0).max(0.0);
            let bottom = (tuning.ground_line() - size.y).max(top + 1.0);
            (
                Vec2::new(tuning.view_width, rng.random_range(top..bottom)),
                Heading::Left,
            )
        }
        Level::Highway => (
            Vec2::new(random_lane(rng, tuning) - size.x / 2.0, -size.y),
            Heading::Down,
        ),
    };
    Pickup {
        id,
        kind,
        body: Aabb { pos, size },
        heading,
    }
}

/// Build a background prop. `scatter` places it anywhere along the scroll
/// axis (initial fill) instead of just past the trailing edge.
pub fn make_prop(rng: &mut impl Rng, tuning: &Tuning, level: Level, id: u32, scatter: bool) -> Prop {
    match level {
        Level::Streets => {
            let kind = if rng.random_bool(0.1) {
                PropKind::Sign
            } else {
                PropKind::Building
            };
            let size = match kind {
                PropKind::Sign => Vec2::new(120.0, 60.0),
                _ => Vec2::new(rng.random_range(60.0..140.0), rng.random_range(120.0..300.0)),
            };
            let x = if scatter {
                rng.random_range(0.0..tuning.view_width)
            } else {
                tuning.view_width
            };
            Prop {
                id,
                kind,
                body: Aabb {
                    pos: Vec2::new(x, tuning.ground_line() - size.y),
                    size,
                },
                heading: Heading::Left,
                parallax: 0.5,
            }
        }
        Level::Highway => {
            let kind = if rng.random_bool(0.7) {
                PropKind::Tree
            } else {
                PropKind::Rock
            };
            let size = match kind {
                PropKind::Tree => Vec2::new(40.0, 60.0),
                _ => Vec2::new(30.0, 25.0),
            };
            let margin = tuning.highway.road_margin;
            let span = (margin - size.x).max(1.0);
            let offset = rng.random_range(0.0..span);
            let x = if rng.random_bool(0.5) {
                offset
            } else {
                tuning.view_width - margin + offset
            };
            let y = if scatter {
                rng.random_range(-size.y..tuning.view_height)
            } else {
                -size.y
            };
            Prop {
                id,
                kind,
                body: Aabb {
                    pos: Vec2::new(x, y),
                    size,
                },
                heading: Heading::Down,
                parallax: 1.0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_difficulty_ramps_and_caps() {
        let spawn = SpawnTuning::default();
        assert_eq!(difficulty(0.0, &spawn), 1.0);
        assert!((difficulty(500.0, &spawn) - 1.5).abs() < 1e-6);
        assert_eq!(difficulty(1.0e9, &spawn), 3.0);
    }

    #[test]
    fn test_timer_fires_on_interval() {
        let mut t = SpawnTimer::default();
        let fired: Vec<bool> = (0..6).map(|_| t.tick(3)).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn test_level_specific_classes() {
        let mut tuning = SpawnTuning::default();
        tuning.power_up_frames = 1;
        tuning.fuel_frames = 1;
        tuning.min_interval_frames = 1;

        let mut s = Spawner::new();
        let due = s.tick(Level::Streets, 0.0, &tuning);
        assert!(due.power_up);
        assert!(!due.fuel);

        let mut s = Spawner::new();
        let due = s.tick(Level::Highway, 0.0, &tuning);
        assert!(!due.power_up);
        assert!(due.fuel);
    }

    #[test]
    fn test_streets_enemy_spawns_right_of_view_on_ground() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for id in 0..50 {
            let e = make_enemy(&mut rng, &tuning, Level::Streets, id, 0.0);
            assert!(matches!(e.kind, EnemyKind::Monster | EnemyKind::Jumper));
            assert_eq!(e.body.left(), tuning.view_width);
            assert_eq!(e.body.bottom(), 550.0);
            assert_eq!(e.heading, Heading::Left);
            assert_eq!(e.hop.is_some(), e.kind == EnemyKind::Jumper);
            assert!(e.speed_scale >= e.kind.speed_mult());
        }
    }

    #[test]
    fn test_highway_enemy_spawns_above_view_in_a_lane() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let mut saw_police = false;
        for id in 0..50 {
            let e = make_enemy(&mut rng, &tuning, Level::Highway, id, 0.0);
            assert_eq!(e.body.bottom(), 0.0);
            assert!(tuning.highway.lanes.contains(&e.body.center().x));
            if e.kind == EnemyKind::Police {
                saw_police = true;
                assert_eq!(e.hp, 2);
                assert!(e.fire_cooldown.is_some());
            }
        }
        assert!(saw_police);
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let tuning = Tuning::default();
        let mut a = Pcg32::seed_from_u64(9);
        let mut b = Pcg32::seed_from_u64(9);
        for id in 0..10 {
            let ea = make_enemy(&mut a, &tuning, Level::Streets, id, 100.0);
            let eb = make_enemy(&mut b, &tuning, Level::Streets, id, 100.0);
            assert_eq!(ea.kind, eb.kind);
            assert_eq!(ea.speed_scale, eb.speed_scale);
        }
    }

    proptest! {
        #[test]
        fn prop_interval_never_below_floor(
            distance in 0.0f32..1.0e12,
            base in 0u32..10_000,
            floor in 1u32..200,
            ramp in 1.0f32..5000.0,
            cap in 1.0f32..100.0,
        ) {
            let spawn = SpawnTuning {
                difficulty_ramp: ramp,
                max_difficulty: cap,
                min_interval_frames: floor,
                ..SpawnTuning::default()
            };
            let interval = spawn_interval(base, difficulty(distance, &spawn), floor);
            prop_assert!(interval >= floor);
        }

        #[test]
        fn prop_difficulty_non_decreasing(a in 0.0f32..1.0e6, b in 0.0f32..1.0e6) {
            let spawn = SpawnTuning::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(difficulty(lo, &spawn) <= difficulty(hi, &spawn));
        }
    }
}
