//! Data-driven game balance
//!
//! Every gameplay number lives here so balance can be changed from JSON
//! without touching the simulation. All timers are in frames at
//! `consts::FRAMES_PER_SECOND`.

use serde::{Deserialize, Serialize};

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::error::ConfigError;

/// On-foot level physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerTuning {
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    /// Distance from the bottom edge to the player's top when grounded
    pub ground_offset: f32,
    pub gravity: f32,
    /// Upward (negative) velocity applied on jump
    pub jump_impulse: f32,
    pub win_distance: f32,
    /// Jumper enemies
    pub jumper_gravity: f32,
    pub jumper_impulse: f32,
}

impl Default for RunnerTuning {
    fn default() -> Self {
        Self {
            player_x: 100.0,
            player_width: 80.0,
            player_height: 120.0,
            ground_offset: 170.0,
            gravity: 0.8,
            jump_impulse: -18.0,
            win_distance: 600.0,
            jumper_gravity: 0.6,
            jumper_impulse: -12.0,
        }
    }
}

/// Driving level physics and fuel economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighwayTuning {
    pub car_width: f32,
    pub car_height: f32,
    /// Distance from the bottom edge to the car's top
    pub car_offset: f32,
    pub steer_speed: f32,
    /// Width of the roadside on each side of the corridor
    pub road_margin: f32,
    /// Lane centres for enemy cars
    pub lanes: Vec<f32>,
    pub base_fuel: f32,
    /// Leftover energy converted to bonus starting fuel
    pub energy_to_fuel: f32,
    pub fuel_drain: f32,
    pub fuel_pickup_amount: f32,
    pub boost_cost: f32,
    pub boost_frames: u32,
    pub boost_speed_mult: f32,
    pub enemy_fire_frames: u32,
    pub enemy_bullet_speed: f32,
    pub win_distance: f32,
}

impl Default for HighwayTuning {
    fn default() -> Self {
        Self {
            car_width: 70.0,
            car_height: 110.0,
            car_offset: 130.0,
            steer_speed: 8.0,
            road_margin: 200.0,
            lanes: vec![220.0, 360.0, 510.0],
            base_fuel: 100.0,
            energy_to_fuel: 0.5,
            fuel_drain: 0.03,
            fuel_pickup_amount: 25.0,
            boost_cost: 20.0,
            boost_frames: 120,
            boost_speed_mult: 1.5,
            enemy_fire_frames: 75,
            enemy_bullet_speed: 7.0,
            win_distance: 2000.0,
        }
    }
}

/// Spawn timers and subtype weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub enemy_frames: u32,
    pub highway_enemy_frames: u32,
    pub power_up_frames: u32,
    pub collectible_frames: u32,
    pub fuel_frames: u32,
    pub prop_frames: u32,
    /// Spawn intervals never shrink below this
    pub min_interval_frames: u32,
    /// Distance that adds +1.0 to the difficulty multiplier
    pub difficulty_ramp: f32,
    pub max_difficulty: f32,
    /// Share of `Monster` among Streets enemies (rest are `Jumper`)
    pub monster_weight: f64,
    /// Share of `Police` among Highway enemies (rest are `Racer`)
    pub police_weight: f64,
    /// Random extra speed added to enemies, in base-speed units
    pub speed_jitter: f32,
    /// Enemy speed gained per point of difficulty above 1.0
    pub speed_per_difficulty: f32,
    pub target_props: usize,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            enemy_frames: 120,
            highway_enemy_frames: 90,
            power_up_frames: 900,
            collectible_frames: 300,
            fuel_frames: 600,
            prop_frames: 45,
            min_interval_frames: 30,
            difficulty_ramp: 1000.0,
            max_difficulty: 3.0,
            monster_weight: 0.4,
            police_weight: 0.5,
            speed_jitter: 0.5,
            speed_per_difficulty: 0.25,
            target_props: 12,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub view_width: f32,
    pub view_height: f32,
    pub base_game_speed: f32,
    /// Distance gained per frame per unit of game speed
    pub distance_rate: f32,
    pub max_lives: u8,
    pub starting_lives: u8,
    pub max_energy: f32,
    /// Passive energy gain per frame (0 disables)
    pub energy_regen: f32,
    pub invulnerability_frames: u32,
    pub special_frames: u32,
    pub kill_reward_distance: f32,
    pub kill_reward_energy: f32,
    pub shoot_cooldown_frames: u32,
    pub bullet_speed: f32,
    pub runner: RunnerTuning,
    pub highway: HighwayTuning,
    pub spawn: SpawnTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,
            base_game_speed: 4.0,
            distance_rate: 0.1,
            max_lives: 5,
            starting_lives: 5,
            max_energy: 100.0,
            energy_regen: 0.0,
            invulnerability_frames: 120,
            special_frames: 600,
            kill_reward_distance: 10.0,
            kill_reward_energy: 10.0,
            shoot_cooldown_frames: 20,
            bullet_speed: 10.0,
            runner: RunnerTuning::default(),
            highway: HighwayTuning::default(),
            spawn: SpawnTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    requirement: "positive",
                    value,
                })
            }
        }

        positive("view_width", self.view_width)?;
        positive("view_height", self.view_height)?;
        positive("base_game_speed", self.base_game_speed)?;
        positive("max_energy", self.max_energy)?;
        positive("max_lives", self.max_lives as f32)?;
        positive(
            "spawn.min_interval_frames",
            self.spawn.min_interval_frames as f32,
        )?;
        positive("spawn.difficulty_ramp", self.spawn.difficulty_ramp)?;
        positive("runner.gravity", self.runner.gravity)?;
        positive("highway.base_fuel", self.highway.base_fuel)?;

        if self.spawn.max_difficulty < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "spawn.max_difficulty",
                requirement: "at least 1.0",
                value: self.spawn.max_difficulty,
            });
        }
        if self.runner.jump_impulse >= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "runner.jump_impulse",
                requirement: "negative (upward)",
                value: self.runner.jump_impulse,
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::OutOfRange {
                field: "starting_lives",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        if self.starting_lives > self.max_lives {
            return Err(ConfigError::OutOfRange {
                field: "starting_lives",
                requirement: "at most max_lives",
                value: self.starting_lives as f32,
            });
        }
        if self.highway.lanes.is_empty() {
            return Err(ConfigError::OutOfRange {
                field: "highway.lanes",
                requirement: "non-empty",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// Y coordinate of the grounded player's top edge
    pub fn ground_y(&self) -> f32 {
        self.view_height - self.runner.ground_offset
    }

    /// Y coordinate everything on foot stands on
    pub fn ground_line(&self) -> f32 {
        self.ground_y() + self.runner.player_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_game_speed": 6.0, "runner": { "win_distance": 300.0 } }"#)
            .unwrap();
        assert_eq!(tuning.base_game_speed, 6.0);
        assert_eq!(tuning.runner.win_distance, 300.0);
        assert_eq!(tuning.runner.gravity, 0.8);
        assert_eq!(tuning.spawn.enemy_frames, 120);
    }

    #[test]
    fn test_zero_starting_lives_rejected() {
        let err = Tuning::from_json(r#"{ "starting_lives": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "starting_lives",
                requirement: "at least 1",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_spawn_floor_rejected() {
        let err = Tuning::from_json(r#"{ "spawn": { "min_interval_frames": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "spawn.min_interval_frames",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_downward_jump_rejected() {
        let mut tuning = Tuning::default();
        tuning.runner.jump_impulse = 5.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_ground_y() {
        let tuning = Tuning::default();
        assert_eq!(tuning.ground_y(), 430.0);
        assert_eq!(tuning.ground_line(), 550.0);
    }
}
