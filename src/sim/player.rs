//! The player avatar
//!
//! One per session, never re-created. Damage respawns in place behind an
//! invulnerability window.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Aabb;
use crate::tuning::Tuning;

/// Movement model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Motion {
    /// On foot: gravity and a jump impulse. `on_ground` implies `vel_y == 0`.
    Runner {
        vel_y: f32,
        on_ground: bool,
        ground_y: f32,
        gravity: f32,
        jump_impulse: f32,
    },
    /// Driving: horizontal steering inside `[min_x, max_x]`
    Vehicle {
        min_x: f32,
        max_x: f32,
        steer_speed: f32,
    },
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Aabb,
    pub motion: Motion,
    pub energy: f32,
    pub max_energy: f32,
    pub can_use_special: bool,
    /// Frames of special/boost left (0 = inactive)
    pub special_timer: u32,
    /// Frames of invulnerability left (0 = vulnerable)
    pub invulnerable_timer: u32,
    pub shoot_cooldown: u32,
}

impl Player {
    /// On-foot avatar standing on the ground line
    pub fn runner(tuning: &Tuning) -> Self {
        let r = &tuning.runner;
        let ground_y = tuning.ground_y();
        Self::with_motion(
            Aabb::new(r.player_x, ground_y, r.player_width, r.player_height),
            Motion::Runner {
                vel_y: 0.0,
                on_ground: true,
                ground_y,
                gravity: r.gravity,
                jump_impulse: r.jump_impulse,
            },
            tuning.max_energy,
        )
    }

    /// Car centred on the road
    pub fn vehicle(tuning: &Tuning) -> Self {
        let h = &tuning.highway;
        let min_x = h.road_margin;
        let max_x = tuning.view_width - h.road_margin - h.car_width;
        Self::with_motion(
            Aabb::new(
                tuning.view_width / 2.0 - h.car_width / 2.0,
                tuning.view_height - h.car_offset,
                h.car_width,
                h.car_height,
            ),
            Motion::Vehicle {
                min_x,
                max_x: max_x.max(min_x),
                steer_speed: h.steer_speed,
            },
            tuning.max_energy,
        )
    }

    fn with_motion(body: Aabb, motion: Motion, max_energy: f32) -> Self {
        Self {
            body,
            motion,
            energy: 0.0,
            max_energy,
            can_use_special: false,
            special_timer: 0,
            invulnerable_timer: 0,
            shoot_cooldown: 0,
        }
    }

    pub fn on_ground(&self) -> bool {
        match self.motion {
            Motion::Runner { on_ground, .. } => on_ground,
            Motion::Vehicle { .. } => true,
        }
    }

    pub fn vel_y(&self) -> f32 {
        match self.motion {
            Motion::Runner { vel_y, .. } => vel_y,
            Motion::Vehicle { .. } => 0.0,
        }
    }

    /// Integrate one frame of gravity; snaps to the ground line on landing
    pub fn apply_gravity(&mut self) {
        if let Motion::Runner {
            vel_y,
            on_ground,
            ground_y,
            gravity,
            ..
        } = &mut self.motion
        {
            if *on_ground {
                return;
            }
            *vel_y += *gravity;
            self.body.pos.y += *vel_y;
            if self.body.pos.y >= *ground_y {
                self.body.pos.y = *ground_y;
                *vel_y = 0.0;
                *on_ground = true;
            }
        }
    }

    /// Start a jump if grounded. Returns true if the jump happened.
    pub fn jump(&mut self) -> bool {
        match &mut self.motion {
            Motion::Runner {
                vel_y,
                on_ground,
                jump_impulse,
                ..
            } if *on_ground => {
                *vel_y = *jump_impulse;
                *on_ground = false;
                true
            }
            _ => false,
        }
    }

    /// Steer a vehicle; `dir` is -1 (left), 0 or +1 (right)
    pub fn steer(&mut self, dir: f32) {
        if let Motion::Vehicle {
            min_x,
            max_x,
            steer_speed,
        } = self.motion
        {
            self.body.pos.x = (self.body.pos.x + dir * steer_speed).clamp(min_x, max_x);
        }
    }

    /// Where a fired projectile starts, and its unit direction
    pub fn muzzle(&self, projectile_size: Vec2) -> (Vec2, Vec2) {
        match self.motion {
            Motion::Runner { .. } => (
                Vec2::new(
                    self.body.right(),
                    self.body.center().y - projectile_size.y / 2.0,
                ),
                Vec2::X,
            ),
            Motion::Vehicle { .. } => (
                Vec2::new(
                    self.body.center().x - projectile_size.x / 2.0,
                    self.body.top() - projectile_size.y,
                ),
                Vec2::NEG_Y,
            ),
        }
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0
    }

    pub fn special_active(&self) -> bool {
        self.special_timer > 0
    }

    /// Accept a hit unless protected. On acceptance, opens the invulnerability
    /// window. Returns true if the hit should cost a life.
    pub fn absorb_hit(&mut self, invulnerability_frames: u32) -> bool {
        if self.is_invulnerable() || self.special_active() {
            return false;
        }
        self.invulnerable_timer = invulnerability_frames;
        true
    }

    /// Add energy, clamped. Returns true if this made the special ready.
    pub fn add_energy(&mut self, amount: f32) -> bool {
        self.energy = (self.energy + amount).clamp(0.0, self.max_energy);
        if self.energy >= self.max_energy && !self.can_use_special {
            self.can_use_special = true;
            return true;
        }
        false
    }

    /// Consume a ready special. Returns true if it activated.
    pub fn activate_special(&mut self, frames: u32) -> bool {
        if !self.can_use_special || self.special_active() {
            return false;
        }
        self.can_use_special = false;
        self.energy = 0.0;
        self.special_timer = frames;
        true
    }

    /// Start (or extend to) a boost window without touching energy
    pub fn start_boost(&mut self, frames: u32) {
        self.special_timer = self.special_timer.max(frames);
    }

    /// Fire if the cooldown has elapsed. Returns true if a shot should spawn.
    pub fn try_shoot(&mut self, cooldown: u32) -> bool {
        if self.shoot_cooldown > 0 {
            return false;
        }
        self.shoot_cooldown = cooldown;
        true
    }

    /// Count down per-frame timers. Returns true on the frame the special ends.
    pub fn tick_timers(&mut self) -> bool {
        self.invulnerable_timer = self.invulnerable_timer.saturating_sub(1);
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
        if self.special_timer > 0 {
            self.special_timer -= 1;
            return self.special_timer == 0;
        }
        false
    }
}
