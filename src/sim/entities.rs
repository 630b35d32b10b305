//! Pooled entity kinds
//!
//! A closed set of kinds, each implementing [`Entity`]. Behaviour is chosen
//! by matching on the kind tag, never by per-instance callbacks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Entity;
use super::rect::Aabb;
use crate::consts::DESPAWN_MARGIN;

/// Scroll direction of a level's world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    /// Side-scrolling: the world moves toward the left edge
    Left,
    /// Top-down driving: the world moves toward the bottom edge
    Down,
}

impl Heading {
    pub fn vector(self) -> Vec2 {
        match self {
            Heading::Left => Vec2::NEG_X,
            Heading::Down => Vec2::Y,
        }
    }
}

/// Enemy subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Ground brute, fast
    Monster,
    /// Hops periodically
    Jumper,
    /// Highway traffic
    Racer,
    /// Highway traffic that shoots down its lane
    Police,
}

impl EnemyKind {
    /// Multiplier on the base scroll speed
    pub fn speed_mult(self) -> f32 {
        match self {
            EnemyKind::Monster => 1.5,
            EnemyKind::Jumper => 1.2,
            EnemyKind::Racer | EnemyKind::Police => 1.0,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            EnemyKind::Monster => Vec2::new(80.0, 80.0),
            EnemyKind::Jumper => Vec2::new(70.0, 100.0),
            EnemyKind::Racer | EnemyKind::Police => Vec2::new(60.0, 100.0),
        }
    }

    pub fn hp(self) -> u8 {
        match self {
            EnemyKind::Police => 2,
            _ => 1,
        }
    }

    /// Whether touching the player destroys this enemy.
    /// Street enemies stay and hurt again once invulnerability lapses.
    pub fn consumed_on_contact(self) -> bool {
        matches!(self, EnemyKind::Racer | EnemyKind::Police)
    }

    pub fn fires(self) -> bool {
        self == EnemyKind::Police
    }
}

/// Vertical hop state for `Jumper`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hop {
    pub vel_y: f32,
    pub ground_y: f32,
    pub gravity: f32,
    pub impulse: f32,
    /// Frames since the last landing
    pub timer: u32,
    /// Frames on the ground between hops
    pub every: u32,
}

impl Hop {
    fn on_ground(&self, y: f32) -> bool {
        self.vel_y == 0.0 && y >= self.ground_y
    }
}

/// A hazard that moves with the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Aabb,
    pub heading: Heading,
    /// Multiplier on the base speed (kind, difficulty and jitter folded in)
    pub speed_scale: f32,
    pub hp: u8,
    pub hop: Option<Hop>,
    /// Frames until the next shot, for kinds that fire
    pub fire_cooldown: Option<u32>,
}

impl Enemy {
    /// Take one hit. Returns true if this destroyed the enemy.
    pub fn hit(&mut self) -> bool {
        self.hp = self.hp.saturating_sub(1);
        self.hp == 0
    }

    /// True on the frame a firing enemy is ready; rearms with `interval`
    pub fn try_fire(&mut self, interval: u32) -> bool {
        match self.fire_cooldown {
            Some(0) => {
                self.fire_cooldown = Some(interval);
                true
            }
            _ => false,
        }
    }
}

impl Entity for Enemy {
    fn bounds(&self) -> Aabb {
        self.body
    }

    fn advance(&mut self, base_speed: f32) {
        self.body.pos += self.heading.vector() * base_speed * self.speed_scale;

        if let Some(hop) = self.hop.as_mut() {
            if hop.on_ground(self.body.pos.y) {
                hop.timer += 1;
                if hop.timer > hop.every {
                    hop.vel_y = hop.impulse;
                    hop.timer = 0;
                }
            }
            if hop.vel_y != 0.0 || self.body.pos.y < hop.ground_y {
                hop.vel_y += hop.gravity;
                self.body.pos.y += hop.vel_y;
                if self.body.pos.y >= hop.ground_y {
                    self.body.pos.y = hop.ground_y;
                    hop.vel_y = 0.0;
                }
            }
        }

        if let Some(cooldown) = self.fire_cooldown.as_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    fn is_expired(&self, view: &Aabb) -> bool {
        self.hp == 0 || self.body.outside(view, DESPAWN_MARGIN)
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A bullet travelling at its own fixed velocity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub owner: Owner,
    pub body: Aabb,
    pub vel: Vec2,
}

impl Entity for Projectile {
    fn bounds(&self) -> Aabb {
        self.body
    }

    fn advance(&mut self, _base_speed: f32) {
        self.body.pos += self.vel;
    }

    fn is_expired(&self, view: &Aabb) -> bool {
        self.body.outside(view, crate::consts::SPAWN_MARGIN)
    }
}

/// Pickup effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Fills energy and readies the special
    Energy,
    /// One extra life
    Heart,
    /// Highway fuel can
    Fuel,
}

impl PickupKind {
    pub fn speed_mult(self) -> f32 {
        match self {
            PickupKind::Energy => 0.8,
            PickupKind::Heart => 0.6,
            PickupKind::Fuel => 1.0,
        }
    }

    pub fn size(self) -> Vec2 {
        match self {
            PickupKind::Energy => Vec2::splat(40.0),
            PickupKind::Heart => Vec2::splat(25.0),
            PickupKind::Fuel => Vec2::new(30.0, 40.0),
        }
    }
}

/// A collectible drifting with the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    pub body: Aabb,
    pub heading: Heading,
}

impl Entity for Pickup {
    fn bounds(&self) -> Aabb {
        self.body
    }

    fn advance(&mut self, base_speed: f32) {
        self.body.pos += self.heading.vector() * base_speed * self.kind.speed_mult();
    }

    fn is_expired(&self, view: &Aabb) -> bool {
        self.body.outside(view, DESPAWN_MARGIN)
    }
}

/// Background scenery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropKind {
    Building,
    Sign,
    Tree,
    Rock,
}

/// Non-colliding scenery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prop {
    pub id: u32,
    pub kind: PropKind,
    pub body: Aabb,
    pub heading: Heading,
    /// Depth factor: 1.0 moves with the ground
    pub parallax: f32,
}

impl Entity for Prop {
    fn bounds(&self) -> Aabb {
        self.body
    }

    fn advance(&mut self, base_speed: f32) {
        self.body.pos += self.heading.vector() * base_speed * self.parallax;
    }

    fn is_expired(&self, view: &Aabb) -> bool {
        self.body.outside(view, DESPAWN_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Aabb {
        Aabb::new(0.0, 0.0, 800.0, 600.0)
    }

    fn jumper(every: u32) -> Enemy {
        Enemy {
            id: 1,
            kind: EnemyKind::Jumper,
            body: Aabb::new(850.0, 460.0, 70.0, 100.0),
            heading: Heading::Left,
            speed_scale: 1.2,
            hp: 1,
            hop: Some(Hop {
                vel_y: 0.0,
                ground_y: 460.0,
                gravity: 0.6,
                impulse: -12.0,
                timer: 0,
                every,
            }),
            fire_cooldown: None,
        }
    }

    #[test]
    fn test_enemy_scrolls_left_at_scaled_speed() {
        let mut e = jumper(1000);
        e.advance(4.0);
        assert!((e.body.pos.x - (850.0 - 4.8)).abs() < 1e-4);
        assert_eq!(e.body.pos.y, 460.0);
    }

    #[test]
    fn test_jumper_hops_and_lands() {
        let mut e = jumper(3);
        let mut airborne = false;
        for _ in 0..100 {
            e.advance(0.0);
            let y = e.body.pos.y;
            assert!(y <= 460.0);
            if y < 460.0 {
                airborne = true;
            }
        }
        assert!(airborne);
    }

    #[test]
    fn test_enemy_expires_off_left_edge_or_dead() {
        let mut e = jumper(1000);
        assert!(!e.is_expired(&view()));
        e.body.pos.x = -200.0;
        assert!(e.is_expired(&view()));
        e.body.pos.x = 400.0;
        assert!(e.hit());
        assert!(e.is_expired(&view()));
    }

    #[test]
    fn test_police_fire_cycle() {
        let mut e = Enemy {
            id: 2,
            kind: EnemyKind::Police,
            body: Aabb::new(300.0, -120.0, 60.0, 100.0),
            heading: Heading::Down,
            speed_scale: 1.0,
            hp: EnemyKind::Police.hp(),
            hop: None,
            fire_cooldown: Some(2),
        };
        assert!(!e.try_fire(5));
        e.advance(1.0);
        e.advance(1.0);
        assert!(e.try_fire(5));
        assert_eq!(e.fire_cooldown, Some(5));
        assert!(!e.hit());
        assert!(e.hit());
    }

    #[test]
    fn test_projectile_ignores_base_speed() {
        let mut p = Projectile {
            id: 3,
            owner: Owner::Player,
            body: Aabb::new(100.0, 100.0, 12.0, 6.0),
            vel: Vec2::new(10.0, 0.0),
        };
        p.advance(50.0);
        assert_eq!(p.body.pos.x, 110.0);
        p.body.pos.x = 900.0;
        assert!(p.is_expired(&view()));
    }

    #[test]
    fn test_contact_policy() {
        assert!(!EnemyKind::Monster.consumed_on_contact());
        assert!(!EnemyKind::Jumper.consumed_on_contact());
        assert!(EnemyKind::Racer.consumed_on_contact());
        assert!(EnemyKind::Police.consumed_on_contact());
    }
}
