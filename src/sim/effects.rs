//! Transient visual effects
//!
//! Particles are pooled and capped. Screen shake and flash are singletons:
//! a new emission overwrites the active one instead of stacking.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pool::{Entity, Pool};
use super::rect::Aabb;

/// Packed 0xRRGGBB colours used by the effect palettes
pub mod palette {
    pub const EXPLOSION: &[u32] = &[0xFF4500, 0xFF6347, 0xFFD700, 0xFFA500, 0xFF0000];
    pub const SPARK: &[u32] = &[0xFFFFFF];
    pub const DUST: &[u32] = &[0x8B4513];
    pub const MUZZLE: &[u32] = &[0xFFFF00];
    pub const ENERGY: &[u32] = &[0xFFD700];
    pub const HEART: &[u32] = &[0x228B22, 0x32CD32];
    pub const FUEL: &[u32] = &[0x00BFFF];
    pub const FLAME: &[u32] = &[0xFFA500, 0xFF4500];
    pub const CRASH: &[u32] = &[0xFFD700, 0xFFD700, 0x888888];
}

/// A single decaying particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub size: f32,
    /// Frames left
    pub life: f32,
    pub max_life: f32,
    /// Downward acceleration per frame
    pub gravity: f32,
}

impl Particle {
    /// Remaining opacity (1 at birth, 0 at death)
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

impl Entity for Particle {
    fn bounds(&self) -> Aabb {
        Aabb {
            pos: self.pos - Vec2::splat(self.size / 2.0),
            size: Vec2::splat(self.size),
        }
    }

    fn advance(&mut self, _base_speed: f32) {
        self.pos += self.vel;
        self.vel.y += self.gravity;
        self.vel *= 0.95;
        self.life -= 1.0;
    }

    fn is_expired(&self, _view: &Aabb) -> bool {
        self.life <= 0.0
    }
}

/// Shape of a particle burst
#[derive(Debug, Clone, Copy)]
pub struct BurstSpec {
    pub count: usize,
    /// Velocity range per axis is `[-spread, spread]`
    pub spread: f32,
    /// Constant velocity added to every particle
    pub drift: Vec2,
    pub size: (f32, f32),
    pub life: (f32, f32),
    pub gravity: f32,
}

impl BurstSpec {
    pub const EXPLOSION: BurstSpec = BurstSpec {
        count: 8,
        spread: 4.0,
        drift: Vec2::ZERO,
        size: (3.0, 6.0),
        life: (30.0, 50.0),
        gravity: 0.0,
    };
    pub const JUMP_DUST: BurstSpec = BurstSpec {
        count: 5,
        spread: 2.0,
        drift: Vec2::new(0.0, -1.0),
        size: (2.0, 4.0),
        life: (20.0, 30.0),
        gravity: 0.1,
    };
    pub const MUZZLE: BurstSpec = BurstSpec {
        count: 3,
        spread: 1.0,
        drift: Vec2::new(3.5, 0.0),
        size: (3.0, 5.0),
        life: (8.0, 13.0),
        gravity: 0.0,
    };
    pub const FLAME: BurstSpec = BurstSpec {
        count: 20,
        spread: 1.0,
        drift: Vec2::new(0.0, 7.5),
        size: (3.0, 6.0),
        life: (20.0, 30.0),
        gravity: 0.0,
    };
    pub const SPECIAL: BurstSpec = BurstSpec {
        count: 50,
        spread: 6.0,
        drift: Vec2::ZERO,
        size: (3.0, 7.0),
        life: (30.0, 60.0),
        gravity: 0.0,
    };
    pub const CRASH: BurstSpec = BurstSpec {
        count: 30,
        spread: 5.0,
        drift: Vec2::ZERO,
        size: (2.0, 5.0),
        life: (30.0, 50.0),
        gravity: 0.0,
    };
}

/// Camera shake; `offset` is re-rolled every frame while active
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    pub frames_left: u32,
    pub offset: Vec2,
}

/// Full-screen colour overlay fading linearly to zero
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flash {
    pub color: u32,
    pub peak_alpha: f32,
    pub alpha: f32,
    pub frames_left: u32,
    pub total_frames: u32,
}

/// Owns every transient effect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Effects {
    pub particles: Pool<Particle>,
    pub shake: Option<ScreenShake>,
    pub flash: Option<Flash>,
    /// Live particle cap; bursts past it are truncated
    pub max_particles: usize,
    /// Reduced-motion / settings switches
    pub shake_enabled: bool,
    pub flash_enabled: bool,
}

impl Effects {
    pub fn new(max_particles: usize) -> Self {
        Self {
            particles: Pool::with_capacity(max_particles),
            shake: None,
            flash: None,
            max_particles,
            shake_enabled: true,
            flash_enabled: true,
        }
    }

    /// Spawn up to `spec.count` particles at `origin`, truncated at the cap.
    /// Returns how many were actually added.
    pub fn emit_burst(
        &mut self,
        rng: &mut impl Rng,
        origin: Vec2,
        spec: BurstSpec,
        colors: &[u32],
    ) -> usize {
        let room = self.max_particles.saturating_sub(self.particles.len());
        let count = spec.count.min(room);
        for _ in 0..count {
            let vel = Vec2::new(
                rng.random_range(-1.0f32..=1.0) * spec.spread,
                rng.random_range(-1.0f32..=1.0) * spec.spread,
            ) + spec.drift;
            let life = sample(rng, spec.life);
            let color = if colors.is_empty() {
                0xFFFFFF
            } else {
                colors[rng.random_range(0..colors.len())]
            };
            self.particles.insert(Particle {
                pos: origin,
                vel,
                color,
                size: sample(rng, spec.size),
                life,
                max_life: life,
                gravity: spec.gravity,
            });
        }
        count
    }

    /// Start a shake, replacing any active one
    pub fn emit_screen_shake(&mut self, intensity: f32, frames: u32) {
        if !self.shake_enabled || frames == 0 {
            return;
        }
        self.shake = Some(ScreenShake {
            intensity,
            frames_left: frames,
            offset: Vec2::ZERO,
        });
    }

    /// Start a flash, replacing any active one
    pub fn emit_flash(&mut self, color: u32, alpha: f32, frames: u32) {
        if !self.flash_enabled || frames == 0 {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        self.flash = Some(Flash {
            color,
            peak_alpha: alpha,
            alpha,
            frames_left: frames,
            total_frames: frames,
        });
    }

    /// Advance all countdowns by one frame and clear anything finished
    pub fn decay(&mut self, rng: &mut impl Rng) {
        self.particles.advance_all(0.0);
        self.particles.retain(|p| p.life > 0.0);

        if let Some(shake) = self.shake.as_mut() {
            if shake.frames_left == 0 {
                self.shake = None;
            } else {
                shake.offset = Vec2::new(
                    rng.random_range(-0.5f32..=0.5) * shake.intensity,
                    rng.random_range(-0.5f32..=0.5) * shake.intensity,
                );
                shake.frames_left -= 1;
            }
        }

        if let Some(flash) = self.flash.as_mut() {
            flash.frames_left = flash.frames_left.saturating_sub(1);
            if flash.frames_left == 0 {
                self.flash = None;
            } else {
                flash.alpha =
                    flash.peak_alpha * flash.frames_left as f32 / flash.total_frames as f32;
            }
        }
    }

    /// Current camera offset
    pub fn shake_offset(&self) -> Vec2 {
        self.shake.as_ref().map(|s| s.offset).unwrap_or(Vec2::ZERO)
    }

    /// Nothing left to animate
    pub fn is_idle(&self) -> bool {
        self.particles.is_empty() && self.shake.is_none() && self.flash.is_none()
    }
}

fn sample(rng: &mut impl Rng, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}
