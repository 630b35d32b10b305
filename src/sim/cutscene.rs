//! Level-transition cutscene
//!
//! After the on-foot level is won, a car drives in from the right and stops;
//! the avatar then walks over to it. Only positions move here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Aabb;

const CAR_SPEED: f32 = 8.0;
const WALK_SPEED: f32 = 3.0;
const CAR_SIZE: Vec2 = Vec2::new(120.0, 75.0);
const CAR_TARGET_X: f32 = 350.0;
/// Stop this far short of the car's left edge
const BOARDING_GAP: f32 = 80.0;
/// Minimum frames before the avatar starts walking
const WALK_DELAY: u32 = 30;
/// Frames after which the transition is forced
const TIMEOUT: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Car is driving in
    Arriving,
    /// Avatar is walking to the car
    Boarding,
    Done,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cutscene {
    pub car: Aabb,
    pub stage: Stage,
    pub frames: u32,
    /// Set when the transition was forced by the timeout
    pub timed_out: bool,
}

impl Cutscene {
    /// Car starts just off the right edge, resting on `ground_line`
    pub fn new(view_width: f32, ground_line: f32) -> Self {
        Self {
            car: Aabb {
                pos: Vec2::new(view_width + 50.0, ground_line - CAR_SIZE.y),
                size: CAR_SIZE,
            },
            stage: Stage::Arriving,
            frames: 0,
            timed_out: false,
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Advance one frame, moving the car and `avatar`. Returns true on the
    /// frame the cutscene finishes.
    pub fn advance(&mut self, avatar: &mut Aabb) -> bool {
        if self.is_done() {
            return false;
        }
        self.frames += 1;

        if self.car.pos.x > CAR_TARGET_X {
            self.car.pos.x = (self.car.pos.x - CAR_SPEED).max(CAR_TARGET_X);
        }
        if self.stage == Stage::Arriving
            && self.frames >= WALK_DELAY
            && self.car.pos.x <= CAR_TARGET_X
        {
            self.stage = Stage::Boarding;
        }
        if self.stage == Stage::Boarding {
            if avatar.pos.x < CAR_TARGET_X - BOARDING_GAP {
                avatar.pos.x += WALK_SPEED;
            } else {
                self.stage = Stage::Done;
                return true;
            }
        }
        if self.frames >= TIMEOUT {
            log::warn!("cutscene timed out, forcing transition");
            self.timed_out = true;
            self.stage = Stage::Done;
            return true;
        }
        false
    }
}
