//! Fixed timestep simulation tick
//!
//! One call advances one frame in a fixed order: progress, player, spawner,
//! pools, collisions, win check, effects.

use glam::Vec2;

use super::collision;
use super::effects::{BurstSpec, palette};
use super::entities::PickupKind;
use super::progress::{GameOverReason, GamePhase};
use super::rect::Aabb;
use super::state::{GameEvent, GameState, Level};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub jump: bool,
    pub shoot: bool,
    pub special: bool,
    /// -1 (left) ..= +1 (right)
    pub steer: f32,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.pause {
        match state.progress.toggle_pause() {
            Some(GamePhase::Paused) => {
                log::info!("paused");
                state.events.push(GameEvent::Paused);
                return;
            }
            Some(GamePhase::Running) => {
                log::info!("resumed");
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Don't tick if paused or finished
    if !state.progress.is_running() {
        return;
    }

    step(state, input);
    state.settle();
}

fn step(state: &mut GameState, input: &TickInput) {
    state.progress.frames += 1;
    let speed = state.base_speed();

    // Progress
    state
        .progress
        .add_distance(speed * state.tuning.distance_rate);
    if state.tuning.energy_regen > 0.0 && state.level == Level::Streets {
        let regen = state.tuning.energy_regen;
        state.add_energy(regen);
    }
    let drain = state.tuning.highway.fuel_drain;
    if let Some(tank) = state.progress.fuel.as_mut() {
        if tank.drain(drain) {
            state.game_over(GameOverReason::OutOfFuel);
            return;
        }
    }

    // Player
    apply_input(state, input);
    state.player.apply_gravity();
    if state.player.tick_timers() {
        log::debug!("special ended");
        state.events.push(GameEvent::SpecialEnded);
    }

    // Spawner
    run_spawner(state);

    // Pools
    advance_pools(state, speed);

    // Collisions
    collision::resolve(state);

    // Win check
    if !state.progress.is_terminal() && state.progress.reached_goal() {
        state.complete_level();
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    match state.level {
        Level::Streets => {
            if input.jump && state.player.jump() {
                let body = state.player.body;
                let feet = Vec2::new(body.center().x, body.bottom());
                state.burst(feet, BurstSpec::JUMP_DUST, palette::DUST);
                state.events.push(GameEvent::Jumped);
            }
        }
        Level::Highway => state.player.steer(input.steer.clamp(-1.0, 1.0)),
    }

    if input.shoot && state.player.try_shoot(state.tuning.shoot_cooldown_frames) {
        state.fire_player_projectile();
    }

    if input.special {
        activate_special(state);
    }
}

/// Streets: spend full energy on a damage-immune special.
/// Highway: spend fuel on a boost.
fn activate_special(state: &mut GameState) {
    match state.level {
        Level::Streets => {
            if state.player.activate_special(state.tuning.special_frames) {
                log::info!("special activated");
                let center = state.player.body.center();
                state.burst(center, BurstSpec::SPECIAL, palette::ENERGY);
                state.effects.emit_screen_shake(7.0, 15);
                state.effects.emit_flash(0xFFFFFF, 0.8, 18);
                state.events.push(GameEvent::SpecialActivated);
            }
        }
        Level::Highway => {
            let cost = state.tuning.highway.boost_cost;
            if state.player.special_active() {
                return;
            }
            let Some(tank) = state.progress.fuel.as_mut() else {
                return;
            };
            if tank.amount <= cost {
                return;
            }
            tank.drain(cost);
            state.player.start_boost(state.tuning.highway.boost_frames);
            let body = state.player.body;
            let exhaust = Vec2::new(body.center().x, body.bottom());
            state.burst(exhaust, BurstSpec::FLAME, palette::FLAME);
            log::debug!("boost");
            state.events.push(GameEvent::Boosted);
        }
    }
}

fn run_spawner(state: &mut GameState) {
    let due = state
        .spawner
        .tick(state.level, state.progress.distance, &state.tuning.spawn);
    if due.enemy {
        state.spawn_enemy();
    }
    if due.power_up {
        state.spawn_pickup(PickupKind::Energy);
    }
    if due.collectible {
        state.spawn_pickup(PickupKind::Heart);
    }
    if due.fuel {
        state.spawn_pickup(PickupKind::Fuel);
    }
    if due.prop && state.props.len() < state.tuning.spawn.target_props {
        state.spawn_prop(false);
    }
}

fn advance_pools(state: &mut GameState, speed: f32) {
    state.enemies.advance_all(speed);

    let interval = state.tuning.highway.enemy_fire_frames.max(1);
    let shooters: Vec<Aabb> = state
        .enemies
        .iter_mut()
        .filter_map(|e| e.try_fire(interval).then_some(e.body))
        .collect();
    let view_height = state.tuning.view_height;
    for body in shooters {
        // Only cars on screen shoot
        if body.bottom() > 0.0 && body.top() < view_height {
            state.fire_enemy_projectile(body);
        }
    }

    state.projectiles.advance_all(speed);
    state.pickups.advance_all(speed);
    state.props.advance_all(speed);

    let view = state.view();
    let passed = state.enemies.prune_expired(&view);
    if state.level == Level::Highway && passed > 0 {
        state.progress.cars_avoided += passed as u32;
    }
    state.projectiles.prune_expired(&view);
    state.pickups.prune_expired(&view);
    state.props.prune_expired(&view);
}
