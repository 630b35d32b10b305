//! Collision resolution
//!
//! Plain AABB tests between the player, projectiles, enemies and pickups.
//! Each pass bails out as soon as the session turns terminal, so nothing
//! after a `GameOver`/`LevelComplete` can touch lives, distance or fuel.

use super::effects::{BurstSpec, palette};
use super::entities::{EnemyKind, Owner, PickupKind};
use super::state::{GameEvent, GameState};

/// Run every collision pass in order
pub fn resolve(state: &mut GameState) {
    player_vs_enemies(state);
    player_vs_enemy_fire(state);
    player_fire_vs_enemies(state);
    player_vs_pickups(state);
}

/// Enemies touching the player. Street enemies stay put and can hurt again
/// once invulnerability lapses; traffic is wrecked on contact.
pub fn player_vs_enemies(state: &mut GameState) {
    let player = state.player.body;
    let hits: Vec<(usize, EnemyKind)> = state
        .enemies
        .iter_slots()
        .filter(|(_, e)| e.body.overlaps(&player))
        .map(|(slot, e)| (slot, e.kind))
        .collect();

    for (slot, kind) in hits {
        if state.progress.is_terminal() {
            return;
        }
        state.take_damage();
        if kind.consumed_on_contact() {
            if let Some(enemy) = state.enemies.remove(slot) {
                let origin = enemy.body.center();
                state.burst(origin, BurstSpec::EXPLOSION, palette::EXPLOSION);
            }
        }
    }
}

/// Enemy bullets are always consumed on contact
pub fn player_vs_enemy_fire(state: &mut GameState) {
    let player = state.player.body;
    let hits: Vec<usize> = state
        .projectiles
        .iter_slots()
        .filter(|(_, p)| p.owner == Owner::Enemy && p.body.overlaps(&player))
        .map(|(slot, _)| slot)
        .collect();

    for slot in hits {
        if state.progress.is_terminal() {
            return;
        }
        state.projectiles.remove(slot);
        state.take_damage();
    }
}

/// Player bullets against enemies: each hit costs one hp; a kill pays out
/// distance and energy
pub fn player_fire_vs_enemies(state: &mut GameState) {
    let shots: Vec<usize> = state
        .projectiles
        .iter_slots()
        .filter(|(_, p)| p.owner == Owner::Player)
        .map(|(slot, _)| slot)
        .collect();

    for shot in shots {
        if state.progress.is_terminal() {
            return;
        }
        let Some(bullet) = state.projectiles.get(shot).map(|p| p.body) else {
            continue;
        };
        let target = state
            .enemies
            .iter_slots()
            .find(|(_, e)| e.hp > 0 && e.body.overlaps(&bullet))
            .map(|(slot, _)| slot);
        let Some(target) = target else {
            continue;
        };

        state.projectiles.remove(shot);
        let destroyed = state.enemies.get_mut(target).is_some_and(|e| e.hit());
        if !destroyed {
            let origin = bullet.center();
            state.burst(origin, BurstSpec::MUZZLE, palette::SPARK);
            continue;
        }

        if let Some(enemy) = state.enemies.remove(target) {
            log::debug!("destroyed {:?} #{}", enemy.kind, enemy.id);
            state.progress.kills += 1;
            state.progress.add_distance(state.tuning.kill_reward_distance);
            let reward = state.tuning.kill_reward_energy;
            state.add_energy(reward);
            let origin = enemy.body.center();
            state.burst(origin, BurstSpec::EXPLOSION, palette::EXPLOSION);
            state.events.push(GameEvent::EnemyDestroyed { kind: enemy.kind });
        }
    }
}

/// Collectibles touching the player apply their effect and vanish.
/// Every effect is clamped at its maximum.
pub fn player_vs_pickups(state: &mut GameState) {
    let player = state.player.body;
    let hits: Vec<usize> = state
        .pickups
        .iter_slots()
        .filter(|(_, p)| p.body.overlaps(&player))
        .map(|(slot, _)| slot)
        .collect();

    for slot in hits {
        if state.progress.is_terminal() {
            return;
        }
        let Some(pickup) = state.pickups.remove(slot) else {
            continue;
        };
        let colors = match pickup.kind {
            PickupKind::Energy => {
                let max = state.player.max_energy;
                state.add_energy(max);
                palette::ENERGY
            }
            PickupKind::Heart => {
                state.progress.gain_life();
                palette::HEART
            }
            PickupKind::Fuel => {
                let amount = state.tuning.highway.fuel_pickup_amount;
                if let Some(tank) = state.progress.fuel.as_mut() {
                    tank.add(amount);
                }
                palette::FUEL
            }
        };
        log::debug!("collected {:?}", pickup.kind);
        let origin = pickup.body.center();
        state.burst(origin, BurstSpec::EXPLOSION, colors);
        state
            .events
            .push(GameEvent::PickupCollected { kind: pickup.kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Enemy, Heading, Pickup, Projectile};
    use crate::sim::progress::GamePhase;
    use crate::sim::rect::Aabb;
    use crate::sim::state::{Character, Level};
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn streets(lives: u8) -> GameState {
        let mut s = GameState::new(3, Tuning::default(), Level::Streets, Character::Juan, lives, 0.0);
        s.props.clear();
        s
    }

    fn enemy_on_player(state: &mut GameState, kind: EnemyKind) -> usize {
        let id = state.next_entity_id();
        state.enemies.insert(Enemy {
            id,
            kind,
            body: state.player.body,
            heading: Heading::Left,
            speed_scale: 1.0,
            hp: kind.hp(),
            hop: None,
            fire_cooldown: None,
        })
    }

    fn bullet_at(state: &mut GameState, owner: Owner, body: Aabb) -> usize {
        let id = state.next_entity_id();
        state.projectiles.insert(Projectile {
            id,
            owner,
            body,
            vel: Vec2::ZERO,
        })
    }

    fn pickup_on_player(state: &mut GameState, kind: PickupKind) {
        let id = state.next_entity_id();
        state.pickups.insert(Pickup {
            id,
            kind,
            body: state.player.body,
            heading: Heading::Left,
        });
    }

    #[test]
    fn test_street_enemy_persists_on_contact() {
        let mut state = streets(5);
        enemy_on_player(&mut state, EnemyKind::Monster);
        player_vs_enemies(&mut state);
        assert_eq!(state.progress.lives, 4);
        assert_eq!(state.enemies.len(), 1);
        // Still overlapping next frame, but invulnerable
        player_vs_enemies(&mut state);
        assert_eq!(state.progress.lives, 4);
    }

    #[test]
    fn test_traffic_consumed_on_contact() {
        let mut state = streets(5);
        enemy_on_player(&mut state, EnemyKind::Racer);
        player_vs_enemies(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progress.lives, 4);
    }

    #[test]
    fn test_multiple_hazards_damage_once() {
        let mut state = streets(5);
        enemy_on_player(&mut state, EnemyKind::Monster);
        enemy_on_player(&mut state, EnemyKind::Jumper);
        let body = state.player.body;
        bullet_at(&mut state, Owner::Enemy, body);
        resolve(&mut state);
        assert_eq!(state.progress.lives, 4);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_fatal_contact_stops_resolution() {
        let mut state = streets(1);
        enemy_on_player(&mut state, EnemyKind::Monster);
        pickup_on_player(&mut state, PickupKind::Heart);
        resolve(&mut state);
        assert_eq!(state.progress.lives, 0);
        assert!(matches!(state.progress.phase, GamePhase::GameOver(_)));
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_kill_reward() {
        let mut state = streets(5);
        let target = Aabb::new(400.0, 450.0, 80.0, 80.0);
        let id = state.next_entity_id();
        state.enemies.insert(Enemy {
            id,
            kind: EnemyKind::Monster,
            body: target,
            heading: Heading::Left,
            speed_scale: 1.0,
            hp: 1,
            hop: None,
            fire_cooldown: None,
        });
        bullet_at(&mut state, Owner::Player, Aabb::new(410.0, 460.0, 12.0, 6.0));
        player_fire_vs_enemies(&mut state);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.progress.distance, 10.0);
        assert_eq!(state.player.energy, 10.0);
        assert_eq!(state.progress.kills, 1);
        assert!(
            state
                .events
                .contains(&GameEvent::EnemyDestroyed { kind: EnemyKind::Monster })
        );
    }

    #[test]
    fn test_police_takes_two_hits() {
        let mut state = streets(5);
        let target = Aabb::new(400.0, 100.0, 60.0, 100.0);
        let id = state.next_entity_id();
        state.enemies.insert(Enemy {
            id,
            kind: EnemyKind::Police,
            body: target,
            heading: Heading::Down,
            speed_scale: 1.0,
            hp: 2,
            hop: None,
            fire_cooldown: Some(10),
        });
        bullet_at(&mut state, Owner::Player, Aabb::new(410.0, 150.0, 6.0, 12.0));
        player_fire_vs_enemies(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.progress.kills, 0);
        bullet_at(&mut state, Owner::Player, Aabb::new(410.0, 150.0, 6.0, 12.0));
        player_fire_vs_enemies(&mut state);
        assert!(state.enemies.is_empty());
        assert_eq!(state.progress.kills, 1);
    }

    #[test]
    fn test_one_bullet_one_kill() {
        let mut state = streets(5);
        for x in [400.0, 405.0] {
            let id = state.next_entity_id();
            state.enemies.insert(Enemy {
                id,
                kind: EnemyKind::Jumper,
                body: Aabb::new(x, 450.0, 70.0, 100.0),
                heading: Heading::Left,
                speed_scale: 1.0,
                hp: 1,
                hop: None,
                fire_cooldown: None,
            });
        }
        bullet_at(&mut state, Owner::Player, Aabb::new(420.0, 460.0, 12.0, 6.0));
        player_fire_vs_enemies(&mut state);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_pickups_are_clamped() {
        let mut state = streets(5);
        pickup_on_player(&mut state, PickupKind::Heart);
        pickup_on_player(&mut state, PickupKind::Energy);
        player_vs_pickups(&mut state);
        assert_eq!(state.progress.lives, 5);
        assert_eq!(state.player.energy, 100.0);
        assert!(state.player.can_use_special);

        pickup_on_player(&mut state, PickupKind::Energy);
        player_vs_pickups(&mut state);
        assert_eq!(state.player.energy, 100.0);
        let ready = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::SpecialReady)
            .count();
        assert_eq!(ready, 1);
        assert!(state.pickups.is_empty());
    }

    #[test]
    fn test_energy_pickup_during_special_readies_next_one() {
        let mut state = streets(5);
        state.add_energy(100.0);
        let frames = state.tuning.special_frames;
        assert!(state.player.activate_special(frames));
        state.events.clear();

        pickup_on_player(&mut state, PickupKind::Energy);
        player_vs_pickups(&mut state);
        assert!(state.events.contains(&GameEvent::SpecialReady));

        for _ in 0..frames {
            state.player.tick_timers();
        }
        assert!(!state.player.special_active());
        assert_eq!(state.player.energy, 100.0);
        assert!(state.player.can_use_special);
    }

    #[test]
    fn test_fuel_pickup() {
        let mut state =
            GameState::new(3, Tuning::default(), Level::Highway, Character::Juan, 3, 0.0);
        if let Some(tank) = state.progress.fuel.as_mut() {
            tank.amount = 50.0;
        }
        pickup_on_player(&mut state, PickupKind::Fuel);
        pickup_on_player(&mut state, PickupKind::Fuel);
        pickup_on_player(&mut state, PickupKind::Fuel);
        player_vs_pickups(&mut state);
        assert_eq!(state.progress.fuel.map(|t| t.amount), Some(100.0));
    }
}
