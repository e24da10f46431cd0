//! Dodgeball sim entry point
//!
//! Headless run of the arena: a wandering player, drones that bounce around
//! the field and shoot at the player, and power-ups to collect. Prints a JSON
//! summary at the end. An optional first argument names an engine config
//! JSON file.

use std::cell::RefCell;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use dodgeball_physics::consts::*;
use dodgeball_physics::entity::{Actor, PowerUp, PowerUpKind, Projectile, ProjectileKind};
use dodgeball_physics::{Engine, EngineConfig, Entity, EntityId, EntityKind, EntityRef, Vec2, platform};

const SEED: u64 = 0x0d0d_6e11;
const FRAMES: u64 = 600;
const DRONE_COUNT: usize = 5;
const POWER_UP_COUNT: usize = 4;

const PLAYER_SPEED: f32 = 120.0;
const DRONE_SPEED: f32 = 80.0;
const SHOT_SPEED: f32 = 240.0;
/// Frames between player course changes
const WANDER_INTERVAL: u64 = 60;
/// Frames between drone volleys
const VOLLEY_INTERVAL: u64 = 90;

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    frames: u64,
    collisions: u64,
    player_hits: u32,
    drones: usize,
    power_ups: usize,
    projectiles: usize,
    bodies: usize,
}

fn main() {
    platform::init_logging();
    log::info!("Dodgeball sim starting...");

    let mut engine = match Engine::new(load_config()) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid engine config: {}", e);
            std::process::exit(1);
        }
    };
    let mut rng = Pcg32::seed_from_u64(SEED);
    log::info!("Arena seeded with {:#x}", SEED);

    let size = engine.world_size();
    let player_id = engine.entities_mut().next_entity_id();
    let player = Rc::new(RefCell::new(Actor::player(player_id, size * 0.5)));
    engine.add(player.clone(), Some(true));

    for _ in 0..DRONE_COUNT {
        let position = random_point(&mut rng, size);
        let drone = engine.spawn(|id| Actor::drone(id, position), Some(true));
        let velocity = random_direction(&mut rng) * DRONE_SPEED;
        let drone_id = drone.borrow().id();
        set_velocity(&mut engine, drone_id, velocity);
    }
    let kinds = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::DamageBoost,
    ];
    for i in 0..POWER_UP_COUNT {
        let position = random_point(&mut rng, size);
        engine.spawn(|id| PowerUp::new(id, position, kinds[i % kinds.len()]), Some(false));
    }

    while engine.frame() < FRAMES {
        let frame = engine.frame();
        if frame % WANDER_INTERVAL == 0 {
            let velocity = random_direction(&mut rng) * PLAYER_SPEED;
            set_velocity(&mut engine, player_id, velocity);
        }
        if frame > 0 && frame % VOLLEY_INTERVAL == 0 {
            let target = player.borrow().position();
            fire_volley(&mut engine, target);
        }

        keep_in_field(&mut engine);
        engine.update(PHYSICS_DT);
    }

    let entities = engine.entities();
    let summary = Summary {
        seed: SEED,
        frames: engine.frame(),
        collisions: engine.physics().dispatched_collisions(),
        player_hits: player.borrow().hits,
        drones: entities.by_kind(EntityKind::Drone).len(),
        power_ups: entities.by_kind(EntityKind::PowerUp).len(),
        projectiles: entities.by_kind(EntityKind::Projectile).len(),
        bodies: engine.physics().world().body_count(),
    };
    log::info!("Player {} took {} hits", player_id, summary.player_hits);

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}

/// Engine config from the file named by the first argument, or defaults
fn load_config() -> EngineConfig {
    let Some(path) = std::env::args().nth(1) else {
        return EngineConfig::default();
    };
    let json = match std::fs::read_to_string(&path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not read {}: {}; using defaults", path, e);
            return EngineConfig::default();
        }
    };
    match EngineConfig::from_json(&json) {
        Ok(config) => {
            log::info!("Loaded config from {}", path);
            config
        }
        Err(e) => {
            log::warn!("Bad config in {}: {}; using defaults", path, e);
            EngineConfig::default()
        }
    }
}

/// Random point in the field, kept off the walls where there is room
fn random_point(rng: &mut Pcg32, size: Vec2) -> Vec2 {
    let margin = Vec2::splat(40.0).min(size * 0.5);
    Vec2::new(
        rng.random_range(margin.x..=size.x - margin.x),
        rng.random_range(margin.y..=size.y - margin.y),
    )
}

fn random_direction(rng: &mut Pcg32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::from_angle(angle)
}

fn set_velocity(engine: &mut Engine, id: EntityId, velocity: Vec2) {
    if let Some(body) = engine.physics().body_for(id) {
        engine.physics_mut().set_body_velocity(body, velocity);
    }
}

/// Every drone fires one shot at the player's position
fn fire_volley(engine: &mut Engine, target: Vec2) {
    let drones = engine.entities().by_kind(EntityKind::Drone);
    for drone in drones {
        let (source, origin) = {
            let d = drone.borrow();
            (d.id(), d.position())
        };
        let direction = (target - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            continue;
        }
        // Spawn just outside the drone so the shot does not start touching it
        let start = origin + direction * (dodgeball_physics::entity::kinds::DRONE_RADIUS + 6.0);
        engine.spawn(
            |id| Projectile::new(id, start, direction, SHOT_SPEED, ProjectileKind::Enemy).with_source(source),
            Some(true),
        );
    }
}

/// Bounce actors off the walls and retire projectiles that leave the field
fn keep_in_field(engine: &mut Engine) {
    let size = engine.world_size();
    let entities: Vec<EntityRef> = engine.entities().all().to_vec();
    for entity in entities {
        let (id, kind, position, radius) = {
            let e = entity.borrow();
            (e.id(), e.kind(), e.position(), e.radius())
        };
        if kind == EntityKind::Projectile {
            if !engine.contains_point(position) {
                entity.borrow_mut().set_active(false);
            }
            continue;
        }
        let Some(body) = engine.physics().body_for(id) else {
            continue;
        };
        let mut velocity = engine.physics().body_velocity(body);
        if (position.x < radius && velocity.x < 0.0) || (position.x > size.x - radius && velocity.x > 0.0) {
            velocity.x = -velocity.x;
        }
        if (position.y < radius && velocity.y < 0.0) || (position.y > size.y - radius && velocity.y > 0.0) {
            velocity.y = -velocity.y;
        }
        engine.physics_mut().set_body_velocity(body, velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_point_fits_any_valid_field() {
        let mut rng = Pcg32::seed_from_u64(SEED);
        for size in [Vec2::new(800.0, 600.0), Vec2::new(60.0, 60.0), Vec2::new(80.0, 1.0)] {
            for _ in 0..100 {
                let p = random_point(&mut rng, size);
                assert!(p.x >= 0.0 && p.x <= size.x && p.y >= 0.0 && p.y <= size.y);
            }
        }
    }

    #[test]
    fn test_small_config_runs() {
        let config = EngineConfig::from_json(r#"{"world_width":60,"world_height":60}"#).unwrap();
        let mut engine = Engine::new(config).unwrap();
        let mut rng = Pcg32::seed_from_u64(SEED);
        let position = random_point(&mut rng, engine.world_size());
        engine.spawn(|id| Actor::drone(id, position), Some(true));
        keep_in_field(&mut engine);
        engine.update(PHYSICS_DT);
        assert_eq!(engine.entities().len(), 1);
    }
}
