//! Gameplay entities
//!
//! Only what the collision protocol exercises: actors that record hits,
//! power-ups that get collected, projectiles that expire on impact.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Entity, EntityCore, EntityId, EntityKind};

/// A player or drone
#[derive(Debug, Clone)]
pub struct Actor {
    core: EntityCore,
    /// Contact onsets seen so far
    pub hits: u32,
    pub last_hit: Option<EntityId>,
}

impl Actor {
    pub fn new(id: EntityId, kind: EntityKind, position: Vec2, radius: f32) -> Self {
        Self {
            core: EntityCore::new(id, kind, position, radius),
            hits: 0,
            last_hit: None,
        }
    }

    pub fn player(id: EntityId, position: Vec2) -> Self {
        Self::new(id, EntityKind::Player, position, PLAYER_RADIUS)
    }

    pub fn drone(id: EntityId, position: Vec2) -> Self {
        Self::new(id, EntityKind::Drone, position, DRONE_RADIUS)
    }
}

pub const PLAYER_RADIUS: f32 = 15.0;
pub const DRONE_RADIUS: f32 = 12.0;

impl Entity for Actor {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn handle_collision(&mut self, other: &dyn Entity) {
        self.hits += 1;
        self.last_hit = Some(other.id());
        log::debug!("{:?} {} hit by {:?} {}", self.core.kind, self.core.id, other.kind(), other.id());
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
    Shield,
    DamageBoost,
}

impl PowerUpKind {
    /// Effect magnitude: health restored, speed multiplier, shield seconds, damage multiplier
    pub fn value(&self) -> f32 {
        match self {
            PowerUpKind::Health => 25.0,
            PowerUpKind::Speed => 1.5,
            PowerUpKind::Shield => 3.0,
            PowerUpKind::DamageBoost => 2.0,
        }
    }
}

const POWERUP_RADIUS: f32 = 10.0;
const POWERUP_MIN_RADIUS: f32 = 8.0;
const POWERUP_MAX_RADIUS: f32 = 12.0;
const POWERUP_PULSE_RATE: f32 = 0.1;
const POWERUP_LIFETIME: f32 = 10.0;

/// A collectible that pulses in place and expires
#[derive(Debug, Clone)]
pub struct PowerUp {
    core: EntityCore,
    pub kind: PowerUpKind,
    lifetime: f32,
    growing: bool,
}

impl PowerUp {
    pub fn new(id: EntityId, position: Vec2, kind: PowerUpKind) -> Self {
        Self {
            core: EntityCore::new(id, EntityKind::PowerUp, position, POWERUP_RADIUS),
            kind,
            lifetime: 0.0,
            growing: true,
        }
    }

    pub fn value(&self) -> f32 {
        self.kind.value()
    }
}

impl Entity for PowerUp {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.lifetime += dt;
        if self.lifetime >= POWERUP_LIFETIME {
            self.core.active = false;
            return;
        }

        // Pulse between min and max size
        if self.growing {
            self.core.radius += POWERUP_PULSE_RATE * dt;
            if self.core.radius >= POWERUP_MAX_RADIUS {
                self.growing = false;
            }
        } else {
            self.core.radius -= POWERUP_PULSE_RATE * dt;
            if self.core.radius <= POWERUP_MIN_RADIUS {
                self.growing = true;
            }
        }
    }

    fn handle_collision(&mut self, other: &dyn Entity) {
        if other.kind() == EntityKind::Player {
            log::debug!("Power-up {:?} {} collected", self.kind, self.core.id);
            self.core.active = false;
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Hurts drones
    Player,
    /// Hurts the player
    Enemy,
}

const PROJECTILE_RADIUS: f32 = 5.0;
const PROJECTILE_LIFETIME: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct Projectile {
    core: EntityCore,
    pub kind: ProjectileKind,
    /// Entity that fired it; never collides with it
    pub source: Option<EntityId>,
    lifetime: f32,
}

impl Projectile {
    pub fn new(id: EntityId, position: Vec2, direction: Vec2, speed: f32, kind: ProjectileKind) -> Self {
        let mut core = EntityCore::new(id, EntityKind::Projectile, position, PROJECTILE_RADIUS);
        core.velocity = direction.normalize_or_zero() * speed;
        Self {
            core,
            kind,
            source: None,
            lifetime: 0.0,
        }
    }

    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }
}

impl Entity for Projectile {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, dt: f32) {
        self.lifetime += dt;
        if self.lifetime >= PROJECTILE_LIFETIME {
            self.core.active = false;
            return;
        }
        self.core.advance(dt);
    }

    fn handle_collision(&mut self, other: &dyn Entity) {
        if self.source == Some(other.id()) {
            return;
        }
        let target = match self.kind {
            ProjectileKind::Player => EntityKind::Drone,
            ProjectileKind::Enemy => EntityKind::Player,
        };
        if other.kind() == target {
            self.core.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_up_collected_by_player_only() {
        let mut power_up = PowerUp::new(EntityId(1), Vec2::ZERO, PowerUpKind::Shield);
        power_up.handle_collision(&Actor::drone(EntityId(2), Vec2::ZERO));
        assert!(power_up.is_active());
        power_up.handle_collision(&Actor::player(EntityId(3), Vec2::ZERO));
        assert!(!power_up.is_active());
        assert_eq!(power_up.value(), 3.0);
    }

    #[test]
    fn test_power_up_expires_and_pulses() {
        let mut power_up = PowerUp::new(EntityId(1), Vec2::ZERO, PowerUpKind::Health);
        power_up.update(1.0);
        assert!((power_up.radius() - 10.1).abs() < 1e-5);
        power_up.update(9.5);
        assert!(!power_up.is_active());
    }

    #[test]
    fn test_projectile_velocity_from_direction() {
        let projectile = Projectile::new(EntityId(1), Vec2::ZERO, Vec2::new(3.0, 4.0), 100.0, ProjectileKind::Player);
        assert!((projectile.velocity() - Vec2::new(60.0, 80.0)).length() < 1e-4);
        let still = Projectile::new(EntityId(2), Vec2::ZERO, Vec2::ZERO, 100.0, ProjectileKind::Player);
        assert_eq!(still.velocity(), Vec2::ZERO);
    }

    #[test]
    fn test_projectile_ignores_source_and_friendly_targets() {
        let player = Actor::player(EntityId(1), Vec2::ZERO);
        let drone = Actor::drone(EntityId(2), Vec2::ZERO);

        let mut shot = Projectile::new(EntityId(3), Vec2::ZERO, Vec2::X, 50.0, ProjectileKind::Player)
            .with_source(player.id());
        shot.handle_collision(&player);
        assert!(shot.is_active());
        shot.handle_collision(&drone);
        assert!(!shot.is_active());

        let mut enemy_shot = Projectile::new(EntityId(4), Vec2::ZERO, Vec2::X, 50.0, ProjectileKind::Enemy)
            .with_source(drone.id());
        enemy_shot.handle_collision(&Actor::drone(EntityId(5), Vec2::ZERO));
        assert!(enemy_shot.is_active());
        enemy_shot.handle_collision(&player);
        assert!(!enemy_shot.is_active());
    }

    #[test]
    fn test_projectile_expires() {
        let mut shot = Projectile::new(EntityId(1), Vec2::ZERO, Vec2::X, 10.0, ProjectileKind::Enemy);
        shot.update(1.0);
        assert!(shot.is_active());
        assert!((shot.position().x - 10.0).abs() < 1e-5);
        shot.update(1.0);
        assert!(!shot.is_active());
    }

    #[test]
    fn test_actor_records_hits() {
        let mut player = Actor::player(EntityId(1), Vec2::ZERO);
        player.handle_collision(&Actor::drone(EntityId(9), Vec2::ZERO));
        assert_eq!(player.hits, 1);
        assert_eq!(player.last_hit, Some(EntityId(9)));
    }
}
