//! Engine context
//!
//! Owns the physics bridge and the entity manager and sequences one frame:
//! physics step and sync, entity logic, then reaping. Passed around
//! explicitly; there is no global instance.

use glam::Vec2;

use crate::config::EngineConfig;
use crate::entity::{Entity, EntityId, EntityManager, EntityRef};
use crate::error::PhysicsError;
use crate::physics::PhysicsBridge;

pub struct Engine {
    physics: PhysicsBridge,
    entities: EntityManager,
    world_size: Vec2,
    frame: u64,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        log::info!(
            "Engine initialized: {}x{} field, gravity {}, dt {:.4}",
            config.world_width,
            config.world_height,
            config.physics.gravity,
            config.physics.time_step
        );
        Ok(Self {
            physics: PhysicsBridge::with_config(config.physics),
            entities: EntityManager::new(),
            world_size: Vec2::new(config.world_width, config.world_height),
            frame: 0,
        })
    }

    /// Run one frame: physics, entity logic, then reap inactive entities
    pub fn update(&mut self, dt: f32) {
        self.physics.update(dt);
        self.entities.update_all(dt);
        let reaped = self.reap();
        if reaped > 0 {
            log::debug!("Frame {}: reaped {} entities", self.frame, reaped);
        }
        self.frame += 1;
    }

    /// Remove inactive entities, each body before its entity
    fn reap(&mut self) -> usize {
        for id in self.entities.inactive_ids() {
            if let Some(body) = self.physics.body_for(id) {
                self.physics.remove_body(body);
            }
        }
        self.entities.remove_inactive().len()
    }

    /// Build and register an entity, optionally with a body
    ///
    /// `body` is `Some(dynamic)` to give the entity a body; the body starts
    /// with the entity's velocity.
    pub fn spawn<E, F>(&mut self, build: F, body: Option<bool>) -> EntityRef
    where
        E: Entity + 'static,
        F: FnOnce(EntityId) -> E,
    {
        let entity = self.entities.create(build);
        if let Some(dynamic) = body {
            self.attach_body(&entity, dynamic);
        }
        entity
    }

    /// Register an already-built entity, optionally with a body
    ///
    /// An entity whose id is already managed is rejected untouched, and no
    /// body is created for it.
    pub fn add(&mut self, entity: EntityRef, body: Option<bool>) -> bool {
        if !self.entities.add(entity.clone()) {
            return false;
        }
        if let Some(dynamic) = body {
            self.attach_body(&entity, dynamic);
        }
        true
    }

    fn attach_body(&mut self, entity: &EntityRef, dynamic: bool) {
        let velocity = entity.borrow().velocity();
        let body = self.physics.create_body(entity, dynamic);
        if velocity != Vec2::ZERO {
            self.physics.set_body_velocity(body, velocity);
        }
    }

    /// Remove an entity and its body. False if the id is unknown.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if let Some(body) = self.physics.body_for(id) {
            self.physics.remove_body(body);
        }
        self.entities.remove(id).is_some()
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.physics.set_gravity(gravity);
    }

    pub fn gravity(&self) -> Vec2 {
        self.physics.gravity()
    }

    pub fn set_world_size(&mut self, width: f32, height: f32) {
        self.world_size = Vec2::new(width, height);
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    /// Whether a point lies inside the play field
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= 0.0 && point.y >= 0.0 && point.x <= self.world_size.x && point.y <= self.world_size.y
    }

    /// Frames run so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn physics(&self) -> &PhysicsBridge {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsBridge {
        &mut self.physics
    }

    pub fn entities(&self) -> &EntityManager {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityManager {
        &mut self.entities
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::PhysicsConfig;
    use crate::consts::PHYSICS_DT;
    use crate::entity::{Actor, EntityKind, PowerUp, PowerUpKind, Projectile, ProjectileKind, into_ref};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig {
            world_width: 0.0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(config).is_err());

        let config = EngineConfig {
            physics: PhysicsConfig {
                time_step: -1.0,
                ..PhysicsConfig::default()
            },
            ..EngineConfig::default()
        };
        assert!(Engine::new(config).is_err());
    }

    #[test]
    fn test_spawn_with_and_without_body() {
        let mut engine = engine();
        let player = engine.spawn(|id| Actor::player(id, Vec2::new(100.0, 100.0)), Some(true));
        let marker = engine.spawn(|id| Actor::drone(id, Vec2::ZERO), None);

        assert_eq!(engine.entities().len(), 2);
        assert_eq!(engine.physics().body_count(), 1);
        assert!(engine.physics().body_for(player.borrow().id()).is_some());
        assert!(engine.physics().body_for(marker.borrow().id()).is_none());
    }

    #[test]
    fn test_body_starts_with_entity_velocity() {
        let mut engine = engine();
        let shot = engine.spawn(
            |id| Projectile::new(id, Vec2::new(100.0, 100.0), Vec2::X, 300.0, ProjectileKind::Player),
            Some(true),
        );
        let body = engine.physics().body_for(shot.borrow().id()).unwrap();
        assert_eq!(engine.physics().body_velocity(body), Vec2::new(300.0, 0.0));
    }

    #[test]
    fn test_power_up_is_collected_and_reaped() {
        let mut engine = engine();
        let player = Rc::new(RefCell::new(Actor::player(EntityId(1), Vec2::ZERO)));
        assert!(engine.add(player.clone(), Some(true)));
        engine.spawn(|id| PowerUp::new(id, Vec2::new(50.0, 0.0), PowerUpKind::Shield), Some(false));

        let body = engine.physics().body_for(EntityId(1)).unwrap();
        engine.physics_mut().set_body_velocity(body, Vec2::new(60.0, 0.0));
        for _ in 0..40 {
            engine.update(PHYSICS_DT);
        }

        assert_eq!(player.borrow().hits, 1);
        assert!(engine.entities().by_kind(EntityKind::PowerUp).is_empty());
        assert_eq!(engine.physics().body_count(), 1);
        assert_eq!(engine.physics().world().body_count(), 1);
        assert_eq!(engine.frame(), 40);
    }

    #[test]
    fn test_duplicate_add_leaves_existing_body_alone() {
        let mut engine = engine();
        assert!(engine.add(into_ref(Actor::player(EntityId(1), Vec2::ZERO)), Some(true)));

        let mut impostor = Actor::drone(EntityId(1), Vec2::new(50.0, 50.0));
        impostor.set_velocity(Vec2::new(999.0, 0.0));
        assert!(!engine.add(into_ref(impostor), Some(true)));

        let body = engine.physics().body_for(EntityId(1)).unwrap();
        assert_eq!(engine.entities().len(), 1);
        assert_eq!(engine.physics().body_velocity(body), Vec2::ZERO);
        assert_eq!(engine.physics().body_position(body), Vec2::ZERO);
        assert_eq!(engine.physics().world().body_count(), 1);
    }

    #[test]
    fn test_projectile_expires_with_its_body() {
        let mut engine = engine();
        engine.spawn(
            |id| Projectile::new(id, Vec2::new(400.0, 300.0), Vec2::Y, 10.0, ProjectileKind::Enemy),
            Some(true),
        );
        // 2 s lifetime
        for _ in 0..125 {
            engine.update(PHYSICS_DT);
        }
        assert!(engine.entities().is_empty());
        assert_eq!(engine.physics().world().body_count(), 0);
    }

    #[test]
    fn test_despawn_removes_body_first() {
        let mut engine = engine();
        let drone = engine.spawn(|id| Actor::drone(id, Vec2::ZERO), Some(false));
        let id = drone.borrow().id();
        assert!(engine.despawn(id));
        assert!(engine.physics().body_for(id).is_none());
        assert_eq!(engine.physics().world().body_count(), 0);
        assert!(!engine.despawn(id));
    }

    #[test]
    fn test_world_size_and_gravity() {
        let mut engine = engine();
        assert_eq!(engine.world_size(), Vec2::new(800.0, 600.0));
        assert!(engine.contains_point(Vec2::new(400.0, 300.0)));
        assert!(!engine.contains_point(Vec2::new(-1.0, 300.0)));

        engine.set_world_size(1024.0, 768.0);
        assert!(engine.contains_point(Vec2::new(1000.0, 700.0)));

        engine.set_gravity(-3.0);
        assert_eq!(engine.gravity(), Vec2::new(0.0, -3.0));
    }

    #[test]
    fn test_factory_spawn_through_manager() {
        let mut engine = engine();
        engine
            .entities_mut()
            .register_factory("drone", Box::new(|id, pos| into_ref(Actor::drone(id, pos))));
        let drone = engine
            .entities_mut()
            .create_by_type("drone", Vec2::new(10.0, 10.0))
            .unwrap();
        let body = engine.physics_mut().create_body(&drone, true);
        engine.physics_mut().set_body_velocity(body, Vec2::new(0.0, 60.0));
        engine.update(PHYSICS_DT);
        assert!((drone.borrow().position().y - 11.0).abs() < 1e-4);
    }
}
