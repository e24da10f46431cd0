//! Entity-centric physics bridge
//!
//! Owns the `World`, creates one circle body per entity, and after every step
//! copies body position and velocity back onto the entity. Data only flows
//! physics → entity implicitly; entity → physics goes through the explicit
//! setters here.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use super::body::{BodyDef, BodyHandle, BodyKind, FixtureDef};
use super::contact::ContactListener;
use super::dispatch::CollisionDispatcher;
use super::links::EntityLinks;
use super::shape::Shape;
use super::world::World;
use crate::config::PhysicsConfig;
use crate::entity::{EntityId, EntityRef};

pub struct PhysicsBridge {
    world: World,
    links: Rc<RefCell<EntityLinks>>,
    /// Kept alive here; the world only holds it weakly
    dispatcher: Rc<RefCell<CollisionDispatcher>>,
    config: PhysicsConfig,
}

impl Default for PhysicsBridge {
    fn default() -> Self {
        Self::with_config(PhysicsConfig::default())
    }
}

impl PhysicsBridge {
    /// Bridge with default timestep and material, and the given vertical gravity
    pub fn new(gravity: f32) -> Self {
        Self::with_config(PhysicsConfig::with_gravity(gravity))
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut world = World::new(Vec2::new(0.0, config.gravity));
        let links = Rc::new(RefCell::new(EntityLinks::default()));
        let dispatcher = Rc::new(RefCell::new(CollisionDispatcher::new(links.clone())));

        let listener: Rc<RefCell<dyn ContactListener>> = dispatcher.clone();
        world.set_contact_listener(Rc::downgrade(&listener));

        Self {
            world,
            links,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Advance one fixed timestep, then sync mapped entities
    ///
    /// `_dt` is the frame time; the world always advances by the configured
    /// step so simulation does not depend on frame rate.
    pub fn update(&mut self, _dt: f32) {
        self.world.step(
            self.config.time_step,
            self.config.velocity_iterations,
            self.config.position_iterations,
        );

        // Callbacks may have changed the links; walk an owned copy
        let links = self.links.borrow().snapshot();
        let mut stale = Vec::new();
        for (handle, link) in links {
            let (Some(entity_ref), Some(body)) = (link.upgrade(), self.world.body(handle)) else {
                stale.push(handle);
                continue;
            };
            let Ok(mut entity) = entity_ref.try_borrow_mut() else {
                log::warn!("Entity {} borrowed during physics sync; skipped", link.id);
                continue;
            };
            if !entity.is_active() {
                continue;
            }
            entity.set_position(body.position());
            entity.set_velocity(body.linear_velocity());
        }

        for handle in stale {
            log::debug!("Pruning stale physics link for body {:?}", handle);
            self.remove_body(handle);
        }
    }

    /// Set vertical gravity
    pub fn set_gravity(&mut self, gravity: f32) {
        self.world.set_gravity(Vec2::new(0.0, gravity));
    }

    pub fn gravity(&self) -> Vec2 {
        self.world.gravity()
    }

    /// Create a circle body for `entity` at its current position
    ///
    /// An entity that already has a live body gets that body back.
    pub fn create_body(&mut self, entity: &EntityRef, dynamic: bool) -> BodyHandle {
        let (id, position, radius) = {
            let e = entity.borrow();
            (e.id(), e.position(), e.radius())
        };

        let existing = self.links.borrow().body_for(id);
        if let Some(existing) = existing {
            if self.world.contains_body(existing) {
                log::warn!("Entity {} already has a body; reusing it", id);
                return existing;
            }
            self.links.borrow_mut().remove_body(existing);
        }

        let kind = if dynamic {
            BodyKind::Dynamic
        } else {
            BodyKind::Static
        };
        let mut def = BodyDef::new(kind, position);
        def.linear_damping = self.config.linear_damping;
        def.angular_damping = self.config.angular_damping;
        let body = self.world.create_body(&def);

        let material = self.config.material;
        let fixture = FixtureDef::new(Shape::circle(radius)).with_material(
            material.density,
            material.friction,
            material.restitution,
        );
        let _ = self.world.create_fixture(body, &fixture);

        self.links.borrow_mut().insert(body, id, entity);
        log::debug!("Created {:?} body {:?} for entity {} (r={})", kind, body, id, radius);
        body
    }

    /// Unmap and destroy a body together. Returns false if neither existed.
    pub fn remove_body(&mut self, body: BodyHandle) -> bool {
        let link = self.links.borrow_mut().remove_body(body);
        let destroyed = self.world.destroy_body(body);
        if let Some(link) = &link {
            log::debug!("Removed body {:?} of entity {}", body, link.id);
        }
        link.is_some() || destroyed
    }

    /// Copy a body's position and velocity onto an entity
    pub fn update_entity_from_body(&self, entity: &EntityRef, body: BodyHandle) {
        let Some(body) = self.world.body(body) else {
            return;
        };
        if let Ok(mut entity) = entity.try_borrow_mut() {
            entity.set_position(body.position());
            entity.set_velocity(body.linear_velocity());
        }
    }

    /// Position of a body, or zero for a stale handle
    pub fn body_position(&self, body: BodyHandle) -> Vec2 {
        self.world.body(body).map_or(Vec2::ZERO, |b| b.position())
    }

    /// Move a body, keeping its angle
    pub fn set_body_position(&mut self, body: BodyHandle, position: Vec2) {
        if let Some(body) = self.world.body_mut(body) {
            let angle = body.angle();
            body.set_transform(position, angle);
        }
    }

    pub fn body_velocity(&self, body: BodyHandle) -> Vec2 {
        self.world.body(body).map_or(Vec2::ZERO, |b| b.linear_velocity())
    }

    pub fn set_body_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.world.body_mut(body) {
            body.set_linear_velocity(velocity);
        }
    }

    pub fn body_angle(&self, body: BodyHandle) -> f32 {
        self.world.body(body).map_or(0.0, |b| b.angle())
    }

    /// Adds `force` directly to the body's velocity (no mass or time scaling)
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(body) = self.world.body_mut(body) {
            body.apply_force_to_center(force, true);
        }
    }

    /// Adds `impulse` directly to the body's velocity
    pub fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.world.body_mut(body) {
            body.apply_linear_impulse_to_center(impulse, true);
        }
    }

    /// Entity mapped to a body, if it is still alive
    pub fn entity_for(&self, body: BodyHandle) -> Option<EntityRef> {
        self.links.borrow().get(body)?.upgrade()
    }

    pub fn body_for(&self, entity: EntityId) -> Option<BodyHandle> {
        self.links.borrow().body_for(entity)
    }

    /// Number of entity-mapped bodies
    pub fn body_count(&self) -> usize {
        self.links.borrow().len()
    }

    /// Two-sided collisions delivered to entities so far
    pub fn dispatched_collisions(&self) -> u64 {
        self.dispatcher.borrow().dispatched()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Raw world access, for physics-only bodies that have no entity
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Destroy every body, mapped or not
    pub fn clear(&mut self) {
        let handles = self.links.borrow().handles();
        for handle in handles {
            self.world.destroy_body(handle);
        }
        self.links.borrow_mut().clear();
        self.world.clear();
    }
}

impl Drop for PhysicsBridge {
    fn drop(&mut self) {
        self.clear();
    }
}
