//! Entity capability contract
//!
//! Anything the physics bridge tracks implements `Entity`: readable and
//! writable position and velocity, a radius, a stable id, and a reaction to
//! collisions. Entities are shared as `EntityRef`; the bridge only ever keeps
//! weak links to them.

pub mod kinds;
pub mod manager;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use kinds::{Actor, PowerUp, PowerUpKind, Projectile, ProjectileKind};
pub use manager::{EntityFactory, EntityManager};

/// Stable entity identity, usable as a map key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity kinds. Queries filter on this instead of downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Drone,
    PowerUp,
    Projectile,
}

/// State every entity carries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCore {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl EntityCore {
    pub fn new(id: EntityId, kind: EntityKind, position: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            radius,
            active: true,
        }
    }

    /// Move by the current velocity (for entities not driven by a body)
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }
}

/// What the physics bridge needs from a gameplay object
pub trait Entity {
    fn core(&self) -> &EntityCore;
    fn core_mut(&mut self) -> &mut EntityCore;

    fn id(&self) -> EntityId {
        self.core().id
    }

    fn kind(&self) -> EntityKind {
        self.core().kind
    }

    fn position(&self) -> Vec2 {
        self.core().position
    }

    fn set_position(&mut self, position: Vec2) {
        self.core_mut().position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.core().velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.core_mut().velocity = velocity;
    }

    fn radius(&self) -> f32 {
        self.core().radius
    }

    /// Inactive entities are skipped by sync and dispatch, then reaped
    fn is_active(&self) -> bool {
        self.core().active
    }

    fn set_active(&mut self, active: bool) {
        self.core_mut().active = active;
    }

    /// Per-frame gameplay logic
    fn update(&mut self, _dt: f32) {}

    /// Called once per contact onset with the entity on the other side
    fn handle_collision(&mut self, other: &dyn Entity);
}

/// Shared handle to an entity owned by the entity manager
pub type EntityRef = Rc<RefCell<dyn Entity>>;

/// Wrap a concrete entity into a shared handle
pub fn into_ref<E: Entity + 'static>(entity: E) -> EntityRef {
    Rc::new(RefCell::new(entity))
}
