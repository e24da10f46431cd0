//! Dodgeball physics - rigid-body world and entity collision bridge
//!
//! Core modules:
//! - `physics`: Body/fixture world, stepping, contact events, entity bridge
//! - `entity`: Entity capability contract and the gameplay entities
//! - `engine`: Context object that sequences physics and entity updates
//! - `config`: Data-driven physics and engine configuration
//! - `platform`: Logger setup for native and browser targets

pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod physics;
pub mod platform;

pub use config::{EngineConfig, MaterialDef, PhysicsConfig};
pub use engine::Engine;
pub use entity::{Entity, EntityCore, EntityId, EntityKind, EntityRef};
pub use error::PhysicsError;
pub use physics::{BodyHandle, BodyKind, PhysicsBridge, World};

pub use glam::Vec2;

/// Physics configuration constants
pub mod consts {
    /// Fixed physics timestep (60 Hz)
    pub const PHYSICS_DT: f32 = 1.0 / 60.0;
    /// Velocity solver iterations (accepted, unused by the integrator)
    pub const VELOCITY_ITERATIONS: u32 = 8;
    /// Position solver iterations (accepted, unused by the integrator)
    pub const POSITION_ITERATIONS: u32 = 3;

    /// Default vertical gravity
    pub const DEFAULT_GRAVITY: f32 = 9.8;

    /// Material for bridge-created fixtures - lively and bouncy
    pub const DEFAULT_DENSITY: f32 = 1.0;
    pub const DEFAULT_FRICTION: f32 = 0.3;
    pub const DEFAULT_RESTITUTION: f32 = 0.5;

    /// Damping stored on bridge-created bodies
    pub const DEFAULT_LINEAR_DAMPING: f32 = 0.5;
    pub const DEFAULT_ANGULAR_DAMPING: f32 = 0.5;

    /// Play field dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
}

/// Check two floats for approximate equality (relative to magnitude)
#[inline]
pub fn approx_eq(a: f32, b: f32, tolerance: f32) -> bool {
    (a - b).abs() <= tolerance * (1.0 + a.abs().max(b.abs()))
}
