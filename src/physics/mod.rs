//! Physics layer
//!
//! Two levels:
//! - `World`: handle-based rigid-body world (bodies, fixtures, step, contacts)
//! - `PhysicsBridge`: entity-centric facade that maps bodies to entities,
//!   dispatches collisions and syncs entity state after each step
//!
//! Everything runs on the caller's thread. Contact callbacks fire inline,
//! inside `World::step`.

pub mod body;
pub mod bridge;
pub mod contact;
pub mod dispatch;
mod links;
pub mod shape;
pub mod world;

pub use body::{Body, BodyDef, BodyHandle, BodyKind, Fixture, FixtureDef, FixtureHandle};
pub use bridge::PhysicsBridge;
pub use contact::{Contact, ContactListener};
pub use dispatch::CollisionDispatcher;
pub use shape::{Circle, Shape, circles_overlap};
pub use world::{BodySnapshot, World, WorldSnapshot};
