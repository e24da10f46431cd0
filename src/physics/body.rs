//! Bodies and fixtures
//!
//! Both live in arenas owned by the `World` and are referred to by
//! generational handles. A stale handle simply fails to resolve.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::shape::Shape;

new_key_type! {
    /// Stable handle to a body in a `World`
    pub struct BodyHandle;
    /// Stable handle to a fixture in a `World`
    pub struct FixtureHandle;
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    #[default]
    Static,
    /// Moves only by its explicitly set velocity
    Kinematic,
    /// Moves by velocity, and accepts forces and impulses
    Dynamic,
}

/// Everything needed to create a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub angular_velocity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub allow_sleep: bool,
    pub awake: bool,
    pub fixed_rotation: bool,
    pub bullet: bool,
    pub active: bool,
    /// Opaque tag for the caller
    pub user_data: u64,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            kind: BodyKind::Static,
            position: Vec2::ZERO,
            angle: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            allow_sleep: true,
            awake: true,
            fixed_rotation: false,
            bullet: false,
            active: true,
            user_data: 0,
        }
    }
}

impl BodyDef {
    pub fn new(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }
}

/// A simulated object
#[derive(Debug, Clone)]
pub struct Body {
    kind: BodyKind,
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    linear_damping: f32,
    angular_damping: f32,
    allow_sleep: bool,
    awake: bool,
    fixed_rotation: bool,
    bullet: bool,
    active: bool,
    user_data: u64,
    /// Owned fixtures, in creation order (maintained by the world)
    pub(crate) fixtures: Vec<FixtureHandle>,
}

impl Body {
    pub(crate) fn from_def(def: &BodyDef) -> Self {
        let moving = def.kind != BodyKind::Static;
        Self {
            kind: def.kind,
            position: def.position,
            angle: def.angle,
            linear_velocity: if moving { def.linear_velocity } else { Vec2::ZERO },
            angular_velocity: if moving { def.angular_velocity } else { 0.0 },
            linear_damping: def.linear_damping,
            angular_damping: def.angular_damping,
            allow_sleep: def.allow_sleep,
            awake: def.awake,
            fixed_rotation: def.fixed_rotation,
            bullet: def.bullet,
            active: def.active,
            user_data: def.user_data,
            fixtures: Vec::new(),
        }
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Teleport the body. Allowed for every kind, including static.
    pub fn set_transform(&mut self, position: Vec2, angle: f32) {
        self.position = position;
        self.angle = angle;
    }

    /// Ignored for static bodies
    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        if self.kind == BodyKind::Static {
            return;
        }
        if velocity.length_squared() > 0.0 {
            self.awake = true;
        }
        self.linear_velocity = velocity;
    }

    /// Ignored for static bodies
    pub fn set_angular_velocity(&mut self, velocity: f32) {
        if self.kind == BodyKind::Static {
            return;
        }
        if velocity != 0.0 {
            self.awake = true;
        }
        self.angular_velocity = velocity;
    }

    /// Adds `force` straight onto linear velocity. Dynamic bodies only.
    ///
    /// Deliberately not integrated over mass or time: one call is one
    /// velocity delta, which is what the gameplay tuning expects.
    pub fn apply_force_to_center(&mut self, force: Vec2, wake: bool) {
        self.push_velocity(force, wake);
    }

    /// Adds `impulse` straight onto linear velocity. Dynamic bodies only.
    pub fn apply_linear_impulse_to_center(&mut self, impulse: Vec2, wake: bool) {
        self.push_velocity(impulse, wake);
    }

    fn push_velocity(&mut self, delta: Vec2, wake: bool) {
        if self.kind != BodyKind::Dynamic {
            return;
        }
        if wake {
            self.awake = true;
        }
        self.linear_velocity += delta;
    }

    pub fn linear_damping(&self) -> f32 {
        self.linear_damping
    }

    pub fn set_linear_damping(&mut self, damping: f32) {
        self.linear_damping = damping.max(0.0);
    }

    pub fn angular_damping(&self) -> f32 {
        self.angular_damping
    }

    pub fn set_angular_damping(&mut self, damping: f32) {
        self.angular_damping = damping.max(0.0);
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Putting a body to sleep is refused when sleeping is disallowed
    pub fn set_awake(&mut self, awake: bool) {
        if !awake && !self.allow_sleep {
            return;
        }
        self.awake = awake;
    }

    pub fn is_sleeping_allowed(&self) -> bool {
        self.allow_sleep
    }

    pub fn set_sleeping_allowed(&mut self, allow: bool) {
        self.allow_sleep = allow;
        if !allow {
            self.awake = true;
        }
    }

    pub fn is_fixed_rotation(&self) -> bool {
        self.fixed_rotation
    }

    pub fn set_fixed_rotation(&mut self, fixed: bool) {
        self.fixed_rotation = fixed;
        if fixed {
            self.angular_velocity = 0.0;
        }
    }

    pub fn is_bullet(&self) -> bool {
        self.bullet
    }

    pub fn set_bullet(&mut self, bullet: bool) {
        self.bullet = bullet;
    }

    /// Inactive bodies are neither integrated nor collided
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn user_data(&self) -> u64 {
        self.user_data
    }

    pub fn set_user_data(&mut self, data: u64) {
        self.user_data = data;
    }

    pub fn fixtures(&self) -> &[FixtureHandle] {
        &self.fixtures
    }

    /// Whether `step` moves this body
    pub(crate) fn is_integrated(&self) -> bool {
        self.kind != BodyKind::Static && self.active && self.awake
    }

    /// First-order integration from the current velocity
    pub(crate) fn integrate(&mut self, dt: f32) {
        self.position += self.linear_velocity * dt;
        if !self.fixed_rotation {
            self.angle += self.angular_velocity * dt;
        }
    }
}

/// Everything needed to attach geometry to a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    pub shape: Shape,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub is_sensor: bool,
    pub user_data: u64,
}

impl FixtureDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            user_data: 0,
        }
    }

    pub fn with_material(mut self, density: f32, friction: f32, restitution: f32) -> Self {
        self.density = density;
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    pub fn sensor(mut self, is_sensor: bool) -> Self {
        self.is_sensor = is_sensor;
        self
    }
}

/// Collision geometry plus material, owned by exactly one body
#[derive(Debug, Clone)]
pub struct Fixture {
    body: BodyHandle,
    shape: Shape,
    density: f32,
    friction: f32,
    restitution: f32,
    is_sensor: bool,
    user_data: u64,
}

impl Fixture {
    pub(crate) fn new(body: BodyHandle, def: &FixtureDef) -> Self {
        Self {
            body,
            shape: def.shape,
            density: def.density.max(0.0),
            friction: def.friction,
            restitution: def.restitution,
            is_sensor: def.is_sensor,
            user_data: def.user_data,
        }
    }

    /// Owning body, fixed at creation
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    pub fn set_sensor(&mut self, is_sensor: bool) {
        self.is_sensor = is_sensor;
    }

    pub fn user_data(&self) -> u64 {
        self.user_data
    }
}
