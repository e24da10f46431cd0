//! The physics world: body registry, stepping and contact generation
//!
//! Step order is fixed:
//! 1. Integrate positions from velocities (non-static, active, awake bodies)
//! 2. Detect circle overlaps over all fixture pairs
//! 3. Diff against last step and deliver begin/end events to the listener
//!
//! Gravity and damping are stored but not applied by the integrator.
//! Callers that want them apply velocity changes themselves each frame.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Weak;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::body::{Body, BodyDef, BodyHandle, BodyKind, Fixture, FixtureDef, FixtureHandle};
use super::contact::{Contact, ContactListener, ContactSet, PairKey, pair_key};
use super::shape::WorldShape;

/// Serializable state of one body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f32,
    pub linear_velocity: Vec2,
    pub fixture_count: usize,
}

/// Serializable state of the whole world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub gravity: Vec2,
    pub bodies: Vec<BodySnapshot>,
    pub contacts: usize,
}

/// A fixture placed in world space for one detection pass
struct Placed {
    fixture: FixtureHandle,
    body: BodyHandle,
    is_static: bool,
    shape: WorldShape,
}

pub struct World {
    bodies: SlotMap<BodyHandle, Body>,
    fixtures: SlotMap<FixtureHandle, Fixture>,
    gravity: Vec2,
    contacts: ContactSet,
    listener: Option<Weak<RefCell<dyn ContactListener>>>,
}

impl World {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            fixtures: SlotMap::with_key(),
            gravity,
            contacts: ContactSet::default(),
            listener: None,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Register the single contact listener, replacing any previous one.
    /// Held weakly: the caller keeps it alive.
    pub fn set_contact_listener(&mut self, listener: Weak<RefCell<dyn ContactListener>>) {
        self.listener = Some(listener);
    }

    pub fn clear_contact_listener(&mut self) {
        self.listener = None;
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let handle = self.bodies.insert(Body::from_def(def));
        log::trace!("Created {:?} body {:?} at {}", def.kind, handle, def.position);
        handle
    }

    /// Destroy a body and its fixtures. Returns false for a stale handle.
    ///
    /// Contacts involving the body vanish without an end event.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.bodies.remove(handle) else {
            return false;
        };
        for fixture in body.fixtures {
            self.fixtures.remove(fixture);
            self.contacts.forget_fixture(fixture);
        }
        log::trace!("Destroyed body {:?}", handle);
        true
    }

    /// Attach geometry to a body. None if the body no longer exists.
    pub fn create_fixture(&mut self, body: BodyHandle, def: &FixtureDef) -> Option<FixtureHandle> {
        let owner = self.bodies.get_mut(body)?;
        let handle = self.fixtures.insert(Fixture::new(body, def));
        owner.fixtures.push(handle);
        Some(handle)
    }

    /// Detach and drop a fixture. Returns false for a stale handle.
    pub fn destroy_fixture(&mut self, handle: FixtureHandle) -> bool {
        let Some(fixture) = self.fixtures.remove(handle) else {
            return false;
        };
        if let Some(body) = self.bodies.get_mut(fixture.body()) {
            body.fixtures.retain(|&f| f != handle);
        }
        self.contacts.forget_fixture(handle);
        true
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn fixture(&self, handle: FixtureHandle) -> Option<&Fixture> {
        self.fixtures.get(handle)
    }

    pub fn fixture_mut(&mut self, handle: FixtureHandle) -> Option<&mut Fixture> {
        self.fixtures.get_mut(handle)
    }

    pub fn contains_body(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// All bodies. No ordering is promised.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Number of fixture pairs overlapping as of the last step
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Whether two fixtures were overlapping at the end of the last step
    pub fn is_touching(&self, a: FixtureHandle, b: FixtureHandle) -> bool {
        self.contacts.contains(a, b)
    }

    /// Destroy every body and fixture
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.fixtures.clear();
        self.contacts.clear();
    }

    /// Advance the world by `dt` seconds
    ///
    /// Iteration counts are accepted for interface compatibility; the single
    /// pass integrator does not use them. Every contact event produced by this
    /// step is delivered before it returns.
    pub fn step(&mut self, dt: f32, _velocity_iterations: u32, _position_iterations: u32) {
        for (_, body) in self.bodies.iter_mut() {
            if body.is_integrated() {
                body.integrate(dt);
            }
        }

        let overlaps = self.find_overlaps();
        let transitions = self.contacts.update(overlaps);
        if transitions.began.is_empty() && transitions.ended.is_empty() {
            return;
        }

        for pair in transitions.began {
            self.deliver(pair, true);
        }
        for pair in transitions.ended {
            self.deliver(pair, false);
        }
    }

    /// All overlapping fixture pairs after integration
    fn find_overlaps(&self) -> BTreeSet<PairKey> {
        let placed: Vec<Placed> = self
            .fixtures
            .iter()
            .filter_map(|(handle, fixture)| {
                let body = self.bodies.get(fixture.body())?;
                if !body.is_active() {
                    return None;
                }
                Some(Placed {
                    fixture: handle,
                    body: fixture.body(),
                    is_static: body.kind() == BodyKind::Static,
                    shape: fixture.shape().to_world(body.position(), body.angle()),
                })
            })
            .collect();

        let mut overlaps = BTreeSet::new();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if a.body == b.body || (a.is_static && b.is_static) {
                    continue;
                }
                if a.shape.overlaps(&b.shape) {
                    overlaps.insert(pair_key(a.fixture, b.fixture));
                }
            }
        }
        overlaps
    }

    /// Resolve a pair to a contact, or None if a callback already destroyed one side
    fn resolve(&self, (a, b): PairKey) -> Option<Contact> {
        let fa = self.fixtures.get(a)?;
        let fb = self.fixtures.get(b)?;
        Some(Contact {
            fixture_a: a,
            fixture_b: b,
            body_a: fa.body(),
            body_b: fb.body(),
            is_sensor: fa.is_sensor() || fb.is_sensor(),
        })
    }

    fn deliver(&mut self, pair: PairKey, began: bool) {
        let Some(contact) = self.resolve(pair) else {
            log::trace!("Dropping contact event for destroyed fixture {:?}", pair);
            return;
        };
        let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let Ok(mut listener) = listener.try_borrow_mut() else {
            log::warn!("Contact listener re-entered during step; event dropped");
            return;
        };
        if began {
            listener.begin_contact(self, &contact);
        } else {
            listener.end_contact(self, &contact);
        }
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            gravity: self.gravity,
            bodies: self
                .bodies
                .values()
                .map(|b| BodySnapshot {
                    kind: b.kind(),
                    position: b.position(),
                    angle: b.angle(),
                    linear_velocity: b.linear_velocity(),
                    fixture_count: b.fixtures().len(),
                })
                .collect(),
            contacts: self.contacts.len(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}
