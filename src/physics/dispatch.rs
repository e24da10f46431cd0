//! Contact → entity collision dispatch
//!
//! On contact onset both bodies are looked up in the link table. Only when
//! both resolve to live, active, distinct entities does each side get
//! `handle_collision` with the other, A first then B. A body without an
//! entity is physics-only and produces no callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use super::contact::{Contact, ContactListener};
use super::links::EntityLinks;
use super::world::World;
use crate::entity::EntityRef;

pub struct CollisionDispatcher {
    links: Rc<RefCell<EntityLinks>>,
    dispatched: u64,
}

impl CollisionDispatcher {
    pub(crate) fn new(links: Rc<RefCell<EntityLinks>>) -> Self {
        Self {
            links,
            dispatched: 0,
        }
    }

    /// Two-sided collisions delivered so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Both entities of a contact, if both sides are mapped, alive and active
    fn resolve(&self, contact: &Contact) -> Option<(EntityRef, EntityRef)> {
        let links = self.links.try_borrow().ok()?;
        let a = links.get(contact.body_a)?.upgrade()?;
        let b = links.get(contact.body_b)?.upgrade()?;
        drop(links);

        if Rc::ptr_eq(&a, &b) {
            return None;
        }
        let live = |e: &EntityRef| e.try_borrow().map(|e| e.is_active()).unwrap_or(false);
        (live(&a) && live(&b)).then_some((a, b))
    }
}

impl ContactListener for CollisionDispatcher {
    fn begin_contact(&mut self, _world: &mut World, contact: &Contact) {
        let Some((a, b)) = self.resolve(contact) else {
            return;
        };

        {
            let (Ok(mut first), Ok(second)) = (a.try_borrow_mut(), b.try_borrow()) else {
                log::warn!("Entity borrowed during collision dispatch; skipping contact");
                return;
            };
            log::trace!("Collision {} <-> {}", first.id(), second.id());
            first.handle_collision(&*second);
        }
        let (Ok(mut second), Ok(first)) = (b.try_borrow_mut(), a.try_borrow()) else {
            log::warn!("Entity borrowed during collision dispatch; second side skipped");
            return;
        };
        second.handle_collision(&*first);
        self.dispatched += 1;
    }

    fn end_contact(&mut self, _world: &mut World, contact: &Contact) {
        log::trace!("Contact ended: {:?} / {:?}", contact.body_a, contact.body_b);
    }
}
