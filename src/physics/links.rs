//! Body ↔ entity association
//!
//! One body per entity, one entity per body. Links hold the entity weakly:
//! the entity manager owns entities, and a dropped entity is detected here
//! rather than dereferenced.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use slotmap::SecondaryMap;

use super::body::BodyHandle;
use crate::entity::{Entity, EntityId, EntityRef};

#[derive(Clone)]
pub(crate) struct EntityLink {
    pub id: EntityId,
    pub entity: Weak<RefCell<dyn Entity>>,
}

impl EntityLink {
    pub fn upgrade(&self) -> Option<EntityRef> {
        self.entity.upgrade()
    }
}

#[derive(Default)]
pub(crate) struct EntityLinks {
    by_body: SecondaryMap<BodyHandle, EntityLink>,
    by_entity: HashMap<EntityId, BodyHandle>,
}

impl EntityLinks {
    pub fn insert(&mut self, body: BodyHandle, id: EntityId, entity: &EntityRef) {
        self.by_body.insert(
            body,
            EntityLink {
                id,
                entity: Rc::downgrade(entity),
            },
        );
        self.by_entity.insert(id, body);
    }

    /// Erase both directions of a link
    pub fn remove_body(&mut self, body: BodyHandle) -> Option<EntityLink> {
        let link = self.by_body.remove(body)?;
        self.by_entity.remove(&link.id);
        Some(link)
    }

    pub fn get(&self, body: BodyHandle) -> Option<&EntityLink> {
        self.by_body.get(body)
    }

    pub fn body_for(&self, id: EntityId) -> Option<BodyHandle> {
        self.by_entity.get(&id).copied()
    }

    /// Owned copy of every link, safe to walk while links change
    pub fn snapshot(&self) -> Vec<(BodyHandle, EntityLink)> {
        self.by_body
            .iter()
            .map(|(body, link)| (body, link.clone()))
            .collect()
    }

    pub fn handles(&self) -> Vec<BodyHandle> {
        self.by_body.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.by_body.len()
    }

    pub fn clear(&mut self) {
        self.by_body.clear();
        self.by_entity.clear();
    }
}
