//! Entity ownership
//!
//! The manager owns every entity (strong refs). The physics bridge holds weak
//! links, so dropping an entity here is enough to make it unreachable there.

use std::collections::HashMap;

use glam::Vec2;

use super::{Entity, EntityId, EntityKind, EntityRef, into_ref};

/// Builds an entity of a registered type at a position
pub type EntityFactory = Box<dyn Fn(EntityId, Vec2) -> EntityRef>;

pub struct EntityManager {
    /// In insertion order
    entities: Vec<EntityRef>,
    factories: HashMap<String, EntityFactory>,
    next_id: u32,
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityManager {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            factories: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID, never one that is currently managed
    pub fn next_entity_id(&mut self) -> EntityId {
        loop {
            let id = EntityId(self.next_id);
            self.next_id = self.next_id.checked_add(1).unwrap_or_else(|| {
                log::warn!("Entity ids exhausted; wrapping around");
                1
            });
            if self.get(id).is_none() {
                return id;
            }
        }
    }

    /// Build an entity with a fresh id and take ownership of it
    pub fn create<E, F>(&mut self, build: F) -> EntityRef
    where
        E: Entity + 'static,
        F: FnOnce(EntityId) -> E,
    {
        let id = self.next_entity_id();
        let entity = into_ref(build(id));
        self.entities.push(entity.clone());
        entity
    }

    /// Take ownership of an already-built entity. False if its id is taken.
    pub fn add(&mut self, entity: EntityRef) -> bool {
        let id = entity.borrow().id();
        if self.get(id).is_some() {
            log::warn!("Entity {} already managed; ignoring duplicate add", id);
            return false;
        }
        // Keep generated ids clear of caller-chosen ones
        if let Some(after) = id.0.checked_add(1) {
            self.next_id = self.next_id.max(after);
        }
        self.entities.push(entity);
        true
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityRef> {
        let index = self.entities.iter().position(|e| e.borrow().id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Ids of entities that have deactivated themselves
    pub fn inactive_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter_map(|e| {
                let e = e.borrow();
                (!e.is_active()).then(|| e.id())
            })
            .collect()
    }

    /// Drop every inactive entity, returning them
    pub fn remove_inactive(&mut self) -> Vec<EntityRef> {
        let (inactive, active): (Vec<EntityRef>, Vec<EntityRef>) = self
            .entities
            .drain(..)
            .partition(|e| !e.borrow().is_active());
        self.entities = active;
        inactive
    }

    pub fn register_factory(&mut self, type_name: impl Into<String>, factory: EntityFactory) {
        self.factories.insert(type_name.into(), factory);
    }

    /// Create an entity from a registered factory. None for an unknown type.
    pub fn create_by_type(&mut self, type_name: &str, position: Vec2) -> Option<EntityRef> {
        if !self.factories.contains_key(type_name) {
            log::warn!("No entity factory registered for '{}'", type_name);
            return None;
        }
        let id = self.next_entity_id();
        let entity = (self.factories[type_name])(id, position);
        self.entities.push(entity.clone());
        Some(entity)
    }

    pub fn all(&self) -> &[EntityRef] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<EntityRef> {
        self.entities.iter().find(|e| e.borrow().id() == id).cloned()
    }

    /// Entities of one kind, in insertion order
    pub fn by_kind(&self, kind: EntityKind) -> Vec<EntityRef> {
        self.entities
            .iter()
            .filter(|e| e.borrow().kind() == kind)
            .cloned()
            .collect()
    }

    /// Run per-frame logic on every active entity
    pub fn update_all(&mut self, dt: f32) {
        for entity in &self.entities {
            let mut entity = entity.borrow_mut();
            if entity.is_active() {
                entity.update(dt);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Actor, PowerUp, PowerUpKind};

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut manager = EntityManager::new();
        let a = manager.create(|id| Actor::player(id, Vec2::ZERO));
        let b = manager.create(|id| Actor::drone(id, Vec2::ZERO));
        assert_eq!(a.borrow().id(), EntityId(1));
        assert_eq!(b.borrow().id(), EntityId(2));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_by_kind_filters_on_enum() {
        let mut manager = EntityManager::new();
        manager.create(|id| Actor::player(id, Vec2::ZERO));
        manager.create(|id| Actor::drone(id, Vec2::ZERO));
        manager.create(|id| Actor::drone(id, Vec2::ZERO));
        manager.create(|id| PowerUp::new(id, Vec2::ZERO, PowerUpKind::Speed));
        assert_eq!(manager.by_kind(EntityKind::Drone).len(), 2);
        assert_eq!(manager.by_kind(EntityKind::PowerUp).len(), 1);
        assert!(manager.by_kind(EntityKind::Projectile).is_empty());
    }

    #[test]
    fn test_remove_inactive() {
        let mut manager = EntityManager::new();
        let a = manager.create(|id| Actor::player(id, Vec2::ZERO));
        let b = manager.create(|id| Actor::drone(id, Vec2::ZERO));
        b.borrow_mut().set_active(false);
        assert_eq!(manager.inactive_ids(), vec![EntityId(2)]);

        let removed = manager.remove_inactive();
        assert_eq!(removed.len(), 1);
        assert_eq!(manager.len(), 1);
        assert!(manager.get(a.borrow().id()).is_some());
        assert!(manager.get(EntityId(2)).is_none());
    }

    #[test]
    fn test_factory_registry() {
        let mut manager = EntityManager::new();
        manager.register_factory(
            "drone",
            Box::new(|id, pos| into_ref(Actor::drone(id, pos))),
        );
        let drone = manager
            .create_by_type("drone", Vec2::new(200.0, 100.0))
            .unwrap();
        assert_eq!(drone.borrow().kind(), EntityKind::Drone);
        assert_eq!(drone.borrow().position(), Vec2::new(200.0, 100.0));
        assert!(manager.create_by_type("boss", Vec2::ZERO).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_add_keeps_ids_unique() {
        let mut manager = EntityManager::new();
        assert!(manager.add(into_ref(Actor::player(EntityId(10), Vec2::ZERO))));
        assert!(!manager.add(into_ref(Actor::player(EntityId(10), Vec2::ZERO))));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.next_entity_id(), EntityId(11));
    }

    #[test]
    fn test_max_id_does_not_exhaust_allocator() {
        let mut manager = EntityManager::new();
        assert!(manager.add(into_ref(Actor::drone(EntityId(u32::MAX), Vec2::ZERO))));
        assert_eq!(manager.next_entity_id(), EntityId(1));
        assert_eq!(manager.next_entity_id(), EntityId(2));
    }

    #[test]
    fn test_allocator_wraps_past_live_ids() {
        let mut manager = EntityManager::new();
        manager.add(into_ref(Actor::player(EntityId(1), Vec2::ZERO)));
        manager.next_id = u32::MAX;
        assert_eq!(manager.next_entity_id(), EntityId(u32::MAX));
        // 1 is still managed, so the wrapped allocator skips it
        assert_eq!(manager.next_entity_id(), EntityId(2));
    }

    #[test]
    fn test_update_all_skips_inactive() {
        let mut manager = EntityManager::new();
        let live = manager.create(|id| PowerUp::new(id, Vec2::ZERO, PowerUpKind::Health));
        let dead = manager.create(|id| PowerUp::new(id, Vec2::ZERO, PowerUpKind::Health));
        dead.borrow_mut().set_active(false);
        manager.update_all(1.0);
        assert!(live.borrow().radius() > 10.0);
        assert_eq!(dead.borrow().radius(), 10.0);

        assert!(manager.remove(EntityId(1)).is_some());
        manager.clear();
        assert!(manager.is_empty());
    }
}
