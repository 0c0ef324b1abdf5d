//! The authoritative set of live entities.

use crate::entity::Entity;
use ecogrid_core::{EntityId, Population};
use std::collections::HashMap;

/// Arena of entity slots in insertion order.
///
/// Removal leaves a tombstone so that slot positions stay stable while a tick
/// is iterating; [`Registry::compact`] drops the tombstones between ticks.
#[derive(Debug, Default)]
pub struct Registry {
    slots: Vec<Option<Entity>>,
    index: HashMap<EntityId, usize>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh handle. Handles are never reused.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, entity: Entity) {
        debug_assert!(
            !self.index.contains_key(&entity.id),
            "{} registered twice",
            entity.id
        );
        self.index.insert(entity.id, self.slots.len());
        self.slots.push(Some(entity));
    }

    /// Remove an entity, leaving a tombstone. Removing an absent handle
    /// returns `None` and changes nothing.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.index.remove(&id)?;
        self.slots[slot].take()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Handles of every live entity, in insertion order.
    pub fn snapshot(&self) -> Vec<EntityId> {
        self.iter().map(|entity| entity.id).collect()
    }

    /// Live entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Drop tombstones and re-index the remaining slots.
    pub fn compact(&mut self) {
        if self.slots.len() == self.index.len() {
            return;
        }
        self.slots.retain(Option::is_some);
        self.index.clear();
        for (slot, entity) in self.slots.iter().enumerate() {
            if let Some(entity) = entity {
                self.index.insert(entity.id, slot);
            }
        }
    }

    /// Translate every footprint after the grid grew by `offset`.
    pub(crate) fn rebase(&mut self, offset: i32) {
        for entity in self.iter_mut() {
            entity.footprint.rebase(offset);
        }
    }

    pub fn population(&self) -> Population {
        let mut population = Population::default();
        for entity in self.iter() {
            population.record(entity.kind());
        }
        population
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Creature;

    fn plant(registry: &mut Registry) -> EntityId {
        let id = registry.allocate_id();
        registry.insert(Entity::new(id, 0, 50.0, Creature::Plant { toxic: false }));
        id
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = Registry::new();
        let a = plant(&mut registry);
        let b = plant(&mut registry);
        let c = plant(&mut registry);
        assert_eq!(registry.snapshot(), vec![a, b, c]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_handles_are_monotonic() {
        let mut registry = Registry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert!(b > a);
    }

    #[test]
    fn test_remove_tombstones_then_compacts() {
        let mut registry = Registry::new();
        let a = plant(&mut registry);
        let b = plant(&mut registry);
        let c = plant(&mut registry);

        assert!(registry.remove(b).is_some());
        assert!(!registry.contains(b));
        assert_eq!(registry.slots.len(), 3);
        assert_eq!(registry.snapshot(), vec![a, c]);

        registry.compact();
        assert_eq!(registry.slots.len(), 2);
        assert_eq!(registry.get(c).map(|e| e.id), Some(c));
        assert_eq!(registry.snapshot(), vec![a, c]);
    }

    #[test]
    fn test_double_removal_is_noop() {
        let mut registry = Registry::new();
        let a = plant(&mut registry);
        assert!(registry.remove(a).is_some());
        assert!(registry.remove(a).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_population() {
        let mut registry = Registry::new();
        plant(&mut registry);
        plant(&mut registry);
        let population = registry.population();
        assert_eq!(population.plants, 2);
        assert_eq!(population.total(), 2);
    }
}
