//! The component registry.
//!
//! A [`Registry`] owns the entity allocator and one [`SparseSet`] column per
//! component type, keyed by [`TypeId`]. It exposes typed insert/get/remove
//! plus two iteration forms:
//!
//! * [`view`](Registry::view) -- every `(entity, &T)` pair in the column's
//!   dense order, and
//! * [`group`](Registry::group) -- entities holding both of two component
//!   types, driven by the first type's order.
//!
//! Dense order is insertion order until a removal swap-removes an entry;
//! after that it stays stable but permuted. Callers that depend on a
//! first-match rule (camera selection does) get insertion order as long as
//! they have not removed components of that type.

use std::any::TypeId;
use std::collections::HashMap;

use crate::entity::{EntityAllocator, EntityId};
use crate::store::{ComponentStorage, SparseSet};
use crate::EcsError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Entity allocator plus per-type component columns.
#[derive(Default)]
pub struct Registry {
    allocator: EntityAllocator,
    storages: HashMap<TypeId, Box<dyn ComponentStorage>>,
    /// Live entities in creation order.
    order: Vec<EntityId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -- entity lifecycle ---------------------------------------------------

    /// Spawn a new, component-less entity.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.order.push(id);
        id
    }

    /// Despawn an entity, dropping all of its components.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead or stale.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), EcsError> {
        if !self.allocator.deallocate(id) {
            return Err(EcsError::StaleEntity(id));
        }
        for storage in self.storages.values_mut() {
            storage.discard(id);
        }
        self.order.retain(|&e| e != id);
        tracing::trace!(entity = %id, "despawned");
        Ok(())
    }

    /// Whether the handle refers to a live entity.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.order.len()
    }

    /// Live entities in creation order.
    pub fn entities(&self) -> &[EntityId] {
        &self.order
    }

    // -- component access ---------------------------------------------------

    /// Attach a component to an entity.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead or stale.
    ///
    /// # Panics
    ///
    /// Panics if the entity already has a component of this type. Attaching
    /// twice is a logic error; use [`insert_or_replace`](Self::insert_or_replace)
    /// for overwrite semantics.
    pub fn insert<T: 'static>(&mut self, id: EntityId, value: T) -> Result<(), EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity(id));
        }
        let set = self.storage_mut_or_create::<T>();
        assert!(
            !set.contains(id),
            "entity {id} already has a {} component",
            std::any::type_name::<T>()
        );
        set.insert(id, value);
        Ok(())
    }

    /// Attach a component, replacing and returning any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::StaleEntity`] if the handle is dead or stale.
    pub fn insert_or_replace<T: 'static>(
        &mut self,
        id: EntityId,
        value: T,
    ) -> Result<Option<T>, EcsError> {
        if !self.allocator.is_alive(id) {
            return Err(EcsError::StaleEntity(id));
        }
        Ok(self.storage_mut_or_create::<T>().insert(id, value))
    }

    /// Shared access to an entity's component.
    pub fn get<T: 'static>(&self, id: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(id)
    }

    /// Mutable access to an entity's component.
    pub fn get_mut<T: 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(id)
    }

    /// Whether the entity has a component of type `T`.
    pub fn has<T: 'static>(&self, id: EntityId) -> bool {
        self.storage::<T>().is_some_and(|set| set.contains(id))
    }

    /// Detach and return an entity's component. `None` if absent.
    pub fn remove<T: 'static>(&mut self, id: EntityId) -> Option<T> {
        self.storage_mut::<T>()?.remove(id)
    }

    // -- iteration ----------------------------------------------------------

    /// Iterate every `(entity, &T)` pair in dense order.
    pub fn view<T: 'static>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.storage::<T>().into_iter().flat_map(|set| set.iter())
    }

    /// Iterate every `(entity, &mut T)` pair in dense order.
    pub fn view_mut<T: 'static>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.storage_mut::<T>()
            .into_iter()
            .flat_map(|set| set.iter_mut())
    }

    /// Iterate entities that hold both `A` and `B`, in `A`'s dense order.
    pub fn group<A: 'static, B: 'static>(&self) -> impl Iterator<Item = (EntityId, &A, &B)> {
        let b_set = self.storage::<B>();
        self.view::<A>()
            .filter_map(move |(id, a)| Some((id, a, b_set?.get(id)?)))
    }

    // -- storage plumbing ---------------------------------------------------

    fn storage<T: 'static>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref())
    }

    fn storage_mut<T: 'static>(&mut self) -> Option<&mut SparseSet<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut())
    }

    fn storage_mut_or_create<T: 'static>(&mut self) -> &mut SparseSet<T> {
        let boxed = self
            .storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()));
        boxed
            .as_any_mut()
            .downcast_mut()
            .unwrap_or_else(|| unreachable!("storage registered under the wrong TypeId"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
