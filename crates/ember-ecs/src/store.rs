//! Typed component storage.
//!
//! Each component type lives in its own [`SparseSet`]: a sparse map from
//! entity to dense index plus parallel dense vectors of entities and data.
//! Removal swap-removes within the dense arrays, so iteration order is the
//! insertion order of the surviving entries (stable between mutations, but
//! permuted by removals).
//!
//! Sets are held behind the object-safe [`ComponentStorage`] trait so the
//! registry can clear a despawned entity out of every column without knowing
//! the concrete component types. Downcasting goes through [`Any`]; no raw
//! pointers anywhere.

use std::any::Any;
use std::collections::HashMap;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// ComponentStorage
// ---------------------------------------------------------------------------

/// Type-erased view of a component column, enough for the registry to do
/// per-entity bookkeeping.
pub trait ComponentStorage {
    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Drop the entity's component if the column holds one.
    fn discard(&mut self, id: EntityId);

    /// Whether the column holds a component for the entity.
    fn contains(&self, id: EntityId) -> bool;

    /// Number of components in the column.
    fn len(&self) -> usize;

    /// Whether the column is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// SparseSet
// ---------------------------------------------------------------------------

/// Dense storage for a single component type.
#[derive(Debug)]
pub struct SparseSet<T> {
    sparse: HashMap<EntityId, usize>,
    dense: Vec<EntityId>,
    data: Vec<T>,
}

impl<T> SparseSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            sparse: HashMap::new(),
            dense: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Insert a component for `id`, returning the previous value if the
    /// entity already had one.
    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        if let Some(&slot) = self.sparse.get(&id) {
            return Some(std::mem::replace(&mut self.data[slot], value));
        }
        self.sparse.insert(id, self.dense.len());
        self.dense.push(id);
        self.data.push(value);
        None
    }

    /// Remove and return the component for `id`.
    ///
    /// Swap-removes within the dense arrays; the last entry takes the freed
    /// slot.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.sparse.remove(&id)?;
        let last = self.dense.len() - 1;
        self.dense.swap_remove(slot);
        let value = self.data.swap_remove(slot);
        if slot != last {
            // The previous tail entity now lives at `slot`.
            self.sparse.insert(self.dense[slot], slot);
        }
        Some(value)
    }

    /// Shared access to the component for `id`.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.sparse.get(&id).map(|&slot| &self.data[slot])
    }

    /// Mutable access to the component for `id`.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = *self.sparse.get(&id)?;
        Some(&mut self.data[slot])
    }

    /// Whether the set holds a component for `id`.
    pub fn contains(&self, id: EntityId) -> bool {
        self.sparse.contains_key(&id)
    }

    /// Iterate `(entity, &component)` pairs in dense order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.dense.iter().copied().zip(self.data.iter())
    }

    /// Iterate `(entity, &mut component)` pairs in dense order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.dense.iter().copied().zip(self.data.iter_mut())
    }

    /// The entities in the set, in dense order.
    pub fn entities(&self) -> &[EntityId] {
        &self.dense
    }
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> ComponentStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn discard(&mut self, id: EntityId) {
        self.remove(id);
    }

    fn contains(&self, id: EntityId) -> bool {
        SparseSet::contains(self, id)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> EntityId {
        EntityId::new(n, 0)
    }

    #[test]
    fn insert_get_remove() {
        let mut set = SparseSet::new();
        assert_eq!(set.insert(id(0), "a"), None);
        assert_eq!(set.insert(id(1), "b"), None);
        assert_eq!(set.get(id(0)), Some(&"a"));
        assert_eq!(set.remove(id(0)), Some("a"));
        assert_eq!(set.get(id(0)), None);
        assert_eq!(set.get(id(1)), Some(&"b"));
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut set = SparseSet::new();
        set.insert(id(3), 10u32);
        assert_eq!(set.insert(id(3), 20u32), Some(10));
        assert_eq!(set.get(id(3)), Some(&20));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut set = SparseSet::new();
        for n in [5u32, 2, 9, 1] {
            set.insert(id(n), n);
        }
        let order: Vec<u32> = set.iter().map(|(e, _)| e.index()).collect();
        assert_eq!(order, vec![5, 2, 9, 1]);
    }

    #[test]
    fn swap_remove_keeps_sparse_consistent() {
        let mut set = SparseSet::new();
        for n in 0..4u32 {
            set.insert(id(n), n * 10);
        }
        // Removing the head moves the tail into slot 0.
        set.remove(id(0));
        assert_eq!(set.get(id(3)), Some(&30));
        assert_eq!(set.get(id(1)), Some(&10));
        let order: Vec<u32> = set.iter().map(|(e, _)| e.index()).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn remove_missing_is_none() {
        let mut set: SparseSet<u8> = SparseSet::new();
        assert_eq!(set.remove(id(7)), None);
    }

    #[test]
    fn discard_through_trait_object() {
        let mut set = SparseSet::new();
        set.insert(id(0), 1u8);
        let storage: &mut dyn ComponentStorage = &mut set;
        storage.discard(id(0));
        assert!(!storage.contains(id(0)));
        assert!(storage.is_empty());
    }
}
