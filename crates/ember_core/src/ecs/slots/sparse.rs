//! # Sparse Slots
//!
//! Unbounded slot table for rare or optional components.
//!
//! Values live in an entry vector; a `HashMap` maps each entity id to its
//! entry position. Inserts append and removals swap-remove, so the vector
//! drifts out of id order during a flush. `finish_commit` re-sorts it once
//! per flush, which is what gives traversal its ascending-id order. Traversal
//! never depends on hash bucket order.
//!
//! Entries move during a flush, which is why long-lived references must go
//! through stamped handles rather than borrows.

use std::collections::HashMap;

use super::{SlotTable, StoreKind};
use crate::ecs::entity::EntityId;

/// One committed value.
struct Entry<T> {
    id: EntityId,
    stamp: u64,
    value: T,
}

/// Hash-map backed storage for a single component type.
pub struct SparseSlots<T> {
    /// Committed values, ascending by id after `finish_commit`.
    entries: Vec<Entry<T>>,
    /// Entity id -> position in `entries`.
    index: HashMap<EntityId, usize>,
    /// Whether `entries` is currently in ascending id order.
    sorted: bool,
}

impl<T> SparseSlots<T> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            sorted: true,
        }
    }

    /// Re-sorts entries by id and rebuilds the position map.
    fn rebuild_order(&mut self) {
        self.entries.sort_unstable_by_key(|entry| entry.id);
        self.index.clear();
        self.index.extend(
            self.entries
                .iter()
                .enumerate()
                .map(|(position, entry)| (entry.id, position)),
        );
        self.sorted = true;
    }
}

impl<T> Default for SparseSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SlotTable<T> for SparseSlots<T> {
    fn kind(&self) -> StoreKind {
        StoreKind::Sparse
    }

    #[inline]
    fn accepts(&self, id: EntityId) -> bool {
        !id.is_null()
    }

    #[inline]
    fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    fn get(&self, id: EntityId) -> Option<&T> {
        let position = *self.index.get(&id)?;
        Some(&self.entries[position].value)
    }

    #[inline]
    fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let position = *self.index.get(&id)?;
        Some(&mut self.entries[position].value)
    }

    #[inline]
    fn stamp(&self, id: EntityId) -> Option<u64> {
        let position = *self.index.get(&id)?;
        Some(self.entries[position].stamp)
    }

    fn insert(&mut self, id: EntityId, value: T, stamp: u64) -> bool {
        if let Some(&position) = self.index.get(&id) {
            let entry = &mut self.entries[position];
            entry.value = value;
            entry.stamp = stamp;
            return false;
        }

        if self.entries.last().is_some_and(|last| last.id > id) {
            self.sorted = false;
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(Entry { id, stamp, value });
        true
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let Some(position) = self.index.remove(&id) else {
            return false;
        };

        self.entries.swap_remove(position);
        if let Some(moved) = self.entries.get(position) {
            self.index.insert(moved.id, position);
            self.sorted = false;
        }
        true
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        usize::MAX
    }

    fn next_occupied(&self, from: EntityId) -> Option<EntityId> {
        debug_assert!(self.sorted, "sparse slots traversed before finish_commit");
        let position = self.entries.partition_point(|entry| entry.id < from);
        self.entries.get(position).map(|entry| entry.id)
    }

    fn finish_commit(&mut self) {
        if !self.sorted {
            self.rebuild_order();
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (EntityId, &T)> + '_> {
        Box::new(self.entries.iter().map(|entry| (entry.id, &entry.value)))
    }

    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = (EntityId, &mut T)> + '_> {
        Box::new(
            self.entries
                .iter_mut()
                .map(|entry| (entry.id, &mut entry.value)),
        )
    }
}
