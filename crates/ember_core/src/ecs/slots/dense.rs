//! # Dense Slots
//!
//! Pre-allocated, fixed-capacity slot table indexed directly by entity id.
//!
//! - All slots are allocated at creation and pre-filled with `T::default()`
//! - Access is O(1) via the entity index
//! - Existence is tracked in a separate bitmap; a removed slot is reset to
//!   `T::default()`, so a default value in the array means nothing on its own

use super::{SlotTable, StoreKind};
use crate::ecs::entity::EntityId;
use crate::ecs::occupancy::{OccupancyBits, OccupancyIter};

/// Fixed-capacity storage for a single component type.
///
/// # Example
///
/// ```rust,ignore
/// let mut slots: DenseSlots<Transform> = DenseSlots::new(4096);
/// slots.insert(EntityId::new(3), Transform::default(), 1);
/// ```
pub struct DenseSlots<T> {
    /// The dense array of values.
    values: Box<[T]>,
    /// Stamp of the value in each slot.
    stamps: Box<[u64]>,
    /// Which slots hold a committed value.
    occupied: OccupancyBits,
}

impl<T: Default> DenseSlots<T> {
    /// Creates a table with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );

        // Pre-allocate all memory upfront
        let values = std::iter::repeat_with(T::default)
            .take(capacity)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            values,
            stamps: vec![0; capacity].into_boxed_slice(),
            occupied: OccupancyBits::new(capacity),
        }
    }
}

/// Entity id of a slot position. Positions are bounded by the capacity,
/// which never exceeds `u32::MAX`.
#[allow(clippy::cast_possible_truncation)]
#[inline]
fn id_at(slot: usize) -> EntityId {
    EntityId::new(slot as u32)
}

impl<T: Default + 'static> SlotTable<T> for DenseSlots<T> {
    fn kind(&self) -> StoreKind {
        StoreKind::Dense
    }

    #[inline]
    fn accepts(&self, id: EntityId) -> bool {
        !id.is_null() && id.slot() < self.values.len()
    }

    #[inline]
    fn contains(&self, id: EntityId) -> bool {
        self.occupied.contains(id.slot())
    }

    #[inline]
    fn get(&self, id: EntityId) -> Option<&T> {
        if self.occupied.contains(id.slot()) {
            self.values.get(id.slot())
        } else {
            None
        }
    }

    #[inline]
    fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        if self.occupied.contains(id.slot()) {
            self.values.get_mut(id.slot())
        } else {
            None
        }
    }

    #[inline]
    fn stamp(&self, id: EntityId) -> Option<u64> {
        if self.occupied.contains(id.slot()) {
            self.stamps.get(id.slot()).copied()
        } else {
            None
        }
    }

    fn insert(&mut self, id: EntityId, value: T, stamp: u64) -> bool {
        let slot = id.slot();
        let Some(target) = self.values.get_mut(slot) else {
            return false;
        };
        *target = value;
        self.stamps[slot] = stamp;
        self.occupied.insert(slot)
    }

    fn remove(&mut self, id: EntityId) -> bool {
        let slot = id.slot();
        if !self.occupied.remove(slot) {
            return false;
        }
        self.values[slot] = T::default();
        self.stamps[slot] = 0;
        true
    }

    #[inline]
    fn len(&self) -> usize {
        self.occupied.count()
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.values.len()
    }

    #[inline]
    fn next_occupied(&self, from: EntityId) -> Option<EntityId> {
        self.occupied.next_set(from.slot()).map(id_at)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (EntityId, &T)> + '_> {
        let values = &self.values;
        Box::new(self.occupied.iter().map(move |slot| (id_at(slot), &values[slot])))
    }

    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = (EntityId, &mut T)> + '_> {
        Box::new(OccupiedMut {
            slots: self.occupied.iter(),
            rest: &mut self.values[..],
            base: 0,
        })
    }
}

/// Mutable traversal driven by the occupancy bitmap.
struct OccupiedMut<'a, T> {
    slots: OccupancyIter<'a>,
    /// Values not yet handed out.
    rest: &'a mut [T],
    /// Slot position of `rest[0]`.
    base: usize,
}

impl<'a, T> Iterator for OccupiedMut<'a, T> {
    type Item = (EntityId, &'a mut T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.next()?;
        let rest = std::mem::take(&mut self.rest);
        let (value, tail) = rest.get_mut(slot - self.base..)?.split_first_mut()?;
        self.rest = tail;
        self.base = slot + 1;
        Some((id_at(slot), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_creation() {
        let slots: DenseSlots<u64> = DenseSlots::new(1000);
        assert_eq!(slots.capacity(), 1000);
        assert!(slots.is_empty());
        assert_eq!(slots.kind(), StoreKind::Dense);
    }

    #[test]
    fn test_slots_insert_get() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(100);

        assert!(slots.insert(EntityId::new(50), 7, 1));
        assert!(!slots.insert(EntityId::new(50), 8, 2));

        assert_eq!(slots.get(EntityId::new(50)), Some(&8));
        assert_eq!(slots.stamp(EntityId::new(50)), Some(2));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_slots_bounds() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(100);
        assert!(slots.accepts(EntityId::new(99)));
        assert!(!slots.accepts(EntityId::new(100)));
        assert!(!slots.accepts(EntityId::NULL));
        assert!(slots.get(EntityId::new(100)).is_none());
        assert!(!slots.insert(EntityId::new(100), 1, 1));
        assert!(!slots.contains(EntityId::NULL));
    }

    #[test]
    fn test_remove_resets_to_default() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(4);
        slots.insert(EntityId::new(1), 10, 1);

        assert!(slots.remove(EntityId::new(1)));
        assert!(!slots.remove(EntityId::new(1)));
        assert!(slots.get(EntityId::new(1)).is_none());
        assert_eq!(slots.stamp(EntityId::new(1)), None);

        // The slot is reusable and the old value is gone.
        slots.insert(EntityId::new(1), 0, 2);
        assert_eq!(slots.get(EntityId::new(1)), Some(&0));
    }

    #[test]
    fn test_traversal_ascending() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(200);
        for (stamp, index) in [130u32, 4, 65].into_iter().enumerate() {
            slots.insert(EntityId::new(index), index as i32, stamp as u64);
        }

        let ids: Vec<u32> = slots.iter().map(|(id, _)| id.index()).collect();
        assert_eq!(ids, vec![4, 65, 130]);

        for (_, value) in slots.iter_mut() {
            *value *= 2;
        }
        assert_eq!(slots.get(EntityId::new(65)), Some(&130));

        assert_eq!(slots.next_occupied(EntityId::new(0)), Some(EntityId::new(4)));
        assert_eq!(slots.next_occupied(EntityId::new(66)), Some(EntityId::new(130)));
        assert_eq!(slots.next_occupied(EntityId::new(131)), None);
    }

    #[test]
    fn test_iter_mut_visits_only_occupied() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(300);
        for index in [0u32, 63, 64, 299] {
            slots.insert(EntityId::new(index), 1, 1);
        }

        let mut visited = Vec::new();
        for (id, value) in slots.iter_mut() {
            visited.push(id.index());
            *value = id.index() as i32;
        }
        assert_eq!(visited, vec![0, 63, 64, 299]);
        assert_eq!(slots.get(EntityId::new(299)), Some(&299));
        assert!(slots.get(EntityId::new(1)).is_none());
    }
}
