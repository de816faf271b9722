//! # Staged Mutations
//!
//! Component additions and removals requested during a tick are not applied
//! to storage right away. They are queued here and applied in one batch at the
//! end-of-tick flush, so systems can request mutations while walking the very
//! store they mutate.
//!
//! ## Apply order
//!
//! 1. Removals, in request order
//! 2. Additions, in request order (a later addition for the same id overwrites
//!    an earlier one)
//!
//! Removals go first so that "remove, then add again" in one tick nets to the
//! new value being present.

use std::collections::HashSet;

use super::entity::EntityId;
use super::slots::SlotTable;

/// Counts of what a flush did to one store (or to all of them, summed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Slots emptied by queued removals.
    pub removed: usize,
    /// Empty slots filled by queued additions.
    pub added: usize,
    /// Occupied slots overwritten by queued additions.
    pub overwritten: usize,
}

impl FlushStats {
    /// Returns `true` if the flush changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.removed == 0 && self.added == 0 && self.overwritten == 0
    }
}

impl std::ops::AddAssign for FlushStats {
    fn add_assign(&mut self, other: Self) {
        self.removed += other.removed;
        self.added += other.added;
        self.overwritten += other.overwritten;
    }
}

/// Queued additions and removals for one component store.
///
/// The queue does no validation of its own beyond refusing a second removal
/// of the same id; the owning store decides what may be queued.
pub struct StagedMutations<T> {
    /// Queued `(id, value)` pairs, in request order.
    additions: Vec<(EntityId, T)>,
    /// Ids with at least one queued addition.
    addition_ids: HashSet<EntityId>,
    /// Queued removals, in request order.
    removals: Vec<EntityId>,
    /// Same ids as `removals`, for O(1) membership checks.
    removal_ids: HashSet<EntityId>,
}

impl<T> StagedMutations<T> {
    /// Creates an empty queue with room for `reserve` requests of each kind.
    #[must_use]
    pub fn with_capacity(reserve: usize) -> Self {
        Self {
            additions: Vec::with_capacity(reserve),
            addition_ids: HashSet::with_capacity(reserve),
            removals: Vec::with_capacity(reserve),
            removal_ids: HashSet::with_capacity(reserve),
        }
    }

    /// Queues an addition.
    ///
    /// Returns `true` if an earlier addition for the same id is already queued;
    /// the new value will win at apply time.
    pub fn queue_addition(&mut self, id: EntityId, value: T) -> bool {
        self.additions.push((id, value));
        !self.addition_ids.insert(id)
    }

    /// Queues a removal.
    ///
    /// Returns `false` (and queues nothing) if a removal for `id` is already
    /// queued.
    pub fn queue_removal(&mut self, id: EntityId) -> bool {
        if !self.removal_ids.insert(id) {
            return false;
        }
        self.removals.push(id);
        true
    }

    /// Checks if a removal is queued for `id`.
    #[inline]
    #[must_use]
    pub fn is_removal_pending(&self, id: EntityId) -> bool {
        self.removal_ids.contains(&id)
    }

    /// Checks if an addition is queued for `id`.
    #[inline]
    #[must_use]
    pub fn is_addition_pending(&self, id: EntityId) -> bool {
        self.addition_ids.contains(&id)
    }

    /// Drops every queued addition for `id`. Returns how many were dropped.
    pub fn discard_additions(&mut self, id: EntityId) -> usize {
        if !self.addition_ids.remove(&id) {
            return 0;
        }
        let before = self.additions.len();
        self.additions.retain(|(queued, _)| *queued != id);
        before - self.additions.len()
    }

    /// Number of queued additions.
    #[inline]
    #[must_use]
    pub fn addition_count(&self) -> usize {
        self.additions.len()
    }

    /// Number of queued removals.
    #[inline]
    #[must_use]
    pub fn removal_count(&self) -> usize {
        self.removals.len()
    }

    /// Total number of queued requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len()
    }

    /// Returns `true` if nothing is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Applies every queued request to `slots` and empties the queue.
    ///
    /// `next_stamp` is called once per written slot. The queue keeps its
    /// allocations for the next tick.
    pub fn apply_to(
        &mut self,
        slots: &mut dyn SlotTable<T>,
        mut next_stamp: impl FnMut() -> u64,
    ) -> FlushStats
    where
        T: 'static,
    {
        let mut stats = FlushStats::default();

        for id in self.removals.drain(..) {
            if slots.remove(id) {
                stats.removed += 1;
            }
        }
        self.removal_ids.clear();

        for (id, value) in self.additions.drain(..) {
            if slots.insert(id, value, next_stamp()) {
                stats.added += 1;
            } else {
                stats.overwritten += 1;
            }
        }
        self.addition_ids.clear();

        stats
    }
}

impl<T> Default for StagedMutations<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::slots::{DenseSlots, SparseSlots};

    fn counter() -> impl FnMut() -> u64 {
        let mut stamp = 0;
        move || {
            stamp += 1;
            stamp
        }
    }

    #[test]
    fn test_removals_apply_before_additions() {
        let mut slots: DenseSlots<i32> = DenseSlots::new(4);
        slots.insert(EntityId::new(1), 5, 1);

        let mut staged = StagedMutations::with_capacity(4);
        assert!(staged.queue_removal(EntityId::new(1)));
        assert!(!staged.queue_addition(EntityId::new(1), 9));

        let stats = staged.apply_to(&mut slots, counter());
        assert_eq!(slots.get(EntityId::new(1)), Some(&9));
        assert_eq!(
            stats,
            FlushStats {
                removed: 1,
                added: 1,
                overwritten: 0
            }
        );
        assert!(staged.is_empty());
        assert!(!staged.is_removal_pending(EntityId::new(1)));
    }

    #[test]
    fn test_last_addition_wins() {
        let mut slots: SparseSlots<char> = SparseSlots::new();
        let mut staged = StagedMutations::default();

        assert!(!staged.queue_addition(EntityId::new(3), 'a'));
        assert!(staged.queue_addition(EntityId::new(3), 'b'));
        assert_eq!(staged.addition_count(), 2);

        let stats = staged.apply_to(&mut slots, counter());
        assert_eq!(slots.get(EntityId::new(3)), Some(&'b'));
        assert_eq!(stats.added, 1);
        assert_eq!(stats.overwritten, 1);
    }

    #[test]
    fn test_duplicate_removal_refused() {
        let mut staged: StagedMutations<u8> = StagedMutations::default();
        assert!(staged.queue_removal(EntityId::new(2)));
        assert!(!staged.queue_removal(EntityId::new(2)));
        assert_eq!(staged.removal_count(), 1);
        assert_eq!(staged.len(), 1);
    }

    #[test]
    fn test_discard_additions() {
        let mut staged = StagedMutations::default();
        staged.queue_addition(EntityId::new(1), 10u32);
        staged.queue_addition(EntityId::new(2), 20);
        staged.queue_addition(EntityId::new(1), 11);

        assert_eq!(staged.discard_additions(EntityId::new(1)), 2);
        assert_eq!(staged.discard_additions(EntityId::new(1)), 0);
        assert!(!staged.is_addition_pending(EntityId::new(1)));
        assert!(staged.is_addition_pending(EntityId::new(2)));
        assert_eq!(staged.addition_count(), 1);
    }

    #[test]
    fn test_flush_stats_sum() {
        let mut total = FlushStats::default();
        assert!(total.is_empty());
        total += FlushStats {
            removed: 1,
            added: 2,
            overwritten: 0,
        };
        total += FlushStats {
            removed: 0,
            added: 1,
            overwritten: 3,
        };
        assert_eq!(total.added, 3);
        assert_eq!(total.overwritten, 3);
        assert!(!total.is_empty());
    }
}
