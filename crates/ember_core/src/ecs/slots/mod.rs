//! # Slot Tables
//!
//! The storage primitive behind every component store: a mapping from entity
//! id to one payload value, with existence tracking and ascending-id
//! traversal.
//!
//! A slot table only holds *committed* state. Queued mutations live in
//! [`StagedMutations`](super::staging::StagedMutations) and reach the table
//! through `insert` / `remove` at flush time.
//!
//! Two kinds ship with the crate:
//!
//! | kind | backing | capacity | lookup | traversal |
//! |---|---|---|---|---|
//! | [`DenseSlots`] | `Box<[T]>` + bitmap | fixed | O(1) index | bitmap scan |
//! | [`SparseSlots`] | `HashMap` + sorted entries | unbounded | O(1) hash | sorted walk |

mod dense;
mod sparse;

pub use dense::DenseSlots;
pub use sparse::SparseSlots;

use super::entity::EntityId;

/// Which storage strategy a store uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Fixed-capacity array indexed directly by entity id.
    Dense,
    /// Hash map keyed by entity id, unbounded.
    Sparse,
}

/// Committed `(id -> value)` storage for one component type.
///
/// Every committed slot also carries a stamp: an opaque `u64` chosen by the
/// owning store whenever the slot is written, used to validate handles.
///
/// Traversal (`next_occupied`, `iter`, `iter_mut`) is always in ascending id
/// order once `finish_commit` has run after the last `insert`.
pub trait SlotTable<T: 'static>: 'static {
    /// The storage strategy.
    fn kind(&self) -> StoreKind;

    /// Returns `true` if `id` fits this table at all.
    fn accepts(&self, id: EntityId) -> bool;

    /// Returns `true` if `id` has a committed value.
    fn contains(&self, id: EntityId) -> bool;

    /// Returns the committed value for `id`.
    fn get(&self, id: EntityId) -> Option<&T>;

    /// Returns the committed value for `id`, mutably.
    fn get_mut(&mut self, id: EntityId) -> Option<&mut T>;

    /// Returns the stamp of the committed value for `id`.
    fn stamp(&self, id: EntityId) -> Option<u64>;

    /// Writes a value, overwriting any existing one.
    ///
    /// Returns `true` if the slot was empty before. The caller guarantees
    /// `accepts(id)`.
    fn insert(&mut self, id: EntityId, value: T, stamp: u64) -> bool;

    /// Clears the slot for `id`. Returns `true` if it was occupied.
    fn remove(&mut self, id: EntityId) -> bool;

    /// Number of committed values.
    fn len(&self) -> usize;

    /// Maximum number of values; `usize::MAX` when unbounded.
    fn capacity(&self) -> usize;

    /// First occupied id at or after `from`.
    fn next_occupied(&self, from: EntityId) -> Option<EntityId>;

    /// Restores traversal order after a batch of inserts and removals.
    fn finish_commit(&mut self) {}

    /// Iterates committed values in ascending id order.
    fn iter(&self) -> Box<dyn Iterator<Item = (EntityId, &T)> + '_>;

    /// Iterates committed values mutably in ascending id order.
    fn iter_mut(&mut self) -> Box<dyn Iterator<Item = (EntityId, &mut T)> + '_>;

    /// Returns `true` if nothing is committed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
