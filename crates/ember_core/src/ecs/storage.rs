//! # Component Storage
//!
//! [`ComponentStore`] pairs one slot table with one staging queue and
//! enforces the mutation rules:
//!
//! - Reads (`has_component`, `get_component`, iteration) see committed state
//!   only
//! - Writes (`add_component`, `remove_component`) are validated, logged when
//!   rejected, and queued until [`ComponentStore::apply_pending`]
//!
//! ## Handles
//!
//! Borrows from a store end before the next flush. Code that needs to keep
//! pointing at a component across ticks stores a [`ComponentHandle`] instead.
//! Every flush write gives the slot a fresh stamp, so a handle stops resolving
//! once its slot was removed or replaced, whatever the store kind.

use super::component::Component;
use super::entity::EntityId;
use super::slots::{DenseSlots, SlotTable, SparseSlots, StoreKind};
use super::staging::{FlushStats, StagedMutations};
use crate::error::{EcsError, EcsResult};

/// Initial staging reserve for stores built without a configuration.
pub const DEFAULT_PENDING_RESERVE: usize = 64;

/// Generation-checked reference to one committed component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    /// The entity the component belongs to.
    pub id: EntityId,
    /// Stamp of the slot when the handle was taken.
    pub stamp: u64,
}

/// All components of one type: committed slots plus queued mutations.
///
/// # Example
///
/// ```rust,ignore
/// let mut healths: ComponentStore<Health> = ComponentStore::dense(1024);
/// healths.add_component(EntityId::new(3), Health(100))?;
/// assert!(!healths.has_component(EntityId::new(3)));
///
/// healths.apply_pending();
/// assert_eq!(healths.get_component(EntityId::new(3)), Some(&Health(100)));
/// ```
pub struct ComponentStore<T: Component> {
    /// Committed values.
    slots: Box<dyn SlotTable<T>>,
    /// Mutations waiting for the next flush.
    staged: StagedMutations<T>,
    /// Stamp given to the next written slot. Starts at 1; 0 never matches.
    next_stamp: u64,
}

impl<T: Component> ComponentStore<T> {
    /// Creates a store over any slot table.
    #[must_use]
    pub fn new(slots: Box<dyn SlotTable<T>>, pending_reserve: usize) -> Self {
        Self {
            slots,
            staged: StagedMutations::with_capacity(pending_reserve),
            next_stamp: 1,
        }
    }

    /// Creates a fixed-capacity store holding ids `0..capacity`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn dense(capacity: usize) -> Self {
        Self::new(Box::new(DenseSlots::<T>::new(capacity)), DEFAULT_PENDING_RESERVE)
    }

    /// Creates an unbounded store.
    #[must_use]
    pub fn sparse() -> Self {
        Self::new(Box::new(SparseSlots::<T>::new()), DEFAULT_PENDING_RESERVE)
    }

    /// Checks that `id` can hold a component in this store at all.
    fn check_id(&self, id: EntityId) -> EcsResult<()> {
        if id.is_null() {
            tracing::error!("Rejected null entity id for {}", T::type_name());
            return Err(EcsError::NullEntity);
        }
        if !self.slots.accepts(id) {
            let capacity = self.slots.capacity();
            tracing::error!(
                "Entity {} is outside the {} store capacity of {}",
                id,
                T::type_name(),
                capacity
            );
            return Err(EcsError::OutOfRange { id, capacity });
        }
        Ok(())
    }

    /// Queues a component for `id`, visible after the next flush.
    ///
    /// Queuing a second value for an id that has no committed component
    /// replaces the first one (logged).
    ///
    /// # Errors
    ///
    /// - [`EcsError::NullEntity`] / [`EcsError::OutOfRange`] if the id does
    ///   not fit this store
    /// - [`EcsError::AlreadyPresent`] if the id has a committed component that
    ///   is not queued for removal
    pub fn add_component(&mut self, id: EntityId, value: T) -> EcsResult<()> {
        self.check_id(id)?;

        if self.slots.contains(id) && !self.staged.is_removal_pending(id) {
            tracing::warn!(
                "Entity {} already has a {} component; add ignored",
                id,
                T::type_name()
            );
            return Err(EcsError::AlreadyPresent {
                id,
                component: T::type_name(),
            });
        }

        if self.staged.queue_addition(id, value) {
            tracing::warn!(
                "Replacing queued {} for entity {} before it was applied",
                T::type_name(),
                id
            );
        }
        Ok(())
    }

    /// Queues removal of the committed component of `id`.
    ///
    /// The component stays visible until the next flush.
    ///
    /// # Errors
    ///
    /// - [`EcsError::NullEntity`] / [`EcsError::OutOfRange`] if the id does
    ///   not fit this store
    /// - [`EcsError::Missing`] if the id has no committed component
    /// - [`EcsError::RemovalPending`] if a removal is already queued
    pub fn remove_component(&mut self, id: EntityId) -> EcsResult<()> {
        self.check_id(id)?;

        if !self.slots.contains(id) {
            tracing::warn!(
                "Entity {} has no {} component; remove ignored",
                id,
                T::type_name()
            );
            return Err(EcsError::Missing {
                id,
                component: T::type_name(),
            });
        }

        if !self.staged.queue_removal(id) {
            tracing::warn!(
                "Removal of {} from entity {} is already queued",
                T::type_name(),
                id
            );
            return Err(EcsError::RemovalPending {
                id,
                component: T::type_name(),
            });
        }
        Ok(())
    }

    /// Checks for a committed component. Queued mutations are not visible.
    #[inline]
    #[must_use]
    pub fn has_component(&self, id: EntityId) -> bool {
        self.slots.contains(id)
    }

    /// Checks if a removal is queued for `id`.
    #[inline]
    #[must_use]
    pub fn is_removal_pending(&self, id: EntityId) -> bool {
        self.staged.is_removal_pending(id)
    }

    /// Checks if an addition is queued for `id`.
    #[inline]
    #[must_use]
    pub fn is_addition_pending(&self, id: EntityId) -> bool {
        self.staged.is_addition_pending(id)
    }

    /// Returns the committed component of `id`.
    #[inline]
    #[must_use]
    pub fn get_component(&self, id: EntityId) -> Option<&T> {
        self.slots.get(id)
    }

    /// Returns the committed component of `id`, mutably.
    ///
    /// Writing through the reference edits committed state in place; it is
    /// not a queued mutation.
    #[inline]
    pub fn get_component_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots.get_mut(id)
    }

    /// Takes a handle to the committed component of `id`.
    #[must_use]
    pub fn handle(&self, id: EntityId) -> Option<ComponentHandle> {
        self.slots
            .stamp(id)
            .map(|stamp| ComponentHandle { id, stamp })
    }

    /// Resolves a handle, if its slot has not been removed or rewritten since.
    #[must_use]
    pub fn resolve(&self, handle: ComponentHandle) -> Option<&T> {
        if self.slots.stamp(handle.id)? != handle.stamp {
            return None;
        }
        self.slots.get(handle.id)
    }

    /// Resolves a handle mutably.
    pub fn resolve_mut(&mut self, handle: ComponentHandle) -> Option<&mut T> {
        if self.slots.stamp(handle.id)? != handle.stamp {
            return None;
        }
        self.slots.get_mut(handle.id)
    }

    /// Drops every queued addition for `id`. Returns how many were dropped.
    pub fn discard_pending_additions(&mut self, id: EntityId) -> usize {
        self.staged.discard_additions(id)
    }

    /// Applies queued removals, then queued additions, then restores
    /// ascending traversal order.
    pub fn apply_pending(&mut self) -> FlushStats {
        if self.staged.is_empty() {
            return FlushStats::default();
        }

        let next_stamp = &mut self.next_stamp;
        let stats = self.staged.apply_to(self.slots.as_mut(), || {
            let stamp = *next_stamp;
            *next_stamp += 1;
            stamp
        });
        self.slots.finish_commit();

        if !stats.is_empty() {
            tracing::trace!(
                "Flushed {}: {} removed, {} added, {} overwritten",
                T::type_name(),
                stats.removed,
                stats.added,
                stats.overwritten
            );
        }
        stats
    }

    /// Iterates committed components in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots.iter()
    }

    /// Iterates committed components mutably in ascending id order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> + '_ {
        self.slots.iter_mut()
    }

    /// Number of committed components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is committed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Maximum number of components; `usize::MAX` for sparse stores.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of queued mutations.
    #[inline]
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.staged.len()
    }

    /// The storage strategy.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> StoreKind {
        self.slots.kind()
    }

    /// First committed id at or after `from`.
    pub(crate) fn next_committed(&self, from: EntityId) -> Option<EntityId> {
        self.slots.next_occupied(from)
    }
}
