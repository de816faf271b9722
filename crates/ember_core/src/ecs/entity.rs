//! # Entity Management
//!
//! Entities are bare numeric identifiers. An id carries no data of its own;
//! it is only meaningful as a key into zero or more component stores.
//!
//! The [`EntityAllocator`] hands out ids from a free list first and from a
//! monotonically increasing counter otherwise. An id is alive iff it is below
//! the counter and not currently free (or held back, see [`IdRecycling`]).

use std::fmt;

use super::occupancy::OccupancyBits;
use crate::config::{EcsConfig, IdRecycling};

/// Unique identifier for an entity.
///
/// Doubles as the slot index in dense component stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Null/invalid entity ID. Never issued by the allocator.
    pub const NULL: Self = Self(u32::MAX);

    /// Creates an entity ID from its raw index.
    #[inline]
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns the index as a slot position.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.0 as usize
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }

    /// The id directly after this one, if it is not the null id.
    #[inline]
    pub(crate) fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(EntityId).filter(|id| !id.is_null())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl From<u16> for EntityId {
    fn from(index: u16) -> Self {
        Self(u32::from(index))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Issues and recycles entity ids.
#[derive(Debug)]
pub struct EntityAllocator {
    /// Next never-used id.
    next_id: u32,
    /// Exclusive upper bound of the id space.
    limit: u32,
    /// Destroyed ids available for reuse, popped from the back.
    free_ids: Vec<EntityId>,
    /// Destroyed ids waiting for the end-of-tick flush.
    quarantined: Vec<EntityId>,
    /// Ids below `next_id` that are free or quarantined.
    dead: OccupancyBits,
    /// Recycling policy.
    recycling: IdRecycling,
}

impl EntityAllocator {
    /// Creates an allocator for the configured id width and recycling policy.
    #[must_use]
    pub fn new(config: &EcsConfig) -> Self {
        Self {
            next_id: 0,
            limit: config.id_limit(),
            free_ids: Vec::new(),
            quarantined: Vec::new(),
            dead: OccupancyBits::default(),
            recycling: config.recycling,
        }
    }

    /// Issues an id: the most recently freed one if any, otherwise a fresh one.
    ///
    /// Returns `None` when every id of the configured width is alive.
    pub fn allocate(&mut self) -> Option<EntityId> {
        if let Some(id) = self.free_ids.pop() {
            self.dead.remove(id.slot());
            return Some(id);
        }

        if self.next_id >= self.limit {
            return None;
        }

        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        Some(id)
    }

    /// Checks if an id is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        !id.is_null() && id.index() < self.next_id && !self.dead.contains(id.slot())
    }

    /// Marks an alive id as dead and schedules it for reuse.
    ///
    /// Returns `false` (and changes nothing) if the id is not alive, so an id
    /// can never sit in the free list twice.
    pub fn release(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        self.dead.grow(self.next_id as usize);
        self.dead.insert(id.slot());
        match self.recycling {
            IdRecycling::Immediate => self.free_ids.push(id),
            IdRecycling::AfterFlush => self.quarantined.push(id),
        }
        true
    }

    /// Moves every quarantined id to the free list.
    ///
    /// Called after the end-of-tick flush. Returns how many ids were released.
    pub fn release_quarantined(&mut self) -> usize {
        let released = self.quarantined.len();
        self.free_ids.append(&mut self.quarantined);
        released
    }

    /// Number of alive ids.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.next_id as usize - self.dead.count()
    }

    /// Number of ids ready for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_ids.len()
    }

    /// Number of destroyed ids waiting for the next flush.
    #[inline]
    #[must_use]
    pub fn quarantined_count(&self) -> usize {
        self.quarantined.len()
    }

    /// Exclusive upper bound of the id space.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new(&EcsConfig::default())
    }
}
