//! # Entity Component System
//!
//! Component storage with deferred, flush-at-tick-end mutation.
//!
//! ## Design Philosophy
//!
//! - Entities are bare ids; components live in one store per type
//! - Mutations are queued during a tick and applied in one batch after it,
//!   so systems can request changes while walking the data they change
//! - Iteration is always in ascending entity id order
//! - Dense stores for common components, sparse stores for rare ones

mod component;
mod entity;
mod manager;
mod occupancy;
mod registry;
mod slots;
mod staging;
mod storage;
mod system;

pub use component::Component;
pub use entity::{EntityAllocator, EntityId};
pub use manager::EntityManager;
pub use occupancy::{OccupancyBits, OccupancyIter};
pub use registry::{ErasedStore, StoreRegistry};
pub use slots::{DenseSlots, SlotTable, SparseSlots, StoreKind};
pub use staging::{FlushStats, StagedMutations};
pub use storage::{ComponentHandle, ComponentStore, DEFAULT_PENDING_RESERVE};
pub use system::System;
