//! # Ember Core
//!
//! Entity-component storage for a fixed-timestep simulation loop:
//! - Dense (fixed-capacity, array-indexed) and sparse (unbounded, hashed)
//!   component stores behind one typed API
//! - Component mutations staged during a tick and applied in one flush after
//!   it, so systems can mutate the data they are walking
//! - Ascending entity id iteration for every store kind
//!
//! ## Architecture Rules
//!
//! 1. **Reads see committed state** - queued mutations are invisible until
//!    the flush
//! 2. **Removals before additions** - remove-then-add in one tick nets to the
//!    new value
//! 3. **Bad requests are no-ops** - rejected with a log line and an
//!    [`EcsError`], never a panic; only an unregistered component type panics
//!
//! ## Example
//!
//! ```rust,ignore
//! use ember_core::{EntityManager, EntityId};
//!
//! let mut entities = EntityManager::new();
//! entities.register_dense::<Health>(1024);
//!
//! let e = entities.create_entity();
//! entities.add_component(e, Health(100))?;
//! entities.update(1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod ecs;
pub mod error;
pub mod simulation;

pub use clock::{FrameClock, TickStats};
pub use config::{ClockConfig, EcsConfig, IdRecycling, SimulationConfig, MAX_TICK_RATE};
pub use ecs::{
    Component, ComponentHandle, ComponentStore, DenseSlots, EntityAllocator, EntityId,
    EntityManager, ErasedStore, FlushStats, SlotTable, SparseSlots, StoreKind, StoreRegistry,
    System,
};
pub use error::{ConfigError, EcsError, EcsResult};
pub use simulation::Simulation;
