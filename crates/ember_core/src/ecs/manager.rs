//! # Entity Manager
//!
//! The central container: entity ids, one store per component type, and the
//! ordered list of systems.
//!
//! ## Tick
//!
//! [`EntityManager::update`] runs every system in registration order, then
//! flushes every store. Component mutations requested by systems are queued
//! and become visible from the next tick. Entity creation and destruction are
//! not queued: a created id is usable at once, and a destroyed id is recycled
//! at once (or after the flush, see [`IdRecycling`](crate::config::IdRecycling)).

use super::component::Component;
use super::entity::{EntityAllocator, EntityId};
use super::registry::StoreRegistry;
use super::slots::{DenseSlots, SparseSlots};
use super::staging::FlushStats;
use super::storage::ComponentStore;
use super::system::System;
use crate::config::EcsConfig;
use crate::error::{EcsError, EcsResult};

/// Owns entity ids, component stores and systems.
///
/// # Example
///
/// ```rust,ignore
/// let mut entities = EntityManager::new();
/// entities.register_dense::<Position>(4096);
///
/// let e = entities.create_entity();
/// entities.add_component(e, Position::default())?;
/// entities.update(1.0 / 60.0);
/// assert!(entities.has_component::<Position>(e));
/// ```
pub struct EntityManager {
    /// Id issuing and liveness.
    allocator: EntityAllocator,
    /// One store per component type.
    stores: StoreRegistry,
    /// Systems, in run order.
    systems: Vec<Box<dyn System>>,
    /// Configuration the manager was built with.
    config: EcsConfig,
    /// Completed ticks.
    tick: u64,
    /// Nesting depth of running systems and `for_each_entity` walks. A flush
    /// is refused while non-zero.
    busy: u32,
}

impl EntityManager {
    /// Creates a manager with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EcsConfig::default())
    }

    /// Creates a manager with the given configuration.
    #[must_use]
    pub fn with_config(config: EcsConfig) -> Self {
        Self {
            allocator: EntityAllocator::new(&config),
            stores: StoreRegistry::new(),
            systems: Vec::new(),
            config,
            tick: 0,
            busy: 0,
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity: the most recently recycled id, or a fresh one.
    ///
    /// # Returns
    ///
    /// The new entity's id, or `EntityId::NULL` if the id space is exhausted.
    pub fn create_entity(&mut self) -> EntityId {
        if let Some(id) = self.allocator.allocate() {
            tracing::trace!("Created entity {}", id);
            return id;
        }

        tracing::error!(
            "Entity id space exhausted ({} ids of {} bits)",
            self.allocator.limit(),
            self.config.id_bits
        );
        EntityId::NULL
    }

    /// Destroys an entity.
    ///
    /// Queues removal of every committed component it holds, drops every
    /// queued addition for it, and recycles the id.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] if `id` is not alive.
    pub fn destroy_entity(&mut self, id: EntityId) -> EcsResult<()> {
        if !self.allocator.is_alive(id) {
            tracing::warn!("Cannot destroy entity {}: not alive", id);
            return Err(EcsError::DeadEntity(id));
        }

        let mut stripped = 0usize;
        let mut discarded = 0usize;
        for store in self.stores.iter_mut() {
            if store.has_component(id)
                && !store.is_removal_pending(id)
                && store.remove_component(id).is_ok()
            {
                stripped += 1;
            }
            discarded += store.discard_pending_additions(id);
        }

        self.allocator.release(id);
        tracing::trace!(
            "Destroyed entity {} ({} components queued for removal, {} queued additions dropped)",
            id,
            stripped,
            discarded
        );
        Ok(())
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_entity_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Returns the number of alive entities.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.allocator.alive_count()
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Registers the store for `T`, replacing (and dropping) any earlier one.
    pub fn register_store<T: Component>(&mut self, store: ComponentStore<T>) {
        self.stores.register(store);
    }

    /// Registers a fixed-capacity store for `T` holding ids `0..capacity`.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    pub fn register_dense<T: Component>(&mut self, capacity: usize) {
        let slots = DenseSlots::<T>::new(capacity);
        self.register_store(ComponentStore::new(
            Box::new(slots),
            self.config.pending_reserve,
        ));
    }

    /// Registers an unbounded store for `T`.
    pub fn register_sparse<T: Component>(&mut self) {
        let slots = SparseSlots::<T>::new();
        self.register_store(ComponentStore::new(
            Box::new(slots),
            self.config.pending_reserve,
        ));
    }

    /// Returns the store for `T`, or `None` if it was never registered.
    #[must_use]
    pub fn try_store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores.get::<T>()
    }

    /// Returns the store for `T` mutably, or `None` if it was never registered.
    pub fn try_store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores.get_mut::<T>()
    }

    /// Returns the store for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    #[must_use]
    pub fn store<T: Component>(&self) -> &ComponentStore<T> {
        match self.stores.get::<T>() {
            Some(store) => store,
            None => unregistered::<T>(),
        }
    }

    /// Returns the store for `T` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn store_mut<T: Component>(&mut self) -> &mut ComponentStore<T> {
        match self.stores.get_mut::<T>() {
            Some(store) => store,
            None => unregistered::<T>(),
        }
    }

    /// Number of registered stores.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    // =========================================================================
    // Components (typed; every call panics if `T` is not registered)
    // =========================================================================

    /// Queues a component for an entity, visible after the next flush.
    ///
    /// # Errors
    ///
    /// [`EcsError::DeadEntity`] if `id` is not alive, otherwise the errors of
    /// [`ComponentStore::add_component`].
    #[track_caller]
    pub fn add_component<T: Component>(&mut self, id: EntityId, value: T) -> EcsResult<()> {
        let store = self.stores.get_mut::<T>().unwrap_or_else(|| unregistered::<T>());
        if !id.is_null() && !self.allocator.is_alive(id) {
            tracing::error!(
                "Cannot add {} to entity {}: not alive",
                T::type_name(),
                id
            );
            return Err(EcsError::DeadEntity(id));
        }
        store.add_component(id, value)
    }

    /// Queues removal of an entity's component.
    ///
    /// # Errors
    ///
    /// See [`ComponentStore::remove_component`].
    #[track_caller]
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> EcsResult<()> {
        self.store_mut::<T>().remove_component(id)
    }

    /// Checks for a committed component.
    #[track_caller]
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.store::<T>().has_component(id)
    }

    /// Returns an entity's committed component.
    #[track_caller]
    #[must_use]
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.store::<T>().get_component(id)
    }

    /// Returns an entity's committed component mutably.
    #[track_caller]
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.store_mut::<T>().get_component_mut(id)
    }

    /// Calls `f` on every committed `T` in place, in ascending id order.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn for_each<T, F>(&mut self, mut f: F)
    where
        T: Component,
        F: FnMut(EntityId, &mut T),
    {
        for (id, value) in self.store_mut::<T>().iter_mut() {
            f(id, value);
        }
    }

    /// Calls `f` for every entity holding a committed `T`, in ascending id
    /// order.
    ///
    /// `f` gets full access to the manager: it may read any store, this one
    /// included, write committed values through
    /// [`get_component_mut`](Self::get_component_mut), create and destroy
    /// entities and queue mutations. Every read sees committed state.
    ///
    /// Components added during the walk are queued and therefore not visited.
    ///
    /// # Panics
    ///
    /// Panics if `T` was never registered.
    #[track_caller]
    pub fn for_each_entity<T, F>(&mut self, mut f: F)
    where
        T: Component,
        F: FnMut(&mut EntityManager, EntityId),
    {
        let mut cursor = self.store::<T>().next_committed(EntityId::new(0));
        self.busy += 1;

        while let Some(id) = cursor {
            f(self, id);
            cursor = id
                .successor()
                .and_then(|next| self.stores.get::<T>()?.next_committed(next));
        }

        self.busy -= 1;
    }

    // =========================================================================
    // Systems and ticks
    // =========================================================================

    /// Appends a system. It runs after every system registered before it.
    ///
    /// A system added while a tick is running first runs on the next tick.
    pub fn add_system<S: System>(&mut self, system: S) {
        tracing::debug!("Added system {}", system.name());
        self.systems.push(Box::new(system));
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Runs one tick: every system in registration order, then the flush.
    ///
    /// Refused (logged, nothing runs) when called from inside a system or a
    /// [`for_each_entity`](Self::for_each_entity) walk.
    pub fn update(&mut self, dt: f32) -> FlushStats {
        if self.busy > 0 {
            tracing::error!("update() called during tick {}; ignored", self.tick);
            return FlushStats::default();
        }

        self.busy += 1;
        let mut systems = std::mem::take(&mut self.systems);
        for system in &mut systems {
            let _span = tracing::trace_span!("system", name = system.name()).entered();
            system.update(self, dt);
        }
        let added = std::mem::replace(&mut self.systems, systems);
        self.systems.extend(added);
        self.busy -= 1;

        let stats = self.commit();
        self.tick += 1;
        stats
    }

    /// Flushes every store without running systems.
    ///
    /// Useful at setup, to make initial components visible before the first
    /// tick. Refused (logged) while a tick or walk is in progress.
    pub fn flush(&mut self) -> FlushStats {
        if self.busy > 0 {
            tracing::error!("flush() called during tick {}; ignored", self.tick);
            return FlushStats::default();
        }
        self.commit()
    }

    /// Applies every store's queued mutations, then releases quarantined ids.
    fn commit(&mut self) -> FlushStats {
        let stats = self.stores.apply_pending();
        let released = self.allocator.release_quarantined();
        if released > 0 {
            tracing::trace!("Released {} quarantined entity ids", released);
        }
        stats
    }

    /// Number of completed ticks.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// The configuration the manager was built with.
    #[must_use]
    pub const fn config(&self) -> &EcsConfig {
        &self.config
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
#[track_caller]
fn unregistered<T: Component>() -> ! {
    panic!("component type {} is not registered", T::type_name())
}
