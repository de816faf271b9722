//! # Store Registry
//!
//! One [`ComponentStore`] per component type, held behind the non-generic
//! [`ErasedStore`] contract so that entity teardown and the end-of-tick flush
//! can walk every store without knowing its payload type. Typed access goes
//! through an `Any` downcast keyed by `TypeId`.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::EntityId;
use super::staging::FlushStats;
use super::storage::ComponentStore;
use crate::error::EcsResult;

/// The payload-independent surface of a component store.
pub trait ErasedStore: 'static {
    /// Name of the component type, for diagnostics.
    fn component_name(&self) -> &'static str;

    /// Checks for a committed component.
    fn has_component(&self, id: EntityId) -> bool;

    /// Checks if a removal is queued for `id`.
    fn is_removal_pending(&self, id: EntityId) -> bool;

    /// Queues removal of the committed component of `id`.
    ///
    /// # Errors
    ///
    /// Same as [`ComponentStore::remove_component`].
    fn remove_component(&mut self, id: EntityId) -> EcsResult<()>;

    /// Drops every queued addition for `id`.
    fn discard_pending_additions(&mut self, id: EntityId) -> usize;

    /// Number of committed components.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is committed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of queued mutations.
    fn pending_len(&self) -> usize;

    /// Applies queued mutations.
    fn apply_pending(&mut self) -> FlushStats;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn component_name(&self) -> &'static str {
        T::type_name()
    }

    fn has_component(&self, id: EntityId) -> bool {
        ComponentStore::has_component(self, id)
    }

    fn is_removal_pending(&self, id: EntityId) -> bool {
        ComponentStore::is_removal_pending(self, id)
    }

    fn remove_component(&mut self, id: EntityId) -> EcsResult<()> {
        ComponentStore::remove_component(self, id)
    }

    fn discard_pending_additions(&mut self, id: EntityId) -> usize {
        ComponentStore::discard_pending_additions(self, id)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn pending_len(&self) -> usize {
        ComponentStore::pending_len(self)
    }

    fn apply_pending(&mut self) -> FlushStats {
        ComponentStore::apply_pending(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Maps each registered component type to its store.
///
/// Stores are kept in registration order; flushes and teardown visit them in
/// that order.
#[derive(Default)]
pub struct StoreRegistry {
    /// Every registered store.
    stores: Vec<Box<dyn ErasedStore>>,
    /// Component type -> position in `stores`.
    index: HashMap<TypeId, usize>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the store for `T`.
    ///
    /// Re-registering a type replaces its store in place; the old store and
    /// everything in it is dropped. Returns `true` if a store was replaced.
    pub fn register<T: Component>(&mut self, store: ComponentStore<T>) -> bool {
        let type_id = TypeId::of::<T>();
        if let Some(&position) = self.index.get(&type_id) {
            let old = &self.stores[position];
            tracing::warn!(
                "Re-registered {} store; dropping {} committed and {} queued components",
                T::type_name(),
                old.len(),
                old.pending_len()
            );
            self.stores[position] = Box::new(store);
            return true;
        }

        tracing::debug!(
            "Registered {:?} store for {} (capacity {})",
            store.kind(),
            T::type_name(),
            store.capacity()
        );
        self.index.insert(type_id, self.stores.len());
        self.stores.push(Box::new(store));
        false
    }

    /// Returns the store for `T`, or `None` if `T` was never registered.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<&ComponentStore<T>> {
        let position = *self.index.get(&TypeId::of::<T>())?;
        self.stores[position].as_any().downcast_ref()
    }

    /// Returns the store for `T` mutably.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        let position = *self.index.get(&TypeId::of::<T>())?;
        self.stores[position].as_any_mut().downcast_mut()
    }

    /// Checks if `T` has a store.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.index.contains_key(&TypeId::of::<T>())
    }

    /// Iterates stores mutably in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn ErasedStore + 'static)> + '_ {
        self.stores.iter_mut().map(|store| &mut **store)
    }

    /// Flushes every store in registration order.
    pub fn apply_pending(&mut self) -> FlushStats {
        let mut total = FlushStats::default();
        for store in &mut self.stores {
            total += store.apply_pending();
        }
        total
    }

    /// Number of registered stores.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns `true` if no store is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}
