//! # Entities Database
//!
//! The facade over every registered component type. Query and iteration
//! operations live in [`query`](super::query); structural changes are
//! behind the [`StructuralMutation`](super::StructuralMutation) trait.

use super::component::{Component, ComponentId};
use super::registry::TypeRegistry;
use super::store::{ErasedStore, StoreCell};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};

/// The entities database - container for all component stores.
///
/// Component types are registered once, up front. After that every query,
/// iteration and structural change goes through a shared reference: each
/// store sits in its own `RefCell`, so conflicting access to one type is
/// reported as an error instead of corrupting its buffers.
///
/// The database is single-threaded by construction (`!Sync`).
///
/// # Example
///
/// ```rust,ignore
/// let mut db = EntitiesDb::new();
/// db.register::<Position>();
///
/// db.add_component(Egid::new(1, GroupId(0)), Position::new(0.0, 0.0))?;
/// db.execute_on_entity::<Position, _>(Egid::new(1, GroupId(0)), |p| p.x = 5.0)?;
/// ```
pub struct EntitiesDb {
    pub(crate) config: DbConfig,
    registry: TypeRegistry,
    /// One store per registered type, indexed by registry slot.
    stores: Vec<Box<dyn ErasedStore>>,
}

impl Default for EntitiesDb {
    fn default() -> Self {
        Self::new()
    }
}

impl EntitiesDb {
    /// Creates an empty database with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(DbConfig::default())
    }

    /// Creates an empty database with a validated configuration.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidConfig`] if the configuration fails
    /// [`DbConfig::validate`].
    pub fn with_config(config: DbConfig) -> DbResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DbConfig) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(),
            stores: Vec::new(),
        }
    }

    /// Returns the active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Registers a component type, creating its empty store.
    ///
    /// Idempotent: registering a type again returns the existing handle.
    pub fn register<T: Component>(&mut self) -> ComponentId<T> {
        let (id, added) = self.registry.register::<T>();
        if added {
            debug_assert_eq!(id.slot() as usize, self.stores.len());
            self.stores.push(Box::new(StoreCell::<T>::new(&self.config)));
            tracing::debug!(component = T::NAME, slot = id.slot(), "component registered");
        }
        id
    }

    /// Checks whether `T` has been registered.
    #[inline]
    #[must_use]
    pub fn is_registered<T: Component>(&self) -> bool {
        self.registry.get::<T>().is_some()
    }

    /// Returns the registry handle of `T`.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered.
    pub fn component_id<T: Component>(&self) -> DbResult<ComponentId<T>> {
        self.registry
            .get::<T>()
            .ok_or(DbError::TypeNotRegistered { component: T::NAME })
    }

    /// Registered component names in slot order.
    #[must_use]
    pub fn registered_components(&self) -> &[&'static str] {
        self.registry.names()
    }

    /// Resolves `T` to its store.
    pub(crate) fn cell<T: Component>(&self) -> DbResult<&StoreCell<T>> {
        let id = self.component_id::<T>()?;
        self.stores
            .get(id.slot() as usize)
            .and_then(|store| store.as_any().downcast_ref::<StoreCell<T>>())
            .ok_or(DbError::TypeNotRegistered { component: T::NAME })
    }

    /// Every store, in slot order.
    pub(crate) fn stores(&self) -> impl Iterator<Item = &dyn ErasedStore> {
        self.stores.iter().map(|store| store.as_ref())
    }
}
