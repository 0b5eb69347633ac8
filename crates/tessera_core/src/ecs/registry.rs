//! # Type Registry
//!
//! Assigns each registered component type a dense slot. Stores are kept in
//! a `Vec` indexed by that slot, so selecting a type's table is one map
//! lookup followed by an index.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::{Component, ComponentId};

/// Component type -> dense slot.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    slots: HashMap<TypeId, u32>,
    names: Vec<&'static str>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, returning its handle and whether it was newly added.
    ///
    /// Registering the same type twice returns the original handle.
    pub fn register<T: Component>(&mut self) -> (ComponentId<T>, bool) {
        if let Some(id) = self.get::<T>() {
            return (id, false);
        }

        let slot = crate::ecs::table::to_count(self.names.len());
        self.slots.insert(TypeId::of::<T>(), slot);
        self.names.push(T::NAME);
        (ComponentId::new(slot), true)
    }

    /// Returns the handle of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentId<T>> {
        self.slots
            .get(&TypeId::of::<T>())
            .map(|&slot| ComponentId::new(slot))
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Checks if no type is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registered type names in slot order.
    #[must_use]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }
}
