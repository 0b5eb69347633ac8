//! # Component Store
//!
//! Pairs a [`ComponentTable`] with its [`EntityIndex`] and keeps the two in
//! lock-step. The database owns one store per registered component type,
//! type-erased behind [`ErasedStore`] and indexed by the type's dense slot.

use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};

use super::component::Component;
use super::egid::Egid;
use super::guard::MutationGuard;
use super::index::EntityIndex;
use super::table::ComponentTable;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};

/// Table and index of one component type.
pub struct ComponentStore<T: Component> {
    table: ComponentTable<T>,
    index: EntityIndex<T>,
}

impl<T: Component> ComponentStore<T> {
    /// Creates an empty store sized by the configuration.
    #[must_use]
    pub fn new(config: &DbConfig) -> Self {
        Self {
            table: ComponentTable::new(config.initial_group_capacity, config.expected_groups),
            index: EntityIndex::new(config.initial_group_capacity, config.expected_groups),
        }
    }

    /// The record buffers.
    #[inline]
    #[must_use]
    pub fn table(&self) -> &ComponentTable<T> {
        &self.table
    }

    /// The EGID index.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &EntityIndex<T> {
        &self.index
    }

    /// Mutable record buffers alongside the read-only index.
    #[inline]
    pub fn parts_mut(&mut self) -> (&mut ComponentTable<T>, &EntityIndex<T>) {
        (&mut self.table, &self.index)
    }

    /// Appends a record and indexes it before it becomes visible.
    pub(crate) fn insert(&mut self, egid: Egid, record: T) -> DbResult<u32> {
        if self.index.exists(egid) {
            return Err(DbError::DuplicateComponent {
                component: T::NAME,
                egid,
            });
        }

        let position = self.table.append(egid.group_id(), record);
        let indexed = self.index.push(egid);
        debug_assert_eq!(position, indexed, "table and index out of step");
        Ok(position)
    }

    /// Swap-removes a record and fixes up both affected index entries.
    pub(crate) fn remove(&mut self, egid: Egid) -> DbResult<T> {
        let not_found = DbError::EntityNotFound {
            component: T::NAME,
            egid,
        };
        let position = self.index.swap_remove(egid).ok_or_else(|| not_found.clone())?;
        self.table
            .swap_remove(egid.group_id(), position)
            .ok_or(not_found)
    }
}

/// Type-erased view of a [`StoreCell`], used for per-entity operations that
/// span every registered component type.
pub(crate) trait ErasedStore {
    /// Component type name.
    fn name(&self) -> &'static str;

    /// Fails if `T` is under iteration or borrowed.
    fn check_mutable(&self, egid: Egid) -> DbResult<()>;

    /// Checks whether the entity carries this component.
    fn contains(&self, egid: Egid) -> DbResult<bool>;

    /// Removes the entity's record if present.
    fn remove_entity(&self, egid: Egid) -> DbResult<bool>;

    /// Moves the entity's record, if present, to the EGID `to`.
    fn move_entity(&self, from: Egid, to: Egid) -> DbResult<bool>;

    fn as_any(&self) -> &dyn Any;
}

/// Interior-mutable store plus its mutation guard.
pub(crate) struct StoreCell<T: Component> {
    guard: MutationGuard,
    store: RefCell<ComponentStore<T>>,
}

impl<T: Component> StoreCell<T> {
    pub(crate) fn new(config: &DbConfig) -> Self {
        Self {
            guard: MutationGuard::default(),
            store: RefCell::new(ComponentStore::new(config)),
        }
    }

    #[inline]
    pub(crate) fn guard(&self) -> &MutationGuard {
        &self.guard
    }

    /// Shared borrow of the store.
    #[inline]
    pub(crate) fn read(&self) -> DbResult<Ref<'_, ComponentStore<T>>> {
        self.store
            .try_borrow()
            .map_err(|_| DbError::ComponentBorrowed { component: T::NAME })
    }

    /// Exclusive borrow of the store.
    #[inline]
    pub(crate) fn write(&self) -> DbResult<RefMut<'_, ComponentStore<T>>> {
        self.store
            .try_borrow_mut()
            .map_err(|_| DbError::ComponentBorrowed { component: T::NAME })
    }

    /// Exclusive borrow for a structural change, honouring the guard.
    pub(crate) fn write_structural(&self, egid: Egid) -> DbResult<RefMut<'_, ComponentStore<T>>> {
        if self.guard.is_active() {
            tracing::warn!(
                component = T::NAME,
                entity = egid.entity_id(),
                group = egid.group_id().0,
                "structural mutation rejected during iteration"
            );
            return Err(DbError::ConcurrentStructuralMutation {
                component: T::NAME,
                egid,
            });
        }
        self.write()
    }
}

impl<T: Component> ErasedStore for StoreCell<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn check_mutable(&self, egid: Egid) -> DbResult<()> {
        self.write_structural(egid).map(drop)
    }

    fn contains(&self, egid: Egid) -> DbResult<bool> {
        Ok(self.read()?.index().exists(egid))
    }

    fn remove_entity(&self, egid: Egid) -> DbResult<bool> {
        let mut store = self.write_structural(egid)?;
        if !store.index().exists(egid) {
            return Ok(false);
        }
        store.remove(egid)?;
        Ok(true)
    }

    fn move_entity(&self, from: Egid, to: Egid) -> DbResult<bool> {
        let mut store = self.write_structural(from)?;
        if !store.index().exists(from) {
            return Ok(false);
        }
        if store.index().exists(to) {
            return Err(DbError::DuplicateComponent {
                component: T::NAME,
                egid: to,
            });
        }
        let record = store.remove(from)?;
        store.insert(to, record)?;
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::fixtures::Position;
    use crate::ecs::egid::GroupId;

    fn store() -> ComponentStore<Position> {
        ComponentStore::new(&DbConfig::default())
    }

    /// Every indexed EGID points at a distinct occupied slot and every slot
    /// is indexed.
    fn assert_bijection(store: &ComponentStore<Position>) {
        let mut seen = std::collections::HashSet::new();
        for (egid, position) in store.index().iter() {
            assert!((position as usize) < store.table().get(egid.group_id()).len());
            assert!(seen.insert((egid.group_id(), position)));
        }
        assert_eq!(seen.len(), store.table().total_count());
    }

    #[test]
    fn test_insert_then_remove_keeps_bijection() {
        let mut store = store();
        let group = GroupId(2);
        for id in [10, 11, 12, 13] {
            store
                .insert(Egid::new(id, group), Position::new(id as f32, 0.0))
                .unwrap();
        }
        assert_bijection(&store);

        let removed = store.remove(Egid::new(11, group)).unwrap();
        assert_eq!(removed, Position::new(11.0, 0.0));
        assert_bijection(&store);

        let position = store.index().resolve(Egid::new(13, group)).unwrap();
        assert_eq!(position, 1);
        assert_eq!(store.table().get(group)[1], Position::new(13.0, 0.0));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut store = store();
        let egid = Egid::new(1, GroupId(0));
        store.insert(egid, Position::default()).unwrap();
        assert_eq!(
            store.insert(egid, Position::default()),
            Err(DbError::DuplicateComponent {
                component: "Position",
                egid,
            })
        );
        assert_eq!(store.table().count(GroupId(0)), 1);
    }

    #[test]
    fn test_remove_missing_is_entity_not_found() {
        let mut store = store();
        let egid = Egid::new(5, GroupId(1));
        assert!(matches!(
            store.remove(egid),
            Err(DbError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn test_guarded_cell_rejects_structural_change() {
        let cell: StoreCell<Position> = StoreCell::new(&DbConfig::default());
        let egid = Egid::new(1, GroupId(0));
        let _scope = cell.guard().enter();
        assert_eq!(
            cell.check_mutable(egid),
            Err(DbError::ConcurrentStructuralMutation {
                component: "Position",
                egid,
            })
        );
    }

    #[test]
    fn test_borrowed_cell_rejects_write() {
        let cell: StoreCell<Position> = StoreCell::new(&DbConfig::default());
        let _view = cell.read().unwrap();
        assert_eq!(
            cell.write().err(),
            Some(DbError::ComponentBorrowed {
                component: "Position"
            })
        );
    }
}
