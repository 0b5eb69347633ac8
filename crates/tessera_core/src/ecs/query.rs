//! # Query and Iteration
//!
//! Read and mutate component records without per-call heap allocation.
//!
//! ## Access patterns
//!
//! | Operation | Scope | Cost |
//! |---|---|---|
//! | `query_entities` | one group | O(1), borrowed view |
//! | `query_mapped_entities` | one group | O(1), view + index |
//! | `execute_on_entities` | one group | O(count) |
//! | `execute_on_entities_pair` | one group, two types | O(count), no index lookups |
//! | `execute_on_all_entities` | every group | O(groups + records) |
//! | `execute_on_all_entities_pair` | every group, two types | O(groups + records) |
//! | `execute_on_entity` | one entity | O(1) hash lookup |
//!
//! Working on single entities is sometimes necessary, but calling
//! `execute_on_entity` inside another iteration's loop throws away the
//! locality the group buffers provide.
//!
//! Every `execute_*` operation has a `_with` form that threads a caller
//! state `&mut W` through the action, so actions need not capture anything.
//! While an `execute_*` call runs, structural changes of the iterated
//! types fail with [`DbError::ConcurrentStructuralMutation`].

use std::any::TypeId;

use super::component::Component;
use super::db::EntitiesDb;
use super::egid::{Egid, GroupId};
use super::table::to_count;
use super::view::{AllGroupsView, EgidMapper, EgidMapperMut, EntityView, EntityViewMut};
use crate::error::{DbError, DbResult};

impl EntitiesDb {
    // =========================================================================
    // Raw views
    // =========================================================================

    /// Returns the dense records of `T` in `group`.
    ///
    /// A group without `T` yields an empty view, not an error.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn query_entities<T: Component>(&self, group: GroupId) -> DbResult<EntityView<'_, T>> {
        let store = self.cell::<T>()?.read()?;
        Ok(EntityView::new(store, group))
    }

    /// Returns the dense records of `T` in `group`, mutably.
    ///
    /// Modifying records in place is allowed; the view holds the type's store
    /// exclusively until dropped.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while any view of `T` is alive.
    pub fn query_entities_mut<T: Component>(
        &self,
        group: GroupId,
    ) -> DbResult<EntityViewMut<'_, T>> {
        let store = self.cell::<T>()?.write()?;
        Ok(EntityViewMut::new(store, group))
    }

    /// Returns a view over every group holding `T`.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn query_all_entities<T: Component>(&self) -> DbResult<AllGroupsView<'_, T>> {
        let store = self.cell::<T>()?.read()?;
        Ok(AllGroupsView::new(store))
    }

    /// Returns the records of `T` in `group` together with the group's index.
    ///
    /// Mapping costs a hash per lookup; keep it off performance critical paths.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn query_mapped_entities<T: Component>(
        &self,
        group: GroupId,
    ) -> DbResult<EgidMapper<'_, T>> {
        let store = self.cell::<T>()?.read()?;
        Ok(EgidMapper::new(store, group))
    }

    /// Mutable counterpart of [`EntitiesDb::query_mapped_entities`].
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while any view of `T` is alive.
    pub fn query_mapped_entities_mut<T: Component>(
        &self,
        group: GroupId,
    ) -> DbResult<EgidMapperMut<'_, T>> {
        let store = self.cell::<T>()?.write()?;
        Ok(EgidMapperMut::new(store, group))
    }

    /// Returns the group buffer holding `egid` and the entity's position in it.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the entity has no `T`.
    pub fn query_entities_and_index<T: Component>(
        &self,
        egid: Egid,
    ) -> DbResult<(EntityViewMut<'_, T>, u32)> {
        self.try_query_entities_and_index::<T>(egid)?
            .ok_or(DbError::EntityNotFound {
                component: T::NAME,
                egid,
            })
    }

    /// Like [`EntitiesDb::query_entities_and_index`], but a missing entity
    /// yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while any view of `T` is alive.
    pub fn try_query_entities_and_index<T: Component>(
        &self,
        egid: Egid,
    ) -> DbResult<Option<(EntityViewMut<'_, T>, u32)>> {
        let store = self.cell::<T>()?.write()?;
        let Ok(position) = store.index().resolve(egid) else {
            return Ok(None);
        };
        Ok(Some((EntityViewMut::new(store, egid.group_id()), position)))
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    /// Checks whether the entity carries `T`.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn exists<T: Component>(&self, egid: Egid) -> DbResult<bool> {
        Ok(self.cell::<T>()?.read()?.index().exists(egid))
    }

    /// Checks whether any group holds `T`. O(1).
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn has_any<T: Component>(&self) -> DbResult<bool> {
        Ok(self.cell::<T>()?.read()?.table().has_any())
    }

    /// Checks whether `group` holds `T`. O(1).
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn has_any_in<T: Component>(&self, group: GroupId) -> DbResult<bool> {
        Ok(self.cell::<T>()?.read()?.table().has_any_in(group))
    }

    /// Number of `T` records in `group`.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a mutable view of `T` is alive.
    pub fn count<T: Component>(&self, group: GroupId) -> DbResult<u32> {
        Ok(self.cell::<T>()?.read()?.table().count(group))
    }

    // =========================================================================
    // Single entity
    // =========================================================================

    /// Runs `action` on the `T` record of one entity.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the entity has no `T`; the action is
    /// not invoked.
    pub fn execute_on_entity<T, F>(&self, egid: Egid, action: F) -> DbResult<()>
    where
        T: Component,
        F: FnOnce(&mut T),
    {
        self.execute_on_entity_with(egid, &mut (), |record: &mut T, _: &mut ()| action(record))
    }

    /// [`EntitiesDb::execute_on_entity`] with caller state.
    ///
    /// # Errors
    ///
    /// Same as [`EntitiesDb::execute_on_entity`].
    pub fn execute_on_entity_with<T, W, F>(&self, egid: Egid, state: &mut W, action: F) -> DbResult<()>
    where
        T: Component,
        F: FnOnce(&mut T, &mut W),
    {
        let cell = self.cell::<T>()?;
        let _scope = cell.guard().enter();
        let mut store = cell.write()?;
        let position = store.index().resolve(egid)?;
        let (table, _) = store.parts_mut();
        action(&mut table.get_mut(egid.group_id())[position as usize], state);
        Ok(())
    }

    // =========================================================================
    // One group
    // =========================================================================

    /// Runs `action(record, index)` on every `T` record of `group`, in
    /// buffer order.
    ///
    /// An empty or unknown group is not an error; the action is simply not
    /// invoked.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a view of `T` is alive.
    pub fn execute_on_entities<T, F>(&self, group: GroupId, mut action: F) -> DbResult<()>
    where
        T: Component,
        F: FnMut(&mut T, u32),
    {
        self.execute_on_entities_with(group, &mut (), |record: &mut T, index, _: &mut ()| {
            action(record, index);
        })
    }

    /// [`EntitiesDb::execute_on_entities`] with caller state.
    ///
    /// # Errors
    ///
    /// Same as [`EntitiesDb::execute_on_entities`].
    pub fn execute_on_entities_with<T, W, F>(
        &self,
        group: GroupId,
        state: &mut W,
        mut action: F,
    ) -> DbResult<()>
    where
        T: Component,
        F: FnMut(&mut T, u32, &mut W),
    {
        let cell = self.cell::<T>()?;
        let _scope = cell.guard().enter();
        let mut store = cell.write()?;
        let (table, _) = store.parts_mut();
        for (index, record) in table.get_mut(group).iter_mut().enumerate() {
            action(record, to_count(index), state);
        }
        Ok(())
    }

    /// Runs `action(first, second, index)` over two component types of one
    /// group by shared position.
    ///
    /// Position `i` of both buffers is assumed to describe the same entity,
    /// which holds when the two types were added to the group in lock-step.
    /// No index lookups happen per record.
    ///
    /// # Errors
    ///
    /// [`DbError::ComponentCountMismatch`] if the group's counts differ; the
    /// action is not invoked. [`DbError::AliasedComponentPair`] if `T` and
    /// `T1` are the same type.
    pub fn execute_on_entities_pair<T, T1, F>(&self, group: GroupId, mut action: F) -> DbResult<()>
    where
        T: Component,
        T1: Component,
        F: FnMut(&mut T, &mut T1, u32),
    {
        self.execute_on_entities_pair_with(
            group,
            &mut (),
            |first: &mut T, second: &mut T1, index, _: &mut ()| action(first, second, index),
        )
    }

    /// [`EntitiesDb::execute_on_entities_pair`] with caller state.
    ///
    /// # Errors
    ///
    /// Same as [`EntitiesDb::execute_on_entities_pair`].
    pub fn execute_on_entities_pair_with<T, T1, W, F>(
        &self,
        group: GroupId,
        state: &mut W,
        mut action: F,
    ) -> DbResult<()>
    where
        T: Component,
        T1: Component,
        F: FnMut(&mut T, &mut T1, u32, &mut W),
    {
        let first_cell = self.cell::<T>()?;
        let second_cell = self.cell::<T1>()?;
        if TypeId::of::<T>() == TypeId::of::<T1>() {
            return Err(DbError::AliasedComponentPair { component: T::NAME });
        }

        let _first_scope = first_cell.guard().enter();
        let _second_scope = second_cell.guard().enter();
        let mut first_store = first_cell.write()?;
        let mut second_store = second_cell.write()?;

        check_counts::<T, T1>(
            group,
            first_store.table().count(group),
            second_store.table().count(group),
        )?;

        let (first_table, _) = first_store.parts_mut();
        let (second_table, _) = second_store.parts_mut();
        let pairs = first_table
            .get_mut(group)
            .iter_mut()
            .zip(second_table.get_mut(group).iter_mut());
        for (index, (first, second)) in pairs.enumerate() {
            action(first, second, to_count(index), state);
        }
        Ok(())
    }

    // =========================================================================
    // Every group
    // =========================================================================

    /// Runs `action(record, group, index)` on every `T` record of every
    /// group, group by group in registration order.
    ///
    /// Cost is proportional to the number of groups plus records; no cache
    /// friendliness across groups is implied.
    ///
    /// # Errors
    ///
    /// [`DbError::TypeNotRegistered`] if `T` was never registered;
    /// [`DbError::ComponentBorrowed`] while a view of `T` is alive.
    pub fn execute_on_all_entities<T, F>(&self, mut action: F) -> DbResult<()>
    where
        T: Component,
        F: FnMut(&mut T, GroupId, u32),
    {
        self.execute_on_all_entities_with(&mut (), |record: &mut T, group, index, _: &mut ()| {
            action(record, group, index);
        })
    }

    /// [`EntitiesDb::execute_on_all_entities`] with caller state.
    ///
    /// # Errors
    ///
    /// Same as [`EntitiesDb::execute_on_all_entities`].
    pub fn execute_on_all_entities_with<T, W, F>(&self, state: &mut W, mut action: F) -> DbResult<()>
    where
        T: Component,
        F: FnMut(&mut T, GroupId, u32, &mut W),
    {
        let cell = self.cell::<T>()?;
        let _scope = cell.guard().enter();
        let mut store = cell.write()?;
        let (table, _) = store.parts_mut();
        for (group, records) in table.get_all_mut() {
            for (index, record) in records.iter_mut().enumerate() {
                action(record, group, to_count(index), state);
            }
        }
        Ok(())
    }

    /// Runs `action(first, second, group, index)` over two component types
    /// in every group holding either of them, group by group in `T`'s
    /// registration order.
    ///
    /// Every group is checked before the first call, so a single mismatched
    /// group means the action runs zero times.
    ///
    /// # Errors
    ///
    /// [`DbError::ComponentCountMismatch`] for the first group whose counts
    /// differ. [`DbError::AliasedComponentPair`] if `T` and `T1` are the same
    /// type.
    pub fn execute_on_all_entities_pair<T, T1, F>(&self, mut action: F) -> DbResult<()>
    where
        T: Component,
        T1: Component,
        F: FnMut(&mut T, &mut T1, GroupId, u32),
    {
        self.execute_on_all_entities_pair_with(
            &mut (),
            |first: &mut T, second: &mut T1, group, index, _: &mut ()| {
                action(first, second, group, index);
            },
        )
    }

    /// [`EntitiesDb::execute_on_all_entities_pair`] with caller state.
    ///
    /// # Errors
    ///
    /// Same as [`EntitiesDb::execute_on_all_entities_pair`].
    pub fn execute_on_all_entities_pair_with<T, T1, W, F>(
        &self,
        state: &mut W,
        mut action: F,
    ) -> DbResult<()>
    where
        T: Component,
        T1: Component,
        F: FnMut(&mut T, &mut T1, GroupId, u32, &mut W),
    {
        let first_cell = self.cell::<T>()?;
        let second_cell = self.cell::<T1>()?;
        if TypeId::of::<T>() == TypeId::of::<T1>() {
            return Err(DbError::AliasedComponentPair { component: T::NAME });
        }

        let _first_scope = first_cell.guard().enter();
        let _second_scope = second_cell.guard().enter();
        let mut first_store = first_cell.write()?;
        let mut second_store = second_cell.write()?;

        let first_table = first_store.table();
        let second_table = second_store.table();
        for (group, records) in first_table.get_all() {
            check_counts::<T, T1>(group, to_count(records.len()), second_table.count(group))?;
        }
        for (group, records) in second_table.get_all() {
            check_counts::<T, T1>(group, first_table.count(group), to_count(records.len()))?;
        }

        let (first_table, _) = first_store.parts_mut();
        let (second_table, _) = second_store.parts_mut();
        for (group, firsts) in first_table.get_all_mut() {
            let pairs = firsts.iter_mut().zip(second_table.get_mut(group).iter_mut());
            for (index, (first, second)) in pairs.enumerate() {
                action(first, second, group, to_count(index), state);
            }
        }
        Ok(())
    }
}

/// Fails joint iteration when the two buffers of `group` differ in length.
fn check_counts<T: Component, T1: Component>(
    group: GroupId,
    first_count: u32,
    second_count: u32,
) -> DbResult<()> {
    if first_count == second_count {
        return Ok(());
    }
    tracing::warn!(
        first = T::NAME,
        second = T1::NAME,
        group = group.0,
        first_count,
        second_count,
        "joint iteration over mismatched buffers"
    );
    Err(DbError::ComponentCountMismatch {
        first: T::NAME,
        second: T1::NAME,
        group,
        first_count,
        second_count,
    })
}
