//! # Structural Changes
//!
//! Adding and removing components changes buffer counts and positions, so
//! these operations are kept apart from the query API behind
//! [`StructuralMutation`]. Each one fails with
//! [`DbError::ConcurrentStructuralMutation`] while an affected type is being
//! iterated, and with [`DbError::ComponentBorrowed`] while a view of it is
//! alive.
//!
//! Operations spanning every registered type (`remove_entity`,
//! `move_to_group`) validate all stores first and only then mutate, so a
//! rejected call leaves every store untouched.

use super::component::Component;
use super::db::EntitiesDb;
use super::egid::{Egid, GroupId};
use crate::error::{DbError, DbResult};

/// Entity submission: the operations that change buffer layout.
pub trait StructuralMutation {
    /// Appends `record` for `egid` to the end of its group buffer.
    ///
    /// Returns the record's position in the group.
    ///
    /// # Errors
    ///
    /// [`DbError::DuplicateComponent`] if the entity already has a `T`.
    fn add_component<T: Component>(&self, egid: Egid, record: T) -> DbResult<u32>;

    /// Swap-removes the `T` record of `egid` and returns it.
    ///
    /// The group's last record takes the freed position.
    fn remove_component<T: Component>(&self, egid: Egid) -> DbResult<T>;

    /// Removes every component of `egid`, returning how many were removed.
    ///
    /// An entity with no components is not an error.
    fn remove_entity(&self, egid: Egid) -> DbResult<usize>;

    /// Moves every component of `egid` into `group`, returning the new EGID.
    ///
    /// The records are swap-removed from the old group and appended to the
    /// new one; positions are not preserved.
    fn move_to_group(&self, egid: Egid, group: GroupId) -> DbResult<Egid>;
}

impl StructuralMutation for EntitiesDb {
    fn add_component<T: Component>(&self, egid: Egid, record: T) -> DbResult<u32> {
        let mut store = self.cell::<T>()?.write_structural(egid)?;
        let position = store.insert(egid, record)?;
        if self.config.trace_structural_changes {
            tracing::trace!(
                component = T::NAME,
                entity = egid.entity_id(),
                group = egid.group_id().0,
                position,
                "component added"
            );
        }
        Ok(position)
    }

    fn remove_component<T: Component>(&self, egid: Egid) -> DbResult<T> {
        let mut store = self.cell::<T>()?.write_structural(egid)?;
        let record = store.remove(egid)?;
        if self.config.trace_structural_changes {
            tracing::trace!(
                component = T::NAME,
                entity = egid.entity_id(),
                group = egid.group_id().0,
                remaining = store.table().count(egid.group_id()),
                "component removed"
            );
        }
        Ok(record)
    }

    fn remove_entity(&self, egid: Egid) -> DbResult<usize> {
        for store in self.stores() {
            store.check_mutable(egid)?;
        }

        let mut removed = 0;
        for store in self.stores() {
            if store.remove_entity(egid)? {
                removed += 1;
            }
        }

        if self.config.trace_structural_changes {
            tracing::trace!(
                entity = egid.entity_id(),
                group = egid.group_id().0,
                removed,
                "entity removed"
            );
        }
        Ok(removed)
    }

    fn move_to_group(&self, egid: Egid, group: GroupId) -> DbResult<Egid> {
        let target = egid.with_group(group);
        if target == egid {
            return Ok(egid);
        }

        for store in self.stores() {
            store.check_mutable(egid)?;
            if store.contains(egid)? && store.contains(target)? {
                return Err(DbError::DuplicateComponent {
                    component: store.name(),
                    egid: target,
                });
            }
        }

        let mut moved = 0_usize;
        for store in self.stores() {
            if store.move_entity(egid, target)? {
                moved += 1;
            }
        }

        if self.config.trace_structural_changes {
            tracing::trace!(
                entity = egid.entity_id(),
                from = egid.group_id().0,
                to = group.0,
                moved,
                "entity moved"
            );
        }
        Ok(target)
    }
}
