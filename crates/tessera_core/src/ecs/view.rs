//! # Borrowed Views
//!
//! Zero-copy access to group buffers. Every view holds a borrow of its
//! component store: while it is alive, structural changes of that component
//! type are rejected, so a view can never observe a half-updated buffer.
//! Indexing past `count()` panics like any slice access.

use std::cell::{Ref, RefMut};
use std::ops::{Deref, DerefMut};

use super::component::Component;
use super::egid::{Egid, GroupId};
use super::store::ComponentStore;
use super::table::to_count;
use crate::error::{DbError, DbResult};

/// Read-only dense records of one group.
pub struct EntityView<'a, T: Component> {
    group: GroupId,
    records: Ref<'a, [T]>,
}

impl<'a, T: Component> EntityView<'a, T> {
    pub(crate) fn new(store: Ref<'a, ComponentStore<T>>, group: GroupId) -> Self {
        Self {
            group,
            records: Ref::map(store, |store| store.table().get(group)),
        }
    }

    /// The viewed group.
    #[inline]
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        to_count(self.records.len())
    }

    /// The records as raw bytes, for upload or snapshot consumers.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&*self.records)
    }
}

impl<T: Component> Deref for EntityView<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.records
    }
}

/// Mutable dense records of one group.
///
/// Records can be rewritten in place; the count is fixed for the view's
/// lifetime.
pub struct EntityViewMut<'a, T: Component> {
    group: GroupId,
    records: RefMut<'a, [T]>,
}

impl<'a, T: Component> EntityViewMut<'a, T> {
    pub(crate) fn new(store: RefMut<'a, ComponentStore<T>>, group: GroupId) -> Self {
        Self {
            group,
            records: RefMut::map(store, |store| store.parts_mut().0.get_mut(group)),
        }
    }

    /// The viewed group.
    #[inline]
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        to_count(self.records.len())
    }
}

impl<T: Component> Deref for EntityViewMut<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        &self.records
    }
}

impl<T: Component> DerefMut for EntityViewMut<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.records
    }
}

/// Read-only view over every group holding `T`.
pub struct AllGroupsView<'a, T: Component> {
    store: Ref<'a, ComponentStore<T>>,
}

impl<'a, T: Component> AllGroupsView<'a, T> {
    pub(crate) fn new(store: Ref<'a, ComponentStore<T>>) -> Self {
        Self { store }
    }

    /// Iterates `(group, records)` over non-empty groups in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &[T])> {
        self.store.table().get_all()
    }

    /// Records of a single group.
    #[must_use]
    pub fn group(&self, group: GroupId) -> &[T] {
        self.store.table().get(group)
    }

    /// Total records across all groups.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.store.table().total_count()
    }
}

/// Records of one group plus the group's EGID index.
///
/// Lookups hash once per call; prefer plain views in hot loops.
pub struct EgidMapper<'a, T: Component> {
    group: GroupId,
    store: Ref<'a, ComponentStore<T>>,
}

impl<'a, T: Component> EgidMapper<'a, T> {
    pub(crate) fn new(store: Ref<'a, ComponentStore<T>>, group: GroupId) -> Self {
        Self { group, store }
    }

    /// The mapped group.
    #[inline]
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.store.table().count(self.group)
    }

    /// The dense records of the group.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[T] {
        self.store.table().get(self.group)
    }

    /// Checks whether `egid` is in this group and has `T`.
    #[must_use]
    pub fn exists(&self, egid: Egid) -> bool {
        egid.group_id() == self.group && self.store.index().exists(egid)
    }

    /// Position of a bare entity id within the group.
    #[must_use]
    pub fn position_of(&self, entity_id: u32) -> Option<u32> {
        self.store
            .index()
            .for_group(self.group)
            .and_then(|index| index.position_of(entity_id))
    }

    /// Resolves `egid` to its position within the group buffer.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the EGID is not in this group or has
    /// no `T`.
    pub fn resolve(&self, egid: Egid) -> DbResult<u32> {
        if egid.group_id() != self.group {
            return Err(DbError::EntityNotFound {
                component: T::NAME,
                egid,
            });
        }
        self.store.index().resolve(egid)
    }

    /// The record of `egid`.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the EGID is not in this group or has no
    /// `T`.
    pub fn entity(&self, egid: Egid) -> DbResult<&T> {
        let position = self.resolve(egid)?;
        Ok(&self.entities()[position as usize])
    }
}

/// Mutable counterpart of [`EgidMapper`].
pub struct EgidMapperMut<'a, T: Component> {
    group: GroupId,
    store: RefMut<'a, ComponentStore<T>>,
}

impl<'a, T: Component> EgidMapperMut<'a, T> {
    pub(crate) fn new(store: RefMut<'a, ComponentStore<T>>, group: GroupId) -> Self {
        Self { group, store }
    }

    /// The mapped group.
    #[inline]
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.store.table().count(self.group)
    }

    /// Checks whether `egid` is in this group and has `T`.
    #[must_use]
    pub fn exists(&self, egid: Egid) -> bool {
        egid.group_id() == self.group && self.store.index().exists(egid)
    }

    /// Resolves `egid` to its position within the group buffer.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the EGID is not in this group or has
    /// no `T`.
    pub fn resolve(&self, egid: Egid) -> DbResult<u32> {
        if egid.group_id() != self.group {
            return Err(DbError::EntityNotFound {
                component: T::NAME,
                egid,
            });
        }
        self.store.index().resolve(egid)
    }

    /// The dense records of the group.
    #[must_use]
    pub fn entities(&self) -> &[T] {
        self.store.table().get(self.group)
    }

    /// The dense records of the group, mutably.
    pub fn entities_mut(&mut self) -> &mut [T] {
        let group = self.group;
        self.store.parts_mut().0.get_mut(group)
    }

    /// The record of `egid`, mutably.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the EGID is not in this group or has no
    /// `T`.
    pub fn entity_mut(&mut self, egid: Egid) -> DbResult<&mut T> {
        let position = self.resolve(egid)?;
        Ok(&mut self.entities_mut()[position as usize])
    }
}
