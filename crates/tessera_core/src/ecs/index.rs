//! # Entity Index
//!
//! Maps EGIDs to positions inside a component table's group buffers.
//!
//! For every occupied slot `(group, position)` there is exactly one EGID
//! mapped to it, and vice versa. Each group keeps both directions:
//! - `positions`: entity id -> position (hash lookup)
//! - `entities`: position -> entity id (dense, mirrors the record buffer)

use std::collections::HashMap;
use std::marker::PhantomData;

use super::component::Component;
use super::egid::{Egid, GroupId};
use super::table::to_count;
use crate::error::{DbError, DbResult};

/// Index of a single group: bare entity ids to positions.
///
/// Obtained through [`EntityIndex::for_group`] when the caller already knows
/// the group and wants repeated lookups without hashing the group again.
#[derive(Debug, Default)]
pub struct GroupIndex {
    positions: HashMap<u32, u32>,
    entities: Vec<u32>,
}

impl GroupIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: HashMap::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
        }
    }

    /// Returns the position of an entity, if it is in this group.
    #[inline]
    #[must_use]
    pub fn position_of(&self, entity_id: u32) -> Option<u32> {
        self.positions.get(&entity_id).copied()
    }

    /// Checks whether an entity is in this group.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity_id: u32) -> bool {
        self.positions.contains_key(&entity_id)
    }

    /// Returns the entity id stored at a position.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, position: u32) -> Option<u32> {
        self.entities.get(position as usize).copied()
    }

    /// Entity ids in buffer order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[u32] {
        &self.entities
    }

    /// Number of indexed entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Checks if the group index is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn push(&mut self, entity_id: u32) -> u32 {
        let position = to_count(self.entities.len());
        self.entities.push(entity_id);
        self.positions.insert(entity_id, position);
        position
    }

    /// Mirrors a swap-remove on the record buffer.
    ///
    /// Deletes the entry of `entity_id` and rewrites the entry of the entity
    /// moved into the freed position. Returns the freed position.
    fn swap_remove(&mut self, entity_id: u32) -> Option<u32> {
        let position = self.positions.remove(&entity_id)?;
        self.entities.swap_remove(position as usize);
        if let Some(&moved) = self.entities.get(position as usize) {
            self.positions.insert(moved, position);
        }
        Some(position)
    }
}

/// EGID -> position map for component type `T`.
///
/// A resolved position is valid only until the next structural mutation of
/// `T` in that group.
pub struct EntityIndex<T: Component> {
    groups: HashMap<GroupId, GroupIndex>,
    initial_group_capacity: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> EntityIndex<T> {
    /// Creates an empty index.
    #[must_use]
    pub fn new(initial_group_capacity: usize, expected_groups: usize) -> Self {
        Self {
            groups: HashMap::with_capacity(expected_groups),
            initial_group_capacity,
            _marker: PhantomData,
        }
    }

    /// Resolves an EGID to its position within its group buffer.
    ///
    /// # Errors
    ///
    /// [`DbError::EntityNotFound`] if the entity has no `T`.
    #[inline]
    pub fn resolve(&self, egid: Egid) -> DbResult<u32> {
        self.lookup(egid).ok_or(DbError::EntityNotFound {
            component: T::NAME,
            egid,
        })
    }

    /// Checks whether the entity has a `T`.
    #[inline]
    #[must_use]
    pub fn exists(&self, egid: Egid) -> bool {
        self.lookup(egid).is_some()
    }

    /// Returns the index restricted to one group.
    #[inline]
    #[must_use]
    pub fn for_group(&self, group: GroupId) -> Option<&GroupIndex> {
        self.groups.get(&group)
    }

    /// Total number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.values().map(GroupIndex::len).sum()
    }

    /// Checks if no entity is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(GroupIndex::is_empty)
    }

    /// Iterates every indexed EGID with its position.
    pub fn iter(&self) -> impl Iterator<Item = (Egid, u32)> + '_ {
        self.groups.iter().flat_map(|(&group, index)| {
            index
                .positions
                .iter()
                .map(move |(&entity_id, &position)| (Egid::new(entity_id, group), position))
        })
    }

    #[inline]
    fn lookup(&self, egid: Egid) -> Option<u32> {
        self.groups
            .get(&egid.group_id())
            .and_then(|index| index.position_of(egid.entity_id()))
    }

    /// Records a freshly appended slot. Returns the assigned position.
    pub(crate) fn push(&mut self, egid: Egid) -> u32 {
        let capacity = self.initial_group_capacity;
        self.groups
            .entry(egid.group_id())
            .or_insert_with(|| GroupIndex::with_capacity(capacity))
            .push(egid.entity_id())
    }

    /// Removes an EGID, returning the position it occupied.
    pub(crate) fn swap_remove(&mut self, egid: Egid) -> Option<u32> {
        self.groups
            .get_mut(&egid.group_id())
            .and_then(|index| index.swap_remove(egid.entity_id()))
    }
}
