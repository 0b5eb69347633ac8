//! # Component Table
//!
//! Dense, group-partitioned storage for a single component type.
//!
//! The table keeps one buffer per group:
//! - Position `count - 1` is always the last occupied slot (no holes)
//! - Access to a group's buffer is O(1)
//! - Capacity grows geometrically and is never released implicitly
//!
//! Only the structural-mutation path appends or removes records. Query code
//! sees the buffers as plain slices.

use std::collections::HashMap;

use super::component::Component;
use super::egid::GroupId;

/// Dense buffer of one group.
struct GroupBuffer<T> {
    group: GroupId,
    records: Vec<T>,
}

/// Storage for every record of component type `T`, partitioned by group.
///
/// Groups keep the slot they were given the first time they received a
/// record, so iteration over all groups follows group registration order.
///
/// # Example
///
/// ```rust,ignore
/// let mut table: ComponentTable<Position> = ComponentTable::new(64, 8);
/// table.append(GroupId(0), Position::new(1.0, 2.0));
/// assert_eq!(table.get(GroupId(0)).len(), 1);
/// ```
pub struct ComponentTable<T: Component> {
    /// Buffers in group registration order.
    buffers: Vec<GroupBuffer<T>>,
    /// Group -> index into `buffers`.
    slots: HashMap<GroupId, usize>,
    /// Number of groups holding at least one record.
    populated: usize,
    /// Records reserved for a freshly registered group.
    initial_group_capacity: usize,
}

#[inline]
pub(crate) fn to_count(len: usize) -> u32 {
    debug_assert!(u32::try_from(len).is_ok(), "buffer length exceeds u32::MAX");
    #[allow(clippy::cast_possible_truncation)]
    {
        len as u32
    }
}

impl<T: Component> ComponentTable<T> {
    /// Creates an empty table.
    ///
    /// # Arguments
    ///
    /// * `initial_group_capacity` - Records reserved when a group is first used
    /// * `expected_groups` - Group slots reserved up front
    #[must_use]
    pub fn new(initial_group_capacity: usize, expected_groups: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(expected_groups),
            slots: HashMap::with_capacity(expected_groups),
            populated: 0,
            initial_group_capacity,
        }
    }

    #[inline]
    fn buffer(&self, group: GroupId) -> Option<&GroupBuffer<T>> {
        self.slots.get(&group).map(|&slot| &self.buffers[slot])
    }

    /// Returns the dense records of a group.
    ///
    /// The slice length is the group's record count. A group that never
    /// held `T` yields an empty slice.
    #[inline]
    #[must_use]
    pub fn get(&self, group: GroupId) -> &[T] {
        match self.buffer(group) {
            Some(buffer) => buffer.records.as_slice(),
            None => &[],
        }
    }

    /// Returns the dense records of a group, mutably.
    ///
    /// Records can be rewritten in place; the count cannot change.
    #[inline]
    pub fn get_mut(&mut self, group: GroupId) -> &mut [T] {
        match self.slots.get(&group) {
            Some(&slot) => self.buffers[slot].records.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Returns the record count of a group.
    #[inline]
    #[must_use]
    pub fn count(&self, group: GroupId) -> u32 {
        to_count(self.get(group).len())
    }

    /// Returns the reserved capacity of a group's buffer.
    #[inline]
    #[must_use]
    pub fn capacity(&self, group: GroupId) -> usize {
        self.buffer(group).map_or(0, |buffer| buffer.records.capacity())
    }

    /// Iterates every group holding at least one record, in registration order.
    pub fn get_all(&self) -> impl Iterator<Item = (GroupId, &[T])> {
        self.buffers
            .iter()
            .filter(|buffer| !buffer.records.is_empty())
            .map(|buffer| (buffer.group, buffer.records.as_slice()))
    }

    /// Mutable counterpart of [`ComponentTable::get_all`].
    pub fn get_all_mut(&mut self) -> impl Iterator<Item = (GroupId, &mut [T])> {
        self.buffers
            .iter_mut()
            .filter(|buffer| !buffer.records.is_empty())
            .map(|buffer| (buffer.group, buffer.records.as_mut_slice()))
    }

    /// Checks whether any group holds a record. O(1).
    #[inline]
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.populated > 0
    }

    /// Checks whether a group holds a record. O(1).
    #[inline]
    #[must_use]
    pub fn has_any_in(&self, group: GroupId) -> bool {
        self.buffer(group)
            .is_some_and(|buffer| !buffer.records.is_empty())
    }

    /// Total number of records across all groups.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.buffers.iter().map(|buffer| buffer.records.len()).sum()
    }

    /// Appends a record to a group, returning its position.
    pub(crate) fn append(&mut self, group: GroupId, record: T) -> u32 {
        let slot = match self.slots.get(&group) {
            Some(&slot) => slot,
            None => {
                let slot = self.buffers.len();
                self.buffers.push(GroupBuffer {
                    group,
                    records: Vec::with_capacity(self.initial_group_capacity),
                });
                self.slots.insert(group, slot);
                tracing::debug!(component = T::NAME, group = group.0, "group registered");
                slot
            }
        };

        let records = &mut self.buffers[slot].records;
        if records.is_empty() {
            self.populated += 1;
        }
        records.push(record);
        to_count(records.len() - 1)
    }

    /// Removes the record at `position` by moving the last record into it.
    ///
    /// Returns the removed record, or `None` if the position is not occupied.
    pub(crate) fn swap_remove(&mut self, group: GroupId, position: u32) -> Option<T> {
        let &slot = self.slots.get(&group)?;
        let records = &mut self.buffers[slot].records;
        let position = position as usize;
        if position >= records.len() {
            return None;
        }

        let removed = records.swap_remove(position);
        if records.is_empty() {
            self.populated -= 1;
        }
        Some(removed)
    }
}
