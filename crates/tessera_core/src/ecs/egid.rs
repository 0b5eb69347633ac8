//! # Entity Identity
//!
//! An entity is named by its EGID: the pair of an entity id and the group
//! the entity currently lives in.
//! - Lower 32 bits: entity id
//! - Upper 32 bits: group id

use std::fmt;

/// Identifier of an entity group.
///
/// Groups partition entities. Every component table keeps one dense buffer
/// per group, so a group is the unit of locality for joint iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct GroupId(pub u32);

impl GroupId {
    /// The group used when the caller does not name one explicitly.
    pub const STANDARD: Self = Self(0);

    /// Returns the raw group id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for GroupId {
    #[inline]
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group {}", self.0)
    }
}

/// Entity Group Identifier.
///
/// Uniquely names one entity's slot within one group. Equality is
/// structural. An entity keeps its EGID across component mutation; moving it
/// to another group yields a new EGID.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Egid(u64);

impl Egid {
    /// Creates an EGID from an entity id and a group.
    #[inline]
    #[must_use]
    pub const fn new(entity_id: u32, group: GroupId) -> Self {
        Self(((group.0 as u64) << 32) | (entity_id as u64))
    }

    /// Creates an EGID in [`GroupId::STANDARD`].
    #[inline]
    #[must_use]
    pub const fn standard(entity_id: u32) -> Self {
        Self::new(entity_id, GroupId::STANDARD)
    }

    /// Returns the entity id portion.
    #[inline]
    #[must_use]
    pub const fn entity_id(self) -> u32 {
        self.0 as u32
    }

    /// Returns the group portion.
    #[inline]
    #[must_use]
    pub const fn group_id(self) -> GroupId {
        GroupId((self.0 >> 32) as u32)
    }

    /// Returns the packed 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Returns the same entity id placed in another group.
    #[inline]
    #[must_use]
    pub const fn with_group(self, group: GroupId) -> Self {
        Self::new(self.entity_id(), group)
    }
}

impl fmt::Debug for Egid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Egid")
            .field("entity_id", &self.entity_id())
            .field("group_id", &self.group_id().0)
            .finish()
    }
}

impl fmt::Display for Egid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.entity_id(), self.group_id().0)
    }
}
