//! # Component Types
//!
//! Components are pure data records with no behavior.
//! They must be `Pod` so group buffers stay plain, bitwise-copyable memory.

use std::fmt;
use std::marker::PhantomData;

use bytemuck::Pod;

/// Marker trait for records stored in the entities database.
///
/// Components must be:
/// - `Pod`: plain old data, bitwise copyable, viewable as bytes
/// - `Default`: has a neutral value
/// - `Send + Sync + 'static`: can be owned by the database
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Default, Pod, Zeroable)]
/// #[repr(C)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
///
/// impl Component for Position {
///     const NAME: &'static str = "Position";
/// }
/// ```
pub trait Component: Pod + Default + Send + Sync + 'static {
    /// Human-readable name, used in error messages and logs.
    const NAME: &'static str;
}

/// Dense registry handle for a component type.
///
/// Returned by [`EntitiesDb::register`](crate::EntitiesDb::register). The
/// handle is the index of the type's store inside the database.
pub struct ComponentId<T: Component> {
    slot: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentId<T> {
    #[inline]
    pub(crate) const fn new(slot: u32) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    /// Returns the dense slot of this component type.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }
}

impl<T: Component> Clone for ComponentId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Component> Copy for ComponentId<T> {}

impl<T: Component> PartialEq for ComponentId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T: Component> Eq for ComponentId<T> {}

impl<T: Component> fmt::Debug for ComponentId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId<{}>({})", T::NAME, self.slot)
    }
}

/// Components shared by the unit tests of this crate.
#[cfg(test)]
pub(crate) mod fixtures {
    use bytemuck::{Pod, Zeroable};

    use super::Component;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    pub struct Position {
        pub x: f32,
        pub y: f32,
    }

    impl Position {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    impl Component for Position {
        const NAME: &'static str = "Position";
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    pub struct Velocity {
        pub x: f32,
        pub y: f32,
    }

    impl Velocity {
        pub const fn new(x: f32, y: f32) -> Self {
            Self { x, y }
        }
    }

    impl Component for Velocity {
        const NAME: &'static str = "Velocity";
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
    #[repr(C)]
    pub struct Health {
        pub current: u32,
    }

    impl Component for Health {
        const NAME: &'static str = "Health";
    }
}
