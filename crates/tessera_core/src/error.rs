//! # Database Error Types
//!
//! Every error here is deterministic and attributable to the caller: it
//! signals misuse of the storage contract, never an environmental failure.

use thiserror::Error;

use crate::ecs::{Egid, GroupId};

/// Errors that can occur in the entities database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Query against a component type that was never registered.
    #[error("component type `{component}` is not registered")]
    TypeNotRegistered {
        /// Name of the component type.
        component: &'static str,
    },

    /// The entity does not carry the requested component.
    #[error("entity {egid} has no `{component}` component")]
    EntityNotFound {
        /// Name of the component type.
        component: &'static str,
        /// The EGID that failed to resolve.
        egid: Egid,
    },

    /// Joint iteration over two buffers whose counts differ.
    #[error(
        "component count mismatch in {group}: `{first}` has {first_count}, `{second}` has {second_count}"
    )]
    ComponentCountMismatch {
        /// Name of the first component type.
        first: &'static str,
        /// Name of the second component type.
        second: &'static str,
        /// The group being iterated.
        group: GroupId,
        /// Record count of the first type.
        first_count: u32,
        /// Record count of the second type.
        second_count: u32,
    },

    /// Structural mutation of a component type that is under iteration.
    #[error("cannot add or remove `{component}` on {egid} while `{component}` is being iterated")]
    ConcurrentStructuralMutation {
        /// Name of the component type.
        component: &'static str,
        /// The entity whose mutation was rejected.
        egid: Egid,
    },

    /// The entity already carries the component.
    #[error("entity {egid} already has a `{component}` component")]
    DuplicateComponent {
        /// Name of the component type.
        component: &'static str,
        /// The entity that already has the component.
        egid: Egid,
    },

    /// A view, mapper or iteration of the component type is still alive.
    #[error("`{component}` storage is borrowed by an outstanding view or iteration")]
    ComponentBorrowed {
        /// Name of the component type.
        component: &'static str,
    },

    /// Joint iteration requested over the same component type twice.
    #[error("joint iteration over `{component}` and itself is not allowed")]
    AliasedComponentPair {
        /// Name of the component type.
        component: &'static str,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
