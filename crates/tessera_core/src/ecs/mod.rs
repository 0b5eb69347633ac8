//! # Entities Database
//!
//! Components are stored per type and partitioned by group. Inside a group
//! the records of one type are a dense array with no holes, so iterating a
//! group is a linear walk over contiguous memory.
//!
//! ## Design Philosophy
//!
//! - An entity is addressed by its [`Egid`]: entity id plus group id
//! - Removal swaps the last record into the hole, keeping buffers dense
//! - Each type keeps an EGID -> position index in lock-step with its buffers
//! - Structural changes are refused while the affected type is iterated

mod component;
mod db;
mod egid;
mod guard;
mod index;
mod query;
mod registry;
mod store;
mod submission;
mod table;
mod view;

pub use component::{Component, ComponentId};
pub use db::EntitiesDb;
pub use egid::{Egid, GroupId};
pub use index::{EntityIndex, GroupIndex};
pub use registry::TypeRegistry;
pub use store::ComponentStore;
pub use submission::StructuralMutation;
pub use table::ComponentTable;
pub use view::{AllGroupsView, EgidMapper, EgidMapperMut, EntityView, EntityViewMut};
