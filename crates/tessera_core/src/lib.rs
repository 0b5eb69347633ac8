//! # TESSERA Core
//!
//! Group-partitioned entities database for Entity Component System games:
//! - Dense, per-group component buffers for linear iteration
//! - O(1) entity lookup through a per-type EGID index
//! - Swap-remove deletion, so buffers never contain holes
//!
//! ## Architecture Rules
//!
//! 1. **Components are plain data** - `Pod` records, no behavior
//! 2. **Groups partition storage** - a query over one group touches one buffer
//! 3. **No structural changes under iteration** - violations are errors, not UB
//!
//! ## Example
//!
//! ```rust,ignore
//! use tessera_core::{EntitiesDb, Egid, GroupId, StructuralMutation};
//!
//! let mut db = EntitiesDb::new();
//! db.register::<Position>();
//! db.register::<Velocity>();
//!
//! let egid = Egid::new(1, GroupId(0));
//! db.add_component(egid, Position::default())?;
//! db.add_component(egid, Velocity::new(1.0, 0.0))?;
//!
//! db.execute_on_entities_pair::<Position, Velocity, _>(GroupId(0), |p, v, _| {
//!     p.x += v.x;
//!     p.y += v.y;
//! })?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::DbConfig;
pub use ecs::{
    AllGroupsView, Component, ComponentId, ComponentStore, ComponentTable, EgidMapper,
    EgidMapperMut, Egid, EntitiesDb, EntityIndex, EntityView, EntityViewMut, GroupId, GroupIndex,
    StructuralMutation, TypeRegistry,
};
pub use error::{DbError, DbResult};
