//! Ember ECS -- generational entities and sparse-set component storage.
//!
//! This crate provides the storage layer the scene runtime is built on:
//! a generational [`EntityId`](entity::EntityId) allocator and a
//! [`Registry`](registry::Registry) holding one dense column per component
//! type.
//!
//! # Quick Start
//!
//! ```
//! use ember_ecs::prelude::*;
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! let mut registry = Registry::new();
//! let e = registry.spawn();
//! registry.insert(e, Position { x: 1.0, y: 2.0 }).unwrap();
//!
//! for (_, pos) in registry.view::<Position>() {
//!     assert_eq!(pos.x, 1.0);
//! }
//! ```

#![deny(unsafe_code)]

pub mod entity;
pub mod registry;
pub mod store;

use thiserror::Error;

use crate::entity::EntityId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// The entity handle is dead, or its generation no longer matches the
    /// allocator's slot (the index was recycled).
    #[error("entity {0} is stale or was never alive")]
    StaleEntity(EntityId),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::registry::Registry;
    pub use crate::store::{ComponentStorage, SparseSet};
    pub use crate::EcsError;
}
